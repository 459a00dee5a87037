//! SVG frame snapshots for `plotlab`.
//!
//! [`SvgSurface`] is a recording [`Surface`]: paint operations are stored
//! instead of rasterized, and [`SvgSurface::to_document`] turns the most
//! recent frame into an SVG [`Document`] using the `svg` crate. Because
//! `clear` starts every frame, the recorded state is always exactly one
//! frame deep — snapshotting after N ticks yields frame N.

use kurbo::Point;
use svg::node::element::{Circle, Group, Rectangle};
use svg::Document;

use plotlab_graphics::surface::Surface;
use plotlab_graphics::types::{Color, Scalar};

// ---------------------------------------------------------------------------
// Recording surface
// ---------------------------------------------------------------------------

/// One recorded circle.
#[derive(Debug, Clone, PartialEq)]
struct Dot {
    center: Point,
    radius: Scalar,
    color: Color,
    alpha: Scalar,
}

/// A `Surface` that records one frame of paint operations.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    background: Option<Color>,
    dots: Vec<Dot>,
}

impl SvgSurface {
    /// Create a recording surface of the given pixel dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: None,
            dots: Vec::new(),
        }
    }

    /// Number of circles recorded in the current frame.
    #[must_use]
    pub fn dot_count(&self) -> usize {
        self.dots.len()
    }

    /// Whether anything (clear or circles) has been recorded.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.background.is_none() && self.dots.is_empty()
    }

    /// Build the SVG document for the recorded frame.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", format!("0 0 {} {}", self.width, self.height));

        if let Some(bg) = self.background {
            doc = doc.add(
                Rectangle::new()
                    .set("width", self.width)
                    .set("height", self.height)
                    .set("fill", color_to_svg(bg)),
            );
        }

        let mut group = Group::new();
        for dot in &self.dots {
            group = group.add(
                Circle::new()
                    .set("cx", fmt_scalar(dot.center.x))
                    .set("cy", fmt_scalar(dot.center.y))
                    .set("r", fmt_scalar(dot.radius))
                    .set("fill", color_to_svg(dot.color))
                    .set("fill-opacity", fmt_scalar(dot.alpha)),
            );
        }
        doc.add(group)
    }

    /// Render the recorded frame to an SVG string.
    #[must_use]
    pub fn to_svg_string(&self) -> String {
        self.to_document().to_string()
    }
}

impl Surface for SvgSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        self.background = Some(color);
        self.dots.clear();
    }

    fn fill_circle(&mut self, center: Point, radius: Scalar, color: Color, alpha: Scalar) {
        if !center.x.is_finite() || !center.y.is_finite() || !(radius > 0.0) {
            return;
        }
        self.dots.push(Dot {
            center,
            radius,
            color,
            alpha,
        });
    }
}

// ---------------------------------------------------------------------------
// Attribute helpers
// ---------------------------------------------------------------------------

/// Convert a [`Color`] to an SVG color string.
fn color_to_svg(c: Color) -> String {
    let [r, g, b] = c.to_rgb8();
    if r == 0 && g == 0 && b == 0 {
        "black".to_owned()
    } else if r == 255 && g == 255 && b == 255 {
        "white".to_owned()
    } else {
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Format a scalar with up to four decimals, stripping trailing zeros.
fn fmt_scalar(v: Scalar) -> String {
    let s = format!("{v:.4}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
