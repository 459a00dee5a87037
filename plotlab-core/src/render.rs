//! Frame rasterization.
//!
//! Projects every scatter handle's data through the axes ranges onto the
//! drawable surface. Data space has y growing upward; pixel space has y
//! growing downward, so the projection flips y. Points whose projection is
//! not finite are skipped index-by-index, which is also how mismatched
//! xData/yData lengths degrade.

use kurbo::Point;

use plotlab_graphics::surface::Surface;
use plotlab_graphics::types::{Color, Scalar};

use crate::context::{Context, MarkerColor};

/// Hue saturation for per-point color maps.
const MAP_SATURATION: Scalar = 1.0;
/// Hue lightness for per-point color maps.
const MAP_LIGHTNESS: Scalar = 0.7;

/// Paint the current context state onto the surface.
///
/// A zero-area surface skips the frame entirely (resource anomaly policy).
pub fn render_frame(ctx: &Context, surface: &mut dyn Surface) {
    let width = Scalar::from(surface.width());
    let height = Scalar::from(surface.height());
    if width <= 0.0 || height <= 0.0 {
        log::debug!("skipping frame: surface has zero area");
        return;
    }

    let [x0, x1] = ctx.axes.x_range;
    let [y0, y1] = ctx.axes.y_range;
    let scale_x = width / (x1 - x0);
    let scale_y = height / (y1 - y0);

    surface.clear(ctx.figure.background);

    for (_, handle) in ctx.handles() {
        let fixed_color = match &handle.color {
            MarkerColor::Token(token) => Some(Color::from_token(token).unwrap_or(Color::WHITE)),
            MarkerColor::Map(_) => None,
        };

        for (idx, &x) in handle.x_data.iter().enumerate() {
            let y = handle.y_data.get(idx).copied().unwrap_or(Scalar::NAN);
            let px = (x - x0) * scale_x;
            let py = (y - y0).mul_add(-scale_y, height);
            if !px.is_finite() || !py.is_finite() {
                continue;
            }

            let color = fixed_color.unwrap_or_else(|| {
                let v = match &handle.color {
                    MarkerColor::Map(map) => map.get(idx).copied().unwrap_or(0.0),
                    MarkerColor::Token(_) => 0.0,
                };
                Color::from_hsl(v * 360.0, MAP_SATURATION, MAP_LIGHTNESS)
            });

            surface.fill_circle(
                Point::new(px, py),
                handle.size,
                color,
                handle.marker_face_alpha,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
