//! The drawable-surface abstraction.
//!
//! A [`Surface`] is the immediate-mode paint target the rasterizer writes
//! to once per frame: a pixel rectangle with clear and filled-circle
//! operations. Hosts supply one (a raster [`crate::pixmap::Pixmap`], an SVG
//! recorder, a real canvas binding); the interpreter core never knows which.

use kurbo::Point;

use crate::types::{Color, Scalar};

/// An immediate-mode 2D paint target.
///
/// Coordinates are in pixels with the origin at the top-left corner and y
/// growing downward (the rasterizer performs the data-space flip before
/// calling in). Implementations must tolerate out-of-bounds geometry by
/// clipping.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Fill the whole surface with an opaque color.
    fn clear(&mut self, color: Color);

    /// Paint a filled circle. `alpha` is the fill opacity in [0, 1].
    fn fill_circle(&mut self, center: Point, radius: Scalar, color: Color, alpha: Scalar);
}

/// A surface that swallows all paint operations.
///
/// Useful for headless runs and driver tests that only care about control
/// flow.
#[derive(Debug, Clone, Copy)]
pub struct NullSurface {
    width: u32,
    height: u32,
}

impl NullSurface {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Surface for NullSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, _color: Color) {}

    fn fill_circle(&mut self, _center: Point, _radius: Scalar, _color: Color, _alpha: Scalar) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
