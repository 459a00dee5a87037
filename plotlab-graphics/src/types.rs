//! Core types shared across the `plotlab` system.
//!
//! The scripting language addresses colors two ways: by MATLAB-style
//! single-letter tokens (`'k'`, `'w'`, ...) and by per-point numeric maps
//! that are turned into hues at render time. Both conversions live here so
//! every backend (raster, SVG) agrees on them.

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Convenience alias. All script arithmetic is IEEE double.
pub type Scalar = f64;

/// Tolerance for floating-point comparisons in tests.
pub const EPSILON: Scalar = 1e-9;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// RGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: Scalar,
    pub g: Scalar,
    pub b: Scalar,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    #[inline]
    #[must_use]
    pub const fn new(r: Scalar, g: Scalar, b: Scalar) -> Self {
        Self { r, g, b }
    }

    /// Resolve a MATLAB-style color token.
    ///
    /// Single-letter tokens map to the fixed primary/secondary palette;
    /// `#rrggbb` strings pass through; anything else is unrecognized and
    /// yields `None` (callers keep their current color).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "k" => Some(Self::BLACK),
            "w" => Some(Self::WHITE),
            "r" => Some(Self::new(1.0, 0.0, 0.0)),
            "g" => Some(Self::new(0.0, 1.0, 0.0)),
            "b" => Some(Self::new(0.0, 0.0, 1.0)),
            "y" => Some(Self::new(1.0, 1.0, 0.0)),
            "c" => Some(Self::new(0.0, 1.0, 1.0)),
            "m" => Some(Self::new(1.0, 0.0, 1.0)),
            _ => Self::from_hex(token),
        }
    }

    /// Parse a `#rrggbb` hex string.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(
            Scalar::from(r) / 255.0,
            Scalar::from(g) / 255.0,
            Scalar::from(b) / 255.0,
        ))
    }

    /// Build a color from hue/saturation/lightness.
    ///
    /// `hue` is in degrees (any value; wrapped into [0, 360)), `saturation`
    /// and `lightness` in [0, 1]. Standard HSL to RGB conversion.
    #[must_use]
    pub fn from_hsl(hue: Scalar, saturation: Scalar, lightness: Scalar) -> Self {
        let h = hue.rem_euclid(360.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        let c = (1.0 - 2.0f64.mul_add(l, -1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
        let m = l - c / 2.0;

        let (r1, g1, b1) = match h {
            h if h < 60.0 => (c, x, 0.0),
            h if h < 120.0 => (x, c, 0.0),
            h if h < 180.0 => (0.0, c, x),
            h if h < 240.0 => (0.0, x, c),
            h if h < 300.0 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self::new(r1 + m, g1 + m, b1 + m)
    }

    /// Quantize to 8-bit channels.
    #[must_use]
    pub fn to_rgb8(self) -> [u8; 3] {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        fn q(v: Scalar) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
