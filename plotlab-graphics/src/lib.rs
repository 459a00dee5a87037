//! Drawable-surface abstraction and raster types for `plotlab`.
//!
//! The interpreter core paints point clouds through the [`surface::Surface`]
//! trait; this crate provides the trait itself, the shared color/scalar
//! types, and an in-memory RGBA [`pixmap::Pixmap`] implementation.

pub mod pixmap;
pub mod surface;
pub mod types;
