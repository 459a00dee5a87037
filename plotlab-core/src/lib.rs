//! Parser and incremental interpreter for a MATLAB-like plot script.
//!
//! The supported language is a restricted MATLAB subset: figure/axes/axis
//! setup calls, variable assignments over scalars and dense 1-D arrays,
//! `scatter` handle creation, `handle.Property = expr` mutation, `drawnow`,
//! and a single top-level `while` loop whose body runs once per animation
//! frame. The [`driver::Engine`] ties the pieces to a drawable surface.

pub mod context;
pub mod driver;
pub mod error;
pub mod eval;
pub mod expr;
pub mod fallback;
pub mod render;
pub mod scanner;
pub mod statement;
pub mod token;
pub mod types;
pub mod variables;

pub use context::Context;
pub use driver::{Engine, FrameRequest, FrameScheduler};
pub use statement::{parse, Statement};
pub use types::Value;
