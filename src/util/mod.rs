//! Utility types shared by every decoder stage.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`BBox3f`], [`Color`] - Value types stored in sectors and groups
//! - Math type re-exports from glam

mod error;
mod math;

pub use error::*;
pub use math::*;
