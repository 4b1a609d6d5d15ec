//! Sector decoding pipeline.
//!
//! - [`load_property_table`] - per-sector value pools
//! - [`read_geometry_blocks`] - block descriptors borrowing the input
//! - [`PropertyResolver`] - index stream to physical values
//! - [`expand_primitive`] - on-disk types to rendered primitives
//! - [`unpack_sector`] - one record to [`SectorGeometry`]

mod blocks;
mod maps;
mod meshes;
mod properties;
mod reconstruct;
mod resolver;
mod unpack;

pub use blocks::*;
pub use maps::*;
pub use meshes::*;
pub use properties::*;
pub use reconstruct::*;
pub use resolver::*;
pub use unpack::*;
