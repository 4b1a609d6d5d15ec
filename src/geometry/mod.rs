//! Geometry type tables and rendered primitive storage.
//!
//! - [`FileGeometryType`] - on-disk block types, their schemas and emission counts
//! - [`Property`], [`Column`] - logical attributes and property-table slots
//! - [`PrimitiveGroups`] - SoA groups per [`RenderedKind`]
//! - [`MergedMeshGroup`], [`InstancedMeshGroup`] - mesh mappings

mod groups;
mod meshes;
mod schema;
mod types;

pub use groups::*;
pub use meshes::*;
pub use schema::*;
pub use types::*;
