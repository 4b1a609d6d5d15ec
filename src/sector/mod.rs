//! Sector hierarchy.
//!
//! - [`Sector`] - one decoded sector and its owned children
//! - [`SectorTree`] - root sector plus an id index
//! - [`SectorTreeAssembler`] - links binary records by parent id
//! - [`PathTreeBuilder`] - links web nodes by parent path
//! - [`SceneStats`] - totals over a decoded scene

mod assemble;
mod path;
mod stats;
mod tree;

pub use assemble::*;
pub use path::*;
pub use stats::*;
pub use tree::*;

use crate::decode::SectorGeometry;
use crate::geometry::{InstancedMeshGroup, MergedMeshGroup, PrimitiveGroups};
use crate::util::BBox3f;

/// Path of the root sector.
pub const ROOT_PATH: &str = "0/";

/// One node of the sector hierarchy.
///
/// A sector exclusively owns its children. The parent is referenced by id
/// only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sector {
    pub id: u64,
    pub parent_id: Option<u64>,
    /// Slash-terminated path, `"0/"` for the root.
    pub path: String,
    /// Distance from the root.
    pub depth: usize,
    pub bbox: BBox3f,
    pub primitives: PrimitiveGroups,
    pub merged_meshes: MergedMeshGroup,
    pub instanced_meshes: InstancedMeshGroup,
    pub children: Vec<Sector>,
}

impl Sector {
    /// Empty sector with no geometry and no children.
    pub fn new(id: u64, parent_id: Option<u64>, bbox: BBox3f) -> Self {
        Self { id, parent_id, bbox, ..Self::default() }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Move decoded geometry into the sector.
    pub fn set_geometry(&mut self, geometry: SectorGeometry) {
        self.primitives = geometry.primitives;
        self.merged_meshes = geometry.merged_meshes;
        self.instanced_meshes = geometry.instanced_meshes;
    }

    /// Rendered primitives plus mesh mappings held by this sector alone.
    pub fn geometry_count(&self) -> usize {
        self.primitives.total_count() + self.merged_meshes.mapping_count() + self.instanced_meshes.mapping_count()
    }

    /// Pre-order iterator over this sector and all descendants.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse { stack: vec![self] }
    }

    /// Direct child with the given id.
    pub fn child(&self, id: u64) -> Option<&Sector> {
        self.children.iter().find(|c| c.id == id)
    }
}

/// Pre-order sector iterator, see [`Sector::traverse`].
pub struct Traverse<'a> {
    stack: Vec<&'a Sector>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a Sector;

    fn next(&mut self) -> Option<&'a Sector> {
        let sector = self.stack.pop()?;
        self.stack.extend(sector.children.iter().rev());
        Some(sector)
    }
}
