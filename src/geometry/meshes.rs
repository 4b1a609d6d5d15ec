//! Triangle-mesh references decoded from mesh blocks.
//!
//! Mesh triangles live in external files keyed by `file_id`; sectors only
//! carry the per-node mappings into them.

use crate::util::{Color, Mat4};

use super::groups::{soa_group, PrimitiveBase};

soa_group! {
    /// One node's triangle range inside a merged mesh file.
    MergedMeshMapping, MergedMeshMappings {
        triangle_offset: u64,
        triangle_count: u64,
    }
}

soa_group! {
    /// One placement of an instanced mesh.
    InstancedMeshMapping, InstancedMeshMappings {
        transform: Mat4,
    }
}

/// All nodes sharing one merged mesh file.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedMesh {
    pub file_id: u64,
    pub mappings: MergedMeshMappings,
}

impl MergedMesh {
    pub fn new(file_id: u64, capacity: usize) -> Self {
        Self { file_id, mappings: MergedMeshMappings::with_capacity(capacity) }
    }

    /// Total triangles referenced by all mappings.
    pub fn triangle_count(&self) -> u64 {
        self.mappings.triangle_count.iter().sum()
    }
}

/// Instances of one triangle range of a mesh file.
#[derive(Clone, Debug, PartialEq)]
pub struct InstancedMeshCollection {
    pub triangle_offset: u64,
    pub triangle_count: u64,
    pub mappings: InstancedMeshMappings,
}

impl InstancedMeshCollection {
    pub fn new(triangle_offset: u64, triangle_count: u64, capacity: usize) -> Self {
        Self {
            triangle_offset,
            triangle_count,
            mappings: InstancedMeshMappings::with_capacity(capacity),
        }
    }
}

/// Instanced collections sharing one mesh file.
#[derive(Clone, Debug, PartialEq)]
pub struct InstancedMesh {
    pub file_id: u64,
    pub collections: Vec<InstancedMeshCollection>,
}

impl InstancedMesh {
    pub fn instance_count(&self) -> usize {
        self.collections.iter().map(|c| c.mappings.count()).sum()
    }
}

/// Merged meshes of a sector, ordered by file id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MergedMeshGroup {
    pub meshes: Vec<MergedMesh>,
}

impl MergedMeshGroup {
    pub fn mapping_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mappings.count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// True when every mapping table was filled to capacity.
    pub fn is_complete(&self) -> bool {
        self.meshes.iter().all(|m| m.mappings.is_full())
    }
}

/// Instanced meshes of a sector, ordered by file id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstancedMeshGroup {
    pub meshes: Vec<InstancedMesh>,
}

impl InstancedMeshGroup {
    pub fn mapping_count(&self) -> usize {
        self.meshes.iter().map(|m| m.instance_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.meshes
            .iter()
            .flat_map(|m| &m.collections)
            .all(|c| c.mappings.is_full())
    }
}
