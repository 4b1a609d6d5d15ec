//! Scene totals.

use std::fmt;

use crate::decode::DataMaps;
use crate::geometry::RenderedCounts;

use super::SectorTree;

/// Counts over a decoded scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneStats {
    pub sectors: usize,
    /// Distinct tree indices.
    pub nodes: usize,
    pub max_depth: usize,
    pub primitives: RenderedCounts,
    pub merged_mesh_mappings: usize,
    pub instanced_mesh_mappings: usize,
}

impl SceneStats {
    pub fn collect(tree: &SectorTree, maps: &DataMaps) -> Self {
        let mut stats = Self { nodes: maps.node_count(), ..Self::default() };
        for sector in tree {
            stats.sectors += 1;
            stats.max_depth = stats.max_depth.max(sector.depth);
            stats.primitives.merge(&sector.primitives.counts());
            stats.merged_mesh_mappings += sector.merged_meshes.mapping_count();
            stats.instanced_mesh_mappings += sector.instanced_meshes.mapping_count();
        }
        stats
    }
}

impl fmt::Display for SceneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sectors:   {} (max depth {})", self.sectors, self.max_depth)?;
        writeln!(f, "Nodes:     {}", self.nodes)?;
        writeln!(f, "Primitives: {}", self.primitives.total())?;
        for (kind, count) in self.primitives.iter().filter(|(_, n)| *n > 0) {
            writeln!(f, "  {:<18} {}", kind.name(), count)?;
        }
        writeln!(f, "Merged mesh mappings:    {}", self.merged_mesh_mappings)?;
        write!(f, "Instanced mesh mappings: {}", self.instanced_mesh_mappings)
    }
}
