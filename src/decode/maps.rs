//! Node lookup tables filled while decoding.

use std::collections::HashMap;

use crate::geometry::PrimitiveBase;
use crate::util::Color;

/// Per-node lookups keyed by tree index.
///
/// Every decoded primitive and mesh instance records its node id and color
/// here. [`DataMaps::finish`] builds the reverse node id lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataMaps {
    pub tree_index_to_node_id: HashMap<u64, u64>,
    pub tree_index_to_color: HashMap<u64, Color>,
    pub node_id_to_tree_index: HashMap<u64, u64>,
}

impl DataMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one instance. A later insert for the same tree index wins.
    #[inline]
    pub fn insert(&mut self, base: &PrimitiveBase) {
        self.tree_index_to_node_id.insert(base.tree_index, base.node_id);
        self.tree_index_to_color.insert(base.tree_index, base.color);
    }

    /// Fold `other` into `self`; entries of `other` win.
    pub fn merge(&mut self, other: DataMaps) {
        self.tree_index_to_node_id.extend(other.tree_index_to_node_id);
        self.tree_index_to_color.extend(other.tree_index_to_color);
    }

    /// Build the node id to tree index lookup.
    ///
    /// When several tree indices share a node id the largest one wins, so
    /// the result does not depend on hash order.
    pub fn finish(&mut self) {
        let mut pairs: Vec<(u64, u64)> = self.tree_index_to_node_id.iter().map(|(&t, &n)| (t, n)).collect();
        pairs.sort_unstable();
        self.node_id_to_tree_index = pairs.into_iter().map(|(t, n)| (n, t)).collect();
    }

    /// Number of distinct tree indices seen.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.tree_index_to_node_id.len()
    }

    pub fn node_id(&self, tree_index: u64) -> Option<u64> {
        self.tree_index_to_node_id.get(&tree_index).copied()
    }

    pub fn color(&self, tree_index: u64) -> Option<Color> {
        self.tree_index_to_color.get(&tree_index).copied()
    }

    pub fn tree_index(&self, node_id: u64) -> Option<u64> {
        self.node_id_to_tree_index.get(&node_id).copied()
    }
}
