//! Path-linked sector trees.
//!
//! Scene formats that describe sectors as web nodes carry no parent ids.
//! Each node's parent is derived from its slash-terminated path instead.

use std::collections::HashMap;

use crate::util::{BBox3f, LinkError, Result};

use super::tree::{SectorArena, SectorTree};
use super::Sector;

/// One sector description from a path-keyed scene.
#[derive(Clone, Debug, PartialEq)]
pub struct WebNode {
    pub path: String,
    pub bbox: BBox3f,
}

impl WebNode {
    pub fn new(path: impl Into<String>, bbox: BBox3f) -> Self {
        Self { path: path.into(), bbox }
    }
}

/// Parent of a slash-terminated path, `None` for the root.
///
/// `"0/1/2/"` has parent `"0/1/"`; paths of two characters or fewer are roots.
pub fn parent_path(path: &str) -> Option<&str> {
    if path.len() <= 2 {
        return None;
    }
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed.rfind('/').map(|i| &path[..=i])
}

/// Builds a [`SectorTree`] from [`WebNode`]s, parents first.
///
/// Sector ids are assigned in arrival order starting at 0.
#[derive(Debug, Default)]
pub struct PathTreeBuilder {
    arena: SectorArena,
    by_path: HashMap<String, usize>,
}

impl PathTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link one node and return its assigned id.
    pub fn push(&mut self, node: WebNode) -> Result<u64> {
        let id = self.arena.len() as u64;
        let parent = match parent_path(&node.path) {
            None if self.arena.len() == 0 => None,
            None => return Err(LinkError::MultipleRoots { path: node.path.clone() }.into()),
            Some(parent) => match self.by_path.get(parent) {
                Some(&slot) => Some(slot),
                None => {
                    return Err(LinkError::UnknownParentPath { path: node.path.clone(), parent: parent.to_string() }.into())
                }
            },
        };

        let mut sector = Sector::new(id, parent.map(|p| p as u64), node.bbox);
        sector.path = node.path.clone();
        let slot = self.arena.push(sector, parent);
        self.by_path.insert(node.path, slot);
        Ok(id)
    }

    /// Link every node of `nodes` in order.
    pub fn extend(&mut self, nodes: impl IntoIterator<Item = WebNode>) -> Result<()> {
        for node in nodes {
            self.push(node)?;
        }
        Ok(())
    }

    pub fn finish(self) -> Result<SectorTree> {
        self.arena.into_tree()
    }
}
