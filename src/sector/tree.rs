//! Owned sector tree with an id index.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::util::{LinkError, Result};

use super::{Sector, Traverse, ROOT_PATH};

/// Child indices leading from the root to a sector.
type ChildPath = SmallVec<[usize; 8]>;

/// Decoded sector hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorTree {
    root: Sector,
    index: HashMap<u64, ChildPath>,
}

impl SectorTree {
    /// Index an assembled hierarchy. Sector ids must be unique.
    pub fn new(root: Sector) -> Result<Self> {
        let mut index = HashMap::new();
        let mut stack: Vec<(&Sector, ChildPath)> = vec![(&root, ChildPath::new())];
        while let Some((sector, path)) = stack.pop() {
            for (i, child) in sector.children.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child, child_path));
            }
            if index.insert(sector.id, path).is_some() {
                return Err(LinkError::DuplicateSector(sector.id).into());
            }
        }
        Ok(Self { root, index })
    }

    #[inline]
    pub fn root(&self) -> &Sector {
        &self.root
    }

    pub fn into_root(self) -> Sector {
        self.root
    }

    /// Sector with the given id.
    pub fn get(&self, id: u64) -> Option<&Sector> {
        let path = self.index.get(&id)?;
        path.iter().try_fold(&self.root, |sector, &i| sector.children.get(i))
    }

    pub fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of sectors.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Always false: a tree holds at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Pre-order iteration from the root.
    pub fn iter(&self) -> Traverse<'_> {
        self.root.traverse()
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Sector> {
        self.iter().find(|s| s.path == path)
    }

    /// Deepest sector depth.
    pub fn max_depth(&self) -> usize {
        self.iter().map(|s| s.depth).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a SectorTree {
    type Item = &'a Sector;
    type IntoIter = Traverse<'a>;

    fn into_iter(self) -> Traverse<'a> {
        self.iter()
    }
}

/// Flat, file-ordered sectors with parent links, folded into an owned tree
/// once complete. Parents always precede their children.
#[derive(Debug, Default)]
pub(crate) struct SectorArena {
    sectors: Vec<Sector>,
    parents: Vec<Option<usize>>,
    child_counts: Vec<usize>,
}

impl SectorArena {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.sectors.len()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Sector> {
        self.sectors.get_mut(index)
    }

    /// Append `sector` under `parent`, filling in depth and, when empty, path.
    pub(crate) fn push(&mut self, mut sector: Sector, parent: Option<usize>) -> usize {
        match parent {
            Some(p) => {
                let parent_sector = &self.sectors[p];
                sector.depth = parent_sector.depth + 1;
                if sector.path.is_empty() {
                    sector.path = format!("{}{}/", parent_sector.path, self.child_counts[p]);
                }
                self.child_counts[p] += 1;
            }
            None => {
                sector.depth = 0;
                if sector.path.is_empty() {
                    sector.path = ROOT_PATH.to_string();
                }
            }
        }
        self.sectors.push(sector);
        self.parents.push(parent);
        self.child_counts.push(0);
        self.sectors.len() - 1
    }

    /// Move every sector under its parent, keeping arrival order among siblings.
    pub(crate) fn into_tree(self) -> Result<SectorTree> {
        let mut pending: Vec<Vec<Sector>> = (0..self.sectors.len()).map(|_| Vec::new()).collect();
        let mut root = None;
        for (i, (mut sector, parent)) in self.sectors.into_iter().zip(self.parents).enumerate().rev() {
            let mut children = std::mem::take(&mut pending[i]);
            children.reverse();
            sector.children = children;
            match parent {
                Some(p) => pending[p].push(sector),
                None => root = Some(sector),
            }
        }
        SectorTree::new(root.ok_or(LinkError::Empty)?)
    }
}
