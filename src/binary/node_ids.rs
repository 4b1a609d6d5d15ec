//! Packed 7-byte node id arrays.

use crate::util::{BoundsError, Error, Result};

use super::format::{node_id_mask, BYTES_PER_NODE_ID};

/// Sequential reader over a block's node id array.
///
/// Ids are always big-endian regardless of the configured byte order.
#[derive(Clone, Debug)]
pub struct NodeIdReader<'a> {
    data: &'a [u8],
    base: u64,
    index: usize,
}

impl<'a> NodeIdReader<'a> {
    /// `data` must hold `count * 7` bytes; `base` is its file offset.
    pub fn new(data: &'a [u8], base: u64) -> Self {
        Self { data, base, index: 0 }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / BYTES_PER_NODE_ID
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rewind(&mut self) {
        self.index = 0;
    }

    pub fn next_node_id(&mut self) -> Result<u64> {
        let start = self.index * BYTES_PER_NODE_ID;
        let bytes = self.data.get(start..start + BYTES_PER_NODE_ID).ok_or_else(|| {
            Error::bounds(
                self.base + start as u64,
                BoundsError::ReadPastEnd {
                    requested: BYTES_PER_NODE_ID,
                    available: self.data.len().saturating_sub(start),
                },
            )
        })?;
        self.index += 1;
        Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }
}

/// Pack `ids` into 7-byte big-endian entries.
pub fn encode_node_ids(ids: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ids.len() * BYTES_PER_NODE_ID);
    for id in ids {
        debug_assert!(*id <= node_id_mask(), "node id {id} does not fit in 7 bytes");
        out.extend_from_slice(&id.to_be_bytes()[8 - BYTES_PER_NODE_ID..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_node_ids() {
        let ids = [0, 1, 0x00AB_CDEF_0123_4567, (1 << 56) - 1];
        let data = encode_node_ids(&ids);
        assert_eq!(data.len(), 28);
        let mut reader = NodeIdReader::new(&data, 0);
        assert_eq!(reader.len(), 4);
        for id in ids {
            assert_eq!(reader.next_node_id().unwrap(), id);
        }
        assert!(reader.next_node_id().is_err());
        reader.rewind();
        assert_eq!(reader.next_node_id().unwrap(), 0);
    }

    #[test]
    fn test_short_array() {
        let data = [0u8; 10];
        let mut reader = NodeIdReader::new(&data, 500);
        reader.next_node_id().unwrap();
        match reader.next_node_id().unwrap_err() {
            Error::Bounds { offset, kind, .. } => {
                assert_eq!(offset, 507);
                assert_eq!(kind, BoundsError::ReadPastEnd { requested: 7, available: 3 });
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
