//! Geometry index blocks.

use smallvec::SmallVec;

use crate::binary::{BitCursorReader, FibonacciDecoder, NodeIdReader, BYTES_PER_NODE_ID};
use crate::config::TableLayout;
use crate::geometry::{attribute_count, FileGeometryType, RenderedCounts};
use crate::util::{Error, FormatError, Result};

/// Blocks of one sector. Most sectors hold only a handful of types.
pub type BlockList<'a> = SmallVec<[GeometryIndexBlock<'a>; 8]>;

/// One geometry type's instances within a sector.
///
/// Borrows its node id array and index stream from the input buffer; readers
/// over them are created on demand, so a block can be consumed any number of
/// times.
#[derive(Clone, Debug)]
pub struct GeometryIndexBlock<'a> {
    pub ty: FileGeometryType,
    pub count: u32,
    pub attribute_count: u32,
    /// File offset of the block header.
    pub offset: u64,
    node_ids: &'a [u8],
    node_ids_offset: u64,
    stream: &'a [u8],
    stream_offset: u64,
}

impl<'a> GeometryIndexBlock<'a> {
    /// Byte length of the index stream.
    #[inline]
    pub fn byte_count(&self) -> usize {
        self.stream.len()
    }

    /// Total number of values in the index stream.
    #[inline]
    pub fn value_count(&self) -> usize {
        self.count as usize * self.attribute_count as usize
    }

    pub fn node_id_reader(&self) -> NodeIdReader<'a> {
        NodeIdReader::new(self.node_ids, self.node_ids_offset)
    }

    pub fn index_decoder(&self) -> FibonacciDecoder<'a> {
        FibonacciDecoder::new(self.stream, self.value_count(), self.stream_offset)
    }

    /// Add this block's rendered primitive counts to `counts`.
    pub fn count_rendered(&self, counts: &mut RenderedCounts) {
        for &(kind, per_instance) in self.ty.emissions() {
            counts.add(kind, per_instance as usize * self.count as usize);
        }
    }
}

fn read_field(reader: &mut BitCursorReader<'_>, layout: TableLayout) -> Result<u32> {
    match layout {
        TableLayout::Compact => reader.read_u8().map(u32::from),
        TableLayout::Wide => reader.read_u32(),
    }
}

/// Read one block header plus its node ids and index stream.
pub fn read_geometry_block<'a>(
    reader: &mut BitCursorReader<'a>,
    layout: TableLayout,
) -> Result<GeometryIndexBlock<'a>> {
    let offset = reader.offset();
    let type_id = read_field(reader, layout)?;
    let ty = FileGeometryType::from_id(type_id, layout).map_err(|kind| Error::format(offset, kind))?;
    let count = reader.read_u32()?;
    let attribute_offset = reader.offset();
    let declared = read_field(reader, layout)?;
    let byte_count = reader.read_u32()?;

    let expected = attribute_count(ty.schema(layout));
    let attribute_count = if declared == expected {
        declared
    } else if ty.is_mesh() {
        tracing::debug!(ty = ty.name(), declared, expected, offset, "overriding mesh attribute count");
        expected
    } else {
        return Err(Error::format(
            attribute_offset,
            FormatError::AttributeCountMismatch { name: ty.name(), expected, actual: declared },
        ));
    };

    let node_ids_offset = reader.offset();
    let node_ids = reader.take((count as usize).checked_mul(BYTES_PER_NODE_ID).unwrap_or(usize::MAX))?;
    let stream_offset = reader.offset();
    let stream = reader.take(byte_count as usize)?;

    tracing::trace!(ty = ty.name(), count, attribute_count, byte_count, offset, "geometry block");

    Ok(GeometryIndexBlock {
        ty,
        count,
        attribute_count,
        offset,
        node_ids,
        node_ids_offset,
        stream,
        stream_offset,
    })
}

/// Read blocks until `reader` is exhausted.
pub fn read_geometry_blocks<'a>(reader: &mut BitCursorReader<'a>, layout: TableLayout) -> Result<BlockList<'a>> {
    let mut blocks = BlockList::new();
    while !reader.is_exhausted() {
        blocks.push(read_geometry_block(reader, layout)?);
    }
    Ok(blocks)
}

/// Rendered primitive counts over all blocks.
pub fn count_rendered(blocks: &[GeometryIndexBlock<'_>]) -> RenderedCounts {
    let mut counts = RenderedCounts::default();
    for block in blocks {
        block.count_rendered(&mut counts);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{encode_fibonacci, encode_node_ids, SectorStream};
    use crate::config::ByteOrder;
    use crate::geometry::RenderedKind;
    use crate::util::BoundsError;

    fn block_bytes(type_id: u8, ids: &[u64], attrs: u8, values: &[u64]) -> Vec<u8> {
        let stream = encode_fibonacci(values);
        let mut s = SectorStream::new(ByteOrder::Big);
        s.write_u8(type_id).unwrap();
        s.write_u32(ids.len() as u32).unwrap();
        s.write_u8(attrs).unwrap();
        s.write_u32(stream.len() as u32).unwrap();
        s.write_bytes(&encode_node_ids(ids));
        s.write_bytes(&stream);
        s.into_inner()
    }

    #[test]
    fn test_read_block() {
        // Sphere: treeIndex, color, center(3), radiusA
        let values: Vec<u64> = (0..12).collect();
        let bytes = block_bytes(23, &[10, 11], 6, &values);
        let mut r = BitCursorReader::new(&bytes, ByteOrder::Big);
        let blocks = read_geometry_blocks(&mut r, TableLayout::Compact).unwrap();
        assert_eq!(blocks.len(), 1);

        let block = &blocks[0];
        assert_eq!(block.ty, FileGeometryType::Sphere);
        assert_eq!(block.value_count(), 12);
        let mut ids = block.node_id_reader();
        assert_eq!(ids.next_node_id().unwrap(), 10);
        assert_eq!(ids.next_node_id().unwrap(), 11);
        let mut decoder = block.index_decoder();
        let decoded: Vec<u64> = (0..12).map(|_| decoder.next_value().unwrap()).collect();
        assert_eq!(decoded, values);

        let counts = count_rendered(&blocks);
        assert_eq!(counts.get(RenderedKind::SphericalSegment), 2);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_unknown_type() {
        let bytes = block_bytes(99, &[1], 1, &[0]);
        let mut r = BitCursorReader::with_base(&bytes, 300, ByteOrder::Big);
        let err = read_geometry_block(&mut r, TableLayout::Compact).unwrap_err();
        assert!(matches!(err, Error::Format { offset: 300, kind: FormatError::UnknownGeometryType(99), .. }));
    }

    #[test]
    fn test_attribute_count_mismatch() {
        let bytes = block_bytes(23, &[1], 5, &[0; 5]);
        let mut r = BitCursorReader::new(&bytes, ByteOrder::Big);
        let err = read_geometry_block(&mut r, TableLayout::Compact).unwrap_err();
        assert!(matches!(
            err,
            Error::Format {
                offset: 5,
                kind: FormatError::AttributeCountMismatch { name: "Sphere", expected: 6, actual: 5 },
                ..
            }
        ));
    }

    #[test]
    fn test_mesh_attribute_count_override() {
        // Declared 8, schema has 4.
        let bytes = block_bytes(100, &[1], 8, &[0, 0, 5, 0]);
        let mut r = BitCursorReader::new(&bytes, ByteOrder::Big);
        let block = read_geometry_block(&mut r, TableLayout::Compact).unwrap();
        assert_eq!(block.attribute_count, 4);
        assert_eq!(block.value_count(), 4);
    }

    #[test]
    fn test_truncated_stream_bytes() {
        let mut bytes = block_bytes(23, &[1], 6, &[0; 6]);
        bytes.pop();
        let mut r = BitCursorReader::new(&bytes, ByteOrder::Big);
        let err = read_geometry_block(&mut r, TableLayout::Compact).unwrap_err();
        assert!(matches!(err, Error::Bounds { kind: BoundsError::ReadPastEnd { .. }, .. }));
    }
}
