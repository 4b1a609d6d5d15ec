//! Reference encoder for sector files.
//!
//! Produces byte-exact records in either layout and byte order. Used to
//! build fixtures and by tools that re-emit decoded data.

use std::path::Path;

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::config::{ByteOrder, TableLayout};
use crate::geometry::{attribute_count, Column, FileGeometryType};
use crate::util::{BBox3f, Error, FormatError, Result, Vec3};

use super::fibonacci::encode_fibonacci;
use super::format::{SECTOR_HEADER_SIZE, SECTOR_LENGTH_SIZE, SECTOR_MAGIC};
use super::node_ids::encode_node_ids;

/// Output buffer writing numbers in a fixed byte order.
pub struct SectorStream {
    buf: Vec<u8>,
    order: ByteOrder,
}

macro_rules! write_number {
    ($name:ident, $ty:ty) => {
        #[inline]
        pub fn $name(&mut self, value: $ty) -> Result<()> {
            match self.order {
                ByteOrder::Big => self.buf.$name::<BigEndian>(value)?,
                ByteOrder::Little => self.buf.$name::<LittleEndian>(value)?,
            }
            Ok(())
        }
    };
}

impl SectorStream {
    pub fn new(order: ByteOrder) -> Self {
        Self { buf: Vec::new(), order }
    }

    /// Current write position.
    #[inline]
    pub fn pos(&self) -> usize {
        self.buf.len()
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.write_u8(value)?;
        Ok(())
    }

    write_number!(write_u32, u32);
    write_number!(write_u64, u64);
    write_number!(write_f32, f32);

    pub fn write_vec3(&mut self, v: Vec3) -> Result<()> {
        self.write_f32(v.x)?;
        self.write_f32(v.y)?;
        self.write_f32(v.z)
    }

    /// Write a header field that is one byte in the compact layout and four in the wide one.
    pub fn write_field(&mut self, layout: TableLayout, value: u32) -> Result<()> {
        match layout {
            TableLayout::Compact => {
                let byte = u8::try_from(value).map_err(|_| {
                    Error::format(self.pos() as u64, FormatError::UnknownGeometryType(value))
                })?;
                self.write_u8(byte)
            }
            TableLayout::Wide => self.write_u32(value),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Property table contents to encode.
#[derive(Clone, Debug, Default)]
pub struct TableData {
    /// RGBA bytes; alpha is stored but never decoded.
    pub colors: Vec<[u8; 4]>,
    pub normals: Vec<Vec3>,
    pub file_ids: Vec<u64>,
    scalars: Vec<(Column, Vec<f32>)>,
    widths: Vec<(Column, u32)>,
}

impl TableData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar column (every column except color, normal and fileId).
    pub fn set_scalars(&mut self, column: Column, values: Vec<f32>) -> &mut Self {
        self.scalars.retain(|(c, _)| *c != column);
        self.scalars.push((column, values));
        self
    }

    /// Declare `width` bytes per value for `column` instead of the real width.
    pub fn override_width(&mut self, column: Column, width: u32) -> &mut Self {
        self.widths.retain(|(c, _)| *c != column);
        self.widths.push((column, width));
        self
    }

    fn scalars(&self, column: Column) -> &[f32] {
        self.scalars
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    fn width(&self, column: Column) -> u32 {
        self.widths
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, w)| *w)
            .unwrap_or(column.width())
    }

    fn write(&self, out: &mut SectorStream, layout: TableLayout) -> Result<()> {
        for &column in Column::for_layout(layout) {
            let count = match column {
                Column::Color => self.colors.len(),
                Column::Normal => self.normals.len(),
                Column::FileId => self.file_ids.len(),
                other => self.scalars(other).len(),
            };
            out.write_u32(count as u32)?;
            out.write_field(layout, self.width(column))?;
            match column {
                Column::Color => self.colors.iter().for_each(|c| out.write_bytes(c)),
                Column::Normal => {
                    for n in &self.normals {
                        out.write_vec3(*n)?;
                    }
                }
                Column::FileId => {
                    for id in &self.file_ids {
                        out.write_u64(*id)?;
                    }
                }
                other => {
                    for v in self.scalars(other) {
                        out.write_f32(*v)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// One geometry block to encode.
#[derive(Clone, Debug)]
pub struct BlockData {
    pub type_id: u32,
    pub count: u32,
    pub attribute_count: u32,
    pub node_ids: Vec<u64>,
    pub stream: Vec<u8>,
}

/// Builder for a single sector record.
#[derive(Clone, Debug)]
pub struct SectorWriter {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub bbox: BBox3f,
    pub format_version: u32,
    pub optimizer_version: u32,
    pub magic: u32,
    pub table: Option<TableData>,
    pub blocks: Vec<BlockData>,
    layout: TableLayout,
}

impl SectorWriter {
    pub fn new(id: u64, parent_id: Option<u64>, bbox: BBox3f, layout: TableLayout) -> Self {
        Self {
            id,
            parent_id,
            bbox,
            format_version: 8,
            optimizer_version: 1,
            magic: SECTOR_MAGIC,
            table: Some(TableData::new()),
            blocks: Vec::new(),
            layout,
        }
    }

    pub fn table_mut(&mut self) -> &mut TableData {
        self.table.get_or_insert_with(TableData::new)
    }

    /// Write the sector with `arrayCount` 0 and no table.
    pub fn without_table(&mut self) -> &mut Self {
        self.table = None;
        self
    }

    /// Add a block of `ty`, one node id per instance and the flat index stream.
    ///
    /// The attribute count comes from the type's schema, so `indices` must
    /// hold `node_ids.len() * attribute_count` values.
    pub fn add_block(&mut self, ty: FileGeometryType, node_ids: &[u64], indices: &[u64]) -> Result<&mut Self> {
        let type_id = ty.id(self.layout).ok_or_else(|| {
            Error::format(
                0,
                FormatError::UnsupportedGeometryType { name: ty.name(), layout: self.layout.name() },
            )
        })?;
        let attribute_count = attribute_count(ty.schema(self.layout));
        let expected = node_ids.len() * attribute_count as usize;
        if indices.len() != expected {
            return Err(Error::format(
                0,
                FormatError::AttributeCountMismatch {
                    name: ty.name(),
                    expected: expected as u32,
                    actual: indices.len() as u32,
                },
            ));
        }
        self.blocks.push(BlockData {
            type_id,
            count: node_ids.len() as u32,
            attribute_count,
            node_ids: node_ids.to_vec(),
            stream: encode_fibonacci(indices),
        });
        Ok(self)
    }

    /// Add a block verbatim, without any consistency checks.
    pub fn add_raw_block(&mut self, block: BlockData) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Encode the full record, length prefix included.
    pub fn encode(&self, order: ByteOrder) -> Result<Vec<u8>> {
        let mut out = SectorStream::new(order);
        // Patched once the body is written.
        out.write_u32(0)?;
        out.write_u32(self.magic)?;
        out.write_u32(self.format_version)?;
        out.write_u32(self.optimizer_version)?;
        out.write_u64(self.id)?;
        out.write_u64(self.parent_id.unwrap_or(u64::MAX))?;
        out.write_vec3(self.bbox.min)?;
        out.write_vec3(self.bbox.max)?;
        debug_assert_eq!(out.pos(), SECTOR_LENGTH_SIZE + SECTOR_HEADER_SIZE - 4);

        match &self.table {
            Some(table) => {
                out.write_u32(Column::for_layout(self.layout).len() as u32)?;
                table.write(&mut out, self.layout)?;
            }
            None => out.write_u32(0)?,
        }

        for block in &self.blocks {
            out.write_field(self.layout, block.type_id)?;
            out.write_u32(block.count)?;
            out.write_field(self.layout, block.attribute_count)?;
            out.write_u32(block.stream.len() as u32)?;
            out.write_bytes(&encode_node_ids(&block.node_ids));
            out.write_bytes(&block.stream);
        }

        let mut bytes = out.into_inner();
        let len = bytes.len() as u32;
        let prefix = match order {
            ByteOrder::Big => len.to_be_bytes(),
            ByteOrder::Little => len.to_le_bytes(),
        };
        bytes[..SECTOR_LENGTH_SIZE].copy_from_slice(&prefix);
        Ok(bytes)
    }
}

/// Concatenate sector records into one multi-sector file image.
pub fn write_sectors(sectors: &[SectorWriter], order: ByteOrder) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for sector in sectors {
        out.extend_from_slice(&sector.encode(order)?);
    }
    Ok(out)
}

/// Write a multi-sector file to disk.
pub fn write_sectors_to_file(path: impl AsRef<Path>, sectors: &[SectorWriter], order: ByteOrder) -> Result<()> {
    std::fs::write(path, write_sectors(sectors, order)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BitCursorReader;

    fn bbox() -> BBox3f {
        BBox3f::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn test_header_layout() {
        let mut w = SectorWriter::new(5, Some(1), bbox(), TableLayout::Compact);
        w.without_table();
        let bytes = w.encode(ByteOrder::Big).unwrap();
        assert_eq!(bytes.len(), SECTOR_LENGTH_SIZE + SECTOR_HEADER_SIZE);

        let mut r = BitCursorReader::new(&bytes, ByteOrder::Big);
        assert_eq!(r.read_u32().unwrap() as usize, bytes.len());
        assert_eq!(r.read_u32().unwrap(), SECTOR_MAGIC);
        r.skip(8).unwrap();
        assert_eq!(r.read_u64().unwrap(), 5);
        assert_eq!(r.read_u64().unwrap(), 1);
        assert_eq!(r.read_vec3().unwrap(), Vec3::ZERO);
        assert_eq!(r.read_vec3().unwrap(), Vec3::ONE);
        assert_eq!(r.read_u32().unwrap(), 0);
    }

    #[test]
    fn test_block_attribute_count_checked() {
        let mut w = SectorWriter::new(0, None, bbox(), TableLayout::Compact);
        let err = w.add_block(FileGeometryType::Sphere, &[1], &[0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::Format { kind: FormatError::AttributeCountMismatch { expected: 6, .. }, .. }));
        assert!(w.add_block(FileGeometryType::Sphere, &[1], &[0; 6]).is_ok());
    }

    #[test]
    fn test_wide_layout_rejects_meshes() {
        let mut w = SectorWriter::new(0, None, bbox(), TableLayout::Wide);
        assert!(w.add_block(FileGeometryType::MergedMesh, &[1], &[0; 4]).is_err());
    }

    #[test]
    fn test_little_endian_length_prefix() {
        let w = SectorWriter::new(0, None, bbox(), TableLayout::Wide);
        let bytes = w.encode(ByteOrder::Little).unwrap();
        let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(len as usize, bytes.len());
        // 15 empty clusters of u32 count + u32 width.
        assert_eq!(bytes.len(), SECTOR_LENGTH_SIZE + SECTOR_HEADER_SIZE + 15 * 8);
    }
}
