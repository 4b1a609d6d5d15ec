//! Sector record scanning and per-sector geometry unpacking.
//!
//! Scanning is sequential because every record starts where the previous one
//! ended. Unpacking only touches one record's own bytes and table, so records
//! can be unpacked in any order or in parallel.

use crate::binary::{BitCursorReader, SECTOR_LENGTH_SIZE, SECTOR_MAGIC};
use crate::config::DecoderConfig;
use crate::geometry::{FileGeometryType, InstancedMeshGroup, MergedMeshGroup, PrimitiveBase, PrimitiveGroups, RenderedCounts};
use crate::util::{BBox3f, Error, FormatError, Result};

use super::blocks::{count_rendered, read_geometry_blocks, BlockList};
use super::maps::DataMaps;
use super::meshes::{unpack_instanced_meshes, unpack_merged_meshes};
use super::properties::{load_property_table, PropertyTable};
use super::reconstruct::expand_primitive;
use super::resolver::PropertyResolver;

/// Fixed sector header following the length prefix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectorHeader {
    pub magic: u32,
    pub format_version: u32,
    pub optimizer_version: u32,
    pub id: u64,
    /// Raw parent id. Meaningless for the first record of a file.
    pub parent_id: u64,
    pub bbox: BBox3f,
    pub array_count: u32,
}

/// Read and validate a sector header.
pub fn read_sector_header(reader: &mut BitCursorReader<'_>) -> Result<SectorHeader> {
    let offset = reader.offset();
    let magic = reader.read_u32()?;
    if magic != SECTOR_MAGIC {
        return Err(Error::format(offset, FormatError::InvalidMagic { expected: SECTOR_MAGIC, actual: magic }));
    }
    let format_version = reader.read_u32()?;
    let optimizer_version = reader.read_u32()?;
    let id = reader.read_u64()?;
    let parent_id = reader.read_u64()?;
    let min = reader.read_vec3()?;
    let max = reader.read_vec3()?;
    let array_count = reader.read_u32()?;
    Ok(SectorHeader {
        magic,
        format_version,
        optimizer_version,
        id,
        parent_id,
        bbox: BBox3f::new(min, max),
        array_count,
    })
}

/// One scanned sector record. Blocks borrow the input buffer.
#[derive(Clone, Debug)]
pub struct SectorRecord<'a> {
    pub header: SectorHeader,
    /// File offset of the length prefix.
    pub offset: u64,
    /// Declared record length, prefix included.
    pub length: u32,
    pub table: PropertyTable,
    pub blocks: BlockList<'a>,
}

impl SectorRecord<'_> {
    #[inline]
    pub fn id(&self) -> u64 {
        self.header.id
    }

    /// File offset one past the last byte of the record.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }

    /// Rendered primitives this record will produce.
    pub fn rendered_counts(&self) -> RenderedCounts {
        count_rendered(&self.blocks)
    }
}

/// Read one record: length prefix, header, property table and block descriptors.
pub fn read_sector_record<'a>(reader: &mut BitCursorReader<'a>, config: &DecoderConfig) -> Result<SectorRecord<'a>> {
    let offset = reader.offset();
    let length = reader.read_u32()?;
    let mut body = reader.sub_reader((length as usize).saturating_sub(SECTOR_LENGTH_SIZE))?;

    let header = read_sector_header(&mut body)?;
    let id = header.id;
    let table = load_property_table(&mut body, header.array_count, config).map_err(|e| e.in_sector(id))?;
    let blocks = read_geometry_blocks(&mut body, config.layout).map_err(|e| e.in_sector(id))?;

    tracing::debug!(
        id,
        parent = header.parent_id,
        offset,
        end = offset + length as u64,
        blocks = blocks.len(),
        "sector"
    );

    Ok(SectorRecord { header, offset, length, table, blocks })
}

/// Scan every record of a multi-sector buffer in file order.
pub fn scan_sectors<'a>(data: &'a [u8], config: &DecoderConfig) -> Result<Vec<SectorRecord<'a>>> {
    let mut reader = BitCursorReader::new(data, config.byte_order);
    let mut records = Vec::new();
    while !reader.is_exhausted() {
        records.push(read_sector_record(&mut reader, config)?);
    }
    Ok(records)
}

/// Decoded geometry of one sector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectorGeometry {
    pub primitives: PrimitiveGroups,
    pub merged_meshes: MergedMeshGroup,
    pub instanced_meshes: InstancedMeshGroup,
    pub maps: DataMaps,
}

/// Resolve and expand every block of `record`.
///
/// Groups are sized from the emission table before the first instance is
/// written.
pub fn unpack_sector(record: &SectorRecord<'_>, config: &DecoderConfig) -> Result<SectorGeometry> {
    unpack_blocks(record, config).map_err(|e| e.in_sector(record.id()))
}

fn unpack_blocks(record: &SectorRecord<'_>, config: &DecoderConfig) -> Result<SectorGeometry> {
    let mut geometry = SectorGeometry {
        primitives: PrimitiveGroups::with_counts(&record.rendered_counts()),
        ..SectorGeometry::default()
    };

    for block in &record.blocks {
        let mut resolver = PropertyResolver::new(&record.table, block, config.layout);
        match block.ty {
            FileGeometryType::MergedMesh => {
                let meshes = unpack_merged_meshes(&mut resolver, &mut geometry.maps)?;
                geometry.merged_meshes.meshes.extend(meshes);
            }
            FileGeometryType::InstancedMesh => {
                let meshes = unpack_instanced_meshes(&mut resolver, &mut geometry.maps)?;
                geometry.instanced_meshes.meshes.extend(meshes);
            }
            ty => {
                for _ in 0..resolver.instance_count() {
                    let p = resolver.next_instance()?;
                    expand_primitive(ty, &p, &mut geometry.primitives);
                    geometry.maps.insert(&PrimitiveBase::new(p.node_id, p.tree_index, p.color));
                }
            }
        }
    }

    debug_assert!(geometry.primitives.is_complete());
    Ok(geometry)
}
