//! Multi-sector decoding and id-based linking.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use rayon::prelude::*;

use crate::binary::BitCursorReader;
use crate::config::DecoderConfig;
use crate::decode::{read_sector_record, scan_sectors, unpack_sector, DataMaps, SectorGeometry, SectorHeader, SectorRecord};
use crate::util::{Error, LinkError, Result};

use super::tree::{SectorArena, SectorTree};
use super::{SceneStats, Sector};

/// Links sector headers by parent id, in file order.
///
/// The first header pushed is the root and its parent id is ignored. Every
/// later header must name a sector that was pushed before it.
#[derive(Debug, Default)]
pub struct SectorTreeAssembler {
    arena: SectorArena,
    by_id: HashMap<u64, usize>,
}

impl SectorTreeAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sectors linked so far.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Link one sector. `offset` is the record's file offset, for errors.
    ///
    /// Returns the sector's slot, used by [`attach`](Self::attach).
    pub fn push(&mut self, header: &SectorHeader, offset: u64) -> Result<usize> {
        if self.by_id.contains_key(&header.id) {
            return Err(LinkError::DuplicateSector(header.id).into());
        }
        let parent = if self.arena.len() == 0 {
            None
        } else {
            let slot = self.by_id.get(&header.parent_id).copied().ok_or(LinkError::UnknownParent {
                sector: header.id,
                parent: header.parent_id,
                offset,
            })?;
            Some(slot)
        };
        let parent_id = parent.map(|_| header.parent_id);
        let slot = self.arena.push(Sector::new(header.id, parent_id, header.bbox), parent);
        self.by_id.insert(header.id, slot);
        Ok(slot)
    }

    /// Move decoded geometry into the sector at `slot`, returning its maps.
    pub fn attach(&mut self, slot: usize, mut geometry: SectorGeometry) -> DataMaps {
        let maps = std::mem::take(&mut geometry.maps);
        if let Some(sector) = self.arena.get_mut(slot) {
            sector.set_geometry(geometry);
        }
        maps
    }

    /// Fold the linked sectors into a tree.
    pub fn finish(self) -> Result<SectorTree> {
        self.arena.into_tree()
    }
}

/// Result of decoding a multi-sector file.
#[derive(Clone, Debug)]
pub struct DecodedScene {
    pub tree: SectorTree,
    pub maps: DataMaps,
    pub stats: SceneStats,
}

impl DecodedScene {
    #[inline]
    pub fn root(&self) -> &Sector {
        self.tree.root()
    }
}

/// Decode a multi-sector file image.
#[tracing::instrument(skip_all, fields(bytes = data.len()))]
pub fn decode_file(data: &[u8], config: &DecoderConfig) -> Result<DecodedScene> {
    let records = scan_sectors(data, config)?;
    decode_records(&records, config)
}

/// Decode a file whose records arrive as separate buffers, root first.
#[tracing::instrument(skip_all, fields(buffers = buffers.len()))]
pub fn decode_sector_buffers(buffers: &[&[u8]], config: &DecoderConfig) -> Result<DecodedScene> {
    let records = buffers
        .iter()
        .map(|buffer| read_sector_record(&mut BitCursorReader::new(buffer, config.byte_order), config))
        .collect::<Result<Vec<_>>>()?;
    decode_records(&records, config)
}

/// Decode the first record of `data` as a standalone root sector.
pub fn decode_sector(data: &[u8], config: &DecoderConfig) -> Result<Sector> {
    let mut reader = BitCursorReader::new(data, config.byte_order);
    let record = read_sector_record(&mut reader, config)?;
    let mut assembler = SectorTreeAssembler::new();
    let slot = assembler.push(&record.header, record.offset)?;
    assembler.attach(slot, unpack_sector(&record, config)?);
    Ok(assembler.finish()?.into_root())
}

/// Memory-map `path` and decode it.
pub fn open(path: impl AsRef<Path>, config: &DecoderConfig) -> Result<DecodedScene> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;
    if file.metadata()?.len() == 0 {
        return Err(LinkError::Empty.into());
    }
    // Safety: the file is opened read-only and the map is dropped before returning.
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
    decode_file(&mmap, config)
}

fn decode_records(records: &[SectorRecord<'_>], config: &DecoderConfig) -> Result<DecodedScene> {
    // Link first: a bad parent id fails before any geometry is unpacked.
    let mut assembler = SectorTreeAssembler::new();
    let slots = records
        .iter()
        .map(|record| assembler.push(&record.header, record.offset))
        .collect::<Result<Vec<_>>>()?;

    let geometries: Vec<SectorGeometry> = if config.parallel {
        records.par_iter().map(|record| unpack_sector(record, config)).collect::<Result<_>>()?
    } else {
        records.iter().map(|record| unpack_sector(record, config)).collect::<Result<_>>()?
    };

    let mut maps = DataMaps::new();
    for (slot, geometry) in slots.into_iter().zip(geometries) {
        maps.merge(assembler.attach(slot, geometry));
    }
    maps.finish();

    let tree = assembler.finish()?;
    let stats = SceneStats::collect(&tree, &maps);
    tracing::debug!(sectors = stats.sectors, nodes = stats.nodes, "decoded scene");
    Ok(DecodedScene { tree, maps, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::{write_sectors, SectorWriter};
    use crate::config::{ByteOrder, TableLayout};
    use crate::util::{BBox3f, Vec3};

    fn empty(id: u64, parent: Option<u64>) -> SectorWriter {
        SectorWriter::new(id, parent, BBox3f::new(Vec3::ZERO, Vec3::ONE), TableLayout::Compact)
    }

    #[test]
    fn test_unknown_parent() {
        let bytes = write_sectors(&[empty(1, None), empty(2, Some(1)), empty(3, Some(9))], ByteOrder::Big).unwrap();
        let err = decode_file(&bytes, &DecoderConfig::default()).unwrap_err();
        match err {
            Error::Link(LinkError::UnknownParent { sector, parent, offset }) => {
                assert_eq!((sector, parent), (3, 9));
                assert!(offset > 0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_root_parent_ignored() {
        let bytes = write_sectors(&[empty(5, Some(77)), empty(6, Some(5))], ByteOrder::Big).unwrap();
        let scene = decode_file(&bytes, &DecoderConfig::default()).unwrap();
        assert_eq!(scene.root().id, 5);
        assert_eq!(scene.root().parent_id, None);
        assert_eq!(scene.tree.get(6).and_then(|s| s.parent_id), Some(5));
    }

    #[test]
    fn test_empty_input() {
        let err = decode_file(&[], &DecoderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Link(LinkError::Empty)));
    }

    #[test]
    fn test_decode_sector_reads_first_record_only() {
        let bytes = write_sectors(&[empty(1, None), empty(2, Some(1))], ByteOrder::Big).unwrap();
        let root = decode_sector(&bytes, &DecoderConfig::default()).unwrap();
        assert_eq!(root.id, 1);
        assert!(root.children.is_empty());
        assert_eq!(root.path, "0/");
    }

    #[test]
    fn test_sector_buffers() {
        let a = empty(1, None).encode(ByteOrder::Big).unwrap();
        let b = empty(2, Some(1)).encode(ByteOrder::Big).unwrap();
        let config = DecoderConfig { parallel: false, ..DecoderConfig::default() };
        let scene = decode_sector_buffers(&[&a, &b], &config).unwrap();
        assert_eq!(scene.tree.len(), 2);
        assert_eq!(scene.stats.sectors, 2);
    }
}
