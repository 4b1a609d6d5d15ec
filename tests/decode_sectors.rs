//! Integration tests for multi-sector decoding and tree linking.

use i3df::binary::{write_sectors, write_sectors_to_file, SectorWriter, SECTOR_MAGIC};
use i3df::geometry::Column;
use i3df::prelude::*;
use i3df::util::LinkError;

use tempfile::NamedTempFile;

fn bbox(lo: f32, hi: f32) -> BBox3f {
    BBox3f::new(Vec3::splat(lo), Vec3::splat(hi))
}

/// Sector with one closed cylinder and one sphere.
fn sector(id: u64, parent: Option<u64>, layout: TableLayout) -> SectorWriter {
    let mut w = SectorWriter::new(id, parent, bbox(-(id as f32) - 1.0, id as f32 + 1.0), layout);
    let t = w.table_mut();
    t.colors = vec![[255, 0, 0, 255]];
    t.normals = vec![Vec3::Z];
    t.set_scalars(Column::CenterX, vec![1.0, id as f32])
        .set_scalars(Column::CenterY, vec![2.0])
        .set_scalars(Column::CenterZ, vec![0.0])
        .set_scalars(Column::Height, vec![4.0])
        .set_scalars(Column::Radius, vec![1.5, 0.5]);

    let tree_index = id * 10;
    // treeIndex, color, center, normal, height, radiusA
    w.add_block(FileGeometryType::ClosedCylinder, &[id * 100], &[tree_index, 1, 0, 0, 0, 0, 0, 0])
        .expect("cylinder block");
    // treeIndex, color, center, radiusA
    w.add_block(FileGeometryType::Sphere, &[id * 100 + 1], &[tree_index + 1, 0, 1, 0, 0, 1])
        .expect("sphere block");
    w
}

fn scene_sectors() -> Vec<SectorWriter> {
    vec![
        sector(1, None, TableLayout::Compact),
        sector(2, Some(1), TableLayout::Compact),
        sector(3, Some(2), TableLayout::Compact),
        sector(4, Some(1), TableLayout::Compact),
    ]
}

#[test]
fn test_decode_hierarchy() {
    let bytes = write_sectors(&scene_sectors(), ByteOrder::Big).expect("encode");
    let scene = decode_file(&bytes, &DecoderConfig::default()).expect("decode");

    let root = scene.root();
    assert_eq!(root.id, 1);
    assert_eq!(root.path, "0/");
    assert!(root.is_root());
    assert_eq!(root.children.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 4]);

    let deep = scene.tree.get(3).expect("sector 3");
    assert_eq!(deep.parent_id, Some(2));
    assert_eq!(deep.depth, 2);
    assert_eq!(deep.path, "0/0/0/");
    assert_eq!(scene.tree.get(4).map(|s| s.path.as_str()), Some("0/1/"));
    assert_eq!(scene.tree.find_by_path("0/0/").map(|s| s.id), Some(2));

    assert_eq!(scene.tree.len(), 4);
    assert_eq!(scene.tree.max_depth(), 2);
    println!("{}", scene.stats);
}

#[test]
fn test_headers_and_bounds() {
    let bytes = write_sectors(&scene_sectors(), ByteOrder::Big).expect("encode");
    assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), SECTOR_MAGIC);

    let scene = decode_file(&bytes, &DecoderConfig::default()).expect("decode");
    for sector in &scene.tree {
        let b = sector.bbox;
        assert!(b.max.cmpgt(b.min).all(), "sector {} has inverted bounds {:?}", sector.id, b);
        assert_eq!(b.max, Vec3::splat(sector.id as f32 + 1.0));
    }
}

#[test]
fn test_groups_filled_to_capacity() {
    let bytes = write_sectors(&scene_sectors(), ByteOrder::Big).expect("encode");
    let scene = decode_file(&bytes, &DecoderConfig::default()).expect("decode");

    for sector in &scene.tree {
        let p = &sector.primitives;
        assert!(p.is_complete(), "sector {} groups not full: {:?}", sector.id, p.counts());
        assert_eq!(p.cones.count(), 1);
        assert_eq!(p.circles.count(), 2);
        assert_eq!(p.spherical_segments.count(), 1);
        assert_eq!(p.total_count(), 4);
        assert_eq!(sector.geometry_count(), 4);
    }
    assert_eq!(scene.stats.sectors, 4);
    assert_eq!(scene.stats.primitives.total(), 16);
    assert_eq!(scene.stats.primitives.get(RenderedKind::Circle), 8);
}

#[test]
fn test_data_maps_span_all_sectors() {
    let bytes = write_sectors(&scene_sectors(), ByteOrder::Big).expect("encode");
    let scene = decode_file(&bytes, &DecoderConfig::default()).expect("decode");

    assert_eq!(scene.maps.node_count(), 8);
    assert_eq!(scene.stats.nodes, 8);
    assert_eq!(scene.maps.node_id(30), Some(300));
    assert_eq!(scene.maps.node_id(41), Some(401));
    assert_eq!(scene.maps.tree_index(200), Some(20));
    assert_eq!(scene.maps.color(10), Some(Color::new(1.0, 0.0, 0.0)));
    // Sphere used color index 0.
    assert_eq!(scene.maps.color(11), Some(TableLayout::Compact.default_color()));
}

#[test]
fn test_parallel_matches_sequential() {
    let bytes = write_sectors(&scene_sectors(), ByteOrder::Big).expect("encode");
    let parallel = decode_file(&bytes, &DecoderConfig::default()).expect("parallel");
    let sequential = decode_file(&bytes, &DecoderConfig { parallel: false, ..DecoderConfig::default() })
        .expect("sequential");

    assert_eq!(parallel.root(), sequential.root());
    assert_eq!(parallel.stats, sequential.stats);
}

#[test]
fn test_little_endian_file() {
    let bytes = write_sectors(&scene_sectors(), ByteOrder::Little).expect("encode");
    let config = DecoderConfig { byte_order: ByteOrder::Little, ..DecoderConfig::default() };
    let scene = decode_file(&bytes, &config).expect("decode");
    assert_eq!(scene.tree.len(), 4);
    assert_eq!(scene.root().primitives.cones.center_a, vec![Vec3::new(1.0, 2.0, 2.0)]);

    // Same bytes read big-endian do not even yield a valid length.
    assert!(decode_file(&bytes, &DecoderConfig::default()).is_err());
}

#[test]
fn test_wide_layout_file() {
    let sectors = vec![sector(1, None, TableLayout::Wide), sector(2, Some(1), TableLayout::Wide)];
    let bytes = write_sectors(&sectors, ByteOrder::Big).expect("encode");
    let scene = decode_file(&bytes, &DecoderConfig::legacy()).expect("decode");

    let root = scene.root();
    assert_eq!(root.primitives.cones.count(), 1);
    // Raw color channels.
    assert_eq!(root.primitives.cones.color, vec![Color::new(255.0, 0.0, 0.0)]);
    assert_eq!(root.primitives.spherical_segments.color, vec![Color::new(42.0, 42.0, 42.0)]);
}

#[test]
fn test_unknown_parent_aborts() {
    let mut sectors = scene_sectors();
    sectors.push(sector(9, Some(77), TableLayout::Compact));
    let bytes = write_sectors(&sectors, ByteOrder::Big).expect("encode");

    match decode_file(&bytes, &DecoderConfig::default()) {
        Err(Error::Link(LinkError::UnknownParent { sector, parent, .. })) => assert_eq!((sector, parent), (9, 77)),
        other => panic!("expected unknown parent, got {other:?}"),
    }
}

#[test]
fn test_child_before_parent_aborts() {
    let sectors = vec![
        sector(1, None, TableLayout::Compact),
        sector(3, Some(2), TableLayout::Compact),
        sector(2, Some(1), TableLayout::Compact),
    ];
    let bytes = write_sectors(&sectors, ByteOrder::Big).expect("encode");
    let err = decode_file(&bytes, &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Link(LinkError::UnknownParent { sector: 3, parent: 2, .. })));
}

#[test]
fn test_duplicate_sector_id() {
    let sectors = vec![sector(1, None, TableLayout::Compact), sector(1, Some(1), TableLayout::Compact)];
    let bytes = write_sectors(&sectors, ByteOrder::Big).expect("encode");
    let err = decode_file(&bytes, &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Link(LinkError::DuplicateSector(1))));
}

#[test]
fn test_large_node_ids() {
    let big = (1u64 << 56) - 1;
    let mut w = SectorWriter::new(1u64 << 40, None, bbox(0.0, 1.0), TableLayout::Compact);
    w.table_mut()
        .set_scalars(Column::CenterX, vec![0.0])
        .set_scalars(Column::CenterY, vec![0.0])
        .set_scalars(Column::CenterZ, vec![0.0])
        .set_scalars(Column::Radius, vec![1.0]);
    w.add_block(FileGeometryType::Sphere, &[big], &[u32::MAX as u64 + 5, 0, 0, 0, 0, 0])
        .expect("sphere block");
    let bytes = write_sectors(&[w], ByteOrder::Big).expect("encode");

    let scene = decode_file(&bytes, &DecoderConfig::default()).expect("decode");
    assert_eq!(scene.root().id, 1u64 << 40);
    let spheres = &scene.root().primitives.spherical_segments;
    assert_eq!(spheres.node_id, vec![big]);
    assert_eq!(spheres.tree_index, vec![u32::MAX as u64 + 5]);
}

#[test]
fn test_open_file() {
    let temp = NamedTempFile::new().expect("Failed to create temp file");
    write_sectors_to_file(temp.path(), &scene_sectors(), ByteOrder::Big).expect("Failed to write sectors");

    let scene = i3df::open(temp.path(), &DecoderConfig::default()).expect("Failed to open file");
    assert_eq!(scene.tree.len(), 4);
    assert_eq!(scene.root().primitives.cones.count(), 1);
}

#[test]
fn test_open_missing_and_empty() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = i3df::open(dir.path().join("missing.i3d"), &DecoderConfig::default());
    assert!(matches!(missing, Err(Error::FileNotFound(_))));

    let empty = NamedTempFile::new().expect("Failed to create temp file");
    let err = i3df::open(empty.path(), &DecoderConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Link(LinkError::Empty)));
}

#[test]
fn test_sector_buffers_match_file() {
    let sectors = scene_sectors();
    let buffers: Vec<Vec<u8>> = sectors.iter().map(|s| s.encode(ByteOrder::Big).expect("encode")).collect();
    let slices: Vec<&[u8]> = buffers.iter().map(Vec::as_slice).collect();

    let from_buffers = decode_sector_buffers(&slices, &DecoderConfig::default()).expect("buffers");
    let from_file = decode_file(&buffers.concat(), &DecoderConfig::default()).expect("file");
    assert_eq!(from_buffers.root(), from_file.root());
}
