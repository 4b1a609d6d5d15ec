//! End-to-end primitive reconstruction through encoded sectors.

use std::f32::consts::TAU;

use i3df::binary::{write_sectors, SectorWriter};
use i3df::geometry::{attribute_count, Column, RenderedCounts};
use i3df::prelude::*;

fn writer() -> SectorWriter {
    SectorWriter::new(1, None, BBox3f::new(Vec3::splat(-10.0), Vec3::splat(10.0)), TableLayout::Compact)
}

fn decode_root(w: &SectorWriter) -> Sector {
    let bytes = write_sectors(std::slice::from_ref(w), ByteOrder::Big).expect("encode");
    decode_sector(&bytes, &DecoderConfig::default()).expect("decode")
}

#[test]
fn test_closed_cylinder_example() {
    let (h, r) = (3.0, 0.75);
    let mut w = writer();
    w.table_mut()
        .set_scalars(Column::CenterX, vec![1.0])
        .set_scalars(Column::CenterY, vec![2.0])
        .set_scalars(Column::CenterZ, vec![0.0])
        .set_scalars(Column::Height, vec![h])
        .set_scalars(Column::Radius, vec![r]);
    w.table_mut().normals = vec![Vec3::Z];
    w.add_block(FileGeometryType::ClosedCylinder, &[55], &[3, 0, 0, 0, 0, 0, 0, 0])
        .expect("block");

    let root = decode_root(&w);
    let p = &root.primitives;
    assert_eq!(p.cones.count(), 1);
    let cone = p.cones.get(0).expect("cone");
    assert_eq!(cone.center_a, Vec3::new(1.0, 2.0, h / 2.0));
    assert_eq!(cone.center_b, Vec3::new(1.0, 2.0, -h / 2.0));
    assert_eq!((cone.radius_a, cone.radius_b), (r, r));
    assert_eq!(cone.arc_angle, TAU);
    assert_eq!(cone.base.node_id, 55);
    assert_eq!(cone.base.tree_index, 3);

    assert_eq!(p.circles.center, vec![cone.center_a, cone.center_b]);
    assert_eq!(p.circles.radius, vec![r, r]);
    assert_eq!(p.total_count(), 3);
}

#[test]
fn test_closed_cone_emissions() {
    let mut w = writer();
    w.table_mut()
        .set_scalars(Column::CenterX, vec![0.0])
        .set_scalars(Column::CenterY, vec![0.0])
        .set_scalars(Column::CenterZ, vec![0.0])
        .set_scalars(Column::Height, vec![2.0])
        .set_scalars(Column::Radius, vec![1.0, 0.5]);
    w.table_mut().normals = vec![Vec3::X];
    // Two instances: treeIndex, color, center, normal, height, radiusA, radiusB
    w.add_block(
        FileGeometryType::ClosedCone,
        &[1, 2],
        &[0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 1, 0],
    )
    .expect("block");

    let root = decode_root(&w);
    let p = &root.primitives;
    assert_eq!(p.cones.count(), 2);
    assert_eq!(p.circles.count(), 4);
    assert_eq!(p.cones.radius_a, vec![1.0, 0.5]);
    assert_eq!(p.cones.radius_b, vec![0.5, 1.0]);
    assert_eq!(p.cones.center_a[0], Vec3::new(1.0, 0.0, 0.0));
    assert!(p.is_complete());
}

#[test]
fn test_every_primitive_type_fills_its_groups() {
    let mut w = writer();
    w.table_mut()
        .set_scalars(Column::CenterX, vec![0.0])
        .set_scalars(Column::CenterY, vec![0.0])
        .set_scalars(Column::CenterZ, vec![0.0])
        .set_scalars(Column::Delta, vec![1.0])
        .set_scalars(Column::Height, vec![2.0])
        .set_scalars(Column::Radius, vec![1.0])
        .set_scalars(Column::Angle, vec![0.3]);
    w.table_mut().normals = vec![Vec3::Z];

    let mut expected = RenderedCounts::default();
    for ty in FileGeometryType::ALL.into_iter().filter(|t| !t.is_mesh()) {
        let attrs = attribute_count(ty.schema(TableLayout::Compact)) as usize;
        w.add_block(ty, &[7, 8], &vec![0; attrs * 2]).expect("block");
        for &(kind, n) in ty.emissions() {
            expected.add(kind, n as usize * 2);
        }
    }

    let root = decode_root(&w);
    assert_eq!(root.primitives.counts(), expected);
    assert!(root.primitives.is_complete());
}

#[test]
fn test_merged_mesh_sector() {
    let mut w = writer();
    w.table_mut().file_ids = vec![42, 7];
    // treeIndex, fileId, triangleCount, color
    w.add_block(FileGeometryType::MergedMesh, &[1, 2, 3], &[1, 0, 10, 0, 2, 1, 3, 0, 3, 0, 5, 0])
        .expect("block");

    let root = decode_root(&w);
    let meshes = &root.merged_meshes.meshes;
    assert_eq!(meshes.iter().map(|m| m.file_id).collect::<Vec<_>>(), vec![7, 42]);
    assert_eq!(meshes[1].mappings.triangle_offset, vec![0, 10]);
    assert_eq!(meshes[1].triangle_count(), 15);
    assert_eq!(root.merged_meshes.mapping_count(), 3);
    assert!(root.merged_meshes.is_complete());
    assert_eq!(root.primitives.total_count(), 0);
    assert_eq!(root.geometry_count(), 3);
}

#[test]
fn test_instanced_mesh_sector() {
    let mut w = writer();
    w.table_mut().file_ids = vec![9];
    w.table_mut()
        .set_scalars(Column::TranslationX, vec![0.0, 5.0])
        .set_scalars(Column::TranslationY, vec![0.0])
        .set_scalars(Column::TranslationZ, vec![0.0])
        .set_scalars(Column::Angle, vec![0.0])
        .set_scalars(Column::ScaleX, vec![1.0])
        .set_scalars(Column::ScaleY, vec![1.0])
        .set_scalars(Column::ScaleZ, vec![1.0]);
    // treeIndex, fileId, triangleOffset, triangleCount, color, translation, rotation3, scale
    #[rustfmt::skip]
    let values = [
        1, 0, 0, 12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        2, 0, 0, 12, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0,
    ];
    w.add_block(FileGeometryType::InstancedMesh, &[1, 2], &values).expect("block");

    let root = decode_root(&w);
    let mesh = &root.instanced_meshes.meshes[0];
    assert_eq!(mesh.file_id, 9);
    assert_eq!(mesh.collections.len(), 1);
    let placed = mesh.collections[0].mappings.transform[1].transform_point3(Vec3::ZERO);
    assert_eq!(placed, Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(root.instanced_meshes.mapping_count(), 2);
}
