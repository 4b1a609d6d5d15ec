//! Mesh block unpacking.
//!
//! Both mesh kinds need two passes over their block: the first sizes the
//! per-file mapping tables, the second fills them.

use std::collections::BTreeMap;

use crate::geometry::{
    InstancedMesh, InstancedMeshCollection, InstancedMeshMapping, MergedMesh, MergedMeshMapping, PrimitiveBase,
};
use crate::util::{Mat4, Result, Vec3};

use super::maps::DataMaps;
use super::resolver::PropertyResolver;

/// Placement matrix `T(translation) * Rz * Ry * Rx * S(scale)`.
pub fn instance_transform(translation: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(translation)
        * Mat4::from_rotation_z(rotation.z)
        * Mat4::from_rotation_y(rotation.y)
        * Mat4::from_rotation_x(rotation.x)
        * Mat4::from_scale(scale)
}

/// Unpack a merged mesh block, one [`MergedMesh`] per file id in ascending order.
///
/// Triangle offsets are running sums of the triangle counts per file.
pub fn unpack_merged_meshes(resolver: &mut PropertyResolver<'_>, maps: &mut DataMaps) -> Result<Vec<MergedMesh>> {
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for _ in 0..resolver.instance_count() {
        let p = resolver.next_instance()?;
        *counts.entry(p.file_id).or_default() += 1;
    }
    resolver.rewind();

    let mut meshes: BTreeMap<u64, (MergedMesh, u64)> = counts
        .into_iter()
        .map(|(file_id, n)| (file_id, (MergedMesh::new(file_id, n), 0)))
        .collect();

    for _ in 0..resolver.instance_count() {
        let p = resolver.next_instance()?;
        let base = PrimitiveBase::new(p.node_id, p.tree_index, p.color);
        if let Some((mesh, offset)) = meshes.get_mut(&p.file_id) {
            mesh.mappings.add(MergedMeshMapping {
                base,
                triangle_offset: *offset,
                triangle_count: p.triangle_count,
            });
            *offset += p.triangle_count;
        }
        maps.insert(&base);
    }

    Ok(meshes.into_values().map(|(mesh, _)| mesh).collect())
}

/// Unpack an instanced mesh block.
///
/// Instances are grouped by file id, then by triangle offset. A group keeps
/// the triangle count of its first instance.
pub fn unpack_instanced_meshes(
    resolver: &mut PropertyResolver<'_>,
    maps: &mut DataMaps,
) -> Result<Vec<InstancedMesh>> {
    let mut counts: BTreeMap<(u64, u64), (u64, usize)> = BTreeMap::new();
    for _ in 0..resolver.instance_count() {
        let p = resolver.next_instance()?;
        counts.entry((p.file_id, p.triangle_offset)).or_insert((p.triangle_count, 0)).1 += 1;
    }
    resolver.rewind();

    let mut collections: BTreeMap<(u64, u64), InstancedMeshCollection> = counts
        .into_iter()
        .map(|(key, (triangle_count, n))| (key, InstancedMeshCollection::new(key.1, triangle_count, n)))
        .collect();

    for _ in 0..resolver.instance_count() {
        let p = resolver.next_instance()?;
        let base = PrimitiveBase::new(p.node_id, p.tree_index, p.color);
        if let Some(collection) = collections.get_mut(&(p.file_id, p.triangle_offset)) {
            collection.mappings.add(InstancedMeshMapping {
                base,
                transform: instance_transform(p.translation, p.rotation3, p.scale),
            });
        }
        maps.insert(&base);
    }

    let mut meshes: Vec<InstancedMesh> = Vec::new();
    for ((file_id, _), collection) in collections {
        match meshes.last_mut() {
            Some(mesh) if mesh.file_id == file_id => mesh.collections.push(collection),
            _ => meshes.push(InstancedMesh { file_id, collections: vec![collection] }),
        }
    }
    Ok(meshes)
}
