//! Attribute index resolution.
//!
//! A block's index stream is a flat interleaving of every instance's
//! attribute indices in schema order. Walking the schema is the only way to
//! split it back into properties.

use crate::binary::{FibonacciDecoder, NodeIdReader};
use crate::config::TableLayout;
use crate::geometry::{Column, FileGeometryType, Property};
use crate::util::{BoundsError, Color, Error, Result, Vec3};

use super::blocks::GeometryIndexBlock;
use super::properties::PropertyTable;

/// Physical values of one instance.
///
/// Fields outside the type's schema are left at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResolvedProperties {
    pub node_id: u64,
    pub tree_index: u64,
    pub color: Color,
    pub center: Vec3,
    pub normal: Vec3,
    pub delta: Vec3,
    pub height: f32,
    pub radius_a: f32,
    pub radius_b: f32,
    pub thickness: f32,
    pub rotation_angle: f32,
    pub arc_angle: f32,
    pub slope_a: f32,
    pub slope_b: f32,
    pub z_angle_a: f32,
    pub z_angle_b: f32,
    pub cap_normal: Vec3,
    pub file_id: u64,
    pub triangle_offset: u64,
    pub triangle_count: u64,
    pub translation: Vec3,
    pub rotation3: Vec3,
    pub scale: Vec3,
}

/// Sequential resolver over one block.
pub struct PropertyResolver<'a> {
    table: &'a PropertyTable,
    ty: FileGeometryType,
    schema: &'static [Property],
    node_ids: NodeIdReader<'a>,
    indices: FibonacciDecoder<'a>,
    count: u32,
    resolved: u32,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(table: &'a PropertyTable, block: &GeometryIndexBlock<'a>, layout: TableLayout) -> Self {
        Self {
            table,
            ty: block.ty,
            schema: block.ty.schema(layout),
            node_ids: block.node_id_reader(),
            indices: block.index_decoder(),
            count: block.count,
            resolved: 0,
        }
    }

    #[inline]
    pub fn geometry_type(&self) -> FileGeometryType {
        self.ty
    }

    /// Number of instances in the block.
    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.count
    }

    /// Restart both the node id array and the index stream.
    pub fn rewind(&mut self) {
        self.node_ids.rewind();
        self.indices.rewind();
        self.resolved = 0;
    }

    /// Resolve the next instance.
    pub fn next_instance(&mut self) -> Result<ResolvedProperties> {
        let mut out = ResolvedProperties {
            node_id: self.node_ids.next_node_id()?,
            ..ResolvedProperties::default()
        };
        for &property in self.schema {
            self.resolve(property, &mut out)?;
        }
        self.resolved += 1;
        Ok(out)
    }

    fn resolve(&mut self, property: Property, out: &mut ResolvedProperties) -> Result<()> {
        match property {
            Property::TreeIndex => out.tree_index = self.indices.next_value()?,
            Property::TriangleOffset => out.triangle_offset = self.indices.next_value()?,
            Property::TriangleCount => out.triangle_count = self.indices.next_value()?,
            Property::Color => {
                let index = self.indices.next_value()?;
                out.color = self.checked(self.table.color(index))?;
            }
            Property::Normal => out.normal = self.normal()?,
            Property::CapNormal => out.cap_normal = self.normal()?,
            Property::FileId => {
                let index = self.indices.next_value()?;
                out.file_id = self.checked(self.table.file_id(index))?;
            }
            Property::Center => out.center = self.vec3([Column::CenterX, Column::CenterY, Column::CenterZ])?,
            Property::Delta => out.delta = self.vec3([Column::Delta; 3])?,
            Property::Translation => {
                out.translation = self.vec3([Column::TranslationX, Column::TranslationY, Column::TranslationZ])?
            }
            Property::Scale => out.scale = self.vec3([Column::ScaleX, Column::ScaleY, Column::ScaleZ])?,
            Property::Rotation3 => out.rotation3 = self.vec3([Column::Angle; 3])?,
            Property::Height => out.height = self.scalar(Column::Height)?,
            Property::RadiusA => out.radius_a = self.scalar(Column::Radius)?,
            Property::RadiusB => out.radius_b = self.scalar(Column::Radius)?,
            Property::Thickness => out.thickness = self.scalar(Column::Radius)?,
            Property::RotationAngle => out.rotation_angle = self.scalar(Column::Angle)?,
            Property::ArcAngle => out.arc_angle = self.scalar(Column::Angle)?,
            Property::SlopeA => out.slope_a = self.scalar(Column::Angle)?,
            Property::SlopeB => out.slope_b = self.scalar(Column::Angle)?,
            Property::ZAngleA => out.z_angle_a = self.scalar(Column::Angle)?,
            Property::ZAngleB => out.z_angle_b = self.scalar(Column::Angle)?,
        }
        Ok(())
    }

    #[inline]
    fn checked<T>(&self, value: std::result::Result<T, BoundsError>) -> Result<T> {
        value.map_err(|kind| Error::bounds(self.indices.offset(), kind))
    }

    fn scalar(&mut self, column: Column) -> Result<f32> {
        let index = self.indices.next_value()?;
        self.checked(self.table.scalar(column, index))
    }

    fn normal(&mut self) -> Result<Vec3> {
        let index = self.indices.next_value()?;
        self.checked(self.table.normal(index))
    }

    fn vec3(&mut self, columns: [Column; 3]) -> Result<Vec3> {
        Ok(Vec3::new(self.scalar(columns[0])?, self.scalar(columns[1])?, self.scalar(columns[2])?))
    }
}

impl Iterator for PropertyResolver<'_> {
    type Item = Result<ResolvedProperties>;

    fn next(&mut self) -> Option<Self::Item> {
        (self.resolved < self.count).then(|| self.next_instance())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.count - self.resolved) as usize;
        (left, Some(left))
    }
}
