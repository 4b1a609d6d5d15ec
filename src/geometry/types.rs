//! On-disk geometry types and the rendered shapes they expand into.

use crate::config::TableLayout;
use crate::util::FormatError;

use super::schema::Property;
use Property::*;

/// Renderer-facing primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderedKind {
    Box,
    Circle,
    Cone,
    EccentricCone,
    EllipsoidSegment,
    GeneralCylinder,
    GeneralRing,
    Nut,
    Quad,
    SphericalSegment,
    TorusSegment,
    Trapezium,
}

impl RenderedKind {
    pub const ALL: [RenderedKind; 12] = [
        Self::Box,
        Self::Circle,
        Self::Cone,
        Self::EccentricCone,
        Self::EllipsoidSegment,
        Self::GeneralCylinder,
        Self::GeneralRing,
        Self::Nut,
        Self::Quad,
        Self::SphericalSegment,
        Self::TorusSegment,
        Self::Trapezium,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Circle => "Circle",
            Self::Cone => "Cone",
            Self::EccentricCone => "EccentricCone",
            Self::EllipsoidSegment => "EllipsoidSegment",
            Self::GeneralCylinder => "GeneralCylinder",
            Self::GeneralRing => "GeneralRing",
            Self::Nut => "Nut",
            Self::Quad => "Quad",
            Self::SphericalSegment => "SphericalSegment",
            Self::TorusSegment => "TorusSegment",
            Self::Trapezium => "Trapezium",
        }
    }

    /// Position in [`RenderedKind::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Geometry type as stored in a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileGeometryType {
    Box,
    Circle,
    ClosedCone,
    ClosedCylinder,
    ClosedEccentricCone,
    ClosedEllipsoidSegment,
    ClosedExtrudedRingSegment,
    ClosedSphericalSegment,
    ClosedTorusSegment,
    Ellipsoid,
    ExtrudedRing,
    Nut,
    OpenCone,
    OpenCylinder,
    OpenEccentricCone,
    OpenEllipsoidSegment,
    OpenExtrudedRingSegment,
    OpenSphericalSegment,
    OpenTorusSegment,
    Ring,
    Sphere,
    Torus,
    OpenGeneralCylinder,
    ClosedGeneralCylinder,
    SolidOpenGeneralCylinder,
    SolidClosedGeneralCylinder,
    OpenGeneralCone,
    ClosedGeneralCone,
    SolidOpenGeneralCone,
    SolidClosedGeneralCone,
    MergedMesh,
    InstancedMesh,
}

const BOX: &[Property] = &[TreeIndex, Color, Center, Normal, Delta, RotationAngle];
const CIRCLE: &[Property] = &[TreeIndex, Color, Center, Normal, RadiusA];
const CONE: &[Property] = &[TreeIndex, Color, Center, Normal, Height, RadiusA, RadiusB];
const CYLINDER: &[Property] = &[TreeIndex, Color, Center, Normal, Height, RadiusA];
const ECCENTRIC_CONE: &[Property] = &[TreeIndex, Color, Center, Normal, Height, RadiusA, RadiusB, CapNormal];
const EXTRUDED_RING_SEGMENT: &[Property] =
    &[TreeIndex, Color, Center, Normal, Height, RadiusA, RadiusB, RotationAngle, ArcAngle];
const SPHERICAL_SEGMENT: &[Property] = &[TreeIndex, Color, Center, Normal, Height, RadiusA];
const TORUS_SEGMENT: &[Property] = &[TreeIndex, Color, Center, Normal, RadiusA, RadiusB, RotationAngle, ArcAngle];
const ELLIPSOID: &[Property] = &[TreeIndex, Color, Center, Normal, RadiusA, RadiusB];
const NUT: &[Property] = &[TreeIndex, Color, Center, Normal, Height, RadiusA, RotationAngle];
const SPHERE: &[Property] = &[TreeIndex, Color, Center, RadiusA];
const GENERAL_CYLINDER: &[Property] = &[
    TreeIndex, Color, Center, Normal, Height, RadiusA, RotationAngle, ArcAngle, SlopeA, SlopeB, ZAngleA, ZAngleB,
];
const SOLID_GENERAL_CYLINDER: &[Property] = &[
    TreeIndex, Color, Center, Normal, Height, RadiusA, Thickness, RotationAngle, ArcAngle, SlopeA, SlopeB, ZAngleA,
    ZAngleB,
];
const LEGACY_GENERAL_CYLINDER: &[Property] = &[
    TreeIndex, Color, Center, Normal, Height, RadiusA, RadiusB, Thickness, RotationAngle, ArcAngle, SlopeA, SlopeB,
    ZAngleA, ZAngleB,
];
const GENERAL_CONE: &[Property] = &[
    TreeIndex, Color, Center, Normal, Height, RadiusA, RadiusB, RotationAngle, ArcAngle, SlopeA, SlopeB, ZAngleA,
    ZAngleB,
];
const SOLID_GENERAL_CONE: &[Property] = &[
    TreeIndex, Color, Center, Normal, Height, RadiusA, RadiusB, Thickness, RotationAngle, ArcAngle, SlopeA, SlopeB,
    ZAngleA, ZAngleB,
];
const MERGED_MESH: &[Property] = &[TreeIndex, FileId, TriangleCount, Color];
const INSTANCED_MESH: &[Property] =
    &[TreeIndex, FileId, TriangleOffset, TriangleCount, Color, Translation, Rotation3, Scale];

use RenderedKind as R;

impl FileGeometryType {
    pub const ALL: [FileGeometryType; 32] = [
        Self::Box,
        Self::Circle,
        Self::ClosedCone,
        Self::ClosedCylinder,
        Self::ClosedEccentricCone,
        Self::ClosedEllipsoidSegment,
        Self::ClosedExtrudedRingSegment,
        Self::ClosedSphericalSegment,
        Self::ClosedTorusSegment,
        Self::Ellipsoid,
        Self::ExtrudedRing,
        Self::Nut,
        Self::OpenCone,
        Self::OpenCylinder,
        Self::OpenEccentricCone,
        Self::OpenEllipsoidSegment,
        Self::OpenExtrudedRingSegment,
        Self::OpenSphericalSegment,
        Self::OpenTorusSegment,
        Self::Ring,
        Self::Sphere,
        Self::Torus,
        Self::OpenGeneralCylinder,
        Self::ClosedGeneralCylinder,
        Self::SolidOpenGeneralCylinder,
        Self::SolidClosedGeneralCylinder,
        Self::OpenGeneralCone,
        Self::ClosedGeneralCone,
        Self::SolidOpenGeneralCone,
        Self::SolidClosedGeneralCone,
        Self::MergedMesh,
        Self::InstancedMesh,
    ];

    /// Map a block header type id.
    pub fn from_id(id: u32, layout: TableLayout) -> Result<Self, FormatError> {
        let ty = match (id, layout) {
            (1, _) => Self::Box,
            (2, _) => Self::Circle,
            (3, _) => Self::ClosedCone,
            (4, _) => Self::ClosedCylinder,
            (5, _) => Self::ClosedEccentricCone,
            (6, _) => Self::ClosedEllipsoidSegment,
            (7, _) => Self::ClosedExtrudedRingSegment,
            (8, TableLayout::Wide) => Self::ClosedGeneralCylinder,
            (9, _) => Self::ClosedSphericalSegment,
            (10, _) => Self::ClosedTorusSegment,
            (11, _) => Self::Ellipsoid,
            (12, _) => Self::ExtrudedRing,
            (13, _) => Self::Nut,
            (14, _) => Self::OpenCone,
            (15, _) => Self::OpenCylinder,
            (16, _) => Self::OpenEccentricCone,
            (17, _) => Self::OpenEllipsoidSegment,
            (18, _) => Self::OpenExtrudedRingSegment,
            (19, TableLayout::Wide) => Self::OpenGeneralCylinder,
            (20, _) => Self::OpenSphericalSegment,
            (21, _) => Self::OpenTorusSegment,
            (22, _) => Self::Ring,
            (23, _) => Self::Sphere,
            (24, _) => Self::Torus,
            (30, TableLayout::Compact) => Self::OpenGeneralCylinder,
            (31, TableLayout::Compact) => Self::ClosedGeneralCylinder,
            (32, TableLayout::Compact) => Self::SolidOpenGeneralCylinder,
            (33, TableLayout::Compact) => Self::SolidClosedGeneralCylinder,
            (34, TableLayout::Compact) => Self::OpenGeneralCone,
            (35, TableLayout::Compact) => Self::ClosedGeneralCone,
            (36, TableLayout::Compact) => Self::SolidOpenGeneralCone,
            (37, TableLayout::Compact) => Self::SolidClosedGeneralCone,
            (100, TableLayout::Compact) => Self::MergedMesh,
            (101, TableLayout::Compact) => Self::InstancedMesh,
            (100, TableLayout::Wide) => {
                return Err(FormatError::UnsupportedGeometryType { name: "MergedMesh", layout: layout.name() })
            }
            (101, TableLayout::Wide) => {
                return Err(FormatError::UnsupportedGeometryType { name: "InstancedMesh", layout: layout.name() })
            }
            _ => return Err(FormatError::UnknownGeometryType(id)),
        };
        Ok(ty)
    }

    /// Block header id for this type, if `layout` can store it.
    pub fn id(self, layout: TableLayout) -> Option<u32> {
        let id = match self {
            Self::Box => 1,
            Self::Circle => 2,
            Self::ClosedCone => 3,
            Self::ClosedCylinder => 4,
            Self::ClosedEccentricCone => 5,
            Self::ClosedEllipsoidSegment => 6,
            Self::ClosedExtrudedRingSegment => 7,
            Self::ClosedSphericalSegment => 9,
            Self::ClosedTorusSegment => 10,
            Self::Ellipsoid => 11,
            Self::ExtrudedRing => 12,
            Self::Nut => 13,
            Self::OpenCone => 14,
            Self::OpenCylinder => 15,
            Self::OpenEccentricCone => 16,
            Self::OpenEllipsoidSegment => 17,
            Self::OpenExtrudedRingSegment => 18,
            Self::OpenSphericalSegment => 20,
            Self::OpenTorusSegment => 21,
            Self::Ring => 22,
            Self::Sphere => 23,
            Self::Torus => 24,
            Self::OpenGeneralCylinder => match layout {
                TableLayout::Compact => 30,
                TableLayout::Wide => 19,
            },
            Self::ClosedGeneralCylinder => match layout {
                TableLayout::Compact => 31,
                TableLayout::Wide => 8,
            },
            other => {
                if layout == TableLayout::Wide {
                    return None;
                }
                match other {
                    Self::SolidOpenGeneralCylinder => 32,
                    Self::SolidClosedGeneralCylinder => 33,
                    Self::OpenGeneralCone => 34,
                    Self::ClosedGeneralCone => 35,
                    Self::SolidOpenGeneralCone => 36,
                    Self::SolidClosedGeneralCone => 37,
                    Self::MergedMesh => 100,
                    _ => 101,
                }
            }
        };
        Some(id)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Box => "Box",
            Self::Circle => "Circle",
            Self::ClosedCone => "ClosedCone",
            Self::ClosedCylinder => "ClosedCylinder",
            Self::ClosedEccentricCone => "ClosedEccentricCone",
            Self::ClosedEllipsoidSegment => "ClosedEllipsoidSegment",
            Self::ClosedExtrudedRingSegment => "ClosedExtrudedRingSegment",
            Self::ClosedSphericalSegment => "ClosedSphericalSegment",
            Self::ClosedTorusSegment => "ClosedTorusSegment",
            Self::Ellipsoid => "Ellipsoid",
            Self::ExtrudedRing => "ExtrudedRing",
            Self::Nut => "Nut",
            Self::OpenCone => "OpenCone",
            Self::OpenCylinder => "OpenCylinder",
            Self::OpenEccentricCone => "OpenEccentricCone",
            Self::OpenEllipsoidSegment => "OpenEllipsoidSegment",
            Self::OpenExtrudedRingSegment => "OpenExtrudedRingSegment",
            Self::OpenSphericalSegment => "OpenSphericalSegment",
            Self::OpenTorusSegment => "OpenTorusSegment",
            Self::Ring => "Ring",
            Self::Sphere => "Sphere",
            Self::Torus => "Torus",
            Self::OpenGeneralCylinder => "OpenGeneralCylinder",
            Self::ClosedGeneralCylinder => "ClosedGeneralCylinder",
            Self::SolidOpenGeneralCylinder => "SolidOpenGeneralCylinder",
            Self::SolidClosedGeneralCylinder => "SolidClosedGeneralCylinder",
            Self::OpenGeneralCone => "OpenGeneralCone",
            Self::ClosedGeneralCone => "ClosedGeneralCone",
            Self::SolidOpenGeneralCone => "SolidOpenGeneralCone",
            Self::SolidClosedGeneralCone => "SolidClosedGeneralCone",
            Self::MergedMesh => "MergedMesh",
            Self::InstancedMesh => "InstancedMesh",
        }
    }

    #[inline]
    pub const fn is_mesh(self) -> bool {
        matches!(self, Self::MergedMesh | Self::InstancedMesh)
    }

    /// Ordered attribute schema.
    pub fn schema(self, layout: TableLayout) -> &'static [Property] {
        match self {
            Self::Box => BOX,
            Self::Circle => CIRCLE,
            Self::ClosedCone | Self::OpenCone => CONE,
            Self::ClosedCylinder | Self::OpenCylinder => CYLINDER,
            Self::ClosedEccentricCone | Self::OpenEccentricCone => ECCENTRIC_CONE,
            Self::ClosedEllipsoidSegment | Self::OpenEllipsoidSegment => CONE,
            Self::ClosedExtrudedRingSegment | Self::OpenExtrudedRingSegment => EXTRUDED_RING_SEGMENT,
            Self::ClosedSphericalSegment | Self::OpenSphericalSegment => SPHERICAL_SEGMENT,
            Self::ClosedTorusSegment | Self::OpenTorusSegment => TORUS_SEGMENT,
            Self::Ellipsoid | Self::Ring | Self::Torus => ELLIPSOID,
            Self::ExtrudedRing => CONE,
            Self::Nut => NUT,
            Self::Sphere => SPHERE,
            Self::OpenGeneralCylinder | Self::ClosedGeneralCylinder => match layout {
                TableLayout::Compact => GENERAL_CYLINDER,
                TableLayout::Wide => LEGACY_GENERAL_CYLINDER,
            },
            Self::SolidOpenGeneralCylinder | Self::SolidClosedGeneralCylinder => SOLID_GENERAL_CYLINDER,
            Self::OpenGeneralCone | Self::ClosedGeneralCone => GENERAL_CONE,
            Self::SolidOpenGeneralCone | Self::SolidClosedGeneralCone => SOLID_GENERAL_CONE,
            Self::MergedMesh => MERGED_MESH,
            Self::InstancedMesh => INSTANCED_MESH,
        }
    }

    /// Rendered primitives emitted per instance. Empty for mesh types.
    pub fn emissions(self) -> &'static [(RenderedKind, u32)] {
        match self {
            Self::Box => &[(R::Box, 1)],
            Self::Circle => &[(R::Circle, 1)],
            Self::ClosedCone | Self::ClosedCylinder => &[(R::Circle, 2), (R::Cone, 1)],
            Self::ClosedEccentricCone => &[(R::Circle, 2), (R::EccentricCone, 1)],
            Self::ClosedEllipsoidSegment => &[(R::EllipsoidSegment, 1), (R::Circle, 1)],
            Self::ClosedExtrudedRingSegment => &[(R::Cone, 2), (R::GeneralRing, 2), (R::Quad, 2)],
            Self::ClosedSphericalSegment => &[(R::Circle, 1), (R::SphericalSegment, 1)],
            Self::ClosedTorusSegment | Self::OpenTorusSegment | Self::Torus => &[(R::TorusSegment, 1)],
            Self::Ellipsoid | Self::OpenEllipsoidSegment => &[(R::EllipsoidSegment, 1)],
            Self::ExtrudedRing | Self::OpenExtrudedRingSegment => &[(R::Cone, 2), (R::GeneralRing, 2)],
            Self::Nut => &[(R::Nut, 1)],
            Self::OpenCone | Self::OpenCylinder => &[(R::Cone, 1)],
            Self::OpenEccentricCone => &[(R::EccentricCone, 1)],
            Self::OpenSphericalSegment | Self::Sphere => &[(R::SphericalSegment, 1)],
            Self::Ring => &[(R::GeneralRing, 1)],
            Self::OpenGeneralCylinder => &[(R::GeneralCylinder, 1)],
            Self::ClosedGeneralCylinder => &[(R::GeneralCylinder, 1), (R::GeneralRing, 2)],
            Self::SolidOpenGeneralCylinder => &[(R::GeneralCylinder, 2), (R::GeneralRing, 2)],
            Self::SolidClosedGeneralCylinder => &[(R::GeneralCylinder, 2), (R::GeneralRing, 2), (R::Trapezium, 2)],
            Self::OpenGeneralCone => &[(R::Cone, 1)],
            Self::ClosedGeneralCone => &[(R::Cone, 1), (R::GeneralRing, 2)],
            Self::SolidOpenGeneralCone => &[(R::Cone, 2), (R::GeneralRing, 2)],
            Self::SolidClosedGeneralCone => &[(R::Cone, 2), (R::GeneralRing, 2), (R::Trapezium, 2)],
            Self::MergedMesh | Self::InstancedMesh => &[],
        }
    }
}

impl std::fmt::Display for FileGeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::schema::attribute_count;

    #[test]
    fn test_id_roundtrip_compact() {
        for ty in FileGeometryType::ALL {
            let id = ty.id(TableLayout::Compact).unwrap();
            assert_eq!(FileGeometryType::from_id(id, TableLayout::Compact).unwrap(), ty);
        }
    }

    #[test]
    fn test_wide_ids() {
        assert_eq!(
            FileGeometryType::from_id(8, TableLayout::Wide).unwrap(),
            FileGeometryType::ClosedGeneralCylinder
        );
        assert_eq!(
            FileGeometryType::from_id(19, TableLayout::Wide).unwrap(),
            FileGeometryType::OpenGeneralCylinder
        );
        assert_eq!(
            FileGeometryType::from_id(8, TableLayout::Compact),
            Err(FormatError::UnknownGeometryType(8))
        );
        assert_eq!(FileGeometryType::from_id(31, TableLayout::Wide), Err(FormatError::UnknownGeometryType(31)));
        assert!(matches!(
            FileGeometryType::from_id(100, TableLayout::Wide),
            Err(FormatError::UnsupportedGeometryType { name: "MergedMesh", .. })
        ));
        assert_eq!(FileGeometryType::InstancedMesh.id(TableLayout::Wide), None);
    }

    #[test]
    fn test_schema_attribute_counts() {
        let c = TableLayout::Compact;
        assert_eq!(attribute_count(FileGeometryType::Box.schema(c)), 10);
        assert_eq!(attribute_count(FileGeometryType::Sphere.schema(c)), 6);
        assert_eq!(attribute_count(FileGeometryType::InstancedMesh.schema(c)), 14);
        assert_eq!(attribute_count(FileGeometryType::MergedMesh.schema(c)), 4);
        assert_eq!(attribute_count(FileGeometryType::ClosedGeneralCylinder.schema(TableLayout::Wide)), 16);
        assert_eq!(attribute_count(FileGeometryType::ClosedGeneralCylinder.schema(c)), 14);
    }

    #[test]
    fn test_mesh_types_emit_nothing() {
        for ty in FileGeometryType::ALL {
            assert_eq!(ty.is_mesh(), ty.emissions().is_empty(), "{ty}");
        }
    }

    #[test]
    fn test_rendered_kind_index() {
        for (i, kind) in RenderedKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
