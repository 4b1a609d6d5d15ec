//! Logical properties and property-table columns.

use crate::binary::{COLOR_WIDTH, FILE_ID_WIDTH, NORMAL_WIDTH, SCALAR_WIDTH};
use crate::config::TableLayout;

/// One entry of a geometry type's attribute schema.
///
/// Each entry consumes [`Property::component_count`] values from the
/// attribute stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    TreeIndex,
    Color,
    Center,
    Normal,
    Delta,
    Height,
    RadiusA,
    RadiusB,
    Thickness,
    RotationAngle,
    ArcAngle,
    SlopeA,
    SlopeB,
    ZAngleA,
    ZAngleB,
    CapNormal,
    FileId,
    TriangleOffset,
    TriangleCount,
    Translation,
    Rotation3,
    Scale,
}

impl Property {
    /// Number of stream values this property consumes.
    pub const fn component_count(self) -> u32 {
        match self {
            Self::Center | Self::Delta | Self::Translation | Self::Rotation3 | Self::Scale => 3,
            _ => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::TreeIndex => "treeIndex",
            Self::Color => "color",
            Self::Center => "center",
            Self::Normal => "normal",
            Self::Delta => "delta",
            Self::Height => "height",
            Self::RadiusA => "radiusA",
            Self::RadiusB => "radiusB",
            Self::Thickness => "thickness",
            Self::RotationAngle => "rotationAngle",
            Self::ArcAngle => "arcAngle",
            Self::SlopeA => "slopeA",
            Self::SlopeB => "slopeB",
            Self::ZAngleA => "zAngleA",
            Self::ZAngleB => "zAngleB",
            Self::CapNormal => "capNormal",
            Self::FileId => "fileId",
            Self::TriangleOffset => "triangleOffset",
            Self::TriangleCount => "triangleCount",
            Self::Translation => "translation",
            Self::Rotation3 => "rotation3",
            Self::Scale => "scale",
        }
    }
}

/// Sum of component counts over a schema.
pub fn attribute_count(schema: &[Property]) -> u32 {
    schema.iter().map(|p| p.component_count()).sum()
}

/// A property-table slot, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Color,
    CenterX,
    CenterY,
    CenterZ,
    Normal,
    Delta,
    Height,
    Radius,
    Angle,
    TranslationX,
    TranslationY,
    TranslationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
    FileId,
}

/// Slot order of the compact layout.
pub const COMPACT_COLUMNS: [Column; 16] = [
    Column::Color,
    Column::CenterX,
    Column::CenterY,
    Column::CenterZ,
    Column::Normal,
    Column::Delta,
    Column::Height,
    Column::Radius,
    Column::Angle,
    Column::TranslationX,
    Column::TranslationY,
    Column::TranslationZ,
    Column::ScaleX,
    Column::ScaleY,
    Column::ScaleZ,
    Column::FileId,
];

impl Column {
    /// Slots present in `layout`, in file order.
    pub fn for_layout(layout: TableLayout) -> &'static [Column] {
        match layout {
            TableLayout::Compact => &COMPACT_COLUMNS,
            TableLayout::Wide => &COMPACT_COLUMNS[..15],
        }
    }

    /// Bytes per stored value.
    pub const fn width(self) -> u32 {
        match self {
            Self::Color => COLOR_WIDTH,
            Self::Normal => NORMAL_WIDTH,
            Self::FileId => FILE_ID_WIDTH,
            _ => SCALAR_WIDTH,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::CenterX => "centerX",
            Self::CenterY => "centerY",
            Self::CenterZ => "centerZ",
            Self::Normal => "normal",
            Self::Delta => "delta",
            Self::Height => "height",
            Self::Radius => "radius",
            Self::Angle => "angle",
            Self::TranslationX => "translationX",
            Self::TranslationY => "translationY",
            Self::TranslationZ => "translationZ",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::ScaleZ => "scaleZ",
            Self::FileId => "fileId",
        }
    }
}
