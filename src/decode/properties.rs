//! Per-sector property table.

use crate::binary::BitCursorReader;
use crate::config::{ColorMode, DecoderConfig, TableLayout};
use crate::geometry::Column;
use crate::util::{BoundsError, Color, Error, FormatError, Result, Vec3};

/// Value pools shared by every primitive of one sector.
///
/// Geometry blocks never store values directly, only indices into these
/// columns. Color index 0 is reserved for the default color.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyTable {
    pub colors: Vec<Color>,
    pub center_x: Vec<f32>,
    pub center_y: Vec<f32>,
    pub center_z: Vec<f32>,
    pub normals: Vec<Vec3>,
    pub delta: Vec<f32>,
    pub height: Vec<f32>,
    pub radius: Vec<f32>,
    pub angle: Vec<f32>,
    pub translation_x: Vec<f32>,
    pub translation_y: Vec<f32>,
    pub translation_z: Vec<f32>,
    pub scale_x: Vec<f32>,
    pub scale_y: Vec<f32>,
    pub scale_z: Vec<f32>,
    pub file_ids: Vec<u64>,
    pub default_color: Color,
}

#[inline]
fn lookup<T: Copy>(values: &[T], column: Column, index: u64) -> std::result::Result<T, BoundsError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| values.get(i))
        .copied()
        .ok_or(BoundsError::PropertyIndex { property: column.name(), index, len: values.len() })
}

impl PropertyTable {
    /// Table of a sector that declares no property arrays.
    pub fn empty(default_color: Color) -> Self {
        Self {
            colors: vec![default_color],
            default_color,
            ..Self::default()
        }
    }

    /// Resolve a color index: 0 is the default color, `k` is entry `k - 1`.
    pub fn color(&self, index: u64) -> std::result::Result<Color, BoundsError> {
        match index {
            0 => Ok(self.default_color),
            k => lookup(&self.colors, Column::Color, k - 1),
        }
    }

    pub fn normal(&self, index: u64) -> std::result::Result<Vec3, BoundsError> {
        lookup(&self.normals, Column::Normal, index)
    }

    pub fn file_id(&self, index: u64) -> std::result::Result<u64, BoundsError> {
        lookup(&self.file_ids, Column::FileId, index)
    }

    /// Resolve an index into one of the `f32` columns.
    pub fn scalar(&self, column: Column, index: u64) -> std::result::Result<f32, BoundsError> {
        let values = match column {
            Column::CenterX => &self.center_x,
            Column::CenterY => &self.center_y,
            Column::CenterZ => &self.center_z,
            Column::Delta => &self.delta,
            Column::Height => &self.height,
            Column::Radius => &self.radius,
            Column::Angle => &self.angle,
            Column::TranslationX => &self.translation_x,
            Column::TranslationY => &self.translation_y,
            Column::TranslationZ => &self.translation_z,
            Column::ScaleX => &self.scale_x,
            Column::ScaleY => &self.scale_y,
            Column::ScaleZ => &self.scale_z,
            Column::Color | Column::Normal | Column::FileId => {
                return Err(BoundsError::PropertyIndex { property: column.name(), index, len: 0 })
            }
        };
        lookup(values, column, index)
    }

    /// Number of values stored in `column`.
    pub fn len(&self, column: Column) -> usize {
        match column {
            Column::Color => self.colors.len(),
            Column::Normal => self.normals.len(),
            Column::FileId => self.file_ids.len(),
            Column::CenterX => self.center_x.len(),
            Column::CenterY => self.center_y.len(),
            Column::CenterZ => self.center_z.len(),
            Column::Delta => self.delta.len(),
            Column::Height => self.height.len(),
            Column::Radius => self.radius.len(),
            Column::Angle => self.angle.len(),
            Column::TranslationX => self.translation_x.len(),
            Column::TranslationY => self.translation_y.len(),
            Column::TranslationZ => self.translation_z.len(),
            Column::ScaleX => self.scale_x.len(),
            Column::ScaleY => self.scale_y.len(),
            Column::ScaleZ => self.scale_z.len(),
        }
    }

    fn scalar_column_mut(&mut self, column: Column) -> Option<&mut Vec<f32>> {
        Some(match column {
            Column::CenterX => &mut self.center_x,
            Column::CenterY => &mut self.center_y,
            Column::CenterZ => &mut self.center_z,
            Column::Delta => &mut self.delta,
            Column::Height => &mut self.height,
            Column::Radius => &mut self.radius,
            Column::Angle => &mut self.angle,
            Column::TranslationX => &mut self.translation_x,
            Column::TranslationY => &mut self.translation_y,
            Column::TranslationZ => &mut self.translation_z,
            Column::ScaleX => &mut self.scale_x,
            Column::ScaleY => &mut self.scale_y,
            Column::ScaleZ => &mut self.scale_z,
            Column::Color | Column::Normal | Column::FileId => return None,
        })
    }
}

fn read_width(reader: &mut BitCursorReader<'_>, layout: TableLayout) -> Result<u32> {
    match layout {
        TableLayout::Compact => reader.read_u8().map(u32::from),
        TableLayout::Wide => reader.read_u32(),
    }
}

fn decode_color(rgba: &[u8], mode: ColorMode) -> Color {
    let divisor = match mode {
        ColorMode::Normalized => 255.0,
        ColorMode::Raw => 1.0,
    };
    Color::new(rgba[0] as f32 / divisor, rgba[1] as f32 / divisor, rgba[2] as f32 / divisor)
}

/// Read `array_count` property clusters.
///
/// `array_count` must be 0 (no table) or exactly the layout's slot count.
pub fn load_property_table(
    reader: &mut BitCursorReader<'_>,
    array_count: u32,
    config: &DecoderConfig,
) -> Result<PropertyTable> {
    let default_color = config.default_color();
    if array_count == 0 {
        return Ok(PropertyTable::empty(default_color));
    }

    let columns = Column::for_layout(config.layout);
    if array_count as usize != columns.len() {
        return Err(Error::format(
            reader.offset(),
            FormatError::ArrayCountMismatch { expected: columns.len() as u32, actual: array_count },
        ));
    }

    let mut table = PropertyTable { default_color, ..PropertyTable::default() };
    for &column in columns {
        let count = reader.read_u32()? as usize;
        let width_offset = reader.offset();
        let width = read_width(reader, config.layout)?;
        if width != column.width() {
            return Err(Error::format(
                width_offset,
                FormatError::WidthMismatch { property: column.name(), expected: column.width(), actual: width },
            ));
        }

        match column {
            Column::Color => {
                let len = count.checked_mul(4).unwrap_or(usize::MAX);
                let bytes = reader.take(len)?;
                table.colors = bytes.chunks_exact(4).map(|c| decode_color(c, config.color_mode)).collect();
            }
            Column::Normal => {
                let floats = reader.read_f32_array(count.checked_mul(3).unwrap_or(usize::MAX))?;
                table.normals = floats.chunks_exact(3).map(|c| Vec3::new(c[0], c[1], c[2])).collect();
            }
            Column::FileId => {
                let mut ids = Vec::with_capacity(count.min(reader.remaining() / 8));
                for _ in 0..count {
                    ids.push(reader.read_u64()?);
                }
                table.file_ids = ids;
            }
            other => {
                let values = reader.read_f32_array(count)?;
                if let Some(slot) = table.scalar_column_mut(other) {
                    *slot = values;
                }
            }
        }
        tracing::trace!(column = column.name(), count, "property column");
    }
    Ok(table)
}
