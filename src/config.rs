//! Decoder configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::util::{Color, Error, Result};

/// Byte order used for every multi-byte read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

/// On-disk table layout.
///
/// `Compact` uses single-byte type ids, attribute counts and value widths
/// and carries a `fileId` column. `Wide` is the older layout with 32-bit
/// fields and no `fileId` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableLayout {
    #[default]
    Compact,
    Wide,
}

impl TableLayout {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Wide => "wide",
        }
    }

    /// Color used when a primitive's color index is 0.
    pub const fn default_color(self) -> Color {
        match self {
            Self::Compact => Color::new(0.0, 0.0, 100.0),
            Self::Wide => Color::new(42.0, 42.0, 42.0),
        }
    }
}

/// How packed RGBA bytes become [`Color`] channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// channel / 255
    #[default]
    Normalized,
    /// channel as-is, 0..=255
    Raw,
}

/// Settings shared by every stage of a decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub byte_order: ByteOrder,
    pub layout: TableLayout,
    pub color_mode: ColorMode,
    /// Overrides the layout's default color.
    pub default_color: Option<Color>,
    /// Unpack sector geometry on the rayon pool.
    pub parallel: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::Big,
            layout: TableLayout::Compact,
            color_mode: ColorMode::Normalized,
            default_color: None,
            parallel: true,
        }
    }
}

impl DecoderConfig {
    /// Configuration for files in the older wide layout.
    pub fn legacy() -> Self {
        Self {
            layout: TableLayout::Wide,
            color_mode: ColorMode::Raw,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Effective color for index 0.
    #[inline]
    pub fn default_color(&self) -> Color {
        self.default_color.unwrap_or(self.layout.default_color())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = DecoderConfig::default();
        assert_eq!(c.byte_order, ByteOrder::Big);
        assert_eq!(c.layout, TableLayout::Compact);
        assert_eq!(c.default_color(), Color::new(0.0, 0.0, 100.0));

        let legacy = DecoderConfig::legacy();
        assert_eq!(legacy.color_mode, ColorMode::Raw);
        assert_eq!(legacy.default_color(), Color::new(42.0, 42.0, 42.0));
    }

    #[test]
    fn test_partial_json() {
        let c: DecoderConfig = serde_json::from_str(r#"{"layout":"wide","parallel":false}"#).unwrap();
        assert_eq!(c.layout, TableLayout::Wide);
        assert!(!c.parallel);
        assert_eq!(c.byte_order, ByteOrder::Big);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decoder.json");
        std::fs::write(&path, r#"{"byte_order":"little","default_color":{"r":1.0,"g":2.0,"b":3.0}}"#).unwrap();
        let c = DecoderConfig::from_json_file(&path).unwrap();
        assert_eq!(c.byte_order, ByteOrder::Little);
        assert_eq!(c.default_color(), Color::new(1.0, 2.0, 3.0));

        let missing = DecoderConfig::from_json_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(Error::FileNotFound(_))));

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(DecoderConfig::from_json_file(&path), Err(Error::Config(_))));
    }
}
