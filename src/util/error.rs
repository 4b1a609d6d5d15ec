//! Error types for the sector decoder.
//!
//! Decoding is all-or-nothing: any of these aborts the whole file, because
//! every later block offset depends on the bytes consumed before it.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for decode operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Structurally invalid data (bad magic, width or count mismatch, unknown type).
    #[error("Format error at offset {offset}{}: {kind}", SectorSuffix(.sector))]
    Format {
        offset: u64,
        sector: Option<u64>,
        kind: FormatError,
    },

    /// A read went past the range it was allowed to touch.
    #[error("Bounds error at offset {offset}{}: {kind}", SectorSuffix(.sector))]
    Bounds {
        offset: u64,
        sector: Option<u64>,
        kind: BoundsError,
    },

    /// Sector hierarchy could not be linked.
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// Decoder configuration could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Detail of a [`Error::Format`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("invalid sector magic: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    #[error("property '{property}' has {actual} bytes per value, expected {expected}")]
    WidthMismatch {
        property: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("sector declares {actual} property arrays, expected 0 or {expected}")]
    ArrayCountMismatch { expected: u32, actual: u32 },

    #[error("unknown geometry type id {0}")]
    UnknownGeometryType(u32),

    #[error("geometry type {name} is not supported by the {layout} layout")]
    UnsupportedGeometryType {
        name: &'static str,
        layout: &'static str,
    },

    #[error("geometry type {name} declares {actual} attributes, schema requires {expected}")]
    AttributeCountMismatch {
        name: &'static str,
        expected: u32,
        actual: u32,
    },

    #[error("fibonacci codeword longer than {max_bits} bits")]
    CodewordTooLong { max_bits: usize },
}

/// Detail of a [`Error::Bounds`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("read of {requested} bytes with only {available} remaining")]
    ReadPastEnd { requested: usize, available: usize },

    #[error("fibonacci stream ended without terminator after {values_read} values")]
    UnterminatedStream { values_read: usize },

    #[error("fibonacci stream holds {declared} values, read requested past the end")]
    StreamExhausted { declared: usize },

    #[error("index {index} out of range for property '{property}' (len {len})")]
    PropertyIndex {
        property: &'static str,
        index: u64,
        len: usize,
    },
}

/// Failures while linking sectors into a tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("sector {sector} at offset {offset} references unknown parent {parent}")]
    UnknownParent { sector: u64, parent: u64, offset: u64 },

    #[error("node '{path}' references unknown parent path '{parent}'")]
    UnknownParentPath { path: String, parent: String },

    #[error("node '{path}' has no parent path but the root is already set")]
    MultipleRoots { path: String },

    #[error("sector id {0} appears more than once")]
    DuplicateSector(u64),

    #[error("no sectors to link")]
    Empty,
}

struct SectorSuffix<'a>(&'a Option<u64>);

impl fmt::Display for SectorSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, " in sector {}", id),
            None => Ok(()),
        }
    }
}

impl Error {
    /// Create a format error at a byte offset.
    pub fn format(offset: u64, kind: FormatError) -> Self {
        Self::Format { offset, sector: None, kind }
    }

    /// Create a bounds error at a byte offset.
    pub fn bounds(offset: u64, kind: BoundsError) -> Self {
        Self::Bounds { offset, sector: None, kind }
    }

    /// Attach a sector id to errors that do not carry one yet.
    pub fn in_sector(self, id: u64) -> Self {
        match self {
            Self::Format { offset, sector: None, kind } => Self::Format { offset, sector: Some(id), kind },
            Self::Bounds { offset, sector: None, kind } => Self::Bounds { offset, sector: Some(id), kind },
            other => other,
        }
    }

    /// Byte offset of the failure, if the error is positional.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Format { offset, .. } | Self::Bounds { offset, .. } => Some(*offset),
            Self::Link(LinkError::UnknownParent { offset, .. }) => Some(*offset),
            _ => None,
        }
    }
}

/// Result type alias for decode operations.
pub type Result<T> = std::result::Result<T, Error>;
