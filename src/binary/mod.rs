//! Low-level sector file reading.
//!
//! - [`BitCursorReader`] - bounds-checked sequential reads in a configured byte order
//! - [`FibonacciDecoder`] - Fibonacci-coded attribute index streams
//! - [`NodeIdReader`] - packed 7-byte node id arrays
//! - [`SectorWriter`] - reference encoder producing the same format

mod fibonacci;
mod format;
mod node_ids;
mod reader;
mod writer;

pub use fibonacci::*;
pub use format::*;
pub use node_ids::*;
pub use reader::*;
pub use writer::*;
