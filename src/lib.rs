//! # i3df
//!
//! Decoder for compressed multi-sector i3d CAD geometry files.
//!
//! A file is a sequence of sector records. Each sector carries a property
//! table of pooled attribute values and one geometry block per primitive
//! type, whose attributes are Fibonacci-coded indices into that table. The
//! decoder resolves the indices, expands the ~30 on-disk primitive types into
//! twelve rendered primitive kinds stored as structure-of-arrays groups, and
//! links the sectors into a tree by parent id.
//!
//! ## Modules
//!
//! - [`util`] - Errors, math types, bounding boxes and colors
//! - [`config`] - Byte order, table layout and color decoding settings
//! - [`binary`] - Bounds-checked reader, Fibonacci codec and reference writer
//! - [`geometry`] - Type tables, schemas and primitive groups
//! - [`decode`] - Property tables, blocks, resolution and reconstruction
//! - [`sector`] - Sector tree assembly and scene statistics
//!
//! ## Example
//!
//! ```ignore
//! use i3df::prelude::*;
//!
//! let scene = i3df::open("scene.i3d", &DecoderConfig::default())?;
//! for sector in scene.tree.iter() {
//!     println!("{} {} primitives", sector.path, sector.primitives.total_count());
//! }
//! ```

pub mod binary;
pub mod config;
pub mod decode;
pub mod geometry;
pub mod sector;
pub mod util;

pub use config::DecoderConfig;
pub use sector::{decode_file, decode_sector, decode_sector_buffers, open, DecodedScene, Sector, SectorTree};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ByteOrder, ColorMode, DecoderConfig, TableLayout};
    pub use crate::decode::DataMaps;
    pub use crate::geometry::{FileGeometryType, PrimitiveGroup, PrimitiveGroups, RenderedKind};
    pub use crate::sector::{
        decode_file, decode_sector, decode_sector_buffers, open, DecodedScene, PathTreeBuilder, SceneStats, Sector,
        SectorTree, WebNode,
    };
    pub use crate::util::{BBox3f, Color, Error, Result, Vec3};
}
