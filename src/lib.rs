//! tilefuse: assemble per-block tiled meshes into one geo-referenced
//! 3D Tiles hierarchy.
//!
//! An external converter reduces each source block to a streamable tiled
//! artifact; this crate drives those conversions, folds the returned bounds
//! into a combined volume, anchors the dataset on the WGS84 ellipsoid and
//! writes a two-level tileset tree: a root document whose children delegate
//! to one standalone sub-tileset per block.

pub mod convert;
pub mod error;
pub mod geo;
pub mod tiles3d;

pub use convert::batch::{run, BatchConfig, BatchReport};
pub use convert::gateway::{BlockConverter, ConvertedBlock, ExternalConverter};
pub use error::{TileError, TileResult};
pub use geo::GeoAnchor;
