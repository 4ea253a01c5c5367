//! 3D Tiles document model, producer side
//!
//! Bounding volumes, tile nodes and tileset documents as written into the
//! output hierarchy: a root tileset.json plus one sub-tileset per block.

mod bounds;
mod tile;
mod tileset;

pub use bounds::{Aabb, BoundingBox, BoundsAccumulator};
pub use tile::{Tile, TileContent, TileRefine, TilesetAsset, TilesetJson};
pub use tileset::{load_tileset, write_tileset};
