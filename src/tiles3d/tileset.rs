//! Tileset document IO

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::tile::TilesetJson;
use crate::error::TileResult;

/// Write a tileset document to `path`, creating parent directories.
///
/// The document is serialized before the destination handle is opened; the
/// handle lives in this scope only and is flushed before it drops.
pub fn write_tileset(path: &Path, tileset: &TilesetJson) -> TileResult<()> {
    let json = serde_json::to_string_pretty(tileset)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Load a tileset document from a file path
pub fn load_tileset(path: &Path) -> TileResult<TilesetJson> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
