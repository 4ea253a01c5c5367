//! Capability boundary to the external per-block mesh converter
//!
//! Conversion is modeled as a trait rather than a concrete binding so an
//! in-process library, an out-of-process tool or a test stub can substitute.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{TileError, TileResult};
use crate::tiles3d::{load_tileset, Aabb, Tile};

/// Result of one successful block conversion
#[derive(Debug, Clone)]
pub struct ConvertedBlock {
    /// Tightest axis-aligned bound around everything written
    pub bound: Aabb,
    /// The block's own root tile; its content url is relative to the block's
    /// output directory
    pub fragment: Tile,
}

pub trait BlockConverter: Sync {
    /// Extension of the primary source file the batch driver probes for
    fn source_extension(&self) -> &str;

    /// Convert one block.
    ///
    /// On success `output_dir` holds a complete self-contained tiled artifact
    /// and the returned bound tightly encloses everything written. On failure
    /// nothing partially aggregated may be left behind; the caller decides
    /// whether to skip the block or abort the run.
    fn convert(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        max_level: u32,
    ) -> TileResult<ConvertedBlock>;
}

/// Gateway that shells out to an external converter executable.
///
/// The executable is invoked once per block as
/// `<command> <source_dir> <output_dir> <max_level>` and must leave a
/// complete sub-tileset document in the output directory; that document's
/// root node becomes the block's fragment and supplies its bound.
pub struct ExternalConverter {
    command: PathBuf,
    extension: String,
}

impl ExternalConverter {
    pub fn new(command: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            command,
            extension: extension.into(),
        }
    }
}

impl BlockConverter for ExternalConverter {
    fn source_extension(&self) -> &str {
        &self.extension
    }

    fn convert(
        &self,
        source_dir: &Path,
        output_dir: &Path,
        max_level: u32,
    ) -> TileResult<ConvertedBlock> {
        let block = source_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unnamed>")
            .to_string();
        let status = Command::new(&self.command)
            .arg(source_dir)
            .arg(output_dir)
            .arg(max_level.to_string())
            .status()
            .map_err(|e| {
                TileError::conversion(&block, format!("cannot spawn {}: {}", self.command.display(), e))
            })?;
        if !status.success() {
            return Err(TileError::conversion(
                &block,
                format!("converter exited with {status}"),
            ));
        }
        let doc = load_tileset(&output_dir.join("tileset.json")).map_err(|e| {
            TileError::conversion(&block, format!("converter left no readable tileset: {e}"))
        })?;
        let bound = doc.root.bounding_volume.to_aabb();
        Ok(ConvertedBlock {
            bound,
            fragment: doc.root,
        })
    }
}
