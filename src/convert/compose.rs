//! Tileset tree composition
//!
//! Builds the two-level hierarchy: a root document whose children delegate to
//! one standalone sub-tileset per block, never to leaf content directly.

use std::path::Path;

use glam::DMat4;

use crate::error::TileResult;
use crate::tiles3d::{
    write_tileset, BoundingBox, Tile, TileContent, TileRefine, TilesetAsset, TilesetJson,
};

/// Relative url of a block's sub-tileset document
pub fn block_tileset_url(name: &str) -> String {
    format!("Data/{name}/tileset.json")
}

/// Build the root tileset document.
///
/// Children mirror the fragments in discovery order but have their content
/// references rewritten to each block's own tileset document. The placement
/// transform and the document-level geometric error appear here and only
/// here.
pub fn compose_root(
    aggregate: BoundingBox,
    transform: &DMat4,
    fragments: &[(String, Tile)],
    root_geometric_error: f64,
) -> TilesetJson {
    let children = fragments
        .iter()
        .map(|(name, fragment)| Tile {
            bounding_volume: fragment.bounding_volume.clone(),
            geometric_error: fragment.geometric_error,
            refine: None,
            transform: None,
            content: Some(TileContent {
                url: block_tileset_url(name),
            }),
            children: Vec::new(),
        })
        .collect();

    TilesetJson {
        asset: TilesetAsset::default(),
        geometric_error: Some(root_geometric_error),
        root: Tile {
            bounding_volume: aggregate,
            geometric_error: root_geometric_error,
            refine: Some(TileRefine::Replace),
            transform: Some(transform.to_cols_array()),
            content: None,
            children,
        },
    }
}

/// Build one block's standalone tileset document around its fragment.
///
/// The fragment keeps its own bounding volume, geometric error and content
/// url (already relative to the block directory). No transform: placement is
/// a root-only concern.
pub fn compose_block(fragment: &Tile) -> TilesetJson {
    TilesetJson {
        asset: TilesetAsset::default(),
        geometric_error: None,
        root: fragment.clone(),
    }
}

/// Write one block's sub-tileset document under `<output_root>/Data/<name>/`
pub fn write_block_tileset(output_root: &Path, name: &str, fragment: &Tile) -> TileResult<()> {
    let path = output_root.join("Data").join(name).join("tileset.json");
    write_tileset(&path, &compose_block(fragment))
}

/// Write the root document at `<output_root>/tileset.json`
pub fn write_root_tileset(output_root: &Path, root: &TilesetJson) -> TileResult<()> {
    write_tileset(&output_root.join("tileset.json"), root)
}
