//! Tile nodes and tileset documents
//!
//! Serde field order is the document field order, so identical inputs always
//! serialize to identical bytes.

use serde::{Deserialize, Serialize};

use super::bounds::BoundingBox;

/// Refinement strategy for child tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TileRefine {
    /// Replace parent tile with children
    Replace,
    /// Add children to parent tile
    Add,
}

/// Content reference carried by a tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileContent {
    /// Url of the referenced document or payload, relative to the tileset
    /// document that contains this node
    pub url: String,
}

/// A node in the tile hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(rename = "boundingVolume")]
    pub bounding_volume: BoundingBox,
    /// Screen-space error tolerated before a renderer must refine to children
    #[serde(rename = "geometricError")]
    pub geometric_error: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub refine: Option<TileRefine>,
    /// Column-major local-to-global placement matrix, composed root only
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transform: Option<[f64; 16]>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<TileContent>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Tile>,
}

impl Tile {
    /// Leaf node with content, the shape block fragments arrive in
    pub fn leaf(bounding_volume: BoundingBox, geometric_error: f64, url: String) -> Self {
        Self {
            bounding_volume,
            geometric_error,
            refine: None,
            transform: None,
            content: Some(TileContent { url }),
            children: Vec::new(),
        }
    }

    pub fn content_url(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.url.as_str())
    }

    /// Count total tiles in this subtree
    pub fn count_tiles(&self) -> usize {
        1 + self.children.iter().map(|c| c.count_tiles()).sum::<usize>()
    }
}

/// Asset metadata for a tileset document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetAsset {
    pub version: String,
    #[serde(rename = "gltfUpAxis")]
    pub gltf_up_axis: String,
}

impl Default for TilesetAsset {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            gltf_up_axis: "Y".to_string(),
        }
    }
}

/// A tileset document: asset header, document-level geometric error on the
/// root document only, and the root node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetJson {
    pub asset: TilesetAsset,
    #[serde(
        rename = "geometricError",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub geometric_error: Option<f64>,
    pub root: Tile,
}
