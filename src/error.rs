//! Central error handling for tilefuse
//!
//! Provides a unified TileError enum with consistent categorization across
//! block discovery, conversion, aggregation and document serialization.

use std::path::PathBuf;

/// Result type alias for tileset assembly operations
pub type TileResult<T> = Result<T, TileError>;

/// Centralized error type for all assembly operations
#[derive(thiserror::Error, Debug)]
pub enum TileError {
    #[error("path error: {0}")]
    Path(String),

    #[error("block {block}: missing source file {}", .path.display())]
    MissingSource { block: String, path: PathBuf },

    #[error("block {block}: conversion failed: {reason}")]
    Conversion { block: String, reason: String },

    #[error("no blocks were converted, nothing to compose")]
    EmptyAggregate,

    #[error("anchor error: {0}")]
    Anchor(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TileError {
    /// Convenience constructors for common error types
    pub fn path<T: ToString>(msg: T) -> Self {
        TileError::Path(msg.to_string())
    }

    pub fn conversion<B: Into<String>, R: ToString>(block: B, reason: R) -> Self {
        TileError::Conversion {
            block: block.into(),
            reason: reason.to_string(),
        }
    }

    pub fn anchor<T: ToString>(msg: T) -> Self {
        TileError::Anchor(msg.to_string())
    }
}
