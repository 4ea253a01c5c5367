//! Batch conversion driver
//!
//! Discovers block directories, fans conversions out across a bounded worker
//! pool and reduces the results through a single coordinator before handing
//! them to the composer. Per-block failures are recorded and skipped; only
//! run-level failures propagate.

use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use rayon::prelude::*;

use crate::convert::compose;
use crate::convert::gateway::{BlockConverter, ConvertedBlock};
use crate::convert::metadata;
use crate::error::{TileError, TileResult};
use crate::geo::GeoAnchor;
use crate::tiles3d::{Aabb, BoundsAccumulator, Tile};

/// Default level at which the converter stops subdividing
pub const DEFAULT_MAX_LEVEL: u32 = 20;

/// Default geometric error of the composed root
pub const DEFAULT_ROOT_GEOMETRIC_ERROR: f64 = 1000.0;

/// Run configuration for a batch assembly
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Root directory containing one subdirectory per block
    pub source_root: PathBuf,
    /// Root directory receiving tileset.json and the Data/ tree
    pub output_root: PathBuf,
    /// Geodetic anchor; falls back to the source metadata.xml when absent
    pub anchor: Option<GeoAnchor>,
    /// Max subdivision level handed through to the converter
    pub max_level: u32,
    /// Worker bound for parallel conversion; None lets the pool decide
    pub concurrency: Option<usize>,
    /// Geometric error of the composed root
    pub root_geometric_error: f64,
    /// When set, the anchor height becomes `offset - aggregate min z` so the
    /// model's lowest point lands at this height
    pub ground_offset: Option<f64>,
}

impl BatchConfig {
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            anchor: None,
            max_level: DEFAULT_MAX_LEVEL,
            concurrency: None,
            root_geometric_error: DEFAULT_ROOT_GEOMETRIC_ERROR,
            ground_offset: None,
        }
    }
}

/// One discovered block: a source subdirectory and its output slot
#[derive(Debug, Clone)]
struct Block {
    name: String,
    source_dir: PathBuf,
    output_dir: PathBuf,
}

/// Per-block outcomes of a run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Blocks present in the composed tree, in discovery order
    pub converted: Vec<String>,
    /// Blocks left out, with the reason
    pub skipped: Vec<(String, String)>,
}

impl BatchReport {
    pub fn log_summary(&self) {
        info!(
            "{} block(s) converted, {} skipped",
            self.converted.len(),
            self.skipped.len()
        );
        for (name, reason) in &self.skipped {
            warn!("skipped {name}: {reason}");
        }
    }
}

/// Enumerate block subdirectories under the source root, sorted by name so
/// reruns see the same discovery order.
fn discover_blocks(config: &BatchConfig) -> TileResult<Vec<Block>> {
    let root = &config.source_root;
    if !root.is_dir() {
        return Err(TileError::path(format!(
            "source root {} is not a directory",
            root.display()
        )));
    }
    let mut blocks = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        blocks.push(Block {
            output_dir: config.output_root.join("Data").join(&name),
            source_dir: path,
            name,
        });
    }
    blocks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(blocks)
}

/// Probe the block's primary source file, then hand it to the gateway.
///
/// Subdirectory `X` must contain `X.<ext>`; its absence fails this block
/// only.
fn convert_block<C: BlockConverter>(
    converter: &C,
    block: &Block,
    max_level: u32,
) -> TileResult<ConvertedBlock> {
    let primary = block
        .source_dir
        .join(format!("{}.{}", block.name, converter.source_extension()));
    if !primary.is_file() {
        return Err(TileError::MissingSource {
            block: block.name.clone(),
            path: primary,
        });
    }
    fs::create_dir_all(&block.output_dir).map_err(|e| {
        TileError::path(format!(
            "cannot create {}: {}",
            block.output_dir.display(),
            e
        ))
    })?;
    converter.convert(&block.source_dir, &block.output_dir, max_level)
}

fn convert_all<C: BlockConverter>(
    converter: &C,
    blocks: &[Block],
    config: &BatchConfig,
) -> TileResult<Vec<TileResult<ConvertedBlock>>> {
    let dispatch = || {
        blocks
            .par_iter()
            .map(|block| convert_block(converter, block, config.max_level))
            .collect()
    };
    match config.concurrency {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| TileError::Io(std::io::Error::other(e)))?;
            Ok(pool.install(dispatch))
        }
        None => Ok(dispatch()),
    }
}

/// Pick the anchor: explicit config, else source metadata, else the origin
/// with a warning. Ground offset re-bases the anchor height off the
/// aggregate's lowest point before the transform is built.
fn resolve_anchor(config: &BatchConfig, aggregate: &Aabb) -> TileResult<GeoAnchor> {
    let mut anchor = match config.anchor {
        Some(a) => a,
        None => match metadata::read_anchor(&config.source_root)? {
            Some(a) => {
                info!(
                    "using anchor from metadata.xml: lat {}, lon {}",
                    a.lat_deg, a.lon_deg
                );
                a
            }
            None => {
                warn!("no anchor given and no metadata.xml found, placing at lat 0, lon 0");
                GeoAnchor::default()
            }
        },
    };
    anchor.validate()?;
    if let Some(offset) = config.ground_offset {
        anchor.height_m = offset - aggregate.min.z;
    }
    Ok(anchor)
}

/// Drive the full assembly: discover, convert, aggregate, compose.
///
/// The returned report enumerates per-block outcomes; the error return is
/// reserved for run-level failures (unusable roots, zero converted blocks).
pub fn run<C: BlockConverter>(converter: &C, config: &BatchConfig) -> TileResult<BatchReport> {
    fs::create_dir_all(&config.output_root).map_err(|e| {
        TileError::path(format!(
            "cannot create output root {}: {}",
            config.output_root.display(),
            e
        ))
    })?;

    let blocks = discover_blocks(config)?;
    if blocks.is_empty() {
        return Err(TileError::EmptyAggregate);
    }
    info!(
        "discovered {} block(s) under {}",
        blocks.len(),
        config.source_root.display()
    );

    let results = convert_all(converter, &blocks, config)?;

    // single-coordinator reduction, in discovery order
    let mut report = BatchReport::default();
    let mut accumulator = BoundsAccumulator::new();
    let mut fragments: Vec<(String, Tile)> = Vec::new();
    for (block, result) in blocks.iter().zip(results) {
        match result {
            Ok(converted) => {
                accumulator.fold(&converted.bound);
                fragments.push((block.name.clone(), converted.fragment));
                report.converted.push(block.name.clone());
            }
            Err(err) => {
                warn!("skipping block {}: {err}", block.name);
                report.skipped.push((block.name.clone(), err.to_string()));
            }
        }
    }

    let aggregate = accumulator.aggregate()?;
    let anchor = resolve_anchor(config, &aggregate)?;
    let transform = anchor.placement();
    let aggregate_box = accumulator.finalize()?;

    // per-block documents first; a failed write drops that block only
    let mut surviving: Vec<(String, Tile)> = Vec::new();
    for (name, fragment) in fragments {
        match compose::write_block_tileset(&config.output_root, &name, &fragment) {
            Ok(()) => surviving.push((name, fragment)),
            Err(err) => {
                warn!("skipping block {name}: {err}");
                report.converted.retain(|n| n != &name);
                report.skipped.push((name, err.to_string()));
            }
        }
    }
    if surviving.is_empty() {
        return Err(TileError::EmptyAggregate);
    }

    let root = compose::compose_root(
        aggregate_box,
        &transform,
        &surviving,
        config.root_geometric_error,
    );
    compose::write_root_tileset(&config.output_root, &root)?;
    info!(
        "wrote root tileset to {}",
        config.output_root.join("tileset.json").display()
    );
    Ok(report)
}
