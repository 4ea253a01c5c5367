//! Command line entry point for the tileset assembler

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use tilefuse::convert::batch::{run, BatchConfig, DEFAULT_MAX_LEVEL, DEFAULT_ROOT_GEOMETRIC_ERROR};
use tilefuse::{ExternalConverter, GeoAnchor};

/// Assemble converted mesh blocks into a geo-referenced 3D Tiles hierarchy
#[derive(Parser, Debug)]
#[command(name = "tilefuse", version, about)]
struct Args {
    /// Source root containing one subdirectory per block
    #[arg(short, long)]
    input: PathBuf,

    /// Output root for tileset.json and the Data/ tree
    #[arg(short, long)]
    output: PathBuf,

    /// Per-block converter executable, invoked as `<cmd> <src> <dst> <level>`
    #[arg(short, long)]
    converter: PathBuf,

    /// Extension of each block's primary source file
    #[arg(long, default_value = "osgb")]
    extension: String,

    /// Anchor longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Anchor latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Anchor height in meters
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    height: f64,

    /// Maximum subdivision level handed to the converter
    #[arg(long, default_value_t = DEFAULT_MAX_LEVEL)]
    max_level: u32,

    /// Worker count for parallel block conversion
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Geometric error of the composed root tile
    #[arg(long, default_value_t = DEFAULT_ROOT_GEOMETRIC_ERROR)]
    root_geometric_error: f64,

    /// Place the model's lowest point at this height instead of the anchor height
    #[arg(long, allow_hyphen_values = true)]
    ground_offset: Option<f64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let anchor = match (args.lon, args.lat) {
        (Some(lon), Some(lat)) => Some(GeoAnchor::new(lon, lat, args.height)),
        (None, None) => None,
        _ => {
            error!("--lon and --lat must be given together");
            return ExitCode::FAILURE;
        }
    };

    let config = BatchConfig {
        source_root: args.input,
        output_root: args.output,
        anchor,
        max_level: args.max_level,
        concurrency: args.jobs,
        root_geometric_error: args.root_geometric_error,
        ground_offset: args.ground_offset,
    };
    let converter = ExternalConverter::new(args.converter, args.extension);

    let tick = Instant::now();
    match run(&converter, &config) {
        Ok(report) => {
            report.log_summary();
            info!("task over, cost {:.2} s", tick.elapsed().as_secs_f64());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
