use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tidemark_common::GeoPoint;
use tidemark_query::{BatchItem, EngineConfig, QueryEngine};

mod dataset;
mod output;

use output::{DatasetStats, PointsRequest, QueryResponse};

#[derive(Parser)]
#[command(name = "tidemark")]
#[command(about = "Nearest coastline point and geodesic distance for WGS84 coordinates")]
#[command(long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log line format, written to stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the nearest coastline point for each coordinate
    Query {
        /// Coastline GeoJSON (LineString / MultiLineString features)
        #[arg(long)]
        coastline: PathBuf,
        /// Coordinate to look up (lat,lon), repeatable
        #[arg(
            long = "point",
            value_name = "LAT,LON",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        points: Vec<GeoPoint>,
        /// JSON file of the form {"coordinates": [{"latitude": .., "longitude": ..}]}
        #[arg(long = "points", value_name = "FILE")]
        points_file: Option<PathBuf>,
        /// Engine configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Give up beyond this distance (overrides the config file)
        #[arg(long)]
        max_radius_km: Option<f64>,
        /// Resolve on the calling thread only
        #[arg(long)]
        sequential: bool,
        /// Cross-check every answer against an exhaustive scan
        #[arg(long)]
        verify: bool,
    },
    /// Build the index and print dataset statistics
    Stats {
        /// Coastline GeoJSON
        #[arg(long)]
        coastline: PathBuf,
    },
}

/// `lat,lon`; range checks happen per item at query time
fn parse_point(s: &str) -> std::result::Result<GeoPoint, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err("coordinate must be in format 'lat,lon'".to_string());
    }
    let latitude = parts[0]
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad latitude '{}': {e}", parts[0].trim()))?;
    let longitude = parts[1]
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad longitude '{}': {e}", parts[1].trim()))?;
    Ok(GeoPoint {
        latitude,
        longitude,
    })
}

fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn load_points(path: &Path) -> Result<Vec<GeoPoint>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read points file {}", path.display()))?;
    let request: PointsRequest = serde_json::from_str(&text)
        .with_context(|| format!("invalid points file {}", path.display()))?;
    Ok(request.coordinates)
}

fn build_engine(coastline: &Path, config: EngineConfig) -> Result<QueryEngine> {
    let polylines = dataset::load(coastline)?;
    QueryEngine::build(polylines, config)
        .with_context(|| format!("cannot serve queries from {}", coastline.display()))
}

/// Compare each answer with the brute-force scan; returns the mismatch count
fn verify(engine: &QueryEngine, points: &[GeoPoint], items: &[BatchItem]) -> usize {
    let mut mismatches = 0;
    for (point, item) in points.iter().zip(items) {
        let exhaustive = engine.resolve_exhaustive(*point);
        if exhaustive != item.result {
            mismatches += 1;
            warn!(
                index = item.index,
                indexed = ?item.result,
                exhaustive = ?exhaustive,
                "index answer differs from exhaustive scan"
            );
        }
    }
    mismatches
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    match cli.command {
        Commands::Query {
            coastline,
            mut points,
            points_file,
            config,
            max_radius_km,
            sequential,
            verify: cross_check,
        } => {
            let mut config = load_config(config.as_deref())?;
            if max_radius_km.is_some() {
                config.max_search_radius_km = max_radius_km;
            }
            if sequential {
                config.parallel = false;
            }

            if let Some(path) = points_file {
                points.extend(load_points(&path)?);
            }
            if points.is_empty() {
                anyhow::bail!("no coordinates given, use --point or --points");
            }

            let engine = build_engine(&coastline, config)?;

            let start = Instant::now();
            let items = engine.resolve_batch(&points);
            info!(
                points = points.len(),
                failed = items.iter().filter(|item| !item.is_ok()).count(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "queries resolved"
            );

            if cross_check {
                let mismatches = verify(&engine, &points, &items);
                if mismatches == 0 {
                    info!(points = points.len(), "verified against exhaustive scan");
                } else {
                    warn!(mismatches, "verification found mismatches");
                }
            }

            let response = QueryResponse::from_batch(&engine, &items);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Stats { coastline } => {
            let engine = build_engine(&coastline, EngineConfig::default())?;
            println!("{}", serde_json::to_string_pretty(&DatasetStats::of(&engine))?);
        }
    }

    Ok(())
}
