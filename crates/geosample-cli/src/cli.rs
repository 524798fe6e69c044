use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Geosample - Geospatial sample integrity engine
#[derive(Parser, Debug)]
#[command(name = "geosample")]
#[command(about = "Geodesy, sample consistency, and land polygon sampling", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./geosample.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Geodesic distance and initial bearing between two points
    Distance(DistanceArgs),

    /// Point reached by travelling a distance along a bearing
    Destination(DestinationArgs),

    /// Slippy-map tile containing a point
    Tile(TileArgs),

    /// Decode an encoded route polyline
    Polyline(PolylineArgs),

    /// Generate random points inside GeoJSON land polygons
    Generate(GenerateArgs),

    /// Submit samples from a JSON file through the consistency check
    Ingest(IngestArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
pub struct DistanceArgs {
    /// Start latitude in degrees
    pub from_lat: f64,

    /// Start longitude in degrees
    pub from_lon: f64,

    /// End latitude in degrees
    pub to_lat: f64,

    /// End longitude in degrees
    pub to_lon: f64,
}

#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
pub struct DestinationArgs {
    /// Origin latitude in degrees
    pub lat: f64,

    /// Origin longitude in degrees
    pub lon: f64,

    /// Compass bearing in degrees, clockwise from north
    pub bearing: f64,

    /// Distance in meters
    pub distance: f64,
}

#[derive(Parser, Debug)]
#[command(allow_negative_numbers = true)]
pub struct TileArgs {
    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lon: f64,

    /// Zoom level (0-30)
    #[arg(long, short = 'z', default_value = "15")]
    pub zoom: u8,
}

#[derive(Parser, Debug)]
pub struct PolylineArgs {
    /// Encoded polyline string
    #[arg(allow_hyphen_values = true)]
    pub encoded: String,

    /// Also report the bearing perpendicular to travel at each interior vertex
    #[arg(long)]
    pub perpendicular: bool,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// GeoJSON file with land polygons
    pub source: PathBuf,

    /// Total number of points to generate
    #[arg(long, short = 'n', default_value = "1000")]
    pub count: usize,

    /// Polygon names to leave out, in addition to the defaults
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Do not exclude Greenland and Antarctica by default
    #[arg(long)]
    pub include_all: bool,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Polygons sampled concurrently
    #[arg(long)]
    pub workers: Option<usize>,

    /// Write points as a GeoJSON FeatureCollection to this file
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// JSON file holding an array of submissions
    pub path: PathBuf,

    /// Neighborhood radius in meters
    #[arg(long)]
    pub radius: Option<f64>,

    /// Invalidate samples with any active neighbor this close, in meters
    #[arg(long)]
    pub same_field_radius: Option<f64>,

    /// Seed for the designation proposer. Proposals are drawn in input order;
    /// with --concurrency above 1, nearby submissions may still be finalized
    /// in a different order between runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Submissions processed concurrently
    #[arg(long, default_value = "4")]
    pub concurrency: usize,
}
