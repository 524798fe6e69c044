use geosample_core::config::ConfigSource;
use geosample_core::models::{Sample, Validity};
use geosample_core::sampling::{PolygonFailure, PolygonQuota};
use serde::Serialize;
use tabled::Tabled;

/// Output for distance command
#[derive(Debug, Serialize)]
pub struct DistanceOutput {
    pub distance_m: f64,
    pub initial_bearing_deg: f64,
}

/// Output for destination command
#[derive(Debug, Serialize)]
pub struct DestinationOutput {
    pub lat: f64,
    pub lon: f64,
}

/// Output for tile command
#[derive(Debug, Serialize)]
pub struct TileOutput {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
    pub north_west: [f64; 2],
}

/// Output for polyline command
#[derive(Debug, Serialize)]
pub struct PolylineOutput {
    pub points: Vec<PolylineVertex>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct PolylineVertex {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Lat")]
    pub lat: f64,
    #[tabled(rename = "Lon")]
    pub lon: f64,
    #[tabled(rename = "Perpendicular", display_with = "display_bearing")]
    pub perpendicular_deg: Option<f64>,
}

fn display_bearing(bearing: &Option<f64>) -> String {
    bearing.map(|b| format!("{:.1}°", b)).unwrap_or_else(|| "-".to_string())
}

/// Output for generate command
#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    pub requested: usize,
    pub generated: usize,
    pub polygons: Vec<PolygonQuota>,
    pub failures: Vec<PolygonFailure>,
    pub points: Vec<(f64, f64)>,
    pub written_to: Option<String>,
}

#[derive(Debug, Tabled)]
pub struct QuotaRow {
    #[tabled(rename = "Polygon")]
    pub name: String,
    #[tabled(rename = "Area (deg²)")]
    pub area: String,
    #[tabled(rename = "Points")]
    pub quota: usize,
}

impl From<&PolygonQuota> for QuotaRow {
    fn from(quota: &PolygonQuota) -> Self {
        Self { name: quota.name.clone(), area: format!("{:.4}", quota.area), quota: quota.quota }
    }
}

/// Output for ingest command
#[derive(Debug, Serialize)]
pub struct IngestOutput {
    pub submitted: usize,
    pub stored: usize,
    pub training: usize,
    pub validation: usize,
    pub invalid: usize,
    pub rejected: Vec<RejectedSubmission>,
    pub samples: Vec<Sample>,
}

#[derive(Debug, Serialize)]
pub struct RejectedSubmission {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Tabled)]
pub struct SampleRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Lat")]
    pub lat: String,
    #[tabled(rename = "Lon")]
    pub lon: String,
    #[tabled(rename = "Use")]
    pub designation: String,
    #[tabled(rename = "Locked")]
    pub locked: bool,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl From<&Sample> for SampleRow {
    fn from(sample: &Sample) -> Self {
        Self {
            id: sample.id.0,
            lat: format!("{:.6}", sample.working_point.lat()),
            lon: format!("{:.6}", sample.working_point.lon()),
            designation: sample.designation.to_string(),
            locked: sample.locked,
            status: match &sample.validity {
                Validity::Valid => "valid".to_string(),
                Validity::Invalid(reason) => format!("invalid: {}", reason),
            },
        }
    }
}

/// One entry of the config command output
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source", display_with = "display_source")]
    pub source: ConfigSource,
}

fn display_source(source: &ConfigSource) -> String {
    format!("{:?}", source)
}
