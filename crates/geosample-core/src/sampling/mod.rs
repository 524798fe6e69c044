//! Random point generation inside land polygons
//!
//! Points are drawn uniformly by area: triangles are chosen by inverse-CDF
//! over their areas and filled with barycentric sampling.

pub mod orchestrator;
pub mod polygon;
pub mod seam;
pub mod source;
pub mod weights;

pub use orchestrator::{
    allocate_quotas, GenerationReport, OrchestratorConfig, PolygonFailure, PolygonQuota,
    SampleGenerationOrchestrator,
};
pub use polygon::{Draws, PolygonSampler, PreparedPolygon, SamplerConfig, Triangle};
pub use source::{load_polygons, polygons_from_geojson, DEFAULT_EXCLUDED};
pub use weights::AreaWeights;
