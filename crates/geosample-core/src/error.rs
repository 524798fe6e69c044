//! Error types for the sample integrity engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeosampleError {
    // Coordinate errors
    #[error("Invalid {field} {value}: must be finite and strictly inside its bounds")]
    InvalidCoordinate { field: &'static str, value: f64 },

    #[error("Invalid field offset: {reason}")]
    InvalidOffset { reason: String },

    // Geodesy errors
    #[error(
        "Geodesic between ({from_lat}, {from_lon}) and ({to_lat}, {to_lon}) did not converge after {iterations} iterations"
    )]
    GeodesyNonConvergence {
        from_lat: f64,
        from_lon: f64,
        to_lat: f64,
        to_lon: f64,
        iterations: usize,
    },

    // Geometry errors
    #[error("Triangulation failed for polygon {polygon}: {reason}")]
    TriangulationFailure { polygon: String, reason: String },

    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    // Storage errors
    #[error("Neighborhood query timed out after {timeout_ms} ms")]
    NeighborhoodTimeout { timeout_ms: u64 },

    #[error("Storage error: {reason}")]
    Storage { reason: String },

    #[error("A sample already exists at ({lat}, {lon})")]
    DuplicateLocation { lat: f64, lon: f64 },

    #[error("Sample not found: {id}")]
    SampleNotFound { id: u64 },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, GeosampleError>;
