//! Geosample Core - Geodesy, sample integrity, and polygon sampling
//!
//! This crate contains the domain models, the geodesy kernel, the neighborhood
//! port consumed by the consistency enforcer, and the area-weighted polygon
//! point sampler with its parallel orchestrator.

pub mod config;
pub mod error;
pub mod geodesy;
pub mod integrity;
pub mod models;
pub mod ports;
pub mod sampling;

pub use error::{GeosampleError, Result};
