//! Parallel point generation across a set of land polygons.
//!
//! The global budget is split by planar area, then each polygon is sampled on
//! the blocking pool. Results are gathered in polygon order, so a seeded run
//! produces the same points however the workers are scheduled.

use futures::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;

use crate::error::{GeosampleError, Result};
use crate::models::{GeoPoint, NamedPolygon};
use crate::sampling::polygon::{PolygonSampler, SamplerConfig};
use crate::sampling::weights::AreaWeights;

/// Mixes the polygon index into the base seed
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Settings for [`SampleGenerationOrchestrator`]
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Polygons sampled concurrently
    pub workers: usize,

    /// Base seed; drawn from entropy when unset
    pub seed: Option<u64>,

    pub sampler: SamplerConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { workers: 8, seed: None, sampler: SamplerConfig::default() }
    }
}

/// Points assigned to one polygon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonQuota {
    pub name: String,
    pub area: f64,
    pub quota: usize,
}

/// A polygon that produced no points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonFailure {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Outcome of a generation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// Generated points, grouped by polygon in input order
    pub points: Vec<GeoPoint>,
    pub quotas: Vec<PolygonQuota>,
    pub failures: Vec<PolygonFailure>,
}

impl GenerationReport {
    /// Points as `(lat, lon)` pairs
    pub fn flat_pairs(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(GeoPoint::lat_lon).collect()
    }

    pub fn requested(&self) -> usize {
        self.quotas.iter().map(|q| q.quota).sum()
    }
}

/// Split `total` across polygons by area; all zeros when no polygon has area
pub fn allocate_quotas(areas: &[f64], total: usize) -> Vec<usize> {
    match AreaWeights::new(areas) {
        Some(weights) => weights.quotas(total),
        None => vec![0; areas.len()],
    }
}

/// Runs [`PolygonSampler`] over many polygons with bounded concurrency
#[derive(Debug, Clone)]
pub struct SampleGenerationOrchestrator {
    config: OrchestratorConfig,
    sampler: PolygonSampler,
}

impl SampleGenerationOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        if config.workers == 0 {
            return Err(GeosampleError::ConfigInvalid {
                key: "sampler_workers".to_string(),
                reason: "at least one worker is required".to_string(),
            });
        }

        let sampler = PolygonSampler::new(config.sampler.clone());
        Ok(Self { config, sampler })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Generate about `total` points spread over `polygons` by area
    pub async fn generate(
        &self,
        polygons: Vec<NamedPolygon>,
        total: usize,
    ) -> Result<GenerationReport> {
        let areas: Vec<f64> = polygons.iter().map(|p| p.polygon.planar_area()).collect();
        let quotas = allocate_quotas(&areas, total);
        let base_seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().next_u64());

        tracing::info!(
            "Generating {} points over {} polygons with {} workers",
            total,
            polygons.len(),
            self.config.workers
        );

        let report_quotas: Vec<PolygonQuota> = polygons
            .iter()
            .zip(&areas)
            .zip(&quotas)
            .map(|((polygon, &area), &quota)| PolygonQuota {
                name: polygon.name.clone(),
                area,
                quota,
            })
            .collect();

        let outcomes: Vec<(usize, String, Result<Vec<GeoPoint>>)> =
            stream::iter(polygons.into_iter().zip(quotas).enumerate())
                .map(|(index, (polygon, quota))| {
                    let sampler = self.sampler.clone();
                    let seed = base_seed ^ (index as u64).wrapping_mul(SEED_STRIDE);
                    let name = polygon.name.clone();

                    async move {
                        let result = tokio::task::spawn_blocking(move || {
                            let mut rng = StdRng::seed_from_u64(seed);
                            sampler.sample(&polygon, quota, &mut rng)
                        })
                        .await
                        .unwrap_or_else(|e| {
                            Err(GeosampleError::TriangulationFailure {
                                polygon: name.clone(),
                                reason: format!("sampling task failed: {}", e),
                            })
                        });
                        (index, name, result)
                    }
                })
                .buffered(self.config.workers)
                .collect()
                .await;

        let mut report = GenerationReport { quotas: report_quotas, ..Default::default() };
        for (index, name, result) in outcomes {
            match result {
                Ok(points) => report.points.extend(points),
                Err(e) => {
                    tracing::warn!("Skipping polygon {} ({}): {}", index, name, e);
                    report.failures.push(PolygonFailure { index, name, reason: e.to_string() });
                }
            }
        }

        tracing::info!(
            "Generated {} of {} requested points, {} polygons failed",
            report.points.len(),
            report.requested(),
            report.failures.len()
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LandPolygon;
    use geo::polygon;

    fn square(name: &str, x0: f64, y0: f64, size: f64) -> NamedPolygon {
        NamedPolygon::new(
            name,
            LandPolygon::Single(polygon![
                (x: x0, y: y0),
                (x: x0 + size, y: y0),
                (x: x0 + size, y: y0 + size),
                (x: x0, y: y0 + size),
                (x: x0, y: y0),
            ]),
        )
    }

    fn seeded(seed: u64) -> SampleGenerationOrchestrator {
        SampleGenerationOrchestrator::new(OrchestratorConfig {
            workers: 3,
            seed: Some(seed),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_allocate_quotas_by_area() {
        assert_eq!(allocate_quotas(&[1.0, 3.0], 100), vec![25, 75]);
        assert_eq!(allocate_quotas(&[0.0, 0.0], 100), vec![0, 0]);
        assert!(allocate_quotas(&[], 100).is_empty());
    }

    #[test]
    fn test_allocate_quotas_sum_close_to_total() {
        let areas = [1.0, 1.0, 1.0];
        let sum: usize = allocate_quotas(&areas, 100).iter().sum();
        assert!(sum.abs_diff(100) <= areas.len());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = OrchestratorConfig { workers: 0, ..Default::default() };
        assert!(SampleGenerationOrchestrator::new(config).is_err());
    }

    #[tokio::test]
    async fn test_generate_keeps_polygon_order() {
        let polygons = vec![square("west", -10.0, 0.0, 1.0), square("east", 10.0, 0.0, 1.0)];
        let report = seeded(1).generate(polygons, 40).await.unwrap();

        assert_eq!(report.points.len(), 40);
        assert!(report.failures.is_empty());
        assert!(report.points[..20].iter().all(|p| p.lon() < 0.0));
        assert!(report.points[20..].iter().all(|p| p.lon() > 0.0));
        assert_eq!(report.flat_pairs()[0], report.points[0].lat_lon());
    }

    #[tokio::test]
    async fn test_failing_polygon_does_not_abort() {
        // Lies entirely inside the trimmed antimeridian band
        let seam_strip = square("seam", 179.995, 0.0, 0.01);
        let polygons = vec![square("land", 0.0, 0.0, 0.03), seam_strip];

        let report = seeded(2).generate(polygons, 20).await.unwrap();
        assert_eq!(report.quotas[0].quota, 18);
        assert_eq!(report.quotas[1].quota, 2);
        assert_eq!(report.points.len(), 18);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].name, "seam");
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let polygons = vec![square("a", 0.0, 0.0, 2.0), square("b", 5.0, 5.0, 1.0)];
        let first = seeded(42).generate(polygons.clone(), 50).await.unwrap();
        let second = seeded(42).generate(polygons, 50).await.unwrap();
        assert_eq!(first.points, second.points);
    }
}
