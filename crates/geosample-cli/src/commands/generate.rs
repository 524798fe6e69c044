//! Generate command implementation

use crate::cli::GenerateArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{GenerateOutput, QuotaRow};
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use geosample_core::config::CliConfigOverrides;
use geosample_core::models::GeoPoint;
use geosample_core::sampling::{load_polygons, SampleGenerationOrchestrator, DEFAULT_EXCLUDED};
use std::fs;
use std::path::Path;

pub async fn execute(
    args: GenerateArgs,
    config_path: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    let config = load_config_with_overrides(
        config_path,
        CliConfigOverrides { sampler_workers: args.workers, seed: args.seed, ..Default::default() },
    )?;

    let mut exclude = args.exclude.clone();
    if !args.include_all {
        exclude.extend(DEFAULT_EXCLUDED.iter().map(|name| name.to_string()));
    }

    let polygons = load_polygons(&args.source, &exclude)
        .with_context(|| format!("Failed to load polygons from {}", args.source.display()))?;
    if polygons.is_empty() {
        output.warning("No polygons left to sample after exclusions");
    }

    let orchestrator = SampleGenerationOrchestrator::new(config.orchestrator())?;
    let report = orchestrator.generate(polygons, args.count).await?;

    let written_to = match &args.output {
        Some(path) => {
            write_points(path, &report.points)?;
            Some(path.display().to_string())
        }
        None => None,
    };

    if output.is_json() {
        output.result(GenerateOutput {
            requested: args.count,
            generated: report.points.len(),
            polygons: report.quotas.clone(),
            failures: report.failures.clone(),
            points: if written_to.is_some() { Vec::new() } else { report.flat_pairs() },
            written_to,
        })?;
        return Ok(());
    }

    output.section("Allocation");
    output.table(report.quotas.iter().map(QuotaRow::from).collect());

    for failure in &report.failures {
        output.warning(format!("Polygon {} failed: {}", failure.name, failure.reason));
    }

    match written_to {
        Some(path) => output.success(format!(
            "Wrote {} of {} points to {}",
            report.points.len(),
            args.count,
            path
        )),
        None => {
            output.section("Points (lat, lon)");
            for (lat, lon) in report.flat_pairs() {
                println!("{:.8}, {:.8}", lat, lon);
            }
            output.success(format!("Generated {} of {} points", report.points.len(), args.count));
        }
    }

    Ok(())
}

/// Write points as a GeoJSON FeatureCollection of Point features
fn write_points(path: &Path, points: &[GeoPoint]) -> Result<()> {
    let features = points
        .iter()
        .map(|point| Feature::from(Geometry::new(Value::Point(vec![point.lon(), point.lat()]))))
        .collect();

    let collection = FeatureCollection { bbox: None, features, foreign_members: None };
    fs::write(path, GeoJson::from(collection).to_string())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
