//! Named land polygons from GeoJSON.

use std::path::Path;

use geojson::{Feature, GeoJson};

use crate::error::{GeosampleError, Result};
use crate::models::{LandPolygon, NamedPolygon};

/// Polygons left out of generation runs unless asked for
pub const DEFAULT_EXCLUDED: &[&str] = &["Greenland", "Antarctica"];

/// Read a GeoJSON file and extract its named polygons
pub fn load_polygons<P: AsRef<Path>>(path: P, exclude: &[String]) -> Result<Vec<NamedPolygon>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let geojson = content.parse::<GeoJson>().map_err(|e| GeosampleError::InvalidGeometry {
        reason: format!("failed to parse GeoJSON {}: {}", path.display(), e),
    })?;

    let polygons = polygons_from_geojson(&geojson, exclude)?;
    tracing::info!("Loaded {} polygons from {}", polygons.len(), path.display());
    Ok(polygons)
}

/// Extract named polygons from a GeoJSON document.
///
/// Features are named by their `name` property, falling back to
/// `feature-<index>`. Names in `exclude` are matched case-insensitively.
/// Features without polygonal geometry are skipped.
pub fn polygons_from_geojson(geojson: &GeoJson, exclude: &[String]) -> Result<Vec<NamedPolygon>> {
    let features: Vec<Feature> = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features.clone(),
        GeoJson::Feature(feature) => vec![feature.clone()],
        GeoJson::Geometry(geometry) => vec![Feature::from(geometry.clone())],
    };

    let mut polygons = Vec::new();
    for (index, feature) in features.into_iter().enumerate() {
        let name = feature
            .property("name")
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("feature-{}", index));

        if exclude.iter().any(|excluded| excluded.eq_ignore_ascii_case(&name)) {
            tracing::debug!("Excluding polygon {}", name);
            continue;
        }

        let Some(geometry) = feature.geometry else {
            tracing::warn!("Skipping {}: feature has no geometry", name);
            continue;
        };

        let geometry = geo::Geometry::<f64>::try_from(geometry).map_err(|e| {
            GeosampleError::InvalidGeometry { reason: format!("feature {}: {}", name, e) }
        })?;

        match LandPolygon::try_from(geometry) {
            Ok(polygon) => polygons.push(NamedPolygon::new(name, polygon)),
            Err(e) => tracing::warn!("Skipping {}: {}", name, e),
        }
    }

    Ok(polygons)
}
