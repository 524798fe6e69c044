//! Antimeridian handling for polygons in planar lon/lat coordinates.
//!
//! A polygon either stores the seam as a longitude at ±180 or runs past it
//! (e.g. 170..190). Either way, triangles that span the seam are degenerate
//! once longitudes are wrapped, so a thin band around it is cut out first.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::{coord, BooleanOps, MultiPolygon, Polygon, Rect};

const SEAMS: [f64; 2] = [-180.0, 180.0];

/// Whether the polygon touches or runs across either copy of the seam
pub fn crosses_seam(polygon: &Polygon<f64>, buffer_deg: f64) -> bool {
    match polygon.bounding_rect() {
        Some(rect) => SEAMS
            .iter()
            .any(|seam| rect.min().x <= seam + buffer_deg && rect.max().x >= seam - buffer_deg),
        None => false,
    }
}

/// Remove a `buffer_deg` band either side of the seam
pub fn trim_seam(polygon: &Polygon<f64>, buffer_deg: f64) -> MultiPolygon<f64> {
    if buffer_deg <= 0.0 || !crosses_seam(polygon, buffer_deg) {
        return MultiPolygon::new(vec![polygon.clone()]);
    }

    let mut trimmed = MultiPolygon::new(vec![polygon.clone()]);
    for seam in SEAMS {
        let band = Rect::new(
            coord! { x: seam - buffer_deg, y: -91.0 },
            coord! { x: seam + buffer_deg, y: 91.0 },
        )
        .to_polygon();
        trimmed = trimmed.difference(&band);
    }

    tracing::debug!(
        "Trimmed antimeridian band of ±{}° into {} parts",
        buffer_deg,
        trimmed.0.len()
    );
    trimmed
}
