//! Slippy-map tile numbering (Web Mercator, XYZ scheme).
//!
//! Imagery pipelines address high-resolution tiles by `(x, y, zoom)`; these
//! conversions map sample points onto that grid and back.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{GeosampleError, Result};
use crate::models::GeoPoint;

/// Highest zoom level with tile numbers that fit the XYZ convention
pub const MAX_ZOOM: u8 = 30;

/// Tile column/row at a zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

/// Tile containing `point` at `zoom`
pub fn degree_to_tile(point: &GeoPoint, zoom: u8) -> Result<TileCoord> {
    check_zoom(zoom)?;

    let n = f64::from(1u32 << zoom);
    let lat_rad = point.lat().to_radians();

    let x = ((point.lon() + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

    // Latitudes beyond the Mercator limit land outside the grid
    let max = n - 1.0;
    Ok(TileCoord { x: x.clamp(0.0, max) as u32, y: y.clamp(0.0, max) as u32, zoom })
}

/// North-west corner of a tile as `(lat, lon)`
pub fn tile_to_degree(tile: &TileCoord) -> Result<(f64, f64)> {
    check_zoom(tile.zoom)?;

    let n = f64::from(1u32 << tile.zoom);
    let lon = f64::from(tile.x) / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * f64::from(tile.y) / n)).sinh().atan().to_degrees();
    Ok((lat, lon))
}

fn check_zoom(zoom: u8) -> Result<()> {
    if zoom > MAX_ZOOM {
        return Err(GeosampleError::InvalidGeometry {
            reason: format!("zoom {} exceeds maximum {}", zoom, MAX_ZOOM),
        });
    }
    Ok(())
}
