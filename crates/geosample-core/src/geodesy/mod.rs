//! Geodesy kernel
//!
//! Ellipsoidal distance and destination (Vincenty on WGS 84) plus the
//! spherical initial bearing. All distances are in meters.

pub mod polyline;
pub mod tiles;
pub mod vincenty;

use crate::error::Result;
use crate::models::point::normalize_longitude;
use crate::models::GeoPoint;

pub use tiles::{degree_to_tile, tile_to_degree, TileCoord};

/// Geodesic distance between two points in meters
///
/// Fails with `GeodesyNonConvergence` for near-antipodal pairs.
pub fn distance(p1: &GeoPoint, p2: &GeoPoint) -> Result<f64> {
    vincenty::inverse(p1, p2)
}

/// Initial compass bearing from `from` to `to`, in `[0, 360)`
pub fn bearing_to(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.lat().to_radians();
    let lat2 = to.lat().to_radians();
    let delta_lon = (to.lon() - from.lon()).to_radians();

    let x = delta_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    let bearing = (x.atan2(y).to_degrees() + 360.0) % 360.0;
    // -0.0 and values that round up to 360.0 both belong at north
    if bearing >= 360.0 || bearing == 0.0 {
        0.0
    } else {
        bearing
    }
}

/// Point reached from `origin` travelling `distance_m` meters along `bearing_deg`
pub fn destination(origin: &GeoPoint, bearing_deg: f64, distance_m: f64) -> Result<GeoPoint> {
    if distance_m == 0.0 {
        return Ok(*origin);
    }
    let (lat, lon) = vincenty::direct(origin, bearing_deg, distance_m)?;
    GeoPoint::new(lat, normalize_longitude(lon))
}

/// Bearing perpendicular to the direction of travel through `current`.
///
/// Averages the bearing back toward `previous` with the bearing ahead toward
/// `next`, which points off the side of the route at a bend.
pub fn perpendicular_bearing(previous: &GeoPoint, current: &GeoPoint, next: &GeoPoint) -> f64 {
    let back = bearing_to(current, previous);
    let ahead = bearing_to(current, next);
    (back + ahead) / 2.0
}
