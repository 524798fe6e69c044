//! Validated geographic coordinate value type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeosampleError, Result};

/// Exclusive latitude bound in degrees
pub const MAX_LATITUDE: f64 = 90.0;

/// Exclusive longitude bound in degrees
pub const MAX_LONGITUDE: f64 = 180.0;

/// A WGS 84 position in decimal degrees.
///
/// Bounds are strict: `|lat| < 90` and `|lon| < 180`. The poles and the
/// antimeridian itself are rejected so that every stored sample has a single,
/// unambiguous longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = GeosampleError;

    fn try_from(raw: RawPoint) -> Result<Self> {
        GeoPoint::new(raw.lat, raw.lon)
    }
}

impl From<GeoPoint> for RawPoint {
    fn from(point: GeoPoint) -> Self {
        RawPoint { lat: point.lat, lon: point.lon }
    }
}

impl GeoPoint {
    /// Create a point, rejecting non-finite or out-of-range coordinates
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || lat.abs() >= MAX_LATITUDE {
            return Err(GeosampleError::InvalidCoordinate { field: "latitude", value: lat });
        }
        if !lon.is_finite() || lon.abs() >= MAX_LONGITUDE {
            return Err(GeosampleError::InvalidCoordinate { field: "longitude", value: lon });
        }
        Ok(Self { lat, lon })
    }

    /// Create a point from planar `(x, y)` = `(lon, lat)` coordinates,
    /// wrapping the longitude back into range first
    pub fn from_lon_lat(lon: f64, lat: f64) -> Result<Self> {
        Self::new(lat, normalize_longitude(lon))
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// `(lat, lon)` pair, the order used by sinks and exports
    pub fn lat_lon(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    /// Convert to a planar `geo::Point` with `x = lon`, `y = lat`
    pub fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.8}, {:.8})", self.lat, self.lon)
    }
}

/// Wrap a longitude into `[-180, 180)`
pub fn normalize_longitude(lon: f64) -> f64 {
    if (-MAX_LONGITUDE..MAX_LONGITUDE).contains(&lon) {
        return lon;
    }
    (lon + MAX_LONGITUDE).rem_euclid(360.0) - MAX_LONGITUDE
}
