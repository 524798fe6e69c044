use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GeoPoint, Sample};

/// Half-width of the bounding-box prefilter in degrees (~11 km at the equator)
pub const PREFILTER_DEGREES: f64 = 0.1;

/// Shortest meridian degree on WGS 84, at the equator
const MIN_METERS_PER_LAT_DEGREE: f64 = 110_574.0;

/// Longest parallel degree on WGS 84, at the equator
const MAX_METERS_PER_LON_DEGREE: f64 = 111_320.0;

/// Port for radius queries over stored samples
#[async_trait]
pub trait NeighborhoodIndex: Send + Sync {
    /// Every stored sample whose geodesic distance to `center` is at most `meters`.
    ///
    /// Invalid and soft-deleted samples are included; callers filter. The
    /// result is unordered. Implementations narrow candidates with
    /// [`prefilter_boxes`] before the exact geodesic check.
    async fn within_radius(&self, center: &GeoPoint, meters: f64) -> Result<Vec<Sample>>;
}

/// Axis-aligned `(min, max)` corners in `[lon, lat]` order
pub type PrefilterBox = ([f64; 2], [f64; 2]);

/// Bounding boxes that cover every point within `meters` of `center`.
///
/// The box is ±[`PREFILTER_DEGREES`] unless the radius needs more room, which
/// happens for large radii and for longitude spans at high latitudes. A box
/// that crosses the ±180° seam is split in two.
pub fn prefilter_boxes(center: &GeoPoint, meters: f64) -> Vec<PrefilterBox> {
    let lat_half = PREFILTER_DEGREES.max(meters / MIN_METERS_PER_LAT_DEGREE);
    let min_lat = (center.lat() - lat_half).max(-90.0);
    let max_lat = (center.lat() + lat_half).min(90.0);

    let widest_lat = min_lat.abs().max(max_lat.abs()).to_radians();
    let lon_scale = MAX_METERS_PER_LON_DEGREE * widest_lat.cos();
    let lon_half = if lon_scale > 0.0 {
        PREFILTER_DEGREES.max(meters / lon_scale)
    } else {
        180.0
    };

    if lon_half >= 180.0 {
        return vec![([-180.0, min_lat], [180.0, max_lat])];
    }

    let min_lon = center.lon() - lon_half;
    let max_lon = center.lon() + lon_half;

    if min_lon < -180.0 {
        vec![
            ([-180.0, min_lat], [max_lon, max_lat]),
            ([min_lon + 360.0, min_lat], [180.0, max_lat]),
        ]
    } else if max_lon > 180.0 {
        vec![
            ([min_lon, min_lat], [180.0, max_lat]),
            ([-180.0, min_lat], [max_lon - 360.0, max_lat]),
        ]
    } else {
        vec![([min_lon, min_lat], [max_lon, max_lat])]
    }
}
