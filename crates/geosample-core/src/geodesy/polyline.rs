//! Decoder for Google's encoded polyline format.
//!
//! Routing responses describe the road an imagery pipeline drives along as an
//! encoded polyline with five decimal places of precision.

use crate::error::{GeosampleError, Result};
use crate::models::GeoPoint;

const PRECISION: f64 = 1e5;

/// Decode an encoded polyline into points
pub fn decode(encoded: &str) -> Result<Vec<GeoPoint>> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        lon += next_delta(bytes, &mut index)?;
        points.push(GeoPoint::new(lat as f64 / PRECISION, lon as f64 / PRECISION)?);
    }

    Ok(points)
}

/// Read one zig-zag encoded varint
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index).ok_or_else(|| GeosampleError::InvalidGeometry {
            reason: "encoded polyline ends mid-coordinate".to_string(),
        })?;
        *index += 1;

        let chunk = i64::from(byte).checked_sub(63).filter(|c| (0..64).contains(c)).ok_or_else(
            || GeosampleError::InvalidGeometry {
                reason: format!("invalid polyline character {:?}", byte as char),
            },
        )?;

        if shift > 60 {
            return Err(GeosampleError::InvalidGeometry {
                reason: "polyline coordinate overflows".to_string(),
            });
        }

        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_polyline() {
        let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];

        assert_eq!(points.len(), expected.len());
        for (point, (lat, lon)) in points.iter().zip(expected) {
            assert!((point.lat() - lat).abs() < 1e-9);
            assert!((point.lon() - lon).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_polyline() {
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_truncated_polyline() {
        assert!(matches!(decode("_p~iF~ps|"), Err(GeosampleError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_invalid_character() {
        assert!(decode("  ").is_err());
    }
}
