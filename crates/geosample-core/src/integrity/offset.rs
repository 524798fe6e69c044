use crate::error::Result;
use crate::geodesy;
use crate::models::{FieldOffset, GeoPoint};

/// Moves a reported point to the field interior.
///
/// Collectors often stand at an access point and report a bearing and a
/// paced distance to the field instead of walking in.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetResolver;

impl OffsetResolver {
    /// Working point for a raw report; the raw point itself is never modified
    pub fn resolve(&self, raw: &GeoPoint, offset: Option<&FieldOffset>) -> Result<GeoPoint> {
        match offset {
            Some(offset) => {
                let moved = geodesy::destination(raw, offset.bearing_deg, offset.distance_m)?;
                tracing::debug!(
                    "Offset {} by {} m at {}° to {}",
                    raw,
                    offset.distance_m,
                    offset.bearing_deg,
                    moved
                );
                Ok(moved)
            }
            None => Ok(*raw),
        }
    }

    /// Resolve from raw report values where `-1` marks a missing bearing
    pub fn resolve_report(
        &self,
        raw: &GeoPoint,
        bearing_deg: Option<f64>,
        distance_m: Option<f64>,
    ) -> Result<(GeoPoint, Option<FieldOffset>)> {
        let offset = FieldOffset::from_report(bearing_deg, distance_m)?;
        let working = self.resolve(raw, offset.as_ref())?;
        Ok((working, offset))
    }
}
