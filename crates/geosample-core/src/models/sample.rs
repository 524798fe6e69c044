use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeosampleError, Result};
use crate::models::GeoPoint;

/// Bearing value reported when the collector did not record an offset
pub const NO_BEARING: f64 = -1.0;

/// Unique identifier for a stored sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleId(pub u64);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dataset role of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Designation {
    #[default]
    Training,
    Validation,
}

impl fmt::Display for Designation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Designation::Training => write!(f, "training"),
            Designation::Validation => write!(f, "validation"),
        }
    }
}

/// Whether a sample may be consumed downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "reason")]
pub enum Validity {
    #[default]
    Valid,
    /// Held back for manual review
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Validity::Valid => None,
            Validity::Invalid(reason) => Some(reason),
        }
    }
}

/// Bearing and paced distance from the reported point to the field interior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOffset {
    pub bearing_deg: f64,
    pub distance_m: f64,
}

impl FieldOffset {
    /// Interpret raw report values.
    ///
    /// Returns `Ok(None)` for the "no offset" encodings: a missing or sentinel
    /// bearing, or a missing or non-positive distance.
    pub fn from_report(bearing_deg: Option<f64>, distance_m: Option<f64>) -> Result<Option<Self>> {
        let (bearing_deg, distance_m) = match (bearing_deg, distance_m) {
            (Some(b), Some(d)) if b != NO_BEARING && d > 0.0 => (b, d),
            _ => return Ok(None),
        };

        if !bearing_deg.is_finite() || !(0.0..360.0).contains(&bearing_deg) {
            return Err(GeosampleError::InvalidOffset {
                reason: format!("bearing {} is outside [0, 360)", bearing_deg),
            });
        }
        if !distance_m.is_finite() {
            return Err(GeosampleError::InvalidOffset {
                reason: format!("distance {} is not finite", distance_m),
            });
        }

        Ok(Some(Self { bearing_deg, distance_m }))
    }
}

/// Designation proposed upstream of the consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub designation: Designation,
    pub locked: bool,
}

impl Proposal {
    pub fn training() -> Self {
        Self { designation: Designation::Training, locked: false }
    }

    pub fn validation(locked: bool) -> Self {
        Self { designation: Designation::Validation, locked }
    }
}

/// A sample whose working point is resolved but whose designation is not yet final
#[derive(Debug, Clone, PartialEq)]
pub struct DraftSample {
    pub raw_point: GeoPoint,
    pub working_point: GeoPoint,
    pub offset: Option<FieldOffset>,
    pub proposal: Proposal,
}

/// A finalized land-use observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: SampleId,

    /// Point as reported, kept as provenance
    pub raw_point: GeoPoint,

    /// Point after the field offset is applied
    pub working_point: GeoPoint,

    pub offset: Option<FieldOffset>,
    pub designation: Designation,

    /// Only ever true for validation samples
    pub locked: bool,

    pub validity: Validity,

    /// Soft-delete flag
    pub deleted: bool,

    pub created_at: DateTime<Utc>,
}

impl Sample {
    /// Whether this sample counts toward a neighbor tally
    pub fn is_active(&self) -> bool {
        self.validity.is_valid() && !self.deleted
    }
}
