//! Neighborhood consistency check.
//!
//! A new sample adopts the dataset role of its active neighbors when they
//! agree, and is held for review when they disagree. Existing neighbors are
//! never re-evaluated when a later sample arrives.

use chrono::Utc;
use std::time::Duration;

use crate::config::DEFAULT_NEIGHBOR_RADIUS_M;
use crate::error::{GeosampleError, Result};
use crate::geodesy;
use crate::models::{Designation, DraftSample, GeoPoint, Sample, SampleId, Validity};
use crate::ports::NeighborhoodIndex;

/// Invalidation reason when active neighbors hold both roles
pub const MIXED_USE_REASON: &str = "neighbor sample use is mixed";

/// Invalidation reason when another active sample sits in the same field
pub const SAME_FIELD_REASON: &str = "same field as another location";

/// Settings for [`ConsistencyEnforcer`]
#[derive(Debug, Clone, PartialEq)]
pub struct EnforcerConfig {
    /// Neighborhood radius in meters
    pub radius_m: f64,

    /// When set, any active neighbor this close invalidates the sample
    pub same_field_radius_m: Option<f64>,

    /// Deadline for each neighborhood query
    pub timeout: Duration,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            radius_m: DEFAULT_NEIGHBOR_RADIUS_M,
            same_field_radius_m: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Counts of neighbor roles around a candidate point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborTally {
    pub training: usize,
    pub validation: usize,

    /// Invalid or soft-deleted neighbors
    pub ignored: usize,

    /// Active neighbors inside the same-field radius
    pub same_field: usize,
}

impl NeighborTally {
    /// Tally neighbors of `center`, measuring same-field distances only when asked
    pub fn from_neighbors(
        center: &GeoPoint,
        neighbors: &[Sample],
        same_field_radius_m: Option<f64>,
    ) -> Result<Self> {
        let mut tally = Self::default();

        for neighbor in neighbors {
            if !neighbor.is_active() {
                tally.ignored += 1;
                continue;
            }

            match neighbor.designation {
                Designation::Training => tally.training += 1,
                Designation::Validation => tally.validation += 1,
            }

            if let Some(radius) = same_field_radius_m {
                if geodesy::distance(center, &neighbor.working_point)? <= radius {
                    tally.same_field += 1;
                }
            }
        }

        Ok(tally)
    }

    pub fn active(&self) -> usize {
        self.training + self.validation
    }
}

/// Outcome of the neighbor role comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No active neighbors: the proposal stands
    Keep,
    /// Active neighbors are unanimous: adopt their role
    Conform(Designation),
    /// Active neighbors hold both roles
    Mixed,
}

/// Compare neighbor roles
pub fn decide(tally: &NeighborTally) -> Decision {
    let (t, v) = (tally.training, tally.validation);

    if t == 0 && v == 0 {
        Decision::Keep
    } else if t.abs_diff(v) == t + v {
        if v > 0 {
            Decision::Conform(Designation::Validation)
        } else {
            Decision::Conform(Designation::Training)
        }
    } else {
        Decision::Mixed
    }
}

/// Decides the final role and validity of a new sample from its neighborhood
#[derive(Debug, Clone)]
pub struct ConsistencyEnforcer {
    config: EnforcerConfig,
}

impl Default for ConsistencyEnforcer {
    fn default() -> Self {
        Self { config: EnforcerConfig::default() }
    }
}

impl ConsistencyEnforcer {
    pub fn new(config: EnforcerConfig) -> Result<Self> {
        if !(config.radius_m > 0.0) {
            return Err(GeosampleError::ConfigInvalid {
                key: "neighbor_radius_m".to_string(),
                reason: format!("radius must be greater than 0, got {}", config.radius_m),
            });
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EnforcerConfig {
        &self.config
    }

    /// Finalize a draft against the samples already stored in `index`.
    ///
    /// The returned sample carries `SampleId(0)`; the store assigns the real id
    /// on insert.
    pub async fn finalize<I>(&self, draft: DraftSample, index: &I) -> Result<Sample>
    where
        I: NeighborhoodIndex + ?Sized,
    {
        let center = draft.working_point;
        let neighbors = tokio::time::timeout(
            self.config.timeout,
            index.within_radius(&center, self.config.radius_m),
        )
        .await
        .map_err(|_| GeosampleError::NeighborhoodTimeout {
            timeout_ms: self.config.timeout.as_millis() as u64,
        })??;

        let tally = NeighborTally::from_neighbors(
            &center,
            &neighbors,
            self.config.same_field_radius_m,
        )?;

        Ok(self.apply(draft, &tally))
    }

    /// Apply a tally to a draft without touching storage
    pub fn apply(&self, draft: DraftSample, tally: &NeighborTally) -> Sample {
        let mut designation = draft.proposal.designation;
        let mut reasons = Vec::new();

        match decide(tally) {
            Decision::Keep => {
                tracing::debug!(
                    "No active neighbors near {}, keeping {}",
                    draft.working_point,
                    designation
                );
            }
            Decision::Conform(role) => {
                if role != designation {
                    tracing::debug!(
                        "Conforming sample at {} from {} to {} ({} active neighbors)",
                        draft.working_point,
                        designation,
                        role,
                        tally.active()
                    );
                }
                designation = role;
            }
            Decision::Mixed => {
                tracing::warn!(
                    "Mixed neighbor use near {}: {} training, {} validation",
                    draft.working_point,
                    tally.training,
                    tally.validation
                );
                reasons.push(MIXED_USE_REASON);
            }
        }

        if tally.same_field > 0 {
            tracing::warn!(
                "Sample at {} shares a field with {} existing samples",
                draft.working_point,
                tally.same_field
            );
            reasons.push(SAME_FIELD_REASON);
        }

        let validity = if reasons.is_empty() {
            Validity::Valid
        } else {
            Validity::Invalid(reasons.join("; "))
        };

        Sample {
            id: SampleId(0),
            raw_point: draft.raw_point,
            working_point: draft.working_point,
            offset: draft.offset,
            designation,
            // Conforming to training clears any lock
            locked: draft.proposal.locked && designation == Designation::Validation,
            validity,
            deleted: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Proposal;

    fn tally(training: usize, validation: usize) -> NeighborTally {
        NeighborTally { training, validation, ..Default::default() }
    }

    fn draft(proposal: Proposal) -> DraftSample {
        let point = GeoPoint::new(40.0, -110.0).unwrap();
        DraftSample { raw_point: point, working_point: point, offset: None, proposal }
    }

    #[test]
    fn test_decide_cases() {
        assert_eq!(decide(&tally(0, 0)), Decision::Keep);
        assert_eq!(decide(&tally(3, 0)), Decision::Conform(Designation::Training));
        assert_eq!(decide(&tally(0, 2)), Decision::Conform(Designation::Validation));
        assert_eq!(decide(&tally(1, 1)), Decision::Mixed);
        assert_eq!(decide(&tally(5, 1)), Decision::Mixed);
    }

    #[test]
    fn test_ignored_neighbors_do_not_count() {
        let only_ignored = NeighborTally { ignored: 4, ..Default::default() };
        assert_eq!(decide(&only_ignored), Decision::Keep);
    }

    #[test]
    fn test_keep_proposal_without_neighbors() {
        let enforcer = ConsistencyEnforcer::default();
        let sample = enforcer.apply(draft(Proposal::validation(true)), &tally(0, 0));
        assert_eq!(sample.designation, Designation::Validation);
        assert!(sample.locked);
        assert!(sample.validity.is_valid());
    }

    #[test]
    fn test_conform_to_training_clears_lock() {
        let enforcer = ConsistencyEnforcer::default();
        let sample = enforcer.apply(draft(Proposal::validation(true)), &tally(2, 0));
        assert_eq!(sample.designation, Designation::Training);
        assert!(!sample.locked);
        assert!(sample.validity.is_valid());
    }

    #[test]
    fn test_conform_to_validation() {
        let enforcer = ConsistencyEnforcer::default();
        let sample = enforcer.apply(draft(Proposal::training()), &tally(0, 1));
        assert_eq!(sample.designation, Designation::Validation);
        assert!(!sample.locked);
        assert!(sample.validity.is_valid());
    }

    #[test]
    fn test_mixed_neighbors_invalidate() {
        let enforcer = ConsistencyEnforcer::default();
        let sample = enforcer.apply(draft(Proposal::training()), &tally(1, 1));
        assert_eq!(sample.designation, Designation::Training);
        assert_eq!(sample.validity, Validity::Invalid(MIXED_USE_REASON.to_string()));
    }

    #[test]
    fn test_same_field_combines_reasons() {
        let crowded =
            NeighborTally { training: 1, validation: 1, same_field: 1, ..Default::default() };
        let sample = ConsistencyEnforcer::default().apply(draft(Proposal::training()), &crowded);
        let reason = sample.validity.reason().unwrap();
        assert!(reason.contains("mixed"));
        assert!(reason.contains("same field"));
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let config = EnforcerConfig { radius_m: 0.0, ..Default::default() };
        assert!(ConsistencyEnforcer::new(config).is_err());
    }
}
