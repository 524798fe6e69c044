//! Sample creation transaction.
//!
//! Reading neighbors, deciding, and inserting happen under one locality
//! guard sized to the neighborhood radius, so two submissions within the
//! radius of each other are finalized one after the other and the second
//! sees the first.

use geosample_core::config::LayeredConfig;
use geosample_core::integrity::{ConsistencyEnforcer, DesignationProposer, OffsetResolver};
use geosample_core::models::{Designation, DraftSample, GeoPoint, Proposal, Sample, SampleId};
use geosample_core::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::locks::LocalityLocks;
use crate::ports::SampleStore;

/// A raw observation as reported by a collector or imagery pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub lat: f64,
    pub lon: f64,

    /// Bearing to the field interior; `-1` or absent when not recorded
    #[serde(default)]
    pub bearing_deg: Option<f64>,

    /// Paced distance to the field interior in meters
    #[serde(default)]
    pub distance_m: Option<f64>,

    /// Proposed role; drawn at random when absent
    #[serde(default)]
    pub designation: Option<Designation>,
}

impl Submission {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self { lat, lon, bearing_deg: None, distance_m: None, designation: None }
    }

    pub fn with_offset(mut self, bearing_deg: f64, distance_m: f64) -> Self {
        self.bearing_deg = Some(bearing_deg);
        self.distance_m = Some(distance_m);
        self
    }

    pub fn with_designation(mut self, designation: Designation) -> Self {
        self.designation = Some(designation);
        self
    }
}

/// Validates, positions, and finalizes new samples against a store
pub struct SampleService<S: SampleStore> {
    store: Arc<S>,
    enforcer: ConsistencyEnforcer,
    proposer: DesignationProposer,
    resolver: OffsetResolver,
    locks: LocalityLocks,
    rng: Mutex<StdRng>,
}

impl<S: SampleStore> SampleService<S> {
    /// Build a service from layered configuration
    pub fn new(store: Arc<S>, config: &LayeredConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed.value {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let enforcer = ConsistencyEnforcer::new(config.enforcer())?;
        let locks = LocalityLocks::new(enforcer.config().radius_m);

        Ok(Self {
            store,
            enforcer,
            proposer: config.proposer(),
            resolver: OffsetResolver,
            locks,
            rng: Mutex::new(rng),
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run the creation transaction for one submission
    pub async fn submit(&self, submission: &Submission) -> Result<Sample> {
        let draft = self.prepare(submission).await?;
        self.commit(draft).await
    }

    /// Validate and position a submission and draw its proposal.
    ///
    /// Callers that fan out commits can prepare in input order so a seeded
    /// proposer gives the same proposals on every run.
    pub async fn prepare(&self, submission: &Submission) -> Result<DraftSample> {
        let raw = GeoPoint::new(submission.lat, submission.lon)?;
        let (working, offset) =
            self.resolver.resolve_report(&raw, submission.bearing_deg, submission.distance_m)?;
        let proposal = self.propose(submission.designation).await;

        Ok(DraftSample { raw_point: raw, working_point: working, offset, proposal })
    }

    /// Finalize a prepared draft against its neighborhood and store it
    pub async fn commit(&self, draft: DraftSample) -> Result<Sample> {
        let _guard = self.locks.acquire(&draft.working_point).await;
        let mut sample = self.enforcer.finalize(draft, self.store.as_ref()).await?;
        sample.id = self.store.insert(&sample).await?;

        match sample.validity.reason() {
            None => tracing::info!(
                "Stored sample {} at {} as {}",
                sample.id,
                sample.working_point,
                sample.designation
            ),
            Some(reason) => tracing::warn!(
                "Stored sample {} at {} for review: {}",
                sample.id,
                sample.working_point,
                reason
            ),
        }

        Ok(sample)
    }

    /// Soft-delete a sample; neighbors already finalized are left as they are
    pub async fn remove(&self, id: SampleId) -> Result<()> {
        self.store.soft_delete(id).await?;
        tracing::info!("Soft-deleted sample {}", id);
        Ok(())
    }

    async fn propose(&self, requested: Option<Designation>) -> Proposal {
        match requested {
            Some(Designation::Training) => Proposal::training(),
            Some(Designation::Validation) => Proposal::validation(false),
            None => {
                let mut rng = self.rng.lock().await;
                self.proposer.propose(&mut *rng)
            }
        }
    }
}
