use rand::Rng;

use crate::models::Proposal;

/// Random weighting that assigns a new sample its proposed dataset role.
///
/// The RNG is supplied by the caller so runs can be seeded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignationProposer {
    validation_weight: f64,
    lock_weight: f64,
}

impl Default for DesignationProposer {
    fn default() -> Self {
        Self::new(1.0 / 3.0, 0.5)
    }
}

impl DesignationProposer {
    /// `validation_weight` is the chance of proposing Validation;
    /// `lock_weight` is the chance such a proposal is locked.
    /// Both are clamped into `[0, 1]`.
    pub fn new(validation_weight: f64, lock_weight: f64) -> Self {
        Self {
            validation_weight: validation_weight.clamp(0.0, 1.0),
            lock_weight: lock_weight.clamp(0.0, 1.0),
        }
    }

    pub fn validation_weight(&self) -> f64 {
        self.validation_weight
    }

    pub fn propose<R: Rng + ?Sized>(&self, rng: &mut R) -> Proposal {
        if rng.gen_bool(self.validation_weight) {
            Proposal::validation(rng.gen_bool(self.lock_weight))
        } else {
            Proposal::training()
        }
    }
}
