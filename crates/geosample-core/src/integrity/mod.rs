//! Sample integrity
//!
//! Resolves a reported point to the field interior, proposes a dataset role,
//! and enforces that co-located samples do not straddle both roles.

pub mod consistency;
pub mod offset;
pub mod proposal;

pub use consistency::{
    decide, ConsistencyEnforcer, Decision, EnforcerConfig, NeighborTally, MIXED_USE_REASON,
    SAME_FIELD_REASON,
};
pub use offset::OffsetResolver;
pub use proposal::DesignationProposer;
