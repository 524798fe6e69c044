//! Geosample Store - Sample storage ports and adapters
//!
//! This crate defines the sample storage port, an in-memory adapter that also
//! answers neighborhood queries, and the service that runs the sample
//! creation transaction under locality locks.

pub mod locks;
pub mod memory;
pub mod ports;
pub mod service;

pub use locks::{LocalityGuard, LocalityLocks};
pub use memory::MemorySampleStore;
pub use ports::SampleStore;
pub use service::{SampleService, Submission};
