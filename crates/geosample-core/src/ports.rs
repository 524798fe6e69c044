//! Port trait definitions
//!
//! These traits define the interfaces that storage adapters must implement.

pub mod neighborhood;

pub use neighborhood::{prefilter_boxes, NeighborhoodIndex, PrefilterBox, PREFILTER_DEGREES};
