pub mod point;
pub mod polygon;
pub mod sample;

pub use point::GeoPoint;
pub use polygon::{LandPolygon, NamedPolygon};
pub use sample::{
    Designation, DraftSample, FieldOffset, Proposal, Sample, SampleId, Validity, NO_BEARING,
};
