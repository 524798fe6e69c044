//! End-to-end checks of the consistency enforcer against a simple index

use async_trait::async_trait;
use chrono::Utc;
use geosample_core::geodesy;
use geosample_core::integrity::{ConsistencyEnforcer, EnforcerConfig, OffsetResolver};
use geosample_core::models::{
    Designation, DraftSample, GeoPoint, Proposal, Sample, SampleId, Validity,
};
use geosample_core::ports::NeighborhoodIndex;
use geosample_core::{GeosampleError, Result};
use std::time::Duration;

/// Linear-scan index over a fixed set of samples
struct ScanIndex {
    samples: Vec<Sample>,
}

#[async_trait]
impl NeighborhoodIndex for ScanIndex {
    async fn within_radius(&self, center: &GeoPoint, meters: f64) -> Result<Vec<Sample>> {
        let mut found = Vec::new();
        for sample in &self.samples {
            if geodesy::distance(center, &sample.working_point)? <= meters {
                found.push(sample.clone());
            }
        }
        Ok(found)
    }
}

/// Index that never answers in time
struct StalledIndex;

#[async_trait]
impl NeighborhoodIndex for StalledIndex {
    async fn within_radius(&self, _center: &GeoPoint, _meters: f64) -> Result<Vec<Sample>> {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(Vec::new())
    }
}

fn stored(id: u64, point: GeoPoint, designation: Designation, validity: Validity) -> Sample {
    Sample {
        id: SampleId(id),
        raw_point: point,
        working_point: point,
        offset: None,
        designation,
        locked: false,
        validity,
        deleted: false,
        created_at: Utc::now(),
    }
}

fn draft(point: GeoPoint, proposal: Proposal) -> DraftSample {
    DraftSample { raw_point: point, working_point: point, offset: None, proposal }
}

fn point_a() -> GeoPoint {
    GeoPoint::new(40.0, -110.0).unwrap()
}

#[tokio::test]
async fn test_scenario_a_adjacent_validation_wins() {
    let index = ScanIndex {
        samples: vec![stored(1, point_a(), Designation::Validation, Validity::Valid)],
    };
    let new_point = GeoPoint::new(40.00000001, -110.0).unwrap();

    let sample = ConsistencyEnforcer::default()
        .finalize(draft(new_point, Proposal::training()), &index)
        .await
        .unwrap();

    assert_eq!(sample.designation, Designation::Validation);
    assert!(sample.validity.is_valid());
}

#[tokio::test]
async fn test_scenario_b_between_mixed_neighbors() {
    let c = geodesy::destination(&point_a(), 90.0, 750.0).unwrap();
    let d = geodesy::destination(&point_a(), 90.0, 375.0).unwrap();
    let index = ScanIndex {
        samples: vec![
            stored(1, point_a(), Designation::Validation, Validity::Valid),
            stored(2, c, Designation::Training, Validity::Valid),
        ],
    };

    let sample = ConsistencyEnforcer::default()
        .finalize(draft(d, Proposal::training()), &index)
        .await
        .unwrap();

    assert!(!sample.validity.is_valid());
    assert!(sample.validity.reason().unwrap().contains("mixed"));
}

#[tokio::test]
async fn test_inactive_neighbors_are_ignored() {
    let mut deleted = stored(1, point_a(), Designation::Training, Validity::Valid);
    deleted.deleted = true;
    let invalid = stored(
        2,
        geodesy::destination(&point_a(), 0.0, 100.0).unwrap(),
        Designation::Validation,
        Validity::Invalid("neighbor sample use is mixed".to_string()),
    );
    let index = ScanIndex { samples: vec![deleted, invalid] };

    let sample = ConsistencyEnforcer::default()
        .finalize(draft(point_a(), Proposal::validation(true)), &index)
        .await
        .unwrap();

    assert_eq!(sample.designation, Designation::Validation);
    assert!(sample.locked);
    assert!(sample.validity.is_valid());
}

#[tokio::test]
async fn test_neighbors_outside_radius_are_ignored() {
    let far = geodesy::destination(&point_a(), 45.0, 1500.0).unwrap();
    let index =
        ScanIndex { samples: vec![stored(1, far, Designation::Validation, Validity::Valid)] };

    let sample = ConsistencyEnforcer::default()
        .finalize(draft(point_a(), Proposal::training()), &index)
        .await
        .unwrap();

    assert_eq!(sample.designation, Designation::Training);
}

#[tokio::test]
async fn test_same_field_radius_invalidates() {
    let close = geodesy::destination(&point_a(), 180.0, 20.0).unwrap();
    let index =
        ScanIndex { samples: vec![stored(1, close, Designation::Training, Validity::Valid)] };
    let enforcer = ConsistencyEnforcer::new(EnforcerConfig {
        same_field_radius_m: Some(50.0),
        ..Default::default()
    })
    .unwrap();

    let sample = enforcer.finalize(draft(point_a(), Proposal::training()), &index).await.unwrap();

    assert_eq!(sample.designation, Designation::Training);
    assert_eq!(sample.validity, Validity::Invalid("same field as another location".to_string()));
}

#[tokio::test]
async fn test_offset_point_is_checked_not_raw_point() {
    // The raw report sits on a training sample; the field is 1500 m north
    let north = geodesy::destination(&point_a(), 0.0, 1800.0).unwrap();
    let index = ScanIndex {
        samples: vec![
            stored(1, point_a(), Designation::Training, Validity::Valid),
            stored(2, north, Designation::Validation, Validity::Valid),
        ],
    };

    let (working, offset) =
        OffsetResolver.resolve_report(&point_a(), Some(0.0), Some(1500.0)).unwrap();
    let draft = DraftSample {
        raw_point: point_a(),
        working_point: working,
        offset,
        proposal: Proposal::training(),
    };

    let sample = ConsistencyEnforcer::default().finalize(draft, &index).await.unwrap();

    assert_eq!(sample.raw_point, point_a());
    assert_eq!(sample.designation, Designation::Validation);
    assert!(sample.validity.is_valid());
}

#[tokio::test]
async fn test_slow_index_times_out() {
    let enforcer = ConsistencyEnforcer::new(EnforcerConfig {
        timeout: Duration::from_millis(20),
        ..Default::default()
    })
    .unwrap();

    let result = enforcer.finalize(draft(point_a(), Proposal::training()), &StalledIndex).await;
    assert!(matches!(result, Err(GeosampleError::NeighborhoodTimeout { timeout_ms: 20 })));
}
