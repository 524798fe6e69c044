//! In-memory sample storage for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state.
//!
//! Locks are always taken in the order samples, tree, next ID.

use async_trait::async_trait;
use geosample_core::geodesy;
use geosample_core::models::{GeoPoint, Sample, SampleId};
use geosample_core::ports::{prefilter_boxes, NeighborhoodIndex};
use geosample_core::{GeosampleError, Result};
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::ports::SampleStore;

/// Working point in `[lon, lat]` order tagged with its sample
type IndexedSample = GeomWithData<[f64; 2], SampleId>;

fn tree_point(point: &GeoPoint) -> [f64; 2] {
    [point.lon(), point.lat()]
}

/// In-memory implementation of SampleStore and NeighborhoodIndex
#[derive(Debug, Clone)]
pub struct MemorySampleStore {
    samples: Arc<RwLock<HashMap<SampleId, Sample>>>,
    tree: Arc<RwLock<RTree<IndexedSample>>>,
    next_id: Arc<RwLock<u64>>,
}

impl Default for MemorySampleStore {
    fn default() -> Self {
        Self {
            samples: Arc::default(),
            tree: Arc::new(RwLock::new(RTree::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }
}

impl MemorySampleStore {
    /// Create a new in-memory sample store
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample IDs whose working point falls in any prefilter box around `center`
    fn candidates(&self, center: &GeoPoint, meters: f64) -> BTreeSet<SampleId> {
        let tree = self.tree.read().unwrap();
        prefilter_boxes(center, meters)
            .into_iter()
            .flat_map(|(min, max)| {
                tree.locate_in_envelope(&AABB::from_corners(min, max))
                    .map(|indexed| indexed.data)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

#[async_trait]
impl NeighborhoodIndex for MemorySampleStore {
    async fn within_radius(&self, center: &GeoPoint, meters: f64) -> Result<Vec<Sample>> {
        let candidates = self.candidates(center, meters);
        let samples = self.samples.read().unwrap();

        let mut neighbors = Vec::new();
        for id in candidates {
            let Some(sample) = samples.get(&id) else {
                continue;
            };
            if geodesy::distance(center, &sample.working_point)? <= meters {
                neighbors.push(sample.clone());
            }
        }

        tracing::debug!("{} samples within {} m of {}", neighbors.len(), meters, center);
        Ok(neighbors)
    }
}

#[async_trait]
impl SampleStore for MemorySampleStore {
    async fn insert(&self, sample: &Sample) -> Result<SampleId> {
        let mut samples = self.samples.write().unwrap();
        let mut tree = self.tree.write().unwrap();
        let mut next_id = self.next_id.write().unwrap();

        let point = tree_point(&sample.working_point);
        if tree.locate_all_at_point(&point).next().is_some() {
            return Err(GeosampleError::DuplicateLocation {
                lat: sample.working_point.lat(),
                lon: sample.working_point.lon(),
            });
        }

        let id = SampleId(*next_id);
        *next_id += 1;

        let mut stored = sample.clone();
        stored.id = id;

        tree.insert(IndexedSample::new(point, id));
        samples.insert(id, stored);
        Ok(id)
    }

    async fn get(&self, id: SampleId) -> Result<Option<Sample>> {
        let samples = self.samples.read().unwrap();
        Ok(samples.get(&id).cloned())
    }

    async fn soft_delete(&self, id: SampleId) -> Result<()> {
        let mut samples = self.samples.write().unwrap();
        match samples.get_mut(&id) {
            Some(sample) => {
                sample.deleted = true;
                Ok(())
            }
            None => Err(GeosampleError::SampleNotFound { id: id.0 }),
        }
    }

    async fn list(&self) -> Result<Vec<Sample>> {
        let samples = self.samples.read().unwrap();
        let mut all: Vec<Sample> = samples.values().cloned().collect();
        all.sort_by_key(|sample| sample.id);
        Ok(all)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.samples.read().unwrap().len())
    }
}
