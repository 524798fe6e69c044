//! Advisory locks keyed by coarse spatial buckets.
//!
//! Buckets are rows of 0.1° latitude, each cut into longitude cells about
//! 0.1° wide at the row's poleward edge, so rows near the poles hold few
//! cells. A guard covers every bucket touched by the neighborhood prefilter
//! boxes of its point, plus one bucket of margin. When two points are within
//! the radius, each lies inside the other's boxes, so their guards share at
//! least one bucket. Buckets are locked in sorted order.
//!
//! Entries are dropped from the table when the last guard using them is
//! released. An acquisition cancelled while waiting leaves its entries until
//! a later guard over the same buckets is released.
//!
//! The bucket table uses `Mutex::unwrap()` intentionally, as the in-memory
//! store does.

use geosample_core::models::GeoPoint;
use geosample_core::ports::{prefilter_boxes, PREFILTER_DEGREES};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// `(lat_row, lon_cell)`; the cell index is relative to the row's cell count
type BucketKey = (i32, i32);

type BucketTable = Arc<Mutex<HashMap<BucketKey, Arc<AsyncMutex<()>>>>>;

/// Number of 0.1° cells around the equator
const EQUATOR_CELLS: f64 = 3600.0;

const MIN_ROW: i32 = -900;
const MAX_ROW: i32 = 899;

fn row_of(lat: f64) -> i32 {
    ((lat / PREFILTER_DEGREES).floor() as i32).clamp(MIN_ROW, MAX_ROW)
}

/// Longitude cells in a latitude row, sized at the row's poleward edge
fn cells_in_row(row: i32) -> i32 {
    let south = row as f64 * PREFILTER_DEGREES;
    let north = south + PREFILTER_DEGREES;
    let poleward = south.abs().max(north.abs()).min(90.0);
    ((EQUATOR_CELLS * poleward.to_radians().cos()).floor() as i32).max(1)
}

/// Buckets a guard for `point` must hold when neighbors are read within
/// `radius_m`, sorted and deduplicated
pub fn bucket_block(point: &GeoPoint, radius_m: f64) -> Vec<BucketKey> {
    let mut keys = BTreeSet::new();

    for (min, max) in prefilter_boxes(point, radius_m) {
        let first_row = row_of(min[1]).saturating_sub(1).max(MIN_ROW);
        let last_row = row_of(max[1]).saturating_add(1).min(MAX_ROW);

        for row in first_row..=last_row {
            let cells = cells_in_row(row);
            let width = 360.0 / cells as f64;
            let first = ((min[0] + 180.0) / width).floor() as i32 - 1;
            let last = ((max[0] + 180.0) / width).floor() as i32 + 1;

            if last - first + 1 >= cells {
                keys.extend((0..cells).map(|cell| (row, cell)));
            } else {
                keys.extend((first..=last).map(|cell| (row, cell.rem_euclid(cells))));
            }
        }
    }

    keys.into_iter().collect()
}

/// Table of per-bucket locks for one neighborhood radius
#[derive(Debug, Clone)]
pub struct LocalityLocks {
    radius_m: f64,
    buckets: BucketTable,
}

/// Held bucket locks; released on drop
#[derive(Debug)]
pub struct LocalityGuard {
    held: Vec<OwnedMutexGuard<()>>,
    keys: Vec<BucketKey>,
    buckets: BucketTable,
}

impl LocalityLocks {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m, buckets: Arc::default() }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Wait for exclusive access to the locality around `point`
    pub async fn acquire(&self, point: &GeoPoint) -> LocalityGuard {
        let keys = bucket_block(point, self.radius_m);
        let locks: Vec<Arc<AsyncMutex<()>>> = {
            let mut buckets = self.buckets.lock().unwrap();
            keys.iter().map(|key| buckets.entry(*key).or_default().clone()).collect()
        };

        let mut held = Vec::with_capacity(locks.len());
        for lock in locks {
            held.push(lock.lock_owned().await);
        }

        tracing::trace!("Locked {} buckets around {}", keys.len(), point);
        LocalityGuard { held, keys, buckets: Arc::clone(&self.buckets) }
    }

    /// Number of buckets currently tracked
    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().unwrap().len()
    }
}

impl Drop for LocalityGuard {
    fn drop(&mut self) {
        self.held.clear();

        // Clones are only taken under the table lock, so a count of one means
        // no guard holds or waits on the bucket.
        let mut buckets = self.buckets.lock().unwrap();
        for key in &self.keys {
            if buckets.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
                buckets.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosample_core::geodesy;
    use std::time::Duration;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn shares_bucket(a: &GeoPoint, b: &GeoPoint, radius_m: f64) -> bool {
        let first = bucket_block(a, radius_m);
        bucket_block(b, radius_m).iter().any(|key| first.contains(key))
    }

    #[test]
    fn test_block_is_sorted() {
        let block = bucket_block(&point(40.05, -109.95), 1000.0);
        assert!(block.len() >= 9);
        assert!(block.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rows_near_pole_have_few_cells() {
        assert_eq!(cells_in_row(0), 3599);
        assert!(cells_in_row(895) < 30);
        assert_eq!(cells_in_row(MAX_ROW), 1);
        assert_eq!(cells_in_row(MIN_ROW), 1);
    }

    #[test]
    fn test_block_wraps_antimeridian() {
        assert!(shares_bucket(&point(0.05, -179.95), &point(0.05, 179.95), 1000.0));
    }

    #[test]
    fn test_block_grows_with_radius() {
        let origin = point(40.0, -110.0);
        let far = point(40.0, -109.0);
        assert!(!shares_bucket(&origin, &far, 1000.0));
        assert!(shares_bucket(&origin, &far, 100_000.0));
    }

    #[test]
    fn test_points_within_radius_share_bucket() {
        let cases = [
            (point(40.0, -110.0), 1000.0),
            (point(89.5, 0.0), 1000.0),
            (point(-89.9, 45.0), 1000.0),
            (point(75.0, 179.99), 5000.0),
            (point(10.0, 10.0), 50_000.0),
            (point(60.0, -20.0), 200_000.0),
        ];

        for (origin, radius) in cases {
            for bearing in (0..360).step_by(15) {
                let other =
                    geodesy::destination(&origin, bearing as f64, radius * 0.999).unwrap();
                assert!(
                    shares_bucket(&origin, &other, radius),
                    "{} and {} within {} m share no bucket",
                    origin,
                    other,
                    radius
                );
            }
        }
    }

    #[test]
    fn test_block_stays_small_near_pole() {
        assert!(bucket_block(&point(89.95, 0.0), 1000.0).len() < 100);
    }

    #[tokio::test]
    async fn test_nearby_points_contend() {
        let locks = LocalityLocks::new(1000.0);
        let guard = locks.acquire(&point(40.0, -110.0)).await;

        let nearby = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire(&point(40.005, -110.005)),
        )
        .await;
        assert!(nearby.is_err());

        drop(guard);
        let _again = locks.acquire(&point(40.005, -110.005)).await;
    }

    #[tokio::test]
    async fn test_distant_points_do_not_contend() {
        let locks = LocalityLocks::new(1000.0);
        let _guard = locks.acquire(&point(40.0, -110.0)).await;

        let distant =
            tokio::time::timeout(Duration::from_millis(50), locks.acquire(&point(10.0, 20.0)))
                .await;
        assert!(distant.is_ok());
    }

    #[tokio::test]
    async fn test_released_buckets_are_pruned() {
        let locks = LocalityLocks::new(1000.0);

        let first = locks.acquire(&point(40.0, -110.0)).await;
        let second = locks.acquire(&point(10.0, 20.0)).await;
        let tracked = locks.bucket_count();
        assert_eq!(
            tracked,
            bucket_block(&point(40.0, -110.0), 1000.0).len()
                + bucket_block(&point(10.0, 20.0), 1000.0).len()
        );

        drop(first);
        assert_eq!(locks.bucket_count(), bucket_block(&point(10.0, 20.0), 1000.0).len());

        drop(second);
        assert_eq!(locks.bucket_count(), 0);
    }

    #[tokio::test]
    async fn test_waiting_guard_keeps_shared_buckets() {
        let locks = LocalityLocks::new(1000.0);
        let guard = locks.acquire(&point(40.0, -110.0)).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&point(40.001, -110.0)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(locks.bucket_count(), 0);
    }
}
