use async_trait::async_trait;
use geosample_core::models::{Sample, SampleId};
use geosample_core::ports::NeighborhoodIndex;
use geosample_core::Result;

/// Port for sample storage.
///
/// Every store also answers radius queries, so the consistency check reads
/// the same data it writes to.
#[async_trait]
pub trait SampleStore: NeighborhoodIndex + Send + Sync {
    /// Store a finalized sample and return its assigned ID.
    ///
    /// Fails with `DuplicateLocation` when a sample already sits at the exact
    /// same working point.
    async fn insert(&self, sample: &Sample) -> Result<SampleId>;

    /// Retrieve a sample by ID, including soft-deleted ones
    async fn get(&self, id: SampleId) -> Result<Option<Sample>>;

    /// Mark a sample deleted; it stays stored but drops out of neighbor tallies
    async fn soft_delete(&self, id: SampleId) -> Result<()>;

    /// List all samples ordered by ID
    async fn list(&self) -> Result<Vec<Sample>>;

    /// Number of stored samples, soft-deleted ones included
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
