use super::summary::Labeling;
use crate::error::Result;
use crate::grid::OccupancyGrid;

/// Common interface for connected-component labelers on the square lattice.
///
/// Implementations are stateless: the result depends only on the grid and the
/// `track_sites` flag.
pub trait ClusterLabeler: Send + Sync {
    /// Label every 4-connected cluster of occupied sites.
    ///
    /// Fails with [`Error::InvalidShape`](crate::Error::InvalidShape) if the grid is
    /// not square. With `track_sites == false` every record's `sites` is empty.
    fn label_clusters(&self, grid: &OccupancyGrid, track_sites: bool) -> Result<Labeling>;

    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;
}
