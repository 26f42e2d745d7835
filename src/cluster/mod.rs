//! Connected-cluster labeling on the square lattice.
//!
//! Given an N×N occupancy grid, find every maximal set of occupied sites joined
//! through edge-sharing neighbors (4-connectivity; diagonal contact never
//! counts), give each set a positive label, and summarize it.
//!
//! ## Strategies
//!
//! ### Breadth-first search
//!
//! Flood fill from each unlabeled occupied site. Simple, obviously correct,
//! and used as the oracle for the union-find path.
//!
//! ### Hoshen-Kopelman
//!
//! Two raster passes over a disjoint-set forest (path compression, union by
//! size). Near-linear and the default.
//!
//! Both strategies number clusters densely from 1 in raster order of each
//! cluster's first site. Comparisons between them should still only look at the
//! induced partition and the multiset of sizes.
//!
//! ## Usage
//!
//! ```rust
//! use percolate::cluster::{Algorithm, Bfs, ClusterLabeler, HoshenKopelman};
//! use percolate::OccupancyGrid;
//!
//! let grid = OccupancyGrid::from_rows(vec![
//!     vec![true, true, false],
//!     vec![false, false, false],
//!     vec![false, true, true],
//! ])
//! .unwrap();
//!
//! let a = Bfs.label_clusters(&grid, false).unwrap();
//! let b = HoshenKopelman.label_clusters(&grid, false).unwrap();
//! assert_eq!(a.clusters().sorted_sizes(), b.clusters().sorted_sizes());
//!
//! // Or select at runtime.
//! let labeler = "bfs".parse::<Algorithm>().unwrap().labeler();
//! assert_eq!(labeler.label_clusters(&grid, true).unwrap().clusters().len(), 2);
//! ```

mod algorithm;
mod bfs;
mod hoshen_kopelman;
mod summary;
mod traits;
mod util;

pub use algorithm::Algorithm;
pub use bfs::Bfs;
pub use hoshen_kopelman::HoshenKopelman;
pub use summary::{ClusterCollection, ClusterRecord, Labeling};
pub use traits::ClusterLabeler;
pub use util::UnionFind;
