//! Site percolation on the square lattice.
//!
//! `percolate` labels 4-connected clusters of occupied sites, checks whether a
//! cluster spans the grid from top to bottom, aggregates statistics over many
//! random trials, and estimates the critical probability p_c.
//!
//! The primary public API is under [`cluster`], which provides:
//! - breadth-first labeling (reference)
//! - Hoshen-Kopelman union-find labeling (fast path)
//!
//! Around it sit [`percolation`] (spanning check), [`trials`] (Monte Carlo
//! batches and p sweeps) and [`estimate`] (sigmoid fit for p_c).

#![forbid(unsafe_code)]

pub mod cluster;
pub mod error;
pub mod estimate;
pub mod grid;
pub mod percolation;
pub mod trials;

pub use cluster::{
    Algorithm, Bfs, ClusterCollection, ClusterLabeler, ClusterRecord, HoshenKopelman, Labeling,
    UnionFind,
};
pub use error::{Error, Result};
pub use estimate::{estimate_pc, FitParams, PcAnalysis, PcEstimate, THEORETICAL_PC_2D_SQUARE};
pub use grid::{LabelGrid, OccupancyGrid};
pub use percolation::{check_percolation, Percolation};
pub use trials::{run_sweep, run_trials, SweepConfig, SweepResult, TrialConfig, TrialStats};

/// Label `grid` with the default strategy.
pub fn label_clusters(grid: &OccupancyGrid, track_sites: bool) -> Result<Labeling> {
    Algorithm::default().labeler().label_clusters(grid, track_sites)
}
