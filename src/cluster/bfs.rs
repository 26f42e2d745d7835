//! Breadth-first cluster labeling.
//!
//! The reference labeler. Scans sites in raster order; every occupied site that
//! has no label yet seeds a new cluster, which is flooded with a FIFO queue over
//! the four edge-neighbors.
//!
//! ## Complexity
//!
//! - **Time**: O(N²). Each site is enqueued at most once.
//! - **Space**: O(N²) for the label grid plus the queue.
//!
//! Sites are marked when they are enqueued, not when they are popped, so no site
//! ever enters the queue twice.

use std::collections::VecDeque;

use super::summary::{ClusterAccumulator, Labeling};
use super::traits::ClusterLabeler;
use crate::error::Result;
use crate::grid::{LabelGrid, OccupancyGrid};

/// Breadth-first search labeler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bfs;

impl Bfs {
    pub fn new() -> Self {
        Self
    }

    /// Flood one cluster starting at `seed`, writing `label` to every member.
    fn flood(
        cells: &[bool],
        side: usize,
        seed: usize,
        label: u32,
        labels: &mut LabelGrid,
        queue: &mut VecDeque<usize>,
        acc: &mut ClusterAccumulator,
    ) {
        labels.set(seed, label);
        queue.push_back(seed);

        while let Some(index) = queue.pop_front() {
            let (row, col) = (index / side, index % side);
            acc.record(label, row, col);

            let mut visit = |neighbor: usize| {
                if cells[neighbor] && labels.at(neighbor) == 0 {
                    labels.set(neighbor, label);
                    queue.push_back(neighbor);
                }
            };

            if row > 0 {
                visit(index - side);
            }
            if row + 1 < side {
                visit(index + side);
            }
            if col > 0 {
                visit(index - 1);
            }
            if col + 1 < side {
                visit(index + 1);
            }
        }
    }
}

impl ClusterLabeler for Bfs {
    fn label_clusters(&self, grid: &OccupancyGrid, track_sites: bool) -> Result<Labeling> {
        let side = grid.side()?;
        let cells = grid.as_slice();

        let mut labels = LabelGrid::zeros(side);
        let mut acc = ClusterAccumulator::new(track_sites);
        let mut queue = VecDeque::new();

        for index in 0..cells.len() {
            if !cells[index] || labels.at(index) != 0 {
                continue;
            }
            let label = acc.open()?;
            Self::flood(cells, side, index, label, &mut labels, &mut queue, &mut acc);
        }

        Ok(Labeling::new(labels, acc.finish()))
    }

    fn name(&self) -> &'static str {
        "bfs"
    }
}
