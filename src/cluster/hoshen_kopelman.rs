//! Hoshen-Kopelman labeling on a union-find forest.
//!
//! # The Algorithm (Hoshen & Kopelman, 1976)
//!
//! Two raster passes over the flattened grid:
//!
//! 1. **Union pass**: every occupied site is merged with its occupied left and
//!    upper neighbors. Right and lower adjacencies are covered when the scan
//!    reaches those sites, so each adjacent pair is merged once.
//! 2. **Label pass**: every occupied site looks up its root. The first time a
//!    root is seen it receives the next label, starting at 1. Sizes (and sites,
//!    if tracked) are accumulated under the final label in the same pass.
//!
//! ## Complexity
//!
//! - **Time**: O(N² α(N²)) with path compression and union by size.
//! - **Space**: O(N²) for the parent, size, and root-to-label arrays.
//!
//! ## References
//!
//! Hoshen, J., Kopelman, R. (1976). "Percolation and cluster distribution. I.
//! Cluster multiple labeling technique and critical concentration algorithm."
//! Phys. Rev. B 14, 3438.

use super::summary::{ClusterAccumulator, Labeling};
use super::traits::ClusterLabeler;
use super::util::UnionFind;
use crate::error::Result;
use crate::grid::{LabelGrid, OccupancyGrid};

/// Root has not been given a label yet.
const UNASSIGNED: u32 = 0;

/// Union-find (Hoshen-Kopelman) labeler.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoshenKopelman;

impl HoshenKopelman {
    pub fn new() -> Self {
        Self
    }

    /// Merge every occupied site with its occupied left and upper neighbors.
    fn union_pass(cells: &[bool], side: usize) -> UnionFind {
        let mut uf = UnionFind::new(cells.len());

        for row in 0..side {
            for col in 0..side {
                let current = row * side + col;
                if !cells[current] {
                    continue;
                }
                if col > 0 && cells[current - 1] {
                    uf.union(current, current - 1);
                }
                if row > 0 && cells[current - side] {
                    uf.union(current, current - side);
                }
            }
        }

        uf
    }
}

impl ClusterLabeler for HoshenKopelman {
    fn label_clusters(&self, grid: &OccupancyGrid, track_sites: bool) -> Result<Labeling> {
        let side = grid.side()?;
        let cells = grid.as_slice();

        let mut uf = Self::union_pass(cells, side);

        let mut labels = LabelGrid::zeros(side);
        let mut root_label = vec![UNASSIGNED; cells.len()];
        let mut acc = ClusterAccumulator::new(track_sites);

        for (index, &occupied) in cells.iter().enumerate() {
            if !occupied {
                continue;
            }
            let root = uf.find(index);
            if root_label[root] == UNASSIGNED {
                root_label[root] = acc.open()?;
            }
            let label = root_label[root];
            labels.set(index, label);
            acc.record(label, index / side, index % side);
        }

        Ok(Labeling::new(labels, acc.finish()))
    }

    fn name(&self) -> &'static str {
        "union-find"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn grid(rows: &[&str]) -> OccupancyGrid {
        OccupancyGrid::from_rows(
            rows.iter()
                .map(|r| r.chars().map(|c| c == '#').collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_hk_u_shape_merges_late() {
        // The two arms only meet on the last row, so the union pass has to
        // merge two already-grown sets.
        let g = grid(&["#.#", "#.#", "###"]);
        let result = HoshenKopelman.label_clusters(&g, false).unwrap();
        assert_eq!(result.clusters().len(), 1);
        assert_eq!(result.clusters().sizes(), vec![7]);
        assert!(result.labels().as_slice().iter().all(|&l| l <= 1));
    }

    #[test]
    fn test_hk_sites_in_raster_order() {
        let g = grid(&["##", "#."]);
        let result = HoshenKopelman.label_clusters(&g, true).unwrap();
        assert_eq!(
            result.clusters().get(1).unwrap().sites,
            vec![(0, 0), (0, 1), (1, 0)]
        );
    }

    #[test]
    fn test_hk_dense_labels_from_one() {
        let g = grid(&["#.#.", "....", "..##", "#..."]);
        let result = HoshenKopelman.label_clusters(&g, false).unwrap();
        assert_eq!(result.labels().distinct_labels(), vec![1, 2, 3, 4]);
        assert_eq!(result.labels().get(2, 3), 3);
    }

    #[test]
    fn test_hk_union_pass_sizes() {
        let g = grid(&["##.", ".#.", "..#"]);
        let mut uf = HoshenKopelman::union_pass(g.as_slice(), 3);
        assert_eq!(uf.set_size(0), 3);
        assert!(uf.connected(0, 4));
        assert!(!uf.connected(4, 8));
    }

    #[test]
    fn test_hk_rejects_rectangular() {
        let g = OccupancyGrid::filled(10, 20, false).unwrap();
        assert!(matches!(
            HoshenKopelman.label_clusters(&g, true),
            Err(Error::InvalidShape { .. })
        ));
    }
}
