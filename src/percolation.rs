//! Top-to-bottom spanning check.

use std::collections::BTreeSet;

use crate::cluster::ClusterCollection;
use crate::grid::LabelGrid;

/// Outcome of a spanning check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Percolation {
    /// Label of a cluster touching both the first and the last row.
    pub spanning: Option<u32>,
}

impl Percolation {
    pub fn percolates(&self) -> bool {
        self.spanning.is_some()
    }
}

/// Decide whether any cluster touches both row 0 and row N-1.
///
/// When several clusters span, the smallest label is reported. Callers should
/// not rely on which one.
pub fn check_percolation(labels: &LabelGrid, clusters: &ClusterCollection) -> Percolation {
    if clusters.is_empty() {
        return Percolation::default();
    }

    let last = labels.side() - 1;
    let top: BTreeSet<u32> = labels.row(0).iter().copied().filter(|&l| l > 0).collect();
    let spanning = labels
        .row(last)
        .iter()
        .copied()
        .filter(|l| top.contains(l))
        .min();

    Percolation { spanning }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(side: usize, labels: Vec<u32>) -> Percolation {
        let labels = LabelGrid::from_flat(side, labels).unwrap();
        let clusters = ClusterCollection::from_labels(&labels, false);
        check_percolation(&labels, &clusters)
    }

    #[test]
    fn test_empty_collection_does_not_percolate() {
        let p = check(3, vec![0; 9]);
        assert!(!p.percolates());
        assert_eq!(p.spanning, None);
    }

    #[test]
    fn test_single_row_grid() {
        // With N = 1 the first and last rows coincide.
        assert_eq!(check(1, vec![1]).spanning, Some(1));
    }

    #[test]
    fn test_reports_smallest_spanning_label() {
        #[rustfmt::skip]
        let labels = vec![
            3, 0, 2,
            3, 0, 2,
            3, 0, 2,
        ];
        assert_eq!(check(3, labels).spanning, Some(2));
    }

    #[test]
    fn test_top_and_bottom_clusters_differ() {
        #[rustfmt::skip]
        let labels = vec![
            1, 1, 0,
            0, 0, 0,
            0, 2, 2,
        ];
        assert!(!check(3, labels).percolates());
    }
}
