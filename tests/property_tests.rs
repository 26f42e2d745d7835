use percolate::cluster::{Algorithm, Bfs, ClusterCollection, ClusterLabeler, HoshenKopelman};
use percolate::OccupancyGrid;
use proptest::prelude::*;

/// Square grids from 1×1 to 24×24 with arbitrary occupancy.
fn square_grid() -> impl Strategy<Value = OccupancyGrid> {
    (1usize..=24).prop_flat_map(|n| {
        prop::collection::vec(any::<bool>(), n * n)
            .prop_map(move |cells| OccupancyGrid::from_flat(n, n, cells).unwrap())
    })
}

/// Every pair of occupied edge-neighbors must carry the same label.
fn assert_partition_is_components(grid: &OccupancyGrid, labels: &[u32]) {
    let n = grid.rows();
    for row in 0..n {
        for col in 0..n {
            let here = labels[row * n + col];
            if col + 1 < n && grid.get(row, col) && grid.get(row, col + 1) {
                let right = labels[row * n + col + 1];
                assert_eq!(here, right, "right neighbor split at ({row}, {col})");
            }
            if row + 1 < n && grid.get(row, col) && grid.get(row + 1, col) {
                let lower = labels[(row + 1) * n + col];
                assert_eq!(here, lower, "lower neighbor split at ({row}, {col})");
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_conservation(grid in square_grid()) {
        for algorithm in Algorithm::ALL {
            let result = algorithm.labeler().label_clusters(&grid, false).unwrap();
            prop_assert_eq!(result.clusters().total_sites(), grid.occupied_count());
        }
    }

    #[test]
    fn prop_labels_mark_exactly_occupied(grid in square_grid()) {
        for algorithm in Algorithm::ALL {
            let result = algorithm.labeler().label_clusters(&grid, false).unwrap();
            prop_assert_eq!(result.labels().occupancy_pattern(), grid.as_slice().to_vec());
        }
    }

    #[test]
    fn prop_bfs_and_union_find_agree(grid in square_grid()) {
        let bfs = Bfs.label_clusters(&grid, false).unwrap();
        let uf = HoshenKopelman.label_clusters(&grid, false).unwrap();

        prop_assert_eq!(bfs.clusters().len(), uf.clusters().len());
        prop_assert_eq!(bfs.clusters().sorted_sizes(), uf.clusters().sorted_sizes());
        prop_assert_eq!(bfs.labels().occupancy_pattern(), uf.labels().occupancy_pattern());
        prop_assert_eq!(bfs.percolation().percolates(), uf.percolation().percolates());
    }

    #[test]
    fn prop_adjacent_occupied_share_label(grid in square_grid()) {
        for algorithm in Algorithm::ALL {
            let result = algorithm.labeler().label_clusters(&grid, false).unwrap();
            assert_partition_is_components(&grid, result.labels().as_slice());
        }
    }

    #[test]
    fn prop_sites_match_labels(grid in square_grid()) {
        for algorithm in Algorithm::ALL {
            let result = algorithm.labeler().label_clusters(&grid, true).unwrap();
            for cluster in result.clusters() {
                prop_assert_eq!(cluster.sites.len(), cluster.size);
                for &(row, col) in &cluster.sites {
                    prop_assert_eq!(result.labels().get(row, col), cluster.id);
                }
            }
            // Rebuilding from the label grid yields the same sizes.
            let rebuilt = ClusterCollection::from_labels(result.labels(), false);
            prop_assert_eq!(rebuilt.sizes(), result.clusters().sizes());
        }
    }

    #[test]
    fn prop_deterministic(grid in square_grid()) {
        for algorithm in Algorithm::ALL {
            let a = algorithm.labeler().label_clusters(&grid, true).unwrap();
            let b = algorithm.labeler().label_clusters(&grid, true).unwrap();
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn prop_rectangular_rejected(rows in 1usize..12, extra in 1usize..12) {
        let grid = OccupancyGrid::filled(rows, rows + extra, true).unwrap();
        for algorithm in Algorithm::ALL {
            prop_assert!(algorithm.labeler().label_clusters(&grid, false).is_err());
        }
    }
}
