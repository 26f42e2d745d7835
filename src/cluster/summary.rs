//! Per-cluster summaries and the labeling result type.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::grid::LabelGrid;
use crate::percolation::{check_percolation, Percolation};

/// One cluster: its label, its size, and optionally its member sites.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterRecord {
    /// Positive label shared by every member site.
    pub id: u32,
    /// Number of member sites.
    pub size: usize,
    /// Member `(row, col)` pairs. Empty when site tracking was off.
    pub sites: Vec<(usize, usize)>,
}

/// All clusters found by one labeling call, ascending by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterCollection {
    records: Vec<ClusterRecord>,
}

impl ClusterCollection {
    /// Rebuild cluster records from a label grid.
    ///
    /// Labels need not be dense. Sites, when tracked, are listed in raster order.
    pub fn from_labels(labels: &LabelGrid, track_sites: bool) -> Self {
        let side = labels.side();
        let mut by_id: BTreeMap<u32, ClusterRecord> = BTreeMap::new();

        for (index, &label) in labels.as_slice().iter().enumerate() {
            if label == 0 {
                continue;
            }
            let record = by_id.entry(label).or_insert_with(|| ClusterRecord {
                id: label,
                size: 0,
                sites: Vec::new(),
            });
            record.size += 1;
            if track_sites {
                record.sites.push((index / side, index % side));
            }
        }

        Self {
            records: by_id.into_values().collect(),
        }
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterRecord> {
        self.records.iter()
    }

    /// Record with the given id.
    pub fn get(&self, id: u32) -> Option<&ClusterRecord> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Cluster sizes in id order.
    pub fn sizes(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.size).collect()
    }

    /// Cluster sizes ascending. Comparable across labelers.
    pub fn sorted_sizes(&self) -> Vec<usize> {
        let mut sizes = self.sizes();
        sizes.sort_unstable();
        sizes
    }

    /// Sum of all cluster sizes, i.e. the number of occupied sites.
    pub fn total_sites(&self) -> usize {
        self.records.iter().map(|r| r.size).sum()
    }

    /// The largest cluster (lowest id on ties).
    pub fn largest(&self) -> Option<&ClusterRecord> {
        self.records.iter().rev().max_by_key(|r| r.size)
    }
}

impl<'a> IntoIterator for &'a ClusterCollection {
    type Item = &'a ClusterRecord;
    type IntoIter = std::slice::Iter<'a, ClusterRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Output of one labeling call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labeling {
    labels: LabelGrid,
    clusters: ClusterCollection,
}

impl Labeling {
    pub(crate) fn new(labels: LabelGrid, clusters: ClusterCollection) -> Self {
        Self { labels, clusters }
    }

    pub fn labels(&self) -> &LabelGrid {
        &self.labels
    }

    pub fn clusters(&self) -> &ClusterCollection {
        &self.clusters
    }

    /// Top-to-bottom spanning check on this labeling.
    pub fn percolation(&self) -> Percolation {
        check_percolation(&self.labels, &self.clusters)
    }

    pub fn into_parts(self) -> (LabelGrid, ClusterCollection) {
        (self.labels, self.clusters)
    }
}

/// Collects sizes (and optionally sites) for densely numbered labels `1..`.
pub(crate) struct ClusterAccumulator {
    sizes: Vec<usize>,
    sites: Option<Vec<Vec<(usize, usize)>>>,
}

impl ClusterAccumulator {
    pub(crate) fn new(track_sites: bool) -> Self {
        Self {
            sizes: Vec::new(),
            sites: track_sites.then(Vec::new),
        }
    }

    /// Open the next cluster and return its label.
    ///
    /// Fails once the label space of `u32` is exhausted.
    pub(crate) fn open(&mut self) -> Result<u32> {
        let label = label_for(self.sizes.len())?;
        self.sizes.push(0);
        if let Some(sites) = self.sites.as_mut() {
            sites.push(Vec::new());
        }
        Ok(label)
    }

    /// Add one site to an already opened cluster.
    #[inline]
    pub(crate) fn record(&mut self, label: u32, row: usize, col: usize) {
        let slot = (label - 1) as usize;
        self.sizes[slot] += 1;
        if let Some(sites) = self.sites.as_mut() {
            sites[slot].push((row, col));
        }
    }

    pub(crate) fn finish(self) -> ClusterCollection {
        let mut sites = self.sites.map(Vec::into_iter);
        let records = self
            .sizes
            .into_iter()
            .enumerate()
            // Every slot was opened through `label_for`, so `i + 1` fits in u32.
            .map(|(i, size)| ClusterRecord {
                id: (i + 1) as u32,
                size,
                sites: sites.as_mut().and_then(Iterator::next).unwrap_or_default(),
            })
            .collect();
        ClusterCollection { records }
    }
}

/// Label of the cluster in zero-based slot `slot`.
fn label_for(slot: usize) -> Result<u32> {
    slot.checked_add(1)
        .and_then(|label| u32::try_from(label).ok())
        .ok_or(Error::InvalidParameter {
            name: "grid",
            message: "more clusters than fit in a u32 label",
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labels_sparse_ids() {
        let labels = LabelGrid::from_flat(3, vec![7, 7, 0, 0, 0, 0, 2, 0, 7]).unwrap();
        let clusters = ClusterCollection::from_labels(&labels, true);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.sizes(), vec![1, 3]);
        assert_eq!(clusters.get(2).unwrap().sites, vec![(2, 0)]);
        assert_eq!(clusters.get(7).unwrap().sites, vec![(0, 0), (0, 1), (2, 2)]);
        assert!(clusters.get(3).is_none());
        assert_eq!(clusters.total_sites(), 4);
    }

    #[test]
    fn test_from_labels_without_sites() {
        let labels = LabelGrid::from_flat(2, vec![1, 1, 0, 1]).unwrap();
        let clusters = ClusterCollection::from_labels(&labels, false);
        assert_eq!(clusters.len(), 1);
        assert!(clusters.get(1).unwrap().sites.is_empty());
    }

    #[test]
    fn test_largest_prefers_lowest_id() {
        let labels = LabelGrid::from_flat(2, vec![1, 0, 0, 2]).unwrap();
        let clusters = ClusterCollection::from_labels(&labels, false);
        assert_eq!(clusters.largest().unwrap().id, 1);
        assert!(ClusterCollection::default().largest().is_none());
    }

    #[test]
    fn test_accumulator() {
        let mut acc = ClusterAccumulator::new(true);
        let a = acc.open().unwrap();
        let b = acc.open().unwrap();
        acc.record(a, 0, 0);
        acc.record(b, 1, 1);
        acc.record(a, 0, 1);

        let clusters = acc.finish();
        assert_eq!(clusters.sizes(), vec![2, 1]);
        assert_eq!(clusters.get(1).unwrap().sites, vec![(0, 0), (0, 1)]);
        assert_eq!(clusters.get(2).unwrap().sites, vec![(1, 1)]);
    }

    #[test]
    fn test_label_space_exhausted() {
        assert_eq!(label_for(0).unwrap(), 1);
        assert_eq!(label_for(u32::MAX as usize - 1).unwrap(), u32::MAX);
        assert!(matches!(
            label_for(u32::MAX as usize),
            Err(Error::InvalidParameter { name: "grid", .. })
        ));
        assert!(label_for(usize::MAX).is_err());
    }
}
