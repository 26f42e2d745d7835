//! Occupancy and label grids.
//!
//! Both grids are stored row-major in a flat `Vec`. An [`OccupancyGrid`] may be
//! any non-empty rectangle as a value, but every labeler rejects non-square
//! input with [`Error::InvalidShape`] before doing any work.

use rand::Rng;

use crate::error::{Error, Result};

/// `rows * cols`, or an error if either side is zero or the product overflows.
fn cell_count(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(Error::EmptyInput);
    }
    rows.checked_mul(cols).ok_or(Error::InvalidParameter {
        name: "shape",
        message: "rows * cols overflows usize",
    })
}

/// Boolean occupancy matrix, `true` meaning the site is occupied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Build a grid from nested rows.
    ///
    /// Fails with [`Error::EmptyInput`] if there are no rows (or the rows are
    /// empty) and with [`Error::DimensionMismatch`] if rows differ in length.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if n_rows == 0 || n_cols == 0 {
            return Err(Error::EmptyInput);
        }

        let mut cells = Vec::with_capacity(cell_count(n_rows, n_cols)?);
        for row in rows {
            if row.len() != n_cols {
                return Err(Error::DimensionMismatch {
                    expected: n_cols,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }

        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            cells,
        })
    }

    /// Build a grid from a row-major buffer.
    pub fn from_flat(rows: usize, cols: usize, cells: Vec<bool>) -> Result<Self> {
        let expected = cell_count(rows, cols)?;
        if cells.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: bool) -> Result<Self> {
        let count = cell_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![value; count],
        })
    }

    /// Sample an `n`×`n` grid where each site is occupied independently with probability `p`.
    pub fn random<R: Rng>(n: usize, p: f64, rng: &mut R) -> Result<Self> {
        let count = cell_count(n, n)?;
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::InvalidParameter {
                name: "p",
                message: "must be in [0, 1]",
            });
        }

        let cells = (0..count).map(|_| rng.random::<f64>() < p).collect();
        Ok(Self {
            rows: n,
            cols: n,
            cells,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Side length N, or [`Error::InvalidShape`] if the grid is not square.
    pub fn side(&self) -> Result<usize> {
        if self.is_square() {
            Ok(self.rows)
        } else {
            Err(Error::InvalidShape {
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Occupancy of `(row, col)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of bounds");
        self.cells[row * self.cols + col]
    }

    /// Row-major cell buffer.
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    /// Count of occupied sites.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// N×N cluster labels. `0` marks an empty site; positive values are cluster ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelGrid {
    side: usize,
    labels: Vec<u32>,
}

impl LabelGrid {
    pub(crate) fn zeros(side: usize) -> Self {
        Self {
            side,
            labels: vec![0; side * side],
        }
    }

    /// Wrap an existing row-major label buffer of length `side * side`.
    pub fn from_flat(side: usize, labels: Vec<u32>) -> Result<Self> {
        let expected = cell_count(side, side)?;
        if labels.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: labels.len(),
            });
        }
        Ok(Self { side, labels })
    }

    #[inline]
    pub(crate) fn set(&mut self, index: usize, label: u32) {
        self.labels[index] = label;
    }

    #[inline]
    pub(crate) fn at(&self, index: usize) -> u32 {
        self.labels[index]
    }

    /// Side length N.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Label of `(row, col)`. Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        assert!(row < self.side && col < self.side, "cell ({row}, {col}) out of bounds");
        self.labels[row * self.side + col]
    }

    /// Labels of one row.
    pub fn row(&self, row: usize) -> &[u32] {
        let start = row * self.side;
        &self.labels[start..start + self.side]
    }

    /// Row-major label buffer.
    pub fn as_slice(&self) -> &[u32] {
        &self.labels
    }

    /// `true` wherever a site carries a cluster label.
    pub fn occupancy_pattern(&self) -> Vec<bool> {
        self.labels.iter().map(|&l| l > 0).collect()
    }

    /// Distinct positive labels, ascending.
    pub fn distinct_labels(&self) -> Vec<u32> {
        let mut out: Vec<u32> = self.labels.iter().copied().filter(|&l| l > 0).collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
