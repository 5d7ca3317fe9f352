//! Sparse accumulator for second-order edge weights.
//!
//! The Hessian is symmetric, so only the upper triangle is stored: every
//! write canonicalizes its index pair to `(min, max)`. Storage is one sorted
//! adjacency list per upper index, which makes "all live second-order edges
//! incident to vertex v" a single column scan during the reverse sweep.

use crate::float::Float;

/// Symmetric sparse matrix of second-order weights, stored as its upper
/// triangle.
///
/// A pair `(i, j)` always lands in the column of `max(i, j)`, as entry
/// `(min(i, j), weight)`. Columns are kept sorted by lower index so that
/// coefficient updates are a binary search plus insert.
#[derive(Clone, Debug, Default)]
pub struct SoMatrix<F: Float> {
    cols: Vec<Vec<(u32, F)>>,
}

impl<F: Float> SoMatrix<F> {
    /// Create an empty 0×0 accumulator.
    pub fn new() -> Self {
        SoMatrix { cols: Vec::new() }
    }

    /// Create an all-zero n×n accumulator.
    pub fn with_dim(n: usize) -> Self {
        SoMatrix {
            cols: vec![Vec::new(); n],
        }
    }

    /// Current row/column dimension.
    pub fn dim(&self) -> usize {
        self.cols.len()
    }

    /// Number of stored (non-zero-initialized) entries.
    pub fn nnz(&self) -> usize {
        self.cols.iter().map(Vec::len).sum()
    }

    /// Resize to n×n. Growing zero-fills; shrinking drops every entry whose
    /// upper index no longer fits. Surviving entries are preserved, so
    /// weights seeded before a sweep outlive the pre-sweep resize.
    pub fn resize(&mut self, n: usize) {
        self.cols.resize(n, Vec::new());
    }

    /// Drop all entries, keeping the dimension.
    pub fn set_zero(&mut self) {
        for col in &mut self.cols {
            col.clear();
        }
    }

    /// Accumulate `w` into the `(min(i, j), max(i, j))` slot, growing the
    /// dimension on demand. Repeated calls for the same pair sum.
    pub fn add(&mut self, i: u32, j: u32, w: F) {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        if hi as usize >= self.cols.len() {
            self.cols.resize(hi as usize + 1, Vec::new());
        }
        let col = &mut self.cols[hi as usize];
        match col.binary_search_by_key(&lo, |&(row, _)| row) {
            Ok(pos) => col[pos].1 = col[pos].1 + w,
            Err(pos) => col.insert(pos, (lo, w)),
        }
    }

    /// Read the weight at `(min(i, j), max(i, j))`; zero when absent.
    pub fn get(&self, i: u32, j: u32) -> F {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        let Some(col) = self.cols.get(hi as usize) else {
            return F::zero();
        };
        match col.binary_search_by_key(&lo, |&(row, _)| row) {
            Ok(pos) => col[pos].1,
            Err(_) => F::zero(),
        }
    }

    /// All entries whose upper index is `j`, as `(lower_index, weight)`
    /// pairs sorted by lower index.
    pub fn column(&self, j: u32) -> &[(u32, F)] {
        self.cols
            .get(j as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Detach and return the column at `j`, leaving it empty.
    pub fn take_column(&mut self, j: u32) -> Vec<(u32, F)> {
        match self.cols.get_mut(j as usize) {
            Some(col) => std::mem::take(col),
            None => Vec::new(),
        }
    }
}
