//! Warping path types for DTW alignment.

use serde::Serialize;

/// A single matched pair of the warping path: time step `query` of the query
/// aligned to time step `reference` of the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WarpingStep {
    /// Index in the query.
    pub query: usize,
    /// Index in the reference.
    pub reference: usize,
}

/// The optimal warping path, stored as parallel index sequences.
///
/// `index1s`/`index2s` list every cell visited while replaying the chosen
/// transitions, including the intermediate cells of multi-step transitions.
/// `index1`/`index2` are the same sequence with consecutive duplicates
/// removed. Both are non-decreasing in each coordinate. `steps_taken[k]` is
/// the transition index used for the `k`-th move.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarpingPath {
    index1: Vec<usize>,
    index2: Vec<usize>,
    index1s: Vec<usize>,
    index2s: Vec<usize>,
    steps_taken: Vec<usize>,
}

impl WarpingPath {
    /// Build a path from the replayed cells in forward order.
    pub(crate) fn from_cells(cells: &[(usize, usize)], steps_taken: Vec<usize>) -> Self {
        let (index1s, index2s) = cells.iter().copied().unzip();
        let mut deduped = cells.to_vec();
        deduped.dedup();
        let (index1, index2) = deduped.into_iter().unzip();
        Self {
            index1,
            index2,
            index1s,
            index2s,
            steps_taken,
        }
    }

    /// Drop cells on query row 0 and shift the remaining query indices down by
    /// one. Used to strip the synthetic leading row of open-begin alignments.
    #[must_use]
    pub(crate) fn without_leading_row(self) -> Self {
        let cells: Vec<(usize, usize)> = self
            .index1s
            .iter()
            .zip(&self.index2s)
            .filter(|&(&i, _)| i > 0)
            .map(|(&i, &j)| (i - 1, j))
            .collect();
        Self::from_cells(&cells, self.steps_taken)
    }

    /// Query indices of the path.
    #[must_use]
    pub fn index1(&self) -> &[usize] {
        &self.index1
    }

    /// Reference indices of the path.
    #[must_use]
    pub fn index2(&self) -> &[usize] {
        &self.index2
    }

    /// Query indices including intermediate cells of multi-step transitions.
    #[must_use]
    pub fn index1s(&self) -> &[usize] {
        &self.index1s
    }

    /// Reference indices including intermediate cells of multi-step transitions.
    #[must_use]
    pub fn index2s(&self) -> &[usize] {
        &self.index2s
    }

    /// Transition index chosen at each move, first move first.
    #[must_use]
    pub fn steps_taken(&self) -> &[usize] {
        &self.steps_taken
    }

    /// Iterate over the matched pairs of `index1`/`index2`.
    pub fn steps(&self) -> impl Iterator<Item = WarpingStep> + '_ {
        self.index1
            .iter()
            .zip(&self.index2)
            .map(|(&query, &reference)| WarpingStep { query, reference })
    }

    /// Return the number of matched pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index1.len()
    }

    /// Return true if the path contains no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index1.is_empty()
    }
}
