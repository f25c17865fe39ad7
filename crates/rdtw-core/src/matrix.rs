//! Dense row-major matrix used for local costs, cumulative costs and directions.

use std::ops::{Index, IndexMut};

use serde::Serialize;

use crate::error::ConfigError;

/// Dense `n_rows x n_cols` matrix stored as a row-major flat vector.
///
/// Cell `(i, j)` lives at `data[i * n_cols + j]`. Rows index the query,
/// columns index the reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix<T> {
    n_rows: usize,
    n_cols: usize,
    data: Vec<T>,
}

/// Cumulative cost matrix; `NaN` marks unreached cells.
pub type CostMatrix = Matrix<f64>;

/// Per-cell index of the minimizing step pattern transition; `None` for
/// unreached or seeded cells.
pub type DirectionMatrix = Matrix<Option<usize>>;

impl<T: Clone> Matrix<T> {
    /// Create a matrix with every cell set to `value`.
    #[must_use]
    pub fn filled(n_rows: usize, n_cols: usize, value: T) -> Self {
        Self {
            n_rows,
            n_cols,
            data: vec![value; n_rows * n_cols],
        }
    }

    /// Build a matrix from a vector of equally long rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConfigError::MalformedCostMatrix`] | No rows, empty rows, or rows of different length |
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ConfigError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if n_rows == 0 || n_cols == 0 {
            return Err(ConfigError::MalformedCostMatrix {
                reason: format!("shape {n_rows}x{n_cols} has no cells"),
            });
        }
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(ConfigError::MalformedCostMatrix {
                    reason: format!("row {i} has {} columns, expected {n_cols}", row.len()),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            n_rows,
            n_cols,
            data,
        })
    }

    /// Return a new matrix with `row` inserted before the first row.
    ///
    /// # Panics
    ///
    /// Panics if `row.len() != n_cols`.
    #[must_use]
    pub(crate) fn with_leading_row(&self, row: &[T]) -> Self {
        assert_eq!(row.len(), self.n_cols, "leading row has wrong length");
        let mut data = Vec::with_capacity(self.data.len() + self.n_cols);
        data.extend_from_slice(row);
        data.extend_from_slice(&self.data);
        Self {
            n_rows: self.n_rows + 1,
            n_cols: self.n_cols,
            data,
        }
    }

    /// Consume the matrix and return it without its first row.
    #[must_use]
    pub(crate) fn without_first_row(mut self) -> Self {
        let n_drop = self.n_cols.min(self.data.len());
        self.data.drain(..n_drop);
        self.n_rows = self.n_rows.saturating_sub(1);
        self
    }

    /// Return the matrix as a vector of owned rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }
}

impl<T> Matrix<T> {
    /// Create a matrix whose cell `(i, j)` is `f(i, j)`, filled row by row.
    pub fn from_fn(n_rows: usize, n_cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let data = (0..n_rows)
            .flat_map(|i| (0..n_cols).map(move |j| (i, j)))
            .map(|(i, j)| f(i, j))
            .collect();
        Self {
            n_rows,
            n_cols,
            data,
        }
    }

    /// Return the number of rows (query length).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns (reference length).
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Return `(n_rows, n_cols)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Return the cell at `(i, j)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.n_rows && j < self.n_cols {
            self.data.get(i * self.n_cols + j)
        } else {
            None
        }
    }

    /// Return row `i` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_rows`.
    #[must_use]
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.n_rows, "row index {i} out of bounds for {} rows", self.n_rows);
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Iterate over rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.data.chunks_exact(self.n_cols.max(1))
    }

    /// Return the underlying row-major storage.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl Matrix<f64> {
    /// Build a local cost matrix, validating shape, finiteness and non-negativity.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConfigError::MalformedCostMatrix`] | Not a non-empty rectangular matrix |
    /// | [`ConfigError::NonFiniteValue`] | A cell is NaN or infinite |
    /// | [`ConfigError::NegativeLocalCost`] | A cell is negative |
    pub fn local_cost(rows: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        let matrix = Self::from_rows(rows)?;
        matrix.validate_local_cost()?;
        Ok(matrix)
    }

    /// Check that the matrix has at least one cell and that every cell is a
    /// finite, non-negative cost.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Matrix::local_cost`]. Raggedness cannot occur
    /// here, so the shape check only rejects zero rows or zero columns.
    pub fn validate_local_cost(&self) -> Result<(), ConfigError> {
        if self.n_rows == 0 || self.n_cols == 0 {
            return Err(ConfigError::MalformedCostMatrix {
                reason: format!("shape {}x{} has no cells", self.n_rows, self.n_cols),
            });
        }
        for (idx, &value) in self.data.iter().enumerate() {
            let (row, col) = (idx / self.n_cols, idx % self.n_cols);
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue { row, col });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeLocalCost { row, col, value });
            }
        }
        Ok(())
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        assert!(
            i < self.n_rows && j < self.n_cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.n_rows,
            self.n_cols
        );
        &self.data[i * self.n_cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        assert!(
            i < self.n_rows && j < self.n_cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.n_rows,
            self.n_cols
        );
        &mut self.data[i * self.n_cols + j]
    }
}
