//! Input sequences with validation guarantees.

use std::ops::Index;

use serde::Serialize;

use crate::error::ConfigError;

/// Owned, validated sequence with time in rows and features in columns.
///
/// Guaranteed to have at least one time step, at least one feature, the same
/// number of features at every time step, and only finite values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sequence {
    n_features: usize,
    values: Vec<f64>,
}

impl Sequence {
    /// Create a univariate sequence: one scalar per time step.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConfigError::EmptySequence`] | `values` is empty |
    /// | [`ConfigError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn univariate(values: Vec<f64>) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(ConfigError::NonFiniteValue { row, col: 0 });
        }
        Ok(Self {
            n_features: 1,
            values,
        })
    }

    /// Create a multivariate sequence from one row of features per time step.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConfigError::EmptySequence`] | No rows, or the first row is empty |
    /// | [`ConfigError::RaggedSequence`] | A row has a different feature count than the first |
    /// | [`ConfigError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        let n_features = rows.first().map_or(0, Vec::len);
        if n_features == 0 {
            return Err(ConfigError::EmptySequence);
        }
        let mut values = Vec::with_capacity(rows.len() * n_features);
        for (row, features) in rows.into_iter().enumerate() {
            if features.len() != n_features {
                return Err(ConfigError::RaggedSequence {
                    row,
                    expected: n_features,
                    got: features.len(),
                });
            }
            if let Some(col) = features.iter().position(|v| !v.is_finite()) {
                return Err(ConfigError::NonFiniteValue { row, col });
            }
            values.extend(features);
        }
        Ok(Self { n_features, values })
    }

    /// Return the number of time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.n_features
    }

    /// Return true if the sequence has no time steps.
    ///
    /// A validated [`Sequence`] is always non-empty, so this always returns
    /// `false`. Provided to satisfy the `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the number of features per time step.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the features of time step `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t >= len()`.
    #[must_use]
    pub fn step(&self, t: usize) -> &[f64] {
        &self.values[t * self.n_features..(t + 1) * self.n_features]
    }

    /// Iterate over time steps in order.
    pub fn steps(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.n_features)
    }
}

impl TryFrom<Vec<f64>> for Sequence {
    type Error = ConfigError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::univariate(values)
    }
}

impl TryFrom<Vec<Vec<f64>>> for Sequence {
    type Error = ConfigError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl Index<usize> for Sequence {
    type Output = [f64];

    fn index(&self, t: usize) -> &Self::Output {
        self.step(t)
    }
}
