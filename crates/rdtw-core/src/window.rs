//! Global window constraints for DTW computation.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::error::ConfigError;

/// Caller-supplied admissibility test `(i, j, query_len, reference_len) -> bool`.
///
/// Extra window parameters are captured by the closure.
pub type WindowFn = Arc<dyn Fn(usize, usize, usize, usize) -> bool + Send + Sync>;

/// Constraint on which `(query, reference)` cells the warping path may visit.
#[derive(Clone, Default)]
pub enum Window {
    /// No constraint: every cell is admissible.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band: cell `(i, j)` is admissible only if `|i - j| <= window_size`.
    SakoeChiba {
        /// Maximum distance from the main diagonal.
        window_size: usize,
    },

    /// Itakura parallelogram: local slopes between 1/2 and 2 from both corners.
    Itakura,

    /// Band of half-width `window_size` around the straight line joining the
    /// corners `(0, 0)` and `(n-1, m-1)`.
    SlantedBand {
        /// Maximum column distance from the slanted diagonal.
        window_size: usize,
    },

    /// Arbitrary predicate.
    Custom(WindowFn),
}

impl Window {
    /// Wrap a caller-supplied predicate as a [`Window::Custom`].
    #[must_use]
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(usize, usize, usize, usize) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Resolve a window type by name: `none`, `sakoechiba`, `itakura` or `slantedband`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConfigError::UnknownWindow`] | `name` is not one of the four window types |
    /// | [`ConfigError::MissingWindowSize`] | A banded window without `window_size` |
    pub fn from_name(name: &str, window_size: Option<usize>) -> Result<Self, ConfigError> {
        match name {
            "none" => Ok(Self::Unconstrained),
            "itakura" => Ok(Self::Itakura),
            "sakoechiba" => window_size
                .map(|window_size| Self::SakoeChiba { window_size })
                .ok_or(ConfigError::MissingWindowSize {
                    window: "sakoechiba",
                }),
            "slantedband" => window_size
                .map(|window_size| Self::SlantedBand { window_size })
                .ok_or(ConfigError::MissingWindowSize {
                    window: "slantedband",
                }),
            other => Err(ConfigError::UnknownWindow {
                name: other.to_string(),
            }),
        }
    }

    /// Return the canonical window type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unconstrained => "none",
            Self::SakoeChiba { .. } => "sakoechiba",
            Self::Itakura => "itakura",
            Self::SlantedBand { .. } => "slantedband",
            Self::Custom(_) => "custom",
        }
    }

    /// Return true if cell `(i, j)` of an `n x m` cost matrix is admissible.
    #[must_use]
    pub fn admits(&self, i: usize, j: usize, n: usize, m: usize) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::SakoeChiba { window_size } => i.abs_diff(j) <= *window_size,
            Self::Itakura => {
                // Evaluated on 1-based indices so that both corners are admitted.
                let (i, j) = (i as i64 + 1, j as i64 + 1);
                let (n, m) = (n as i64, m as i64);
                j < 2 * i && i <= 2 * j && i >= n - 1 - 2 * (m - j) && j > m - 1 - 2 * (n - i)
            }
            Self::SlantedBand { window_size } => {
                (j as f64 - slanted_diagonal(i, n, m)).abs() <= *window_size as f64
            }
            Self::Custom(f) => f(i, j, n, m),
        }
    }

    /// Return a column range for `row` that contains every admissible cell.
    ///
    /// For the banded windows this is tight; for the others it is `0..n_cols`
    /// and admissibility must still be checked per cell.
    #[must_use]
    pub fn column_range(&self, row: usize, n_rows: usize, n_cols: usize) -> Range<usize> {
        match *self {
            Self::SakoeChiba { window_size } => {
                let start = row.saturating_sub(window_size).min(n_cols);
                let end = (row + window_size + 1).min(n_cols);
                start..end
            }
            Self::SlantedBand { window_size } => {
                let center = slanted_diagonal(row, n_rows, n_cols);
                let w = window_size as f64;
                let end = (((center + w).floor() + 1.0).max(0.0) as usize).min(n_cols);
                let start = ((center - w).ceil().max(0.0) as usize).min(end);
                start..end
            }
            Self::Unconstrained | Self::Itakura | Self::Custom(_) => 0..n_cols,
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => f.write_str("Unconstrained"),
            Self::SakoeChiba { window_size } => f
                .debug_struct("SakoeChiba")
                .field("window_size", window_size)
                .finish(),
            Self::Itakura => f.write_str("Itakura"),
            Self::SlantedBand { window_size } => f
                .debug_struct("SlantedBand")
                .field("window_size", window_size)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SakoeChiba { window_size } | Self::SlantedBand { window_size } => {
                write!(f, "{}(window_size={window_size})", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}

/// Column of the line through `(0, 0)` and `(n-1, m-1)` at `row`.
fn slanted_diagonal(row: usize, n: usize, m: usize) -> f64 {
    if n <= 1 {
        0.0
    } else {
        row as f64 * (m - 1) as f64 / (n - 1) as f64
    }
}
