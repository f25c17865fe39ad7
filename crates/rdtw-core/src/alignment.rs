//! Alignment driver: configuration, input resolution and result assembly.

use std::fmt;

use serde::Serialize;
use tracing::{info, instrument};

use crate::backtrack::backtrack;
use crate::cost::GlobalCostMatrix;
use crate::distance::{DistanceMethod, local_cost_matrix};
use crate::error::{ConfigError, DtwError};
use crate::matrix::{CostMatrix, DirectionMatrix, Matrix};
use crate::path::WarpingPath;
use crate::sequence::Sequence;
use crate::step_pattern::{Normalization, StepPattern};
use crate::window::Window;

/// Immutable alignment configuration.
///
/// Defaults: euclidean local distance, `symmetric2` step pattern, no window,
/// and every flag off.
#[derive(Debug, Clone)]
pub struct Dtw {
    distance_method: DistanceMethod,
    step_pattern: StepPattern,
    window: Window,
    keep_internals: bool,
    distance_only: bool,
    open_end: bool,
    open_begin: bool,
}

impl Default for Dtw {
    fn default() -> Self {
        Self::new()
    }
}

impl Dtw {
    /// Create a configuration with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            distance_method: DistanceMethod::default(),
            step_pattern: StepPattern::symmetric2(),
            window: Window::default(),
            keep_internals: false,
            distance_only: false,
            open_end: false,
            open_begin: false,
        }
    }

    /// Set the metric used to build the local cost matrix from sequences.
    #[must_use]
    pub fn with_distance_method(mut self, distance_method: DistanceMethod) -> Self {
        self.distance_method = distance_method;
        self
    }

    /// Set the step pattern.
    #[must_use]
    pub fn with_step_pattern(mut self, step_pattern: StepPattern) -> Self {
        self.step_pattern = step_pattern;
        self
    }

    /// Set the global window constraint.
    #[must_use]
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Keep the local cost, cumulative cost and direction matrices (and the
    /// input sequences, when given) in [`Alignment::internals`].
    #[must_use]
    pub fn with_keep_internals(mut self, keep_internals: bool) -> Self {
        self.keep_internals = keep_internals;
        self
    }

    /// Skip backtracking; [`Alignment::path`] will be `None`.
    #[must_use]
    pub fn with_distance_only(mut self, distance_only: bool) -> Self {
        self.distance_only = distance_only;
        self
    }

    /// Let the alignment end at any reference column.
    #[must_use]
    pub fn with_open_end(mut self, open_end: bool) -> Self {
        self.open_end = open_end;
        self
    }

    /// Let the alignment start at any reference column.
    ///
    /// Open-begin prepends a zero-cost row to the local cost matrix, and the
    /// window is evaluated on that `(n+1) x m` matrix. Query row `i` is
    /// therefore checked as row `i + 1`, so a diagonal band is shifted down by
    /// one row relative to the closed alignment.
    #[must_use]
    pub fn with_open_begin(mut self, open_begin: bool) -> Self {
        self.open_begin = open_begin;
        self
    }

    /// Return the local distance method.
    #[must_use]
    pub fn distance_method(&self) -> DistanceMethod {
        self.distance_method
    }

    /// Return the step pattern.
    #[must_use]
    pub fn step_pattern(&self) -> &StepPattern {
        &self.step_pattern
    }

    /// Return the window constraint.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Align two sequences. See [`dtw`].
    ///
    /// # Errors
    ///
    /// Same as [`dtw`].
    pub fn align(&self, query: &Sequence, reference: &Sequence) -> Result<Alignment, DtwError> {
        dtw(DtwInput::Sequences { query, reference }, self)
    }

    /// Align a precomputed local cost matrix. See [`dtw`].
    ///
    /// # Errors
    ///
    /// Same as [`dtw`].
    pub fn align_local_cost(&self, local_cost: &Matrix<f64>) -> Result<Alignment, DtwError> {
        dtw(DtwInput::LocalCost(local_cost), self)
    }
}

/// What to align.
#[derive(Debug, Clone, Copy)]
pub enum DtwInput<'a> {
    /// A precomputed query-by-reference local cost matrix.
    LocalCost(&'a Matrix<f64>),
    /// Two sequences; the local cost is computed with the configured
    /// [`DistanceMethod`].
    Sequences {
        /// Rows of the cost matrix.
        query: &'a Sequence,
        /// Columns of the cost matrix.
        reference: &'a Sequence,
    },
}

/// Matrices computed during the alignment, kept on request.
#[derive(Debug, Clone)]
pub struct Internals {
    /// Local cost matrix.
    pub local_cost: Matrix<f64>,
    /// Cumulative cost matrix; `NaN` marks unreached cells.
    pub cost: CostMatrix,
    /// Winning transition index per cell.
    pub directions: DirectionMatrix,
    /// The query, when sequences were aligned.
    pub query: Option<Sequence>,
    /// The reference, when sequences were aligned.
    pub reference: Option<Sequence>,
}

/// Result of a DTW alignment.
#[derive(Debug, Clone, Serialize)]
pub struct Alignment {
    /// Minimum cumulative cost at the terminal cell.
    pub distance: f64,
    /// `distance` normalized per the step pattern hint; `None` for `NA`.
    pub normalized_distance: Option<f64>,
    /// Number of query time steps.
    pub query_len: usize,
    /// Number of reference time steps.
    pub reference_len: usize,
    /// Reference column where the alignment ends.
    pub end_column: usize,
    /// Whether the alignment was free to start at any reference column.
    pub open_begin: bool,
    /// Whether the alignment was free to end at any reference column.
    pub open_end: bool,
    /// Normalization hint of the step pattern used.
    pub hint: Normalization,
    /// Optimal warping path, unless distance-only was requested.
    pub path: Option<WarpingPath>,
    /// Retained matrices, if requested.
    #[serde(skip)]
    pub internals: Option<Internals>,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "DTW alignment object of size (query x reference): {} x {}",
            self.query_len, self.reference_len
        )?;
        match self.normalized_distance {
            Some(nd) => write!(f, "Distance: {} (normalized {nd})", self.distance),
            None => write!(f, "Distance: {}", self.distance),
        }
    }
}

/// Compute the optimal alignment of `input` under `config`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::Config`] | Invalid local cost or sequences, mismatched dimensions, open-begin with a hint other than `N`, open-end with hint `NA` |
/// | [`DtwError::NoWarpingPath`] | The terminal cell is unreachable under the window and step pattern |
/// | [`DtwError::BrokenPath`] | Backtracking met an unreached cell |
#[instrument(skip_all, fields(
    pattern_hint = %config.step_pattern.hint(),
    window = %config.window,
    open_begin = config.open_begin,
    open_end = config.open_end,
))]
pub fn dtw(input: DtwInput<'_>, config: &Dtw) -> Result<Alignment, DtwError> {
    let (local, query, reference) = match input {
        DtwInput::LocalCost(local) => {
            local.validate_local_cost()?;
            (local.clone(), None, None)
        }
        DtwInput::Sequences { query, reference } => (
            local_cost_matrix(query, reference, config.distance_method)?,
            Some(query),
            Some(reference),
        ),
    };

    let hint = config.step_pattern.hint();
    if config.open_begin && hint != Normalization::N {
        return Err(ConfigError::OpenBeginRequiresN { hint }.into());
    }
    if config.open_end && !hint.is_normalizable() {
        return Err(ConfigError::OpenEndRequiresNormalization.into());
    }

    let (n, m) = local.shape();
    let gcm = if config.open_begin {
        let augmented = local.with_leading_row(&vec![0.0; m]);
        let mut seed = Matrix::filled(n + 1, m, f64::NAN);
        for j in 0..m {
            seed[(0, j)] = 0.0;
        }
        GlobalCostMatrix::compute(&augmented, &config.step_pattern, &config.window, Some(seed))?
    } else {
        GlobalCostMatrix::compute(&local, &config.step_pattern, &config.window, None)?
    };

    let last = gcm.cost().n_rows() - 1;
    let last_row = gcm.cost().row(last);
    let end_column = if config.open_end {
        last_row
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_nan())
            .map(|(j, &c)| (j, hint.apply(c, n, j)))
            .fold(None, |best: Option<(usize, f64)>, (j, v)| match best {
                Some((_, b)) if b <= v => best,
                _ => Some((j, v)),
            })
            .map(|(j, _)| j)
            .ok_or(DtwError::NoWarpingPath {
                row: n - 1,
                col: m - 1,
            })?
    } else {
        m - 1
    };

    let distance = last_row[end_column];
    if distance.is_nan() {
        return Err(DtwError::NoWarpingPath {
            row: n - 1,
            col: end_column,
        });
    }
    let normalized_distance = hint
        .is_normalizable()
        .then(|| hint.apply(distance, n, end_column));

    let path = if config.distance_only {
        None
    } else {
        let path = backtrack(&gcm, &config.step_pattern, (last, end_column))?;
        Some(if config.open_begin {
            path.without_leading_row()
        } else {
            path
        })
    };

    let internals = config.keep_internals.then(|| {
        let (mut cost, mut directions) = gcm.into_parts();
        if config.open_begin {
            cost = cost.without_first_row();
            directions = directions.without_first_row();
        }
        Internals {
            local_cost: local,
            cost,
            directions,
            query: query.cloned(),
            reference: reference.cloned(),
        }
    });

    info!(
        n,
        m,
        distance,
        normalized_distance,
        end_column,
        "alignment complete"
    );

    Ok(Alignment {
        distance,
        normalized_distance,
        query_len: n,
        reference_len: m,
        end_column,
        open_begin: config.open_begin,
        open_end: config.open_end,
        hint,
        path,
        internals,
    })
}
