//! Global cost matrix recurrence.

use tracing::{debug, instrument};

use crate::error::ConfigError;
use crate::matrix::{CostMatrix, DirectionMatrix, Matrix};
use crate::step_pattern::{StepPattern, StepTerm, Transition};
use crate::window::Window;

/// Cumulative cost and winning transition for every cell of a local cost matrix.
///
/// Unreached cells hold `NaN` in [`cost`](Self::cost) and `None` in
/// [`directions`](Self::directions). Seeded cells hold their seed value and
/// `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalCostMatrix {
    cost: CostMatrix,
    directions: DirectionMatrix,
}

impl GlobalCostMatrix {
    /// Fill the cumulative cost matrix for `local` under `pattern` and `window`.
    ///
    /// Cells are visited in row-major order. A cell that is outside the window
    /// or already holds a (seeded) value is left untouched. Every other cell
    /// takes the minimum over the pattern's transitions of
    /// `cost[origin] + sum(weight * local[offset])`, skipping transitions whose
    /// offsets leave the matrix or whose origin is unreached. Ties go to the
    /// transition listed first.
    ///
    /// Without a seed, `cost[0, 0] = local[0, 0]` and everything else starts
    /// unreached.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConfigError::MalformedCostMatrix`] | `local` has no cells, or `seed` shape differs from `local` |
    #[instrument(skip_all, fields(n = local.n_rows(), m = local.n_cols(), window = %window))]
    pub fn compute(
        local: &Matrix<f64>,
        pattern: &StepPattern,
        window: &Window,
        seed: Option<CostMatrix>,
    ) -> Result<Self, ConfigError> {
        let (n, m) = local.shape();
        if n == 0 || m == 0 {
            return Err(ConfigError::MalformedCostMatrix {
                reason: format!("local cost matrix is {n}x{m}"),
            });
        }
        let mut cost = match seed {
            Some(seed) if seed.shape() != (n, m) => {
                return Err(ConfigError::MalformedCostMatrix {
                    reason: format!(
                        "seed is {}x{} but local cost matrix is {n}x{m}",
                        seed.n_rows(),
                        seed.n_cols()
                    ),
                });
            }
            Some(seed) => seed,
            None => {
                let mut cost = Matrix::filled(n, m, f64::NAN);
                cost[(0, 0)] = local[(0, 0)];
                cost
            }
        };
        let mut directions = Matrix::filled(n, m, None);
        let mut reached = 0usize;

        for i in 0..n {
            for j in window.column_range(i, n, m) {
                if !window.admits(i, j, n, m) || !cost[(i, j)].is_nan() {
                    continue;
                }

                let mut best: Option<(usize, f64)> = None;
                for (k, transition) in pattern.transitions().iter().enumerate() {
                    let Some(candidate) = candidate(transition, i, j, &cost, local) else {
                        continue;
                    };
                    if best.is_none_or(|(_, b)| candidate < b) {
                        best = Some((k, candidate));
                    }
                }

                if let Some((k, value)) = best {
                    cost[(i, j)] = value;
                    directions[(i, j)] = Some(k);
                    reached += 1;
                }
            }
        }

        debug!(reached, "global cost matrix filled");
        Ok(Self { cost, directions })
    }

    /// Return the cumulative cost matrix.
    #[must_use]
    pub fn cost(&self) -> &CostMatrix {
        &self.cost
    }

    /// Return the per-cell winning transition index.
    #[must_use]
    pub fn directions(&self) -> &DirectionMatrix {
        &self.directions
    }

    /// Return true if cell `(i, j)` holds a finite cumulative cost.
    #[must_use]
    pub fn is_reached(&self, i: usize, j: usize) -> bool {
        self.cost.get(i, j).is_some_and(|c| !c.is_nan())
    }

    /// Consume and return `(cost, directions)`.
    #[must_use]
    pub fn into_parts(self) -> (CostMatrix, DirectionMatrix) {
        (self.cost, self.directions)
    }
}

/// Cost of reaching `(i, j)` through `transition`, or `None` if the transition
/// leaves the matrix or starts from an unreached cell.
fn candidate(
    transition: &Transition,
    i: usize,
    j: usize,
    cost: &CostMatrix,
    local: &Matrix<f64>,
) -> Option<f64> {
    let (oi, oj) = transition.origin();
    let mut total = *cost.get(i.checked_sub(oi)?, j.checked_sub(oj)?)?;
    if total.is_nan() {
        return None;
    }
    for &(di, dj, term) in transition.terms() {
        let (si, sj) = (i.checked_sub(di)?, j.checked_sub(dj)?);
        total += match term {
            StepTerm::Local(weight) => weight * local[(si, sj)],
            StepTerm::Constant(value) => value,
            StepTerm::Origin => 0.0,
        };
    }
    Some(total)
}
