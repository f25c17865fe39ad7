//! Step patterns: the local recursion topology of the DTW cost matrix.
//!
//! A step pattern is a table of rows `(pattern, di, dj, term)`. Rows sharing a
//! pattern id form one *transition*: exactly one row is the [`StepTerm::Origin`],
//! the predecessor cell `(i - di, j - dj)` whose cumulative cost is extended;
//! the remaining rows add weighted local costs (or constants) along the way.
//! The engine evaluates every transition at every cell and keeps the minimum.
//!
//! The predefined tables follow Sakoe & Chiba (1978), Rabiner & Juang (1993,
//! Table 4.5) and Mori et al. (2006), with the normalization hints used by the
//! reference DTW package.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// How a cumulative distance is rescaled to be comparable across path lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Normalization {
    /// Not normalizable.
    #[default]
    #[serde(rename = "NA")]
    Na,
    /// Divide by the query length.
    #[serde(rename = "N")]
    N,
    /// Divide by the reference length (terminal column + 1).
    #[serde(rename = "M")]
    M,
    /// Divide by query length plus reference length.
    #[serde(rename = "N+M")]
    NPlusM,
}

impl Normalization {
    /// Return true unless the hint is [`Normalization::Na`].
    #[must_use]
    pub fn is_normalizable(self) -> bool {
        self != Self::Na
    }

    /// Rescale a cumulative cost reached at `col` on the last of `n` query rows.
    #[must_use]
    pub fn apply(self, cost: f64, n: usize, col: usize) -> f64 {
        match self {
            Self::Na => cost,
            Self::N => cost / n as f64,
            Self::M => cost / (col + 1) as f64,
            Self::NPlusM => cost / (n + col + 1) as f64,
        }
    }

    fn transposed(self) -> Self {
        match self {
            Self::N => Self::M,
            Self::M => Self::N,
            other => other,
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Na => "NA",
            Self::N => "N",
            Self::M => "M",
            Self::NPlusM => "N+M",
        })
    }
}

impl FromStr for Normalization {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NA" => Ok(Self::Na),
            "N" => Ok(Self::N),
            "M" => Ok(Self::M),
            "N+M" => Ok(Self::NPlusM),
            other => Err(ConfigError::InvalidStepPattern {
                reason: format!("unknown normalization hint \"{other}\""),
            }),
        }
    }
}

/// What a step pattern row contributes to a transition's candidate cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepTerm {
    /// The predecessor cell; its cumulative cost starts the candidate.
    Origin,
    /// Add `weight` times the local cost at the row's offset.
    Local(f64),
    /// Add a constant, independent of the local cost.
    Constant(f64),
}

/// One row of a step pattern table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRow {
    /// Pattern id; rows with the same id form one transition.
    pub pattern: usize,
    /// Row offset back from the current cell.
    pub di: usize,
    /// Column offset back from the current cell.
    pub dj: usize,
    /// Contribution of this row.
    pub term: StepTerm,
}

impl StepRow {
    /// Create a step pattern row.
    #[must_use]
    pub const fn new(pattern: usize, di: usize, dj: usize, term: StepTerm) -> Self {
        Self {
            pattern,
            di,
            dj,
            term,
        }
    }
}

/// A single alternative transition of a step pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    id: usize,
    origin: (usize, usize),
    terms: Vec<(usize, usize, StepTerm)>,
    replay: Vec<(usize, usize)>,
}

impl Transition {
    /// Return the pattern id this transition was built from.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Return the `(di, dj)` offset of the predecessor cell.
    #[must_use]
    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    /// Return the non-origin rows as `(di, dj, term)`, in table order.
    #[must_use]
    pub fn terms(&self) -> &[(usize, usize, StepTerm)] {
        &self.terms
    }

    /// Offsets visited when walking this transition backwards: intermediate
    /// cells nearest-first, ending with the origin. Never contains `(0, 0)`.
    pub(crate) fn replay(&self) -> &[(usize, usize)] {
        &self.replay
    }
}

/// An immutable step pattern: ordered transitions plus a normalization hint.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPattern {
    rows: Vec<StepRow>,
    transitions: Vec<Transition>,
    hint: Normalization,
}

impl StepPattern {
    /// Create a validated step pattern from its table rows.
    ///
    /// Transitions are ordered by the first appearance of their pattern id.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ConfigError::InvalidStepPattern`] | No rows |
    /// | [`ConfigError::InvalidStepPattern`] | A pattern id has zero or several origin rows |
    /// | [`ConfigError::InvalidStepPattern`] | An origin row has offset `(0, 0)` |
    /// | [`ConfigError::InvalidStepPattern`] | A weight or constant is not finite |
    pub fn new(rows: Vec<StepRow>, hint: Normalization) -> Result<Self, ConfigError> {
        if rows.is_empty() {
            return Err(ConfigError::InvalidStepPattern {
                reason: "step pattern has no rows".into(),
            });
        }
        for row in &rows {
            match row.term {
                StepTerm::Origin if row.di == 0 && row.dj == 0 => {
                    return Err(ConfigError::InvalidStepPattern {
                        reason: format!("pattern {} has a (0, 0) origin", row.pattern),
                    });
                }
                StepTerm::Local(w) | StepTerm::Constant(w) if !w.is_finite() => {
                    return Err(ConfigError::InvalidStepPattern {
                        reason: format!("pattern {} has non-finite weight {w}", row.pattern),
                    });
                }
                _ => {}
            }
        }
        for id in pattern_ids(&rows) {
            let n_origins = rows
                .iter()
                .filter(|r| r.pattern == id && r.term == StepTerm::Origin)
                .count();
            if n_origins != 1 {
                return Err(ConfigError::InvalidStepPattern {
                    reason: format!("pattern {id} has {n_origins} origin rows, expected 1"),
                });
            }
        }
        Ok(Self::from_validated(rows, hint))
    }

    /// Build from rows already known to satisfy the invariants of [`StepPattern::new`].
    fn from_validated(rows: Vec<StepRow>, hint: Normalization) -> Self {
        let transitions = pattern_ids(&rows)
            .into_iter()
            .map(|id| {
                let own: Vec<&StepRow> = rows.iter().filter(|r| r.pattern == id).collect();
                let origin = own
                    .iter()
                    .find(|r| r.term == StepTerm::Origin)
                    .map_or((1, 1), |r| (r.di, r.dj));
                let terms: Vec<(usize, usize, StepTerm)> = own
                    .iter()
                    .filter(|r| r.term != StepTerm::Origin)
                    .map(|r| (r.di, r.dj, r.term))
                    .collect();
                let mut replay: Vec<(usize, usize)> = terms
                    .iter()
                    .rev()
                    .map(|&(di, dj, _)| (di, dj))
                    .filter(|&d| d != (0, 0) && d != origin)
                    .collect();
                replay.push(origin);
                Transition {
                    id,
                    origin,
                    terms,
                    replay,
                }
            })
            .collect();
        Self {
            rows,
            transitions,
            hint,
        }
    }

    /// Build a predefined pattern from `(pattern, di, dj, weight)` tuples where
    /// a weight of `-1` marks the origin row.
    fn table(hint: Normalization, table: &[(usize, usize, usize, f64)]) -> Self {
        let rows = table
            .iter()
            .map(|&(p, di, dj, w)| {
                let term = if w < 0.0 {
                    StepTerm::Origin
                } else {
                    StepTerm::Local(w)
                };
                StepRow::new(p, di, dj, term)
            })
            .collect();
        Self::from_validated(rows, hint)
    }

    /// Return the table rows in their original order.
    #[must_use]
    pub fn rows(&self) -> &[StepRow] {
        &self.rows
    }

    /// Return the transitions in table order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Return the number of distinct transitions.
    #[must_use]
    pub fn n_patterns(&self) -> usize {
        self.transitions.len()
    }

    /// Return the normalization hint.
    #[must_use]
    pub fn hint(&self) -> Normalization {
        self.hint
    }

    /// Return the pattern with query and reference roles swapped.
    ///
    /// Row and column offsets are exchanged and an `N` hint becomes `M`
    /// (and vice versa).
    #[must_use]
    pub fn transposed(&self) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|r| StepRow::new(r.pattern, r.dj, r.di, r.term))
            .collect();
        Self::from_validated(rows, self.hint.transposed())
    }

    /// Look up a predefined step pattern by name, e.g. `"symmetric2"` or `"typeIIIc"`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStepPattern`] for names not in [`StepPattern::names`].
    pub fn named(name: &str) -> Result<Self, ConfigError> {
        PREDEFINED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, build)| build())
            .ok_or_else(|| ConfigError::UnknownStepPattern {
                name: name.to_string(),
            })
    }

    /// Return the names accepted by [`StepPattern::named`].
    pub fn names() -> impl Iterator<Item = &'static str> {
        PREDEFINED.iter().map(|(n, _)| *n)
    }

    /// Minimum Variance Matching pattern: the query advances one row per step
    /// while skipping up to `elasticity - 1` reference columns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStepPattern`] if `elasticity` is zero.
    pub fn mvm(elasticity: usize) -> Result<Self, ConfigError> {
        if elasticity == 0 {
            return Err(ConfigError::InvalidStepPattern {
                reason: "MVM elasticity must be at least 1".into(),
            });
        }
        let rows = (1..=elasticity)
            .flat_map(|k| {
                [
                    StepRow::new(k, 1, k, StepTerm::Origin),
                    StepRow::new(k, 0, 0, StepTerm::Local(1.0)),
                ]
            })
            .collect();
        Ok(Self::from_validated(rows, Normalization::Na))
    }

    /// Symmetric pattern with unit weights on all three moves.
    #[must_use]
    pub fn symmetric1() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 1, 1, -1.0),
                (1, 0, 0, 1.0),
                (2, 0, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 0, -1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Symmetric pattern with double weight on the diagonal (Sakoe-Chiba P=0).
    #[must_use]
    pub fn symmetric2() -> Self {
        Self::table(
            Normalization::NPlusM,
            &[
                (1, 1, 1, -1.0),
                (1, 0, 0, 2.0),
                (2, 0, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 0, -1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Asymmetric pattern: every step advances the query by one row.
    #[must_use]
    pub fn asymmetric() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 1, 0, -1.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 2, -1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Alias of [`StepPattern::symmetric2`].
    #[must_use]
    pub fn symmetric_p0() -> Self {
        Self::symmetric2()
    }

    /// Sakoe-Chiba asymmetric pattern, slope constraint P=0.
    #[must_use]
    pub fn asymmetric_p0() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 0, 1, -1.0),
                (1, 0, 0, 0.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 0, -1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Sakoe-Chiba symmetric pattern, slope constraint P=1/2.
    #[must_use]
    pub fn symmetric_p05() -> Self {
        Self::table(
            Normalization::NPlusM,
            &[
                (1, 1, 3, -1.0),
                (1, 0, 2, 2.0),
                (1, 0, 1, 1.0),
                (1, 0, 0, 1.0),
                (2, 1, 2, -1.0),
                (2, 0, 1, 2.0),
                (2, 0, 0, 1.0),
                (3, 1, 1, -1.0),
                (3, 0, 0, 2.0),
                (4, 2, 1, -1.0),
                (4, 1, 0, 2.0),
                (4, 0, 0, 1.0),
                (5, 3, 1, -1.0),
                (5, 2, 0, 2.0),
                (5, 1, 0, 1.0),
                (5, 0, 0, 1.0),
            ],
        )
    }

    /// Sakoe-Chiba asymmetric pattern, slope constraint P=1/2.
    #[must_use]
    pub fn asymmetric_p05() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 1, 3, -1.0),
                (1, 0, 2, 1.0 / 3.0),
                (1, 0, 1, 1.0 / 3.0),
                (1, 0, 0, 1.0 / 3.0),
                (2, 1, 2, -1.0),
                (2, 0, 1, 0.5),
                (2, 0, 0, 0.5),
                (3, 1, 1, -1.0),
                (3, 0, 0, 1.0),
                (4, 2, 1, -1.0),
                (4, 1, 0, 1.0),
                (4, 0, 0, 1.0),
                (5, 3, 1, -1.0),
                (5, 2, 0, 1.0),
                (5, 1, 0, 1.0),
                (5, 0, 0, 1.0),
            ],
        )
    }

    /// Sakoe-Chiba symmetric pattern, slope constraint P=1.
    #[must_use]
    pub fn symmetric_p1() -> Self {
        Self::table(
            Normalization::NPlusM,
            &[
                (1, 1, 2, -1.0),
                (1, 0, 1, 2.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 2.0),
                (3, 2, 1, -1.0),
                (3, 1, 0, 2.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Sakoe-Chiba asymmetric pattern, slope constraint P=1.
    #[must_use]
    pub fn asymmetric_p1() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 1, 2, -1.0),
                (1, 0, 1, 0.5),
                (1, 0, 0, 0.5),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 2, 1, -1.0),
                (3, 1, 0, 1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Sakoe-Chiba symmetric pattern, slope constraint P=2.
    #[must_use]
    pub fn symmetric_p2() -> Self {
        Self::table(
            Normalization::NPlusM,
            &[
                (1, 2, 3, -1.0),
                (1, 1, 2, 2.0),
                (1, 0, 1, 2.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 2.0),
                (3, 3, 2, -1.0),
                (3, 2, 1, 2.0),
                (3, 1, 0, 2.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Sakoe-Chiba asymmetric pattern, slope constraint P=2.
    #[must_use]
    pub fn asymmetric_p2() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 2, 3, -1.0),
                (1, 1, 2, 2.0 / 3.0),
                (1, 0, 1, 2.0 / 3.0),
                (1, 0, 0, 2.0 / 3.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 3, 2, -1.0),
                (3, 2, 1, 1.0),
                (3, 1, 0, 1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Rabiner-Juang type I, slope weighting (a).
    #[must_use]
    pub fn type_ia() -> Self {
        Self::table(
            Normalization::Na,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 1.0),
                (1, 0, 0, 0.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 1.0),
                (3, 0, 0, 0.0),
            ],
        )
    }

    /// Rabiner-Juang type I, slope weighting (b).
    #[must_use]
    pub fn type_ib() -> Self {
        Self::table(
            Normalization::Na,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 1.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 2.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Rabiner-Juang type I, slope weighting (c).
    #[must_use]
    pub fn type_ic() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 1.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 1.0),
                (3, 0, 0, 0.0),
            ],
        )
    }

    /// Rabiner-Juang type I, slope weighting (d).
    #[must_use]
    pub fn type_id() -> Self {
        Self::table(
            Normalization::NPlusM,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 2.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 2.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 2.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Smoothed Rabiner-Juang type I, slope weighting (a).
    #[must_use]
    pub fn type_ias() -> Self {
        Self::table(
            Normalization::Na,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 0.5),
                (1, 0, 0, 0.5),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 0.5),
                (3, 0, 0, 0.5),
            ],
        )
    }

    /// Smoothed Rabiner-Juang type I, slope weighting (b).
    #[must_use]
    pub fn type_ibs() -> Self {
        Self::table(
            Normalization::Na,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 1.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 2.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Smoothed Rabiner-Juang type I, slope weighting (c).
    #[must_use]
    pub fn type_ics() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 1.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 0.5),
                (3, 0, 0, 0.5),
            ],
        )
    }

    /// Smoothed Rabiner-Juang type I, slope weighting (d).
    #[must_use]
    pub fn type_ids() -> Self {
        Self::table(
            Normalization::NPlusM,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 1.5),
                (1, 0, 0, 1.5),
                (2, 1, 1, -1.0),
                (2, 0, 0, 2.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 1.5),
                (3, 0, 0, 1.5),
            ],
        )
    }

    /// Rabiner-Juang type II, slope weighting (a).
    #[must_use]
    pub fn type_iia() -> Self {
        Self::table(
            Normalization::Na,
            &[
                (1, 1, 1, -1.0),
                (1, 0, 0, 1.0),
                (2, 1, 2, -1.0),
                (2, 0, 0, 1.0),
                (3, 2, 1, -1.0),
                (3, 0, 0, 1.0),
            ],
        )
    }

    /// Rabiner-Juang type II, slope weighting (b).
    #[must_use]
    pub fn type_iib() -> Self {
        Self::table(
            Normalization::Na,
            &[
                (1, 1, 1, -1.0),
                (1, 0, 0, 1.0),
                (2, 1, 2, -1.0),
                (2, 0, 0, 2.0),
                (3, 2, 1, -1.0),
                (3, 0, 0, 2.0),
            ],
        )
    }

    /// Rabiner-Juang type II, slope weighting (c).
    #[must_use]
    pub fn type_iic() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 1, 1, -1.0),
                (1, 0, 0, 1.0),
                (2, 1, 2, -1.0),
                (2, 0, 0, 1.0),
                (3, 2, 1, -1.0),
                (3, 0, 0, 2.0),
            ],
        )
    }

    /// Rabiner-Juang type II, slope weighting (d).
    #[must_use]
    pub fn type_iid() -> Self {
        Self::table(
            Normalization::NPlusM,
            &[
                (1, 1, 1, -1.0),
                (1, 0, 0, 2.0),
                (2, 1, 2, -1.0),
                (2, 0, 0, 3.0),
                (3, 2, 1, -1.0),
                (3, 0, 0, 3.0),
            ],
        )
    }

    /// Rabiner-Juang type III, slope weighting (c).
    #[must_use]
    pub fn type_iiic() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 1, 2, -1.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 1.0),
                (3, 2, 1, -1.0),
                (3, 1, 0, 1.0),
                (3, 0, 0, 1.0),
                (4, 2, 2, -1.0),
                (4, 1, 0, 1.0),
                (4, 0, 0, 1.0),
            ],
        )
    }

    /// Rabiner-Juang type IV, slope weighting (c).
    #[must_use]
    pub fn type_ivc() -> Self {
        Self::table(
            Normalization::N,
            &[
                (1, 1, 1, -1.0),
                (1, 0, 0, 1.0),
                (2, 1, 2, -1.0),
                (2, 0, 0, 1.0),
                (3, 1, 3, -1.0),
                (3, 0, 0, 1.0),
                (4, 2, 1, -1.0),
                (4, 1, 0, 1.0),
                (4, 0, 0, 1.0),
                (5, 2, 2, -1.0),
                (5, 1, 0, 1.0),
                (5, 0, 0, 1.0),
                (6, 2, 3, -1.0),
                (6, 1, 0, 1.0),
                (6, 0, 0, 1.0),
                (7, 3, 1, -1.0),
                (7, 2, 0, 1.0),
                (7, 1, 0, 1.0),
                (7, 0, 0, 1.0),
                (8, 3, 2, -1.0),
                (8, 2, 0, 1.0),
                (8, 1, 0, 1.0),
                (8, 0, 0, 1.0),
                (9, 3, 3, -1.0),
                (9, 2, 0, 1.0),
                (9, 1, 0, 1.0),
                (9, 0, 0, 1.0),
            ],
        )
    }

    /// Mori, Uchida et al. (2006) pattern, normalized by reference length.
    #[must_use]
    pub fn mori2006() -> Self {
        Self::table(
            Normalization::M,
            &[
                (1, 2, 1, -1.0),
                (1, 1, 0, 2.0),
                (1, 0, 0, 1.0),
                (2, 1, 1, -1.0),
                (2, 0, 0, 3.0),
                (3, 1, 2, -1.0),
                (3, 0, 1, 3.0),
                (3, 0, 0, 3.0),
            ],
        )
    }

    /// Diagonal-only pattern: no warping allowed.
    #[must_use]
    pub fn rigid() -> Self {
        Self::table(Normalization::N, &[(1, 1, 1, -1.0), (1, 0, 0, 1.0)])
    }
}

const PREDEFINED: &[(&str, fn() -> StepPattern)] = &[
    ("symmetric1", StepPattern::symmetric1),
    ("symmetric2", StepPattern::symmetric2),
    ("asymmetric", StepPattern::asymmetric),
    ("symmetricP0", StepPattern::symmetric_p0),
    ("asymmetricP0", StepPattern::asymmetric_p0),
    ("symmetricP05", StepPattern::symmetric_p05),
    ("asymmetricP05", StepPattern::asymmetric_p05),
    ("symmetricP1", StepPattern::symmetric_p1),
    ("asymmetricP1", StepPattern::asymmetric_p1),
    ("symmetricP2", StepPattern::symmetric_p2),
    ("asymmetricP2", StepPattern::asymmetric_p2),
    ("typeIa", StepPattern::type_ia),
    ("typeIb", StepPattern::type_ib),
    ("typeIc", StepPattern::type_ic),
    ("typeId", StepPattern::type_id),
    ("typeIas", StepPattern::type_ias),
    ("typeIbs", StepPattern::type_ibs),
    ("typeIcs", StepPattern::type_ics),
    ("typeIds", StepPattern::type_ids),
    ("typeIIa", StepPattern::type_iia),
    ("typeIIb", StepPattern::type_iib),
    ("typeIIc", StepPattern::type_iic),
    ("typeIId", StepPattern::type_iid),
    ("typeIIIc", StepPattern::type_iiic),
    ("typeIVc", StepPattern::type_ivc),
    ("mori2006", StepPattern::mori2006),
    ("rigid", StepPattern::rigid),
];

/// Distinct pattern ids in order of first appearance.
fn pattern_ids(rows: &[StepRow]) -> Vec<usize> {
    let mut ids: Vec<usize> = Vec::new();
    for row in rows {
        if !ids.contains(&row.pattern) {
            ids.push(row.pattern);
        }
    }
    ids
}

fn fmt_offset(var: char, d: usize) -> String {
    if d == 0 {
        format!("{var}  ")
    } else {
        format!("{var}-{d}")
    }
}

impl fmt::Display for StepPattern {
    /// Render the recursion, e.g. `g[i-1,j-1] + 2 d[i  ,j  ]` per transition.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Step pattern recursion:")?;
        writeln!(f, " g[i,j] = min(")?;
        for t in &self.transitions {
            let (oi, oj) = t.origin;
            write!(f, "     g[{},{}]", fmt_offset('i', oi), fmt_offset('j', oj))?;
            for &(di, dj, term) in &t.terms {
                match term {
                    StepTerm::Local(w) if w == 0.0 => {}
                    StepTerm::Local(w) => {
                        let coef = if w == 1.0 { "  ".to_string() } else { format!("{w} ") };
                        write!(f, " + {coef}d[{},{}]", fmt_offset('i', di), fmt_offset('j', dj))?;
                    }
                    StepTerm::Constant(c) => write!(f, " + {c}")?,
                    StepTerm::Origin => {}
                }
            }
            writeln!(f, " ,")?;
        }
        writeln!(f, " )")?;
        write!(f, "\nNormalization hint: {}", self.hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_patterns_are_valid() {
        for name in StepPattern::names() {
            let p = StepPattern::named(name).unwrap();
            let revalidated = StepPattern::new(p.rows().to_vec(), p.hint());
            assert!(revalidated.is_ok(), "{name} fails validation");
        }
    }

    #[test]
    fn predefined_hints() {
        assert_eq!(StepPattern::symmetric1().hint(), Normalization::N);
        assert_eq!(StepPattern::symmetric2().hint(), Normalization::NPlusM);
        assert_eq!(StepPattern::asymmetric().hint(), Normalization::N);
        assert_eq!(StepPattern::type_ia().hint(), Normalization::Na);
        assert_eq!(StepPattern::mori2006().hint(), Normalization::M);
    }

    #[test]
    fn transitions_keep_table_order() {
        let p = StepPattern::symmetric2();
        let origins: Vec<_> = p.transitions().iter().map(Transition::origin).collect();
        assert_eq!(origins, vec![(1, 1), (0, 1), (1, 0)]);
        assert_eq!(p.transitions()[0].terms(), &[(0, 0, StepTerm::Local(2.0))]);
    }

    #[test]
    fn replay_lists_intermediates_then_origin() {
        let p = StepPattern::symmetric_p1();
        assert_eq!(p.transitions()[0].replay(), &[(0, 1), (1, 2)]);
        assert_eq!(p.transitions()[1].replay(), &[(1, 1)]);
        assert_eq!(p.transitions()[2].replay(), &[(1, 0), (2, 1)]);
    }

    #[test]
    fn rejects_missing_origin() {
        let rows = vec![StepRow::new(1, 0, 0, StepTerm::Local(1.0))];
        assert!(matches!(
            StepPattern::new(rows, Normalization::Na),
            Err(ConfigError::InvalidStepPattern { .. })
        ));
    }

    #[test]
    fn rejects_self_loop_origin() {
        let rows = vec![
            StepRow::new(1, 0, 0, StepTerm::Origin),
            StepRow::new(1, 0, 0, StepTerm::Local(1.0)),
        ];
        assert!(StepPattern::new(rows, Normalization::Na).is_err());
    }

    #[test]
    fn rejects_empty_table() {
        assert!(StepPattern::new(vec![], Normalization::N).is_err());
    }

    #[test]
    fn custom_pattern_with_constant_term() {
        let rows = vec![
            StepRow::new(7, 1, 1, StepTerm::Origin),
            StepRow::new(7, 0, 0, StepTerm::Local(1.0)),
            StepRow::new(9, 1, 0, StepTerm::Origin),
            StepRow::new(9, 0, 0, StepTerm::Constant(0.5)),
        ];
        let p = StepPattern::new(rows, Normalization::N).unwrap();
        assert_eq!(p.n_patterns(), 2);
        assert_eq!(p.transitions()[1].id(), 9);
    }

    #[test]
    fn transposed_swaps_offsets_and_hint() {
        let p = StepPattern::asymmetric().transposed();
        assert_eq!(p.hint(), Normalization::M);
        let origins: Vec<_> = p.transitions().iter().map(Transition::origin).collect();
        assert_eq!(origins, vec![(0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn mvm_shape() {
        let p = StepPattern::mvm(3).unwrap();
        assert_eq!(p.n_patterns(), 3);
        assert_eq!(p.transitions()[2].origin(), (1, 3));
        assert!(StepPattern::mvm(0).is_err());
    }

    #[test]
    fn unknown_name() {
        assert!(matches!(
            StepPattern::named("nope"),
            Err(ConfigError::UnknownStepPattern { .. })
        ));
    }

    #[test]
    fn normalization_parse_and_display() {
        for hint in [
            Normalization::Na,
            Normalization::N,
            Normalization::M,
            Normalization::NPlusM,
        ] {
            assert_eq!(hint.to_string().parse::<Normalization>().unwrap(), hint);
        }
    }

    #[test]
    fn normalization_apply() {
        assert_eq!(Normalization::Na.apply(12.0, 3, 1), 12.0);
        assert_eq!(Normalization::N.apply(12.0, 3, 1), 4.0);
        assert_eq!(Normalization::M.apply(12.0, 3, 1), 6.0);
        assert_eq!(Normalization::NPlusM.apply(12.0, 3, 2), 2.0);
    }

    #[test]
    fn display_renders_recursion() {
        let text = StepPattern::symmetric2().to_string();
        assert!(text.contains("g[i-1,j-1] + 2 d[i  ,j  ]"));
        assert!(text.contains("Normalization hint: N+M"));
    }
}
