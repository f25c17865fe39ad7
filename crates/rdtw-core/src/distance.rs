//! Pairwise local distances between the time steps of two sequences.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::instrument;

use crate::error::ConfigError;
use crate::matrix::Matrix;
use crate::sequence::Sequence;

/// Metric used to build the local cost matrix from two sequences.
///
/// Names follow the usual `cdist` conventions; `manhattan` is accepted as an
/// alias of `cityblock`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    /// `sqrt(sum((u - v)^2))`
    #[default]
    Euclidean,
    /// `sum((u - v)^2)`
    SqEuclidean,
    /// `sum(|u - v|)`
    Cityblock,
    /// `max(|u - v|)`
    Chebyshev,
    /// `1 - u.v / (|u| |v|)`; zero vectors are at distance 0 from each other
    /// and 1 from anything else.
    Cosine,
    /// `sum(|u - v| / (|u| + |v|))`, skipping terms with a zero denominator.
    Canberra,
    /// `sum(|u - v|) / sum(|u + v|)`; zero when the denominator vanishes.
    BrayCurtis,
}

impl DistanceMethod {
    /// Distance between two feature vectors of equal length.
    #[must_use]
    pub fn distance(self, u: &[f64], v: &[f64]) -> f64 {
        debug_assert_eq!(u.len(), v.len());
        let pairs = u.iter().zip(v);
        match self {
            Self::Euclidean => Self::SqEuclidean.distance(u, v).sqrt(),
            Self::SqEuclidean => pairs.map(|(a, b)| (a - b).powi(2)).sum(),
            Self::Cityblock => pairs.map(|(a, b)| (a - b).abs()).sum(),
            Self::Chebyshev => pairs.map(|(a, b)| (a - b).abs()).fold(0.0, f64::max),
            Self::Cosine => {
                let (dot, nu, nv) = pairs.fold((0.0, 0.0, 0.0), |(dot, nu, nv), (a, b)| {
                    (dot + a * b, nu + a * a, nv + b * b)
                });
                let norm = (nu * nv).sqrt();
                if norm > 1e-12 {
                    (1.0 - dot / norm).max(0.0)
                } else if nu == nv {
                    0.0
                } else {
                    1.0
                }
            }
            Self::Canberra => pairs
                .map(|(a, b)| {
                    let denom = a.abs() + b.abs();
                    if denom == 0.0 { 0.0 } else { (a - b).abs() / denom }
                })
                .sum(),
            Self::BrayCurtis => {
                let (num, denom) = pairs.fold((0.0, 0.0), |(num, denom), (a, b)| {
                    (num + (a - b).abs(), denom + (a + b).abs())
                });
                if denom == 0.0 { 0.0 } else { num / denom }
            }
        }
    }

    /// Return the canonical name of this method.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::SqEuclidean => "sqeuclidean",
            Self::Cityblock => "cityblock",
            Self::Chebyshev => "chebyshev",
            Self::Cosine => "cosine",
            Self::Canberra => "canberra",
            Self::BrayCurtis => "braycurtis",
        }
    }
}

impl fmt::Display for DistanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "euclidean" => Ok(Self::Euclidean),
            "sqeuclidean" => Ok(Self::SqEuclidean),
            "cityblock" | "manhattan" => Ok(Self::Cityblock),
            "chebyshev" => Ok(Self::Chebyshev),
            "cosine" => Ok(Self::Cosine),
            "canberra" => Ok(Self::Canberra),
            "braycurtis" => Ok(Self::BrayCurtis),
            other => Err(ConfigError::UnknownDistanceMethod {
                name: other.to_string(),
            }),
        }
    }
}

/// Compute the `query.len() x reference.len()` local cost matrix.
///
/// # Errors
///
/// Returns [`ConfigError::DimensionMismatch`] if the sequences have different
/// feature counts.
#[instrument(skip(query, reference), fields(n = query.len(), m = reference.len()))]
pub fn local_cost_matrix(
    query: &Sequence,
    reference: &Sequence,
    method: DistanceMethod,
) -> Result<Matrix<f64>, ConfigError> {
    if query.n_features() != reference.n_features() {
        return Err(ConfigError::DimensionMismatch {
            query: query.n_features(),
            reference: reference.n_features(),
        });
    }
    Ok(Matrix::from_fn(query.len(), reference.len(), |i, j| {
        method.distance(query.step(i), reference.step(j))
    }))
}
