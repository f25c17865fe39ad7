//! Optimal path recovery from the direction matrix.

use tracing::{debug, instrument};

use crate::cost::GlobalCostMatrix;
use crate::error::DtwError;
use crate::path::WarpingPath;
use crate::step_pattern::StepPattern;

/// Walk the direction matrix back from `end` to the start of the alignment.
///
/// Each move replays the chosen transition's intermediate cells and its
/// origin. The walk stops at `(0, 0)` or at a seeded cell (finite cost, no
/// direction).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::BrokenPath`] | An unreached cell, or an unknown transition index, lies on the path |
#[instrument(skip(gcm, pattern))]
pub(crate) fn backtrack(
    gcm: &GlobalCostMatrix,
    pattern: &StepPattern,
    end: (usize, usize),
) -> Result<WarpingPath, DtwError> {
    let (mut i, mut j) = end;
    let mut cells = vec![end];
    let mut steps = Vec::new();

    while (i, j) != (0, 0) {
        let Some(k) = gcm.directions()[(i, j)] else {
            if gcm.is_reached(i, j) {
                break;
            }
            return Err(DtwError::BrokenPath { row: i, col: j });
        };
        let transition = pattern
            .transitions()
            .get(k)
            .ok_or(DtwError::BrokenPath { row: i, col: j })?;
        let (oi, oj) = transition.origin();
        if oi > i || oj > j {
            return Err(DtwError::BrokenPath { row: i, col: j });
        }
        cells.extend(transition.replay().iter().map(|&(di, dj)| (i - di, j - dj)));
        i -= oi;
        j -= oj;
        steps.push(k);
    }

    cells.reverse();
    steps.reverse();
    debug!(moves = steps.len(), start = ?(i, j), "path recovered");
    Ok(WarpingPath::from_cells(&cells, steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::window::Window;

    fn gcm_for(rows: Vec<Vec<f64>>, pattern: &StepPattern) -> GlobalCostMatrix {
        let local = Matrix::local_cost(rows).unwrap();
        GlobalCostMatrix::compute(&local, pattern, &Window::Unconstrained, None).unwrap()
    }

    #[test]
    fn diagonal_on_identity_like_costs() {
        let pattern = StepPattern::symmetric2();
        let gcm = gcm_for(
            vec![
                vec![0.0, 1.0, 1.0],
                vec![1.0, 0.0, 1.0],
                vec![1.0, 1.0, 0.0],
            ],
            &pattern,
        );
        let path = backtrack(&gcm, &pattern, (2, 2)).unwrap();
        assert_eq!(path.index1(), &[0, 1, 2]);
        assert_eq!(path.index2(), &[0, 1, 2]);
        assert_eq!(path.steps_taken(), &[0, 0]);
    }

    #[test]
    fn multi_step_transition_replays_intermediate_cell() {
        // The first symmetricP1 transition (origin (1, 2)) passes through (i, j-1).
        let pattern = StepPattern::symmetric_p1();
        let gcm = gcm_for(
            vec![vec![0.0, 9.0, 9.0], vec![9.0, 0.0, 0.0]],
            &pattern,
        );
        let path = backtrack(&gcm, &pattern, (1, 2)).unwrap();
        assert_eq!(path.index1(), &[0, 1, 1]);
        assert_eq!(path.index2(), &[0, 1, 2]);
        assert_eq!(path.steps_taken(), &[0]);
    }

    #[test]
    fn unreached_end_is_broken() {
        let pattern = StepPattern::asymmetric();
        let gcm = gcm_for(vec![vec![1.0, 1.0, 1.0]], &pattern);
        assert!(matches!(
            backtrack(&gcm, &pattern, (0, 2)),
            Err(DtwError::BrokenPath { row: 0, col: 2 })
        ));
    }

    #[test]
    fn stops_at_seeded_cell() {
        let pattern = StepPattern::asymmetric();
        let local = Matrix::local_cost(vec![vec![0.0, 0.0, 0.0], vec![5.0, 1.0, 5.0]]).unwrap();
        let mut seed = Matrix::filled(2, 3, f64::NAN);
        for j in 0..3 {
            seed[(0, j)] = 0.0;
        }
        let gcm =
            GlobalCostMatrix::compute(&local, &pattern, &Window::Unconstrained, Some(seed)).unwrap();
        let path = backtrack(&gcm, &pattern, (1, 1)).unwrap();
        assert_eq!(path.index1(), &[0, 1]);
        assert_eq!(path.index2(), &[1, 1]);
    }
}
