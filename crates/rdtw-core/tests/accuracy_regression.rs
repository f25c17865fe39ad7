//! Accuracy regression tests for rdtw-core.
//!
//! Reference values for the worked example (Rabiner & Juang, exercise 4.7)
//! were computed by hand and cross-checked against the canonical DTW package.
//! The property checks run over seeded random local cost matrices.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rdtw_core::{
    DistanceMethod, Dtw, DtwError, Matrix, Normalization, Sequence, StepPattern, Window,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn worked_example() -> Matrix<f64> {
    Matrix::local_cost(vec![
        vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0],
        vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0],
        vec![3.0, 1.0, 2.0, 2.0, 3.0, 3.0],
        vec![3.0, 1.0, 2.0, 1.0, 1.0, 2.0],
        vec![3.0, 2.0, 1.0, 2.0, 1.0, 2.0],
        vec![3.0, 3.0, 3.0, 2.0, 1.0, 2.0],
    ])
    .expect("valid worked example")
}

fn random_matrix(rng: &mut ChaCha8Rng, n: usize, m: usize) -> Matrix<f64> {
    Matrix::from_fn(n, m, |_, _| rng.gen_range(0.0..10.0))
}

fn columns(matrix: &Matrix<f64>, start: usize) -> Matrix<f64> {
    Matrix::from_fn(matrix.n_rows(), matrix.n_cols() - start, |i, j| {
        matrix[(i, j + start)]
    })
}

fn transpose(matrix: &Matrix<f64>) -> Matrix<f64> {
    Matrix::from_fn(matrix.n_cols(), matrix.n_rows(), |i, j| matrix[(j, i)])
}

fn pairs(index1: &[usize], index2: &[usize]) -> Vec<(usize, usize)> {
    index1.iter().copied().zip(index2.iter().copied()).collect()
}

fn asymmetric() -> Dtw {
    Dtw::new().with_step_pattern(StepPattern::asymmetric())
}

// ---------------------------------------------------------------------------
// a) worked example reference values
// ---------------------------------------------------------------------------

#[test]
fn asymmetric_worked_example_cost_matrix() {
    let al = asymmetric()
        .with_keep_internals(true)
        .align_local_cost(&worked_example())
        .expect("feasible");
    let internals = al.internals.expect("internals kept");
    assert_eq!(internals.cost.row(5), &[14.0, 9.0, 8.0, 7.0, 6.0, 7.0]);
    assert_eq!(al.distance, 7.0);
    assert!((al.normalized_distance.unwrap() - 7.0 / 6.0).abs() < 1e-12);
}

#[test]
fn symmetric2_worked_example() {
    let al = Dtw::new()
        .align_local_cost(&worked_example())
        .expect("feasible");
    assert_eq!(al.distance, 13.0);
    assert!((al.normalized_distance.unwrap() - 13.0 / 12.0).abs() < 1e-12);
    let path = al.path.expect("path");
    assert_eq!(
        pairs(path.index1(), path.index2()),
        vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 2), (4, 3), (5, 4), (5, 5)]
    );
}

#[test]
fn symmetric1_worked_example() {
    let al = Dtw::new()
        .with_step_pattern(StepPattern::symmetric1())
        .align_local_cost(&worked_example())
        .expect("feasible");
    assert_eq!(al.distance, 8.0);
    assert!((al.normalized_distance.unwrap() - 8.0 / 6.0).abs() < 1e-12);
    let path = al.path.expect("path");
    assert_eq!(path.index1(), &[0, 1, 2, 3, 4, 5]);
    assert_eq!(path.index2(), &[0, 1, 2, 3, 4, 5]);
}

#[test]
fn symmetric2_sakoe_chiba_worked_example() {
    let window = Window::SakoeChiba { window_size: 1 };
    let al = Dtw::new()
        .with_window(window)
        .align_local_cost(&worked_example())
        .expect("feasible");
    assert_eq!(al.distance, 13.0);
    let path = al.path.expect("path");
    assert_eq!(
        pairs(path.index1(), path.index2()),
        vec![(0, 0), (1, 0), (2, 1), (2, 2), (3, 3), (4, 4), (5, 4), (5, 5)]
    );
}

#[test]
fn open_begin_and_open_end_worked_example() {
    let al = asymmetric()
        .with_open_begin(true)
        .with_open_end(true)
        .align_local_cost(&worked_example())
        .expect("feasible");
    assert_eq!(al.distance, 6.0);
    assert_eq!(al.end_column, 4);
    let path = al.path.expect("path");
    assert_eq!(
        pairs(path.index1(), path.index2()),
        vec![(0, 1), (1, 1), (2, 1), (3, 3), (4, 4), (5, 4)]
    );
}

#[test]
fn sakoe_chiba_zero_on_rectangular_is_infeasible() {
    let local = columns(&worked_example(), 2);
    assert_eq!(local.shape(), (6, 4));
    let err = Dtw::new()
        .with_window(Window::SakoeChiba { window_size: 0 })
        .align_local_cost(&local)
        .unwrap_err();
    assert!(matches!(err, DtwError::NoWarpingPath { .. }));
}

#[test]
fn sequences_with_repeated_samples_align_at_zero_cost() {
    let query = Sequence::univariate(vec![1.0, 2.0, 3.0]).unwrap();
    let reference = Sequence::univariate(vec![1.0, 2.0, 2.0, 3.0]).unwrap();
    let al = Dtw::new().align(&query, &reference).expect("feasible");
    assert_eq!(al.distance, 0.0);
    assert_eq!(al.normalized_distance, Some(0.0));
}

#[test]
fn multivariate_sequences_use_configured_metric() {
    let query = Sequence::from_rows(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
    let reference = Sequence::from_rows(vec![vec![0.0, 0.0], vec![1.0, 2.0]]).unwrap();
    let al = Dtw::new()
        .with_distance_method(DistanceMethod::Cityblock)
        .with_step_pattern(StepPattern::symmetric1())
        .align(&query, &reference)
        .expect("feasible");
    assert_eq!(al.distance, 1.0);
}

// ---------------------------------------------------------------------------
// b) single-cell alignments
// ---------------------------------------------------------------------------

#[test]
fn single_cell_with_every_predefined_pattern() {
    let local = Matrix::local_cost(vec![vec![2.5]]).unwrap();
    for name in StepPattern::names() {
        let pattern = StepPattern::named(name).unwrap();
        let al = Dtw::new()
            .with_step_pattern(pattern)
            .align_local_cost(&local)
            .unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(al.distance, 2.5, "{name}");
        let path = al.path.expect("path");
        assert_eq!(path.index1(), &[0], "{name}");
        assert_eq!(path.index2(), &[0], "{name}");
        assert!(path.steps_taken().is_empty(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// c) properties over random matrices
// ---------------------------------------------------------------------------

#[test]
fn asymmetric_normalizes_by_query_length() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..25 {
        let n = rng.gen_range(2..12);
        let m = rng.gen_range(1..=n);
        let local = random_matrix(&mut rng, n, m);
        let al = asymmetric().align_local_cost(&local).expect("feasible");
        assert_eq!(al.hint, Normalization::N);
        let expected = al.distance / n as f64;
        assert!((al.normalized_distance.unwrap() - expected).abs() < 1e-12);
    }
}

#[test]
fn single_step_paths_sum_local_costs() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for pattern in [StepPattern::symmetric1(), StepPattern::asymmetric()] {
        for _ in 0..20 {
            let n = rng.gen_range(2..10);
            let m = rng.gen_range(1..=n);
            let local = random_matrix(&mut rng, n, m);
            let al = Dtw::new()
                .with_step_pattern(pattern.clone())
                .align_local_cost(&local)
                .expect("feasible");
            let path = al.path.expect("path");
            let total: f64 = path.steps().map(|s| local[(s.query, s.reference)]).sum();
            assert!(
                (total - al.distance).abs() < 1e-9,
                "path sum {total} != distance {}",
                al.distance
            );
        }
    }
}

#[test]
fn appending_zero_row_or_column_never_increases_distance() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    for _ in 0..25 {
        let n = rng.gen_range(2..10);
        let m = rng.gen_range(1..=n);
        let local = random_matrix(&mut rng, n, m);

        let base = asymmetric().align_local_cost(&local).expect("feasible");
        let with_row = Matrix::from_fn(n + 1, m, |i, j| if i < n { local[(i, j)] } else { 0.0 });
        let extended = asymmetric().align_local_cost(&with_row).expect("feasible");
        assert!(extended.distance <= base.distance + 1e-9);

        let base = Dtw::new().align_local_cost(&local).expect("feasible");
        let with_col = Matrix::from_fn(n, m + 1, |i, j| if j < m { local[(i, j)] } else { 0.0 });
        let extended = Dtw::new().align_local_cost(&with_col).expect("feasible");
        assert!(extended.distance <= base.distance + 1e-9);
    }
}

#[test]
fn paths_are_monotone_and_span_the_matrix() {
    let patterns = [
        StepPattern::symmetric2(),
        StepPattern::symmetric_p05(),
        StepPattern::symmetric_p1(),
        StepPattern::asymmetric_p2(),
        StepPattern::type_iiic(),
        StepPattern::type_ivc(),
        StepPattern::mori2006(),
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for pattern in patterns {
        for _ in 0..15 {
            let n = rng.gen_range(3..14);
            let m = rng.gen_range(3..14);
            let local = random_matrix(&mut rng, n, m);
            let al = match Dtw::new()
                .with_step_pattern(pattern.clone())
                .align_local_cost(&local)
            {
                Ok(al) => al,
                Err(e) if e.is_infeasible() => continue,
                Err(e) => panic!("unexpected error: {e}"),
            };
            let path = al.path.expect("path");

            let mut deduped = pairs(path.index1s(), path.index2s());
            deduped.dedup();
            assert_eq!(deduped, pairs(path.index1(), path.index2()));

            assert_eq!(path.index1().first(), Some(&0));
            assert_eq!(path.index2().first(), Some(&0));
            assert_eq!(path.index1().last(), Some(&(n - 1)));
            assert_eq!(path.index2().last(), Some(&(m - 1)));
            for w in path.index1s().windows(2) {
                assert!(w[0] <= w[1]);
            }
            for w in path.index2s().windows(2) {
                assert!(w[0] <= w[1]);
            }
        }
    }
}

#[test]
fn paths_stay_inside_the_window() {
    let windows = [
        Window::SakoeChiba { window_size: 2 },
        Window::Itakura,
        Window::SlantedBand { window_size: 1 },
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for window in &windows {
        for _ in 0..20 {
            let n: usize = rng.gen_range(4..14);
            let m = rng.gen_range(n.saturating_sub(2).max(2)..n + 3);
            let local = random_matrix(&mut rng, n, m);
            let al = match Dtw::new().with_window(window.clone()).align_local_cost(&local) {
                Ok(al) => al,
                Err(e) if e.is_infeasible() => continue,
                Err(e) => panic!("unexpected error: {e}"),
            };
            let path = al.path.expect("path");
            for step in path.steps() {
                assert!(
                    window.admits(step.query, step.reference, n, m),
                    "{window}: ({}, {}) outside {n}x{m} window",
                    step.query,
                    step.reference
                );
            }
        }
    }
}

#[test]
fn symmetric2_is_symmetric_under_transposition() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..20 {
        let n = rng.gen_range(1..10);
        let m = rng.gen_range(1..10);
        let local = random_matrix(&mut rng, n, m);
        let forward = Dtw::new().align_local_cost(&local).expect("feasible");
        let backward = Dtw::new()
            .align_local_cost(&transpose(&local))
            .expect("feasible");
        assert!((forward.distance - backward.distance).abs() < 1e-9);
    }
}

#[test]
fn open_begin_is_best_closed_alignment_over_start_columns() {
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    for _ in 0..20 {
        let n = rng.gen_range(2..9);
        let m = rng.gen_range(2..=n + 2);
        let local = random_matrix(&mut rng, n, m);

        let open = asymmetric()
            .with_open_begin(true)
            .align_local_cost(&local)
            .expect("feasible");
        let path = open.path.as_ref().expect("path");
        assert_eq!(path.index1().first(), Some(&0));
        assert!(path.index1().iter().all(|&i| i < n));
        assert_eq!(path.len(), path.index1().len());

        let best_closed = (0..m)
            .filter_map(|k| asymmetric().align_local_cost(&columns(&local, k)).ok())
            .map(|al| al.distance)
            .fold(f64::INFINITY, f64::min);
        assert!(
            (open.distance - best_closed).abs() < 1e-9,
            "open-begin {} != best closed {best_closed}",
            open.distance
        );

        let start = path.index2()[0];
        let from_start = asymmetric()
            .align_local_cost(&columns(&local, start))
            .expect("start column is feasible");
        assert!((from_start.distance - open.distance).abs() < 1e-9);
    }
}

#[test]
fn open_end_is_best_normalized_prefix_alignment() {
    let mut rng = ChaCha8Rng::seed_from_u64(77);
    for _ in 0..20 {
        let n = rng.gen_range(2..9);
        let m = rng.gen_range(2..=n);
        let local = random_matrix(&mut rng, n, m);
        let open = asymmetric()
            .with_open_end(true)
            .align_local_cost(&local)
            .expect("feasible");
        for end in 0..m {
            let prefix = Matrix::from_fn(n, end + 1, |i, j| local[(i, j)]);
            if let Ok(closed) = asymmetric().align_local_cost(&prefix) {
                assert!(open.distance <= closed.distance + 1e-9);
            }
        }
        assert_eq!(
            open.path.expect("path").index2().last(),
            Some(&open.end_column)
        );
    }
}
