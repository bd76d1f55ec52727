//! # Ratio tests and basis bookkeeping
//!
//! A single primal pivot on a small bounded problem, followed by the quality measures of the new
//! basis.
use rcip::algorithm::simplex::basis::{Desc, Representation, Status};
use rcip::algorithm::simplex::quality::{bound_violation, constraint_violation, reduced_cost_violation};
use rcip::algorithm::simplex::ratio_test::{Boxed, Direction, RatioTest, Side};
use rcip::algorithm::simplex::ratio_test::harris::{Harris, HarrisSettings};
use rcip::algorithm::simplex::ratio_test::textbook::Textbook;
use rcip::data::linear_algebra::matrix::SparseMatrix;
use rcip::data::linear_algebra::vector::{DenseVector, SemiSparse, Vector};

const INF: f64 = f64::INFINITY;

fn update(values: Vec<f64>) -> SemiSparse<f64> {
    let mut update = SemiSparse::from_values(values, 1e-12);
    update.setup();
    update
}

#[test]
fn harris_trades_step_for_pivot_size() {
    let update = update(vec![0.5, 1f64]);
    let boxed = Boxed::new(vec![0f64, 0f64], vec![-INF, -INF], vec![1f64, 2.000_000_5]);

    let mut harris = Harris::new(HarrisSettings::default());
    let selection = harris.select_leave(&update, &mut boxed.clone(), Direction::Increase).unwrap();
    assert_eq!(selection.index, 1);
    assert_eq!(selection.pivot, 1f64);
    assert!((selection.step - 2.000_000_5).abs() < 1e-12);
    assert_eq!(harris.total_shift(), 0f64);

    let selection = Textbook.select_leave(&update, &mut boxed.clone(), Direction::Increase).unwrap();
    assert_eq!(selection.index, 0);
    assert_eq!(selection.step, 2f64);
    assert_eq!(selection.pivot, 0.5);
}

#[test]
fn harris_without_slack() {
    // The first variable is slightly above its upper bound, within the tolerance.
    let update = update(vec![1f64, 0.25]);
    let mut boxed = Boxed::new(vec![1.000_000_1, 0f64], vec![-INF, -INF], vec![1f64, 1f64]);

    let mut harris = Harris::new(HarrisSettings::default());
    let selection = harris.select_leave(&update, &mut boxed, Direction::Increase).unwrap();
    assert_eq!(selection.index, 0);
    assert_eq!(selection.step, 0f64);
    assert_eq!(boxed.upper[0], 1.000_000_1);
    assert!((harris.total_shift() - 1e-7).abs() < 1e-12);

    harris.reset_shift();
    assert_eq!(harris.total_shift(), 0f64);
}

#[test]
fn entering_from_either_side() {
    let vector = update(vec![0f64, -2f64]);
    let co_vector = update(vec![4f64]);
    let mut boxed = Boxed::new(vec![0f64, 0f64], vec![0f64, -3f64], vec![INF, INF]);
    let mut co_boxed = Boxed::new(vec![0f64], vec![-INF], vec![6.000_001]);

    // The co-vector allows a slightly longer step than the vector, but has the larger pivot.
    let mut harris = Harris::new(HarrisSettings::default());
    let (side, selection) = harris
        .select_enter(&vector, &mut boxed.clone(), &co_vector, &mut co_boxed.clone(), Direction::Increase)
        .unwrap();
    assert_eq!(side, Side::CoVector);
    assert_eq!(selection.index, 0);

    let (side, selection) = Textbook
        .select_enter(&vector, &mut boxed, &co_vector, &mut co_boxed, Direction::Increase)
        .unwrap();
    assert_eq!(side, Side::Vector);
    assert_eq!(selection.index, 1);
    assert_eq!(selection.step, 1.5);

    let unbounded = Textbook.select_enter(&vector, &mut boxed, &co_vector, &mut co_boxed, Direction::Decrease);
    assert!(unbounded.is_none());
}

#[test]
fn pivot_on_bounded_problem() {
    // min -x0 - 2 x1 s.t. x0 + x1 <= 3, x1 <= 2, x >= 0
    let matrix = SparseMatrix::from_dense(vec![vec![1f64, 1f64], vec![0f64, 1f64]]);
    let mut desc = Desc::new(2, 2);
    assert!(desc.is_consistent(Representation::Column));

    // x1 enters; the slacks change as -A e1.
    let mut column = SemiSparse::new(2, 1e-12);
    column.set_value(1, 1f64);
    let mut direction = SemiSparse::new(2, 1e-12);
    direction.assign_matrix_vector_and_setup(&matrix, &column);
    let slacks = Boxed::new(vec![3f64, 2f64], vec![0f64, 0f64], vec![INF, INF]);
    let selection = Textbook.select_leave(&direction, &mut slacks.clone(), Direction::Decrease).unwrap();
    assert_eq!((selection.index, selection.step), (1, 2f64));

    *desc.row_status_mut(selection.index) = Status::PrimalOnLower;
    *desc.column_status_mut(1) = Status::DualFree;
    assert!(desc.is_consistent(Representation::Column));
    assert_eq!(desc.nr_basic(Representation::Column), 2);

    let x = DenseVector::new(vec![0f64, 2f64], 2);
    let lhs = DenseVector::new(vec![-INF, -INF], 2);
    let rhs = DenseVector::new(vec![3f64, 2f64], 2);
    assert_eq!(constraint_violation(&matrix, &x, &lhs, &rhs).max, 0f64);
    let zero = DenseVector::new(vec![0f64, 0f64], 2);
    let infinite = DenseVector::new(vec![INF, INF], 2);
    assert_eq!(bound_violation(&x, &zero, &infinite).sum, 0f64);

    // Duals y = (0, -2), reduced costs c - A^T y = (-1, 0): x0 should still enter.
    let reduced_costs = DenseVector::new(vec![-1f64, 0f64], 2);
    let duals = DenseVector::new(vec![0f64, -2f64], 2);
    let violation = reduced_cost_violation(&desc, &reduced_costs, &duals);
    assert_eq!(violation.max, 2f64);
    assert_eq!(violation.sum, 3f64);
}
