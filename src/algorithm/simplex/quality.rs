//! # Solution quality
//!
//! Violations of a primal point with respect to the constraints and bounds of a linear program,
//! and of reduced costs with respect to the statuses of a basis.
use crate::algorithm::simplex::basis::{Desc, Status};
use crate::data::linear_algebra::matrix::SparseMatrix;
use crate::data::linear_algebra::traits::Element;
use crate::data::linear_algebra::vector::{DenseVector, Vector};

/// Largest and summed violation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Violation<F> {
    /// Largest single violation.
    pub max: F,
    /// Sum of all violations.
    pub sum: F,
}

impl<F: Element> Violation<F> {
    fn none() -> Self {
        Self { max: F::zero(), sum: F::zero(), }
    }

    fn record(&mut self, violation: F) {
        if violation > F::zero() {
            self.max = self.max.max(violation);
            self.sum = self.sum + violation;
        }
    }
}

fn outside<F: Element>(value: F, lower: F, upper: F) -> F {
    if value < lower {
        lower - value
    } else if value > upper {
        value - upper
    } else {
        F::zero()
    }
}

/// Violation of `lhs <= A x <= rhs`.
pub fn constraint_violation<F: Element>(
    matrix: &SparseMatrix<F>,
    x: &DenseVector<F>,
    lhs: &DenseVector<F>,
    rhs: &DenseVector<F>,
) -> Violation<F> {
    debug_assert_eq!(matrix.nr_columns(), x.len());
    debug_assert_eq!(matrix.nr_rows(), lhs.len());
    debug_assert_eq!(matrix.nr_rows(), rhs.len());

    let mut violation = Violation::none();
    for i in 0..matrix.nr_rows() {
        let activity = x.sparse_inner_product(matrix.row(i));
        violation.record(outside(activity, lhs[i], rhs[i]));
    }

    violation
}

/// Violation of `lower <= x <= upper`.
pub fn bound_violation<F: Element>(
    x: &DenseVector<F>,
    lower: &DenseVector<F>,
    upper: &DenseVector<F>,
) -> Violation<F> {
    debug_assert_eq!(x.len(), lower.len());
    debug_assert_eq!(x.len(), upper.len());

    let mut violation = Violation::none();
    for j in 0..x.len() {
        violation.record(outside(x[j], lower[j], upper[j]));
    }

    violation
}

/// Violation of the sign conditions on the reduced costs of the nonbasic columns and the dual
/// values of the nonbasic rows, for a minimization problem in the column representation.
///
/// A variable on its lower bound needs a nonnegative reduced cost, one on its upper bound a
/// nonpositive one and a free variable a zero one.
pub fn reduced_cost_violation<F: Element>(
    desc: &Desc,
    reduced_costs: &DenseVector<F>,
    duals: &DenseVector<F>,
) -> Violation<F> {
    debug_assert_eq!(desc.nr_columns(), reduced_costs.len());
    debug_assert_eq!(desc.nr_rows(), duals.len());

    let sign_violation = |status: Status, value: F| match status {
        Status::PrimalOnLower => (-value).max(F::zero()),
        Status::PrimalOnUpper => value.max(F::zero()),
        Status::PrimalFree => value.abs(),
        _ => F::zero(),
    };

    let mut violation = Violation::none();
    for j in 0..desc.nr_columns() {
        violation.record(sign_violation(desc.column_status(j), reduced_costs[j]));
    }
    for i in 0..desc.nr_rows() {
        violation.record(sign_violation(desc.row_status(i), duals[i]));
    }

    violation
}
