//! # LP rows and cuts
//!
//! Constraint handlers describe their linear relaxation with rows, which are collected in a cut
//! pool. Solving the LP is not the business of this crate.
use std::fmt;

use log::trace;

use crate::data::problem::{Problem, VariableId};

/// A linear row `lhs <= sum_j a_j x_j <= rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    /// Name, derived from the constraint.
    pub name: String,
    /// Left hand side, may be `f64::NEG_INFINITY`.
    pub lhs: f64,
    /// Right hand side, may be `f64::INFINITY`.
    pub rhs: f64,
    /// Coefficients.
    pub coefficients: Vec<(VariableId, f64)>,
}

impl Row {
    /// Create a row.
    pub fn new(name: impl Into<String>, lhs: f64, rhs: f64, coefficients: Vec<(VariableId, f64)>) -> Self {
        debug_assert!(lhs <= rhs);

        Self { name: name.into(), lhs, rhs, coefficients, }
    }

    /// Value of the row in a solution.
    pub fn activity(&self, problem: &Problem, solution: &[f64]) -> f64 {
        self.coefficients.iter()
            .map(|&(variable, coefficient)| coefficient * problem.value(variable, solution))
            .sum()
    }

    /// By how much a solution violates the sides, zero if it doesn't.
    pub fn violation(&self, problem: &Problem, solution: &[f64]) -> f64 {
        let activity = self.activity(problem, solution);
        (self.lhs - activity).max(activity - self.rhs).max(0f64)
    }

    /// Whether a solution satisfies the row within a tolerance.
    pub fn is_feasible(&self, problem: &Problem, solution: &[f64], tolerance: f64) -> bool {
        self.violation(problem, solution) <= tolerance
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} <=", self.name, self.lhs)?;
        for (variable, coefficient) in &self.coefficients {
            write!(f, " {:+} {}", coefficient, variable)?;
        }
        write!(f, " <= {}", self.rhs)
    }
}

/// Rows added to the LP relaxation.
#[derive(Clone, Debug, Default)]
pub struct CutPool {
    rows: Vec<Row>,
    tolerance: f64,
}

impl CutPool {
    /// Create an empty pool that considers rows violated beyond a tolerance.
    pub fn new(tolerance: f64) -> Self {
        Self { rows: Vec::new(), tolerance, }
    }

    /// Offer a row.
    ///
    /// # Arguments
    ///
    /// * `row`: The row.
    /// * `solution`: If present, the row is only added when the solution violates it. Without a
    /// solution, the row is always added (initial LP).
    /// * `problem`: To evaluate the row.
    ///
    /// # Return value
    ///
    /// Whether the row was added.
    pub fn add_cut(&mut self, row: Row, solution: Option<&[f64]>, problem: &Problem) -> bool {
        if let Some(solution) = solution {
            if row.is_feasible(problem, solution, self.tolerance) {
                return false;
            }
        }

        trace!("adding row {}", row);
        self.rows.push(row);
        true
    }

    /// All rows added so far.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows were added.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::propagation::separation::{CutPool, Row};
    use crate::data::problem::Problem;

    #[test]
    fn violated_rows_only() {
        let mut problem = Problem::new();
        let x = problem.add_binary("x");
        let y = problem.add_binary("y");
        let row = Row::new("cover", 1f64, f64::INFINITY, vec![(x, 1f64), (y, 1f64)]);

        assert_eq!(row.violation(&problem, &[0f64, 0f64]), 1f64);
        assert_eq!(row.to_string(), "cover: 1 <= +1 x0 +1 x1 <= inf");

        let mut pool = CutPool::new(1e-6);
        assert!(!pool.add_cut(row.clone(), Some(&[1f64, 0f64]), &problem));
        assert!(pool.add_cut(row.clone(), Some(&[0f64, 0.5f64]), &problem));
        assert!(pool.add_cut(row, None, &problem));
        assert_eq!(pool.len(), 2);
    }
}
