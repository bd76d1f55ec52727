//! # Literals
//!
//! A binary variable or its negation.
use std::fmt;
use std::ops::Not;

use crate::data::problem::elements::BoundDirection;
use crate::data::problem::variable::VariableId;

/// A binary variable `x` (positive) or `1 - x` (negated).
///
/// Literals order by variable first, so sorting a clause groups a variable with its negation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Literal {
    variable: VariableId,
    negated: bool,
}

impl Literal {
    /// The literal `x`.
    pub fn positive(variable: VariableId) -> Self {
        Self { variable, negated: false, }
    }

    /// The literal `1 - x`.
    pub fn negative(variable: VariableId) -> Self {
        Self { variable, negated: true, }
    }

    /// The underlying variable.
    pub fn variable(self) -> VariableId {
        self.variable
    }

    /// Whether this is the negation of the variable.
    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// Dense code, `2 * variable + negated`. Codes of a literal and its negation differ by one.
    pub fn code(self) -> usize {
        2 * self.variable.index() + usize::from(self.negated)
    }

    /// The bound of the variable that makes this literal false when it is tightened.
    ///
    /// A positive literal is false once the upper bound is zero, a negated one once the lower
    /// bound is one.
    pub fn falsifying_bound(self) -> BoundDirection {
        if self.negated { BoundDirection::Lower } else { BoundDirection::Upper }
    }

    /// Value of the literal given a value of the variable.
    pub fn value(self, variable_value: f64) -> f64 {
        if self.negated { 1f64 - variable_value } else { variable_value }
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self { variable: self.variable, negated: !self.negated, }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~{}", self.variable)
        } else {
            write!(f, "{}", self.variable)
        }
    }
}
