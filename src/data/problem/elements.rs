//! # Building blocks to describe problems
use std::ops::Not;

use enum_map::Enum;

/// Direction of a bound.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundDirection {
    /// x >= b
    Lower,
    /// x <= b
    Upper,
}

impl Not for BoundDirection {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
        }
    }
}

/// A variable is either binary, general integer or continuous.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariableType {
    Binary,
    Integer,
    Continuous,
}

impl VariableType {
    /// Whether values of this type are rounded to integers.
    pub fn is_integral(self) -> bool {
        match self {
            VariableType::Binary | VariableType::Integer => true,
            VariableType::Continuous => false,
        }
    }
}

/// Outcome of a request to change a bound.
///
/// Infeasibility is an outcome, not an error: the caller decides whether it leads to a cutoff.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[must_use]
pub enum Tightening {
    /// The new bound contradicts the opposite bound. Nothing was changed.
    Infeasible,
    /// The bound was changed.
    Tightened,
    /// The new bound is not stronger than the current one. Nothing was changed.
    Unchanged,
}

impl Tightening {
    /// Combine the outcomes of two requests that were made together.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Tightening::Infeasible, _) | (_, Tightening::Infeasible) => Tightening::Infeasible,
            (Tightening::Tightened, _) | (_, Tightening::Tightened) => Tightening::Tightened,
            _ => Tightening::Unchanged,
        }
    }

    /// Whether the bound change contradicts the current domain.
    pub fn is_infeasible(self) -> bool {
        self == Tightening::Infeasible
    }
}
