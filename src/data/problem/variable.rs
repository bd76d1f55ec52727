//! # Decision variables
use std::fmt;

use enum_map::{enum_map, EnumMap};

use crate::data::problem::elements::{BoundDirection, VariableType};

/// Stable index of a variable in a `Problem`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VariableId(pub(crate) usize);

impl VariableId {
    /// Position of the variable in the problem's variable arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Whether a variable still appears in the problem by itself.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VariableStatus {
    /// The variable is a variable of the problem.
    Active,
    /// The variable was replaced by `scale * target + constant` during presolving.
    Aggregated {
        /// Variable that represents this variable.
        target: VariableId,
        /// Coefficient of the target variable.
        scale: f64,
        /// Constant term.
        constant: f64,
    },
}

/// A decision variable with its global and local (node) domain.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) variable_type: VariableType,
    pub(crate) global: EnumMap<BoundDirection, f64>,
    pub(crate) local: EnumMap<BoundDirection, f64>,
    /// Rounding locks: `Lower` counts the constraints that block rounding down, `Upper` those that
    /// block rounding up.
    pub(crate) locks: EnumMap<BoundDirection, u32>,
    /// Branching decisions in the current run, keyed by the bound that was changed.
    pub(crate) branchings: EnumMap<BoundDirection, u32>,
    pub(crate) status: VariableStatus,
}

impl Variable {
    pub(crate) fn new(name: String, variable_type: VariableType, lower: f64, upper: f64) -> Self {
        let bounds = enum_map! {
            BoundDirection::Lower => lower,
            BoundDirection::Upper => upper,
        };

        Self {
            name,
            variable_type,
            global: bounds,
            local: bounds,
            locks: EnumMap::default(),
            branchings: EnumMap::default(),
            status: VariableStatus::Active,
        }
    }

    /// Name of the variable.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of the variable.
    pub fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    /// Current local bound.
    pub fn local(&self, direction: BoundDirection) -> f64 {
        self.local[direction]
    }

    /// Current global bound.
    pub fn global(&self, direction: BoundDirection) -> f64 {
        self.global[direction]
    }

    /// Number of rounding locks in a direction.
    pub fn locks(&self, direction: BoundDirection) -> u32 {
        self.locks[direction]
    }

    /// Number of branching decisions that changed the bound in the given direction.
    pub fn branchings(&self, direction: BoundDirection) -> u32 {
        self.branchings[direction]
    }

    /// Whether the variable still represents itself.
    pub fn status(&self) -> VariableStatus {
        self.status
    }
}
