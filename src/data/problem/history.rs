//! # Bound change history
//!
//! Every local bound change is recorded together with the depth at which it was made and the
//! reason for it. Conflict analysis walks this history backwards.
use std::fmt;

use enum_map::Enum;

use crate::data::problem::elements::BoundDirection;
use crate::data::problem::variable::VariableId;

/// Kind of constraint handler that inferred a bound change or receives an event.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HandlerKind {
    /// Links an integer variable to binary variables.
    Linking,
    /// Clauses over binary literals.
    LogicOr,
}

impl HandlerKind {
    /// Name of the handler, used in messages.
    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::Linking => "linking",
            HandlerKind::LogicOr => "logicor",
        }
    }
}

/// Index of a constraint within its handler.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ConstraintId(pub(crate) usize);

impl ConstraintId {
    /// Position of the constraint in its handler.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Justification of an inferred bound change.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Reason {
    /// Handler that made the inference.
    pub handler: HandlerKind,
    /// Constraint of that handler.
    pub constraint: ConstraintId,
    /// Handler specific code describing the rule that fired.
    pub info: u64,
}

/// Why a bound was changed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cause {
    /// Branching decision or a change without justification.
    Decision,
    /// Deduced by a constraint.
    Inference(Reason),
}

/// A recorded local bound change.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundChange {
    /// Variable of which the bound changed.
    pub variable: VariableId,
    /// Which bound changed.
    pub direction: BoundDirection,
    /// Bound before the change.
    pub old: f64,
    /// Bound after the change.
    pub new: f64,
    /// Depth of the search node at which the change was made.
    pub depth: usize,
    /// Why the change was made.
    pub cause: Cause,
    /// History position of the previous change of the same bound.
    pub(crate) previous: Option<usize>,
}

/// Kinds of bound change events.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    /// The lower bound increased.
    LowerTightened,
    /// The lower bound decreased, because of backtracking.
    LowerRelaxed,
    /// The upper bound decreased.
    UpperTightened,
    /// The upper bound increased, because of backtracking.
    UpperRelaxed,
}

impl EventKind {
    /// The event kind of a bound change.
    pub fn of(direction: BoundDirection, tightened: bool) -> Self {
        match (direction, tightened) {
            (BoundDirection::Lower, true) => EventKind::LowerTightened,
            (BoundDirection::Lower, false) => EventKind::LowerRelaxed,
            (BoundDirection::Upper, true) => EventKind::UpperTightened,
            (BoundDirection::Upper, false) => EventKind::UpperRelaxed,
        }
    }
}

/// A bound of a variable changed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundEvent {
    /// Variable of which the bound changed.
    pub variable: VariableId,
    /// What happened.
    pub kind: EventKind,
    /// Bound before the change.
    pub old: f64,
    /// Bound after the change.
    pub new: f64,
}
