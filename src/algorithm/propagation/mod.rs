//! # Constraint propagation
//!
//! Constraint handlers own the constraints of one kind and know how to propagate, check, enforce,
//! separate and presolve them. They share a `Context` holding the problem, the event registry,
//! the conflict analysis and the cut pool. The `ConstraintSystem` drives them.
use std::fmt;

use crate::algorithm::propagation::conflict::BoundRef;
use crate::algorithm::propagation::context::Context;
use crate::data::problem::history::{BoundChange, ConstraintId, HandlerKind};

pub mod conflict;
pub mod context;
pub mod event;
pub mod linking;
pub mod logicor;
pub mod separation;
pub mod settings;
pub mod system;

/// Outcome of a handler call.
///
/// Ordered from weakest to strongest; results of several calls are combined by taking the
/// strongest.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ResultCode {
    /// The call was not executed.
    DidNotRun,
    /// Nothing was found.
    DidNotFind,
    /// The solution satisfies the constraints.
    Feasible,
    /// The solution violates a constraint, which could not be resolved otherwise.
    Infeasible,
    /// A row was added to cut off the solution.
    Separated,
    /// A domain was reduced.
    ReducedDomain,
    /// A constraint was added.
    ConstraintAdded,
    /// The current node is infeasible.
    Cutoff,
}

impl ResultCode {
    /// Combine two results, the strongest one wins.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        self.max(other)
    }

    /// Whether the current node was found infeasible.
    pub fn is_cutoff(self) -> bool {
        self == ResultCode::Cutoff
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Callbacks of a constraint handler.
///
/// All callbacks have default implementations that do nothing, handlers override what they need.
pub trait ConstraintHandler {
    /// Which handler this is.
    fn kind(&self) -> HandlerKind;

    /// Number of constraints that are not deleted.
    fn nr_constraints(&self) -> usize;

    /// Add the linear relaxation of the constraints to the cut pool.
    fn init_lp(&mut self, _context: &mut Context) -> ResultCode {
        ResultCode::DidNotRun
    }

    /// Add rows that cut off a solution of the LP relaxation.
    fn separate(&mut self, _context: &mut Context, _solution: &[f64]) -> ResultCode {
        ResultCode::DidNotRun
    }

    /// Make sure an integral solution satisfies the constraints, by propagation, separation or by
    /// reporting that branching is needed.
    fn enforce(&mut self, _context: &mut Context, _solution: &[f64]) -> ResultCode {
        ResultCode::Feasible
    }

    /// Whether a solution satisfies all constraints.
    fn check(&self, _context: &Context, _solution: &[f64]) -> bool {
        true
    }

    /// Tighten domains at the current node.
    fn propagate(&mut self, _context: &mut Context) -> ResultCode {
        ResultCode::DidNotRun
    }

    /// Simplify the constraints at the root node.
    ///
    /// # Arguments
    ///
    /// * `is_stopped`: Polled between batch operations, the handler returns early when it answers
    /// `true`. Changes made until then stay valid.
    fn presolve(&mut self, _context: &mut Context, _is_stopped: &dyn Fn() -> bool) -> ResultCode {
        ResultCode::DidNotRun
    }

    /// Explain an inferred bound change.
    ///
    /// # Arguments
    ///
    /// * `constraint`: Constraint that made the inference.
    /// * `info`: Code that the constraint attached to the inference.
    /// * `change`: The change to explain.
    /// * `position`: Its position in the history. Bounds are valued as they were before it.
    ///
    /// # Return value
    ///
    /// The bounds that imply the change together with the constraint.
    fn resolve_propagation(
        &self,
        _context: &Context,
        _constraint: ConstraintId,
        _info: u64,
        _change: &BoundChange,
        _position: usize,
    ) -> Vec<BoundRef> {
        Vec::new()
    }

    /// Re-enable the constraints that were disabled deeper than `depth`.
    fn backtrack(&mut self, _context: &mut Context, _depth: usize) {}

    /// Release all event subscriptions and locks, the handler is about to be dropped.
    fn release_all(&mut self, _context: &mut Context) {}
}
