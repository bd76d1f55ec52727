//! # Shared state of the constraint handlers
use log::debug;

use crate::algorithm::propagation::conflict::{BoundRef, ConflictAnalysis};
use crate::algorithm::propagation::event::{Delivery, EventRegistry};
use crate::algorithm::propagation::separation::CutPool;
use crate::algorithm::propagation::settings::Settings;
use crate::data::problem::{Problem, VariableId};
use crate::data::problem::elements::{BoundDirection, Tightening};
use crate::data::problem::history::{Cause, ConstraintId, HandlerKind, Reason};

/// Counters over the lifetime of a constraint system.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Statistics {
    /// Calls of the propagation round loop.
    pub nr_propagation_calls: usize,
    /// Bound changes made by propagation and presolving.
    pub nr_domain_reductions: usize,
    /// Nodes cut off by propagation or enforcement.
    pub nr_cutoffs: usize,
    /// Rows added to the cut pool.
    pub nr_cuts: usize,
    /// Constraints created from conflicts.
    pub nr_conflict_constraints: usize,
    /// Constraints deleted.
    pub nr_deleted: usize,
    /// Variables aggregated by presolving.
    pub nr_aggregations: usize,
}

/// Everything a constraint handler works on, apart from its own constraints.
#[derive(Debug)]
pub struct Context {
    /// Variables and their domains.
    pub problem: Problem,
    /// Bound change subscriptions.
    pub events: EventRegistry,
    /// Conflict collection.
    pub conflict: ConflictAnalysis,
    /// Rows of the LP relaxation.
    pub cuts: CutPool,
    /// Tunables.
    pub settings: Settings,
    /// Counters.
    pub statistics: Statistics,
}

impl Context {
    /// Create a context around a problem.
    pub fn new(problem: Problem, settings: Settings) -> Self {
        Self {
            problem,
            events: EventRegistry::new(),
            conflict: ConflictAnalysis::new(settings.conflict.clone()),
            cuts: CutPool::new(settings.feasibility_tolerance),
            settings,
            statistics: Statistics::default(),
        }
    }

    /// Dispatch all bound changes made so far to the current subscribers.
    ///
    /// Has to happen before new subscriptions are made, such that old changes are not delivered
    /// to them.
    pub fn flush_events(&mut self) {
        let events = self.problem.drain_events();
        self.events.dispatch(events);
    }

    /// Dispatch all bound changes made so far and take the deliveries of a handler.
    pub fn deliveries(&mut self, handler: HandlerKind) -> Vec<Delivery> {
        self.flush_events();
        self.events.take(handler)
    }

    /// Change a bound with a justification, counting it if it changed anything.
    pub fn infer_bound(
        &mut self,
        variable: VariableId,
        direction: BoundDirection,
        value: f64,
        reason: Reason,
    ) -> Tightening {
        let result = self.problem.change_bound(variable, direction, value, Cause::Inference(reason));
        if result == Tightening::Tightened {
            self.statistics.nr_domain_reductions += 1;
        }
        result
    }

    /// Fix a variable with a justification, counting it if it changed anything.
    pub fn infer_fix(&mut self, variable: VariableId, value: f64, reason: Reason) -> Tightening {
        let result = self.problem.infer_fix(variable, value, reason);
        if result == Tightening::Tightened {
            self.statistics.nr_domain_reductions += 1;
        }
        result
    }

    /// Hand an infeasibility to conflict analysis.
    ///
    /// # Arguments
    ///
    /// * `handler`: Handler of the constraint that detected the infeasibility.
    /// * `constraint`: The constraint.
    /// * `bounds`: Current bounds that are infeasible together with the constraint.
    ///
    /// # Return value
    ///
    /// Whether the conflict was recorded for analysis.
    pub fn report_conflict(
        &mut self,
        handler: HandlerKind,
        constraint: ConstraintId,
        bounds: impl IntoIterator<Item = BoundRef>,
    ) -> bool {
        self.conflict.init();
        for bound in bounds {
            self.conflict.add_bound(bound);
        }
        debug!("{} {} is infeasible at depth {}", handler.name(), constraint, self.problem.depth());

        self.conflict.analyze(&self.problem, handler, constraint)
    }
}
