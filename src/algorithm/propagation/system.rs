//! # Driving the constraint handlers
//!
//! The `ConstraintSystem` owns the shared context and the included handlers. It runs propagation
//! rounds until no handler reduces a domain anymore, turns conflicts into clauses and keeps the
//! handlers in sync with the search tree.
use log::{debug, info, warn};

use crate::algorithm::propagation::{ConstraintHandler, ResultCode};
use crate::algorithm::propagation::conflict::Resolved;
use crate::algorithm::propagation::context::Context;
use crate::algorithm::propagation::linking::LinkingHandler;
use crate::algorithm::propagation::logicor::LogicOrHandler;
use crate::algorithm::propagation::settings::Settings;
use crate::data::problem::{Problem, VariableId};
use crate::data::problem::history::{ConstraintId, HandlerKind};
use crate::data::problem::literal::Literal;
use crate::error::{Error, Result};

/// A problem together with the constraint handlers working on it.
#[derive(Debug)]
pub struct ConstraintSystem {
    context: Context,
    linking: Option<LinkingHandler>,
    logicor: Option<LogicOrHandler>,
    last_resolved: Option<Resolved>,
}

impl ConstraintSystem {
    /// Create a system without any handlers.
    pub fn new(problem: Problem, settings: Settings) -> Self {
        Self {
            context: Context::new(problem, settings),
            linking: None,
            logicor: None,
            last_resolved: None,
        }
    }

    /// Include the linking constraint handler, if it isn't yet.
    pub fn include_linking(&mut self) {
        if self.linking.is_none() {
            debug!("including constraint handler <{}>", HandlerKind::Linking.name());
            self.linking = Some(LinkingHandler::new());
        }
    }

    /// Include the logic-or constraint handler, if it isn't yet.
    pub fn include_logicor(&mut self) {
        if self.logicor.is_none() {
            debug!("including constraint handler <{}>", HandlerKind::LogicOr.name());
            self.logicor = Some(LogicOrHandler::new());
        }
    }

    /// The linking constraint handler.
    ///
    /// # Errors
    ///
    /// If it was not included.
    pub fn linking(&self) -> Result<&LinkingHandler> {
        self.linking.as_ref().ok_or(Error::PluginNotFound(HandlerKind::Linking.name()))
    }

    /// The linking constraint handler, mutably.
    ///
    /// # Errors
    ///
    /// If it was not included.
    pub fn linking_mut(&mut self) -> Result<&mut LinkingHandler> {
        self.linking.as_mut().ok_or(Error::PluginNotFound(HandlerKind::Linking.name()))
    }

    /// The logic-or constraint handler.
    ///
    /// # Errors
    ///
    /// If it was not included.
    pub fn logicor(&self) -> Result<&LogicOrHandler> {
        self.logicor.as_ref().ok_or(Error::PluginNotFound(HandlerKind::LogicOr.name()))
    }

    /// The logic-or constraint handler, mutably.
    ///
    /// # Errors
    ///
    /// If it was not included.
    pub fn logicor_mut(&mut self) -> Result<&mut LogicOrHandler> {
        self.logicor.as_mut().ok_or(Error::PluginNotFound(HandlerKind::LogicOr.name()))
    }

    /// Link an integer variable to binary variables, one per value in its domain.
    ///
    /// The binary variables are only created when they are needed, see `linking_binaries`.
    ///
    /// # Errors
    ///
    /// If the linking handler is not included, or if the variable can't be linked.
    pub fn add_linking(&mut self, intvar: VariableId) -> Result<ConstraintId> {
        let handler = self.linking.as_mut().ok_or(Error::PluginNotFound(HandlerKind::Linking.name()))?;
        handler.add(&mut self.context, intvar)
    }

    /// The binary variables linked to an integer variable, created if necessary.
    ///
    /// # Errors
    ///
    /// If the linking handler is not included or the variable is not linked.
    pub fn linking_binaries(&mut self, intvar: VariableId) -> Result<Vec<VariableId>> {
        let handler = self.linking.as_mut().ok_or(Error::PluginNotFound(HandlerKind::Linking.name()))?;
        let Some(id) = handler.find(intvar) else {
            return Err(if self.context.problem.contains(intvar) {
                Error::NotLinked(self.context.problem.variable(intvar).name().to_string())
            } else {
                Error::UnknownVariable(intvar)
            });
        };

        Ok(handler.binaries(&mut self.context, id).to_vec())
    }

    /// Require at least one of the literals to be one.
    ///
    /// # Errors
    ///
    /// If the logic-or handler is not included, or if the literals are not valid.
    pub fn add_logicor(&mut self, name: impl Into<String>, literals: Vec<Literal>) -> Result<ConstraintId> {
        let handler = self.logicor.as_mut().ok_or(Error::PluginNotFound(HandlerKind::LogicOr.name()))?;
        handler.add(&mut self.context, name, literals)
    }

    /// Call all included handlers, stopping at the first cutoff.
    fn for_each_handler<F>(&mut self, mut call: F) -> ResultCode
    where
        F: FnMut(&mut dyn ConstraintHandler, &mut Context) -> ResultCode,
    {
        let mut result = ResultCode::DidNotRun;
        if let Some(handler) = &mut self.linking {
            result = result.combine(call(handler, &mut self.context));
            if result.is_cutoff() {
                return result;
            }
        }
        if let Some(handler) = &mut self.logicor {
            result = result.combine(call(handler, &mut self.context));
        }

        result
    }

    /// Propagate at the current node until nothing changes anymore.
    ///
    /// Conflicts found on the way are analyzed before returning, such that the bound changes that
    /// led to them are still in the history.
    pub fn propagate(&mut self) -> ResultCode {
        self.context.statistics.nr_propagation_calls += 1;

        let mut result = ResultCode::DidNotRun;
        for _ in 0..self.context.settings.max_propagation_rounds {
            let round = self.for_each_handler(|handler, context| handler.propagate(context));
            result = result.combine(round);
            if round != ResultCode::ReducedDomain {
                break;
            }
        }
        if result.is_cutoff() {
            self.context.statistics.nr_cutoffs += 1;
            debug!("node at depth {} cut off by propagation", self.context.problem.depth());
        }

        result.combine(self.analyze_conflicts())
    }

    /// Simplify the constraints at the root node.
    ///
    /// # Arguments
    ///
    /// * `is_stopped`: Polled between batch operations; presolving returns early once it answers
    /// `true`.
    pub fn presolve(&mut self, is_stopped: impl Fn() -> bool) -> ResultCode {
        assert_eq!(self.context.problem.depth(), 0, "presolving happens at the root");

        let mut result = ResultCode::DidNotRun;
        for round in 0..self.context.settings.max_propagation_rounds {
            // The handlers poll the predicate themselves during the first round.
            if round > 0 && is_stopped() {
                break;
            }
            let current = self.for_each_handler(|handler, context| handler.presolve(context, &is_stopped));
            debug!("presolving round {}: {}", round, current);
            result = result.combine(current);
            if current != ResultCode::ReducedDomain {
                break;
            }
        }
        if result.is_cutoff() {
            self.context.statistics.nr_cutoffs += 1;
            info!("presolving found the problem infeasible");
        }
        // Conflicts at the root only say that the problem is infeasible.
        let _ = self.context.conflict.take_pending();

        result
    }

    /// Whether a solution satisfies all constraints.
    ///
    /// # Arguments
    ///
    /// * `solution`: Values indexed by variable index.
    pub fn check(&self, solution: &[f64]) -> bool {
        let linking = self.linking.as_ref().is_none_or(|handler| handler.check(&self.context, solution));
        let logicor = self.logicor.as_ref().is_none_or(|handler| handler.check(&self.context, solution));

        linking && logicor
    }

    /// Resolve violations of an integral solution by propagation or separation.
    pub fn enforce(&mut self, solution: &[f64]) -> ResultCode {
        let result = self.for_each_handler(|handler, context| handler.enforce(context, solution));
        if result.is_cutoff() {
            self.context.statistics.nr_cutoffs += 1;
        }

        result.combine(self.analyze_conflicts())
    }

    /// Add rows violated by a solution to the cut pool.
    pub fn separate(&mut self, solution: &[f64]) -> ResultCode {
        self.for_each_handler(|handler, context| handler.separate(context, solution))
    }

    /// Add the initial rows to the cut pool.
    pub fn init_lp(&mut self) -> ResultCode {
        self.for_each_handler(|handler, context| handler.init_lp(context))
    }

    /// Open a child node.
    pub fn push_node(&mut self) {
        self.context.problem.push_node();
    }

    /// Return to an ancestor of the current node.
    pub fn backtrack(&mut self, depth: usize) {
        self.context.problem.backtrack(depth);
        let _ = self.context.conflict.take_pending();

        if let Some(handler) = &mut self.linking {
            handler.backtrack(&mut self.context, depth);
        }
        if let Some(handler) = &mut self.logicor {
            handler.backtrack(&mut self.context, depth);
        }
    }

    /// Explain the pending conflicts and add their clauses as logic-or constraints.
    fn analyze_conflicts(&mut self) -> ResultCode {
        let mut result = ResultCode::DidNotRun;
        for conflict in self.context.conflict.take_pending() {
            let resolved = {
                let (context, linking, logicor) = (&self.context, &self.linking, &self.logicor);
                context.conflict.resolve(&context.problem, &conflict, |reason, change, position| {
                    let handler: Option<&dyn ConstraintHandler> = match reason.handler {
                        HandlerKind::Linking => linking.as_ref().map(|handler| handler as &dyn ConstraintHandler),
                        HandlerKind::LogicOr => logicor.as_ref().map(|handler| handler as &dyn ConstraintHandler),
                    };
                    handler
                        .map(|handler| handler.resolve_propagation(context, reason.constraint, reason.info, change, position))
                        .unwrap_or_default()
                })
            };
            result = result.combine(ResultCode::DidNotFind);

            if let (Some(clause), Some(handler)) = (&resolved.clause, &mut self.logicor) {
                if self.context.settings.conflict.add_conflicts && !clause.is_empty() {
                    match handler.add_conflict(&mut self.context, clause.clone()) {
                        Ok(id) => {
                            debug!("conflict clause {} over {} literals added", id, clause.len());
                            result = result.combine(ResultCode::ConstraintAdded);
                        },
                        Err(error) => warn!("conflict clause not added: {}", error),
                    }
                }
            }
            self.last_resolved = Some(resolved);
        }

        result
    }

    /// The outcome of the most recent conflict analysis.
    pub fn last_resolved(&self) -> Option<&Resolved> {
        self.last_resolved.as_ref()
    }

    /// The problem.
    pub fn problem(&self) -> &Problem {
        &self.context.problem
    }

    /// The problem, mutably, for branching decisions and tests.
    pub fn problem_mut(&mut self) -> &mut Problem {
        &mut self.context.problem
    }

    /// The shared context, with statistics, events and the cut pool.
    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl Drop for ConstraintSystem {
    fn drop(&mut self) {
        if let Some(handler) = &mut self.linking {
            handler.release_all(&mut self.context);
        }
        if let Some(handler) = &mut self.logicor {
            handler.release_all(&mut self.context);
        }
    }
}
