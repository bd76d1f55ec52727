//! # Conflict analysis
//!
//! When a constraint detects infeasibility, it collects the bounds that together caused it and
//! hands them to the conflict analysis. The bounds that were inferred at the current depth are
//! then explained by the constraints that inferred them, until only branching decisions and
//! bounds from shallower depths remain. Bounds that hold globally are dropped. If the remaining
//! bounds all fix binary variables, they form a clause that can be added as a new constraint.
use log::{debug, warn};
use rustc_hash::FxHashSet;

use crate::algorithm::propagation::settings::ConflictSettings;
use crate::data::problem::{Problem, VariableId};
use crate::data::problem::elements::{BoundDirection, VariableType};
use crate::data::problem::history::{BoundChange, Cause, ConstraintId, HandlerKind, Reason};
use crate::data::problem::literal::Literal;

/// The current lower or upper bound of a variable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BoundRef {
    /// The variable.
    pub variable: VariableId,
    /// Which of its bounds.
    pub direction: BoundDirection,
}

impl BoundRef {
    /// The lower bound of a variable.
    pub fn lower(variable: VariableId) -> Self {
        Self { variable, direction: BoundDirection::Lower, }
    }

    /// The upper bound of a variable.
    pub fn upper(variable: VariableId) -> Self {
        Self { variable, direction: BoundDirection::Upper, }
    }

    /// The bound that makes a literal false.
    pub fn falsifying(literal: Literal) -> Self {
        Self { variable: literal.variable(), direction: literal.falsifying_bound(), }
    }
}

/// An infeasibility reported by a constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// Handler of the constraint that detected the infeasibility.
    pub handler: HandlerKind,
    /// The constraint.
    pub constraint: ConstraintId,
    /// Bounds that together are infeasible with the constraint, sorted.
    pub bounds: Vec<BoundRef>,
    /// Depth at which the infeasibility was detected.
    pub depth: usize,
    /// Length of the bound change history at that time.
    history_len: usize,
}

/// A bound with the value it had when it contributed to a conflict.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConflictBound {
    /// Which bound.
    pub bound: BoundRef,
    /// Its value.
    pub value: f64,
}

/// Outcome of analyzing a conflict.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    /// Decisions and bounds of shallower depths that explain the conflict.
    ///
    /// Empty if the conflict holds globally.
    pub bounds: Vec<ConflictBound>,
    /// The clause that excludes the conflicting bounds, if all of them fix binary variables.
    pub clause: Option<Vec<Literal>>,
}

/// Collects conflicts until they can be analyzed.
#[derive(Clone, Debug)]
pub struct ConflictAnalysis {
    settings: ConflictSettings,
    candidate: Vec<BoundRef>,
    collecting: bool,
    pending: Vec<Conflict>,
    last: Option<Conflict>,
    nr_conflicts: usize,
}

impl ConflictAnalysis {
    /// Create an analysis without any conflicts.
    pub fn new(settings: ConflictSettings) -> Self {
        Self {
            settings,
            candidate: Vec::new(),
            collecting: false,
            pending: Vec::new(),
            last: None,
            nr_conflicts: 0,
        }
    }

    /// Start collecting the bounds of a new conflict.
    pub fn init(&mut self) {
        self.candidate.clear();
        self.collecting = true;
    }

    /// Add a bound to the conflict being collected.
    pub fn add_bound(&mut self, bound: BoundRef) {
        debug_assert!(self.collecting);

        self.candidate.push(bound);
    }

    /// Finish collecting; the conflict was detected by a constraint.
    ///
    /// # Return value
    ///
    /// Whether the conflict was recorded for analysis.
    pub fn analyze(&mut self, problem: &Problem, handler: HandlerKind, constraint: ConstraintId) -> bool {
        debug_assert!(self.collecting);
        self.collecting = false;

        let mut bounds = std::mem::take(&mut self.candidate);
        bounds.sort_unstable();
        bounds.dedup();

        let conflict = Conflict {
            handler,
            constraint,
            bounds,
            depth: problem.depth(),
            history_len: problem.history().len(),
        };
        debug!("conflict of {} {} over {} bounds", handler.name(), constraint, conflict.bounds.len());
        self.nr_conflicts += 1;
        self.last = Some(conflict.clone());

        if self.settings.enabled {
            self.pending.push(conflict);
            true
        } else {
            false
        }
    }

    /// Take the conflicts that still have to be analyzed.
    pub fn take_pending(&mut self) -> Vec<Conflict> {
        std::mem::take(&mut self.pending)
    }

    /// The conflict that was reported most recently.
    pub fn last_conflict(&self) -> Option<&Conflict> {
        self.last.as_ref()
    }

    /// Number of conflicts reported.
    pub fn nr_conflicts(&self) -> usize {
        self.nr_conflicts
    }

    /// The settings.
    pub fn settings(&self) -> &ConflictSettings {
        &self.settings
    }

    /// Explain a conflict in terms of decisions and bounds from shallower depths.
    ///
    /// # Arguments
    ///
    /// * `problem`: Its history should still contain the changes that led to the conflict.
    /// * `conflict`: What to analyze.
    /// * `explain`: Given the reason of an inferred bound change, the change and its position in
    /// the history, the bounds that justify the inference.
    pub fn resolve<E>(&self, problem: &Problem, conflict: &Conflict, mut explain: E) -> Resolved
    where
        E: FnMut(Reason, &BoundChange, usize) -> Vec<BoundRef>,
    {
        let history = problem.history();
        let mut queue = conflict.bounds.iter().map(|&bound| (bound, conflict.history_len)).collect::<Vec<_>>();
        let mut visited = FxHashSet::default();
        let mut bounds = Vec::new();
        let mut steps = 0;

        while let Some((bound, before)) = queue.pop() {
            let Some(position) = problem.change_before(bound.variable, bound.direction, before) else {
                // Never changed, so it is the original, global bound.
                continue;
            };
            if !visited.insert(position) {
                continue;
            }

            let change = &history[position];
            if change.depth == 0 {
                continue;
            }

            match change.cause {
                Cause::Inference(reason) if change.depth == conflict.depth && steps < self.settings.max_resolution_steps => {
                    steps += 1;
                    queue.extend(explain(reason, change, position).into_iter().map(|b| (b, position)));
                },
                _ => bounds.push(ConflictBound { bound, value: change.new, }),
            }
        }
        if steps >= self.settings.max_resolution_steps {
            warn!("conflict of {} reached the resolution limit", conflict.constraint);
        }
        bounds.sort_unstable_by_key(|b| b.bound);

        let clause = Self::clause(problem, &bounds);
        Resolved { bounds, clause, }
    }

    /// The clause excluding a set of binary fixings.
    fn clause(problem: &Problem, bounds: &[ConflictBound]) -> Option<Vec<Literal>> {
        bounds.iter()
            .map(|&ConflictBound { bound, value }| {
                if problem.variable(bound.variable).variable_type() != VariableType::Binary {
                    return None;
                }
                match bound.direction {
                    BoundDirection::Upper if value < 0.5 => Some(Literal::positive(bound.variable)),
                    BoundDirection::Lower if value > 0.5 => Some(Literal::negative(bound.variable)),
                    _ => None,
                }
            })
            .collect()
    }
}
