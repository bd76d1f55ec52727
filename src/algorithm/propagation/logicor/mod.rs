//! # Logic-or constraints
//!
//! Clauses `l_1 + ... + l_n >= 1` over binary literals, propagated with two watched literals: as
//! long as two literals are not fixed, the constraint can neither propagate nor be violated, so
//! only bound changes of the two watched variables wake it up.
use std::fmt;

use fifo_set::FIFOSet;
use log::{debug, trace};

use crate::algorithm::propagation::{ConstraintHandler, ResultCode};
use crate::algorithm::propagation::conflict::BoundRef;
use crate::algorithm::propagation::context::Context;
use crate::algorithm::propagation::event::{EventMask, Subscription};
use crate::algorithm::propagation::separation::Row;
use crate::data::problem::elements::{Tightening, VariableType};
use crate::data::problem::history::{BoundChange, ConstraintId, EventKind, HandlerKind, Reason};
use crate::data::problem::literal::Literal;
use crate::error::{Error, Result};

mod presolve;

/// At least one of the literals is one.
#[derive(Debug)]
pub struct LogicOrConstraint {
    name: String,
    literals: Vec<Literal>,
    /// Positions of the watched literals.
    watched: [Option<usize>; 2],
    /// Event subscriptions of the watched literals, slot by slot.
    watches: [Option<Subscription>; 2],
    enabled: bool,
    disabled_at: Option<usize>,
    deleted: bool,
    modifiable: bool,
    /// A watched variable changed since the last propagation.
    needs_propagation: bool,
    add_cut: bool,
    row_added: bool,
    /// Literals are sorted and free of duplicates.
    sorted: bool,
    /// Changed since the last pairwise comparison.
    changed: bool,
    /// Bit `code % 64` is set for every literal.
    signature: u64,
}

impl LogicOrConstraint {
    /// Name of the constraint.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The literals.
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Positions of the watched literals; if only one is set, it is the first.
    pub fn watched(&self) -> [Option<usize>; 2] {
        self.watched
    }

    /// Whether the constraint takes part in propagation.
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.deleted
    }

    /// Whether the constraint was removed from the problem.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Whether literals may still be added.
    pub fn is_modifiable(&self) -> bool {
        self.modifiable
    }

    fn is_active(&self) -> bool {
        self.enabled && !self.deleted
    }

    fn compute_signature(&mut self) {
        self.signature = self.literals.iter().fold(0, |signature, literal| signature | 1 << (literal.code() % 64));
    }
}

/// Events of a variable that matter for a watched literal: the literal becoming false, and the
/// literal no longer being true after backtracking.
fn watch_mask(literal: Literal) -> EventMask {
    if literal.is_negated() {
        EventMask::of(&[EventKind::LowerTightened, EventKind::UpperRelaxed])
    } else {
        EventMask::of(&[EventKind::UpperTightened, EventKind::LowerRelaxed])
    }
}

/// Owns all logic-or constraints.
pub struct LogicOrHandler {
    constraints: Vec<LogicOrConstraint>,
    /// Constraints waiting for propagation.
    queue: FIFOSet<ConstraintId>,
}

impl Default for LogicOrHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogicOrHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogicOrHandler")
            .field("constraints", &self.constraints)
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl LogicOrHandler {
    /// Create a handler without constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            queue: FIFOSet::new(),
        }
    }

    /// Create a logic-or constraint.
    ///
    /// Literals are replaced by their representatives.
    ///
    /// # Errors
    ///
    /// If there are no literals, or if a literal is not over a binary variable of the problem.
    pub fn add(
        &mut self,
        context: &mut Context,
        name: impl Into<String>,
        literals: Vec<Literal>,
    ) -> Result<ConstraintId> {
        let name = name.into();
        if literals.is_empty() {
            return Err(Error::EmptyConstraint(name));
        }
        for literal in &literals {
            let variable = literal.variable();
            if !context.problem.contains(variable) {
                return Err(Error::UnknownVariable(variable));
            }
            if context.problem.variable(variable).variable_type() != VariableType::Binary {
                return Err(Error::NotBinary(context.problem.variable(variable).name().to_string()));
            }
        }

        let literals = literals.into_iter().map(|literal| context.problem.representative(literal)).collect::<Vec<_>>();
        for &literal in &literals {
            Self::lock(context, literal, 1);
        }

        let id = ConstraintId(self.constraints.len());
        let mut constraint = LogicOrConstraint {
            name,
            literals,
            watched: [None, None],
            watches: [None, None],
            enabled: true,
            disabled_at: None,
            deleted: false,
            modifiable: false,
            needs_propagation: true,
            add_cut: false,
            row_added: false,
            sorted: false,
            changed: true,
            signature: 0,
        };
        constraint.compute_signature();
        debug!("logic-or constraint {} <{}> created with {} literals", id, constraint.name, constraint.literals.len());
        self.constraints.push(constraint);
        self.queue.push(id);

        Ok(id)
    }

    /// Add a clause found by conflict analysis.
    pub fn add_conflict(&mut self, context: &mut Context, literals: Vec<Literal>) -> Result<ConstraintId> {
        let name = format!("conflict_{}", context.statistics.nr_conflict_constraints);
        let id = self.add(context, name, literals)?;
        context.statistics.nr_conflict_constraints += 1;

        Ok(id)
    }

    /// Access a constraint.
    pub fn constraint(&self, id: ConstraintId) -> &LogicOrConstraint {
        &self.constraints[id.0]
    }

    /// All constraints, including deleted ones.
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &LogicOrConstraint)> {
        self.constraints.iter().enumerate().map(|(i, constraint)| (ConstraintId(i), constraint))
    }

    /// Allow or forbid adding literals later.
    pub fn set_modifiable(&mut self, id: ConstraintId, modifiable: bool) {
        self.constraints[id.0].modifiable = modifiable;
    }

    /// Rounding a variable towards the false value of a literal may violate the constraint.
    fn lock(context: &mut Context, literal: Literal, delta: i32) {
        if literal.is_negated() {
            context.problem.add_locks(literal.variable(), 0, delta);
        } else {
            context.problem.add_locks(literal.variable(), delta, 0);
        }
    }

    fn reason(id: ConstraintId) -> Reason {
        Reason { handler: HandlerKind::LogicOr, constraint: id, info: 0 }
    }

    fn is_active(&self, id: ConstraintId) -> bool {
        self.constraints[id.0].is_active()
    }

    fn enqueue(&mut self, id: ConstraintId) {
        self.constraints[id.0].needs_propagation = true;
        self.queue.push(id);
    }

    /// Wake up the constraints whose watched variables changed.
    fn process_events(&mut self, context: &mut Context) {
        for delivery in context.deliveries(HandlerKind::LogicOr) {
            trace!("logic-or constraint {} woken up by {:?} of {}", delivery.constraint, delivery.event.kind, delivery.event.variable);
            self.enqueue(delivery.constraint);
        }
    }

    /// Watch the literals at the given positions, keeping watches that stay in place.
    fn watch(&mut self, context: &mut Context, id: ConstraintId, positions: [usize; 2]) {
        debug_assert_ne!(positions[0], positions[1]);

        // Changes made before the new subscriptions must not reach them.
        context.flush_events();

        let constraint = &mut self.constraints[id.0];
        let mut new = [None, None];
        for slot in 0..2 {
            if constraint.watched[slot].is_some_and(|position| positions.contains(&position)) {
                new[slot] = constraint.watched[slot];
            }
        }
        let remaining = positions.into_iter().filter(|&position| !new.contains(&Some(position))).collect::<Vec<_>>();
        let mut remaining = remaining.into_iter();
        for slot in &mut new {
            if slot.is_none() {
                *slot = remaining.next();
            }
        }

        for slot in 0..2 {
            if new[slot] == constraint.watched[slot] {
                continue;
            }
            if let Some(subscription) = constraint.watches[slot].take() {
                context.events.release(subscription);
            }
            if let Some(position) = new[slot] {
                let literal = constraint.literals[position];
                constraint.watches[slot] = Some(context.events.catch(literal.variable(), watch_mask(literal), HandlerKind::LogicOr, id));
            }
            constraint.watched[slot] = new[slot];
        }
        debug_assert!(constraint.watched[0].is_some() && constraint.watched[0] != constraint.watched[1]);
    }

    /// Stop watching any literal.
    fn clear_watches(&mut self, context: &mut Context, id: ConstraintId) {
        let constraint = &mut self.constraints[id.0];
        for slot in 0..2 {
            if let Some(subscription) = constraint.watches[slot].take() {
                context.events.release(subscription);
            }
            constraint.watched[slot] = None;
        }
    }

    /// Remove the literal at a position by moving the last literal into its place.
    fn delete_position(&mut self, context: &mut Context, id: ConstraintId, position: usize) {
        let constraint = &mut self.constraints[id.0];
        let literal = constraint.literals[position];
        for slot in 0..2 {
            if constraint.watched[slot] == Some(position) {
                if let Some(subscription) = constraint.watches[slot].take() {
                    context.events.release(subscription);
                }
                constraint.watched[slot] = None;
            }
        }

        let last = constraint.literals.len() - 1;
        constraint.literals.swap_remove(position);
        for slot in 0..2 {
            if constraint.watched[slot] == Some(last) {
                constraint.watched[slot] = Some(position);
            }
        }
        if constraint.watched[0].is_none() {
            constraint.watched.swap(0, 1);
            constraint.watches.swap(0, 1);
        }

        constraint.sorted = false;
        constraint.changed = true;
        constraint.compute_signature();
        Self::lock(context, literal, -1);
        self.enqueue(id);
        trace!("literal {} removed from logic-or constraint {}", literal, id);
    }

    /// Disable a constraint for the current subtree, or delete it at the root.
    fn disable(&mut self, context: &mut Context, id: ConstraintId) {
        let depth = context.problem.depth();
        if depth == 0 {
            self.delete(context, id);
            return;
        }

        let constraint = &mut self.constraints[id.0];
        if constraint.enabled {
            constraint.enabled = false;
            constraint.disabled_at = Some(depth);
            trace!("logic-or constraint {} disabled at depth {}", id, depth);
        }
    }

    /// Remove a constraint from the problem, releasing its events and locks.
    fn delete(&mut self, context: &mut Context, id: ConstraintId) {
        if self.constraints[id.0].deleted {
            return;
        }

        self.clear_watches(context, id);
        let constraint = &mut self.constraints[id.0];
        for &literal in &constraint.literals {
            Self::lock(context, literal, -1);
        }
        constraint.deleted = true;
        constraint.enabled = false;
        constraint.disabled_at = None;
        context.statistics.nr_deleted += 1;
        debug!("logic-or constraint {} <{}> deleted", id, constraint.name);
    }

    /// Bring the watched literals up to date and propagate.
    ///
    /// If a literal is one, the constraint is satisfied. Otherwise, the two free literals with the
    /// fewest branchings that would falsify them become the watched literals. Without free
    /// literals the constraint is violated, with one free literal, that literal has to be one.
    fn process_watched(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        let constraint = &self.constraints[id.0];
        let problem = &context.problem;
        if constraint.watched.iter().flatten().any(|&position| problem.is_true(constraint.literals[position])) {
            self.disable(context, id);
            return ResultCode::DidNotFind;
        }

        // Sort keys (branchings, not yet watched, position) of the best two free literals.
        let mut best: [Option<(u32, bool, usize)>; 2] = [None, None];
        let mut nr_free = 0;
        let mut satisfied = false;
        for (position, &literal) in constraint.literals.iter().enumerate() {
            if problem.is_true(literal) {
                satisfied = true;
                break;
            }
            if problem.is_false(literal) {
                continue;
            }

            nr_free += 1;
            let branchings = problem.variable(literal.variable()).branchings(literal.falsifying_bound());
            let key = (branchings, !constraint.watched.contains(&Some(position)), position);
            if best[0].is_none_or(|current| key < current) {
                best[1] = best[0];
                best[0] = Some(key);
            } else if best[1].is_none_or(|current| key < current) {
                best[1] = Some(key);
            }
        }
        if satisfied {
            self.disable(context, id);
            return ResultCode::DidNotFind;
        }

        match best {
            [None, _] => {
                if constraint.modifiable {
                    self.constraints[id.0].add_cut = true;
                    return ResultCode::DidNotFind;
                }
                let bounds = constraint.literals.iter().map(|&literal| BoundRef::falsifying(literal)).collect::<Vec<_>>();
                context.report_conflict(HandlerKind::LogicOr, id, bounds);
                ResultCode::Cutoff
            },
            [Some((_, _, position)), None] => {
                debug_assert_eq!(nr_free, 1);
                let literal = constraint.literals[position];
                let value = if literal.is_negated() { 0f64 } else { 1f64 };
                match context.infer_fix(literal.variable(), value, Self::reason(id)) {
                    Tightening::Infeasible => {
                        let bounds = constraint.literals.iter().map(|&literal| BoundRef::falsifying(literal)).collect::<Vec<_>>();
                        context.report_conflict(HandlerKind::LogicOr, id, bounds);
                        return ResultCode::Cutoff;
                    },
                    Tightening::Tightened | Tightening::Unchanged => {},
                }
                debug!("logic-or constraint {} fixed {} to one", id, literal);
                self.disable(context, id);
                ResultCode::ReducedDomain
            },
            [Some((_, _, first)), Some((_, _, second))] => {
                self.watch(context, id, [first, second]);
                self.constraints[id.0].needs_propagation = false;
                ResultCode::DidNotFind
            },
        }
    }

    /// Whether a solution satisfies a constraint.
    fn check_constraint(&self, context: &Context, id: ConstraintId, solution: &[f64]) -> bool {
        let sum = self.constraints[id.0].literals.iter()
            .map(|&literal| context.problem.literal_value(literal, solution))
            .sum::<f64>();

        sum >= 1f64 - context.settings.feasibility_tolerance
    }

    /// The linear relaxation `sum_{positive} x - sum_{negated} x >= 1 - #negated`.
    fn row(&self, id: ConstraintId) -> Row {
        let constraint = &self.constraints[id.0];
        let nr_negated = constraint.literals.iter().filter(|literal| literal.is_negated()).count();
        let coefficients = constraint.literals.iter()
            .map(|&literal| (literal.variable(), if literal.is_negated() { -1f64 } else { 1f64 }))
            .collect();

        Row::new(constraint.name.clone(), 1f64 - nr_negated as f64, f64::INFINITY, coefficients)
    }

    /// Add the row of a constraint to the cut pool, if it isn't there yet.
    fn add_row(&mut self, context: &mut Context, id: ConstraintId, solution: Option<&[f64]>) -> bool {
        if self.constraints[id.0].row_added {
            return false;
        }

        let row = self.row(id);
        if !context.cuts.add_cut(row, solution, &context.problem) {
            return false;
        }

        context.statistics.nr_cuts += 1;
        let constraint = &mut self.constraints[id.0];
        constraint.row_added = true;
        constraint.add_cut = false;
        true
    }
}

impl ConstraintHandler for LogicOrHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::LogicOr
    }

    fn nr_constraints(&self) -> usize {
        self.constraints.iter().filter(|constraint| !constraint.deleted).count()
    }

    fn init_lp(&mut self, context: &mut Context) -> ResultCode {
        let mut result = ResultCode::DidNotFind;
        for index in 0..self.constraints.len() {
            let id = ConstraintId(index);
            if self.is_active(id) && self.add_row(context, id, None) {
                result = ResultCode::Separated;
            }
        }

        result
    }

    fn separate(&mut self, context: &mut Context, solution: &[f64]) -> ResultCode {
        let mut result = ResultCode::DidNotFind;
        for index in 0..self.constraints.len() {
            let id = ConstraintId(index);
            if !self.is_active(id) {
                continue;
            }
            let solution = if self.constraints[id.0].add_cut { None } else { Some(solution) };
            if self.add_row(context, id, solution) {
                result = ResultCode::Separated;
            }
        }

        result
    }

    fn enforce(&mut self, context: &mut Context, solution: &[f64]) -> ResultCode {
        self.process_events(context);

        let mut result = ResultCode::Feasible;
        for index in 0..self.constraints.len() {
            let id = ConstraintId(index);
            if self.constraints[id.0].deleted || self.check_constraint(context, id, solution) {
                continue;
            }

            if self.is_active(id) {
                let propagated = self.process_watched(context, id);
                if propagated.is_cutoff() {
                    return ResultCode::Cutoff;
                }
                if propagated == ResultCode::ReducedDomain {
                    result = result.combine(propagated);
                    continue;
                }
            }
            if self.add_row(context, id, Some(solution)) {
                result = result.combine(ResultCode::Separated);
                continue;
            }

            result = result.combine(ResultCode::Infeasible);
        }

        result
    }

    fn check(&self, context: &Context, solution: &[f64]) -> bool {
        (0..self.constraints.len())
            .map(ConstraintId)
            .filter(|&id| !self.constraints[id.0].deleted)
            .all(|id| self.check_constraint(context, id, solution))
    }

    fn propagate(&mut self, context: &mut Context) -> ResultCode {
        self.process_events(context);

        let mut result = ResultCode::DidNotRun;
        while let Some(id) = self.queue.pop() {
            let constraint = &self.constraints[id.0];
            if !constraint.is_active() || !constraint.needs_propagation {
                continue;
            }

            result = result.combine(ResultCode::DidNotFind).combine(self.process_watched(context, id));
            if result.is_cutoff() {
                break;
            }
            self.process_events(context);
        }

        result
    }

    fn presolve(&mut self, context: &mut Context, is_stopped: &dyn Fn() -> bool) -> ResultCode {
        self.presolve_constraints(context, is_stopped)
    }

    fn resolve_propagation(
        &self,
        _context: &Context,
        constraint: ConstraintId,
        _info: u64,
        change: &BoundChange,
        _position: usize,
    ) -> Vec<BoundRef> {
        self.constraints[constraint.0].literals.iter()
            .filter(|literal| literal.variable() != change.variable)
            .map(|&literal| BoundRef::falsifying(literal))
            .collect()
    }

    fn backtrack(&mut self, _context: &mut Context, depth: usize) {
        for index in 0..self.constraints.len() {
            let constraint = &mut self.constraints[index];
            if !constraint.deleted && constraint.disabled_at.is_some_and(|at| at > depth) {
                constraint.enabled = true;
                constraint.disabled_at = None;
                self.enqueue(ConstraintId(index));
            }
        }
    }

    fn release_all(&mut self, context: &mut Context) {
        for index in 0..self.constraints.len() {
            self.clear_watches(context, ConstraintId(index));
        }
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::propagation::{ConstraintHandler, ResultCode};
    use crate::algorithm::propagation::conflict::BoundRef;
    use crate::algorithm::propagation::context::Context;
    use crate::algorithm::propagation::logicor::LogicOrHandler;
    use crate::algorithm::propagation::settings::Settings;
    use crate::algorithm::propagation::system::ConstraintSystem;
    use crate::data::problem::{Problem, VariableId};
    use crate::data::problem::elements::{BoundDirection, VariableType};
    use crate::data::problem::literal::Literal;
    use crate::error::Error;

    fn system(n: usize) -> (ConstraintSystem, Vec<VariableId>) {
        let mut problem = Problem::new();
        let variables = (0..n).map(|i| problem.add_binary(format!("x{}", i))).collect();
        let mut system = ConstraintSystem::new(problem, Settings::default());
        system.include_logicor();
        (system, variables)
    }

    #[test]
    fn unit_propagation() {
        let (mut system, x) = system(3);
        let id = system.add_logicor("c", x.iter().map(|&v| Literal::positive(v)).collect()).unwrap();
        assert_eq!(system.propagate(), ResultCode::DidNotFind);

        system.push_node();
        let _ = system.problem_mut().tighten_upper(x[0], 0f64);
        let _ = system.problem_mut().tighten_upper(x[2], 0f64);
        assert_eq!(system.propagate(), ResultCode::ReducedDomain);
        assert!(system.problem().is_fixed_to_one(x[1]));
        assert!(!system.logicor().unwrap().constraint(id).is_enabled());
        assert_eq!(system.context().conflict.nr_conflicts(), 0);

        system.backtrack(0);
        assert!(system.logicor().unwrap().constraint(id).is_enabled());
        assert_eq!(system.propagate(), ResultCode::DidNotFind);
    }

    #[test]
    fn infeasible() {
        let (mut system, x) = system(3);
        let literals = vec![Literal::positive(x[0]), Literal::negative(x[1]), Literal::positive(x[2])];
        system.add_logicor("c", literals.clone()).unwrap();
        assert_eq!(system.propagate(), ResultCode::DidNotFind);

        system.push_node();
        let _ = system.problem_mut().tighten_upper(x[0], 0f64);
        let _ = system.problem_mut().tighten_lower(x[1], 1f64);
        let _ = system.problem_mut().tighten_upper(x[2], 0f64);
        assert_eq!(system.propagate(), ResultCode::Cutoff);
        let conflict = system.context().conflict.last_conflict().unwrap();
        assert_eq!(conflict.bounds, literals.into_iter().map(BoundRef::falsifying).collect::<Vec<_>>());
    }

    #[test]
    fn watches_move() {
        let (mut system, x) = system(4);
        let id = system.add_logicor("c", x.iter().map(|&v| Literal::positive(v)).collect()).unwrap();
        assert_eq!(system.propagate(), ResultCode::DidNotFind);
        assert_eq!(system.logicor().unwrap().constraint(id).watched(), [Some(0), Some(1)]);
        assert_eq!(system.context().events.nr_subscriptions(), 2);

        system.push_node();
        let _ = system.problem_mut().tighten_upper(x[0], 0f64);
        assert_eq!(system.propagate(), ResultCode::DidNotFind);
        let watched = system.logicor().unwrap().constraint(id).watched();
        assert!(watched.contains(&Some(1)));
        assert!(!watched.contains(&Some(0)));
        assert_eq!(system.context().events.nr_subscriptions_of(x[0]), 0);

        // Unwatched variables don't wake the constraint up.
        let _ = system.problem_mut().tighten_upper(x[3], 0f64);
        assert_eq!(system.propagate(), ResultCode::DidNotRun);
    }

    #[test]
    fn fewest_branchings() {
        let (mut system, x) = system(3);
        system.push_node();
        let _ = system.problem_mut().tighten_upper(x[0], 0f64);
        system.backtrack(0);
        assert_eq!(system.problem().variable(x[0]).branchings(BoundDirection::Upper), 1);

        let id = system.add_logicor("c", x.iter().map(|&v| Literal::positive(v)).collect()).unwrap();
        assert_eq!(system.propagate(), ResultCode::DidNotFind);
        assert_eq!(system.logicor().unwrap().constraint(id).watched(), [Some(1), Some(2)]);
    }

    #[test]
    fn satisfied() {
        let (mut system, x) = system(3);
        let id = system.add_logicor("c", vec![Literal::negative(x[0]), Literal::positive(x[1]), Literal::positive(x[2])]).unwrap();
        assert_eq!(system.propagate(), ResultCode::DidNotFind);
        assert_eq!(system.logicor().unwrap().constraint(id).watched(), [Some(0), Some(1)]);

        system.push_node();
        // A watched literal becoming true doesn't wake the constraint up.
        let _ = system.problem_mut().tighten_upper(x[0], 0f64);
        assert_eq!(system.propagate(), ResultCode::DidNotRun);
        let _ = system.problem_mut().tighten_upper(x[1], 0f64);
        assert_eq!(system.propagate(), ResultCode::DidNotFind);
        assert!(!system.logicor().unwrap().constraint(id).is_enabled());
        system.backtrack(0);
        assert!(system.logicor().unwrap().constraint(id).is_enabled());

        // At the root, satisfied constraints are deleted.
        let _ = system.problem_mut().tighten_lower(x[2], 1f64);
        let _ = system.problem_mut().tighten_upper(x[1], 0f64);
        assert_eq!(system.propagate(), ResultCode::DidNotFind);
        assert!(system.logicor().unwrap().constraint(id).is_deleted());
        assert_eq!(system.problem().variable(x[2]).locks(BoundDirection::Lower), 0);
        assert_eq!(system.context().events.nr_subscriptions(), 0);
    }

    #[test]
    fn swap_remove_keeps_watches() {
        let mut problem = Problem::new();
        let x = (0..4).map(|i| problem.add_binary(format!("x{}", i))).collect::<Vec<_>>();
        let mut context = Context::new(problem, Settings::default());
        let mut handler = LogicOrHandler::new();
        let id = handler.add(&mut context, "c", x.iter().map(|&v| Literal::positive(v)).collect()).unwrap();

        handler.watch(&mut context, id, [0, 3]);
        handler.delete_position(&mut context, id, 1);
        let constraint = handler.constraint(id);
        assert_eq!(constraint.literals(), &[Literal::positive(x[0]), Literal::positive(x[3]), Literal::positive(x[2])]);
        assert_eq!(constraint.watched(), [Some(0), Some(1)]);
        assert_eq!(context.events.nr_subscriptions_of(x[3]), 1);

        handler.delete_position(&mut context, id, 0);
        let constraint = handler.constraint(id);
        assert_eq!(constraint.literals(), &[Literal::positive(x[2]), Literal::positive(x[3])]);
        assert_eq!(constraint.watched(), [Some(1), None]);
        assert_eq!(context.events.nr_subscriptions(), 1);

        handler.release_all(&mut context);
    }

    #[test]
    fn check_and_row() {
        let (mut system, x) = system(2);
        system.add_logicor("c", vec![Literal::positive(x[0]), Literal::negative(x[1])]).unwrap();
        assert!(system.check(&[0f64, 0f64]));
        assert!(!system.check(&[0f64, 1f64]));
        assert!(system.check(&[0.5f64, 0.5f64]));

        assert_eq!(system.separate(&[0.5f64, 0.5f64]), ResultCode::DidNotFind);
        assert_eq!(system.separate(&[0.2f64, 0.9f64]), ResultCode::Separated);
        assert_eq!(system.context().cuts.rows()[0].to_string(), "c: 0 <= +1 x0 -1 x1 <= inf");
    }

    #[test]
    fn creation() {
        let mut problem = Problem::new();
        let x = problem.add_binary("x");
        let y = problem.add_binary("y");
        let z = problem.add_variable("z", VariableType::Integer, 0f64, 3f64);
        let _ = problem.aggregate(y, x, -1f64, 1f64);
        let mut system = ConstraintSystem::new(problem, Settings::default());
        assert_eq!(system.add_logicor("c", vec![Literal::positive(x)]), Err(Error::PluginNotFound("logicor")));

        system.include_logicor();
        assert_eq!(system.add_logicor("c", Vec::new()), Err(Error::EmptyConstraint("c".to_string())));
        assert_eq!(system.add_logicor("c", vec![Literal::positive(z)]), Err(Error::NotBinary("z".to_string())));
        let id = system.add_logicor("c", vec![Literal::positive(y)]).unwrap();
        assert_eq!(system.logicor().unwrap().constraint(id).literals(), &[Literal::negative(x)]);
        assert_eq!(system.problem().variable(x).locks(BoundDirection::Upper), 1);
    }
}
