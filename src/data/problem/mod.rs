//! # The problem being solved
//!
//! Variables with their global and local domains, the history of local bound changes and the
//! search tree depth. Constraints live in their handlers and refer to variables by `VariableId`.
//!
//! Bound changes are buffered as `BoundEvent`s, which are handed out by `drain_events` to whoever
//! dispatches them to the interested constraints.
use std::mem;

use enum_map::EnumMap;
use log::trace;

use crate::data::problem::elements::{BoundDirection, Tightening, VariableType};
use crate::data::problem::history::{BoundChange, BoundEvent, Cause, EventKind, Reason};
use crate::data::problem::literal::Literal;
use crate::data::problem::variable::{Variable, VariableStatus};

pub use variable::VariableId;

pub mod elements;
pub mod history;
pub mod literal;
pub mod variable;

/// Default tolerance for comparing bounds.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Variables, their domains and the bound change history of the current search path.
#[derive(Clone, Debug)]
pub struct Problem {
    variables: Vec<Variable>,
    history: Vec<BoundChange>,
    /// Per variable and bound, the history position of the latest change.
    last_change: Vec<EnumMap<BoundDirection, Option<usize>>>,
    /// History length at the moment each node below the root was opened.
    node_starts: Vec<usize>,
    pending_events: Vec<BoundEvent>,
    epsilon: f64,
}

impl Default for Problem {
    fn default() -> Self {
        Self::new()
    }
}

impl Problem {
    /// Create a problem without variables at the root node.
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    /// Create a problem with a custom tolerance for bound comparisons.
    pub fn with_epsilon(epsilon: f64) -> Self {
        debug_assert!(epsilon >= 0f64);

        Self {
            variables: Vec::new(),
            history: Vec::new(),
            last_change: Vec::new(),
            node_starts: Vec::new(),
            pending_events: Vec::new(),
            epsilon,
        }
    }

    /// Add a variable.
    ///
    /// # Arguments
    ///
    /// * `name`: Name, only used in messages and to name derived variables.
    /// * `variable_type`: Bounds of integral types are rounded inwards.
    /// * `lower`: Lower bound, may be `f64::NEG_INFINITY`.
    /// * `upper`: Upper bound, may be `f64::INFINITY`.
    ///
    /// # Return value
    ///
    /// Id of the new variable.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        variable_type: VariableType,
        lower: f64,
        upper: f64,
    ) -> VariableId {
        let (lower, upper) = match variable_type {
            VariableType::Binary => (lower.max(0f64).ceil(), upper.min(1f64).floor()),
            VariableType::Integer => ((lower - self.epsilon).ceil(), (upper + self.epsilon).floor()),
            VariableType::Continuous => (lower, upper),
        };
        debug_assert!(lower <= upper);

        let id = VariableId(self.variables.len());
        self.variables.push(Variable::new(name.into(), variable_type, lower, upper));
        self.last_change.push(EnumMap::default());

        id
    }

    /// Add a binary variable with domain `{0, 1}`.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VariableId {
        self.add_variable(name, VariableType::Binary, 0f64, 1f64)
    }

    /// Number of variables, including aggregated ones.
    pub fn nr_variables(&self) -> usize {
        self.variables.len()
    }

    /// Whether the id belongs to a variable of this problem.
    pub fn contains(&self, id: VariableId) -> bool {
        id.0 < self.variables.len()
    }

    /// Access a variable.
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0]
    }

    /// Tolerance used for bound comparisons.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Current local lower bound.
    pub fn lower(&self, id: VariableId) -> f64 {
        self.variables[id.0].local[BoundDirection::Lower]
    }

    /// Current local upper bound.
    pub fn upper(&self, id: VariableId) -> f64 {
        self.variables[id.0].local[BoundDirection::Upper]
    }

    /// Current local bound in a direction.
    pub fn bound(&self, id: VariableId, direction: BoundDirection) -> f64 {
        self.variables[id.0].local[direction]
    }

    /// Global lower bound.
    pub fn global_lower(&self, id: VariableId) -> f64 {
        self.variables[id.0].global[BoundDirection::Lower]
    }

    /// Global upper bound.
    pub fn global_upper(&self, id: VariableId) -> f64 {
        self.variables[id.0].global[BoundDirection::Upper]
    }

    /// Whether the local domain is a single value.
    pub fn is_fixed(&self, id: VariableId) -> bool {
        self.upper(id) - self.lower(id) <= self.epsilon
    }

    /// Whether a binary variable is locally fixed to zero.
    pub fn is_fixed_to_zero(&self, id: VariableId) -> bool {
        self.upper(id) < 0.5
    }

    /// Whether a binary variable is locally fixed to one.
    pub fn is_fixed_to_one(&self, id: VariableId) -> bool {
        self.lower(id) > 0.5
    }

    /// Whether a literal is locally fixed to one.
    pub fn is_true(&self, literal: Literal) -> bool {
        if literal.is_negated() {
            self.is_fixed_to_zero(literal.variable())
        } else {
            self.is_fixed_to_one(literal.variable())
        }
    }

    /// Whether a literal is locally fixed to zero.
    pub fn is_false(&self, literal: Literal) -> bool {
        self.is_true(!literal)
    }

    /// Whether a literal is globally fixed to one.
    pub fn is_globally_true(&self, literal: Literal) -> bool {
        let id = literal.variable();
        if literal.is_negated() {
            self.global_upper(id) < 0.5
        } else {
            self.global_lower(id) > 0.5
        }
    }

    /// Whether a literal is globally fixed to zero.
    pub fn is_globally_false(&self, literal: Literal) -> bool {
        self.is_globally_true(!literal)
    }

    /// Value of a variable in a solution, resolving aggregations.
    ///
    /// # Arguments
    ///
    /// * `solution`: Values indexed by variable index. Values of aggregated variables are ignored.
    pub fn value(&self, id: VariableId, solution: &[f64]) -> f64 {
        let (target, scale, constant) = self.active_representation(id);
        scale * solution[target.0] + constant
    }

    /// Value of a literal in a solution.
    pub fn literal_value(&self, literal: Literal, solution: &[f64]) -> f64 {
        literal.value(self.value(literal.variable(), solution))
    }

    /// Depth of the current search node, the root has depth zero.
    pub fn depth(&self) -> usize {
        self.node_starts.len()
    }

    /// Open a child node of the current node.
    pub fn push_node(&mut self) {
        self.node_starts.push(self.history.len());
    }

    /// Undo all bound changes made deeper than `depth`.
    ///
    /// Every undone change produces a relaxation event.
    pub fn backtrack(&mut self, depth: usize) {
        assert!(depth <= self.depth());

        if depth == self.depth() {
            return;
        }

        let start = self.node_starts[depth];
        while self.history.len() > start {
            if let Some(change) = self.history.pop() {
                let variable = &mut self.variables[change.variable.0];
                variable.local[change.direction] = change.old;
                self.last_change[change.variable.0][change.direction] = change.previous;
                self.pending_events.push(BoundEvent {
                    variable: change.variable,
                    kind: EventKind::of(change.direction, false),
                    old: change.new,
                    new: change.old,
                });
            }
        }
        self.node_starts.truncate(depth);

        trace!("backtracked to depth {}", depth);
    }

    /// Change a local bound.
    ///
    /// At the root node, the global bound changes as well.
    ///
    /// # Arguments
    ///
    /// * `id`: Variable of which the bound should change.
    /// * `direction`: Which bound.
    /// * `value`: New value of the bound, rounded inwards for integral variables.
    /// * `cause`: Recorded in the history, for conflict analysis.
    ///
    /// # Return value
    ///
    /// Whether the bound was tightened, or was already at least as tight, or whether the new bound
    /// conflicts with the opposite bound. Only in the first case anything changed.
    pub fn change_bound(
        &mut self,
        id: VariableId,
        direction: BoundDirection,
        value: f64,
        cause: Cause,
    ) -> Tightening {
        let epsilon = self.epsilon;
        let depth = self.depth();
        let variable = &mut self.variables[id.0];

        let value = match (variable.variable_type.is_integral(), direction) {
            (true, BoundDirection::Lower) => (value - epsilon).ceil(),
            (true, BoundDirection::Upper) => (value + epsilon).floor(),
            (false, _) => value,
        };

        let current = variable.local[direction];
        let opposite = variable.local[!direction];
        let (infeasible, redundant) = match direction {
            BoundDirection::Lower => (value > opposite + epsilon, value <= current + epsilon),
            BoundDirection::Upper => (value < opposite - epsilon, value >= current - epsilon),
        };
        if infeasible {
            return Tightening::Infeasible;
        }
        if redundant {
            return Tightening::Unchanged;
        }

        variable.local[direction] = value;
        if depth == 0 {
            variable.global[direction] = value;
        }
        if cause == Cause::Decision && depth > 0 {
            variable.branchings[direction] += 1;
        }

        let position = self.history.len();
        self.history.push(BoundChange {
            variable: id,
            direction,
            old: current,
            new: value,
            depth,
            cause,
            previous: self.last_change[id.0][direction],
        });
        self.last_change[id.0][direction] = Some(position);
        self.pending_events.push(BoundEvent {
            variable: id,
            kind: EventKind::of(direction, true),
            old: current,
            new: value,
        });

        trace!("{:?} bound of <{}> changed from {} to {} at depth {}", direction, self.variables[id.0].name, current, value, depth);

        Tightening::Tightened
    }

    /// Tighten the lower bound without a justification.
    pub fn tighten_lower(&mut self, id: VariableId, value: f64) -> Tightening {
        self.change_bound(id, BoundDirection::Lower, value, Cause::Decision)
    }

    /// Tighten the upper bound without a justification.
    pub fn tighten_upper(&mut self, id: VariableId, value: f64) -> Tightening {
        self.change_bound(id, BoundDirection::Upper, value, Cause::Decision)
    }

    /// Tighten the lower bound, justified by a constraint.
    pub fn infer_lower(&mut self, id: VariableId, value: f64, reason: Reason) -> Tightening {
        self.change_bound(id, BoundDirection::Lower, value, Cause::Inference(reason))
    }

    /// Tighten the upper bound, justified by a constraint.
    pub fn infer_upper(&mut self, id: VariableId, value: f64, reason: Reason) -> Tightening {
        self.change_bound(id, BoundDirection::Upper, value, Cause::Inference(reason))
    }

    /// Fix a variable to a value.
    pub fn fix(&mut self, id: VariableId, value: f64, cause: Cause) -> Tightening {
        let lower = self.change_bound(id, BoundDirection::Lower, value, cause);
        if lower.is_infeasible() {
            return lower;
        }
        lower.and(self.change_bound(id, BoundDirection::Upper, value, cause))
    }

    /// Fix a variable to a value, justified by a constraint.
    pub fn infer_fix(&mut self, id: VariableId, value: f64, reason: Reason) -> Tightening {
        self.fix(id, value, Cause::Inference(reason))
    }

    /// Fix a literal to one.
    pub fn set_true(&mut self, literal: Literal, cause: Cause) -> Tightening {
        let value = if literal.is_negated() { 0f64 } else { 1f64 };
        self.fix(literal.variable(), value, cause)
    }

    /// Add (or with negative numbers, remove) rounding locks.
    pub fn add_locks(&mut self, id: VariableId, down: i32, up: i32) {
        let locks = &mut self.variables[id.0].locks;
        for (direction, delta) in [(BoundDirection::Lower, down), (BoundDirection::Upper, up)] {
            debug_assert!(i64::from(locks[direction]) + i64::from(delta) >= 0);
            locks[direction] = locks[direction].saturating_add_signed(delta);
        }
    }

    /// Replace a variable by `scale * target + constant`.
    ///
    /// Only allowed at the root node. The bounds of the variable are transferred to the target.
    ///
    /// # Return value
    ///
    /// `Tightening::Infeasible` if the transferred bounds conflict with the domain of the target,
    /// in which case nothing is aggregated.
    pub fn aggregate(
        &mut self,
        id: VariableId,
        target: VariableId,
        scale: f64,
        constant: f64,
    ) -> Tightening {
        debug_assert_eq!(self.depth(), 0);
        debug_assert_ne!(id, target);
        debug_assert_ne!(scale, 0f64);
        debug_assert_eq!(self.variables[id.0].status, VariableStatus::Active);
        debug_assert_eq!(self.variables[target.0].status, VariableStatus::Active);

        let first = (self.lower(id) - constant) / scale;
        let second = (self.upper(id) - constant) / scale;
        let (lower, upper) = if scale > 0f64 { (first, second) } else { (second, first) };

        let result = self.tighten_lower(target, lower);
        if result.is_infeasible() {
            return result;
        }
        let result = result.and(self.tighten_upper(target, upper));
        if result.is_infeasible() {
            return result;
        }

        self.variables[id.0].status = VariableStatus::Aggregated { target, scale, constant };
        trace!("<{}> aggregated to {} * <{}> + {}", self.variables[id.0].name, scale, self.variables[target.0].name, constant);

        Tightening::Tightened
    }

    /// The active variable representing a variable, as `(variable, scale, constant)`.
    pub fn active_representation(&self, id: VariableId) -> (VariableId, f64, f64) {
        let (mut current, mut total_scale, mut total_constant) = (id, 1f64, 0f64);
        while let VariableStatus::Aggregated { target, scale, constant } = self.variables[current.0].status {
            total_constant += total_scale * constant;
            total_scale *= scale;
            current = target;
        }

        (current, total_scale, total_constant)
    }

    /// The literal over an active variable that is equivalent to this literal.
    ///
    /// Literals over variables that are aggregated with an affine map other than the identity or
    /// the negation are returned unchanged.
    pub fn representative(&self, literal: Literal) -> Literal {
        let (target, scale, constant) = self.active_representation(literal.variable());
        let epsilon = self.epsilon;

        if (scale - 1f64).abs() <= epsilon && constant.abs() <= epsilon {
            if literal.is_negated() { Literal::negative(target) } else { Literal::positive(target) }
        } else if (scale + 1f64).abs() <= epsilon && (constant - 1f64).abs() <= epsilon {
            if literal.is_negated() { Literal::positive(target) } else { Literal::negative(target) }
        } else {
            literal
        }
    }

    /// All recorded bound changes on the current search path, oldest first.
    pub fn history(&self) -> &[BoundChange] {
        &self.history
    }

    /// History position of the change that produced the current bound, if any.
    pub fn last_change(&self, id: VariableId, direction: BoundDirection) -> Option<usize> {
        self.last_change[id.0][direction]
    }

    /// History position of the latest change of a bound that happened before position `before`.
    pub fn change_before(&self, id: VariableId, direction: BoundDirection, before: usize) -> Option<usize> {
        let mut current = self.last_change[id.0][direction];
        while let Some(position) = current {
            if position < before {
                return Some(position);
            }
            current = self.history[position].previous;
        }

        None
    }

    /// Value a bound had just before history position `before`.
    pub fn bound_before(&self, id: VariableId, direction: BoundDirection, before: usize) -> f64 {
        if let Some(position) = self.change_before(id, direction, before) {
            return self.history[position].new;
        }

        // The oldest recorded change of this bound started from the original value.
        let mut oldest = None;
        let mut current = self.last_change[id.0][direction];
        while let Some(position) = current {
            oldest = Some(position);
            current = self.history[position].previous;
        }

        oldest.map_or_else(|| self.bound(id, direction), |position| self.history[position].old)
    }

    /// Take the bound events that happened since the last call.
    pub fn drain_events(&mut self) -> Vec<BoundEvent> {
        mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod test {
    use crate::data::problem::elements::{BoundDirection, Tightening, VariableType};
    use crate::data::problem::history::{Cause, ConstraintId, EventKind, HandlerKind, Reason};
    use crate::data::problem::literal::Literal;
    use crate::data::problem::Problem;

    fn reason() -> Reason {
        Reason { handler: HandlerKind::LogicOr, constraint: ConstraintId(0), info: 0 }
    }

    #[test]
    fn integer_bounds_are_rounded() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", VariableType::Integer, 0.5, 4.7);
        assert_eq!(problem.lower(x), 1f64);
        assert_eq!(problem.upper(x), 4f64);

        assert_eq!(problem.tighten_lower(x, 1.2), Tightening::Tightened);
        assert_eq!(problem.lower(x), 2f64);
        assert_eq!(problem.tighten_lower(x, 1.5), Tightening::Unchanged);
        assert_eq!(problem.tighten_upper(x, 1f64), Tightening::Infeasible);
        assert_eq!(problem.upper(x), 4f64);
    }

    #[test]
    fn root_changes_are_global() {
        let mut problem = Problem::new();
        let x = problem.add_binary("x");
        assert_eq!(problem.fix(x, 1f64, Cause::Decision), Tightening::Tightened);
        assert_eq!(problem.global_lower(x), 1f64);

        let y = problem.add_binary("y");
        problem.push_node();
        assert_eq!(problem.tighten_upper(y, 0f64), Tightening::Tightened);
        assert_eq!(problem.global_upper(y), 1f64);
        assert_eq!(problem.variable(y).branchings(BoundDirection::Upper), 1);
    }

    #[test]
    fn backtrack_restores_and_emits_relaxations() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", VariableType::Integer, 0f64, 10f64);
        problem.push_node();
        let _ = problem.tighten_lower(x, 3f64);
        problem.push_node();
        let _ = problem.infer_lower(x, 5f64, reason());
        let _ = problem.infer_upper(x, 8f64, reason());
        assert_eq!(problem.depth(), 2);
        problem.drain_events();

        problem.backtrack(1);
        assert_eq!(problem.depth(), 1);
        assert_eq!(problem.lower(x), 3f64);
        assert_eq!(problem.upper(x), 10f64);
        let events = problem.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::UpperRelaxed);
        assert_eq!(events[1].kind, EventKind::LowerRelaxed);
        assert_eq!(problem.last_change(x, BoundDirection::Lower), Some(0));

        problem.backtrack(0);
        assert_eq!(problem.lower(x), 0f64);
        assert_eq!(problem.last_change(x, BoundDirection::Lower), None);
    }

    #[test]
    fn history_lookup() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", VariableType::Integer, 0f64, 10f64);
        problem.push_node();
        let _ = problem.tighten_lower(x, 2f64);
        let _ = problem.tighten_upper(x, 9f64);
        let _ = problem.infer_lower(x, 4f64, reason());

        assert_eq!(problem.last_change(x, BoundDirection::Lower), Some(2));
        assert_eq!(problem.change_before(x, BoundDirection::Lower, 2), Some(0));
        assert_eq!(problem.change_before(x, BoundDirection::Lower, 0), None);
        assert_eq!(problem.bound_before(x, BoundDirection::Lower, 2), 2f64);
        assert_eq!(problem.bound_before(x, BoundDirection::Lower, 0), 0f64);
        assert_eq!(problem.history()[2].cause, Cause::Inference(reason()));
    }

    #[test]
    fn aggregation_and_representatives() {
        let mut problem = Problem::new();
        let x = problem.add_binary("x");
        let y = problem.add_binary("y");
        let z = problem.add_binary("z");

        assert_eq!(problem.aggregate(x, y, -1f64, 1f64), Tightening::Tightened);
        assert_eq!(problem.aggregate(y, z, 1f64, 0f64), Tightening::Tightened);
        assert_eq!(problem.active_representation(x), (z, -1f64, 1f64));
        assert_eq!(problem.representative(Literal::positive(x)), Literal::negative(z));
        assert_eq!(problem.representative(Literal::negative(y)), Literal::negative(z));
        assert_eq!(problem.value(x, &[0f64, 0f64, 1f64]), 0f64);
    }

    #[test]
    fn aggregation_transfers_bounds() {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", VariableType::Integer, 3f64, 5f64);
        let y = problem.add_variable("y", VariableType::Integer, 0f64, 10f64);
        assert_eq!(problem.aggregate(x, y, 1f64, 1f64), Tightening::Tightened);
        assert_eq!(problem.lower(y), 2f64);
        assert_eq!(problem.upper(y), 4f64);
    }

    #[test]
    fn locks() {
        let mut problem = Problem::new();
        let x = problem.add_binary("x");
        problem.add_locks(x, 1, 2);
        problem.add_locks(x, -1, 0);
        assert_eq!(problem.variable(x).locks(BoundDirection::Lower), 0);
        assert_eq!(problem.variable(x).locks(BoundDirection::Upper), 2);
    }
}
