//! # Presolving logic-or constraints
//!
//! Literals fixed at the root are removed, repeated literals merged and constraints containing a
//! literal together with its negation dropped. Identical constraints are found with a hash table,
//! and constraints that contain all literals of another constraint are found by comparing pairs.
use std::hash::{Hash, Hasher};

use index_utils::remove_indices;
use itertools::{EitherOrBoth, Itertools};
use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::algorithm::propagation::ResultCode;
use crate::algorithm::propagation::conflict::BoundRef;
use crate::algorithm::propagation::context::Context;
use crate::algorithm::propagation::logicor::LogicOrHandler;
use crate::data::problem::elements::Tightening;
use crate::data::problem::history::{ConstraintId, HandlerKind};
use crate::data::problem::literal::Literal;

/// Sorted literals of a constraint, as a hash table key.
///
/// The hash only looks at the length and three order statistics; equality compares all literals.
struct Clause<'a>(&'a [Literal]);

impl Hash for Clause<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let literals = self.0;
        debug_assert!(!literals.is_empty());

        literals.len().hash(state);
        literals[0].code().hash(state);
        literals[literals.len() / 2].code().hash(state);
        literals[literals.len() - 1].code().hash(state);
    }
}

impl PartialEq for Clause<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Clause<'_> {}

/// Whether all literals of `small` are in `large`, both sorted.
fn is_subset(small: &[Literal], large: &[Literal]) -> bool {
    small.iter()
        .merge_join_by(large.iter(), |a, b| a.cmp(b))
        .all(|pair| !matches!(pair, EitherOrBoth::Left(_)))
}

impl LogicOrHandler {
    /// Simplify all constraints at the root node.
    pub(super) fn presolve_constraints(
        &mut self,
        context: &mut Context,
        is_stopped: &dyn Fn() -> bool,
    ) -> ResultCode {
        debug_assert_eq!(context.problem.depth(), 0);

        self.process_events(context);
        let reductions_before = context.statistics.nr_domain_reductions;
        let deleted_before = context.statistics.nr_deleted;
        let mut nr_removed_literals = 0;

        // One mark per variable, bit 1 for the positive and bit 2 for the negated literal.
        let mut marks = vec![0u8; context.problem.nr_variables()];
        for index in 0..self.constraints.len() {
            if is_stopped() {
                debug!("logic-or presolving interrupted");
                return self.summary(context, reductions_before, deleted_before, nr_removed_literals);
            }

            let id = ConstraintId(index);
            if !self.is_active(id) {
                continue;
            }
            let length = self.constraints[id.0].literals.len();
            self.apply_fixings(context, id);
            if self.is_active(id) {
                self.merge_multiples(context, id, &mut marks);
            }
            if !self.is_active(id) {
                continue;
            }
            nr_removed_literals += length - self.constraints[id.0].literals.len();

            self.sort_literals(context, id);
            if self.presolve_short(context, id).is_cutoff() {
                return ResultCode::Cutoff;
            }
        }

        if context.settings.logicor.presolve_use_hashing && !is_stopped() {
            self.detect_redundant(context);
        }
        if context.settings.logicor.presolve_pairwise && !is_stopped() {
            self.remove_redundant(context, is_stopped);
        }

        self.summary(context, reductions_before, deleted_before, nr_removed_literals)
    }

    fn summary(
        &self,
        context: &Context,
        reductions_before: usize,
        deleted_before: usize,
        nr_removed_literals: usize,
    ) -> ResultCode {
        let nr_reductions = context.statistics.nr_domain_reductions - reductions_before;
        let nr_deleted = context.statistics.nr_deleted - deleted_before;
        info!(
            "logic-or presolving: {} bound changes, {} deleted constraints, {} removed literals",
            nr_reductions, nr_deleted, nr_removed_literals,
        );

        if nr_reductions + nr_deleted + nr_removed_literals > 0 {
            ResultCode::ReducedDomain
        } else {
            ResultCode::DidNotFind
        }
    }

    /// Replace literals by their representatives, drop globally false literals and delete the
    /// constraint if a literal is globally true.
    fn apply_fixings(&mut self, context: &mut Context, id: ConstraintId) {
        let constraint = &self.constraints[id.0];
        if constraint.literals.iter().any(|&literal| context.problem.representative(literal) != literal) {
            self.clear_watches(context, id);
            let constraint = &mut self.constraints[id.0];
            for literal in &mut constraint.literals {
                let representative = context.problem.representative(*literal);
                if representative != *literal {
                    Self::lock(context, *literal, -1);
                    Self::lock(context, representative, 1);
                    *literal = representative;
                }
            }
            constraint.sorted = false;
            constraint.changed = true;
            constraint.compute_signature();
            self.enqueue(id);
        }

        // Backwards, such that swap removal only moves literals that were already looked at.
        for position in (0..self.constraints[id.0].literals.len()).rev() {
            let literal = self.constraints[id.0].literals[position];
            if context.problem.is_globally_true(literal) {
                debug!("logic-or constraint {} is satisfied by {}", id, literal);
                self.delete(context, id);
                return;
            }
            if context.problem.is_globally_false(literal) {
                self.delete_position(context, id, position);
            }
        }
    }

    /// Merge repeated literals, and delete the constraint if it contains a literal and its
    /// negation.
    ///
    /// # Arguments
    ///
    /// * `marks`: All zero, one entry per variable. All zero again when this returns.
    fn merge_multiples(&mut self, context: &mut Context, id: ConstraintId, marks: &mut [u8]) {
        let literals = &self.constraints[id.0].literals;
        let mut duplicates = Vec::new();
        let mut tautology = false;
        for (position, &literal) in literals.iter().enumerate() {
            let index = literal.variable().index();
            let (own, opposite) = if literal.is_negated() { (2, 1) } else { (1, 2) };
            if marks[index] & own != 0 {
                duplicates.push(position);
            } else if marks[index] & opposite != 0 {
                tautology = true;
            }
            marks[index] |= own;
        }
        for literal in literals {
            marks[literal.variable().index()] = 0;
        }

        if tautology {
            debug!("logic-or constraint {} contains a literal and its negation", id);
            self.delete(context, id);
            return;
        }
        if duplicates.is_empty() {
            return;
        }

        self.clear_watches(context, id);
        let constraint = &mut self.constraints[id.0];
        for &position in &duplicates {
            Self::lock(context, constraint.literals[position], -1);
        }
        remove_indices(&mut constraint.literals, &duplicates);
        constraint.changed = true;
        constraint.compute_signature();
        self.enqueue(id);
        debug!("removed {} repeated literals from logic-or constraint {}", duplicates.len(), id);
    }

    fn sort_literals(&mut self, context: &mut Context, id: ConstraintId) {
        if self.constraints[id.0].sorted {
            return;
        }

        self.clear_watches(context, id);
        let constraint = &mut self.constraints[id.0];
        constraint.literals.sort_unstable();
        constraint.sorted = true;
        self.enqueue(id);
    }

    /// Handle constraints with fewer than two literals.
    fn presolve_short(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        let constraint = &self.constraints[id.0];
        match constraint.literals.as_slice() {
            [] => {
                if constraint.modifiable {
                    self.constraints[id.0].add_cut = true;
                    return ResultCode::DidNotFind;
                }
                debug!("logic-or constraint {} is empty", id);
                context.report_conflict(HandlerKind::LogicOr, id, Vec::<BoundRef>::new());
                ResultCode::Cutoff
            },
            &[literal] if !constraint.modifiable => {
                let value = if literal.is_negated() { 0f64 } else { 1f64 };
                if context.infer_fix(literal.variable(), value, Self::reason(id)) == Tightening::Infeasible {
                    context.report_conflict(HandlerKind::LogicOr, id, [BoundRef::falsifying(literal)]);
                    return ResultCode::Cutoff;
                }
                debug!("logic-or constraint {} fixed {} to one", id, literal);
                self.delete(context, id);
                ResultCode::ReducedDomain
            },
            _ => ResultCode::DidNotFind,
        }
    }

    /// Delete constraints that are identical to another constraint.
    ///
    /// Of two identical constraints, a modifiable one is deleted; if both are modifiable, both
    /// are kept.
    fn detect_redundant(&mut self, context: &mut Context) {
        let mut redundant = Vec::new();
        {
            let mut table = FxHashMap::<Clause, ConstraintId>::default();
            for (index, constraint) in self.constraints.iter().enumerate() {
                if !constraint.is_active() || constraint.literals.is_empty() {
                    continue;
                }
                debug_assert!(constraint.sorted);

                let id = ConstraintId(index);
                let Some(&existing) = table.get(&Clause(&constraint.literals)) else {
                    table.insert(Clause(&constraint.literals), id);
                    continue;
                };
                match (self.constraints[existing.0].modifiable, constraint.modifiable) {
                    (false, _) => redundant.push(id),
                    (true, false) => {
                        redundant.push(existing);
                        table.insert(Clause(&constraint.literals), id);
                    },
                    (true, true) => {},
                }
            }
        }

        for &id in &redundant {
            debug!("logic-or constraint {} is identical to another constraint", id);
            self.delete(context, id);
        }
    }

    /// Delete constraints that contain all literals of another constraint.
    ///
    /// Only pairs with a constraint changed since the last call are compared. Comparing stops
    /// when, per `min_comparisons` comparisons, fewer than `min_gain_per_min_comparisons` of them
    /// led to a deletion. A constraint stays marked as changed until all of its pairs were
    /// compared, so that a later call picks up where an interrupted one stopped.
    fn remove_redundant(&mut self, context: &mut Context, is_stopped: &dyn Fn() -> bool) {
        let settings = context.settings.logicor.clone();
        let mut order = (0..self.constraints.len())
            .filter(|&index| self.constraints[index].is_active() && !self.constraints[index].literals.is_empty())
            .collect::<Vec<_>>();
        order.sort_by_key(|&index| self.constraints[index].literals.len());

        let mut nr_comparisons = 0usize;
        let mut nr_deleted = 0usize;
        // Constraints in `order[..nr_completed]` were compared with all others.
        let mut nr_completed = 0;
        'outer: for (i, &small) in order.iter().enumerate() {
            if is_stopped() {
                break;
            }
            if !self.constraints[small].is_active() || self.constraints[small].modifiable {
                nr_completed = i + 1;
                continue;
            }

            for &large in &order[i + 1..] {
                let (first, second) = (&self.constraints[small], &self.constraints[large]);
                if !second.is_active() || (!first.changed && !second.changed) {
                    continue;
                }
                if first.signature & !second.signature != 0 {
                    continue;
                }

                nr_comparisons += 1;
                if is_subset(&first.literals, &second.literals) {
                    debug!("logic-or constraint {} is implied by {}", ConstraintId(large), ConstraintId(small));
                    self.delete(context, ConstraintId(large));
                    nr_deleted += 1;
                }

                if nr_comparisons % settings.min_comparisons.max(1) == 0 {
                    let gain = nr_deleted as f64 / (nr_comparisons / settings.min_comparisons.max(1)) as f64;
                    if gain < settings.min_gain_per_min_comparisons {
                        debug!("pairwise logic-or presolving stopped after {} comparisons", nr_comparisons);
                        break 'outer;
                    }
                }
            }
            nr_completed = i + 1;
        }

        for &index in &order[..nr_completed] {
            self.constraints[index].changed = false;
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use crate::algorithm::propagation::ResultCode;
    use crate::algorithm::propagation::settings::{LogicOrSettings, Settings};
    use crate::algorithm::propagation::system::ConstraintSystem;
    use crate::data::problem::elements::BoundDirection;
    use crate::data::problem::literal::Literal;
    use crate::data::problem::{Problem, VariableId};

    fn system(n: usize, settings: Settings) -> (ConstraintSystem, Vec<VariableId>) {
        let mut problem = Problem::new();
        let variables = (0..n).map(|i| problem.add_binary(format!("x{}", i))).collect();
        let mut system = ConstraintSystem::new(problem, settings);
        system.include_logicor();
        (system, variables)
    }

    fn positive(variables: &[VariableId]) -> Vec<Literal> {
        variables.iter().map(|&v| Literal::positive(v)).collect()
    }

    #[test]
    fn fixings() {
        let (mut system, x) = system(3, Settings::default());
        let first = system.add_logicor("first", positive(&[x[2], x[1], x[0]])).unwrap();
        let second = system.add_logicor("second", vec![Literal::negative(x[0]), Literal::positive(x[2])]).unwrap();
        let _ = system.problem_mut().tighten_upper(x[1], 0f64);
        let _ = system.problem_mut().tighten_upper(x[0], 0f64);

        assert_eq!(system.presolve(|| false), ResultCode::ReducedDomain);
        let logicor = system.logicor().unwrap();
        assert_eq!(logicor.constraint(first).literals(), &[Literal::positive(x[2])]);
        assert!(logicor.constraint(first).is_deleted());
        assert!(logicor.constraint(second).is_deleted());
        assert_eq!(system.problem().global_lower(x[2]), 1f64);
        for &variable in &x {
            assert_eq!(system.problem().variable(variable).locks(BoundDirection::Lower), 0);
        }
    }

    #[test]
    fn interrupted_pairwise() {
        let (mut system, x) = system(3, Settings::default());
        let small = system.add_logicor("small", positive(&[x[0], x[1]])).unwrap();
        let large = system.add_logicor("large", positive(&[x[0], x[1], x[2]])).unwrap();

        // Two polls for the constraints, one each before hashing and pairwise comparison, and the
        // fifth before the first pair is compared.
        let polls = Cell::new(0);
        let _ = system.presolve(|| {
            polls.set(polls.get() + 1);
            polls.get() > 4
        });
        assert_eq!(polls.get(), 5);
        assert!(!system.logicor().unwrap().constraint(large).is_deleted());

        assert_eq!(system.presolve(|| false), ResultCode::ReducedDomain);
        let logicor = system.logicor().unwrap();
        assert!(logicor.constraint(large).is_deleted());
        assert!(!logicor.constraint(small).is_deleted());
    }

    #[test]
    fn multiples() {
        let (mut system, x) = system(3, Settings::default());
        let id = system.add_logicor("c", positive(&[x[0], x[1], x[0], x[2], x[1]])).unwrap();
        let tautology = system.add_logicor("t", vec![Literal::positive(x[2]), Literal::negative(x[1]), Literal::positive(x[1])]).unwrap();

        assert_eq!(system.presolve(|| false), ResultCode::ReducedDomain);
        let logicor = system.logicor().unwrap();
        assert_eq!(logicor.constraint(id).literals(), &positive(&[x[0], x[1], x[2]])[..]);
        assert!(logicor.constraint(tautology).is_deleted());
        assert_eq!(system.problem().variable(x[0]).locks(BoundDirection::Lower), 1);

        // Nothing left to merge.
        assert_eq!(system.presolve(|| false), ResultCode::DidNotFind);
        assert_eq!(system.logicor().unwrap().constraint(id).literals().len(), 3);

        // Watches are picked up again by propagation.
        assert_eq!(system.propagate(), ResultCode::DidNotFind);
        assert_eq!(system.context().events.nr_subscriptions(), 2);
    }

    #[test]
    fn empty() {
        let (mut system, x) = system(2, Settings::default());
        system.add_logicor("c", positive(&x)).unwrap();
        let _ = system.problem_mut().tighten_upper(x[0], 0f64);
        let _ = system.problem_mut().tighten_upper(x[1], 0f64);

        assert_eq!(system.presolve(|| false), ResultCode::Cutoff);
    }

    #[test]
    fn identical() {
        let settings = Settings { logicor: LogicOrSettings {
            presolve_pairwise: false,
            ..Default::default()
        }, ..Settings::default() };
        let (mut system, x) = system(3, settings);
        let first = system.add_logicor("first", positive(&[x[1], x[0], x[2]])).unwrap();
        let second = system.add_logicor("second", positive(&[x[2], x[1], x[0]])).unwrap();
        let third = system.add_logicor("third", positive(&[x[0], x[1]])).unwrap();
        let modifiable = system.add_logicor("modifiable", positive(&[x[0], x[1]])).unwrap();
        system.logicor_mut().unwrap().set_modifiable(modifiable, true);

        assert_eq!(system.presolve(|| false), ResultCode::ReducedDomain);
        let logicor = system.logicor().unwrap();
        assert!(!logicor.constraint(first).is_deleted());
        assert!(logicor.constraint(second).is_deleted());
        assert!(!logicor.constraint(third).is_deleted());
        assert!(logicor.constraint(modifiable).is_deleted());
    }

    #[test]
    fn subsumption() {
        let settings = Settings { logicor: LogicOrSettings {
            presolve_use_hashing: false,
            ..Default::default()
        }, ..Settings::default() };
        let (mut system, x) = system(4, settings);
        let large = system.add_logicor("large", positive(&[x[3], x[0], x[1]])).unwrap();
        let small = system.add_logicor("small", positive(&[x[1], x[3]])).unwrap();
        let other = system.add_logicor("other", vec![Literal::negative(x[1]), Literal::positive(x[3]), Literal::positive(x[2])]).unwrap();

        assert_eq!(system.presolve(|| false), ResultCode::ReducedDomain);
        let logicor = system.logicor().unwrap();
        assert!(logicor.constraint(large).is_deleted());
        assert!(!logicor.constraint(small).is_deleted());
        assert!(!logicor.constraint(other).is_deleted());
    }

    #[test]
    fn aggregated_to_tautology() {
        let (mut system, x) = system(2, Settings::default());
        let id = system.add_logicor("c", positive(&x)).unwrap();
        // x1 = 1 - x0
        let _ = system.problem_mut().aggregate(x[1], x[0], -1f64, 1f64);

        assert_eq!(system.presolve(|| false), ResultCode::ReducedDomain);
        assert!(system.logicor().unwrap().constraint(id).is_deleted());
        assert_eq!(system.problem().variable(x[0]).locks(BoundDirection::Lower), 0);
        assert_eq!(system.problem().variable(x[0]).locks(BoundDirection::Upper), 0);
    }

    #[test]
    fn stopped() {
        let (mut system, x) = system(2, Settings::default());
        let id = system.add_logicor("c", positive(&[x[0], x[0]])).unwrap();

        assert_eq!(system.presolve(|| true), ResultCode::DidNotFind);
        assert_eq!(system.logicor().unwrap().constraint(id).literals().len(), 2);
    }
}
