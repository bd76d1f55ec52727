//! # Linking constraints
//!
//! A linking constraint ties an integer variable `x` with domain `[l, u]` to binary variables
//! `b_0, ..., b_{u - l}`:
//!
//! ```text
//! x = sum_i (l + i) b_i,
//! sum_i b_i = 1.
//! ```
//!
//! The binary variables are created on first access. How many of them are fixed to zero and to
//! one is maintained from bound change events, such that propagation knows which rule applies
//! without scanning the binary variables. Events of the integer and the binary variables queue
//! the constraint for propagation; constraints that saw no events are not looked at.
use std::fmt;

use fifo_set::FIFOSet;
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::algorithm::propagation::{ConstraintHandler, ResultCode};
use crate::algorithm::propagation::conflict::BoundRef;
use crate::algorithm::propagation::context::Context;
use crate::algorithm::propagation::event::{EventMask, Subscription};
use crate::algorithm::propagation::separation::Row;
use crate::data::problem::VariableId;
use crate::data::problem::elements::{BoundDirection, Tightening, VariableType};
use crate::data::problem::history::{BoundChange, BoundEvent, ConstraintId, EventKind, HandlerKind, Reason};
use crate::error::{Error, Result};

mod presolve;

/// The rule that inferred a bound change, attached to the change as inference info.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Rule {
    /// A binary variable below the lower bound of the integer variable was fixed to zero.
    IntegerLower,
    /// A binary variable above the upper bound of the integer variable was fixed to zero.
    IntegerUpper,
    /// The binary variable of the value of the fixed integer variable was fixed to one.
    IntegerFixed,
    /// Implied by the contained binary variable being fixed to one.
    OneFixed(VariableId),
    /// Implied by all binary variables except the contained one being fixed to zero.
    OthersZero(VariableId),
    /// The lower bound of the integer variable skipped binary variables fixed to zero.
    TightenedLower,
    /// The upper bound of the integer variable skipped binary variables fixed to zero.
    TightenedUpper,
}

const TAG_BITS: u32 = 4;

impl Rule {
    fn encode(self) -> u64 {
        let (tag, payload) = match self {
            Rule::IntegerLower => (0, 0),
            Rule::IntegerUpper => (1, 0),
            Rule::IntegerFixed => (2, 0),
            Rule::OneFixed(variable) => (3, variable.0),
            Rule::OthersZero(variable) => (4, variable.0),
            Rule::TightenedLower => (5, 0),
            Rule::TightenedUpper => (6, 0),
        };

        (payload as u64) << TAG_BITS | tag
    }

    fn decode(info: u64) -> Option<Self> {
        let variable = VariableId((info >> TAG_BITS) as usize);
        match info & ((1 << TAG_BITS) - 1) {
            0 => Some(Rule::IntegerLower),
            1 => Some(Rule::IntegerUpper),
            2 => Some(Rule::IntegerFixed),
            3 => Some(Rule::OneFixed(variable)),
            4 => Some(Rule::OthersZero(variable)),
            5 => Some(Rule::TightenedLower),
            6 => Some(Rule::TightenedUpper),
            _ => None,
        }
    }
}

/// Links an integer variable to one binary variable per value of its domain.
#[derive(Debug)]
pub struct LinkingConstraint {
    intvar: VariableId,
    /// Binary variable `i` represents the value `offset + i`.
    binvars: Vec<VariableId>,
    /// One per binary variable, in the same order, once the constraint is activated.
    subscriptions: Vec<Subscription>,
    intvar_subscription: Option<Subscription>,
    offset: i64,
    nr_binaries: usize,
    nr_fixed_ones: usize,
    nr_fixed_zeros: usize,
    created: bool,
    enabled: bool,
    /// Depth at which the constraint was disabled locally.
    disabled_at: Option<usize>,
    deleted: bool,
    modifiable: bool,
    /// The constraint can only be satisfied by adding binary variables, its rows should be
    /// added to the LP.
    add_cut: bool,
    rows_added: bool,
}

impl LinkingConstraint {
    /// The integer variable.
    pub fn intvar(&self) -> VariableId {
        self.intvar
    }

    /// The binary variables, empty until they are created.
    pub fn binaries(&self) -> &[VariableId] {
        &self.binvars
    }

    /// Value of the integer variable that the first binary variable represents.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Number of binary variables, also before they are created.
    pub fn nr_binaries(&self) -> usize {
        self.nr_binaries
    }

    /// Number of binary variables locally fixed to one, as known from the processed events.
    pub fn nr_fixed_ones(&self) -> usize {
        self.nr_fixed_ones
    }

    /// Number of binary variables locally fixed to zero, as known from the processed events.
    pub fn nr_fixed_zeros(&self) -> usize {
        self.nr_fixed_zeros
    }

    /// Whether the constraint takes part in propagation.
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.deleted
    }

    /// Whether the constraint was removed from the problem.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Whether binary variables may still be added, such that all binary variables being zero
    /// is not infeasible.
    pub fn is_modifiable(&self) -> bool {
        self.modifiable
    }

    fn is_active(&self) -> bool {
        self.created && self.enabled && !self.deleted
    }

    fn value_of(&self, position: usize) -> f64 {
        (self.offset + position as i64) as f64
    }

    /// Position of the binary variable representing an integral value, if there is one.
    fn position_of(&self, value: f64) -> Option<usize> {
        usize::try_from(value.round() as i64 - self.offset)
            .ok()
            .filter(|&position| position < self.binvars.len())
    }

    /// Upper bounds of the binary variables representing values in `[low, high]`.
    fn zeros_between(&self, low: f64, high: f64) -> impl Iterator<Item = BoundRef> + '_ {
        self.binvars.iter().enumerate()
            .filter(move |&(position, _)| {
                let value = self.value_of(position);
                low <= value && value <= high
            })
            .map(|(_, &binvar)| BoundRef::upper(binvar))
    }

    /// Position of the binary variable closest to a value.
    fn clamped_position_of(&self, value: f64) -> usize {
        debug_assert!(!self.binvars.is_empty());

        let last = self.binvars.len() as i64 - 1;
        (value.round() as i64 - self.offset).clamp(0, last) as usize
    }
}

/// Owns all linking constraints.
pub struct LinkingHandler {
    constraints: Vec<LinkingConstraint>,
    by_intvar: FxHashMap<VariableId, ConstraintId>,
    /// Constraints with events that were not propagated yet.
    queue: FIFOSet<ConstraintId>,
}

impl Default for LinkingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LinkingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkingHandler")
            .field("constraints", &self.constraints)
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl LinkingHandler {
    /// Create a handler without constraints.
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            by_intvar: FxHashMap::default(),
            queue: FIFOSet::new(),
        }
    }

    /// Create a linking constraint for an integer variable.
    ///
    /// The binary variables are not created yet, see `binaries`.
    ///
    /// # Errors
    ///
    /// If the variable is not an integer variable of the problem with finite bounds, or if it is
    /// already linked.
    pub fn add(&mut self, context: &mut Context, intvar: VariableId) -> Result<ConstraintId> {
        let problem = &mut context.problem;
        if !problem.contains(intvar) {
            return Err(Error::UnknownVariable(intvar));
        }
        let variable = problem.variable(intvar);
        let name = variable.name().to_string();
        if !variable.variable_type().is_integral() {
            return Err(Error::NotInteger(name));
        }
        let (lower, upper) = (problem.global_lower(intvar), problem.global_upper(intvar));
        if !lower.is_finite() || !upper.is_finite() {
            return Err(Error::UnboundedDomain(name));
        }
        if self.by_intvar.contains_key(&intvar) {
            return Err(Error::AlreadyLinked(name));
        }

        let id = ConstraintId(self.constraints.len());
        let nr_binaries = (upper - lower) as usize + 1;
        problem.add_locks(intvar, 1, 1);
        self.constraints.push(LinkingConstraint {
            intvar,
            binvars: Vec::new(),
            subscriptions: Vec::new(),
            intvar_subscription: None,
            offset: lower as i64,
            nr_binaries,
            nr_fixed_ones: 0,
            nr_fixed_zeros: 0,
            created: false,
            enabled: true,
            disabled_at: None,
            deleted: false,
            modifiable: false,
            add_cut: false,
            rows_added: false,
        });
        self.by_intvar.insert(intvar, id);
        debug!("linking constraint {} created for <{}> with {} values", id, name, nr_binaries);

        Ok(id)
    }

    /// The linking constraint of an integer variable.
    pub fn find(&self, intvar: VariableId) -> Option<ConstraintId> {
        self.by_intvar.get(&intvar).copied()
    }

    /// Access a constraint.
    pub fn constraint(&self, id: ConstraintId) -> &LinkingConstraint {
        &self.constraints[id.0]
    }

    /// All constraints, including deleted ones.
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintId, &LinkingConstraint)> {
        self.constraints.iter().enumerate().map(|(i, constraint)| (ConstraintId(i), constraint))
    }

    /// Allow or forbid adding binary variables later.
    pub fn set_modifiable(&mut self, id: ConstraintId, modifiable: bool) {
        self.constraints[id.0].modifiable = modifiable;
    }

    /// The binary variables of a constraint, created if they don't exist yet.
    pub fn binaries(&mut self, context: &mut Context, id: ConstraintId) -> &[VariableId] {
        self.create_binaries(context, id);
        &self.constraints[id.0].binvars
    }

    fn create_all(&mut self, context: &mut Context) {
        for index in 0..self.constraints.len() {
            self.create_binaries(context, ConstraintId(index));
        }
    }

    /// Create the binary variables of a constraint and activate it.
    fn create_binaries(&mut self, context: &mut Context, id: ConstraintId) {
        let constraint = &mut self.constraints[id.0];
        if constraint.created || constraint.deleted {
            return;
        }

        let problem = &mut context.problem;
        let name = problem.variable(constraint.intvar).name().to_string();
        let offset = constraint.offset;
        // With a single value of the global domain, its binary variable is one in every node.
        let lower = if constraint.nr_binaries == 1 { 1f64 } else { 0f64 };
        constraint.binvars = (0..constraint.nr_binaries)
            .map(|i| {
                let name = format!("{}_{}", name, offset + i as i64);
                let binvar = problem.add_variable(name, VariableType::Binary, lower, 1f64);
                problem.add_locks(binvar, 1, 1);
                binvar
            })
            .collect();
        constraint.created = true;

        if constraint.nr_binaries == 1 {
            constraint.enabled = false;
            constraint.disabled_at = Some(0);
            debug!("linking constraint {} of <{}> is trivial", id, name);
            return;
        }

        // Earlier changes should not reach the new subscriptions.
        context.flush_events();
        constraint.subscriptions = constraint.binvars.iter()
            .map(|&binvar| context.events.catch(binvar, EventMask::all(), HandlerKind::Linking, id))
            .collect();
        constraint.intvar_subscription = Some(context.events.catch(constraint.intvar, EventMask::all(), HandlerKind::Linking, id));
        constraint.nr_fixed_ones = constraint.binvars.iter()
            .filter(|&&binvar| context.problem.is_fixed_to_one(binvar))
            .count();
        constraint.nr_fixed_zeros = constraint.binvars.iter()
            .filter(|&&binvar| context.problem.is_fixed_to_zero(binvar))
            .count();
        trace!("linking constraint {} activated with {} ones and {} zeros", id, constraint.nr_fixed_ones, constraint.nr_fixed_zeros);
        self.queue.push(id);
    }

    fn reason(id: ConstraintId, rule: Rule) -> Reason {
        Reason { handler: HandlerKind::Linking, constraint: id, info: rule.encode() }
    }

    fn is_active(&self, id: ConstraintId) -> bool {
        self.constraints[id.0].is_active()
    }

    /// Update the fixing counters with the events that were delivered since the last call, and
    /// queue the constraints they belong to.
    ///
    /// Relaxations queue the constraint as well: what it deduced deeper in the tree may be
    /// undone, while the bounds it has to propagate from are still there.
    fn process_events(&mut self, context: &mut Context) {
        for delivery in context.deliveries(HandlerKind::Linking) {
            self.queue.push(delivery.constraint);
            let constraint = &mut self.constraints[delivery.constraint.0];
            let BoundEvent { variable, kind, old, new } = delivery.event;
            if variable == constraint.intvar {
                continue;
            }
            match kind {
                EventKind::LowerTightened if old < 0.5 && new > 0.5 => constraint.nr_fixed_ones += 1,
                EventKind::LowerRelaxed if old > 0.5 && new < 0.5 => constraint.nr_fixed_ones -= 1,
                EventKind::UpperTightened if old > 0.5 && new < 0.5 => constraint.nr_fixed_zeros += 1,
                EventKind::UpperRelaxed if old < 0.5 && new > 0.5 => constraint.nr_fixed_zeros -= 1,
                _ => {},
            }
            debug_assert!(constraint.nr_fixed_ones + constraint.nr_fixed_zeros <= constraint.binvars.len());
        }
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
            debug!("linking constraint {} disabled at depth {}", id, depth);
        }
    }

    /// Remove a constraint from the problem, releasing its events and locks.
    fn delete(&mut self, context: &mut Context, id: ConstraintId) {
        let constraint = &mut self.constraints[id.0];
        if constraint.deleted {
            return;
        }

        for subscription in constraint.subscriptions.drain(..).chain(constraint.intvar_subscription.take()) {
            context.events.release(subscription);
        }
        context.problem.add_locks(constraint.intvar, -1, -1);
        for &binvar in &constraint.binvars {
            context.problem.add_locks(binvar, -1, -1);
        }
        constraint.deleted = true;
        constraint.enabled = false;
        constraint.disabled_at = None;
        context.statistics.nr_deleted += 1;
        debug!("linking constraint {} deleted", id);
    }

    /// Both propagation rules for one constraint.
    fn propagate_constraint(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        let result = self.process_integer_bound_change(context, id);
        if result.is_cutoff() || !self.is_active(id) {
            return result;
        }

        result.combine(self.process_binvar_fixings(context, id))
    }

    /// Fix the binary variables of values outside the domain of the integer variable to zero,
    /// and the binary variable of its value to one if it is fixed.
    fn process_integer_bound_change(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        let constraint = &self.constraints[id.0];
        let intvar = constraint.intvar;
        let lower = context.problem.lower(intvar);
        let upper = context.problem.upper(intvar);
        let mut result = ResultCode::DidNotFind;

        for (position, &binvar) in constraint.binvars.iter().enumerate() {
            if context.problem.is_fixed_to_zero(binvar) {
                continue;
            }
            let value = constraint.value_of(position);
            let (rule, bound) = if value < lower {
                (Rule::IntegerLower, BoundRef::lower(intvar))
            } else if value > upper {
                (Rule::IntegerUpper, BoundRef::upper(intvar))
            } else {
                continue;
            };

            match context.infer_fix(binvar, 0f64, Self::reason(id, rule)) {
                Tightening::Infeasible => {
                    context.report_conflict(HandlerKind::Linking, id, [bound, BoundRef::lower(binvar)]);
                    return ResultCode::Cutoff;
                },
                Tightening::Tightened => result = ResultCode::ReducedDomain,
                Tightening::Unchanged => {},
            }
        }

        if context.problem.is_fixed(intvar) {
            let Some(position) = constraint.position_of(lower) else {
                // All binary variables are zero now, which is detected with the counters.
                return result;
            };
            let binvar = constraint.binvars[position];
            match context.infer_fix(binvar, 1f64, Self::reason(id, Rule::IntegerFixed)) {
                Tightening::Infeasible => {
                    let bounds = [BoundRef::lower(intvar), BoundRef::upper(intvar), BoundRef::upper(binvar)];
                    context.report_conflict(HandlerKind::Linking, id, bounds);
                    return ResultCode::Cutoff;
                },
                Tightening::Tightened => result = ResultCode::ReducedDomain,
                Tightening::Unchanged => {},
            }
            self.disable(context, id);
        }

        result
    }

    /// Propagate based on the numbers of binary variables fixed to one and zero.
    fn process_binvar_fixings(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        self.process_events(context);

        let constraint = &self.constraints[id.0];
        let nr_binaries = constraint.binvars.len();
        debug_assert_eq!(
            constraint.nr_fixed_ones,
            constraint.binvars.iter().filter(|&&b| context.problem.is_fixed_to_one(b)).count(),
        );
        debug_assert_eq!(
            constraint.nr_fixed_zeros,
            constraint.binvars.iter().filter(|&&b| context.problem.is_fixed_to_zero(b)).count(),
        );

        match (constraint.nr_fixed_ones, constraint.nr_fixed_zeros) {
            (1, _) => self.propagate_fixed_one(context, id),
            (ones, _) if ones > 1 => {
                let bounds = constraint.binvars.iter()
                    .filter(|&&binvar| context.problem.is_fixed_to_one(binvar))
                    .take(2)
                    .map(|&binvar| BoundRef::lower(binvar))
                    .collect::<Vec<_>>();
                context.report_conflict(HandlerKind::Linking, id, bounds);
                ResultCode::Cutoff
            },
            (_, zeros) if zeros == nr_binaries => {
                if constraint.modifiable {
                    self.constraints[id.0].add_cut = true;
                    ResultCode::DidNotFind
                } else {
                    let bounds = constraint.binvars.iter().map(|&binvar| BoundRef::upper(binvar)).collect::<Vec<_>>();
                    context.report_conflict(HandlerKind::Linking, id, bounds);
                    ResultCode::Cutoff
                }
            },
            (_, zeros) if zeros + 1 == nr_binaries => self.propagate_last_free(context, id),
            _ => self.tighten_integer(context, id),
        }
    }

    /// Exactly one binary variable is one: all others are zero and the integer variable takes its
    /// value.
    fn propagate_fixed_one(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        let constraint = &self.constraints[id.0];
        let intvar = constraint.intvar;
        let Some(position) = constraint.binvars.iter().position(|&b| context.problem.is_fixed_to_one(b)) else {
            return ResultCode::DidNotFind;
        };
        let one = constraint.binvars[position];
        let reason = Self::reason(id, Rule::OneFixed(one));
        let mut result = ResultCode::DidNotFind;

        for &binvar in &constraint.binvars {
            if binvar == one || context.problem.is_fixed_to_zero(binvar) {
                continue;
            }
            match context.infer_fix(binvar, 0f64, reason) {
                Tightening::Infeasible => {
                    context.report_conflict(HandlerKind::Linking, id, [BoundRef::lower(one), BoundRef::lower(binvar)]);
                    return ResultCode::Cutoff;
                },
                Tightening::Tightened => result = ResultCode::ReducedDomain,
                Tightening::Unchanged => {},
            }
        }

        let value = constraint.value_of(position);
        match context.infer_fix(intvar, value, reason) {
            Tightening::Infeasible => {
                let bound = if value < context.problem.lower(intvar) {
                    BoundRef::lower(intvar)
                } else {
                    BoundRef::upper(intvar)
                };
                context.report_conflict(HandlerKind::Linking, id, [BoundRef::lower(one), bound]);
                return ResultCode::Cutoff;
            },
            Tightening::Tightened => result = ResultCode::ReducedDomain,
            Tightening::Unchanged => {},
        }

        if !constraint.modifiable {
            self.disable(context, id);
        }

        result
    }

    /// All binary variables except one are zero: that one is one.
    fn propagate_last_free(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        let constraint = &self.constraints[id.0];
        let intvar = constraint.intvar;
        let Some(position) = constraint.binvars.iter().position(|&b| !context.problem.is_fixed_to_zero(b)) else {
            return ResultCode::DidNotFind;
        };
        let free = constraint.binvars[position];
        let reason = Self::reason(id, Rule::OthersZero(free));
        let zeros = constraint.binvars.iter()
            .filter(|&&binvar| binvar != free)
            .map(|&binvar| BoundRef::upper(binvar))
            .collect::<Vec<_>>();
        let mut result = ResultCode::DidNotFind;

        match context.infer_fix(free, 1f64, reason) {
            Tightening::Infeasible => {
                let bounds = zeros.into_iter().chain([BoundRef::upper(free)]);
                context.report_conflict(HandlerKind::Linking, id, bounds);
                return ResultCode::Cutoff;
            },
            Tightening::Tightened => result = ResultCode::ReducedDomain,
            Tightening::Unchanged => {},
        }

        let value = constraint.value_of(position);
        match context.infer_fix(intvar, value, reason) {
            Tightening::Infeasible => {
                let bound = if value < context.problem.lower(intvar) {
                    BoundRef::lower(intvar)
                } else {
                    BoundRef::upper(intvar)
                };
                context.report_conflict(HandlerKind::Linking, id, zeros.into_iter().chain([bound]));
                return ResultCode::Cutoff;
            },
            Tightening::Tightened => result = ResultCode::ReducedDomain,
            Tightening::Unchanged => {},
        }

        self.disable(context, id);
        result
    }

    /// Move the bounds of the integer variable inwards past values whose binary variables are
    /// fixed to zero.
    fn tighten_integer(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        let constraint = &self.constraints[id.0];
        let intvar = constraint.intvar;
        let lower = context.problem.lower(intvar);
        let upper = context.problem.upper(intvar);
        let first = constraint.clamped_position_of(lower);
        let last = constraint.clamped_position_of(upper);
        let is_zero = |position: usize| context.problem.is_fixed_to_zero(constraint.binvars[position]);

        let Some(new_first) = (first..=last).find(|&position| !is_zero(position)) else {
            let bounds = [BoundRef::lower(intvar), BoundRef::upper(intvar)].into_iter()
                .chain(constraint.binvars[first..=last].iter().map(|&binvar| BoundRef::upper(binvar)))
                .collect::<Vec<_>>();
            context.report_conflict(HandlerKind::Linking, id, bounds);
            return ResultCode::Cutoff;
        };
        let new_last = (new_first..=last).rev().find(|&position| !is_zero(position)).unwrap_or(new_first);
        let mut result = ResultCode::DidNotFind;

        for (direction, position, rule) in [
            (BoundDirection::Lower, new_first, Rule::TightenedLower),
            (BoundDirection::Upper, new_last, Rule::TightenedUpper),
        ] {
            let value = constraint.value_of(position);
            match context.infer_bound(intvar, direction, value, Self::reason(id, rule)) {
                Tightening::Infeasible => {
                    let bounds = [BoundRef::lower(intvar), BoundRef::upper(intvar)].into_iter()
                        .chain(constraint.binvars[first..=last].iter().map(|&binvar| BoundRef::upper(binvar)))
                        .collect::<Vec<_>>();
                    context.report_conflict(HandlerKind::Linking, id, bounds);
                    return ResultCode::Cutoff;
                },
                Tightening::Tightened => {
                    trace!("linking constraint {} moved {:?} bound of {} to {}", id, direction, intvar, value);
                    result = ResultCode::ReducedDomain;
                },
                Tightening::Unchanged => {},
            }
        }

        if context.settings.linking.remove_fixings && context.problem.depth() == 0 {
            self.remove_fixings(context, id);
        }

        result
    }

    /// Drop the binary variables at both ends that are globally fixed to zero.
    fn remove_fixings(&mut self, context: &mut Context, id: ConstraintId) {
        self.process_events(context);

        let constraint = &mut self.constraints[id.0];
        let is_zero = |binvar: &&VariableId| context.problem.global_upper(**binvar) < 0.5;
        let front = constraint.binvars.iter().take_while(is_zero).count();
        if front == constraint.binvars.len() {
            return;
        }
        let back = constraint.binvars[front..].iter().rev().take_while(is_zero).count();
        if front + back == 0 {
            return;
        }

        let end = constraint.binvars.len() - back;
        let mut removed = constraint.binvars.drain(end..).collect::<Vec<_>>();
        removed.extend(constraint.binvars.drain(..front));
        for binvar in removed {
            context.problem.add_locks(binvar, -1, -1);
        }
        let mut subscriptions = constraint.subscriptions.drain(end..).collect::<Vec<_>>();
        subscriptions.extend(constraint.subscriptions.drain(..front));
        for subscription in subscriptions {
            context.events.release(subscription);
        }

        constraint.nr_fixed_zeros -= front + back;
        constraint.offset += front as i64;
        constraint.nr_binaries = constraint.binvars.len();
        debug!(
            "linking constraint {} dropped {} binary variables fixed to zero, now [{}, {}]",
            id, front + back, constraint.offset, constraint.offset + constraint.nr_binaries as i64 - 1,
        );
    }

    /// Whether a solution satisfies a constraint.
    fn check_constraint(&self, context: &Context, id: ConstraintId, solution: &[f64]) -> bool {
        let constraint = &self.constraints[id.0];
        let problem = &context.problem;
        let tolerance = context.settings.feasibility_tolerance;
        let limit = 1f64 + 2f64 * context.settings.epsilon;

        let mut sum = 0f64;
        let mut weighted = 0f64;
        for (position, &binvar) in constraint.binvars.iter().enumerate() {
            let value = problem.value(binvar, solution);
            sum += value;
            weighted += constraint.value_of(position) * value;
            if sum > limit {
                return false;
            }
        }

        (sum - 1f64).abs() <= tolerance && (weighted - problem.value(constraint.intvar, solution)).abs() <= tolerance
    }

    /// The linear relaxation: `x - sum_i (offset + i) b_i = 0` and `sum_i b_i = 1`.
    fn rows(&self, context: &Context, id: ConstraintId) -> [Row; 2] {
        let constraint = &self.constraints[id.0];
        let name = context.problem.variable(constraint.intvar).name();

        let link = [(constraint.intvar, 1f64)].into_iter()
            .chain(constraint.binvars.iter().enumerate().map(|(i, &binvar)| (binvar, -constraint.value_of(i))))
            .collect();
        let partition = constraint.binvars.iter().map(|&binvar| (binvar, 1f64)).collect();

        [
            Row::new(format!("{}_link", name), 0f64, 0f64, link),
            Row::new(format!("{}_partition", name), 1f64, 1f64, partition),
        ]
    }

    /// Add both rows of a constraint to the cut pool.
    ///
    /// # Arguments
    ///
    /// * `solution`: If present, the rows are only added when one of them is violated.
    ///
    /// # Return value
    ///
    /// Whether the rows were added.
    fn add_rows(&mut self, context: &mut Context, id: ConstraintId, solution: Option<&[f64]>) -> bool {
        if self.constraints[id.0].rows_added {
            return false;
        }

        let rows = self.rows(context, id);
        if let Some(solution) = solution {
            let tolerance = context.settings.feasibility_tolerance;
            if rows.iter().all(|row| row.is_feasible(&context.problem, solution, tolerance)) {
                return false;
            }
        }
        for row in rows {
            if context.cuts.add_cut(row, None, &context.problem) {
                context.statistics.nr_cuts += 1;
            }
        }

        let constraint = &mut self.constraints[id.0];
        constraint.rows_added = true;
        constraint.add_cut = false;
        true
    }
}

impl ConstraintHandler for LinkingHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Linking
    }

    fn nr_constraints(&self) -> usize {
        self.constraints.iter().filter(|constraint| !constraint.deleted).count()
    }

    fn init_lp(&mut self, context: &mut Context) -> ResultCode {
        if !context.settings.linking.linearize {
            return ResultCode::DidNotRun;
        }
        self.create_all(context);

        let mut result = ResultCode::DidNotFind;
        for index in 0..self.constraints.len() {
            let id = ConstraintId(index);
            if self.is_active(id) && self.add_rows(context, id, None) {
                result = ResultCode::Separated;
            }
        }

        result
    }

    fn separate(&mut self, context: &mut Context, solution: &[f64]) -> ResultCode {
        self.create_all(context);

        let mut result = ResultCode::DidNotFind;
        for index in 0..self.constraints.len() {
            let id = ConstraintId(index);
            if !self.is_active(id) {
                continue;
            }
            let unconditional = self.constraints[id.0].add_cut;
            let solution = if unconditional { None } else { Some(solution) };
            if self.add_rows(context, id, solution) {
                result = ResultCode::Separated;
            }
        }

        result
    }

    fn enforce(&mut self, context: &mut Context, solution: &[f64]) -> ResultCode {
        self.create_all(context);
        self.process_events(context);

        let mut result = ResultCode::Feasible;
        for index in 0..self.constraints.len() {
            let id = ConstraintId(index);
            let constraint = &self.constraints[id.0];
            if constraint.deleted || !constraint.created || self.check_constraint(context, id, solution) {
                continue;
            }

            if self.is_active(id) {
                let propagated = self.propagate_constraint(context, id);
                if propagated.is_cutoff() {
                    return ResultCode::Cutoff;
                }
                if propagated == ResultCode::ReducedDomain {
                    result = result.combine(propagated);
                    continue;
                }
            }
            if self.add_rows(context, id, Some(solution)) {
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
            .filter(|&id| {
                let constraint = &self.constraints[id.0];
                constraint.created && !constraint.deleted
            })
            .all(|id| self.check_constraint(context, id, solution))
    }

    fn propagate(&mut self, context: &mut Context) -> ResultCode {
        self.create_all(context);
        self.process_events(context);

        let mut result = ResultCode::DidNotRun;
        while let Some(id) = self.queue.pop() {
            if !self.is_active(id) {
                continue;
            }

            result = result.combine(ResultCode::DidNotFind).combine(self.propagate_constraint(context, id));
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
        info: u64,
        change: &BoundChange,
        _position: usize,
    ) -> Vec<BoundRef> {
        let constraint = &self.constraints[constraint.0];
        let intvar = constraint.intvar;

        match Rule::decode(info) {
            Some(Rule::IntegerLower) => vec![BoundRef::lower(intvar)],
            Some(Rule::IntegerUpper) => vec![BoundRef::upper(intvar)],
            Some(Rule::IntegerFixed) => vec![BoundRef::lower(intvar), BoundRef::upper(intvar)],
            Some(Rule::OneFixed(one)) => vec![BoundRef::lower(one)],
            Some(Rule::OthersZero(free)) => constraint.binvars.iter()
                .filter(|&&binvar| binvar != free)
                .map(|&binvar| BoundRef::upper(binvar))
                .collect(),
            Some(Rule::TightenedLower) => [BoundRef::lower(intvar)].into_iter()
                .chain(constraint.zeros_between(change.old, change.new - 0.5))
                .collect(),
            Some(Rule::TightenedUpper) => [BoundRef::upper(intvar)].into_iter()
                .chain(constraint.zeros_between(change.new + 0.5, change.old))
                .collect(),
            None => Vec::new(),
        }
    }

    fn backtrack(&mut self, _context: &mut Context, depth: usize) {
        for (index, constraint) in self.constraints.iter_mut().enumerate() {
            if !constraint.deleted && constraint.disabled_at.is_some_and(|at| at > depth) {
                constraint.enabled = true;
                constraint.disabled_at = None;
                self.queue.push(ConstraintId(index));
                trace!("linking constraint c{} enabled again", index);
            }
        }
    }

    fn release_all(&mut self, context: &mut Context) {
        for constraint in &mut self.constraints {
            for subscription in constraint.subscriptions.drain(..).chain(constraint.intvar_subscription.take()) {
                context.events.release(subscription);
            }
        }
    }
}
