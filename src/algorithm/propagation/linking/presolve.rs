//! # Presolving linking constraints
//!
//! At the root node, propagation changes global bounds and disabling a constraint deletes it. On
//! top of that, two linking constraints whose integer variables are aggregated with scale one
//! describe the same values, so their binary variables can be aggregated pairwise.
use log::{debug, info};

use crate::algorithm::propagation::ResultCode;
use crate::algorithm::propagation::context::Context;
use crate::algorithm::propagation::linking::LinkingHandler;
use crate::data::problem::elements::Tightening;
use crate::data::problem::history::ConstraintId;
use crate::data::problem::variable::VariableStatus;

impl LinkingHandler {
    /// Propagate all constraints globally and merge constraints of aggregated variables.
    pub(super) fn presolve_constraints(
        &mut self,
        context: &mut Context,
        is_stopped: &dyn Fn() -> bool,
    ) -> ResultCode {
        debug_assert_eq!(context.problem.depth(), 0);

        self.create_all(context);
        let reductions_before = context.statistics.nr_domain_reductions;
        let deleted_before = context.statistics.nr_deleted;
        let aggregations_before = context.statistics.nr_aggregations;

        for index in 0..self.constraints.len() {
            if is_stopped() {
                debug!("linking presolving interrupted");
                break;
            }

            let id = ConstraintId(index);
            if !self.is_active(id) {
                continue;
            }
            self.process_events(context);
            if self.propagate_constraint(context, id).is_cutoff() {
                return ResultCode::Cutoff;
            }
            if self.is_active(id) && self.aggregate_binaries(context, id).is_cutoff() {
                return ResultCode::Cutoff;
            }
        }

        let nr_reductions = context.statistics.nr_domain_reductions - reductions_before;
        let nr_deleted = context.statistics.nr_deleted - deleted_before;
        let nr_aggregations = context.statistics.nr_aggregations - aggregations_before;
        info!(
            "linking presolving: {} bound changes, {} deleted constraints, {} aggregations",
            nr_reductions, nr_deleted, nr_aggregations,
        );

        if nr_reductions + nr_deleted + nr_aggregations > 0 {
            ResultCode::ReducedDomain
        } else {
            ResultCode::DidNotFind
        }
    }

    /// If the integer variable was aggregated to another linked integer variable with scale one,
    /// aggregate the binary variables of equal values and delete this constraint.
    ///
    /// Values of this constraint that the other constraint doesn't represent are fixed to zero.
    fn aggregate_binaries(&mut self, context: &mut Context, id: ConstraintId) -> ResultCode {
        let intvar = self.constraints[id.0].intvar;
        let (target, scale, constant) = context.problem.active_representation(intvar);
        if target == intvar || (scale - 1f64).abs() > context.settings.epsilon {
            return ResultCode::DidNotFind;
        }
        let Some(other) = self.find(target) else {
            return ResultCode::DidNotFind;
        };
        if other == id || !self.is_active(other) {
            return ResultCode::DidNotFind;
        }
        self.process_events(context);

        let (this, that) = (&self.constraints[id.0], &self.constraints[other.0]);
        let mut nr_aggregated = 0;
        for (position, &binvar) in this.binvars.iter().enumerate() {
            // intvar = target + constant
            let partner = that.position_of(this.value_of(position) - constant).map(|p| that.binvars[p]);
            let result = match partner {
                Some(partner) if partner != binvar => {
                    if context.problem.variable(binvar).status() != VariableStatus::Active {
                        continue;
                    }
                    nr_aggregated += 1;
                    context.problem.aggregate(binvar, partner, 1f64, 0f64)
                },
                Some(_) => Tightening::Unchanged,
                None => context.problem.tighten_upper(binvar, 0f64),
            };
            if result.is_infeasible() {
                debug!("aggregating the binary variables of {} and {} is infeasible", id, other);
                return ResultCode::Cutoff;
            }
        }

        context.statistics.nr_aggregations += nr_aggregated;
        debug!("linking constraint {} merged into {} with {} aggregations", id, other, nr_aggregated);
        self.delete(context, id);

        ResultCode::ReducedDomain
    }
}
