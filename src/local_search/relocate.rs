//! Relocate: move one stop to another route.

use crate::local_search::operator::{Operator, SearchContext};
use crate::solution::RawSolution;
use crate::Gain;

/// Move the stop at `source_rank` in `source_vehicle` to position
/// `target_rank` in `target_vehicle`'s route (`target_rank` ranges up to
/// the target route length, inclusive).
pub struct Relocate {
    pub source_vehicle: usize,
    pub source_rank: usize,
    pub target_vehicle: usize,
    pub target_rank: usize,
    stored_gain: Option<Gain>,
}

impl Relocate {
    pub fn new(
        source_vehicle: usize,
        source_rank: usize,
        target_vehicle: usize,
        target_rank: usize,
    ) -> Self {
        debug_assert!(source_vehicle != target_vehicle);
        Relocate {
            source_vehicle,
            source_rank,
            target_vehicle,
            target_rank,
            stored_gain: None,
        }
    }
}

impl Operator for Relocate {
    fn name(&self) -> &'static str {
        "relocate"
    }

    fn compute_gain(&mut self, ctx: &SearchContext) {
        debug_assert!(self.stored_gain.is_none());

        let removal_gain = ctx.state.node_gains[self.source_vehicle][self.source_rank];
        let insertion_cost = ctx.insertion_delta(
            self.target_vehicle,
            self.target_rank,
            ctx.sol[self.source_vehicle][self.source_rank],
        );

        self.stored_gain = Some(removal_gain - insertion_cost);
    }

    fn gain(&self) -> Gain {
        self.stored_gain.expect("gain not computed")
    }

    fn is_valid(&self, ctx: &SearchContext) -> bool {
        let job_rank = ctx.sol[self.source_vehicle][self.source_rank];

        if !ctx.state.node_skills[self.source_vehicle][self.source_rank]
            .is_subset(&ctx.input.vehicles()[self.target_vehicle].skills)
        {
            return false;
        }

        let target_load =
            ctx.state.total_amount(self.target_vehicle) + ctx.input.jobs()[job_rank].amount.clone();
        target_load.le(&ctx.input.vehicles()[self.target_vehicle].capacity)
    }

    fn apply(&self, sol: &mut RawSolution) {
        let job_rank = sol[self.source_vehicle].remove(self.source_rank);
        sol[self.target_vehicle].insert(self.target_rank, job_rank);
    }

    fn invalidation_set(&self) -> Vec<usize> {
        vec![self.source_vehicle, self.target_vehicle]
    }

    fn addition_candidates(&self) -> Vec<usize> {
        vec![self.source_vehicle]
    }
}
