//! Cross-exchange: swap one stop between two routes.

use crate::local_search::operator::{Operator, SearchContext};
use crate::solution::RawSolution;
use crate::Gain;

/// Swap the stop at `source_rank` in `source_vehicle` with the stop at
/// `target_rank` in `target_vehicle`.
pub struct CrossExchange {
    pub source_vehicle: usize,
    pub source_rank: usize,
    pub target_vehicle: usize,
    pub target_rank: usize,
    stored_gain: Option<Gain>,
}

impl CrossExchange {
    pub fn new(
        source_vehicle: usize,
        source_rank: usize,
        target_vehicle: usize,
        target_rank: usize,
    ) -> Self {
        debug_assert!(source_vehicle != target_vehicle);
        CrossExchange {
            source_vehicle,
            source_rank,
            target_vehicle,
            target_rank,
            stored_gain: None,
        }
    }
}

impl Operator for CrossExchange {
    fn name(&self) -> &'static str {
        "cross_exchange"
    }

    fn compute_gain(&mut self, ctx: &SearchContext) {
        debug_assert!(self.stored_gain.is_none());

        let (s_v, s_r) = (self.source_vehicle, self.source_rank);
        let (t_v, t_r) = (self.target_vehicle, self.target_rank);

        let j_s = Some(ctx.location(s_v, s_r));
        let j_t = Some(ctx.location(t_v, t_r));

        // Replace each stop by the other within its former slot; the
        // surrounding stops stay put since the routes are distinct.
        let old_cost =
            ctx.state.edge_costs_around[s_v][s_r] + ctx.state.edge_costs_around[t_v][t_r];
        let new_cost = ctx.leg(ctx.predecessor(s_v, s_r), j_t)
            + ctx.leg(j_t, ctx.successor(s_v, s_r))
            + ctx.leg(ctx.predecessor(t_v, t_r), j_s)
            + ctx.leg(j_s, ctx.successor(t_v, t_r));

        self.stored_gain = Some(old_cost as Gain - new_cost as Gain);
    }

    fn gain(&self) -> Gain {
        self.stored_gain.expect("gain not computed")
    }

    fn is_valid(&self, ctx: &SearchContext) -> bool {
        let (s_v, s_r) = (self.source_vehicle, self.source_rank);
        let (t_v, t_r) = (self.target_vehicle, self.target_rank);

        let source_skills = &ctx.state.node_skills[s_v][s_r];
        let target_skills = &ctx.state.node_skills[t_v][t_r];
        if !source_skills.is_subset(&ctx.input.vehicles()[t_v].skills)
            || !target_skills.is_subset(&ctx.input.vehicles()[s_v].skills)
        {
            return false;
        }

        let source_amount = &ctx.input.jobs()[ctx.sol[s_v][s_r]].amount;
        let target_amount = &ctx.input.jobs()[ctx.sol[t_v][t_r]].amount;

        let source_load =
            ctx.state.total_amount(s_v) - source_amount.clone() + target_amount.clone();
        let target_load =
            ctx.state.total_amount(t_v) - target_amount.clone() + source_amount.clone();

        source_load.le(&ctx.input.vehicles()[s_v].capacity)
            && target_load.le(&ctx.input.vehicles()[t_v].capacity)
    }

    fn apply(&self, sol: &mut RawSolution) {
        let source_job = sol[self.source_vehicle][self.source_rank];
        let target_job = sol[self.target_vehicle][self.target_rank];
        sol[self.source_vehicle][self.source_rank] = target_job;
        sol[self.target_vehicle][self.target_rank] = source_job;
    }

    fn invalidation_set(&self) -> Vec<usize> {
        vec![self.source_vehicle, self.target_vehicle]
    }

    fn addition_candidates(&self) -> Vec<usize> {
        vec![self.source_vehicle, self.target_vehicle]
    }
}
