//! Or-opt: move a chain of consecutive stops to another route.

use crate::local_search::operator::{Operator, SearchContext};
use crate::solution::RawSolution;
use crate::Gain;

/// Move the `length` consecutive stops starting at `source_rank` in
/// `source_vehicle` to position `target_rank` in `target_vehicle`'s
/// route. Chains keep their internal order.
pub struct OrOpt {
    pub source_vehicle: usize,
    pub source_rank: usize,
    pub target_vehicle: usize,
    pub target_rank: usize,
    pub length: usize,
    stored_gain: Option<Gain>,
}

impl OrOpt {
    pub fn new(
        source_vehicle: usize,
        source_rank: usize,
        target_vehicle: usize,
        target_rank: usize,
        length: usize,
    ) -> Self {
        debug_assert!(source_vehicle != target_vehicle);
        debug_assert!(length >= 2);
        OrOpt {
            source_vehicle,
            source_rank,
            target_vehicle,
            target_rank,
            length,
            stored_gain: None,
        }
    }

    fn last_rank(&self) -> usize {
        self.source_rank + self.length - 1
    }
}

impl Operator for OrOpt {
    fn name(&self) -> &'static str {
        "or_opt"
    }

    fn compute_gain(&mut self, ctx: &SearchContext) {
        debug_assert!(self.stored_gain.is_none());

        let (s_v, s_r) = (self.source_vehicle, self.source_rank);
        let first = Some(ctx.location(s_v, s_r));
        let last = Some(ctx.location(s_v, self.last_rank()));
        let prev = ctx.predecessor(s_v, s_r);
        let next = ctx.successor(s_v, self.last_rank());

        // Edges inside the chain travel with it, so only the boundary
        // legs change on either side.
        let removal_gain = (ctx.leg(prev, first) + ctx.leg(last, next)) as Gain
            - ctx.leg(prev, next) as Gain;

        let t_v = self.target_vehicle;
        let slot = self.target_rank;
        let t_prev = if slot > 0 {
            Some(ctx.location(t_v, slot - 1))
        } else {
            ctx.input.vehicles()[t_v].start
        };
        let t_next = if slot < ctx.sol[t_v].len() {
            Some(ctx.location(t_v, slot))
        } else {
            ctx.input.vehicles()[t_v].end
        };

        let insertion_cost = (ctx.leg(t_prev, first) + ctx.leg(last, t_next)) as Gain
            - ctx.leg(t_prev, t_next) as Gain;

        self.stored_gain = Some(removal_gain - insertion_cost);
    }

    fn gain(&self) -> Gain {
        self.stored_gain.expect("gain not computed")
    }

    fn is_valid(&self, ctx: &SearchContext) -> bool {
        let (s_v, s_r) = (self.source_vehicle, self.source_rank);
        let t_v = self.target_vehicle;

        for rank in s_r..=self.last_rank() {
            if !ctx.state.node_skills[s_v][rank].is_subset(&ctx.input.vehicles()[t_v].skills) {
                return false;
            }
        }

        let chain_amount = if s_r > 0 {
            ctx.state.fwd_amounts[s_v][self.last_rank()].clone()
                - ctx.state.fwd_amounts[s_v][s_r - 1].clone()
        } else {
            ctx.state.fwd_amounts[s_v][self.last_rank()].clone()
        };

        let target_load = ctx.state.total_amount(t_v) + chain_amount;
        target_load.le(&ctx.input.vehicles()[t_v].capacity)
    }

    fn apply(&self, sol: &mut RawSolution) {
        let chain: Vec<usize> = sol[self.source_vehicle]
            .drain(self.source_rank..self.source_rank + self.length)
            .collect();
        for (offset, job_rank) in chain.into_iter().enumerate() {
            sol[self.target_vehicle].insert(self.target_rank + offset, job_rank);
        }
    }

    fn invalidation_set(&self) -> Vec<usize> {
        vec![self.source_vehicle, self.target_vehicle]
    }

    fn addition_candidates(&self) -> Vec<usize> {
        vec![self.source_vehicle]
    }
}
