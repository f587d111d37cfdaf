//! Intra-route exchange: swap two stops of one route.

use crate::local_search::operator::{Operator, SearchContext};
use crate::solution::RawSolution;
use crate::Gain;

/// Swap the stops at `source_rank` and `target_rank` (source < target)
/// within one vehicle's route.
pub struct Exchange {
    pub vehicle: usize,
    pub source_rank: usize,
    pub target_rank: usize,
    stored_gain: Option<Gain>,
}

impl Exchange {
    pub fn new(vehicle: usize, source_rank: usize, target_rank: usize) -> Self {
        debug_assert!(source_rank < target_rank);
        Exchange {
            vehicle,
            source_rank,
            target_rank,
            stored_gain: None,
        }
    }
}

impl Operator for Exchange {
    fn name(&self) -> &'static str {
        "exchange"
    }

    fn compute_gain(&mut self, ctx: &SearchContext) {
        debug_assert!(self.stored_gain.is_none());

        let v = self.vehicle;
        let s = self.source_rank;
        let t = self.target_rank;

        let gain = if t == s + 1 {
            // Swapping adjacent stops is an in-place edge reversal.
            ctx.state.edge_gains[v][s]
        } else {
            let j_s = Some(ctx.location(v, s));
            let j_t = Some(ctx.location(v, t));

            let old_cost = ctx.state.edge_costs_around[v][s] + ctx.state.edge_costs_around[v][t];
            let new_cost = ctx.leg(ctx.predecessor(v, s), j_t)
                + ctx.leg(j_t, ctx.successor(v, s))
                + ctx.leg(ctx.predecessor(v, t), j_s)
                + ctx.leg(j_s, ctx.successor(v, t));

            old_cost as Gain - new_cost as Gain
        };

        self.stored_gain = Some(gain);
    }

    fn gain(&self) -> Gain {
        self.stored_gain.expect("gain not computed")
    }

    fn is_valid(&self, _ctx: &SearchContext) -> bool {
        // Load and skills are unchanged within one route.
        true
    }

    fn apply(&self, sol: &mut RawSolution) {
        sol[self.vehicle].swap(self.source_rank, self.target_rank);
    }

    fn invalidation_set(&self) -> Vec<usize> {
        vec![self.vehicle]
    }

    fn addition_candidates(&self) -> Vec<usize> {
        Vec::new()
    }
}
