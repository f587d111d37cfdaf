//! Intra-route or-opt: move a chain of consecutive stops within a route.

use crate::local_search::operator::{Operator, SearchContext};
use crate::solution::RawSolution;
use crate::Gain;

/// Move the `length` consecutive stops starting at `source_rank` to
/// position `target_rank` of the same route, where `target_rank` indexes
/// the route after the chain's removal.
pub struct IntraOrOpt {
    pub vehicle: usize,
    pub source_rank: usize,
    pub target_rank: usize,
    pub length: usize,
    stored_gain: Option<Gain>,
}

impl IntraOrOpt {
    pub fn new(vehicle: usize, source_rank: usize, target_rank: usize, length: usize) -> Self {
        debug_assert!(length >= 2);
        debug_assert!(source_rank != target_rank);
        IntraOrOpt {
            vehicle,
            source_rank,
            target_rank,
            length,
            stored_gain: None,
        }
    }

    fn last_rank(&self) -> usize {
        self.source_rank + self.length - 1
    }
}

impl Operator for IntraOrOpt {
    fn name(&self) -> &'static str {
        "intra_or_opt"
    }

    fn compute_gain(&mut self, ctx: &SearchContext) {
        debug_assert!(self.stored_gain.is_none());

        let v = self.vehicle;
        let route = &ctx.sol[v];
        let vehicle = &ctx.input.vehicles()[v];
        let m = ctx.input.matrix();

        let first = Some(ctx.location(v, self.source_rank));
        let last = Some(ctx.location(v, self.last_rank()));
        let prev = ctx.predecessor(v, self.source_rank);
        let next = ctx.successor(v, self.last_rank());

        let removal_gain = (ctx.leg(prev, first) + ctx.leg(last, next)) as Gain
            - ctx.leg(prev, next) as Gain;

        // Insertion neighbors come from the route with the chain removed.
        let location_at = |rank: usize| -> usize {
            let shifted = if rank < self.source_rank {
                rank
            } else {
                rank + self.length
            };
            ctx.input.jobs()[route[shifted]].index
        };
        let shortened_len = route.len() - self.length;

        let t_prev = if self.target_rank > 0 {
            Some(location_at(self.target_rank - 1))
        } else {
            vehicle.start
        };
        let t_next = if self.target_rank < shortened_len {
            Some(location_at(self.target_rank))
        } else {
            vehicle.end
        };

        let leg = |a: Option<usize>, b: Option<usize>| match (a, b) {
            (Some(i), Some(j)) => m.get(i, j),
            _ => 0,
        };
        let insertion_cost = (leg(t_prev, first) + leg(last, t_next)) as Gain
            - leg(t_prev, t_next) as Gain;

        self.stored_gain = Some(removal_gain - insertion_cost);
    }

    fn gain(&self) -> Gain {
        self.stored_gain.expect("gain not computed")
    }

    fn is_valid(&self, _ctx: &SearchContext) -> bool {
        // Load and skills are unchanged within one route.
        true
    }

    fn apply(&self, sol: &mut RawSolution) {
        let chain: Vec<usize> = sol[self.vehicle]
            .drain(self.source_rank..self.source_rank + self.length)
            .collect();
        for (offset, job_rank) in chain.into_iter().enumerate() {
            sol[self.vehicle].insert(self.target_rank + offset, job_rank);
        }
    }

    fn invalidation_set(&self) -> Vec<usize> {
        vec![self.vehicle]
    }

    fn addition_candidates(&self) -> Vec<usize> {
        Vec::new()
    }
}
