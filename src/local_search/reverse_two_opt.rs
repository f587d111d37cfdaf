//! Reverse 2-opt: exchange route pieces between two vehicles, reversing
//! them in transit.
//!
//! The source keeps its head and receives the target's head reversed; the
//! target keeps its tail and receives the source's tail reversed. This
//! covers crossings that plain tail exchange cannot undo when the two
//! routes run in opposite directions.

use crate::local_search::operator::{Operator, SearchContext};
use crate::solution::RawSolution;
use crate::{Cost, Gain};

/// Connect `source_vehicle`'s stops 0..=source_rank to the reversed
/// stops 0..=target_rank of `target_vehicle`, and the reversed stops
/// source_rank+1.. of the source to stops target_rank+1.. of the target.
pub struct ReverseTwoOpt {
    pub source_vehicle: usize,
    pub source_rank: usize,
    pub target_vehicle: usize,
    pub target_rank: usize,
    stored_gain: Option<Gain>,
}

impl ReverseTwoOpt {
    pub fn new(
        source_vehicle: usize,
        source_rank: usize,
        target_vehicle: usize,
        target_rank: usize,
    ) -> Self {
        debug_assert!(source_vehicle != target_vehicle);
        ReverseTwoOpt {
            source_vehicle,
            source_rank,
            target_vehicle,
            target_rank,
            stored_gain: None,
        }
    }
}

/// Cost of walking stops `high`, `high-1`, ..., `low` of route `v`.
fn reversed_inner_cost(ctx: &SearchContext, v: usize, low: usize, high: usize) -> Cost {
    let m = ctx.input.matrix();
    let mut cost = 0;
    for k in low + 1..=high {
        cost += m.get(ctx.location(v, k), ctx.location(v, k - 1));
    }
    cost
}

impl Operator for ReverseTwoOpt {
    fn name(&self) -> &'static str {
        "reverse_two_opt"
    }

    fn compute_gain(&mut self, ctx: &SearchContext) {
        debug_assert!(self.stored_gain.is_none());

        let (s_v, s_r) = (self.source_vehicle, self.source_rank);
        let (t_v, t_r) = (self.target_vehicle, self.target_rank);
        let source_len = ctx.sol[s_v].len();
        let target_len = ctx.sol[t_v].len();
        let source = &ctx.input.vehicles()[s_v];
        let target = &ctx.input.vehicles()[t_v];
        let m = ctx.input.matrix();

        // Source route: kept head, then the target's head walked in
        // reverse, ending at the target's former first stop.
        let new_source_cost = ctx.state.fwd_costs[s_v][s_r]
            + m.get(ctx.location(s_v, s_r), ctx.location(t_v, t_r))
            + reversed_inner_cost(ctx, t_v, 0, t_r)
            + ctx.leg(Some(ctx.location(t_v, 0)), source.end);

        // Target route: the source's tail walked in reverse, then the
        // kept target tail.
        let source_tail_empty = s_r + 1 >= source_len;
        let target_tail_empty = t_r + 1 >= target_len;

        let new_target_cost = if source_tail_empty && target_tail_empty {
            0
        } else if source_tail_empty {
            let inner = ctx.state.fwd_costs[t_v][target_len - 1]
                - ctx.state.fwd_costs[t_v][t_r + 1];
            ctx.leg(target.start, Some(ctx.location(t_v, t_r + 1)))
                + inner
                + ctx.leg(Some(ctx.location(t_v, target_len - 1)), target.end)
        } else {
            let mut cost = ctx.leg(target.start, Some(ctx.location(s_v, source_len - 1)))
                + reversed_inner_cost(ctx, s_v, s_r + 1, source_len - 1);
            if target_tail_empty {
                cost += ctx.leg(Some(ctx.location(s_v, s_r + 1)), target.end);
            } else {
                let inner = ctx.state.fwd_costs[t_v][target_len - 1]
                    - ctx.state.fwd_costs[t_v][t_r + 1];
                cost += m.get(ctx.location(s_v, s_r + 1), ctx.location(t_v, t_r + 1))
                    + inner
                    + ctx.leg(Some(ctx.location(t_v, target_len - 1)), target.end);
            }
            cost
        };

        let old_cost = ctx.state.route_costs[s_v] + ctx.state.route_costs[t_v];
        self.stored_gain =
            Some(old_cost as Gain - (new_source_cost + new_target_cost) as Gain);
    }

    fn gain(&self) -> Gain {
        self.stored_gain.expect("gain not computed")
    }

    fn is_valid(&self, ctx: &SearchContext) -> bool {
        let (s_v, s_r) = (self.source_vehicle, self.source_rank);
        let (t_v, t_r) = (self.target_vehicle, self.target_rank);
        let source = &ctx.input.vehicles()[s_v];
        let target = &ctx.input.vehicles()[t_v];

        for rank in 0..=t_r {
            if !ctx.state.node_skills[t_v][rank].is_subset(&source.skills) {
                return false;
            }
        }
        for rank in s_r + 1..ctx.sol[s_v].len() {
            if !ctx.state.node_skills[s_v][rank].is_subset(&target.skills) {
                return false;
            }
        }

        let zero = ctx.input.zero_amount();
        let source_load = ctx.state.fwd_amounts[s_v][s_r].clone()
            + ctx.state.fwd_amounts[t_v][t_r].clone();
        let source_tail_amount = if s_r + 1 < ctx.sol[s_v].len() {
            ctx.state.bwd_amounts[s_v][s_r + 1].clone()
        } else {
            zero.clone()
        };
        let target_tail_amount = if t_r + 1 < ctx.sol[t_v].len() {
            ctx.state.bwd_amounts[t_v][t_r + 1].clone()
        } else {
            zero
        };
        let target_load = source_tail_amount + target_tail_amount;

        source_load.le(&source.capacity) && target_load.le(&target.capacity)
    }

    fn apply(&self, sol: &mut RawSolution) {
        let source_tail = sol[self.source_vehicle].split_off(self.source_rank + 1);
        let target_head: Vec<usize> = sol[self.target_vehicle]
            .drain(0..=self.target_rank)
            .collect();

        sol[self.source_vehicle].extend(target_head.into_iter().rev());

        let target_tail = std::mem::take(&mut sol[self.target_vehicle]);
        let mut new_target: Vec<usize> = source_tail.into_iter().rev().collect();
        new_target.extend(target_tail);
        sol[self.target_vehicle] = new_target;
    }

    fn invalidation_set(&self) -> Vec<usize> {
        vec![self.source_vehicle, self.target_vehicle]
    }

    fn addition_candidates(&self) -> Vec<usize> {
        vec![self.source_vehicle, self.target_vehicle]
    }
}
