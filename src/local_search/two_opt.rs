//! 2-opt: exchange route tails between two vehicles.

use crate::input::Amount;
use crate::local_search::operator::{Operator, SearchContext};
use crate::solution::RawSolution;
use crate::{Cost, Gain};

/// Exchange the tail starting at `source_rank` in `source_vehicle` with
/// the tail starting at `target_rank` in `target_vehicle`. A rank equal
/// to the route length denotes an empty tail.
pub struct TwoOpt {
    pub source_vehicle: usize,
    pub source_rank: usize,
    pub target_vehicle: usize,
    pub target_rank: usize,
    stored_gain: Option<Gain>,
}

impl TwoOpt {
    pub fn new(
        source_vehicle: usize,
        source_rank: usize,
        target_vehicle: usize,
        target_rank: usize,
    ) -> Self {
        debug_assert!(source_vehicle != target_vehicle);
        TwoOpt {
            source_vehicle,
            source_rank,
            target_vehicle,
            target_rank,
            stored_gain: None,
        }
    }
}

/// Cost of keeping `keeper`'s first `head_rank` stops and appending the
/// donor's tail starting at `donor_rank`, under `keeper`'s start and end.
fn spliced_cost(
    ctx: &SearchContext,
    keeper: usize,
    head_rank: usize,
    donor: usize,
    donor_rank: usize,
) -> Cost {
    let donor_len = ctx.sol[donor].len();
    let tail_empty = donor_rank >= donor_len;

    if head_rank == 0 && tail_empty {
        // Resulting route is empty: the vehicle stays parked.
        return 0;
    }

    let keeper_vehicle = &ctx.input.vehicles()[keeper];
    let prev = if head_rank > 0 {
        Some(ctx.location(keeper, head_rank - 1))
    } else {
        keeper_vehicle.start
    };
    let head_cost = if head_rank > 0 {
        ctx.state.fwd_costs[keeper][head_rank - 1]
    } else {
        0
    };

    if tail_empty {
        return head_cost + ctx.leg(prev, keeper_vehicle.end);
    }

    let first = Some(ctx.location(donor, donor_rank));
    let last = Some(ctx.location(donor, donor_len - 1));
    // Edges inside the tail, read off the backward cost prefix (the
    // donor's own end leg cancels out).
    let tail_inner =
        ctx.state.bwd_costs[donor][donor_rank] - ctx.state.bwd_costs[donor][donor_len - 1];

    head_cost + ctx.leg(prev, first) + tail_inner + ctx.leg(last, keeper_vehicle.end)
}

fn head_amount(ctx: &SearchContext, v: usize, rank: usize, zero: &Amount) -> Amount {
    if rank > 0 {
        ctx.state.fwd_amounts[v][rank - 1].clone()
    } else {
        zero.clone()
    }
}

fn tail_amount(ctx: &SearchContext, v: usize, rank: usize, zero: &Amount) -> Amount {
    if rank < ctx.sol[v].len() {
        ctx.state.bwd_amounts[v][rank].clone()
    } else {
        zero.clone()
    }
}

fn tail_skills_ok(ctx: &SearchContext, donor: usize, donor_rank: usize, keeper: usize) -> bool {
    let keeper_skills = &ctx.input.vehicles()[keeper].skills;
    (donor_rank..ctx.sol[donor].len())
        .all(|rank| ctx.state.node_skills[donor][rank].is_subset(keeper_skills))
}

impl Operator for TwoOpt {
    fn name(&self) -> &'static str {
        "two_opt"
    }

    fn compute_gain(&mut self, ctx: &SearchContext) {
        debug_assert!(self.stored_gain.is_none());

        let (s_v, s_r) = (self.source_vehicle, self.source_rank);
        let (t_v, t_r) = (self.target_vehicle, self.target_rank);

        let old_cost = ctx.state.route_costs[s_v] + ctx.state.route_costs[t_v];
        let new_cost =
            spliced_cost(ctx, s_v, s_r, t_v, t_r) + spliced_cost(ctx, t_v, t_r, s_v, s_r);

        self.stored_gain = Some(old_cost as Gain - new_cost as Gain);
    }

    fn gain(&self) -> Gain {
        self.stored_gain.expect("gain not computed")
    }

    fn is_valid(&self, ctx: &SearchContext) -> bool {
        let (s_v, s_r) = (self.source_vehicle, self.source_rank);
        let (t_v, t_r) = (self.target_vehicle, self.target_rank);
        let zero = ctx.input.zero_amount();

        let source_load = head_amount(ctx, s_v, s_r, &zero) + tail_amount(ctx, t_v, t_r, &zero);
        let target_load = head_amount(ctx, t_v, t_r, &zero) + tail_amount(ctx, s_v, s_r, &zero);

        source_load.le(&ctx.input.vehicles()[s_v].capacity)
            && target_load.le(&ctx.input.vehicles()[t_v].capacity)
            && tail_skills_ok(ctx, t_v, t_r, s_v)
            && tail_skills_ok(ctx, s_v, s_r, t_v)
    }

    fn apply(&self, sol: &mut RawSolution) {
        let source_tail = sol[self.source_vehicle].split_off(self.source_rank);
        let target_tail = sol[self.target_vehicle].split_off(self.target_rank);
        sol[self.source_vehicle].extend(target_tail);
        sol[self.target_vehicle].extend(source_tail);
    }

    fn invalidation_set(&self) -> Vec<usize> {
        vec![self.source_vehicle, self.target_vehicle]
    }

    fn addition_candidates(&self) -> Vec<usize> {
        vec![self.source_vehicle, self.target_vehicle]
    }
}
