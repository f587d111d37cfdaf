//! Derived per-route quantities, kept consistent with the current
//! solution under an explicit invalidate-and-recompute discipline.
//!
//! Every array is either valid for its vehicle or stale. Mutations mark
//! vehicles stale through [`SolutionState::invalidate`]; a subsequent
//! [`SolutionState::refresh`] recomputes all stale vehicles in one linear
//! pass each. Reads must only happen on refreshed state.

use crate::input::{Amount, Input, SkillSet};
use crate::matrix::Matrix;
use crate::solution::RawSolution;
use crate::{Cost, Gain};

/// Travel cost of a leg, where either endpoint may be absent (open route
/// boundary).
fn leg(m: &Matrix, from: Option<usize>, to: Option<usize>) -> Cost {
    match (from, to) {
        (Some(i), Some(j)) => m.get(i, j),
        _ => 0,
    }
}

/// Per-vehicle caches over the working solution.
#[derive(Debug)]
pub struct SolutionState {
    /// fwd_costs[v][k]: cost from v's start through stops 0..=k.
    pub fwd_costs: Vec<Vec<Cost>>,
    /// bwd_costs[v][k]: cost from stop k through v's end.
    pub bwd_costs: Vec<Vec<Cost>>,
    /// fwd_amounts[v][k]: cumulative load over stops 0..=k.
    pub fwd_amounts: Vec<Vec<Amount>>,
    /// bwd_amounts[v][k]: cumulative load over stops k..end of route.
    pub bwd_amounts: Vec<Vec<Amount>>,
    /// node_gains[v][k]: travel cost saved by removing stop k.
    pub node_gains: Vec<Vec<Gain>>,
    /// edge_gains[v][k]: cost saved by reversing stops (k, k+1) in place.
    pub edge_gains: Vec<Vec<Gain>>,
    /// edge_costs_around[v][k]: c(prev, k) + c(k, next).
    pub edge_costs_around: Vec<Vec<Cost>>,
    /// node_skills[v][k]: skills of the job at stop k.
    pub node_skills: Vec<Vec<SkillSet>>,
    /// route_costs[v]: full cost of v's route including start/end legs.
    pub route_costs: Vec<Cost>,
    /// nearest_job_rank_in_routes[v1][v2][k]: rank in v2's route whose job
    /// is closest to v1's stop k.
    nearest_job_rank_in_routes: Vec<Vec<Vec<usize>>>,
    nearest_valid: Vec<Vec<bool>>,
    stale: Vec<bool>,
    zero_amount: Amount,
}

impl SolutionState {
    /// Allocate caches for `v` vehicles, all initially stale.
    pub fn new(input: &Input) -> Self {
        let v = input.vehicles().len();

        SolutionState {
            fwd_costs: vec![Vec::new(); v],
            bwd_costs: vec![Vec::new(); v],
            fwd_amounts: vec![Vec::new(); v],
            bwd_amounts: vec![Vec::new(); v],
            node_gains: vec![Vec::new(); v],
            edge_gains: vec![Vec::new(); v],
            edge_costs_around: vec![Vec::new(); v],
            node_skills: vec![Vec::new(); v],
            route_costs: vec![0; v],
            nearest_job_rank_in_routes: vec![vec![Vec::new(); v]; v],
            nearest_valid: vec![vec![false; v]; v],
            stale: vec![true; v],
            zero_amount: input.zero_amount(),
        }
    }

    /// Mark all derived arrays for `vehicle_rank` stale, along with every
    /// nearest-rank table involving it.
    pub fn invalidate(&mut self, vehicle_rank: usize) {
        self.stale[vehicle_rank] = true;

        let v = self.stale.len();
        for other in 0..v {
            self.nearest_valid[vehicle_rank][other] = false;
            self.nearest_valid[other][vehicle_rank] = false;
        }
    }

    /// Recompute every stale vehicle's arrays from the current solution.
    pub fn refresh(&mut self, sol: &RawSolution, input: &Input) {
        for v in 0..self.stale.len() {
            if self.stale[v] {
                self.update_costs(v, &sol[v], input);
                self.update_amounts(v, &sol[v], input);
                self.update_skills(v, &sol[v], input);
                self.set_node_gains(v, &sol[v], input);
                self.set_edge_gains(v, &sol[v], input);
                self.stale[v] = false;
            }
        }
    }

    /// Total load carried on `vehicle_rank`'s route.
    pub fn total_amount(&self, vehicle_rank: usize) -> Amount {
        debug_assert!(!self.stale[vehicle_rank]);
        self.fwd_amounts[vehicle_rank]
            .last()
            .cloned()
            .unwrap_or_else(|| self.zero_amount.clone())
    }

    /// Ensure the nearest-rank table for the ordered pair (v1, v2) is
    /// valid, recomputing it on touch.
    pub fn update_nearest_job_rank_in_routes(
        &mut self,
        v1: usize,
        v2: usize,
        sol: &RawSolution,
        input: &Input,
    ) {
        if self.nearest_valid[v1][v2] {
            return;
        }

        let m = input.matrix();
        let table = &mut self.nearest_job_rank_in_routes[v1][v2];
        table.clear();

        for &job_rank in &sol[v1] {
            let from = input.jobs()[job_rank].index;
            let mut best_rank = 0;
            let mut best_cost = Cost::MAX;

            for (rank, &other_rank) in sol[v2].iter().enumerate() {
                let cost = m.get(from, input.jobs()[other_rank].index);
                if cost < best_cost {
                    best_cost = cost;
                    best_rank = rank;
                }
            }
            table.push(best_rank);
        }

        self.nearest_valid[v1][v2] = true;
    }

    /// Rank in v2's route whose job is closest to v1's stop `rank`. The
    /// pair must have been updated since the last mutation of either
    /// vehicle.
    pub fn nearest_job_rank(&self, v1: usize, v2: usize, rank: usize) -> usize {
        debug_assert!(self.nearest_valid[v1][v2]);
        self.nearest_job_rank_in_routes[v1][v2][rank]
    }

    fn update_costs(&mut self, v: usize, route: &[usize], input: &Input) {
        let m = input.matrix();
        let vehicle = &input.vehicles()[v];
        let n = route.len();

        let fwd = &mut self.fwd_costs[v];
        let bwd = &mut self.bwd_costs[v];
        fwd.clear();
        bwd.clear();
        fwd.resize(n, 0);
        bwd.resize(n, 0);

        if n == 0 {
            self.route_costs[v] = 0;
            return;
        }

        let index = |k: usize| input.jobs()[route[k]].index;

        fwd[0] = leg(m, vehicle.start, Some(index(0)));
        for k in 1..n {
            fwd[k] = fwd[k - 1] + m.get(index(k - 1), index(k));
        }

        bwd[n - 1] = leg(m, Some(index(n - 1)), vehicle.end);
        for k in (0..n - 1).rev() {
            bwd[k] = m.get(index(k), index(k + 1)) + bwd[k + 1];
        }

        self.route_costs[v] = fwd[0] + bwd[0];
    }

    fn update_amounts(&mut self, v: usize, route: &[usize], input: &Input) {
        let n = route.len();

        let fwd = &mut self.fwd_amounts[v];
        let bwd = &mut self.bwd_amounts[v];
        fwd.clear();
        bwd.clear();

        let mut acc = self.zero_amount.clone();
        for &job_rank in route {
            acc += &input.jobs()[job_rank].amount;
            fwd.push(acc.clone());
        }

        let mut acc = self.zero_amount.clone();
        bwd.resize(n, self.zero_amount.clone());
        for k in (0..n).rev() {
            acc += &input.jobs()[route[k]].amount;
            bwd[k] = acc.clone();
        }
    }

    fn update_skills(&mut self, v: usize, route: &[usize], input: &Input) {
        let skills = &mut self.node_skills[v];
        skills.clear();
        for &job_rank in route {
            skills.push(input.jobs()[job_rank].skills.clone());
        }
    }

    fn set_node_gains(&mut self, v: usize, route: &[usize], input: &Input) {
        let m = input.matrix();
        let vehicle = &input.vehicles()[v];
        let n = route.len();

        let gains = &mut self.node_gains[v];
        let around = &mut self.edge_costs_around[v];
        gains.clear();
        around.clear();

        let index = |k: usize| input.jobs()[route[k]].index;

        for k in 0..n {
            let prev = if k > 0 { Some(index(k - 1)) } else { vehicle.start };
            let next = if k + 1 < n {
                Some(index(k + 1))
            } else {
                vehicle.end
            };

            let old_cost = leg(m, prev, Some(index(k))) + leg(m, Some(index(k)), next);
            let new_cost = leg(m, prev, next);

            around.push(old_cost);
            gains.push(old_cost as Gain - new_cost as Gain);
        }
    }

    fn set_edge_gains(&mut self, v: usize, route: &[usize], input: &Input) {
        let m = input.matrix();
        let vehicle = &input.vehicles()[v];
        let n = route.len();

        let gains = &mut self.edge_gains[v];
        gains.clear();

        if n < 2 {
            return;
        }

        let index = |k: usize| input.jobs()[route[k]].index;

        for k in 0..n - 1 {
            let prev = if k > 0 { Some(index(k - 1)) } else { vehicle.start };
            let next = if k + 2 < n {
                Some(index(k + 2))
            } else {
                vehicle.end
            };

            let old_cost = leg(m, prev, Some(index(k)))
                + m.get(index(k), index(k + 1))
                + leg(m, Some(index(k + 1)), next);
            let new_cost = leg(m, prev, Some(index(k + 1)))
                + m.get(index(k + 1), index(k))
                + leg(m, Some(index(k)), next);

            gains.push(old_cost as Gain - new_cost as Gain);
        }
    }
}
