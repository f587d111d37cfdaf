//! Local-search driver for the CVRP engine.
//!
//! Holds the working solution and its derived caches, enumerates the
//! operator family in a fixed lexicographic order, applies the best-gain
//! feasible move, re-inserts unassigned jobs with a regret heuristic and
//! re-orders grown routes with the Christofides refiner, tracking the
//! best solution seen.

pub mod cross_exchange;
pub mod exchange;
pub mod intra_or_opt;
pub mod operator;
pub mod or_opt;
pub mod relocate;
pub mod reverse_two_opt;
pub mod two_opt;

use log::{debug, trace, warn};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::input::Input;
use crate::local_search::cross_exchange::CrossExchange;
use crate::local_search::exchange::Exchange;
use crate::local_search::intra_or_opt::IntraOrOpt;
use crate::local_search::operator::{Operator, SearchContext};
use crate::local_search::or_opt::OrOpt;
use crate::local_search::relocate::Relocate;
use crate::local_search::reverse_two_opt::ReverseTwoOpt;
use crate::local_search::two_opt::TwoOpt;
use crate::matrix::Matrix;
use crate::solution::{check_solution, route_cost_for_vehicle, RawSolution, SolutionIndicators};
use crate::solution_state::SolutionState;
use crate::tsp::christofides;
use crate::{Cost, Gain};

/// Chain lengths tried by the or-opt moves.
const OR_OPT_LENGTHS: [usize; 2] = [2, 3];

/// Sentinel second-best insertion delta for jobs feasible in a single
/// route.
const REGRET_SENTINEL: Gain = i64::MAX / 4;

/// Emitted after each accepted operator application.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub iteration: usize,
    pub operator_name: &'static str,
    pub gain: Gain,
    pub new_cost: Cost,
}

/// Callback invoked after each accepted operator application.
pub type LogCallback = Box<dyn FnMut(&LogEvent)>;

/// The CVRP local-search engine. Owns a working copy of the solution and
/// all derived caches for the duration of one run.
pub struct LocalSearch<'a> {
    input: &'a Input,
    target_sol: &'a mut RawSolution,
    sol: RawSolution,
    sol_state: SolutionState,
    unassigned: BTreeSet<usize>,
    best_sol: RawSolution,
    best_indicators: SolutionIndicators,
    config: Config,
    cancel: Option<Arc<AtomicBool>>,
    log_callback: Option<LogCallback>,
    ls_step: usize,
    last_refined_len: Vec<usize>,
}

impl<'a> LocalSearch<'a> {
    /// Bind the engine to an input and an initial solution. The initial
    /// solution is checked for capacity and skill feasibility; jobs it
    /// leaves out form the initial unassigned set. `run` writes the best
    /// solution found back into `sol`.
    pub fn new(input: &'a Input, sol: &'a mut RawSolution, config: Config) -> Result<Self> {
        check_solution(input, sol)?;

        let working = sol.clone();
        let mut assigned = vec![false; input.jobs().len()];
        for route in &working {
            for &job_rank in route {
                assigned[job_rank] = true;
            }
        }
        let unassigned: BTreeSet<usize> = (0..input.jobs().len())
            .filter(|&j| !assigned[j])
            .collect();

        let mut sol_state = SolutionState::new(input);
        sol_state.refresh(&working, input);

        let best_indicators = SolutionIndicators {
            unassigned: unassigned.len(),
            cost: sol_state.route_costs.iter().sum(),
            used_vehicles: working.iter().filter(|r| !r.is_empty()).count(),
        };
        let last_refined_len = working.iter().map(|r| r.len()).collect();

        Ok(LocalSearch {
            input,
            best_sol: working.clone(),
            sol: working,
            sol_state,
            unassigned,
            best_indicators,
            config,
            cancel: None,
            log_callback: None,
            ls_step: 0,
            last_refined_len,
            target_sol: sol,
        })
    }

    /// Register a cooperative cancellation flag, checked at the top of
    /// each outer iteration.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = Some(flag);
    }

    /// Register a callback invoked after each accepted operator
    /// application.
    pub fn set_log_callback(&mut self, callback: LogCallback) {
        self.log_callback = Some(callback);
    }

    /// Indicators of the best solution seen so far.
    pub fn indicators(&self) -> SolutionIndicators {
        self.best_indicators
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Run to a fixed point: the loop continues while the best indicators
    /// strictly improve, and the best solution is written back to the
    /// caller's solution.
    pub fn run(&mut self) {
        let all_routes: Vec<usize> = (0..self.sol.len()).collect();

        self.try_job_additions(&all_routes);
        self.record_best();

        let mut improvement = true;
        while improvement {
            improvement = false;

            if self.cancelled() {
                break;
            }

            self.run_ls_steps();
            self.remove_from_routes();
            self.try_job_additions(&all_routes);

            if self.record_best() {
                improvement = true;
            }
        }

        *self.target_sol = self.best_sol.clone();
    }

    /// Apply best-gain operators until none has strictly positive gain.
    fn run_ls_steps(&mut self) {
        loop {
            if self.cancelled() {
                return;
            }
            self.ls_step += 1;

            if !self.run_ls_step() {
                return;
            }

            self.run_tsp_refinements();
            self.record_best();
        }
    }

    /// One operator phase: enumerate all moves in lexicographic order,
    /// apply the best strictly improving one. Returns false when no move
    /// improves.
    fn run_ls_step(&mut self) -> bool {
        self.sol_state.refresh(&self.sol, self.input);

        let mut best_op: Option<Box<dyn Operator>> = None;
        let mut best_gain: Gain = 0;

        {
            let ctx = SearchContext::new(self.input, &self.sol, &self.sol_state);
            let vehicles = self.sol.len();

            let mut consider = |mut op: Box<dyn Operator>| {
                if !op.is_valid(&ctx) {
                    return;
                }
                op.compute_gain(&ctx);
                if op.gain() > best_gain {
                    best_gain = op.gain();
                    best_op = Some(op);
                }
            };

            // Fixed enumeration order: vehicle pairs ascending, move kinds
            // in a fixed order per pair, ranks ascending. Combined with
            // the strict comparison above, ties resolve to the lowest
            // (kind, source_vehicle, source_rank, target_vehicle,
            // target_rank).
            for v1 in 0..vehicles {
                let len1 = self.sol[v1].len();

                // Intra-route moves.
                for s in 0..len1 {
                    for t in s + 1..len1 {
                        consider(Box::new(Exchange::new(v1, s, t)));
                    }
                }
                for &length in &OR_OPT_LENGTHS {
                    if len1 < length + 1 {
                        continue;
                    }
                    for s in 0..=len1 - length {
                        for t in 0..=len1 - length {
                            if t != s {
                                consider(Box::new(IntraOrOpt::new(v1, s, t, length)));
                            }
                        }
                    }
                }

                // Inter-route moves against every later vehicle.
                for v2 in v1 + 1..vehicles {
                    let len2 = self.sol[v2].len();

                    for s in 0..len1 {
                        for t in 0..len2 {
                            consider(Box::new(CrossExchange::new(v1, s, v2, t)));
                        }
                    }

                    for s in 0..len1 {
                        for t in 0..=len2 {
                            consider(Box::new(Relocate::new(v1, s, v2, t)));
                        }
                    }
                    for s in 0..len2 {
                        for t in 0..=len1 {
                            consider(Box::new(Relocate::new(v2, s, v1, t)));
                        }
                    }

                    for &length in &OR_OPT_LENGTHS {
                        if len1 >= length {
                            for s in 0..=len1 - length {
                                for t in 0..=len2 {
                                    consider(Box::new(OrOpt::new(v1, s, v2, t, length)));
                                }
                            }
                        }
                        if len2 >= length {
                            for s in 0..=len2 - length {
                                for t in 0..=len1 {
                                    consider(Box::new(OrOpt::new(v2, s, v1, t, length)));
                                }
                            }
                        }
                    }

                    for s in 0..=len1 {
                        for t in 0..=len2 {
                            consider(Box::new(TwoOpt::new(v1, s, v2, t)));
                        }
                    }

                    for s in 0..len1 {
                        for t in 0..len2 {
                            consider(Box::new(ReverseTwoOpt::new(v1, s, v2, t)));
                        }
                    }
                }
            }
        }

        let op = match best_op {
            Some(op) => op,
            None => return false,
        };

        op.apply(&mut self.sol);
        for vehicle in op.invalidation_set() {
            self.sol_state.invalidate(vehicle);
        }
        self.sol_state.refresh(&self.sol, self.input);

        let new_cost: Cost = self.sol_state.route_costs.iter().sum();
        debug!(
            "step {}: applied {} with gain {}, cost {}",
            self.ls_step,
            op.name(),
            op.gain(),
            new_cost
        );
        if let Some(callback) = self.log_callback.as_mut() {
            callback(&LogEvent {
                iteration: self.ls_step,
                operator_name: op.name(),
                gain: op.gain(),
                new_cost,
            });
        }

        let candidates = op.addition_candidates();
        if !candidates.is_empty() && !self.unassigned.is_empty() {
            self.try_job_additions(&candidates);
        }

        true
    }

    /// Regret insertion: repeatedly pick the unassigned job maximizing
    /// second_best − ρ · best over the candidate routes and insert it at
    /// its best feasible position.
    fn try_job_additions(&mut self, routes: &[usize]) {
        loop {
            if self.unassigned.is_empty() {
                return;
            }
            self.sol_state.refresh(&self.sol, self.input);

            // (job, vehicle, slot, best delta, score)
            let mut choice: Option<(usize, usize, usize, Gain, f64)> = None;

            {
                let ctx = SearchContext::new(self.input, &self.sol, &self.sol_state);

                for &job_rank in &self.unassigned {
                    let amount = &self.input.jobs()[job_rank].amount;

                    let mut best_delta = None;
                    let mut best_vehicle = 0;
                    let mut best_slot = 0;
                    let mut second_delta = None;

                    for &v in routes {
                        if !self.input.vehicle_ok_with_job(v, job_rank) {
                            continue;
                        }
                        let load = self.sol_state.total_amount(v) + amount.clone();
                        if !load.le(&self.input.vehicles()[v].capacity) {
                            continue;
                        }

                        // Best feasible position within this route.
                        let mut route_best: Option<(Gain, usize)> = None;
                        for slot in 0..=self.sol[v].len() {
                            let delta = ctx.insertion_delta(v, slot, job_rank);
                            if route_best.map_or(true, |(d, _)| delta < d) {
                                route_best = Some((delta, slot));
                            }
                        }

                        if let Some((delta, slot)) = route_best {
                            match best_delta {
                                None => {
                                    best_delta = Some(delta);
                                    best_vehicle = v;
                                    best_slot = slot;
                                }
                                Some(current) if delta < current => {
                                    second_delta = Some(current);
                                    best_delta = Some(delta);
                                    best_vehicle = v;
                                    best_slot = slot;
                                }
                                Some(_) => {
                                    if second_delta.map_or(true, |d| delta < d) {
                                        second_delta = Some(delta);
                                    }
                                }
                            }
                        }
                    }

                    if let Some(delta) = best_delta {
                        let second = second_delta.unwrap_or(REGRET_SENTINEL);
                        let score = second as f64 - self.config.regret_coeff * delta as f64;

                        let better = match choice {
                            None => true,
                            Some((_, _, _, chosen_delta, chosen_score)) => {
                                score > chosen_score
                                    || (score == chosen_score && delta < chosen_delta)
                            }
                        };
                        if better {
                            choice = Some((job_rank, best_vehicle, best_slot, delta, score));
                        }
                    }
                }
            }

            let (job_rank, vehicle, slot, delta, _) = match choice {
                Some(choice) => choice,
                None => return,
            };

            trace!(
                "adding job {} to route {} at rank {} (delta {})",
                job_rank,
                vehicle,
                slot,
                delta
            );
            self.sol[vehicle].insert(slot, job_rank);
            self.unassigned.remove(&job_rank);
            self.sol_state.invalidate(vehicle);
        }
    }

    /// Remove stops whose estimated re-insertion elsewhere is strictly
    /// cheaper than the saving of taking them out, and queue them for the
    /// next job-addition phase. At most one stop per route per call.
    fn remove_from_routes(&mut self) -> bool {
        self.sol_state.refresh(&self.sol, self.input);

        let vehicles = self.sol.len();
        for v1 in 0..vehicles {
            if self.sol[v1].is_empty() {
                continue;
            }
            for v2 in 0..vehicles {
                if v1 != v2 && !self.sol[v2].is_empty() {
                    self.sol_state
                        .update_nearest_job_rank_in_routes(v1, v2, &self.sol, self.input);
                }
            }
        }

        let mut removals: Vec<(usize, usize)> = Vec::new();

        {
            let ctx = SearchContext::new(self.input, &self.sol, &self.sol_state);

            for v in 0..vehicles {
                if self.sol[v].is_empty() {
                    continue;
                }

                // Candidate stop: the one whose removal saves the most.
                let mut best_rank = 0;
                for rank in 1..self.sol[v].len() {
                    if self.sol_state.node_gains[v][rank] > self.sol_state.node_gains[v][best_rank]
                    {
                        best_rank = rank;
                    }
                }
                let removal_gain = self.sol_state.node_gains[v][best_rank];
                let job_rank = self.sol[v][best_rank];
                let amount = &self.input.jobs()[job_rank].amount;

                // Estimate the cheapest re-insertion elsewhere, probing
                // around the nearest stop of each other route.
                let mut best_estimate: Option<Gain> = None;
                for w in 0..vehicles {
                    if w == v || self.sol[w].is_empty() {
                        continue;
                    }
                    if !self.sol_state.node_skills[v][best_rank]
                        .is_subset(&self.input.vehicles()[w].skills)
                    {
                        continue;
                    }
                    let load = self.sol_state.total_amount(w) + amount.clone();
                    if !load.le(&self.input.vehicles()[w].capacity) {
                        continue;
                    }

                    let near = self.sol_state.nearest_job_rank(v, w, best_rank);
                    for slot in [near, near + 1] {
                        let delta = ctx.insertion_delta(w, slot, job_rank);
                        if best_estimate.map_or(true, |d| delta < d) {
                            best_estimate = Some(delta);
                        }
                    }
                }

                if let Some(estimate) = best_estimate {
                    if estimate < removal_gain {
                        removals.push((v, best_rank));
                    }
                }
            }
        }

        for &(v, rank) in &removals {
            let job_rank = self.sol[v].remove(rank);
            trace!("removing job {} from route {} for re-insertion", job_rank, v);
            self.unassigned.insert(job_rank);
            self.sol_state.invalidate(v);
        }

        !removals.is_empty()
    }

    /// Re-order routes that grew by at least two stops since their last
    /// refinement with the Christofides heuristic. Only round trips
    /// (start == end) can absorb a closed tour.
    fn run_tsp_refinements(&mut self) {
        for v in 0..self.sol.len() {
            let len = self.sol[v].len();
            if len < 4 || len < self.last_refined_len[v] + 2 {
                continue;
            }

            let vehicle = &self.input.vehicles()[v];
            let depot = match (vehicle.start, vehicle.end) {
                (Some(start), Some(end)) if start == end => start,
                _ => continue,
            };

            self.last_refined_len[v] = len;
            self.run_tsp(v, depot);
        }
    }

    /// Build the symmetrized sub-matrix over the depot and the route's
    /// stops, run Christofides and adopt the tour when strictly cheaper.
    fn run_tsp(&mut self, v: usize, depot: usize) {
        let mut locations = Vec::with_capacity(self.sol[v].len() + 1);
        locations.push(depot);
        locations.extend(
            self.sol[v]
                .iter()
                .map(|&job_rank| self.input.jobs()[job_rank].index),
        );

        let m = self.input.matrix();
        let rows: Vec<Vec<Cost>> = locations
            .iter()
            .map(|&a| locations.iter().map(|&b| m.get(a, b) + m.get(b, a)).collect())
            .collect();
        let sym_matrix = match Matrix::new(rows) {
            Ok(matrix) => matrix,
            Err(err) => {
                warn!("tsp refinement skipped for route {}: {}", v, err);
                return;
            }
        };

        let tour = match christofides(&sym_matrix) {
            Ok(tour) => tour,
            Err(err) => {
                warn!("tsp refinement skipped for route {}: {}", v, err);
                return;
            }
        };

        // Rotate the tour so the depot leads, then read off the stops.
        let depot_pos = tour
            .iter()
            .position(|&vertex| vertex == 0)
            .expect("depot missing from tour");
        let candidate: Vec<usize> = tour[depot_pos + 1..]
            .iter()
            .chain(tour[..depot_pos].iter())
            .map(|&vertex| self.sol[v][vertex - 1])
            .collect();

        let current_cost = self.sol_state.route_costs[v];
        let candidate_cost = route_cost_for_vehicle(self.input, v, &candidate);

        if candidate_cost < current_cost {
            debug!(
                "tsp refinement improved route {}: {} -> {}",
                v, current_cost, candidate_cost
            );
            self.sol[v] = candidate;
            self.sol_state.invalidate(v);
            self.sol_state.refresh(&self.sol, self.input);
        }
    }

    /// Record the working solution as best when its indicators strictly
    /// improve. Returns whether they did.
    fn record_best(&mut self) -> bool {
        self.sol_state.refresh(&self.sol, self.input);

        let current = SolutionIndicators {
            unassigned: self.unassigned.len(),
            cost: self.sol_state.route_costs.iter().sum(),
            used_vehicles: self.sol.iter().filter(|r| !r.is_empty()).count(),
        };

        if current < self.best_indicators {
            self.best_indicators = current;
            self.best_sol = self.sol.clone();
            true
        } else {
            false
        }
    }
}
