//! Solution representation and feasibility checks.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::input::Input;
use crate::Cost;

/// One ordered sequence of job ranks per vehicle.
pub type RawSolution = Vec<Vec<usize>>;

/// Summary of a solution's quality. The derived ordering is lexicographic
/// on (unassigned, cost, used_vehicles): fewer unassigned jobs beats lower
/// cost beats fewer vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolutionIndicators {
    /// Number of jobs not assigned to any route.
    pub unassigned: usize,
    /// Total travel cost over all routes.
    pub cost: Cost,
    /// Number of non-empty routes.
    pub used_vehicles: usize,
}

/// Cost of running `route` with the given vehicle, including its optional
/// start and end legs. An empty route costs nothing.
pub fn route_cost_for_vehicle(input: &Input, vehicle_rank: usize, route: &[usize]) -> Cost {
    let m = input.matrix();
    let vehicle = &input.vehicles()[vehicle_rank];

    if route.is_empty() {
        return 0;
    }

    let mut cost = 0;
    if let Some(start) = vehicle.start {
        cost += m.get(start, input.jobs()[route[0]].index);
    }
    for pair in route.windows(2) {
        cost += m.get(input.jobs()[pair[0]].index, input.jobs()[pair[1]].index);
    }
    if let Some(end) = vehicle.end {
        cost += m.get(input.jobs()[route[route.len() - 1]].index, end);
    }

    cost
}

/// Total travel cost of a solution.
pub fn solution_cost(input: &Input, sol: &RawSolution) -> Cost {
    sol.iter()
        .enumerate()
        .map(|(v, route)| route_cost_for_vehicle(input, v, route))
        .sum()
}

/// Check that a solution assigns each job at most once and respects every
/// vehicle's capacity and skills.
pub fn check_solution(input: &Input, sol: &RawSolution) -> Result<()> {
    if sol.len() != input.vehicles().len() {
        return Err(Error::InfeasibleInitialSolution(format!(
            "solution has {} routes for {} vehicles",
            sol.len(),
            input.vehicles().len()
        )));
    }

    let mut assigned = vec![false; input.jobs().len()];

    for (v, route) in sol.iter().enumerate() {
        let mut load = input.zero_amount();

        for &job_rank in route {
            if job_rank >= input.jobs().len() {
                return Err(Error::InfeasibleInitialSolution(format!(
                    "route {} references unknown job {}",
                    v, job_rank
                )));
            }
            if assigned[job_rank] {
                return Err(Error::InfeasibleInitialSolution(format!(
                    "job {} is assigned more than once",
                    job_rank
                )));
            }
            assigned[job_rank] = true;

            if !input.vehicle_ok_with_job(v, job_rank) {
                return Err(Error::InfeasibleInitialSolution(format!(
                    "vehicle {} lacks skills required by job {}",
                    v, job_rank
                )));
            }
            load += &input.jobs()[job_rank].amount;
        }

        if !load.le(&input.vehicles()[v].capacity) {
            return Err(Error::InfeasibleInitialSolution(format!(
                "route {} exceeds vehicle capacity",
                v
            )));
        }
    }

    Ok(())
}
