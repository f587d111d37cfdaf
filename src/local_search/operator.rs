//! Common interface for local-search moves.

use crate::input::Input;
use crate::matrix::Matrix;
use crate::solution::RawSolution;
use crate::solution_state::SolutionState;
use crate::{Cost, Gain};

/// Read-only view of the search shared by all operators during one
/// evaluation pass. Operators never outlive the pass that created them.
pub struct SearchContext<'a> {
    pub input: &'a Input,
    pub sol: &'a RawSolution,
    pub state: &'a SolutionState,
}

impl<'a> SearchContext<'a> {
    pub fn new(input: &'a Input, sol: &'a RawSolution, state: &'a SolutionState) -> Self {
        SearchContext { input, sol, state }
    }

    fn matrix(&self) -> &Matrix {
        self.input.matrix()
    }

    /// Matrix index of the job at `rank` in vehicle `v`'s route.
    pub fn location(&self, v: usize, rank: usize) -> usize {
        self.input.jobs()[self.sol[v][rank]].index
    }

    /// Location preceding position `rank`: the job at rank − 1, or the
    /// vehicle's start.
    pub fn predecessor(&self, v: usize, rank: usize) -> Option<usize> {
        if rank > 0 {
            Some(self.location(v, rank - 1))
        } else {
            self.input.vehicles()[v].start
        }
    }

    /// Location following the stop at `rank`: the job at rank + 1, or the
    /// vehicle's end.
    pub fn successor(&self, v: usize, rank: usize) -> Option<usize> {
        if rank + 1 < self.sol[v].len() {
            Some(self.location(v, rank + 1))
        } else {
            self.input.vehicles()[v].end
        }
    }

    /// Travel cost of a leg; absent endpoints (open route boundaries)
    /// cost nothing.
    pub fn leg(&self, from: Option<usize>, to: Option<usize>) -> Cost {
        match (from, to) {
            (Some(i), Some(j)) => self.matrix().get(i, j),
            _ => 0,
        }
    }

    /// Extra cost of inserting `job_rank` before position `slot` in
    /// vehicle `v`'s route: c(prev, j) + c(j, next) − c(prev, next).
    pub fn insertion_delta(&self, v: usize, slot: usize, job_rank: usize) -> Gain {
        let j = Some(self.input.jobs()[job_rank].index);
        let prev = if slot > 0 {
            Some(self.location(v, slot - 1))
        } else {
            self.input.vehicles()[v].start
        };
        let next = if slot < self.sol[v].len() {
            Some(self.location(v, slot))
        } else {
            self.input.vehicles()[v].end
        };

        (self.leg(prev, j) + self.leg(j, next)) as Gain - self.leg(prev, next) as Gain
    }
}

/// A candidate move: gain computation, feasibility gate, mutation.
pub trait Operator {
    /// Name used in log callbacks and traces.
    fn name(&self) -> &'static str;

    /// Compute and store the gain. Called exactly once per operator.
    fn compute_gain(&mut self, ctx: &SearchContext);

    /// The stored gain. Panics in debug builds if not yet computed.
    fn gain(&self) -> Gain;

    /// True iff applying the move preserves capacity and skill
    /// feasibility.
    fn is_valid(&self, ctx: &SearchContext) -> bool;

    /// Mutate the solution. Only called on valid operators.
    fn apply(&self, sol: &mut RawSolution);

    /// Vehicles whose caches the mutation renders stale.
    fn invalidation_set(&self) -> Vec<usize>;

    /// Vehicles whose routes the job-addition phase should revisit after
    /// application.
    fn addition_candidates(&self) -> Vec<usize>;
}
