//! # CVRP-LS
//!
//! A local-search engine for the Capacitated Vehicle Routing Problem
//! (CVRP).
//!
//! The engine maintains a feasible multi-route solution and repeatedly
//! applies the best-gain move from a family of neighborhoods (relocate,
//! exchange, cross-exchange, or-opt, 2-opt, reverse-2-opt), re-inserting
//! unassigned jobs with a regret heuristic and re-ordering individual
//! routes with a Christofides TSP refiner, until no improving move exists.
//!
//! Derived per-route quantities (cumulative costs and loads, removal
//! gains, skill sets) are cached and invalidated explicitly after each
//! mutation, so move evaluation stays O(1) per candidate.

pub mod config;
pub mod error;
pub mod input;
pub mod local_search;
pub mod matrix;
pub mod solution;
pub mod solution_state;
pub mod tsp;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::input::{Amount, Input, Job, SkillSet, Vehicle};
pub use crate::local_search::LocalSearch;
pub use crate::matrix::Matrix;
pub use crate::solution::{RawSolution, SolutionIndicators};

/// Travel cost between two locations.
pub type Cost = u64;

/// Signed cost difference achieved by a candidate move (positive means
/// improvement).
pub type Gain = i64;
