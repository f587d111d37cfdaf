//! Error types surfaced by the engine and the TSP refiner.

use std::fmt;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors detected at setup or inside the TSP refiner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed problem input: non-square matrix, out-of-range location
    /// index, or a job amount whose dimension does not match the vehicle
    /// capacities.
    InvalidInput(String),
    /// The initial solution violates capacity or skill constraints, or
    /// assigns a job more than once.
    InfeasibleInitialSolution(String),
    /// Minimum spanning tree requested on a graph that is not connected.
    DisconnectedGraph,
    /// Perfect matching requested on an odd number of vertices.
    OddVertexCount(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Error::InfeasibleInitialSolution(msg) => {
                write!(f, "infeasible initial solution: {}", msg)
            }
            Error::DisconnectedGraph => write!(f, "graph is not connected"),
            Error::OddVertexCount(n) => {
                write!(f, "perfect matching requires an even vertex count, got {}", n)
            }
        }
    }
}

impl std::error::Error for Error {}
