//! Problem input: jobs, vehicles and the cost matrix.

use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// Set of skills, indexed by skill rank.
pub type SkillSet = FixedBitSet;

/// Multi-dimension load vector. All amounts and capacities of one problem
/// share the same dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount(Vec<i64>);

impl Amount {
    /// Create an amount from its components.
    pub fn new(components: Vec<i64>) -> Self {
        Amount(components)
    }

    /// The zero amount of the given dimension.
    pub fn zero(dimension: usize) -> Self {
        Amount(vec![0; dimension])
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Component-wise comparison: true iff every component of `self` is
    /// less than or equal to the matching component of `rhs`.
    pub fn le(&self, rhs: &Amount) -> bool {
        self.0.iter().zip(rhs.0.iter()).all(|(a, b)| a <= b)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(a, b)| a + b)
                .collect(),
        )
    }
}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += b;
        }
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(a, b)| a - b)
                .collect(),
        )
    }
}

impl<'a> Add<&'a Amount> for &'a Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(
            self.0
                .iter()
                .zip(rhs.0.iter())
                .map(|(a, b)| a + b)
                .collect(),
        )
    }
}

/// A job to serve: a pickup amount at a location, gated by skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Location index in the cost matrix.
    pub index: usize,
    /// Skills a vehicle must provide to serve this job.
    pub skills: SkillSet,
    /// Pickup amount.
    pub amount: Amount,
}

impl Job {
    /// Create a new job.
    pub fn new(index: usize, skills: SkillSet, amount: Amount) -> Self {
        Job {
            index,
            skills,
            amount,
        }
    }
}

/// A vehicle with optional start and end locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Start location index in the cost matrix, if any.
    pub start: Option<usize>,
    /// End location index in the cost matrix, if any.
    pub end: Option<usize>,
    /// Capacity, component-wise upper bound on the route load.
    pub capacity: Amount,
    /// Skills this vehicle provides.
    pub skills: SkillSet,
}

impl Vehicle {
    /// Create a new vehicle.
    pub fn new(
        start: Option<usize>,
        end: Option<usize>,
        capacity: Amount,
        skills: SkillSet,
    ) -> Self {
        Vehicle {
            start,
            end,
            capacity,
            skills,
        }
    }
}

/// Immutable problem instance shared by all searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    matrix: Matrix,
    jobs: Vec<Job>,
    vehicles: Vec<Vehicle>,
    amount_dimension: usize,
}

impl Input {
    /// Bind a cost matrix, jobs and vehicles, validating index ranges and
    /// amount dimensions.
    pub fn new(matrix: Matrix, jobs: Vec<Job>, vehicles: Vec<Vehicle>) -> Result<Self> {
        let amount_dimension = vehicles
            .first()
            .map(|v| v.capacity.dimension())
            .unwrap_or_else(|| jobs.first().map(|j| j.amount.dimension()).unwrap_or(0));

        for (rank, job) in jobs.iter().enumerate() {
            if job.index >= matrix.size() {
                return Err(Error::InvalidInput(format!(
                    "job {} has location index {} outside the {}x{} matrix",
                    rank,
                    job.index,
                    matrix.size(),
                    matrix.size()
                )));
            }
            if job.amount.dimension() != amount_dimension {
                return Err(Error::InvalidInput(format!(
                    "job {} amount has dimension {}, expected {}",
                    rank,
                    job.amount.dimension(),
                    amount_dimension
                )));
            }
        }

        for (rank, vehicle) in vehicles.iter().enumerate() {
            for index in vehicle.start.iter().chain(vehicle.end.iter()) {
                if *index >= matrix.size() {
                    return Err(Error::InvalidInput(format!(
                        "vehicle {} references location index {} outside the matrix",
                        rank, index
                    )));
                }
            }
            if vehicle.capacity.dimension() != amount_dimension {
                return Err(Error::InvalidInput(format!(
                    "vehicle {} capacity has dimension {}, expected {}",
                    rank,
                    vehicle.capacity.dimension(),
                    amount_dimension
                )));
            }
        }

        Ok(Input {
            matrix,
            jobs,
            vehicles,
            amount_dimension,
        })
    }

    /// The cost matrix.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// All jobs, indexed by job rank.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// All vehicles, indexed by vehicle rank.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Dimension shared by all amounts and capacities.
    pub fn amount_dimension(&self) -> usize {
        self.amount_dimension
    }

    /// The zero amount for this problem.
    pub fn zero_amount(&self) -> Amount {
        Amount::zero(self.amount_dimension)
    }

    /// True iff the vehicle provides every skill the job requires.
    pub fn vehicle_ok_with_job(&self, vehicle_rank: usize, job_rank: usize) -> bool {
        self.jobs[job_rank]
            .skills
            .is_subset(&self.vehicles[vehicle_rank].skills)
    }
}
