//! Configuration parameters for the local-search engine.

use serde::{Deserialize, Serialize};

/// Tunable settings for a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Regret coefficient ρ for the job-addition phase, in [0, 1].
    /// score(j) = second_best(j) − ρ · best(j).
    pub regret_coeff: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config { regret_coeff: 1.0 }
    }
}

impl Config {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the regret coefficient, clamped to [0, 1].
    pub fn with_regret_coeff(mut self, coeff: f64) -> Self {
        self.regret_coeff = coeff.clamp(0.0, 1.0);
        self
    }
}
