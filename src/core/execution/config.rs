//! Configuration for ranksim engine execution
//!
//! This module provides the settings that control how trials are executed,
//! independent of the request being simulated: concurrency, thread pool
//! sizing, seeding and the rejection sampling cap.

use crate::core::sampling::DEFAULT_MAX_REJECTION_ATTEMPTS;

/// Default ceiling on trials per run; every trial's ranking is kept in memory
pub const DEFAULT_MAX_SIMULATIONS: usize = 1_000_000;

/// Enumeration of supported concurrency modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// Sequential execution mode - trials run in order on the calling thread
    Sequential,
    /// Parallel execution mode using Rayon - trials run concurrently, each with its own RNG
    Rayon,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Sequential
    }
}

/// Configuration for simulation execution
///
/// The result of a run depends only on the request and the seed. Concurrency
/// settings change how fast it is produced, never what is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// The concurrency mode to use for execution
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon; None uses the global pool
    pub thread_pool_size: Option<usize>,
    /// Fixed master seed; None draws fresh OS entropy on every run
    pub seed: Option<u64>,
    /// Draws allowed per interview score before the interval is rejected
    pub max_rejection_attempts: usize,
    /// Largest trial count a single run accepts
    pub max_simulations: usize,
}

impl SimulationConfig {
    /// Create a new simulation configuration with default values
    ///
    /// Default configuration uses Sequential mode, no thread pool, an
    /// unseeded (entropy) RNG and the default rejection cap
    pub fn new() -> Self {
        Self {
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
            seed: None,
            max_rejection_attempts: DEFAULT_MAX_REJECTION_ATTEMPTS,
            max_simulations: DEFAULT_MAX_SIMULATIONS,
        }
    }

    /// Set the concurrency mode for the simulation
    ///
    /// # Arguments
    /// * `mode` - The concurrency mode to use
    ///
    /// # Returns
    /// A new configuration with the specified concurrency mode
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Arguments
    /// * `size` - The number of threads to use in the thread pool
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    /// Fix the master seed so runs are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_rejection_attempts(mut self, attempts: usize) -> Self {
        self.max_rejection_attempts = attempts;
        self
    }

    pub fn with_max_simulations(mut self, max_simulations: usize) -> Self {
        self.max_simulations = max_simulations;
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
