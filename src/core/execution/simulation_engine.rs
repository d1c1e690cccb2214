use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::execution::config::{ConcurrencyMode, SimulationConfig};
use crate::core::ranking::rank_cohort;
use crate::core::sampling::TruncatedNormal;
use crate::core::types::{AggregateResults, Configuration, Student, TrialResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Monte Carlo engine estimating how often a candidate places in the top N
///
/// Every trial owns a private `StdRng` seeded from a per-run master seed, so
/// trials share no mutable state and may run on any thread.
pub struct SimulationEngine {
    config: SimulationConfig,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Validate `configuration`, run every trial and aggregate the outcome.
    ///
    /// Fails before the first trial if the configuration is invalid; a trial
    /// whose interview interval cannot be sampled aborts the whole run.
    pub fn run(&self, configuration: &Configuration) -> SimulationResult<AggregateResults> {
        configuration.validate()?;

        let started = Instant::now();
        let sampler = TruncatedNormal::from_configuration(configuration)
            .with_max_attempts(self.config.max_rejection_attempts);
        let trials = self.checked_trial_count(configuration)?;
        let master_seed = self.resolve_seed();

        debug!(
            "Running {} trials of a {}-student cohort ({:?}, master seed {})",
            trials,
            configuration.cohort_size(),
            self.config.concurrency_mode,
            master_seed
        );

        let results = match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => (0..trials)
                .map(|index| {
                    run_seeded_trial(configuration, &sampler, trial_seed(master_seed, index))
                })
                .collect::<SimulationResult<Vec<_>>>()?,
            ConcurrencyMode::Rayon => self.run_parallel(configuration, &sampler, master_seed, trials)?,
        };

        let aggregate = AggregateResults::from_trials(results)?;

        info!(
            "Completed {} trials in {:?}: top-{} probability {:.4}, first place probability {:.4}",
            aggregate.trials(),
            started.elapsed(),
            configuration.top_n,
            aggregate.top_n_probability,
            aggregate.first_place_probability
        );

        Ok(aggregate)
    }

    fn run_parallel(
        &self,
        configuration: &Configuration,
        sampler: &TruncatedNormal,
        master_seed: u64,
        trials: usize,
    ) -> SimulationResult<Vec<TrialResult>> {
        let run = || {
            (0..trials)
                .into_par_iter()
                .map(|index| {
                    run_seeded_trial(configuration, sampler, trial_seed(master_seed, index))
                })
                .collect::<SimulationResult<Vec<_>>>()
        };

        match self.config.thread_pool_size {
            Some(size) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(size)
                    .build()
                    .map_err(|e| SimulationError::ThreadPool(e.to_string()))?;
                pool.install(run)
            }
            None => run(),
        }
    }

    /// Trial count of `configuration`, refused above the engine's ceiling.
    fn checked_trial_count(&self, configuration: &Configuration) -> SimulationResult<usize> {
        let trials = configuration.trial_count()?;
        if trials > self.config.max_simulations {
            return Err(SimulationError::invalid(format!(
                "simulations ({}) exceeds the limit of {}",
                trials, self.config.max_simulations
            )));
        }
        Ok(trials)
    }

    /// Get or generate the master seed for one run
    fn resolve_seed(&self) -> u64 {
        self.config
            .seed
            .unwrap_or_else(|| StdRng::from_entropy().gen())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

/// Run `configuration` with default engine settings and fresh entropy.
pub fn run_simulations(configuration: &Configuration) -> SimulationResult<AggregateResults> {
    SimulationEngine::default().run(configuration)
}

/// Seed of trial `index`, a SplitMix64 mix of the master seed and the index.
///
/// Depends only on its inputs, so any thread can compute any trial's seed.
pub(crate) fn trial_seed(master_seed: u64, index: usize) -> u64 {
    let step = (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut z = master_seed.wrapping_add(step);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn run_seeded_trial(
    configuration: &Configuration,
    sampler: &TruncatedNormal,
    seed: u64,
) -> SimulationResult<TrialResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    run_trial(configuration, sampler, &mut rng)
}

/// Simulate one trial: draw every interview score, rank the cohort and
/// place the candidate.
///
/// Competitors are drawn first in input order, then the candidate, who is
/// appended last. On equal totals the candidate therefore ranks behind any
/// tied competitor.
pub fn run_trial<R: Rng + ?Sized>(
    configuration: &Configuration,
    sampler: &TruncatedNormal,
    rng: &mut R,
) -> SimulationResult<TrialResult> {
    let mut cohort = Vec::with_capacity(configuration.cohort_size());
    for &exam_score in &configuration.other_exam_scores {
        cohort.push(Student::new(exam_score, sampler.sample(rng)?));
    }

    let candidate_index = cohort.len();
    let candidate = Student::new(configuration.exam_score, sampler.sample(rng)?);
    cohort.push(candidate);

    let ranked = rank_cohort(cohort, candidate_index)
        .ok_or_else(|| SimulationError::invalid("candidate missing from cohort"))?;
    let rank = ranked.candidate_rank;

    Ok(TrialResult {
        rankings: ranked.rankings,
        your_rank: rank,
        total_score: candidate.total_score,
        entered_top_n: (rank as i64) <= configuration.top_n,
        is_first_place: rank == 1,
    })
}
