//! Truncated normal sampling for interview scores.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::errors::{SimulationError, SimulationResult};
use super::types::Configuration;

/// Default number of draws before an interval is declared unreachable.
pub const DEFAULT_MAX_REJECTION_ATTEMPTS: usize = 10_000;

/// Normal distribution restricted to `[min, max]` by rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedNormal {
    mean: f64,
    stddev: f64,
    min: f64,
    max: f64,
    max_attempts: usize,
}

impl TruncatedNormal {
    pub fn new(mean: f64, stddev: f64, min: f64, max: f64) -> Self {
        Self {
            mean,
            stddev,
            min,
            max,
            max_attempts: DEFAULT_MAX_REJECTION_ATTEMPTS,
        }
    }

    /// Interview score distribution described by a configuration.
    pub fn from_configuration(config: &Configuration) -> Self {
        Self::new(config.average, config.stddev, config.min, config.max)
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Draw one value inside `[min, max]`.
    ///
    /// Each attempt scales a standard normal variate by `stddev` and shifts it
    /// by `mean`. If no attempt lands in the interval within the cap, the
    /// interval is treated as having no usable probability mass.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SimulationResult<f64> {
        for _ in 0..self.max_attempts {
            let z: f64 = StandardNormal.sample(rng);
            let score = z * self.stddev + self.mean;
            if score >= self.min && score <= self.max {
                return Ok(score);
            }
        }

        Err(SimulationError::invalid(format!(
            "no interview score in [{}, {}] after {} draws from N({}, {}); \
             the interval holds too little probability mass",
            self.min, self.max, self.max_attempts, self.mean, self.stddev
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_stay_within_bounds() {
        let dist = TruncatedNormal::new(75.0, 30.0, 60.0, 90.0);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..5_000 {
            let score = dist.sample(&mut rng).unwrap();
            assert!((60.0..=90.0).contains(&score), "score {} out of bounds", score);
        }
    }

    #[test]
    fn test_sample_mean_tracks_distribution_mean() {
        let dist = TruncatedNormal::new(50.0, 5.0, 0.0, 100.0);
        let mut rng = StdRng::seed_from_u64(11);

        let n = 20_000;
        let sum: f64 = (0..n).map(|_| dist.sample(&mut rng).unwrap()).sum();
        let mean = sum / n as f64;
        assert!((mean - 50.0).abs() < 0.5, "sample mean {} too far from 50", mean);
    }

    #[test]
    fn test_narrow_distribution_clusters_at_upper_bound() {
        let dist = TruncatedNormal::new(100.0, 0.001, 0.0, 100.0);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..1_000 {
            let score = dist.sample(&mut rng).unwrap();
            assert!(score <= 100.0 && score > 99.99, "score {} not near 100", score);
        }
    }

    #[test]
    fn test_unreachable_interval_fails_after_cap() {
        let dist = TruncatedNormal::new(0.0, 1.0, 50.0, 60.0).with_max_attempts(500);
        let mut rng = StdRng::seed_from_u64(1);

        match dist.sample(&mut rng) {
            Err(SimulationError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("500 draws"), "unexpected reason: {}", reason);
            }
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_max_attempts_is_at_least_one() {
        let dist = TruncatedNormal::new(0.0, 1.0, -1.0, 1.0).with_max_attempts(0);
        assert_eq!(dist.max_attempts(), 1);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let dist = TruncatedNormal::new(75.0, 10.0, 0.0, 100.0);
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);

        for _ in 0..100 {
            assert_eq!(dist.sample(&mut a).unwrap(), dist.sample(&mut b).unwrap());
        }
    }
}
