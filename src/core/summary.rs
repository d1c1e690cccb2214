//! Per-run statistics over the trial results.
//!
//! Collapses the per-trial series (candidate total, cohort extremes,
//! candidate interview score and rank) into ranges and a rank histogram.

use serde::{Deserialize, Serialize};

use super::errors::{SimulationError, SimulationResult};
use super::types::AggregateResults;

/// Minimum, mean and maximum of a per-trial series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

impl ScoreRange {
    fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        (count > 0).then(|| ScoreRange {
            min,
            mean: sum / count as f64,
            max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub trials: usize,
    pub top_n: i64,
    pub top_n_probability: f64,
    pub first_place_probability: f64,
    pub mean_rank: f64,
    pub best_rank: usize,
    pub worst_rank: usize,
    /// Number of trials that ended at each rank; index 0 is first place
    pub rank_histogram: Vec<usize>,
    pub candidate_total: ScoreRange,
    pub candidate_interview: ScoreRange,
    /// Highest total score in each trial's cohort
    pub cohort_top_total: ScoreRange,
    /// Lowest total score in each trial's cohort
    pub cohort_bottom_total: ScoreRange,
}

impl RunSummary {
    pub fn from_results(results: &AggregateResults, top_n: i64) -> SimulationResult<Self> {
        let trials = &results.results;
        let empty = || SimulationError::invalid("cannot summarize a run with zero trials");

        let cohort_size = trials.iter().map(|t| t.rankings.len()).max().ok_or_else(empty)?;
        let mut rank_histogram = vec![0usize; cohort_size];
        for trial in trials {
            if let Some(slot) = trial
                .your_rank
                .checked_sub(1)
                .and_then(|index| rank_histogram.get_mut(index))
            {
                *slot += 1;
            }
        }

        let ranks = || trials.iter().map(|t| t.your_rank);
        let best_rank = ranks().min().ok_or_else(empty)?;
        let worst_rank = ranks().max().ok_or_else(empty)?;
        let mean_rank = ranks().sum::<usize>() as f64 / trials.len() as f64;

        let candidate_total =
            ScoreRange::from_values(trials.iter().map(|t| t.total_score)).ok_or_else(empty)?;
        let candidate_interview = ScoreRange::from_values(
            trials
                .iter()
                .filter_map(|t| t.candidate())
                .map(|s| s.interview_score),
        )
        .ok_or_else(empty)?;
        // Rankings are sorted, so the extremes sit at either end.
        let cohort_top_total = ScoreRange::from_values(
            trials
                .iter()
                .filter_map(|t| t.rankings.first())
                .map(|s| s.total_score),
        )
        .ok_or_else(empty)?;
        let cohort_bottom_total = ScoreRange::from_values(
            trials
                .iter()
                .filter_map(|t| t.rankings.last())
                .map(|s| s.total_score),
        )
        .ok_or_else(empty)?;

        Ok(Self {
            trials: trials.len(),
            top_n,
            top_n_probability: results.top_n_probability,
            first_place_probability: results.first_place_probability,
            mean_rank,
            best_rank,
            worst_rank,
            rank_histogram,
            candidate_total,
            candidate_interview,
            cohort_top_total,
            cohort_bottom_total,
        })
    }

    /// Fraction of trials that ended at `rank` (1-based).
    pub fn rank_probability(&self, rank: usize) -> f64 {
        match rank.checked_sub(1).and_then(|i| self.rank_histogram.get(i)) {
            Some(&count) if self.trials > 0 => count as f64 / self.trials as f64,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Student, TrialResult};

    fn trial(rankings: Vec<Student>, rank: usize) -> TrialResult {
        let candidate = rankings[rank - 1];
        TrialResult {
            rankings,
            your_rank: rank,
            total_score: candidate.total_score,
            entered_top_n: rank <= 1,
            is_first_place: rank == 1,
        }
    }

    fn student(score: f64) -> Student {
        Student {
            exam_score: score,
            interview_score: score,
            total_score: score,
        }
    }

    fn sample_results() -> AggregateResults {
        let (high, mid, low) = (student(100.0), student(50.0), student(0.0));

        AggregateResults::from_trials(vec![
            trial(vec![high, mid, low], 1),
            trial(vec![high, mid, low], 2),
            trial(vec![high, mid, low], 2),
            trial(vec![mid, low, low], 3),
        ])
        .unwrap()
    }

    #[test]
    fn test_rank_statistics() {
        let summary = RunSummary::from_results(&sample_results(), 1).unwrap();

        assert_eq!(summary.trials, 4);
        assert_eq!(summary.rank_histogram, vec![1, 2, 1]);
        assert_eq!(summary.best_rank, 1);
        assert_eq!(summary.worst_rank, 3);
        assert!((summary.mean_rank - 2.0).abs() < 1e-12);
        assert!((summary.rank_probability(2) - 0.5).abs() < 1e-12);
        assert_eq!(summary.rank_probability(0), 0.0);
        assert_eq!(summary.rank_probability(9), 0.0);
    }

    #[test]
    fn test_score_ranges() {
        let summary = RunSummary::from_results(&sample_results(), 1).unwrap();

        // Candidate totals: 100, 50, 50, 0
        assert_eq!(summary.candidate_total.min, 0.0);
        assert_eq!(summary.candidate_total.max, 100.0);
        assert!((summary.candidate_total.mean - 50.0).abs() < 1e-12);
        assert_eq!(summary.candidate_interview.max, 100.0);

        assert_eq!(summary.cohort_top_total.min, 50.0);
        assert_eq!(summary.cohort_top_total.max, 100.0);
        assert_eq!(summary.cohort_bottom_total.max, 0.0);
    }

    #[test]
    fn test_probabilities_carried_over() {
        let results = sample_results();
        let summary = RunSummary::from_results(&results, 1).unwrap();
        assert_eq!(summary.top_n_probability, results.top_n_probability);
        assert_eq!(summary.first_place_probability, results.first_place_probability);
    }

    #[test]
    fn test_empty_results_rejected() {
        let empty = AggregateResults {
            results: Vec::new(),
            success_count: 0,
            first_place_count: 0,
            top_n_probability: 0.0,
            first_place_probability: 0.0,
        };
        assert!(RunSummary::from_results(&empty, 5).is_err());
    }
}
