use serde::{Deserialize, Serialize};

use super::errors::{SimulationError, SimulationResult};

/// Weight of the written exam in a student's total score.
pub const EXAM_WEIGHT: f64 = 0.4;
/// Weight of the interview in a student's total score.
pub const INTERVIEW_WEIGHT: f64 = 0.6;

/// Input for one simulation run
///
/// Field names match the JSON accepted by the `/simulate` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// The candidate's fixed exam score
    pub exam_score: f64,
    /// Exam scores of every competitor, in input order
    #[serde(default)]
    pub other_exam_scores: Vec<f64>,
    /// Number of independent trials to run
    pub simulations: i64,
    /// A rank at or below this threshold counts as a success
    pub top_n: i64,
    /// Mean of the interview score distribution
    pub average: f64,
    /// Standard deviation of the interview score distribution
    pub stddev: f64,
    /// Lowest acceptable interview score (inclusive)
    pub min: f64,
    /// Highest acceptable interview score (inclusive)
    pub max: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            exam_score: 80.0,
            other_exam_scores: vec![70.0, 90.0],
            simulations: 1000,
            top_n: 5,
            average: 75.0,
            stddev: 10.0,
            min: 0.0,
            max: 100.0,
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exam_score(mut self, exam_score: f64) -> Self {
        self.exam_score = exam_score;
        self
    }

    pub fn with_other_exam_scores(mut self, scores: Vec<f64>) -> Self {
        self.other_exam_scores = scores;
        self
    }

    pub fn with_simulations(mut self, simulations: i64) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_top_n(mut self, top_n: i64) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_interview_distribution(mut self, average: f64, stddev: f64) -> Self {
        self.average = average;
        self.stddev = stddev;
        self
    }

    pub fn with_interview_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Reject configurations that would divide by zero or never finish sampling.
    pub fn validate(&self) -> SimulationResult<()> {
        if self.simulations <= 0 {
            return Err(SimulationError::invalid(format!(
                "simulations must be greater than 0, got {}",
                self.simulations
            )));
        }

        let noise = [
            ("average", self.average),
            ("stddev", self.stddev),
            ("min", self.min),
            ("max", self.max),
        ];
        if let Some((name, value)) = noise.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SimulationError::invalid(format!(
                "{} must be a finite number, got {}",
                name, value
            )));
        }

        if self.stddev <= 0.0 {
            return Err(SimulationError::invalid(format!(
                "stddev must be greater than 0, got {}",
                self.stddev
            )));
        }

        if self.min >= self.max {
            return Err(SimulationError::invalid(format!(
                "min ({}) must be less than max ({})",
                self.min, self.max
            )));
        }

        if std::iter::once(&self.exam_score)
            .chain(&self.other_exam_scores)
            .any(|score| !score.is_finite())
        {
            return Err(SimulationError::invalid("exam scores must be finite numbers"));
        }

        Ok(())
    }

    /// Trial count as an index type.
    pub fn trial_count(&self) -> SimulationResult<usize> {
        usize::try_from(self.simulations).map_err(|_| {
            SimulationError::invalid(format!(
                "simulations ({}) does not fit this platform's index range",
                self.simulations
            ))
        })
    }

    /// Number of students ranked in every trial, candidate included.
    pub fn cohort_size(&self) -> usize {
        self.other_exam_scores.len() + 1
    }
}

/// One ranked entrant of a trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub exam_score: f64,
    pub interview_score: f64,
    pub total_score: f64,
}

impl Student {
    pub fn new(exam_score: f64, interview_score: f64) -> Self {
        Self {
            exam_score,
            interview_score,
            total_score: exam_score * EXAM_WEIGHT + interview_score * INTERVIEW_WEIGHT,
        }
    }
}

/// Outcome of a single trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// The whole cohort, highest total score first
    pub rankings: Vec<Student>,
    /// The candidate's 1-based position in `rankings`
    pub your_rank: usize,
    /// The candidate's total score in this trial
    pub total_score: f64,
    /// Wire name predates configurable thresholds; it means "reached top N"
    #[serde(rename = "entered_top_five")]
    pub entered_top_n: bool,
    pub is_first_place: bool,
}

impl TrialResult {
    /// The candidate's entry in the ranking.
    pub fn candidate(&self) -> Option<&Student> {
        self.your_rank
            .checked_sub(1)
            .and_then(|index| self.rankings.get(index))
    }
}

/// Aggregated outcome of every trial in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResults {
    /// Per-trial results in trial order
    pub results: Vec<TrialResult>,
    pub success_count: usize,
    pub first_place_count: usize,
    #[serde(rename = "top5_probability")]
    pub top_n_probability: f64,
    pub first_place_probability: f64,
}

impl AggregateResults {
    /// Tally trial outcomes. Fails on an empty run instead of producing NaN.
    pub fn from_trials(results: Vec<TrialResult>) -> SimulationResult<Self> {
        if results.is_empty() {
            return Err(SimulationError::invalid(
                "cannot aggregate a run with zero trials",
            ));
        }

        let success_count = results.iter().filter(|r| r.entered_top_n).count();
        let first_place_count = results.iter().filter(|r| r.is_first_place).count();
        let trials = results.len() as f64;

        Ok(Self {
            top_n_probability: success_count as f64 / trials,
            first_place_probability: first_place_count as f64 / trials,
            results,
            success_count,
            first_place_count,
        })
    }

    pub fn trials(&self) -> usize {
        self.results.len()
    }
}
