//! # ranksim
//!
//! Monte Carlo estimate of how likely a candidate is to finish in the top N
//! of a cohort when exam scores are fixed and interview scores are noisy.
//!
//! ```no_run
//! use ranksim::{Configuration, SimulationConfig, SimulationEngine};
//!
//! let configuration = Configuration::new()
//!     .with_exam_score(80.0)
//!     .with_other_exam_scores(vec![70.0, 90.0])
//!     .with_top_n(1);
//!
//! let engine = SimulationEngine::new(SimulationConfig::new().with_seed(7));
//! let results = engine.run(&configuration).unwrap();
//! println!("first place: {:.2}", results.first_place_probability);
//! ```

pub mod core;
pub mod transport;

// Re-export commonly used types
pub use crate::core::errors::{SimulationError, SimulationResult};
pub use crate::core::execution::{run_simulations, ConcurrencyMode, SimulationConfig, SimulationEngine};
pub use crate::core::summary::{RunSummary, ScoreRange};
pub use crate::core::types::{AggregateResults, Configuration, Student, TrialResult};
