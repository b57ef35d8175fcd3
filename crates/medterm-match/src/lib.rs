//! medterm-match — normalise free-text medical mentions to preferred terms.
//!
//! [`MatchPipeline`] runs one query through
//! INIT → SEGMENT → DIRECT_MATCH → ALIGN → RESOLVE → FINAL_RANK →
//! FREQUENCY_TIEBREAK and returns a [`MatchOutcome`] naming exactly one
//! preferred term, or [`MatchError::NoCandidate`].
//!
//! # Example
//!
//! ```ignore
//! use medterm_common::MatcherConfig;
//! use medterm_match::MatchPipeline;
//!
//! let config = MatcherConfig::from_toml_file("medterm.toml")?;
//! let pipeline = MatchPipeline::from_config(&config)?;
//! let outcome = pipeline.normalise("急性阑尾炎")?;
//! println!("{}", outcome.preferred);
//! ```

pub mod error;
pub mod pipeline;
pub mod batch;
pub mod evaluate;

pub use error::{MatchError, Result};
pub use evaluate::{evaluate, EvaluationMiss, EvaluationReport};
pub use pipeline::{MatchHit, MatchOutcome, MatchPipeline, Resolution, ScoredCandidate};
