//! Self-evaluation over the term dictionary.
//!
//! Every synonym row is fed back through the pipeline; a hit is when the
//! produced preferred term equals the row's preferred term.

use medterm_vocab::TermDictionary;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::MatchPipeline;

/// A dictionary row the pipeline got wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationMiss {
    pub query: String,
    pub expected: String,
    /// `None` when the pipeline found no candidate
    pub produced: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub misses: Vec<EvaluationMiss>,
}

/// Run every synonym in `dictionary` through `pipeline`.
///
/// Failed queries count as misses; the run always completes.
pub fn evaluate(pipeline: &MatchPipeline, dictionary: &TermDictionary) -> EvaluationReport {
    let mut correct = 0usize;
    let mut misses = Vec::new();

    for entry in dictionary.entries() {
        let produced = match pipeline.normalise(&entry.synonym) {
            Ok(outcome) => Some(outcome.preferred),
            Err(e) => {
                debug!("Evaluation query {:?} failed: {}", entry.synonym, e);
                None
            }
        };

        if produced.as_deref() == Some(entry.preferred.as_str()) {
            correct += 1;
        } else {
            misses.push(EvaluationMiss {
                query: entry.synonym.clone(),
                expected: entry.preferred.clone(),
                produced,
            });
        }
    }

    let total = dictionary.len();
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    };
    info!("Evaluation: {}/{} correct (accuracy {:.4})", correct, total, accuracy);

    EvaluationReport {
        total,
        correct,
        accuracy,
        misses,
    }
}
