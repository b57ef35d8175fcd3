//! medterm vocabulary artifacts.
//!
//! The matcher consumes three read-only artifacts, all loaded once at
//! startup:
//! - [`SubwordInventory`]: learned subword fragments (plus their max length)
//! - [`TermDictionary`]: preferred term ↔ synonym rows
//! - [`VectorTable`]: pretrained token vectors
//!
//! [`SubwordSegmenter`] splits text against the inventory with forward and
//! backward maximum matching. [`SubwordLearner`] and
//! [`TermDictionary::from_knowledge_graph_json`] are the offline producers.

pub mod inventory;
pub mod dictionary;
pub mod vectors;
pub mod segmenter;
pub mod learner;

pub use dictionary::{TermDictionary, TermEntry};
pub use inventory::SubwordInventory;
pub use learner::{LearnedSubwords, PairMerge, SubwordLearner};
pub use segmenter::SubwordSegmenter;
pub use vectors::VectorTable;

pub type Result<T> = std::result::Result<T, VocabError>;

#[derive(Debug, thiserror::Error)]
pub enum VocabError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid artifact {artifact}: {reason}")]
    InvalidArtifact { artifact: String, reason: String },

    #[error("Subword inventory is empty")]
    EmptyInventory,
}
