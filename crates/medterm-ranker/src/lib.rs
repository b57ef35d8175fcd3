//! medterm-ranker — candidate ranking for the match pipeline.
//!
//! Two stages:
//! - [`similarity`]: cosine similarity of a query vector against the
//!   [`SynonymVectorIndex`](medterm_embed::SynonymVectorIndex), deterministic
//!   top-K, and mapping ranked rows back to dictionary terms.
//! - [`frequency`]: the subword-overlap tie-break applied to the top-K.

pub mod similarity;
pub mod frequency;

pub use frequency::{frequency_score, frequency_scores, select_by_frequency};
pub use similarity::{cosine_similarity, map_to_terms, top_k, RankedCandidate, RankedTerm};
