//! Subword-frequency tie-break.
//!
//! After similarity ranking, each surviving candidate is scored by how many
//! of its own subwords occur somewhere in the query's subword decomposition.
//! The highest overlap wins; similarity only decides between candidates
//! with the same overlap.

use medterm_common::kmp::contains_str;

/// Number of `candidate_subwords` found inside `query_decomposition`.
///
/// Empty subwords never count.
pub fn frequency_score(candidate_subwords: &[String], query_decomposition: &str) -> usize {
    candidate_subwords
        .iter()
        .filter(|sub| contains_str(query_decomposition, sub))
        .count()
}

/// [`frequency_score`] for every candidate against the space-joined query
/// subwords.
pub fn frequency_scores(candidates: &[Vec<String>], query_subwords: &[String]) -> Vec<usize> {
    let joined = query_subwords.join(" ");
    candidates
        .iter()
        .map(|subwords| frequency_score(subwords, &joined))
        .collect()
}

/// Position of the winning candidate.
///
/// Maximum frequency first, then highest similarity, then earliest position.
/// `None` when there are no candidates.
pub fn select_by_frequency(frequencies: &[usize], similarities: &[f64]) -> Option<usize> {
    let best_frequency = *frequencies.iter().max()?;
    let mut winner: Option<usize> = None;
    for (i, (&frequency, &similarity)) in frequencies.iter().zip(similarities).enumerate() {
        if frequency != best_frequency {
            continue;
        }
        match winner {
            Some(w) if similarities[w] >= similarity => {}
            _ => winner = Some(i),
        }
    }
    winner
}
