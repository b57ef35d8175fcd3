//! Cosine similarity and top-K selection over the synonym index.

use medterm_embed::SynonymVectorIndex;
use medterm_vocab::TermDictionary;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One ranked position in the synonym index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub score: f64,
    /// Position in the [`SynonymVectorIndex`]
    pub index: usize,
}

/// A ranked candidate resolved to its dictionary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTerm {
    pub synonym: String,
    pub preferred: String,
    pub similarity: f64,
    /// First dictionary row carrying `synonym`
    pub row: usize,
}

/// Cosine similarity of two vectors, computed in f64.
///
/// A zero vector on either side (or any NaN) scores `f64::NEG_INFINITY`, so
/// it always sorts last.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

/// Similarity of `query` to every row of `matrix`, in row order.
pub fn cosine_similarity(query: &[f32], matrix: &[Vec<f32>]) -> Vec<f64> {
    matrix.iter().map(|row| cosine(query, row)).collect()
}

/// The `k` best index entries, descending by score.
///
/// Equal scores keep index order, so repeated calls on the same input return
/// the same list.
pub fn top_k(query: &[f32], index: &SynonymVectorIndex, k: usize) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = cosine_similarity(query, index.vectors())
        .into_iter()
        .enumerate()
        .map(|(index, score)| RankedCandidate { score, index })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    ranked.truncate(k);
    debug!("top_k: kept {} of {} index entries", ranked.len(), index.len());
    ranked
}

/// Resolve ranked index positions to `(synonym, preferred)` dictionary rows.
///
/// Positions that do not resolve (index and dictionary out of sync) are
/// skipped.
pub fn map_to_terms(
    ranked: &[RankedCandidate],
    index: &SynonymVectorIndex,
    dictionary: &TermDictionary,
) -> Vec<RankedTerm> {
    ranked
        .iter()
        .filter_map(|candidate| {
            let row = index.row(candidate.index)?;
            let entry = dictionary.get(row)?;
            Some(RankedTerm {
                synonym: entry.synonym.clone(),
                preferred: entry.preferred.clone(),
                similarity: candidate.score,
                row,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn index(vectors: &[(&str, usize, Vec<f32>)]) -> SynonymVectorIndex {
        let mut index = SynonymVectorIndex::new(2);
        for (term, row, vector) in vectors {
            index.push(*term, *row, vector.clone()).unwrap();
        }
        index
    }

    #[test]
    fn test_hand_computed_scores() {
        let scores = cosine_similarity(&[1.0, 0.0], &[vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(scores, vec![1.0, 0.0]);
    }

    #[test]
    fn test_self_similarity_is_one() {
        for v in [vec![0.3f32, -2.0], vec![5.0, 5.0], vec![-1.0, 0.001]] {
            assert!((cosine(&v, &v) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_vector_scores_lowest() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), f64::NEG_INFINITY);
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 0.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_top_k_order_and_ties() {
        let idx = index(&[
            ("a", 0, vec![0.0, 1.0]),
            ("b", 1, vec![1.0, 0.0]),
            ("c", 2, vec![0.0, 0.0]),
            ("d", 3, vec![2.0, 0.0]),
        ]);
        let ranked = top_k(&[1.0, 0.0], &idx, 3);
        let order: Vec<usize> = ranked.iter().map(|c| c.index).collect();
        assert_eq!(order, vec![1, 3, 0]);
        assert_eq!(ranked[0].score, ranked[1].score);

        let all = top_k(&[1.0, 0.0], &idx, 10);
        assert_eq!(all.len(), 4);
        assert_eq!(all[3].index, 2);
        assert_eq!(all[3].score, f64::NEG_INFINITY);
    }

    #[test]
    fn test_top_k_is_deterministic() {
        let idx = index(&[
            ("a", 0, vec![0.5, 0.5]),
            ("b", 1, vec![0.5, 0.5]),
            ("c", 2, vec![0.1, 0.9]),
        ]);
        let first = top_k(&[0.4, 0.6], &idx, 2);
        for _ in 0..5 {
            assert_eq!(top_k(&[0.4, 0.6], &idx, 2), first);
        }
    }

    #[test]
    fn test_map_to_terms() {
        let dict = TermDictionary::from_pairs([("阑尾炎", "阑尾炎"), ("阑尾炎", "急性阑尾炎")]);
        let idx = index(&[("阑尾炎", 0, vec![1.0, 0.0]), ("急性阑尾炎", 1, vec![1.0, 1.0])]);
        let ranked = top_k(&[0.0, 1.0], &idx, 2);
        let terms = map_to_terms(&ranked, &idx, &dict);

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].synonym, "急性阑尾炎");
        assert_eq!(terms[0].preferred, "阑尾炎");
        assert_eq!(terms[0].row, 1);
        assert_eq!(terms[1].synonym, "阑尾炎");
    }
}
