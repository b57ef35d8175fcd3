//! Term → vector resolution.
//!
//! Lookup order for a term:
//! 1. the term itself in the [`VectorTable`];
//! 2. otherwise the mean of every distinct vector found for its tokenizer
//!    tokens, its subwords, and all of its contiguous n-grams, negated when a
//!    negation marker was among the tokens/subwords.
//!
//! Resolution holds no mutable state; every call builds its own pool.

use std::sync::Arc;

use medterm_vocab::{SubwordSegmenter, VectorTable};
use tracing::trace;

use crate::pooling::{negate, VectorPool};
use crate::{NegationMarkers, Tokenizer};

/// The pieces a composed vector was built from.
#[derive(Debug, Clone, Default)]
pub struct Composition {
    pub pool: VectorPool,
    pub negated: bool,
}

impl Composition {
    /// Pool mean, sign-flipped when negated; `None` when nothing was found.
    pub fn into_vector(self) -> Option<Vec<f32>> {
        let mut mean = self.pool.mean()?;
        if self.negated {
            negate(&mut mean);
        }
        Some(mean)
    }
}

/// Resolves terms to vectors. Cheap to clone; all state is shared read-only.
#[derive(Clone)]
pub struct EmbeddingResolver {
    vectors: Arc<VectorTable>,
    segmenter: Arc<SubwordSegmenter>,
    tokenizer: Arc<dyn Tokenizer>,
    negation: NegationMarkers,
}

impl EmbeddingResolver {
    pub fn new(
        vectors: Arc<VectorTable>,
        segmenter: Arc<SubwordSegmenter>,
        tokenizer: Arc<dyn Tokenizer>,
        negation: NegationMarkers,
    ) -> Self {
        Self {
            vectors,
            segmenter,
            tokenizer,
            negation,
        }
    }

    pub fn vectors(&self) -> &VectorTable {
        &self.vectors
    }

    pub fn segmenter(&self) -> &SubwordSegmenter {
        &self.segmenter
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    pub fn negation(&self) -> &NegationMarkers {
        &self.negation
    }

    pub fn dim(&self) -> usize {
        self.vectors.dim()
    }

    /// Vector for `term`, or `None` when no piece of it is known.
    pub fn embed(&self, term: &str) -> Option<Vec<f32>> {
        if let Some(vector) = self.vectors.get(term) {
            return Some(vector.to_vec());
        }
        let vector = self.compose(term).into_vector();
        if vector.is_none() {
            trace!("no vector derivable for {:?}", term);
        }
        vector
    }

    /// Decompose an out-of-vocabulary term into known pieces.
    pub fn compose(&self, term: &str) -> Composition {
        let mut composition = Composition::default();

        let tokens = self.tokenizer.tokenize(term);
        let subwords = self.segmenter.segment(term);
        for piece in tokens.iter().chain(subwords.iter()) {
            if self.negation.is_marker(piece) {
                composition.negated = true;
                continue;
            }
            if piece.is_empty() {
                continue;
            }
            if let Some(vector) = self.vectors.get(piece) {
                composition.pool.insert(vector);
            }
        }

        // every contiguous substring of the original term
        let chars: Vec<char> = term.chars().collect();
        for start in 0..chars.len() {
            for end in start + 1..=chars.len() {
                let gram: String = chars[start..end].iter().collect();
                if self.negation.is_marker(&gram) {
                    continue;
                }
                if let Some(vector) = self.vectors.get(&gram) {
                    composition.pool.insert(vector);
                }
            }
        }

        composition
    }
}

impl std::fmt::Debug for EmbeddingResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingResolver")
            .field("vectors", &self.vectors.len())
            .field("dim", &self.vectors.dim())
            .field("negation", &self.negation)
            .finish()
    }
}
