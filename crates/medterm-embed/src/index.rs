//! Synonym vector index.
//!
//! Parallel arrays over the dictionary: `vectors[i]` is the composed
//! embedding of `terms[i]`, and `rows[i]` is the first dictionary row that
//! carries that synonym. Synonyms with no derivable vector are left out.
//! Built once per dictionary and reused for every query.

use medterm_common::text::strip_punctuation;
use medterm_vocab::TermDictionary;
use tracing::info;

use crate::pooling::mean_pool;
use crate::{EmbedError, EmbeddingResolver, Result};

#[derive(Debug, Clone, Default)]
pub struct SynonymVectorIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
    terms: Vec<String>,
    rows: Vec<usize>,
}

impl SynonymVectorIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            ..Default::default()
        }
    }

    /// Embed every dictionary synonym through its subwords.
    ///
    /// A synonym's vector is the plain mean of its subwords' vectors; the
    /// synonym string itself is never looked up directly.
    pub fn build(dictionary: &TermDictionary, resolver: &EmbeddingResolver) -> Self {
        let mut index = Self::new(resolver.dim());

        for (row, entry) in dictionary.entries().iter().enumerate() {
            let term = strip_punctuation(&entry.synonym);
            let pieces: Vec<Vec<f32>> = resolver
                .segmenter()
                .segment(&term)
                .iter()
                .filter(|sub| !sub.is_empty())
                .filter_map(|sub| resolver.embed(sub))
                .collect();

            if let Some(vector) = mean_pool(&pieces) {
                let first_row = dictionary.synonym_row(&entry.synonym).unwrap_or(row);
                index.vectors.push(vector);
                index.terms.push(term);
                index.rows.push(first_row);
            }
        }

        info!(
            "Synonym index built: {} of {} dictionary rows carry a vector",
            index.len(),
            dictionary.len()
        );
        index
    }

    /// Append one entry; the vector must match the index dimension.
    pub fn push(&mut self, term: impl Into<String>, row: usize, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dim {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dim,
                got: vector.len(),
            });
        }
        self.vectors.push(vector);
        self.terms.push(term.into());
        self.rows.push(row);
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn term(&self, i: usize) -> Option<&str> {
        self.terms.get(i).map(String::as_str)
    }

    /// Dictionary row backing index entry `i`.
    pub fn row(&self, i: usize) -> Option<usize> {
        self.rows.get(i).copied()
    }
}
