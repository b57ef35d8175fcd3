//! medterm Embedding Service
//!
//! Resolves any term to a vector built from the pretrained token table:
//! a direct lookup when the term is known, otherwise the mean of every
//! known piece it decomposes into (tokenizer output, subwords, n-grams),
//! flipped in sign when the term carries a negation marker.
//!
//! # Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use medterm_embed::{EmbeddingResolver, LexiconTokenizer, NegationMarkers};
//!
//! let tokenizer = Arc::new(LexiconTokenizer::from_vectors(&vectors)?);
//! let resolver = EmbeddingResolver::new(vectors, segmenter, tokenizer, NegationMarkers::default());
//! let vector = resolver.embed("急性阑尾炎");
//! ```

pub mod error;
pub mod tokenizer;
pub mod negation;
pub mod pooling;
pub mod resolver;
pub mod index;

pub use error::{EmbedError, Result};
pub use index::SynonymVectorIndex;
pub use negation::NegationMarkers;
pub use pooling::VectorPool;
pub use resolver::{Composition, EmbeddingResolver};
pub use tokenizer::{LexiconTokenizer, Tokenizer};
