//! Error types for the embedding service.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EmbedError>;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Vocabulary error: {0}")]
    Vocab(#[from] medterm_vocab::VocabError),
}

impl From<aho_corasick::BuildError> for EmbedError {
    fn from(e: aho_corasick::BuildError) -> Self {
        EmbedError::Tokenizer(e.to_string())
    }
}
