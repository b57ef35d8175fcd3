use medterm_common::TermError;
use medterm_embed::EmbedError;
use medterm_vocab::VocabError;

pub type Result<T> = std::result::Result<T, MatchError>;

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// Nothing in the candidate pool had a derivable vector.
    #[error("No candidate for query {query:?}")]
    NoCandidate { query: String },

    #[error("Vocabulary error: {0}")]
    Vocab(#[from] VocabError),

    #[error("Embedding error: {0}")]
    Embed(#[from] EmbedError),

    #[error("Configuration error: {0}")]
    Config(#[from] TermError),
}
