//! General word tokenizer seam.
//!
//! The matcher treats word segmentation as a black box returning an ordered
//! token sequence. [`LexiconTokenizer`] is the built-in implementation: a
//! dictionary segmenter over an Aho-Corasick automaton.

use aho_corasick::{AhoCorasick, MatchKind};
use medterm_vocab::VectorTable;
use tracing::info;

use crate::Result;

/// Splits free text into an ordered sequence of tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Dictionary tokenizer using leftmost-longest matching.
///
/// Known words become tokens. Between matches, ASCII alphanumeric runs form
/// one token each and every other non-whitespace char is its own token.
pub struct LexiconTokenizer {
    /// `None` when the lexicon is empty
    automaton: Option<AhoCorasick>,
    word_count: usize,
}

impl LexiconTokenizer {
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .filter(|w| !w.trim().is_empty())
            .collect();
        patterns.sort();
        patterns.dedup();

        let word_count = patterns.len();
        let automaton = if patterns.is_empty() {
            None
        } else {
            Some(
                AhoCorasick::builder()
                    .match_kind(MatchKind::LeftmostLongest)
                    .build(&patterns)?,
            )
        };
        Ok(Self {
            automaton,
            word_count,
        })
    }

    /// Lexicon = every token that has a pretrained vector.
    pub fn from_vectors(vectors: &VectorTable) -> Result<Self> {
        let tokenizer = Self::new(vectors.tokens())?;
        info!("LexiconTokenizer loaded: {} words", tokenizer.word_count);
        Ok(tokenizer)
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

impl Tokenizer for LexiconTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut last = 0;
        if let Some(automaton) = &self.automaton {
            for mat in automaton.find_iter(text) {
                push_unknown(&text[last..mat.start()], &mut tokens);
                tokens.push(text[mat.start()..mat.end()].to_string());
                last = mat.end();
            }
        }
        push_unknown(&text[last..], &mut tokens);
        tokens
    }
}

/// Tokens for a stretch no lexicon word covers.
fn push_unknown(gap: &str, tokens: &mut Vec<String>) {
    let mut run = String::new();
    for c in gap.chars() {
        if c.is_ascii_alphanumeric() {
            run.push(c);
            continue;
        }
        if !run.is_empty() {
            tokens.push(std::mem::take(&mut run));
        }
        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }
    if !run.is_empty() {
        tokens.push(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_longest_word_wins() {
        let tok = LexiconTokenizer::new(["阑尾", "阑尾炎", "急性"]).unwrap();
        assert_eq!(tok.tokenize("急性阑尾炎"), vec!["急性", "阑尾炎"]);
    }

    #[test]
    fn test_unknown_stretches() {
        let tok = LexiconTokenizer::new(["增强"]).unwrap();
        assert_eq!(
            tok.tokenize("头颅ct增强 2次"),
            vec!["头", "颅", "ct", "增强", "2", "次"]
        );
    }

    #[test]
    fn test_empty_lexicon() {
        let tok = LexiconTokenizer::new(Vec::<String>::new()).unwrap();
        assert_eq!(tok.word_count(), 0);
        assert_eq!(tok.tokenize("胃镜"), vec!["胃", "镜"]);
        assert!(tok.tokenize("").is_empty());
    }

    #[test]
    fn test_from_vectors() {
        let vectors = VectorTable::from_entries(2, [("胃镜", vec![1.0, 0.0])]).unwrap();
        let tok = LexiconTokenizer::from_vectors(&vectors).unwrap();
        assert_eq!(tok.tokenize("胃镜检查"), vec!["胃镜", "检", "查"]);
    }
}
