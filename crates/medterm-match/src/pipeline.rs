//! The match pipeline state machine.
//!
//! One query is processed start to finish:
//!
//! | state | work |
//! |---|---|
//! | INIT | strip punctuation, lowercase ASCII, split off Latin runs |
//! | SEGMENT | subwords of the residual text + Latin runs = surface subwords |
//! | DIRECT_MATCH | surface subwords found as preferred terms or synonyms |
//! | ALIGN | char spans of the hits, and the uncovered fragments between them |
//! | RESOLVE | a single hit with no gaps is final; otherwise build a candidate pool |
//! | FINAL_RANK | mean pool vector, cosine top-K over the synonym index |
//! | FREQUENCY_TIEBREAK | subword overlap with the query, then similarity |
//!
//! All state is per query; the pipeline itself is read-only after
//! construction and can be shared across threads.

use std::sync::Arc;

use ahash::AHashSet;
use medterm_common::kmp::find_str;
use medterm_common::text::{
    char_len, char_slice, normalise_query, split_latin_runs, strip_punctuation, NormalisedQuery,
};
use medterm_common::MatcherConfig;
use medterm_embed::{
    EmbedError, EmbeddingResolver, LexiconTokenizer, NegationMarkers, SynonymVectorIndex,
    Tokenizer, VectorPool,
};
use medterm_ranker::{frequency_scores, map_to_terms, select_by_frequency, top_k};
use medterm_vocab::{SubwordInventory, SubwordSegmenter, TermDictionary, VectorTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{MatchError, Result};

// ── Outcome ───────────────────────────────────────────────────────────────────

/// How the final preferred term was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Exactly one direct hit covering the whole query
    Direct,
    /// Embedding rerank followed by the frequency tie-break
    Ranked,
}

/// A surface subword found in the dictionary, with its char span in the
/// normalised query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchHit {
    pub fragment: String,
    pub preferred: String,
    pub start: usize,
    pub end: usize,
}

/// One of the final top-K candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub preferred: String,
    pub synonym: String,
    pub similarity: f64,
    /// The synonym's own subword decomposition
    pub subwords: Vec<String>,
    /// How many of `subwords` occur in the query decomposition
    pub frequency: usize,
}

/// Result of normalising one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub query: String,
    pub preferred: String,
    pub resolution: Resolution,
    pub surface_subwords: Vec<String>,
    /// Preferred term of every direct match in surface order, including
    /// matches whose span could not be located
    pub matched: Vec<String>,
    /// Located matches, stably sorted by span end
    pub hits: Vec<MatchHit>,
    pub unmatched: Vec<String>,
    /// Empty for [`Resolution::Direct`]
    pub candidates: Vec<ScoredCandidate>,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct MatchPipeline {
    dictionary: Arc<TermDictionary>,
    resolver: EmbeddingResolver,
    index: Arc<SynonymVectorIndex>,
    final_top_k: usize,
    min_match_chars: usize,
    parallel_threshold: usize,
}

impl MatchPipeline {
    /// Assemble a pipeline from loaded artifacts and build the synonym index.
    pub fn new(
        dictionary: TermDictionary,
        inventory: SubwordInventory,
        vectors: VectorTable,
        tokenizer: Arc<dyn Tokenizer>,
        config: &MatcherConfig,
    ) -> Result<Self> {
        config.validate()?;
        if vectors.dim() != config.vector_dim {
            return Err(EmbedError::DimensionMismatch {
                expected: config.vector_dim,
                got: vectors.dim(),
            }
            .into());
        }

        let resolver = EmbeddingResolver::new(
            Arc::new(vectors),
            Arc::new(SubwordSegmenter::new(inventory)),
            tokenizer,
            NegationMarkers::new(config.negation_markers.iter().cloned()),
        );
        let index = SynonymVectorIndex::build(&dictionary, &resolver);

        info!(
            "MatchPipeline ready: {} dictionary rows, {} indexed synonyms, top-{}",
            dictionary.len(),
            index.len(),
            config.final_top_k
        );
        Ok(Self {
            dictionary: Arc::new(dictionary),
            resolver,
            index: Arc::new(index),
            final_top_k: config.final_top_k,
            min_match_chars: config.min_match_chars,
            parallel_threshold: config.parallel_threshold,
        })
    }

    /// Load all three artifacts named in `config` and use the lexicon
    /// tokenizer over the vector vocabulary.
    pub fn from_config(config: &MatcherConfig) -> Result<Self> {
        config.validate()?;
        let paths = &config.artifacts;
        let inventory = SubwordInventory::from_csv_path(&paths.subword_inventory)?;
        let dictionary = TermDictionary::from_csv_path(&paths.term_dictionary)?;
        let vectors = VectorTable::from_path(&paths.word_vectors, config.vector_dim)?;
        let tokenizer = Arc::new(LexiconTokenizer::from_vectors(&vectors)?);
        Self::new(dictionary, inventory, vectors, tokenizer, config)
    }

    pub fn dictionary(&self) -> &TermDictionary {
        &self.dictionary
    }

    pub fn resolver(&self) -> &EmbeddingResolver {
        &self.resolver
    }

    pub fn index(&self) -> &SynonymVectorIndex {
        &self.index
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Resolve `query` to exactly one preferred term.
    pub fn normalise(&self, query: &str) -> Result<MatchOutcome> {
        // INIT
        let normalised = normalise_query(query);
        debug!("[init] {:?} -> {:?} latin={:?}", query, normalised.text, normalised.latin);

        // SEGMENT
        let surface_subwords = self.surface_subwords(&normalised);
        debug!("[segment] surface subwords {:?}", surface_subwords);

        // DIRECT_MATCH
        let (matched, mut hits) = self.direct_matches(&normalised.text, &surface_subwords);
        debug!("[direct_match] {} matches, {} located", matched.len(), hits.len());

        // ALIGN
        hits.sort_by_key(|hit| hit.end);
        let unmatched = unmatched_fragments(&normalised.text, &hits);
        debug!("[align] unmatched fragments {:?}", unmatched);

        // RESOLVE
        if unmatched.is_empty() && matched.len() == 1 {
            let preferred = matched[0].clone();
            debug!("[resolve] single direct match {:?}", preferred);
            return Ok(MatchOutcome {
                query: query.to_string(),
                preferred,
                resolution: Resolution::Direct,
                surface_subwords,
                matched,
                hits,
                unmatched,
                candidates: Vec::new(),
            });
        }

        let tokens = self.resolver.tokenizer().tokenize(&normalised.residual);
        let pool = union_in_order(
            matched
                .iter()
                .map(String::as_str)
                .chain(unmatched.iter().map(String::as_str))
                .chain(surface_subwords.iter().map(String::as_str))
                .chain(tokens.iter().map(String::as_str)),
        );
        debug!("[resolve] candidate pool {:?}", pool);

        // FINAL_RANK + FREQUENCY_TIEBREAK
        let (candidates, winner) = self.rank(query, &normalised, &pool)?;
        let preferred = candidates[winner].preferred.clone();
        debug!("[frequency_tiebreak] {:?} -> {:?}", query, preferred);

        Ok(MatchOutcome {
            query: query.to_string(),
            preferred,
            resolution: Resolution::Ranked,
            surface_subwords,
            matched,
            hits,
            unmatched,
            candidates,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────

    /// Residual-text subwords followed by the Latin runs, split on whitespace.
    fn surface_subwords(&self, normalised: &NormalisedQuery) -> Vec<String> {
        self.resolver
            .segmenter()
            .segment(&normalised.residual)
            .iter()
            .chain(normalised.latin.iter())
            .flat_map(|piece| piece.split_whitespace())
            .map(str::to_string)
            .collect()
    }

    /// Preferred terms first, then synonyms; fragments shorter than
    /// `min_match_chars` are skipped.
    ///
    /// Returns every matched preferred term, and the hits whose fragment
    /// could be located in `text`. A match without a span keeps its
    /// preferred term.
    fn direct_matches(
        &self,
        text: &str,
        surface_subwords: &[String],
    ) -> (Vec<String>, Vec<MatchHit>) {
        let mut matched = Vec::new();
        let mut hits = Vec::new();
        for fragment in surface_subwords {
            if char_len(fragment) < self.min_match_chars {
                continue;
            }
            let Some(preferred) = self.dictionary.resolve(fragment) else {
                continue;
            };
            debug!("[direct_match] {:?} -> {:?}", fragment, preferred);
            matched.push(preferred.to_string());

            let Some(start) = find_str(text, fragment) else {
                warn!("Matched subword {:?} not found in {:?}; span dropped", fragment, text);
                continue;
            };
            hits.push(MatchHit {
                fragment: fragment.clone(),
                preferred: preferred.to_string(),
                start,
                end: start + char_len(fragment),
            });
        }
        (matched, hits)
    }

    /// Rank the synonym index against the pool's mean vector and apply the
    /// frequency tie-break. Returns the candidates and the winner's position.
    fn rank(
        &self,
        query: &str,
        normalised: &NormalisedQuery,
        pool: &[String],
    ) -> Result<(Vec<ScoredCandidate>, usize)> {
        let no_candidate = || MatchError::NoCandidate {
            query: query.to_string(),
        };

        let mut vectors = VectorPool::new();
        for candidate in pool {
            match self.resolver.embed(candidate) {
                Some(vector) => {
                    vectors.insert(&vector);
                }
                None => debug!("[final_rank] no vector for {:?}", candidate),
            }
        }
        let mean = vectors.mean().ok_or_else(no_candidate)?;

        let ranked = top_k(&mean, &self.index, self.final_top_k);
        let terms = map_to_terms(&ranked, &self.index, &self.dictionary);

        let decompositions: Vec<Vec<String>> =
            terms.iter().map(|term| self.decompose(&term.synonym)).collect();
        let query_subwords = self.query_decomposition(normalised);
        let frequencies = frequency_scores(&decompositions, &query_subwords);
        let similarities: Vec<f64> = terms.iter().map(|term| term.similarity).collect();
        let winner = select_by_frequency(&frequencies, &similarities).ok_or_else(no_candidate)?;

        let candidates = terms
            .into_iter()
            .zip(decompositions)
            .zip(frequencies)
            .map(|((term, subwords), frequency)| ScoredCandidate {
                preferred: term.preferred,
                synonym: term.synonym,
                similarity: term.similarity,
                subwords,
                frequency,
            })
            .collect::<Vec<_>>();

        for candidate in &candidates {
            debug!(
                "[final_rank] {:?} -> {:?} similarity={:.4} frequency={}",
                candidate.synonym, candidate.preferred, candidate.similarity, candidate.frequency
            );
        }
        Ok((candidates, winner))
    }

    /// Subwords of a dictionary synonym with punctuation and Latin runs removed.
    fn decompose(&self, synonym: &str) -> Vec<String> {
        let (residual, _) = split_latin_runs(&strip_punctuation(synonym));
        non_empty(self.resolver.segmenter().segment(&residual))
    }

    /// Subwords of the whole normalised query, Latin runs included.
    fn query_decomposition(&self, normalised: &NormalisedQuery) -> Vec<String> {
        self.resolver
            .segmenter()
            .segment(&normalised.text)
            .iter()
            .flat_map(|piece| piece.split_whitespace())
            .map(str::to_string)
            .collect()
    }
}

impl std::fmt::Debug for MatchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchPipeline")
            .field("dictionary", &self.dictionary.len())
            .field("index", &self.index.len())
            .field("final_top_k", &self.final_top_k)
            .field("min_match_chars", &self.min_match_chars)
            .finish()
    }
}

/// Uncovered stretches of `text` around `hits` (sorted by end), empties dropped.
///
/// The cursor jumps to each hit's end, so when hits share an end the first
/// of them in match order decides the gap before them.
fn unmatched_fragments(text: &str, hits: &[MatchHit]) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut cursor = 0;
    for hit in hits {
        fragments.push(char_slice(text, cursor, hit.start));
        cursor = hit.end;
    }
    fragments.push(char_slice(text, cursor, char_len(text)));
    non_empty(fragments)
}

fn non_empty(pieces: Vec<String>) -> Vec<String> {
    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

/// First-occurrence union, empties dropped.
fn union_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = AHashSet::new();
    items
        .filter(|item| !item.is_empty() && seen.insert(*item))
        .map(str::to_string)
        .collect()
}
