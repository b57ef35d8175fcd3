//! Offline subword learning by iterative pair merging.
//!
//! Every distinct term starts as a sequence of single characters. Each round
//! counts adjacent symbol pairs over all terms and merges the most frequent
//! one, until the best pair is no longer frequent enough. The final symbols
//! form the subword inventory.

use ahash::AHashMap;
use medterm_common::text::{split_latin_runs, strip_punctuation_and_spaces, to_half_width};
use medterm_common::MatcherConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::SubwordInventory;

/// One applied merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairMerge {
    pub left: String,
    pub right: String,
    pub frequency: usize,
}

/// Output of a learning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnedSubwords {
    /// Merges in the order they were applied
    pub merges: Vec<PairMerge>,
    /// Distinct final symbols with their occurrence counts, first-seen order
    pub subwords: Vec<(String, usize)>,
}

impl LearnedSubwords {
    pub fn inventory(&self) -> SubwordInventory {
        SubwordInventory::from_subwords(self.subwords.iter().map(|(s, _)| s.clone()))
    }
}

/// Pair-merging subword learner.
#[derive(Debug, Clone)]
pub struct SubwordLearner {
    merge_threshold: usize,
}

impl SubwordLearner {
    /// Merging continues while the best pair occurs more than `merge_threshold` times.
    pub fn new(merge_threshold: usize) -> Self {
        Self { merge_threshold }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(config.merge_threshold)
    }

    pub fn merge_threshold(&self) -> usize {
        self.merge_threshold
    }

    /// Width-normalise, drop Latin/digit runs, then strip punctuation and spaces.
    pub fn prepare_term(raw: &str) -> String {
        let (residual, _) = split_latin_runs(&to_half_width(raw));
        strip_punctuation_and_spaces(&residual)
    }

    pub fn learn<I, S>(&self, terms: I) -> LearnedSubwords
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = ahash::AHashSet::new();
        let mut words: Vec<Vec<String>> = Vec::new();
        for term in terms {
            let prepared = Self::prepare_term(term.as_ref());
            if prepared.is_empty() || !seen.insert(prepared.clone()) {
                continue;
            }
            words.push(prepared.chars().map(String::from).collect());
        }
        info!("Learning subwords from {} distinct terms", words.len());

        let mut merges = Vec::new();
        while let Some((left, right, frequency)) = most_frequent_pair(&words) {
            if frequency <= self.merge_threshold {
                break;
            }
            debug!("merge #{}: {}+{} ({})", merges.len() + 1, left, right, frequency);
            for word in words.iter_mut() {
                merge_pair(word, &left, &right);
            }
            merges.push(PairMerge { left, right, frequency });
        }

        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for symbol in words.iter().flatten() {
            let count = counts.entry(symbol.as_str()).or_insert(0);
            if *count == 0 {
                order.push(symbol.as_str());
            }
            *count += 1;
        }
        let subwords = order
            .into_iter()
            .map(|s| (s.to_string(), counts[s]))
            .collect::<Vec<_>>();

        info!("Applied {} merges, {} distinct subwords", merges.len(), subwords.len());
        LearnedSubwords { merges, subwords }
    }
}

/// Most frequent adjacent pair; ties go to the pair seen first.
fn most_frequent_pair(words: &[Vec<String>]) -> Option<(String, String, usize)> {
    let mut counts: AHashMap<(&str, &str), usize> = AHashMap::new();
    let mut order: Vec<(&str, &str)> = Vec::new();
    for word in words {
        for pair in word.windows(2) {
            let key = (pair[0].as_str(), pair[1].as_str());
            let count = counts.entry(key).or_insert(0);
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }
    }

    let mut best: Option<((&str, &str), usize)> = None;
    for key in order {
        let count = counts[&key];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((key, count));
        }
    }
    best.map(|((l, r), count)| (l.to_string(), r.to_string(), count))
}

/// Replace every non-overlapping `left right` occurrence, scanning left to right.
fn merge_pair(word: &mut Vec<String>, left: &str, right: &str) {
    if word.len() < 2 {
        return;
    }
    let mut merged = Vec::with_capacity(word.len());
    let mut i = 0;
    while i < word.len() {
        if i + 1 < word.len() && word[i] == left && word[i + 1] == right {
            merged.push(format!("{left}{right}"));
            i += 2;
        } else {
            merged.push(std::mem::take(&mut word[i]));
            i += 1;
        }
    }
    *word = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prepare_term() {
        assert_eq!(SubwordLearner::prepare_term("头颅ＣＴ平扫（急诊）"), "头颅平扫急诊");
        assert_eq!(SubwordLearner::prepare_term("阑尾 切除-术"), "阑尾切除术");
    }

    #[test]
    fn test_merges_above_threshold_only() {
        let terms = ["阑尾炎", "阑尾切除术", "阑尾脓肿", "胃炎", "肠炎"];
        let learned = SubwordLearner::new(2).learn(terms);

        // 阑+尾 occurs 3 times, every other pair at most twice
        assert_eq!(
            learned.merges,
            vec![PairMerge { left: "阑".into(), right: "尾".into(), frequency: 3 }]
        );
        let inventory = learned.inventory();
        assert!(inventory.contains("阑尾"));
        assert_eq!(inventory.max_len(), 2);
    }

    #[test]
    fn test_threshold_comes_from_config() {
        let terms = ["阑尾炎", "阑尾切除术", "阑尾脓肿"];

        let learner = SubwordLearner::from_config(&MatcherConfig::default());
        assert_eq!(learner.merge_threshold(), 500);
        assert!(learner.learn(terms).merges.is_empty());

        let config = MatcherConfig {
            merge_threshold: 2,
            ..MatcherConfig::default()
        };
        let learned = SubwordLearner::from_config(&config).learn(terms);
        assert_eq!(learned.merges.len(), 1);
        assert!(learned.inventory().contains("阑尾"));
    }

    #[test]
    fn test_chained_merges_and_counts() {
        let terms = ["冠脉造影", "冠脉支架", "冠脉搭桥", "脑血管造影"];
        let learned = SubwordLearner::new(1).learn(terms);

        assert_eq!(learned.merges[0].left, "冠");
        assert_eq!(learned.merges[0].right, "脉");
        assert_eq!(learned.merges[0].frequency, 3);

        let counts: AHashMap<String, usize> = learned.subwords.iter().cloned().collect();
        assert_eq!(counts.get("冠脉"), Some(&3));
        assert_eq!(counts.get("造影"), Some(&2));
    }

    #[test]
    fn test_duplicate_terms_counted_once() {
        let learned = SubwordLearner::new(1).learn(["胃镜", "胃镜", "胃镜"]);
        assert!(learned.merges.is_empty());
        assert_eq!(learned.subwords, vec![("胃".to_string(), 1), ("镜".to_string(), 1)]);
    }

    #[test]
    fn test_merge_pair_non_overlapping() {
        let mut word: Vec<String> = ["a", "a", "a"].iter().map(|s| s.to_string()).collect();
        merge_pair(&mut word, "a", "a");
        assert_eq!(word, vec!["aa".to_string(), "a".to_string()]);
    }
}
