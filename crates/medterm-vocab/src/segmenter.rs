//! Subword segmentation by dual-direction maximum matching.
//!
//! The forward pass (FMM) walks left to right taking the longest inventory
//! prefix, the backward pass (BMM) walks right to left taking the longest
//! inventory suffix. Single characters are always accepted, so both passes
//! always tile the whole input. The result is the union of both passes.

use crate::SubwordInventory;

/// Splits terms into subwords against a fixed inventory.
#[derive(Debug, Clone)]
pub struct SubwordSegmenter {
    inventory: SubwordInventory,
    /// Window bound; at least 1 so an empty inventory still segments
    window: usize,
}

impl SubwordSegmenter {
    pub fn new(inventory: SubwordInventory) -> Self {
        let window = inventory.max_len().max(1);
        Self { inventory, window }
    }

    pub fn inventory(&self) -> &SubwordInventory {
        &self.inventory
    }

    /// Union of the forward and backward passes, duplicates collapsed.
    ///
    /// Order is forward-pass first occurrence followed by backward-only
    /// fragments; callers must treat it as a set. An empty term yields the
    /// single empty-string sentinel, which callers filter out.
    pub fn segment(&self, term: &str) -> Vec<String> {
        let chars: Vec<char> = term.chars().collect();
        if chars.is_empty() {
            return vec![String::new()];
        }

        let mut fragments = self.forward(&chars);
        fragments.extend(self.backward(&chars));
        dedup_in_order(fragments)
    }

    /// Forward maximum matching: fragments in left-to-right order.
    pub fn forward(&self, chars: &[char]) -> Vec<String> {
        let mut fragments = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let longest = self.window.min(chars.len() - start);
            let len = (1..=longest)
                .rev()
                .find(|&len| len == 1 || self.known(&chars[start..start + len]))
                .unwrap_or(1);
            fragments.push(chars[start..start + len].iter().collect());
            start += len;
        }
        fragments
    }

    /// Backward maximum matching: fragments in right-to-left order.
    pub fn backward(&self, chars: &[char]) -> Vec<String> {
        let mut fragments = Vec::new();
        let mut end = chars.len();
        while end > 0 {
            let longest = self.window.min(end);
            let len = (1..=longest)
                .rev()
                .find(|&len| len == 1 || self.known(&chars[end - len..end]))
                .unwrap_or(1);
            fragments.push(chars[end - len..end].iter().collect());
            end -= len;
        }
        fragments
    }

    fn known(&self, window: &[char]) -> bool {
        let candidate: String = window.iter().collect();
        self.inventory.contains(&candidate)
    }
}

fn dedup_in_order(fragments: Vec<String>) -> Vec<String> {
    let mut seen = ahash::AHashSet::new();
    fragments
        .into_iter()
        .filter(|f| seen.insert(f.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter(subwords: &[&str]) -> SubwordSegmenter {
        SubwordSegmenter::new(SubwordInventory::from_subwords(subwords.iter().copied()))
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_whole_unit_subword() {
        let seg = segmenter(&["阑尾炎"]);
        let mut subs = seg.segment("急性阑尾炎");
        subs.sort();
        let mut expected = vec!["急".to_string(), "性".to_string(), "阑尾炎".to_string()];
        expected.sort();
        assert_eq!(subs, expected);
    }

    #[test]
    fn test_forward_and_backward_differ() {
        // FMM: 阑尾 | 切除 | 术 ; BMM: 阑尾 | 切 | 除术
        let seg = segmenter(&["阑尾", "切除", "除术"]);
        let input = chars("阑尾切除术");
        assert_eq!(seg.forward(&input), vec!["阑尾", "切除", "术"]);
        assert_eq!(seg.backward(&input), vec!["除术", "切", "阑尾"]);

        let subs = seg.segment("阑尾切除术");
        assert_eq!(subs, vec!["阑尾", "切除", "术", "除术", "切"]);
    }

    #[test]
    fn test_empty_input_yields_sentinel() {
        let seg = segmenter(&["阑尾炎"]);
        assert_eq!(seg.segment(""), vec![String::new()]);
    }

    #[test]
    fn test_empty_inventory_splits_into_chars() {
        let seg = segmenter(&[]);
        assert_eq!(seg.segment("胃镜"), vec!["胃", "镜"]);
    }

    #[test]
    fn test_both_passes_cover_input() {
        let seg = segmenter(&["冠状动脉", "动脉", "造影", "脉造", "冠状"]);
        for term in ["冠状动脉造影术", "左冠状动脉", "造", "x冠状y"] {
            let input = chars(term);
            let forward: String = seg.forward(&input).concat();
            let mut backward = seg.backward(&input);
            backward.reverse();
            assert_eq!(forward, term);
            assert_eq!(backward.concat(), term);

            // every char is covered by some fragment of the union
            let union = seg.segment(term);
            for c in term.chars() {
                assert!(union.iter().any(|f| f.contains(c)), "{c} uncovered in {term}");
            }
        }
    }

    #[test]
    fn test_duplicates_collapsed() {
        let seg = segmenter(&["胃镜"]);
        assert_eq!(seg.segment("胃镜胃镜"), vec!["胃镜"]);
    }
}
