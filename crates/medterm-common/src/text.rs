//! Text normalisation shared by the offline tooling and the online matcher.
//!
//! All offsets handed out by this module are char offsets, never byte
//! offsets: terms are mostly CJK and a byte index is meaningless to callers.

use std::sync::LazyLock;

use regex::Regex;

/// Punctuation removed from queries and dictionary terms.
///
/// Spaces are deliberately absent: the online matcher keeps them, the
/// offline tooling strips them with [`strip_punctuation_and_spaces`].
pub const PUNCTUATION: &[char] = &[
    '(', ')', '[', ']', '，', '。', '！', ',', '.', '!', '_', '\n', '-', '/',
    '?', '？', ':', '：', '{', '}', '「', '」', '@', '#', '$', '%', '^', '&', '*',
    '+', '=', '"', '~', '`', '|', '<', '>', '…', '￥', '〔', '〕', '“', '”', '—', '\\',
    '\'', ';', '、', '↓', '≤', '≥', '①', '②', '─', '【', '】', '°', '·', '﹒', '､',
    '『', '』', '｜',
];

static LATIN_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9]+").expect("static latin-run pattern"));

/// Remove every [`PUNCTUATION`] char.
pub fn strip_punctuation(term: &str) -> String {
    term.chars().filter(|c| !PUNCTUATION.contains(c)).collect()
}

/// Offline variant: punctuation and plain spaces are both removed.
pub fn strip_punctuation_and_spaces(term: &str) -> String {
    term.chars()
        .filter(|c| *c != ' ' && !PUNCTUATION.contains(c))
        .collect()
}

/// Full-width → half-width conversion (ideographic space and U+FF01..U+FF5E).
pub fn to_half_width(term: &str) -> String {
    term.chars()
        .map(|c| match c as u32 {
            0x3000 => ' ',
            code @ 0xFF01..=0xFF5E => char::from_u32(code - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Split out ASCII alphanumeric runs.
///
/// Returns the residual text with every run removed, and the runs themselves
/// lowercased in order of appearance.
pub fn split_latin_runs(term: &str) -> (String, Vec<String>) {
    let runs: Vec<String> = LATIN_RUN
        .find_iter(term)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect();
    let residual = LATIN_RUN.replace_all(term, "").into_owned();
    (residual, runs)
}

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Substring of `s` between char offsets `start..end` (clamped, empty when inverted).
pub fn char_slice(s: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    s.chars().skip(start).take(end - start).collect()
}

/// A query after the INIT stage of the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalisedQuery {
    /// Punctuation-stripped, ASCII-lowercased query; spans refer to this text
    pub text: String,
    /// `text` with the Latin runs removed; this is what gets segmented
    pub residual: String,
    /// Lowercased Latin/digit runs extracted from `text`
    pub latin: Vec<String>,
}

/// Strip punctuation, lowercase ASCII, and separate the Latin remainder.
pub fn normalise_query(raw: &str) -> NormalisedQuery {
    let text = strip_punctuation(raw).to_ascii_lowercase();
    let (residual, latin) = split_latin_runs(&text);
    NormalisedQuery { text, residual, latin }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_punctuation_keeps_spaces() {
        assert_eq!(strip_punctuation("急性(阑尾炎)，术后"), "急性阑尾炎术后");
        assert_eq!(strip_punctuation("a - b"), "a  b");
        assert_eq!(strip_punctuation_and_spaces("a - b"), "ab");
    }

    #[test]
    fn test_half_width() {
        assert_eq!(to_half_width("ＣＴ检查"), "CT检查");
        assert_eq!(to_half_width("胸部\u{3000}平片"), "胸部 平片");
        assert_eq!(to_half_width("阑尾炎"), "阑尾炎");
    }

    #[test]
    fn test_split_latin_runs() {
        let (residual, runs) = split_latin_runs("头颅CT平扫2次");
        assert_eq!(residual, "头颅平扫次");
        assert_eq!(runs, vec!["ct".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_normalise_query() {
        let q = normalise_query("MRI-增强（头部）");
        assert_eq!(q.text, "mri增强（头部）");
        assert_eq!(q.residual, "增强（头部）");
        assert_eq!(q.latin, vec!["mri".to_string()]);
    }

    #[test]
    fn test_char_slice() {
        assert_eq!(char_slice("急性阑尾炎", 2, 5), "阑尾炎");
        assert_eq!(char_slice("急性阑尾炎", 3, 2), "");
        assert_eq!(char_slice("急性", 1, 10), "性");
        assert_eq!(char_len("急性阑尾炎"), 5);
    }
}
