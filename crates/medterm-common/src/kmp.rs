//! Knuth–Morris–Pratt substring search.
//!
//! Used to locate matched subwords in the normalised query and to count
//! subword overlap during the final tie-break. O(|haystack| + |needle|).

/// First position of `needle` inside `haystack`, or `None`.
///
/// An empty needle never matches.
pub fn find<T: PartialEq>(haystack: &[T], needle: &[T]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    let failure = failure_function(needle);
    let mut matched = 0usize;
    for (i, item) in haystack.iter().enumerate() {
        while matched > 0 && *item != needle[matched] {
            matched = failure[matched - 1];
        }
        if *item == needle[matched] {
            matched += 1;
        }
        if matched == needle.len() {
            return Some(i + 1 - needle.len());
        }
    }
    None
}

/// [`find`] over strings; the returned offset counts chars.
pub fn find_str(haystack: &str, needle: &str) -> Option<usize> {
    let haystack: Vec<char> = haystack.chars().collect();
    let needle: Vec<char> = needle.chars().collect();
    find(&haystack, &needle)
}

/// `true` when `needle` occurs in `haystack`.
pub fn contains_str(haystack: &str, needle: &str) -> bool {
    find_str(haystack, needle).is_some()
}

/// `failure[i]` = length of the longest proper prefix of `needle[..=i]`
/// that is also a suffix of it.
fn failure_function<T: PartialEq>(needle: &[T]) -> Vec<usize> {
    let mut failure = vec![0usize; needle.len()];
    let mut k = 0usize;
    for i in 1..needle.len() {
        while k > 0 && needle[i] != needle[k] {
            k = failure[k - 1];
        }
        if needle[i] == needle[k] {
            k += 1;
        }
        failure[i] = k;
    }
    failure
}
