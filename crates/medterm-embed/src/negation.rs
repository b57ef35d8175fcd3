//! Negation markers.
//!
//! A closed set of tokens meaning "not / without / false / negative". When a
//! composed term contains one, the marker contributes no vector and the
//! resulting mean is negated.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegationMarkers {
    markers: Vec<String>,
}

impl Default for NegationMarkers {
    /// 非 不 无 否 假
    fn default() -> Self {
        Self::new(["非", "不", "无", "否", "假"])
    }
}

impl NegationMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for marker in markers.into_iter().map(S::into) {
            if !marker.is_empty() && !unique.contains(&marker) {
                unique.push(marker);
            }
        }
        Self { markers: unique }
    }

    pub fn is_marker(&self, token: &str) -> bool {
        self.markers.iter().any(|m| m == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
