//! Matcher configuration.
//!
//! Everything the engine treats as a tunable lives here: artifact locations,
//! the vector dimension, the final candidate count, the negation marker set
//! and the offline merge threshold. Loadable from TOML, YAML or JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, TermError};

/// Complete matcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Locations of the three artifacts the engine consumes
    #[serde(default)]
    pub artifacts: ArtifactPaths,

    /// Dimension D of every pretrained vector
    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,

    /// Number of candidates kept for the frequency tie-break
    #[serde(default = "default_final_top_k")]
    pub final_top_k: usize,

    /// Minimum length (in chars) of a subword considered for direct matching
    #[serde(default = "default_min_match_chars")]
    pub min_match_chars: usize,

    /// Closed set of single-token negation markers
    #[serde(default = "default_negation_markers")]
    pub negation_markers: Vec<String>,

    /// Stop merging pairs once the best pair frequency is not above this
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: usize,

    /// Batches larger than this run on the rayon pool (0 = always sequential)
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_vector_dim() -> usize { 128 }
fn default_final_top_k() -> usize { 5 }
fn default_min_match_chars() -> usize { 2 }
fn default_merge_threshold() -> usize { 500 }
fn default_parallel_threshold() -> usize { 10 }

fn default_negation_markers() -> Vec<String> {
    ["非", "不", "无", "否", "假"].iter().map(|m| m.to_string()).collect()
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::default(),
            vector_dim: default_vector_dim(),
            final_top_k: default_final_top_k(),
            min_match_chars: default_min_match_chars(),
            negation_markers: default_negation_markers(),
            merge_threshold: default_merge_threshold(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

// ── Artifacts ─────────────────────────────────────────────────────────────────

/// Paths to the artifacts produced by the offline tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Subword inventory CSV (`length,subword` rows)
    #[serde(default = "default_inventory_path")]
    pub subword_inventory: String,

    /// Term dictionary CSV (`preferred,synonym` rows)
    #[serde(default = "default_dictionary_path")]
    pub term_dictionary: String,

    /// Whitespace-delimited word vectors
    #[serde(default = "default_vectors_path")]
    pub word_vectors: String,
}

fn default_inventory_path() -> String { "data/subwords.csv".to_string() }
fn default_dictionary_path() -> String { "data/term_dictionary.csv".to_string() }
fn default_vectors_path() -> String { "data/word_vectors.vec".to_string() }

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            subword_inventory: default_inventory_path(),
            term_dictionary: default_dictionary_path(),
            word_vectors: default_vectors_path(),
        }
    }
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl MatcherConfig {
    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded matcher config from {:?}", path);
        Ok(config)
    }

    /// Load from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        info!("Loaded matcher config from {:?}", path);
        Ok(config)
    }

    /// Parse from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.vector_dim == 0 {
            return Err(TermError::Config("vector_dim must be positive".to_string()));
        }
        if self.final_top_k == 0 {
            return Err(TermError::Config("final_top_k must be positive".to_string()));
        }
        // single characters are never standalone matches
        if self.min_match_chars < 2 {
            return Err(TermError::Config(format!(
                "min_match_chars must be at least 2, got {}",
                self.min_match_chars
            )));
        }
        if self.negation_markers.iter().any(|m| m.is_empty()) {
            return Err(TermError::Config("negation markers must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MatcherConfig::default();
        assert_eq!(config.vector_dim, 128);
        assert_eq!(config.final_top_k, 5);
        assert_eq!(config.negation_markers.len(), 5);
        assert!(config.negation_markers.contains(&"无".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = MatcherConfig::from_toml_str(
            r#"
            vector_dim = 64
            merge_threshold = 200

            [artifacts]
            word_vectors = "vectors/med.vec"
            "#,
        )
        .unwrap();
        assert_eq!(config.vector_dim, 64);
        assert_eq!(config.merge_threshold, 200);
        assert_eq!(config.artifacts.word_vectors, "vectors/med.vec");
        assert_eq!(config.artifacts.term_dictionary, "data/term_dictionary.csv");
        assert_eq!(config.final_top_k, 5);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(MatcherConfig::from_toml_str("vector_dim = 0").is_err());
        assert!(MatcherConfig::from_toml_str("min_match_chars = 1").is_err());
        assert!(MatcherConfig::from_toml_str("negation_markers = [\"\"]").is_err());
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matcher.yaml");
        std::fs::write(&path, "final_top_k: 3\nnegation_markers: [\"无\"]\n").unwrap();

        let config = MatcherConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.final_top_k, 3);
        assert_eq!(config.negation_markers, vec!["无".to_string()]);
    }

    #[test]
    fn test_json_config() {
        let config =
            MatcherConfig::from_json_str(r#"{"vector_dim": 32, "artifacts": {"word_vectors": "v.vec"}}"#)
                .unwrap();
        assert_eq!(config.vector_dim, 32);
        assert_eq!(config.artifacts.word_vectors, "v.vec");
        assert_eq!(config.merge_threshold, 500);

        assert!(matches!(
            MatcherConfig::from_json_str("{\"final_top_k\": \"five\"}"),
            Err(TermError::Json(_))
        ));
        assert!(matches!(
            MatcherConfig::from_json_str(r#"{"final_top_k": 0}"#),
            Err(TermError::Config(_))
        ));
    }
}
