//! medterm-common — Shared errors, configuration, text normalisation and
//! string matching used across all medterm crates.

pub mod error;
pub mod config;
pub mod text;
pub mod kmp;

// Re-export commonly used types
pub use config::{ArtifactPaths, MatcherConfig};
pub use error::{Result, TermError};
