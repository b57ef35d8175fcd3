//! Shared test fixtures for the medterm workspace.
//!
//! A four-word vocabulary around two concepts (appendicitis, gastroscopy)
//! with one-hot vectors, small enough to work every ranking out by hand.

use std::path::PathBuf;

use tempfile::TempDir;

/// Vector dimension of [`VECTORS`].
pub const FIXTURE_DIM: usize = 4;

/// `preferred,synonym` rows.
pub const DICTIONARY_CSV: &str = "\
阑尾炎,阑尾炎
阑尾炎,急性阑尾炎
胃镜检查,胃镜检查
胃镜检查,胃镜
";

/// `length,subword` rows, header included.
pub const INVENTORY_CSV: &str = "\
length,subword
3,阑尾炎
2,急性
2,胃镜
2,检查
";

/// Word vectors; the last line has the wrong field count and is skipped.
pub const VECTORS: &str = "\
阑尾炎 1.0 0.0 0.0 0.0
急性 0.0 1.0 0.0 0.0
胃镜 0.0 0.0 1.0 0.0
检查 0.0 0.0 0.0 1.0
坏 1.0 2.0
";

/// Fixture artifacts written to a temporary directory.
///
/// The directory is removed when this value is dropped.
pub struct TempArtifacts {
    pub dir: TempDir,
    pub subword_inventory: PathBuf,
    pub term_dictionary: PathBuf,
    pub word_vectors: PathBuf,
}

impl TempArtifacts {
    /// TOML config pointing at these artifacts.
    pub fn config_toml(&self) -> String {
        format!(
            "vector_dim = {}\n\n[artifacts]\nsubword_inventory = {:?}\nterm_dictionary = {:?}\nword_vectors = {:?}\n",
            FIXTURE_DIM,
            self.subword_inventory.display().to_string(),
            self.term_dictionary.display().to_string(),
            self.word_vectors.display().to_string(),
        )
    }
}

/// Write the fixture artifacts into a fresh temporary directory.
pub fn write_temp_artifacts() -> anyhow::Result<TempArtifacts> {
    let dir = tempfile::tempdir()?;
    let subword_inventory = dir.path().join("subwords.csv");
    let term_dictionary = dir.path().join("term_dictionary.csv");
    let word_vectors = dir.path().join("word_vectors.vec");

    std::fs::write(&subword_inventory, INVENTORY_CSV)?;
    std::fs::write(&term_dictionary, DICTIONARY_CSV)?;
    std::fs::write(&word_vectors, VECTORS)?;

    Ok(TempArtifacts {
        dir,
        subword_inventory,
        term_dictionary,
        word_vectors,
    })
}

/// Install an env-filtered fmt subscriber once per test binary.
///
/// Set `RUST_LOG=medterm_match=debug` to follow the pipeline states.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
