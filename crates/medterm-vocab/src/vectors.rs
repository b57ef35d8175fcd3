//! Pretrained token vectors.
//!
//! Text format: one token followed by D float components per line,
//! whitespace-delimited. Lines with any other field count (including the
//! usual `<count> <dim>` header) or unparsable floats are skipped.

use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use tracing::{debug, info};

use crate::{Result, VocabError};

/// Token → fixed-dimension vector. Immutable after load.
#[derive(Debug, Clone)]
pub struct VectorTable {
    dim: usize,
    vectors: AHashMap<String, Vec<f32>>,
}

impl VectorTable {
    /// Build from in-memory vectors; every vector must have length `dim`.
    pub fn from_entries<I, S>(dim: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut vectors = AHashMap::new();
        for (token, vector) in entries {
            let token = token.into();
            if vector.len() != dim {
                return Err(VocabError::InvalidArtifact {
                    artifact: "word vectors".to_string(),
                    reason: format!("{token}: expected {dim} components, got {}", vector.len()),
                });
            }
            vectors.insert(token, vector);
        }
        Ok(Self { dim, vectors })
    }

    /// Parse the text artifact. Malformed lines are skipped, never fatal.
    pub fn from_reader<R: BufRead>(reader: R, dim: usize) -> Result<Self> {
        let mut vectors = AHashMap::new();
        let mut malformed = 0usize;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != dim + 1 {
                debug!("Skipping vector line {}: {} fields", line_no + 1, fields.len());
                malformed += 1;
                continue;
            }

            let parsed: std::result::Result<Vec<f32>, _> =
                fields[1..].iter().map(|f| f.parse::<f32>()).collect();
            match parsed {
                Ok(vector) => {
                    vectors.insert(fields[0].to_string(), vector);
                }
                Err(e) => {
                    debug!("Skipping vector line {}: {}", line_no + 1, e);
                    malformed += 1;
                }
            }
        }

        if malformed > 0 {
            info!("Skipped {} malformed vector lines", malformed);
        }
        Ok(Self { dim, vectors })
    }

    pub fn from_path(path: impl AsRef<Path>, dim: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(BufReader::new(file), dim)?;
        info!("Loaded {} {}-dim vectors from {:?}", table.len(), dim, path);
        Ok(table)
    }

    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.vectors.contains_key(token)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// All tokens that carry a vector, in no particular order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.vectors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_skips_header_and_malformed_lines() {
        let text = "3 2\n阑尾炎 1.0 0.0\n急性 0.0 1.0\n坏行 1.0\n错误 x 1.0\n\n手术 0.5 0.5 0.5\n";
        let table = VectorTable::from_reader(text.as_bytes(), 2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("阑尾炎"), Some(&[1.0f32, 0.0][..]));
        assert!(table.get("坏行").is_none());
        assert!(table.get("错误").is_none());
        assert!(table.get("手术").is_none());
    }

    #[test]
    fn test_later_duplicate_overrides() {
        let text = "胃镜 1 1\n胃镜 2 2\n";
        let table = VectorTable::from_reader(text.as_bytes(), 2).unwrap();
        assert_eq!(table.get("胃镜"), Some(&[2.0f32, 2.0][..]));
    }

    #[test]
    fn test_from_entries_checks_dimension() {
        assert!(VectorTable::from_entries(2, [("a", vec![1.0, 2.0])]).is_ok());
        let err = VectorTable::from_entries(2, [("a", vec![1.0])]).unwrap_err();
        assert!(matches!(err, VocabError::InvalidArtifact { .. }));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word_vectors.vec");
        std::fs::write(&path, "造影 0.1 0.2 0.3\n").unwrap();

        let table = VectorTable::from_path(&path, 3).unwrap();
        assert_eq!(table.dim(), 3);
        assert!(table.contains("造影"));
    }
}
