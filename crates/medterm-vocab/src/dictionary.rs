//! Preferred-term / synonym dictionary.
//!
//! Rows are `(preferred, synonym)`; a preferred term with several synonyms
//! appears on several rows sharing the first column. Lookups always resolve
//! to the first row carrying a given synonym.

use std::io::{Read, Write};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use medterm_common::text::strip_punctuation_and_spaces;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Result, VocabError};

/// One dictionary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermEntry {
    pub preferred: String,
    pub synonym: String,
}

impl TermEntry {
    pub fn new(preferred: impl Into<String>, synonym: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
            synonym: synonym.into(),
        }
    }
}

/// Ordered term dictionary with O(1) preferred/synonym membership.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    entries: Vec<TermEntry>,
    /// All preferred terms
    preferred: AHashSet<String>,
    /// Synonym -> first row carrying it
    synonym_rows: AHashMap<String, usize>,
}

/// Knowledge-graph document: `{"concept": {<id>: {...}}}`.
#[derive(Debug, Deserialize)]
struct KnowledgeGraph {
    concept: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Concept {
    preferred_name: String,
    #[serde(default)]
    synonym: Vec<String>,
}

impl TermDictionary {
    pub fn from_entries(entries: Vec<TermEntry>) -> Self {
        let mut preferred = AHashSet::new();
        let mut synonym_rows: AHashMap<String, usize> = AHashMap::new();
        let mut conflicts = 0usize;

        for (row, entry) in entries.iter().enumerate() {
            preferred.insert(entry.preferred.clone());
            let existing = synonym_rows.get(&entry.synonym).copied();
            match existing {
                Some(first) if entries[first].preferred != entry.preferred => conflicts += 1,
                Some(_) => {}
                None => {
                    synonym_rows.insert(entry.synonym.clone(), row);
                }
            }
        }

        if conflicts > 0 {
            warn!(
                "{} synonym rows point at a second preferred term; the first row wins",
                conflicts
            );
        }

        Self {
            entries,
            preferred,
            synonym_rows,
        }
    }

    /// Convenience constructor from `(preferred, synonym)` pairs.
    pub fn from_pairs<I, P, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<String>,
        S: Into<String>,
    {
        Self::from_entries(
            pairs
                .into_iter()
                .map(|(p, s)| TermEntry::new(p, s))
                .collect(),
        )
    }

    // ── Artifact IO ───────────────────────────────────────────────────────────

    /// Parse the headerless two-column dictionary artifact.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for record in csv_reader.records() {
            let record = record?;
            match (record.get(0), record.get(1)) {
                (Some(preferred), Some(synonym)) if !preferred.is_empty() && !synonym.is_empty() => {
                    entries.push(TermEntry::new(preferred, synonym));
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("Skipped {} incomplete dictionary rows", skipped);
        }
        Ok(Self::from_entries(entries))
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let dictionary = Self::from_csv_reader(std::fs::File::open(path)?)?;
        info!(
            "Loaded {} dictionary rows ({} preferred terms) from {:?}",
            dictionary.len(),
            dictionary.preferred_count(),
            path
        );
        Ok(dictionary)
    }

    /// Write the headerless two-column artifact.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        for entry in &self.entries {
            csv_writer.write_record([entry.preferred.as_str(), entry.synonym.as_str()])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Extract the dictionary from a knowledge-graph JSON document.
    ///
    /// Each concept yields `(preferred, preferred)` followed by one row per
    /// synonym. The synonym column is lowercased and stripped of punctuation
    /// and spaces; the preferred column is kept verbatim.
    pub fn from_knowledge_graph_json(json: &str) -> Result<Self> {
        let graph: KnowledgeGraph = serde_json::from_str(json)?;

        let mut entries = Vec::new();
        for (id, value) in graph.concept {
            let concept: Concept = serde_json::from_value(value).map_err(|e| {
                VocabError::InvalidArtifact {
                    artifact: "knowledge graph".to_string(),
                    reason: format!("concept {id}: {e}"),
                }
            })?;

            let clean = |term: &str| strip_punctuation_and_spaces(&term.to_lowercase());
            entries.push(TermEntry::new(
                concept.preferred_name.clone(),
                clean(&concept.preferred_name),
            ));

            let has_synonyms = concept.synonym.first().is_some_and(|s| !s.is_empty());
            if has_synonyms {
                for synonym in &concept.synonym {
                    entries.push(TermEntry::new(concept.preferred_name.clone(), clean(synonym)));
                }
            }
        }

        info!("Extracted {} dictionary rows from knowledge graph", entries.len());
        Ok(Self::from_entries(entries))
    }

    pub fn from_knowledge_graph_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_knowledge_graph_json(&json)
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    pub fn entries(&self) -> &[TermEntry] {
        &self.entries
    }

    pub fn get(&self, row: usize) -> Option<&TermEntry> {
        self.entries.get(row)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn preferred_count(&self) -> usize {
        self.preferred.len()
    }

    pub fn is_preferred(&self, term: &str) -> bool {
        self.preferred.contains(term)
    }

    pub fn is_synonym(&self, term: &str) -> bool {
        self.synonym_rows.contains_key(term)
    }

    /// First row whose synonym column equals `synonym`.
    pub fn synonym_row(&self, synonym: &str) -> Option<usize> {
        self.synonym_rows.get(synonym).copied()
    }

    /// Preferred term of the first row carrying `synonym`.
    pub fn preferred_for(&self, synonym: &str) -> Option<&str> {
        self.synonym_row(synonym)
            .map(|row| self.entries[row].preferred.as_str())
    }

    /// Preferred-term membership first, then synonym membership.
    pub fn resolve(&self, term: &str) -> Option<&str> {
        if let Some(preferred) = self.preferred.get(term) {
            return Some(preferred.as_str());
        }
        self.preferred_for(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn appendicitis() -> TermDictionary {
        TermDictionary::from_pairs([
            ("阑尾炎", "阑尾炎"),
            ("阑尾炎", "急性阑尾炎"),
            ("阑尾切除术", "阑尾切除术"),
            ("阑尾切除术", "阑尾切除"),
        ])
    }

    #[test]
    fn test_resolve_prefers_preferred_set() {
        let dict = appendicitis();
        assert_eq!(dict.resolve("阑尾炎"), Some("阑尾炎"));
        assert_eq!(dict.resolve("急性阑尾炎"), Some("阑尾炎"));
        assert_eq!(dict.resolve("阑尾切除"), Some("阑尾切除术"));
        assert_eq!(dict.resolve("胆囊炎"), None);
        assert_eq!(dict.preferred_count(), 2);
    }

    #[test]
    fn test_first_row_wins_for_duplicate_synonym() {
        let dict = TermDictionary::from_pairs([
            ("胃镜检查", "胃镜"),
            ("电子胃镜检查", "胃镜"),
        ]);
        assert_eq!(dict.synonym_row("胃镜"), Some(0));
        assert_eq!(dict.preferred_for("胃镜"), Some("胃镜检查"));
    }

    #[test]
    fn test_csv_round_trip_keeps_order() {
        let dict = appendicitis();
        let mut buf = Vec::new();
        dict.write_csv(&mut buf).unwrap();

        let reread = TermDictionary::from_csv_reader(buf.as_slice()).unwrap();
        assert_eq!(reread.entries(), dict.entries());
    }

    #[test]
    fn test_csv_skips_incomplete_rows() {
        let dict = TermDictionary::from_csv_reader("阑尾炎,阑尾炎\n孤行\n,空\n".as_bytes()).unwrap();
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_knowledge_graph_extraction() {
        let json = r#"{
            "concept": {
                "C2": {"preferred_name": "经皮冠状动脉介入治疗", "synonym": ["PCI", "冠脉 介入（治疗）"]},
                "C1": {"preferred_name": "阑尾炎", "synonym": [""]},
                "C3": {"preferred_name": "胃镜检查"}
            }
        }"#;
        let dict = TermDictionary::from_knowledge_graph_json(json).unwrap();
        let rows: Vec<(&str, &str)> = dict
            .entries()
            .iter()
            .map(|e| (e.preferred.as_str(), e.synonym.as_str()))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("经皮冠状动脉介入治疗", "经皮冠状动脉介入治疗"),
                ("经皮冠状动脉介入治疗", "pci"),
                ("经皮冠状动脉介入治疗", "冠脉介入（治疗）"),
                ("阑尾炎", "阑尾炎"),
                ("胃镜检查", "胃镜检查"),
            ]
        );
    }

    #[test]
    fn test_knowledge_graph_rejects_bad_concept() {
        let err = TermDictionary::from_knowledge_graph_json(r#"{"concept": {"X": {"synonym": []}}}"#)
            .unwrap_err();
        assert!(matches!(err, VocabError::InvalidArtifact { .. }));
    }
}
