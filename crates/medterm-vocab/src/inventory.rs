//! Learned subword inventory.

use std::io::{Read, Write};
use std::path::Path;

use ahash::AHashSet;
use tracing::info;

use crate::{Result, VocabError};

/// Set of known subwords plus the segmentation window bound.
///
/// Immutable after load. `max_len` is the char length of the longest
/// subword and bounds the maximum-matching window.
#[derive(Debug, Clone, Default)]
pub struct SubwordInventory {
    subwords: AHashSet<String>,
    max_len: usize,
}

impl SubwordInventory {
    /// Build from an in-memory list; empty strings are ignored.
    pub fn from_subwords<I, S>(subwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = AHashSet::new();
        let mut max_len = 0;
        for subword in subwords {
            let subword = subword.into();
            if subword.is_empty() {
                continue;
            }
            max_len = max_len.max(subword.chars().count());
            set.insert(subword);
        }
        Self { subwords: set, max_len }
    }

    /// Parse the tabular inventory artifact.
    ///
    /// Accepts `length,subword` rows (the learner's output) as well as
    /// `subword,length` and single-column files. Rows without a numeric
    /// length column next to the subword are treated as headers and skipped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut subwords = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let first = record.get(0).unwrap_or("").trim();
            let second = record.get(1).map(str::trim);
            let subword = match second {
                Some(second) if first.parse::<usize>().is_ok() => second,
                Some(second) if second.parse::<usize>().is_ok() => first,
                Some(_) => continue,
                None => first,
            };
            if !subword.is_empty() {
                subwords.push(subword.to_string());
            }
        }

        let inventory = Self::from_subwords(subwords);
        if inventory.is_empty() {
            return Err(VocabError::EmptyInventory);
        }
        Ok(inventory)
    }

    /// Load the inventory artifact from disk.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let inventory = Self::from_csv_reader(std::fs::File::open(path)?)?;
        info!(
            "Loaded {} subwords from {:?} (max length {})",
            inventory.len(),
            path,
            inventory.max_len()
        );
        Ok(inventory)
    }

    /// Write as `length,subword` rows, longest first.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut rows: Vec<(usize, &str)> = self
            .subwords
            .iter()
            .map(|s| (s.chars().count(), s.as_str()))
            .collect();
        rows.sort_by(|a, b| b.cmp(a));

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["length", "subword"])?;
        for (len, subword) in rows {
            csv_writer.write_record([len.to_string().as_str(), subword])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.subwords.contains(fragment)
    }

    /// Char length of the longest known subword.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn len(&self) -> usize {
        self.subwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subwords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.subwords.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_subwords_tracks_max_len() {
        let inv = SubwordInventory::from_subwords(["阑尾炎", "切除术", "术", ""]);
        assert_eq!(inv.len(), 3);
        assert_eq!(inv.max_len(), 3);
        assert!(inv.contains("切除术"));
        assert!(!inv.contains(""));
    }

    #[test]
    fn test_csv_length_first_with_header() {
        let csv = "length,subword\n3,阑尾炎\n2,切除\n";
        let inv = SubwordInventory::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(inv.len(), 2);
        assert!(inv.contains("阑尾炎"));
        assert!(!inv.contains("subword"));
    }

    #[test]
    fn test_csv_subword_first_and_single_column() {
        let inv = SubwordInventory::from_csv_reader("胃镜,2\n活检,2\n".as_bytes()).unwrap();
        assert!(inv.contains("胃镜") && inv.contains("活检"));

        let inv = SubwordInventory::from_csv_reader("造影\n支架置入\n".as_bytes()).unwrap();
        assert_eq!(inv.max_len(), 4);
    }

    #[test]
    fn test_empty_csv_is_error() {
        let err = SubwordInventory::from_csv_reader("length,subword\n".as_bytes()).unwrap_err();
        assert!(matches!(err, VocabError::EmptyInventory));
    }

    #[test]
    fn test_write_then_read() {
        let inv = SubwordInventory::from_subwords(["阑尾", "阑尾炎", "术"]);
        let mut buf = Vec::new();
        inv.write_csv(&mut buf).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("length,subword\n3,阑尾炎\n"));

        let reread = SubwordInventory::from_csv_reader(buf.as_slice()).unwrap();
        assert_eq!(reread.len(), 3);
        assert_eq!(reread.max_len(), 3);
    }
}
