#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Word-list loading for the vocabulary drill.
//!
//! The dictionary file is newline-delimited `<article> <word>` records.
//! Only the first two whitespace-separated fields of a line are read; a
//! comma-attached suffix on the word (plural forms in the source lists,
//! `Katze,Katzen`) is truncated. Parsing is fail-fast: a line with
//! fewer than two fields, an unreadable file, or an empty list aborts
//! startup instead of drilling from partial data.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use derdiedas_core::{VocabEntry, WordId};
use thiserror::Error;

/// Errors raised while loading the word list.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The dictionary file could not be read.
    #[error("failed to read dictionary {path}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A line held fewer than the two required fields.
    #[error("dictionary line {line} has fewer than two fields")]
    MalformedLine {
        /// One-based line number of the offending record.
        line: usize,
    },
    /// The file parsed cleanly but contained no records.
    #[error("dictionary contains no entries")]
    Empty,
}

/// Ordered, read-only sequence of vocabulary entries.
///
/// Loaded once at startup and shared by reference for the rest of the
/// run; [`WordId`] values index into it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dictionary {
    entries: Vec<VocabEntry>,
}

impl Dictionary {
    /// Loads and parses the word list at `path`.
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let text = fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses word-list text.
    pub fn parse(text: &str) -> Result<Self, DictionaryError> {
        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let mut fields = line.split_whitespace();
            let (Some(article), Some(word)) = (fields.next(), fields.next()) else {
                return Err(DictionaryError::MalformedLine { line: index + 1 });
            };
            let word = word.split(',').next().unwrap_or(word);
            entries.push(VocabEntry::new(article, word));
        }

        if entries.is_empty() {
            return Err(DictionaryError::Empty);
        }
        Ok(Self { entries })
    }

    /// Entry identified by `id`, if the id is in range.
    #[must_use]
    pub fn entry(&self, id: WordId) -> Option<&VocabEntry> {
        self.entries.get(id.get() as usize)
    }

    /// Number of entries in the dictionary.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary holds no entries. Never true for a
    /// successfully parsed dictionary.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterator over the entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &VocabEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Dictionary, DictionaryError};
    use derdiedas_core::{VocabEntry, WordId};

    #[test]
    fn parses_article_and_word() {
        let dictionary = Dictionary::parse("der Hund").expect("valid line");
        assert_eq!(dictionary.len(), 1);
        assert_eq!(
            dictionary.entry(WordId::new(0)),
            Some(&VocabEntry::new("der", "Hund"))
        );
    }

    #[test]
    fn truncates_comma_suffix_on_the_word() {
        let dictionary = Dictionary::parse("die Katze,\ndas Haus,Häuser").expect("valid lines");
        assert_eq!(
            dictionary.entry(WordId::new(0)),
            Some(&VocabEntry::new("die", "Katze"))
        );
        assert_eq!(
            dictionary.entry(WordId::new(1)),
            Some(&VocabEntry::new("das", "Haus"))
        );
    }

    #[test]
    fn ignores_fields_after_the_second() {
        let dictionary = Dictionary::parse("der Apfel extra trailing").expect("valid line");
        assert_eq!(
            dictionary.entry(WordId::new(0)),
            Some(&VocabEntry::new("der", "Apfel"))
        );
    }

    #[test]
    fn single_field_line_is_fatal() {
        let error = Dictionary::parse("der Hund\nKatze").expect_err("malformed line");
        assert!(matches!(error, DictionaryError::MalformedLine { line: 2 }));
    }

    #[test]
    fn blank_line_is_fatal() {
        let error = Dictionary::parse("der Hund\n\ndie Katze").expect_err("blank line");
        assert!(matches!(error, DictionaryError::MalformedLine { line: 2 }));
    }

    #[test]
    fn empty_input_is_fatal() {
        let error = Dictionary::parse("").expect_err("empty dictionary");
        assert!(matches!(error, DictionaryError::Empty));
    }

    #[test]
    fn missing_file_is_fatal() {
        let error = Dictionary::load(std::path::Path::new("/nonexistent/words.txt"))
            .expect_err("missing file");
        assert!(matches!(error, DictionaryError::Io { .. }));
    }

    #[test]
    fn out_of_range_id_yields_none() {
        let dictionary = Dictionary::parse("der Hund").expect("valid line");
        assert_eq!(dictionary.entry(WordId::new(5)), None);
    }
}
