//! Persisted question/answer store.
//!
//! The whole store lives in one JSON file shaped `{"data": [{question, answer}, ...]}`.
//! Every operation reloads the file, so several handles (or processes) pointing
//! at the same path see each other's writes. Writes replace the file as a whole
//! through a same-directory temp file and rename.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{DevbotError, Result};

use super::similarity::{tokenize, MatchPolicy, MatchScore};

/// One cached question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

impl QaEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Both fields must be non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

/// In-memory snapshot of the store file, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    data: Vec<QaEntry>,
}

/// On-disk shape. Entries are decoded one by one so a single bad record
/// does not discard the rest of the file.
#[derive(Deserialize)]
struct StoreFile {
    data: Vec<serde_json::Value>,
}

/// A near-duplicate found by [`Store::find_match`].
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub entry: &'a QaEntry,
    /// Position of the entry in insertion order.
    pub index: usize,
    pub score: MatchScore,
}

impl Store {
    pub fn from_entries(data: Vec<QaEntry>) -> Self {
        Self { data }
    }

    pub fn entries(&self) -> &[QaEntry] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Full scan for the best near-duplicate of `input`.
    ///
    /// Among entries that pass `policy`, the highest bigram similarity wins,
    /// then the highest token overlap, then the earliest entry.
    pub fn find_match(&self, input: &str, policy: &MatchPolicy) -> Option<Match<'_>> {
        let input_tokens = tokenize(input);
        let mut best: Option<Match<'_>> = None;

        for (index, entry) in self.data.iter().enumerate() {
            let score = MatchScore::compute(input, &input_tokens, &entry.question);
            if !policy.qualifies(&score) {
                continue;
            }
            debug!(
                index,
                similarity = score.similarity,
                overlap = score.overlap,
                "Qualifying store entry"
            );
            let replace = match &best {
                None => true,
                Some(current) => policy.prefers(&score, &current.score),
            };
            if replace {
                best = Some(Match {
                    entry,
                    index,
                    score,
                });
            }
        }

        best
    }

    fn push(&mut self, entry: QaEntry) {
        self.data.push(entry);
    }
}

/// Aggregate numbers about the store file.
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub total_entries: usize,
    /// Questions that appear more than once (after exact comparison).
    pub duplicate_questions: usize,
    /// Size of the store file on disk, 0 if it does not exist.
    pub file_bytes: u64,
}

/// File-backed question/answer store.
#[derive(Debug, Clone)]
pub struct QaStore {
    path: PathBuf,
}

impl QaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store from disk.
    ///
    /// Never fails: a missing file, an unreadable file or a file that is not
    /// `{"data": [...]}` all yield an empty store. Individual entries that are
    /// not objects, miss a field, or have an empty question or answer are
    /// dropped and the rest are kept.
    pub fn load(&self) -> Store {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Store::default(),
            Err(e) => {
                let err = DevbotError::StoreRead(format!("{}: {}", self.path.display(), e));
                warn!("{}, starting empty", err);
                return Store::default();
            }
        };

        let file: StoreFile = match serde_json::from_str(&raw) {
            Ok(file) => file,
            Err(e) => {
                let err = DevbotError::StoreRead(format!("{} is corrupt: {}", self.path.display(), e));
                warn!("{}, starting empty", err);
                return Store::default();
            }
        };

        let before = file.data.len();
        let data: Vec<QaEntry> = file
            .data
            .into_iter()
            .filter_map(|value| serde_json::from_value::<QaEntry>(value).ok())
            .filter(QaEntry::is_valid)
            .collect();
        let dropped = before - data.len();
        if dropped > 0 {
            warn!(
                path = %self.path.display(),
                dropped,
                "Skipped malformed store entries"
            );
        }
        Store { data }
    }

    /// Append one entry and rewrite the whole file.
    pub fn append(&self, question: &str, answer: &str) -> Result<()> {
        let entry = QaEntry::new(question, answer);
        if !entry.is_valid() {
            return Err(DevbotError::StoreWrite(
                "question and answer must both be non-empty".into(),
            ));
        }
        let mut store = self.load();
        store.push(entry);
        self.save(&store)?;
        debug!(path = %self.path.display(), entries = store.len(), "Answer store updated");
        Ok(())
    }

    /// Entry count, duplicate count and file size.
    pub fn stats(&self) -> StoreStats {
        let store = self.load();
        let mut seen = std::collections::HashSet::new();
        let duplicate_questions = store
            .entries()
            .iter()
            .filter(|e| !seen.insert(e.question.as_str()))
            .count();
        let file_bytes = std::fs::metadata(&self.path)
            .map(|m| m.len())
            .unwrap_or(0);
        StoreStats {
            total_entries: store.len(),
            duplicate_questions,
            file_bytes,
        }
    }

    fn save(&self, store: &Store) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.write_error("create directory", e))?;

        let json = serde_json::to_string_pretty(store)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.write_error("create temp file", e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.write_error("write", e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.write_error("replace", e.error))?;
        Ok(())
    }

    fn write_error(&self, action: &str, e: std::io::Error) -> DevbotError {
        DevbotError::StoreWrite(format!(
            "failed to {} for {}: {}",
            action,
            self.path.display(),
            e
        ))
    }
}
