//! Whole-file persistence for the sentence and its embedding history.
//!
//! ## Storage layout
//! ```text
//! {data_dir}/
//!   sentence.txt     ← current sentence (plain text)
//!   vectors.json     ← Vec<VectorRecord>
//!   projection.json  ← Vec<ProjectionRecord>
//! ```
//!
//! Every write serializes the full state to a sibling temp file and renames
//! it over the target, so a crash mid-write leaves the previous file intact.
//! Loads tolerate a missing or corrupt file by falling back to empty state;
//! a corrupt file is logged and then overwritten by the next write.
//! `clear()` removes the backing file entirely rather than writing an empty
//! value; subsequent loads fall back to empty either way.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::StorageError;
use crate::model::{now_rfc3339, ProjectionRecord, VectorRecord};

pub const SENTENCE_FILE: &str = "sentence.txt";
pub const VECTORS_FILE: &str = "vectors.json";
pub const PROJECTION_FILE: &str = "projection.json";

// ─────────────────────────────────────────────
// File helpers
// ─────────────────────────────────────────────

fn io_err(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_err(path, e))
}

fn remove_if_present(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Load a JSON file, treating a missing or unparseable file as empty.
fn load_json_or_empty<T: serde::de::DeserializeOwned + Default>(path: &Path) -> T {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(_) => return T::default(),
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
            T::default()
        }
    }
}

// ─────────────────────────────────────────────
// SentenceStore
// ─────────────────────────────────────────────

/// Plain-text persistence for the single current sentence.
pub struct SentenceStore {
    path: PathBuf,
}

impl SentenceStore {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SENTENCE_FILE),
        }
    }

    /// Load the persisted sentence; missing file means "no sentence yet".
    pub fn load(&self) -> String {
        fs::read_to_string(&self.path)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    pub fn save(&self, sentence: &str) -> Result<(), StorageError> {
        write_atomic(&self.path, sentence.as_bytes())
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        remove_if_present(&self.path)
    }
}

// ─────────────────────────────────────────────
// VectorStore
// ─────────────────────────────────────────────

/// Append-only history of embedded sentence versions.
///
/// The full history is kept in memory and rewritten to disk on every
/// mutation. Step numbers start at 1 and increase by 1 with no gaps;
/// callers must serialize `append` to preserve that invariant.
pub struct VectorStore {
    path: PathBuf,
    records: Vec<VectorRecord>,
}

impl VectorStore {
    /// Open the store, loading any persisted history. A missing or corrupt
    /// file loads as an empty history, never an error.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(VECTORS_FILE);
        let records = load_json_or_empty(&path);
        Self { path, records }
    }

    /// Append a vector as the next step and persist the updated history.
    /// On a persist failure the in-memory history is rolled back.
    pub fn append(&mut self, vector: Vec<f32>) -> Result<VectorRecord, StorageError> {
        let step = self.records.last().map(|r| r.step).unwrap_or(0) + 1;
        let record = VectorRecord {
            step,
            timestamp: now_rfc3339(),
            vector,
        };
        self.records.push(record.clone());
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }
        Ok(record)
    }

    pub fn all(&self) -> &[VectorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Discard all records and delete the backing file.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        remove_if_present(&self.path)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(&self.records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &bytes)
    }
}

// ─────────────────────────────────────────────
// ProjectionStore
// ─────────────────────────────────────────────

/// Cached output of the last projection run. Always replaced wholesale,
/// never patched, so readers see either the previous complete projection
/// or the new one.
pub struct ProjectionStore {
    path: PathBuf,
    records: Vec<ProjectionRecord>,
}

impl ProjectionStore {
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(PROJECTION_FILE);
        let records = load_json_or_empty(&path);
        Self { path, records }
    }

    /// Overwrite the projection output with a freshly computed one.
    /// On a persist failure the previous in-memory output is kept.
    pub fn replace(&mut self, records: Vec<ProjectionRecord>) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &bytes)?;
        self.records = records;
        Ok(())
    }

    pub fn all(&self) -> &[ProjectionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.records.clear();
        remove_if_present(&self.path)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
