use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// VectorRecord
// ─────────────────────────────────────────────

/// One embedded sentence version in the append-only history.
///
/// `step` is assigned by [`crate::store::VectorStore::append`] and is
/// strictly increasing by 1 per record, starting at 1. Records are never
/// mutated or reordered once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// 1-based position in the history.
    pub step: u64,

    /// RFC 3339 timestamp of acceptance.
    pub timestamp: String,

    /// L2-normalized embedding, fixed length for the process lifetime.
    pub vector: Vec<f32>,
}

// ─────────────────────────────────────────────
// ProjectionRecord
// ─────────────────────────────────────────────

/// 3D coordinates of one [`VectorRecord`] after PCA over the whole history.
///
/// Derived data: every regeneration recomputes all records, because the
/// principal axes depend on the full dataset. `step` and `timestamp` are
/// carried through from the source record unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub step: u64,
    pub timestamp: String,
    pub xyz: [f64; 3],
}

// ─────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────

/// Current wall-clock time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
