use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Why a proposed sentence was rejected (or failed to persist).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("proposed sentence is empty")]
    EmptyInput,

    #[error("word count mismatch: expected {expected}, got {got}")]
    WordCountMismatch { expected: usize, got: usize },

    #[error("sentence must not end in terminal punctuation")]
    TrailingPunctuation,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LedgerError {
    /// Stable machine-readable code for API failure envelopes.
    pub fn reason_code(&self) -> &'static str {
        match self {
            LedgerError::EmptyInput => "empty_input",
            LedgerError::WordCountMismatch { .. } => "word_count_mismatch",
            LedgerError::TrailingPunctuation => "trailing_punctuation",
            LedgerError::Storage(_) => "storage",
        }
    }
}
