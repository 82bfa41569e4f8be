//! # rabbithole-core
//!
//! State model for the rabbithole service: one collaboratively evolving
//! sentence plus the append-only history of its embeddings.
//!
//! - [`ledger::SentenceLedger`] — validates and accepts sentence updates
//!   under the append-exactly-one-word rule
//! - [`model::VectorRecord`]    — one embedded sentence version
//! - [`model::ProjectionRecord`] — its 3D coordinates after PCA
//! - [`store`]                  — whole-file persistence for all of the above

pub mod error;
pub mod ledger;
pub mod model;
pub mod store;

pub use error::{LedgerError, StorageError};
pub use ledger::SentenceLedger;
pub use model::{ProjectionRecord, VectorRecord};
pub use store::{ProjectionStore, SentenceStore, VectorStore};
