//! Background embed → append → project pipeline.
//!
//! Acceptance of a sentence update never waits on embedding: the handler
//! enqueues the accepted sentence and responds immediately. A single
//! worker task consumes the queue, which serializes every append and keeps
//! the vector store's strictly-increasing, gapless step invariant even
//! under rapid-fire proposals.
//!
//! Failures on this path are logged and swallowed, never surfaced to the
//! client that triggered them: a failed embed appends nothing, and a failed
//! projection leaves the previous projection output in place.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use rabbithole_core::error::StorageError;
use rabbithole_core::{ProjectionStore, VectorStore};
use rabbithole_embed::Vectorizer;
use rabbithole_projection::{project, ProjectionError};

use crate::metrics::OperationMetrics;

/// Capacity of the pending-embed queue. The expected usage is one human
/// appending one word at a time, so a small buffer is plenty.
const JOB_QUEUE_DEPTH: usize = 32;

// ─────────────────────────────────────────────
// Trajectory
// ─────────────────────────────────────────────

/// The vector history and its cached 3D projection, mutated together.
pub struct Trajectory {
    pub vectors: VectorStore,
    pub projection: ProjectionStore,
}

#[derive(Debug, Error)]
pub enum RegenerateError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegenerateOutcome {
    /// Nothing to project: the vector history is empty.
    Empty,
    /// Projection recomputed and persisted over this many points.
    Projected(usize),
}

impl Trajectory {
    pub fn open(data_dir: &Path) -> Self {
        Self {
            vectors: VectorStore::open(data_dir),
            projection: ProjectionStore::open(data_dir),
        }
    }

    /// Re-run the projection over the full vector history and persist it.
    pub fn regenerate(&mut self) -> Result<RegenerateOutcome, RegenerateError> {
        if self.vectors.is_empty() {
            return Ok(RegenerateOutcome::Empty);
        }
        let points = project(self.vectors.all())?;
        let count = points.len();
        self.projection.replace(points)?;
        Ok(RegenerateOutcome::Projected(count))
    }

    /// Discard vectors and projection output together.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.vectors.clear()?;
        self.projection.clear()
    }
}

// ─────────────────────────────────────────────
// Worker
// ─────────────────────────────────────────────

/// Spawn the single pipeline worker and return its job queue.
///
/// One consumer, one queue: appends are serialized by construction. The
/// worker runs until every sender is dropped.
pub fn spawn_worker(
    vectorizer: Box<dyn Vectorizer>,
    trajectory: Arc<Mutex<Trajectory>>,
    metrics: Arc<OperationMetrics>,
) -> mpsc::Sender<String> {
    let (tx, mut rx) = mpsc::channel::<String>(JOB_QUEUE_DEPTH);

    tokio::spawn(async move {
        info!("embedding pipeline worker started");
        while let Some(sentence) = rx.recv().await {
            // Embed outside the store lock; only the mutation is serialized
            // against regenerate/reset.
            let vector = match vectorizer.vectorize(&sentence).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "embedding failed, vector not appended");
                    metrics.inc(&metrics.background_failures);
                    continue;
                }
            };

            let mut traj = trajectory.lock().await;
            let record = match traj.vectors.append(vector) {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "vector append failed, history unchanged");
                    metrics.inc(&metrics.background_failures);
                    continue;
                }
            };
            debug!(step = record.step, "vector appended");

            match project(traj.vectors.all()) {
                Ok(points) => {
                    let count = points.len();
                    if let Err(e) = traj.projection.replace(points) {
                        warn!(error = %e, "projection persist failed, previous output kept");
                        metrics.inc(&metrics.background_failures);
                    } else {
                        debug!(points = count, "projection regenerated");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "projection failed, previous output kept");
                    metrics.inc(&metrics.background_failures);
                }
            }
        }
        info!("embedding pipeline worker stopped");
    });

    tx
}
