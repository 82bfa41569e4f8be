//! Operation metrics for the rabbithole server.
//!
//! Lock-free `AtomicU64` counters (no mutex contention on the hot path),
//! exposed at `/metrics` in Prometheus text exposition format.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub struct OperationMetrics {
    // ── Sentence ──
    pub sentence_reads: AtomicU64,
    pub updates_accepted: AtomicU64,
    pub updates_rejected: AtomicU64,

    // ── Trajectory ──
    pub projection_reads: AtomicU64,
    pub regenerate_count: AtomicU64,
    pub embed_jobs: AtomicU64,
    pub background_failures: AtomicU64,

    // ── Lifecycle ──
    pub reset_count: AtomicU64,
    pub start_time: Instant,
}

impl OperationMetrics {
    pub fn new() -> Self {
        Self {
            sentence_reads: AtomicU64::new(0),
            updates_accepted: AtomicU64::new(0),
            updates_rejected: AtomicU64::new(0),
            projection_reads: AtomicU64::new(0),
            regenerate_count: AtomicU64::new(0),
            embed_jobs: AtomicU64::new(0),
            background_failures: AtomicU64::new(0),
            reset_count: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    #[inline]
    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Render all counters plus the current store sizes.
    pub fn to_prometheus(&self, vector_count: usize, projection_count: usize) -> String {
        let mut out = String::new();
        let mut counter = |name: &str, help: &str, value: u64| {
            out.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n"
            ));
        };

        counter(
            "rabbithole_sentence_reads_total",
            "Sentence read requests",
            self.sentence_reads.load(Ordering::Relaxed),
        );
        counter(
            "rabbithole_updates_accepted_total",
            "Accepted sentence updates",
            self.updates_accepted.load(Ordering::Relaxed),
        );
        counter(
            "rabbithole_updates_rejected_total",
            "Rejected sentence updates (validation or auth)",
            self.updates_rejected.load(Ordering::Relaxed),
        );
        counter(
            "rabbithole_projection_reads_total",
            "Projection read requests",
            self.projection_reads.load(Ordering::Relaxed),
        );
        counter(
            "rabbithole_regenerate_total",
            "On-demand projection regenerations",
            self.regenerate_count.load(Ordering::Relaxed),
        );
        counter(
            "rabbithole_embed_jobs_total",
            "Background embedding jobs enqueued",
            self.embed_jobs.load(Ordering::Relaxed),
        );
        counter(
            "rabbithole_background_failures_total",
            "Failed background embed/append/project attempts",
            self.background_failures.load(Ordering::Relaxed),
        );
        counter(
            "rabbithole_resets_total",
            "Reset operations",
            self.reset_count.load(Ordering::Relaxed),
        );

        out.push_str(&format!(
            "# HELP rabbithole_vector_records Current vector history length\n\
             # TYPE rabbithole_vector_records gauge\n\
             rabbithole_vector_records {vector_count}\n"
        ));
        out.push_str(&format!(
            "# HELP rabbithole_projection_records Current projection length\n\
             # TYPE rabbithole_projection_records gauge\n\
             rabbithole_projection_records {projection_count}\n"
        ));
        out.push_str(&format!(
            "# HELP rabbithole_uptime_seconds Process uptime\n\
             # TYPE rabbithole_uptime_seconds gauge\n\
             rabbithole_uptime_seconds {}\n",
            self.start_time.elapsed().as_secs()
        ));
        out
    }
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self::new()
    }
}
