//! Loader telemetry.
//!
//! Lock-free atomic counters updated by the coordinator, read through a
//! point-in-time [`MetricsSnapshot`].
//!
//! ```text
//! RequestCoordinator ─────► LoaderMetrics ─────► MetricsSnapshot
//!                           (atomic counters)    (point-in-time copy)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for texture requests.
#[derive(Debug, Default)]
pub struct LoaderMetrics {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    unknown_responses: AtomicU64,
    bytes_transcoded: AtomicU64,
}

impl LoaderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful request and the bytes it produced.
    pub fn request_completed(&self, bytes: usize) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.bytes_transcoded
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn request_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unknown_response(&self) {
        self.unknown_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            unknown_responses: self.unknown_responses.load(Ordering::Relaxed),
            bytes_transcoded: self.bytes_transcoded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LoaderMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub unknown_responses: u64,
    pub bytes_transcoded: u64,
}

impl MetricsSnapshot {
    /// Requests submitted but not yet resolved or rejected.
    pub fn in_flight(&self) -> u64 {
        self.submitted
            .saturating_sub(self.completed + self.failed)
    }
}
