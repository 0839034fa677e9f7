//! One-shot readiness gate for the native transcoder.
//!
//! The first request to reach the gate triggers initialization. Requests
//! arriving while it runs wait on the same completion, and every later
//! request sees the stored outcome. A failed initialization is not retried.

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::transcode::{TranscodeError, Transcoder};

/// Shared initialization state of one worker.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    outcome: OnceCell<Result<(), TranscodeError>>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until `transcoder` is initialized, initializing it if needed.
    pub async fn wait<T: Transcoder + ?Sized>(&self, transcoder: &T) -> Result<(), TranscodeError> {
        self.outcome
            .get_or_init(|| async {
                let outcome = transcoder.initialize().await;
                match &outcome {
                    Ok(()) => info!("Transcoder initialized"),
                    Err(e) => warn!(error = %e, "Transcoder initialization failed"),
                }
                outcome
            })
            .await
            .clone()
    }

    /// Returns true once initialization has finished, successfully or not.
    pub fn is_resolved(&self) -> bool {
        self.outcome.initialized()
    }
}
