//! Pending-request bookkeeping on the requesting side.
//!
//! Each request moves `Pending → Resolved | Rejected` exactly once. The
//! entry is removed atomically on the first response, so a duplicate
//! response for the same id finds nothing and is logged as unknown.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ErrorCode, RequestError};
use crate::telemetry::LoaderMetrics;
use crate::transcode::TranscodedImage;
use crate::worker::{
    RequestId, RequestOptions, TextureSource, TranscodeRequest, TranscodeResponse,
};

type Outcome = Result<TranscodedImage, RequestError>;

/// Errors raised by the coordinator itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// A response arrived for an id with no pending entry.
    #[error("Invalid pending texture ID: {0}")]
    UnknownRequestId(RequestId),
}

impl CoordinatorError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoordinatorError::UnknownRequestId(_) => ErrorCode::UnknownRequestId,
        }
    }
}

/// Handle to the outcome of a submitted request.
///
/// Resolves once the worker's response for this id has been dispatched. A
/// request the coordinator refuses outright (closed coordinator or worker
/// channel) is ready on its first poll.
#[derive(Debug)]
pub struct PendingTexture {
    id: RequestId,
    rx: oneshot::Receiver<Outcome>,
}

impl PendingTexture {
    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl Future for PendingTexture {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| {
            received.unwrap_or_else(|_| {
                Err(RequestError::new(
                    ErrorCode::WorkerUnavailable,
                    "Request dropped before a response arrived",
                ))
            })
        })
    }
}

/// Associates request ids with their waiting callers.
pub struct RequestCoordinator {
    next_id: AtomicU64,
    pending: DashMap<RequestId, oneshot::Sender<Outcome>>,
    request_tx: mpsc::UnboundedSender<TranscodeRequest>,
    metrics: Arc<LoaderMetrics>,
    closed: AtomicBool,
}

impl RequestCoordinator {
    /// Creates a coordinator that sends requests on `request_tx`.
    pub fn new(
        request_tx: mpsc::UnboundedSender<TranscodeRequest>,
        metrics: Arc<LoaderMetrics>,
    ) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: DashMap::new(),
            request_tx,
            metrics,
            closed: AtomicBool::new(false),
        }
    }

    /// Registers a request and hands it to the worker.
    ///
    /// Returns immediately. The outcome is only ever delivered through the
    /// returned [`PendingTexture`]. If the coordinator is closed or the
    /// worker channel is gone, the handle is rejected with
    /// `WorkerUnavailable` before it is returned and is ready on first poll.
    pub fn submit(
        &self,
        source: Option<TextureSource>,
        options: RequestOptions,
    ) -> PendingTexture {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);
        self.metrics.request_submitted();

        // Checked after the insert so a concurrent close() either sweeps the
        // entry or this branch rejects it.
        if self.is_closed() {
            debug!(id = %id, "Texture request submitted after shutdown");
            self.reject(id, "Texture loader is shut down");
            return PendingTexture { id, rx };
        }

        let request = TranscodeRequest {
            id,
            source,
            allow_separate_alpha: options.allow_separate_alpha,
            capabilities: options.capabilities,
        };

        debug!(id = %id, "Texture request submitted");

        if self.request_tx.send(request).is_err() {
            warn!(id = %id, "Transcode worker unavailable");
            self.reject(id, "Transcode worker is not running");
        }

        PendingTexture { id, rx }
    }

    /// Resolves request `id` with `image`.
    pub fn on_complete(
        &self,
        id: RequestId,
        image: TranscodedImage,
    ) -> Result<(), CoordinatorError> {
        let tx = self.take(id, None)?;
        self.metrics.request_completed(image.byte_len());
        if tx.send(Ok(image)).is_err() {
            debug!(id = %id, "Requester went away before completion");
        }
        Ok(())
    }

    /// Rejects request `id` with `error`.
    pub fn on_error(&self, id: RequestId, error: RequestError) -> Result<(), CoordinatorError> {
        let tx = self.take(id, Some(&error))?;
        self.metrics.request_failed();
        if tx.send(Err(error)).is_err() {
            debug!(id = %id, "Requester went away before rejection");
        }
        Ok(())
    }

    /// Routes a worker response to [`on_complete`](Self::on_complete) or
    /// [`on_error`](Self::on_error).
    pub fn dispatch(&self, response: TranscodeResponse) -> Result<(), CoordinatorError> {
        match response.outcome {
            Ok(image) => self.on_complete(response.id, image),
            Err(error) => self.on_error(response.id, error),
        }
    }

    /// Dispatches responses until `shutdown` fires or the channel closes.
    ///
    /// Unknown ids are logged and skipped. On exit the coordinator is
    /// closed, so every request still pending is rejected.
    pub async fn run(
        self: Arc<Self>,
        mut response_rx: mpsc::UnboundedReceiver<TranscodeResponse>,
        shutdown: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Request coordinator shutting down");
                    break;
                }

                response = response_rx.recv() => {
                    match response {
                        Some(response) => {
                            let _ = self.dispatch(response);
                        }
                        None => break,
                    }
                }
            }
        }

        self.close();
    }

    /// Stops accepting requests and rejects every pending one with
    /// `WorkerUnavailable`. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let ids: Vec<RequestId> = self.pending.iter().map(|entry| *entry.key()).collect();
        if !ids.is_empty() {
            info!(count = ids.len(), "Rejecting pending texture requests");
        }
        for id in ids {
            self.reject(id, "Texture loader shut down before a response arrived");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of requests still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Rejects `id` with `WorkerUnavailable` if it is still pending.
    fn reject(&self, id: RequestId, message: &str) {
        if let Some((_, tx)) = self.pending.remove(&id) {
            self.metrics.request_failed();
            let error = RequestError::new(ErrorCode::WorkerUnavailable, message);
            if tx.send(Err(error)).is_err() {
                debug!(id = %id, "Requester went away before rejection");
            }
        }
    }

    fn take(
        &self,
        id: RequestId,
        error: Option<&RequestError>,
    ) -> Result<oneshot::Sender<Outcome>, CoordinatorError> {
        match self.pending.remove(&id) {
            Some((_, tx)) => Ok(tx),
            None if self.is_closed() => {
                debug!(id = %id, "Response arrived after shutdown");
                Err(CoordinatorError::UnknownRequestId(id))
            }
            None => {
                if let Some(error) = error {
                    warn!(id = %id, error = %error, "Transcode failed");
                }
                warn!(id = %id, "Response for unknown request id");
                self.metrics.unknown_response();
                Err(CoordinatorError::UnknownRequestId(id))
            }
        }
    }
}
