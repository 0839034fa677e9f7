//! The transcode worker service.
//!
//! The worker owns the native transcoder. It receives [`TranscodeRequest`]s,
//! fetches or takes the container bytes, waits on the readiness gate, runs
//! the transcode on the blocking pool and sends exactly one
//! [`TranscodeResponse`] per request.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       TranscodeWorker                        │
//! │                                                              │
//! │  TranscodeRequest ──► spawn per request                      │
//! │                          │                                   │
//! │                          ▼                                   │
//! │                  ┌───────────────┐                           │
//! │                  │ Source        │──► Url ──► Fetcher        │
//! │                  └──────┬────────┘                           │
//! │                         ▼                                    │
//! │                  ┌───────────────┐                           │
//! │                  │ ReadinessGate │ (initialize once)         │
//! │                  └──────┬────────┘                           │
//! │                         ▼                                    │
//! │                  ┌───────────────┐                           │
//! │                  │ Semaphore     │──► spawn_blocking         │
//! │                  └──────┬────────┘      transcode()          │
//! │                         ▼                                    │
//! │                  TranscodeResponse ──► requesting side       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Responses are not ordered: a later request may finish first.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{LoadError, RequestError};
use crate::transcode::{transcode, TranscodeJob, TranscodedImage, Transcoder};

use super::fetch::Fetcher;
use super::gate::ReadinessGate;
use super::protocol::{TextureSource, TranscodeRequest, TranscodeResponse};

/// Default number of transcodes allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT_TRANSCODES: usize = 4;

/// Worker that turns requests into transcoded images.
pub struct TranscodeWorker<T: Transcoder, F: Fetcher> {
    transcoder: Arc<T>,
    fetcher: Arc<F>,
    gate: Arc<ReadinessGate>,
    limiter: Arc<Semaphore>,
}

impl<T: Transcoder, F: Fetcher> Clone for TranscodeWorker<T, F> {
    fn clone(&self) -> Self {
        Self {
            transcoder: Arc::clone(&self.transcoder),
            fetcher: Arc::clone(&self.fetcher),
            gate: Arc::clone(&self.gate),
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<T: Transcoder, F: Fetcher> TranscodeWorker<T, F> {
    /// Creates a worker.
    ///
    /// # Arguments
    ///
    /// * `transcoder` - Native transcoder, initialized lazily on first use
    /// * `fetcher` - Source of bytes for URL requests
    /// * `max_concurrent_transcodes` - Upper bound on parallel transcodes
    pub fn new(transcoder: Arc<T>, fetcher: Arc<F>, max_concurrent_transcodes: usize) -> Self {
        Self {
            transcoder,
            fetcher,
            gate: Arc::new(ReadinessGate::new()),
            limiter: Arc::new(Semaphore::new(max_concurrent_transcodes.max(1))),
        }
    }

    /// Runs until `shutdown` fires or the request channel closes.
    ///
    /// Requests still queued at shutdown are answered with
    /// `WorkerUnavailable`; requests already in flight run to completion.
    pub async fn run(
        self,
        mut request_rx: mpsc::UnboundedReceiver<TranscodeRequest>,
        response_tx: mpsc::UnboundedSender<TranscodeResponse>,
        shutdown: CancellationToken,
    ) {
        info!("Transcode worker starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Transcode worker shutting down");
                    break;
                }

                request = request_rx.recv() => {
                    match request {
                        Some(request) => {
                            let worker = self.clone();
                            let response_tx = response_tx.clone();
                            tokio::spawn(async move {
                                let response = worker.handle(request).await;
                                if response_tx.send(response).is_err() {
                                    debug!("Response channel closed, dropping response");
                                }
                            });
                        }
                        None => {
                            info!("Request channel closed, transcode worker stopping");
                            break;
                        }
                    }
                }
            }
        }

        request_rx.close();
        while let Ok(request) = request_rx.try_recv() {
            let error = LoadError::WorkerUnavailable("worker shut down".to_string());
            let _ = response_tx.send(TranscodeResponse::failure(request.id, error.into()));
        }
    }

    /// Processes one request into its response.
    pub async fn handle(&self, request: TranscodeRequest) -> TranscodeResponse {
        let id = request.id;
        match self.process(request).await {
            Ok(image) => {
                debug!(
                    id = %id,
                    format = %image.format,
                    levels = image.mip_levels.len(),
                    bytes = image.byte_len(),
                    "Transcode complete"
                );
                TranscodeResponse::success(id, image)
            }
            Err(e) => {
                warn!(id = %id, code = ?e.code(), error = %e, "Transcode failed");
                TranscodeResponse::failure(id, RequestError::from(e))
            }
        }
    }

    async fn process(&self, request: TranscodeRequest) -> Result<TranscodedImage, LoadError> {
        let data: Bytes = match request.source {
            Some(TextureSource::Url(url)) => {
                debug!(id = %request.id, url = %url, "Fetching container");
                self.fetcher.fetch(&url).await?
            }
            Some(TextureSource::Buffer(buffer)) => buffer,
            None => return Err(LoadError::MissingSource),
        };

        self.gate.wait(&*self.transcoder).await?;

        let _permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|e| LoadError::WorkerUnavailable(e.to_string()))?;

        let job = TranscodeJob {
            capabilities: request.capabilities,
            allow_separate_alpha: request.allow_separate_alpha,
        };
        let transcoder = Arc::clone(&self.transcoder);

        let image = tokio::task::spawn_blocking(move || transcode(&*transcoder, &data, &job))
            .await
            .map_err(|e| LoadError::WorkerUnavailable(format!("transcode task failed: {}", e)))??;

        Ok(image)
    }
}
