//! The requesting-side facade.
//!
//! [`TextureLoader`] owns the capability snapshot for the current GPU
//! context, spawns the transcode worker and the response dispatcher, and
//! exposes submit/load calls to the application.
//!
//! ```text
//!   load_from_url ──► RequestCoordinator::submit ──► TranscodeWorker
//!        │                     ▲                          │
//!        │                     └──── TranscodeResponse ◄──┘
//!        ▼
//!   PendingTexture ──► materialize ──► LoadedTexture
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::capabilities::{ExtensionQuery, FormatCapabilitySet};
use crate::config::LoaderConfig;
use crate::error::RequestError;
use crate::materialize::{materialize, LoadedTexture, TextureMaterializer};
use crate::telemetry::{LoaderMetrics, MetricsSnapshot};
use crate::transcode::Transcoder;
use crate::worker::{
    FetchError, Fetcher, RequestOptions, ReqwestFetcher, TextureSource, TranscodeWorker,
};

use super::requests::{PendingTexture, RequestCoordinator};

/// Failure of a full load: either the request or the upload failed.
#[derive(Debug, Error)]
pub enum TextureLoadError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Texture upload failed: {0}")]
    Upload(#[source] E),
}

/// Loads compressed textures for one GPU context.
///
/// Must be started from within a tokio runtime. Dropping the loader stops
/// the worker and the dispatcher.
pub struct TextureLoader {
    coordinator: Arc<RequestCoordinator>,
    capabilities: RwLock<FormatCapabilitySet>,
    allow_separate_alpha: AtomicBool,
    metrics: Arc<LoaderMetrics>,
    shutdown: CancellationToken,
}

impl TextureLoader {
    /// Spawns the worker and response dispatcher and returns the loader.
    ///
    /// Capabilities start empty until [`set_context`](Self::set_context) or
    /// [`set_capabilities`](Self::set_capabilities) is called, so requests
    /// made before that fall back to uncompressed output.
    pub fn start<T: Transcoder, F: Fetcher>(
        config: &LoaderConfig,
        transcoder: Arc<T>,
        fetcher: Arc<F>,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let metrics = Arc::new(LoaderMetrics::new());

        let worker = TranscodeWorker::new(transcoder, fetcher, config.max_concurrent_transcodes);
        tokio::spawn(worker.run(request_rx, response_tx, shutdown.clone()));

        let coordinator = Arc::new(RequestCoordinator::new(request_tx, Arc::clone(&metrics)));
        tokio::spawn(Arc::clone(&coordinator).run(response_rx, shutdown.clone()));

        info!(
            allow_separate_alpha = config.allow_separate_alpha,
            max_concurrent_transcodes = config.max_concurrent_transcodes,
            "Texture loader started"
        );

        Self {
            coordinator,
            capabilities: RwLock::new(FormatCapabilitySet::NONE),
            allow_separate_alpha: AtomicBool::new(config.allow_separate_alpha),
            metrics,
            shutdown,
        }
    }

    /// Starts a loader that fetches URLs over HTTP.
    pub fn start_with_http<T: Transcoder>(
        config: &LoaderConfig,
        transcoder: Arc<T>,
    ) -> Result<Self, FetchError> {
        let fetcher = ReqwestFetcher::new(config.fetch_timeout)?;
        Ok(Self::start(config, transcoder, Arc::new(fetcher)))
    }

    /// Probes `context` and replaces the capability set.
    ///
    /// `None` clears every capability.
    pub fn set_context<Q: ExtensionQuery + ?Sized>(&self, context: Option<&Q>) {
        let caps = context.map_or(FormatCapabilitySet::NONE, FormatCapabilitySet::from_extensions);
        self.set_capabilities(caps);
    }

    /// Replaces the capability set wholesale.
    pub fn set_capabilities(&self, caps: FormatCapabilitySet) {
        debug!(families = ?caps.families(), "GPU capabilities updated");
        *self.capabilities.write() = caps;
    }

    pub fn capabilities(&self) -> FormatCapabilitySet {
        *self.capabilities.read()
    }

    pub fn set_allow_separate_alpha(&self, allow: bool) {
        self.allow_separate_alpha.store(allow, Ordering::Relaxed);
    }

    pub fn allow_separate_alpha(&self) -> bool {
        self.allow_separate_alpha.load(Ordering::Relaxed)
    }

    /// Submits a request with an optional source.
    ///
    /// A request with no source is rejected by the worker.
    pub fn submit(&self, source: Option<TextureSource>) -> PendingTexture {
        let options = RequestOptions {
            allow_separate_alpha: self.allow_separate_alpha(),
            capabilities: self.capabilities(),
        };
        self.coordinator.submit(source, options)
    }

    pub fn submit_url(&self, url: impl Into<String>) -> PendingTexture {
        self.submit(Some(TextureSource::Url(url.into())))
    }

    pub fn submit_buffer(&self, buffer: impl Into<Bytes>) -> PendingTexture {
        self.submit(Some(TextureSource::Buffer(buffer.into())))
    }

    /// Fetches, transcodes and uploads the container at `url`.
    pub async fn load_from_url<M: TextureMaterializer>(
        &self,
        url: impl Into<String>,
        materializer: &mut M,
    ) -> Result<LoadedTexture<M::Texture>, TextureLoadError<M::Error>> {
        let image = self.submit_url(url).await?;
        materialize(materializer, &image).map_err(TextureLoadError::Upload)
    }

    /// Transcodes and uploads an in-memory container.
    pub async fn load_from_buffer<M: TextureMaterializer>(
        &self,
        buffer: impl Into<Bytes>,
        materializer: &mut M,
    ) -> Result<LoadedTexture<M::Texture>, TextureLoadError<M::Error>> {
        let image = self.submit_buffer(buffer).await?;
        materialize(materializer, &image).map_err(TextureLoadError::Upload)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn pending_count(&self) -> usize {
        self.coordinator.pending_count()
    }

    /// Stops the worker and dispatcher. Idempotent.
    ///
    /// Requests still pending, and any submitted afterwards, are rejected
    /// with `WorkerUnavailable`.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Texture loader shutting down");
            self.shutdown.cancel();
        }
        self.coordinator.close();
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.coordinator.close();
    }
}
