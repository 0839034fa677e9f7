//! The worker side of the loader.
//!
//! The worker runs in its own task, shares no state with the requesting
//! side, and communicates only through [`TranscodeRequest`] and
//! [`TranscodeResponse`] messages. Output buffers move to the requester with
//! the response.

mod fetch;
mod gate;
mod protocol;
mod service;

pub use fetch::{FetchError, FetchFuture, Fetcher, ReqwestFetcher};
pub use gate::ReadinessGate;
pub use protocol::{RequestId, RequestOptions, TextureSource, TranscodeRequest, TranscodeResponse};
pub use service::{TranscodeWorker, DEFAULT_MAX_CONCURRENT_TRANSCODES};

#[cfg(test)]
pub(crate) use fetch::tests::MockFetcher;
