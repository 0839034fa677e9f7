//! The requesting side of the loader.
//!
//! - [`RequestCoordinator`] assigns ids and matches responses to callers
//! - [`TextureLoader`] is the application-facing facade that owns the
//!   capability snapshot and spawns the worker

mod loader;
mod requests;

pub use loader::{TextureLoadError, TextureLoader};
pub use requests::{CoordinatorError, PendingTexture, RequestCoordinator};
