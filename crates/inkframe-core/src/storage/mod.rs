//! Persistence collaborator for frame scenes.
//!
//! The engine never owns a database. It hands serialized scenes to a
//! [`SceneStore`] and asks it for them back when a frame is opened.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutosaveBridge, Clock, ManualClock, SystemClock};
pub use file::FileStore;
pub use memory::MemoryStore;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Scene not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Loads and saves the serialized scene of a frame.
pub trait SceneStore: Send + Sync {
    /// Load the serialized scene of a frame.
    ///
    /// Returns `None` for a frame that has never been drawn on. Empty or
    /// whitespace-only content counts as `None`.
    fn load_scene(&self, frame_id: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Save the serialized scene of a frame. Saving identical content twice is harmless.
    fn save_scene(&self, frame_id: &str, serialized: &str) -> BoxFuture<'_, StorageResult<()>>;
}

/// Map blank stored content to "no drawing".
pub(crate) fn non_blank(content: String) -> Option<String> {
    if content.trim().is_empty() {
        None
    } else {
        Some(content)
    }
}
