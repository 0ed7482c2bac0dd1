//! In-memory scene store.

use super::{BoxFuture, SceneStore, StorageError, StorageResult, non_blank};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    scenes: RwLock<HashMap<String, String>>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a frame with stored content.
    pub fn with_scene(self, frame_id: &str, serialized: &str) -> Self {
        if let Ok(mut scenes) = self.scenes.write() {
            scenes.insert(frame_id.to_string(), serialized.to_string());
        }
        self
    }

    /// Stored content of a frame, as last written.
    pub fn scene(&self, frame_id: &str) -> Option<String> {
        self.scenes.read().ok()?.get(frame_id).cloned()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every following save fail with an IO error until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl SceneStore for MemoryStore {
    fn load_scene(&self, frame_id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let frame_id = frame_id.to_string();
        Box::pin(async move {
            let scenes = self
                .scenes
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(scenes.get(&frame_id).cloned().and_then(non_blank))
        })
    }

    fn save_scene(&self, frame_id: &str, serialized: &str) -> BoxFuture<'_, StorageResult<()>> {
        let frame_id = frame_id.to_string();
        let serialized = serialized.to_string();
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Io(format!("Failed to write {}", frame_id)));
            }
            let mut scenes = self
                .scenes
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            scenes.insert(frame_id, serialized);
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}
