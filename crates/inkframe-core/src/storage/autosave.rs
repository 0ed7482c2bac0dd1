//! Debounced autosave of serialized scenes.
//!
//! Every accepted change hands the serialized scene to the bridge. The bridge
//! keeps only the newest one and saves it once no further change has arrived
//! for the debounce interval (trailing edge). `flush` saves immediately and is
//! called before a session is torn down.

use super::{SceneStore, StorageResult};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Used by tests and script replay.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Trailing-edge debounce between scene changes and the store.
pub struct AutosaveBridge<S: SceneStore> {
    store: Arc<S>,
    frame_id: String,
    debounce: Duration,
    clock: Arc<dyn Clock>,
    /// Newest unsaved content.
    pending: Option<String>,
    last_change: Option<Instant>,
    /// Content of the last successful save, or of the scene as loaded.
    last_saved: Option<String>,
}

impl<S: SceneStore> AutosaveBridge<S> {
    pub fn new(store: Arc<S>, frame_id: impl Into<String>, debounce: Duration) -> Self {
        Self::with_clock(store, frame_id, debounce, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<S>,
        frame_id: impl Into<String>,
        debounce: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            frame_id: frame_id.into(),
            debounce,
            clock,
            pending: None,
            last_change: None,
            last_saved: None,
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Record content already persisted, so re-saving it is skipped.
    pub fn mark_saved(&mut self, serialized: impl Into<String>) {
        self.last_saved = Some(serialized.into());
    }

    /// Queue new content and restart the quiescence timer.
    pub fn schedule(&mut self, serialized: String) {
        self.pending = Some(serialized);
        self.last_change = Some(self.clock.now());
    }

    /// Whether content is waiting to be saved.
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// When the pending content becomes due, `None` when nothing is pending.
    pub fn deadline(&self) -> Option<Instant> {
        if self.pending.is_none() {
            return None;
        }
        self.last_change.map(|at| at + self.debounce)
    }

    pub fn is_due(&self) -> bool {
        self.deadline()
            .is_some_and(|deadline| self.clock.now() >= deadline)
    }

    /// Save the pending content if the debounce interval has elapsed.
    /// Returns whether the store was written.
    pub async fn tick(&mut self) -> StorageResult<bool> {
        if !self.is_due() {
            return Ok(false);
        }
        self.save_pending().await
    }

    /// Save the pending content now, regardless of the timer.
    pub async fn flush(&mut self) -> StorageResult<bool> {
        if self.pending.is_none() {
            return Ok(false);
        }
        self.save_pending().await
    }

    async fn save_pending(&mut self) -> StorageResult<bool> {
        let Some(content) = self.pending.take() else {
            return Ok(false);
        };
        self.last_change = None;

        if self.last_saved.as_deref() == Some(content.as_str()) {
            log::debug!("Skipping save of unchanged scene for frame {}", self.frame_id);
            return Ok(false);
        }

        match self.store.save_scene(&self.frame_id, &content).await {
            Ok(()) => {
                log::info!("Saved scene for frame {} ({} bytes)", self.frame_id, content.len());
                self.last_saved = Some(content);
                Ok(true)
            }
            Err(e) => {
                log::error!("Failed to save scene for frame {}: {}", self.frame_id, e);
                // keep the content and retry after another quiet period
                self.pending = Some(content);
                self.last_change = Some(self.clock.now());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use pollster::block_on;

    fn bridge() -> (AutosaveBridge<MemoryStore>, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new());
        let bridge = AutosaveBridge::with_clock(
            store.clone(),
            "frame",
            Duration::from_millis(1000),
            clock.clone(),
        );
        (bridge, store, clock)
    }

    #[test]
    fn test_debounce_coalesces_changes() {
        let (mut bridge, store, clock) = bridge();
        for n in 0..5 {
            bridge.schedule(format!("scene-{n}"));
            clock.advance(Duration::from_millis(200));
            assert!(!block_on(bridge.tick()).unwrap());
        }
        assert_eq!(store.save_count(), 0);

        clock.advance(Duration::from_millis(800));
        assert!(block_on(bridge.tick()).unwrap());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.scene("frame").as_deref(), Some("scene-4"));
        assert!(!bridge.is_dirty());
    }

    #[test]
    fn test_new_change_restarts_timer() {
        let (mut bridge, store, clock) = bridge();
        bridge.schedule("a".to_string());
        clock.advance(Duration::from_millis(900));
        bridge.schedule("b".to_string());
        clock.advance(Duration::from_millis(900));
        assert!(!block_on(bridge.tick()).unwrap());
        clock.advance(Duration::from_millis(100));
        assert!(block_on(bridge.tick()).unwrap());
        assert_eq!(store.scene("frame").as_deref(), Some("b"));
    }

    #[test]
    fn test_flush_saves_immediately() {
        let (mut bridge, store, _clock) = bridge();
        bridge.schedule("pending".to_string());
        assert!(block_on(bridge.flush()).unwrap());
        assert_eq!(store.scene("frame").as_deref(), Some("pending"));
        assert!(!block_on(bridge.flush()).unwrap());
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_unchanged_content_is_skipped() {
        let (mut bridge, store, _clock) = bridge();
        bridge.mark_saved("loaded");
        bridge.schedule("loaded".to_string());
        assert!(!block_on(bridge.flush()).unwrap());
        assert_eq!(store.save_count(), 0);
        assert!(!bridge.is_dirty());
    }

    #[test]
    fn test_failed_save_keeps_pending() {
        let (mut bridge, store, clock) = bridge();
        store.set_failing(true);
        bridge.schedule("scene".to_string());
        clock.advance(Duration::from_millis(1000));
        assert!(matches!(block_on(bridge.tick()), Err(StorageError::Io(_))));
        assert_eq!(bridge.pending(), Some("scene"));

        store.set_failing(false);
        // retried only after another quiet period
        assert!(!block_on(bridge.tick()).unwrap());
        clock.advance(Duration::from_millis(1000));
        assert!(block_on(bridge.tick()).unwrap());
        assert_eq!(store.scene("frame").as_deref(), Some("scene"));
    }

    #[test]
    fn test_deadline() {
        let (mut bridge, _store, clock) = bridge();
        assert!(bridge.deadline().is_none());
        bridge.schedule("x".to_string());
        assert_eq!(bridge.deadline(), Some(clock.now() + Duration::from_millis(1000)));
    }
}
