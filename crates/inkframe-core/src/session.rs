//! Editor session: one open frame.
//!
//! A session ties the document, history, surface, active tool and autosave
//! bridge together. It is created when a frame is opened and closed (flushed)
//! when the frame is left.

use crate::config::EditorConfig;
use crate::document::{SceneDocument, SceneError};
use crate::history::{History, HistoryEntry};
use crate::input::{EditorCommand, KeyEvent, PointerEvent};
use crate::objects::{ObjectId, ObjectPatch, SceneObject, SerializableColor};
use crate::storage::{AutosaveBridge, Clock, SceneStore, StorageResult, SystemClock};
use crate::surface::{DrawList, Surface};
use crate::camera::Camera;
use crate::tools::{
    ShapeKind, ToolConfig, ToolConfigError, ToolContext, ToolEffect, ToolHandler, ToolKind,
    handler_for,
};
use kurbo::{Point, Vec2};
use std::sync::Arc;
use std::time::Instant;

/// Text object being edited and the scene as it was before editing started.
#[derive(Debug)]
struct TextEdit {
    id: ObjectId,
    before: HistoryEntry,
    original: String,
}

/// An open frame.
pub struct EditorSession<S: SceneStore> {
    document: SceneDocument,
    history: History,
    surface: Surface,
    tools: ToolConfig,
    handler: Box<dyn ToolHandler>,
    selection: Option<ObjectId>,
    editing: Option<TextEdit>,
    autosave: AutosaveBridge<S>,
    settings: EditorConfig,
    /// Set while the document is replaced wholesale; no changes are emitted.
    suppress: bool,
}

impl<S: SceneStore> EditorSession<S> {
    /// Open a frame, loading its scene from the store.
    pub async fn open(
        store: Arc<S>,
        frame_id: impl Into<String>,
        settings: EditorConfig,
    ) -> StorageResult<Self> {
        Self::open_with_clock(store, frame_id, settings, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(
        store: Arc<S>,
        frame_id: impl Into<String>,
        settings: EditorConfig,
        clock: Arc<dyn Clock>,
    ) -> StorageResult<Self> {
        let frame_id = frame_id.into();
        let stored = store.load_scene(&frame_id).await?;
        let autosave = AutosaveBridge::with_clock(store, frame_id, settings.debounce(), clock);

        let tools = ToolConfig::default();
        let mut session = Self {
            document: SceneDocument::new(),
            history: History::new(settings.history_capacity),
            surface: Surface::new(Camera::with_limits(settings.min_zoom, settings.max_zoom)),
            handler: handler_for(tools.active_tool()),
            tools,
            selection: None,
            editing: None,
            autosave,
            settings,
            suppress: false,
        };
        session.hydrate(stored.as_deref());
        session.enter_tool(session.tools.active_tool());
        log::info!(
            "Opened frame {} with {} objects",
            session.autosave.frame_id(),
            session.document.len()
        );
        Ok(session)
    }

    /// Replace the document with stored content, without history or emission.
    fn hydrate(&mut self, stored: Option<&str>) {
        self.suppress = true;
        self.document = match stored {
            None => SceneDocument::new(),
            Some(content) => SceneDocument::load(content).unwrap_or_else(|e| {
                log::warn!(
                    "Frame {} has an unreadable scene, starting empty: {}",
                    self.autosave.frame_id(),
                    e
                );
                SceneDocument::new()
            }),
        };
        if stored.is_some() {
            if let Ok(serialized) = self.document.serialize() {
                self.autosave.mark_saved(serialized);
            }
        }
        self.suppress = false;
    }

    pub fn frame_id(&self) -> &str {
        self.autosave.frame_id()
    }

    pub fn document(&self) -> &SceneDocument {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn tool_config(&self) -> &ToolConfig {
        &self.tools
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tools.active_tool()
    }

    pub fn handler(&self) -> &dyn ToolHandler {
        self.handler.as_ref()
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    /// Text object in edit mode, if any.
    pub fn editing_text(&self) -> Option<ObjectId> {
        self.editing.as_ref().map(|edit| edit.id)
    }

    pub fn settings(&self) -> &EditorConfig {
        &self.settings
    }

    pub fn autosave(&self) -> &AutosaveBridge<S> {
        &self.autosave
    }

    // --- Tool selection ---

    /// Switch tools. The previous handler is dropped with any gesture state.
    pub fn set_tool(&mut self, kind: ToolKind) {
        self.finish_text_editing();
        self.tools.set_tool(kind);
        self.selection = None;
        self.enter_tool(kind);
        log::debug!("Switched to {} tool", kind);
    }

    fn enter_tool(&mut self, kind: ToolKind) {
        self.handler = handler_for(kind);
        self.surface.set_all_interactive(false);
        if kind == ToolKind::Select {
            self.surface.set_all_interactive(true);
        }
    }

    pub fn set_stroke_color(&mut self, hex: &str) -> Result<(), ToolConfigError> {
        self.tools.set_stroke_color(hex)
    }

    pub fn set_brush_width(&mut self, width: u32) -> Result<(), ToolConfigError> {
        self.tools.set_brush_width(width)
    }

    pub fn set_shape_kind(&mut self, kind: ShapeKind) {
        self.tools.set_shape_kind(kind);
    }

    // --- View ---

    pub fn pan(&mut self, delta: Vec2) {
        self.surface.camera.pan(delta);
    }

    pub fn zoom_at(&mut self, device_point: Point, factor: f64) {
        self.surface.camera.zoom_at(device_point, factor);
    }

    /// Draw list of the scene plus any in-progress stroke.
    pub fn draw_list(&self) -> DrawList {
        let preview = self.handler.preview();
        self.surface.draw_list(&self.document, preview.as_ref())
    }

    // --- Input ---

    /// Feed a pointer event in device coordinates.
    pub fn pointer(&mut self, event: PointerEvent) -> Result<(), SceneError> {
        let point = self.surface.to_scene(event.position());
        if matches!(event, PointerEvent::Down { .. }) {
            self.finish_text_editing();
        }
        let ctx = ToolContext {
            document: &self.document,
            config: &self.tools,
            surface: &self.surface,
            settings: &self.settings,
        };
        let effects = match event {
            PointerEvent::Down { .. } => self.handler.pointer_down(&ctx, point),
            PointerEvent::Move { .. } => self.handler.pointer_move(&ctx, point),
            PointerEvent::Up { .. } => self.handler.pointer_up(&ctx, point),
        };
        self.apply_effects(effects)
    }

    pub fn pointer_down(&mut self, device_point: Point) -> Result<(), SceneError> {
        self.pointer(PointerEvent::Down {
            position: device_point,
        })
    }

    pub fn pointer_move(&mut self, device_point: Point) -> Result<(), SceneError> {
        self.pointer(PointerEvent::Move {
            position: device_point,
        })
    }

    pub fn pointer_up(&mut self, device_point: Point) -> Result<(), SceneError> {
        self.pointer(PointerEvent::Up {
            position: device_point,
        })
    }

    /// Handle an editor shortcut. Unbound keys are ignored.
    pub fn handle_key(&mut self, event: KeyEvent) -> Result<(), SceneError> {
        let Some(command) = EditorCommand::from_key(&event) else {
            return Ok(());
        };
        match command {
            // while editing, Delete and Backspace belong to the text
            EditorCommand::DeleteSelection if self.editing.is_some() => {}
            EditorCommand::DeleteSelection => {
                self.delete_selection()?;
            }
            EditorCommand::Undo => {
                self.undo()?;
            }
            EditorCommand::Redo => {
                self.redo()?;
            }
            EditorCommand::Cancel => {
                if self.editing.is_some() {
                    self.finish_text_editing();
                } else {
                    self.selection = None;
                }
            }
        }
        Ok(())
    }

    // --- Mutations ---

    /// Apply a handler batch atomically: either every mutation lands or none.
    fn apply_effects(&mut self, effects: Vec<ToolEffect>) -> Result<(), SceneError> {
        if effects.is_empty() {
            return Ok(());
        }
        let wants_snapshot = effects.iter().any(|e| matches!(e, ToolEffect::Snapshot));
        let mutations = effects
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    ToolEffect::Add(_) | ToolEffect::Update { .. } | ToolEffect::Remove(_)
                )
            })
            .count();

        let before = if wants_snapshot && mutations > 0 {
            Some(HistoryEntry::new(self.document.serialize()?))
        } else {
            None
        };
        let backup = (mutations > 1).then(|| self.document.clone());

        let mut selection = self.selection;
        let mut edit = None;
        let mut removed = Vec::new();
        for effect in effects {
            let result = match effect {
                ToolEffect::Snapshot => Ok(()),
                ToolEffect::Add(object) => self.document.add_object(object).map(|_| ()),
                ToolEffect::Update { id, patch } => self.document.update_object(id, patch),
                ToolEffect::Remove(id) => self.document.remove_object(id).map(|_| removed.push(id)),
                ToolEffect::Select(id) => {
                    selection = id;
                    Ok(())
                }
                ToolEffect::EditText(id) => {
                    edit = Some(id);
                    Ok(())
                }
            };
            if let Err(e) = result {
                if let Some(backup) = backup {
                    self.document = backup;
                }
                log::warn!("Rejected {} change: {}", self.tools.active_tool(), e);
                return Err(e);
            }
        }

        match before {
            Some(entry) => self.history.record(entry),
            // eraser removals and shape drags record nothing but still end redo
            None if mutations > 0 => self.history.clear_redo(),
            None => {}
        }
        for id in removed {
            self.surface.forget(id);
            if selection == Some(id) {
                selection = None;
            }
        }
        self.selection = selection.filter(|id| self.document.contains_id(*id));
        if let Some(id) = edit {
            self.begin_text_edit(id)?;
        }
        if mutations > 0 {
            self.emit();
        }
        Ok(())
    }

    /// Hand the current scene to the autosave bridge.
    fn emit(&mut self) {
        if self.suppress {
            return;
        }
        match self.document.serialize() {
            Ok(serialized) => self.autosave.schedule(serialized),
            Err(e) => log::error!("Failed to serialize frame {}: {}", self.frame_id(), e),
        }
    }

    /// Add an object on top with one history entry.
    pub fn add_object(&mut self, object: SceneObject) -> Result<ObjectId, SceneError> {
        let id = object.id();
        self.apply_effects(vec![ToolEffect::Snapshot, ToolEffect::Add(object)])?;
        Ok(id)
    }

    /// Patch an object with one history entry.
    pub fn modify_object(&mut self, id: ObjectId, patch: ObjectPatch) -> Result<(), SceneError> {
        self.apply_effects(vec![ToolEffect::Snapshot, ToolEffect::Update { id, patch }])
    }

    /// Remove the selected object. Returns whether anything was removed.
    pub fn delete_selection(&mut self) -> Result<bool, SceneError> {
        let Some(id) = self.selection else {
            return Ok(false);
        };
        self.apply_effects(vec![ToolEffect::Snapshot, ToolEffect::Remove(id)])?;
        Ok(true)
    }

    /// Change the canvas background. Not recorded in history.
    pub fn set_background(&mut self, color: SerializableColor) {
        if self.document.background_color != color {
            self.document.set_background(color);
            self.history.clear_redo();
            self.emit();
        }
    }

    // --- Text editing ---

    fn begin_text_edit(&mut self, id: ObjectId) -> Result<(), SceneError> {
        let Some(text) = self.document.get(id).and_then(SceneObject::as_text) else {
            return Err(SceneError::NotFound(id));
        };
        let original = text.content.clone();
        self.editing = Some(TextEdit {
            id,
            before: HistoryEntry::new(self.document.serialize()?),
            original,
        });
        Ok(())
    }

    /// Replace the content of the text being edited. Emits, records no history.
    /// Returns false when no text is in edit mode.
    pub fn edit_text(&mut self, content: impl Into<String>) -> Result<bool, SceneError> {
        let Some(id) = self.editing_text() else {
            return Ok(false);
        };
        self.document
            .update_object(id, ObjectPatch::Content(content.into()))?;
        self.history.clear_redo();
        self.emit();
        Ok(true)
    }

    /// Leave text-edit mode, recording the pre-edit scene if the text changed.
    pub fn finish_text_editing(&mut self) -> bool {
        let Some(edit) = self.editing.take() else {
            return false;
        };
        let current = self
            .document
            .get(edit.id)
            .and_then(SceneObject::as_text)
            .map(|text| text.content.as_str());
        let changed = current.is_some_and(|content| content != edit.original);
        if changed {
            self.history.record(edit.before);
        }
        changed
    }

    // --- History ---

    /// Restore the previous scene. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, SceneError> {
        self.finish_text_editing();
        let Some(entry) = self.history.peek_undo() else {
            return Ok(false);
        };
        let restored = SceneDocument::load(entry.as_str())?;
        let current = HistoryEntry::new(self.document.serialize()?);
        self.history.undo(current);
        self.replace_document(restored);
        self.emit();
        Ok(true)
    }

    /// Re-apply an undone scene. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, SceneError> {
        self.finish_text_editing();
        let Some(entry) = self.history.peek_redo() else {
            return Ok(false);
        };
        let restored = SceneDocument::load(entry.as_str())?;
        let current = HistoryEntry::new(self.document.serialize()?);
        self.history.redo(current);
        self.replace_document(restored);
        self.emit();
        Ok(true)
    }

    fn replace_document(&mut self, document: SceneDocument) {
        self.suppress = true;
        self.document = document;
        self.selection = self
            .selection
            .filter(|id| self.document.contains_id(*id));
        if self.handler.is_active() {
            // drop gesture state that points at replaced objects
            self.handler = handler_for(self.tools.active_tool());
        }
        self.suppress = false;
    }

    // --- Persistence ---

    /// When the pending scene becomes due for saving.
    pub fn next_save_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    /// Save the pending scene if the debounce interval has elapsed.
    pub async fn tick(&mut self) -> StorageResult<bool> {
        self.autosave.tick().await
    }

    /// Save the pending scene now.
    pub async fn flush(&mut self) -> StorageResult<bool> {
        self.autosave.flush().await
    }

    /// Finish editing and flush. Returns whether the store was written.
    /// On error the pending scene is kept and `close` may be called again.
    pub async fn close(&mut self) -> StorageResult<bool> {
        self.finish_text_editing();
        self.handler = handler_for(self.tools.active_tool());
        let saved = self.autosave.flush().await?;
        log::info!("Closed frame {}", self.frame_id());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, Modifiers};
    use crate::objects::Rectangle;
    use crate::storage::{ManualClock, MemoryStore};
    use pollster::block_on;
    use std::time::Duration;

    fn session() -> (EditorSession<MemoryStore>, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new());
        let session = block_on(EditorSession::open_with_clock(
            store.clone(),
            "frame",
            EditorConfig::default(),
            clock.clone(),
        ))
        .unwrap();
        (session, store, clock)
    }

    fn stroke(session: &mut EditorSession<MemoryStore>, from: Point, to: Point) {
        session.pointer_down(from).unwrap();
        session.pointer_move(from.midpoint(to)).unwrap();
        session.pointer_up(to).unwrap();
    }

    #[test]
    fn test_open_starts_with_pen() {
        let (session, _, _) = session();
        assert_eq!(session.active_tool(), ToolKind::Pen);
        assert!(session.document().is_empty());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_stroke_records_history_and_emits() {
        let (mut session, _, _) = session();
        stroke(&mut session, Point::new(0.0, 0.0), Point::new(40.0, 30.0));
        assert_eq!(session.document().len(), 1);
        assert_eq!(session.history().undo_len(), 1);
        assert!(session.is_dirty());
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let (mut session, _, _) = session();
        let rect = Rectangle::new(Point::ZERO, 10.0, 10.0);
        let id = session.add_object(rect.clone().into()).unwrap();
        let undo_before = session.history().undo_len();

        let err = session
            .modify_object(id, ObjectPatch::StrokeWidth(-1.0))
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidMutation(_)));
        assert_eq!(session.history().undo_len(), undo_before);

        let err = session.add_object(rect.into()).unwrap_err();
        assert!(matches!(err, SceneError::InvalidMutation(_)));
        assert_eq!(session.document().len(), 1);
    }

    #[test]
    fn test_delete_key_removes_selection() {
        let (mut session, _, _) = session();
        let id = session
            .add_object(Rectangle::new(Point::ZERO, 50.0, 50.0).into())
            .unwrap();
        session.set_tool(ToolKind::Select);
        session.pointer_down(Point::new(10.0, 10.0)).unwrap();
        session.pointer_up(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(session.selection(), Some(id));

        session.handle_key(KeyEvent::plain(Key::Delete)).unwrap();
        assert!(session.document().is_empty());
        assert_eq!(session.selection(), None);

        session
            .handle_key(KeyEvent::new(Key::Char('z'), Modifiers::CTRL))
            .unwrap();
        assert!(session.document().contains_id(id));
    }

    #[test]
    fn test_text_edit_commit() {
        let (mut session, _, _) = session();
        session.set_tool(ToolKind::Text);
        session.pointer_down(Point::new(10.0, 10.0)).unwrap();
        session.pointer_up(Point::new(10.0, 10.0)).unwrap();
        let id = session.editing_text().unwrap();
        assert_eq!(session.history().undo_len(), 1);

        // Backspace belongs to the text while editing
        session.handle_key(KeyEvent::plain(Key::Backspace)).unwrap();
        assert!(session.document().contains_id(id));

        assert!(session.edit_text("Hello").unwrap());
        assert_eq!(session.history().undo_len(), 1);
        assert!(session.finish_text_editing());
        assert_eq!(session.history().undo_len(), 2);

        session.undo().unwrap();
        let text = session.document().get(id).and_then(SceneObject::as_text).unwrap();
        assert_eq!(text.content, "Type here");
    }

    #[test]
    fn test_unchanged_text_edit_records_nothing() {
        let (mut session, _, _) = session();
        session.set_tool(ToolKind::Text);
        session.pointer_down(Point::new(10.0, 10.0)).unwrap();
        assert!(!session.finish_text_editing());
        assert_eq!(session.history().undo_len(), 1);
    }

    #[test]
    fn test_set_tool_resets_interactivity_and_handler() {
        let (mut session, _, _) = session();
        let id = session
            .add_object(Rectangle::new(Point::ZERO, 50.0, 50.0).into())
            .unwrap();
        session.set_tool(ToolKind::Select);
        assert!(session.surface().interactivity(id).evented);
        session.set_tool(ToolKind::Eraser);
        assert!(!session.surface().interactivity(id).evented);
        assert_eq!(session.handler().kind(), ToolKind::Eraser);

        session.set_tool(ToolKind::Eraser);
        assert_eq!(session.handler().kind(), ToolKind::Eraser);
        assert!(!session.handler().is_active());
    }

    #[test]
    fn test_pointer_mapped_through_view() {
        let (mut session, _, _) = session();
        session.pan(Vec2::new(100.0, 0.0));
        session.set_tool(ToolKind::Text);
        session.pointer_down(Point::new(110.0, 20.0)).unwrap();
        let id = session.editing_text().unwrap();
        assert_eq!(session.document().get(id).unwrap().position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_close_flushes() {
        let (mut session, store, clock) = session();
        stroke(&mut session, Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        clock.advance(Duration::from_millis(10));
        assert!(!block_on(session.tick()).unwrap());
        assert!(block_on(session.close()).unwrap());
        assert_eq!(store.save_count(), 1);
        let saved = store.scene("frame").unwrap();
        assert_eq!(SceneDocument::load(&saved).unwrap(), *session.document());
    }

    #[test]
    fn test_malformed_stored_scene_opens_empty() {
        let store = Arc::new(MemoryStore::new().with_scene("frame", "{broken"));
        let session = block_on(EditorSession::open(store, "frame", EditorConfig::default())).unwrap();
        assert!(session.document().is_empty());
    }
}
