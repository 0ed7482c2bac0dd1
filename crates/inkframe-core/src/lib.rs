//! InkFrame Core Library
//!
//! Platform-agnostic scene engine for the InkFrame whiteboard: the document
//! model, drawing tools, undo/redo history, debounced autosave and the
//! render/hit-test surface.

pub mod camera;
pub mod config;
pub mod document;
pub mod history;
pub mod input;
pub mod objects;
pub mod session;
pub mod storage;
pub mod surface;
pub mod tools;

pub use camera::Camera;
pub use config::{ConfigError, EditorConfig};
pub use document::{SceneDocument, SceneError};
pub use history::{DEFAULT_HISTORY_CAPACITY, History, HistoryEntry};
pub use input::{EditorCommand, Key, KeyEvent, Modifiers, PointerEvent};
pub use objects::{
    InvalidMutation, ObjectId, ObjectPatch, ObjectStyle, SceneObject, SerializableColor,
};
pub use session::EditorSession;
pub use storage::{
    AutosaveBridge, Clock, FileStore, ManualClock, MemoryStore, SceneStore, StorageError,
    StorageResult, SystemClock,
};
pub use surface::{DrawItem, DrawList, HitFilter, Interactivity, Surface};
pub use tools::{ShapeKind, ToolConfig, ToolConfigError, ToolEffect, ToolHandler, ToolKind};
