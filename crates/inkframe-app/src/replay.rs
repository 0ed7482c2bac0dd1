//! Scripted editing sessions.
//!
//! A script is a JSON array of steps, for example:
//!
//! ```json
//! [
//!   {"tool": "shape"},
//!   {"down": {"x": 100.0, "y": 100.0}},
//!   {"up": {"x": 40.0, "y": 60.0}},
//!   {"wait_ms": 1000}
//! ]
//! ```
//!
//! Time only passes on `wait_ms` steps, so autosave timing is reproducible.

use inkframe_core::{
    ConfigError, EditorSession, KeyEvent, ManualClock, SceneError, SceneStore, ShapeKind,
    StorageError, ToolConfigError, ToolKind,
};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("Step {step}: {source}")]
    Tool {
        step: usize,
        #[source]
        source: ToolConfigError,
    },
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Tool(ToolKind),
    Color(String),
    Width(u32),
    Shape(ShapeKind),
    Down(Point),
    Move(Point),
    Up(Point),
    Key(KeyEvent),
    Text(String),
    FinishText,
    Undo,
    Redo,
    Pan(Vec2),
    Zoom { at: Point, factor: f64 },
    WaitMs(u64),
    Flush,
}

/// Read a script from a JSON file.
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<ScriptStep>, ReplayError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// What a replay left behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub frame_id: String,
    pub objects: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub saves: usize,
}

/// Drives an editor session from script steps on a manual clock.
pub struct ScriptRunner<S: SceneStore> {
    session: EditorSession<S>,
    clock: Arc<ManualClock>,
    saves: usize,
}

impl<S: SceneStore> ScriptRunner<S> {
    pub fn new(session: EditorSession<S>, clock: Arc<ManualClock>) -> Self {
        Self {
            session,
            clock,
            saves: 0,
        }
    }

    pub fn session(&self) -> &EditorSession<S> {
        &self.session
    }

    /// Apply one step. Rejected scene changes are logged and skipped.
    pub async fn step(&mut self, index: usize, step: ScriptStep) -> Result<(), ReplayError> {
        log::debug!("Step {}: {:?}", index, step);
        let tool_error = |source| ReplayError::Tool {
            step: index,
            source,
        };
        let scene_result = match step {
            ScriptStep::Tool(kind) => {
                self.session.set_tool(kind);
                Ok(())
            }
            ScriptStep::Color(hex) => {
                return self.session.set_stroke_color(&hex).map_err(tool_error);
            }
            ScriptStep::Width(width) => {
                return self.session.set_brush_width(width).map_err(tool_error);
            }
            ScriptStep::Shape(kind) => {
                self.session.set_shape_kind(kind);
                Ok(())
            }
            ScriptStep::Down(point) => self.session.pointer_down(point),
            ScriptStep::Move(point) => self.session.pointer_move(point),
            ScriptStep::Up(point) => self.session.pointer_up(point),
            ScriptStep::Key(event) => self.session.handle_key(event),
            ScriptStep::Text(content) => self.session.edit_text(content).map(|_| ()),
            ScriptStep::FinishText => {
                self.session.finish_text_editing();
                Ok(())
            }
            ScriptStep::Undo => self.session.undo().map(|_| ()),
            ScriptStep::Redo => self.session.redo().map(|_| ()),
            ScriptStep::Pan(delta) => {
                self.session.pan(delta);
                Ok(())
            }
            ScriptStep::Zoom { at, factor } => {
                self.session.zoom_at(at, factor);
                Ok(())
            }
            ScriptStep::WaitMs(ms) => {
                self.clock.advance(Duration::from_millis(ms));
                if self.session.tick().await? {
                    self.saves += 1;
                }
                Ok(())
            }
            ScriptStep::Flush => {
                if self.session.flush().await? {
                    self.saves += 1;
                }
                Ok(())
            }
        };
        if let Err(e) = scene_result {
            log::warn!("Step {} rejected: {}", index, e);
        }
        Ok(())
    }

    /// Replay every step, then close the session.
    pub async fn run(&mut self, steps: Vec<ScriptStep>) -> Result<ReplaySummary, ReplayError> {
        for (index, step) in steps.into_iter().enumerate() {
            self.step(index, step).await?;
        }
        if self.session.close().await? {
            self.saves += 1;
        }
        Ok(ReplaySummary {
            frame_id: self.session.frame_id().to_string(),
            objects: self.session.document().len(),
            undo_depth: self.session.history().undo_len(),
            redo_depth: self.session.history().redo_len(),
            saves: self.saves,
        })
    }
}
