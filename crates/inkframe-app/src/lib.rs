//! InkFrame Application
//!
//! Headless host for the scene engine: opens a frame from a directory store,
//! replays a scripted editing session against it and flushes on exit.

mod replay;
mod shortcuts;

pub use replay::{ReplayError, ReplaySummary, ScriptRunner, ScriptStep, load_script};
pub use shortcuts::{Shortcut, ShortcutRegistry};
