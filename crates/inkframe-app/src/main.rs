//! Main application entry point (headless replay).

use inkframe_app::{ReplayError, ScriptRunner, ShortcutRegistry, load_script};
use inkframe_core::{EditorConfig, EditorSession, FileStore, ManualClock};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str = "usage: inkframe [<store-dir>] <frame-id> <script.json> [--config <config.json>]\n       inkframe --shortcuts";

#[derive(Debug, PartialEq)]
struct Args {
    /// `None` selects the platform data directory.
    store_dir: Option<PathBuf>,
    frame_id: String,
    script: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    while let Some(arg) = args.next() {
        if arg == "--config" {
            config = Some(args.next()?.into());
        } else {
            positional.push(arg);
        }
    }
    let mut positional = positional.into_iter();
    let (store_dir, frame_id, script) = match positional.len() {
        2 => (None, positional.next()?, positional.next()?),
        3 => (
            Some(positional.next()?.into()),
            positional.next()?,
            positional.next()?,
        ),
        _ => return None,
    };
    Some(Args {
        store_dir,
        frame_id,
        script: script.into(),
        config,
    })
}

async fn replay(args: Args) -> Result<(), ReplayError> {
    let settings = match &args.config {
        Some(path) => EditorConfig::from_json_file(path)?,
        None => EditorConfig::default(),
    };
    let steps = load_script(&args.script)?;
    let store = match &args.store_dir {
        Some(dir) => FileStore::new(dir)?,
        None => FileStore::default_location()?,
    };
    log::info!("Using scene store at {}", store.base_path().display());
    let store = Arc::new(store);
    let clock = Arc::new(ManualClock::new());
    let session =
        EditorSession::open_with_clock(store, args.frame_id, settings, clock.clone()).await?;

    let mut runner = ScriptRunner::new(session, clock);
    let summary = runner.run(steps).await?;
    log::info!(
        "Replayed frame {}: {} objects, {} saves, undo depth {}",
        summary.frame_id,
        summary.objects,
        summary.saves,
        summary.undo_depth
    );
    println!("{}", runner.session().document().serialize()?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1).peekable();
    if args.peek().map(String::as_str) == Some("--shortcuts") {
        ShortcutRegistry::print_all();
        return ExitCode::SUCCESS;
    }
    let Some(args) = parse_args(args) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    log::info!("Starting InkFrame replay of {}", args.script.display());
    match pollster::block_on(replay(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Replay failed: {}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
