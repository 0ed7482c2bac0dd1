//! End-to-end editing sessions against in-memory and on-disk stores.

use inkframe_core::objects::{Rectangle, SceneObject};
use inkframe_core::storage::ManualClock;
use inkframe_core::{
    EditorConfig, EditorSession, FileStore, Key, KeyEvent, MemoryStore, Modifiers,
    SceneDocument, SerializableColor, ShapeKind, ToolKind,
};
use kurbo::Point;
use pollster::block_on;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    session: EditorSession<MemoryStore>,
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
}

fn open() -> Harness {
    open_with(EditorConfig::default())
}

fn open_with(settings: EditorConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new());
    let session = block_on(EditorSession::open_with_clock(
        store.clone(),
        "board-1",
        settings,
        clock.clone(),
    ))
    .unwrap();
    Harness {
        session,
        store,
        clock,
    }
}

fn drag(session: &mut EditorSession<MemoryStore>, points: &[(f64, f64)]) {
    let (first, rest) = points.split_first().unwrap();
    session.pointer_down(Point::new(first.0, first.1)).unwrap();
    for &(x, y) in rest {
        session.pointer_move(Point::new(x, y)).unwrap();
    }
    let (x, y) = *points.last().unwrap();
    session.pointer_up(Point::new(x, y)).unwrap();
}

fn serialized(session: &EditorSession<MemoryStore>) -> String {
    session.document().serialize().unwrap()
}

#[test]
fn test_mixed_scene_survives_round_trip() {
    let Harness { mut session, .. } = open();
    drag(&mut session, &[(0.0, 0.0), (10.0, 20.0), (30.0, 25.0)]);
    session.set_tool(ToolKind::Shape);
    session.set_shape_kind(ShapeKind::Circle);
    drag(&mut session, &[(200.0, 200.0), (260.0, 240.0)]);
    session.set_tool(ToolKind::Sticky);
    drag(&mut session, &[(400.0, 400.0)]);
    session.set_tool(ToolKind::Text);
    drag(&mut session, &[(50.0, 300.0)]);
    session.edit_text("Sprint goals").unwrap();
    session.finish_text_editing();

    let json = serialized(&session);
    let reloaded = SceneDocument::load(&json).unwrap();
    assert_eq!(&reloaded, session.document());
    assert_eq!(reloaded.serialize().unwrap(), json);
}

#[test]
fn test_undo_then_redo_restores_every_state() {
    let Harness { mut session, .. } = open();
    let mut states = vec![serialized(&session)];
    for n in 0..4 {
        let x = n as f64 * 50.0;
        drag(&mut session, &[(x, 0.0), (x + 20.0, 20.0)]);
        states.push(serialized(&session));
    }

    for expected in states.iter().rev().skip(1) {
        assert!(session.undo().unwrap());
        assert_eq!(&serialized(&session), expected);
    }
    assert!(!session.undo().unwrap());

    for expected in states.iter().skip(1) {
        assert!(session.redo().unwrap());
        assert_eq!(&serialized(&session), expected);
    }
    assert!(!session.redo().unwrap());
}

#[test]
fn test_history_keeps_the_fifty_newest_states() {
    let Harness { mut session, .. } = open();
    for n in 0..60 {
        session
            .add_object(Rectangle::new(Point::new(n as f64 * 5.0, 0.0), 4.0, 4.0).into())
            .unwrap();
    }
    assert_eq!(session.history().undo_len(), 50);

    let mut undone = 0;
    while session.undo().unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    // the first ten additions fell off the bottom of the stack
    assert_eq!(session.document().len(), 10);
}

#[test]
fn test_new_change_discards_redo() {
    let Harness { mut session, .. } = open();
    drag(&mut session, &[(0.0, 0.0), (10.0, 10.0)]);
    drag(&mut session, &[(20.0, 0.0), (30.0, 10.0)]);
    session
        .handle_key(KeyEvent::new(Key::Char('z'), Modifiers::CTRL))
        .unwrap();
    assert_eq!(session.history().redo_len(), 1);

    drag(&mut session, &[(40.0, 0.0), (50.0, 10.0)]);
    assert_eq!(session.history().redo_len(), 0);
    assert!(!session.redo().unwrap());
    assert_eq!(session.document().len(), 2);
}

#[test]
fn test_shape_after_undo_discards_redo() {
    let Harness { mut session, .. } = open();
    drag(&mut session, &[(0.0, 0.0), (10.0, 10.0)]);
    session.undo().unwrap();
    assert_eq!(session.history().redo_len(), 1);

    session.set_tool(ToolKind::Shape);
    drag(&mut session, &[(100.0, 100.0), (150.0, 150.0)]);
    assert_eq!(session.history().redo_len(), 0);
    assert!(!session.redo().unwrap());
    assert!(matches!(
        session.document().objects(),
        [SceneObject::Rect(_)]
    ));
}

#[test]
fn test_erase_after_undo_discards_redo() {
    let Harness { mut session, .. } = open();
    let a = session
        .add_object(Rectangle::new(Point::new(0.0, 0.0), 40.0, 40.0).into())
        .unwrap();
    let b = session
        .add_object(Rectangle::new(Point::new(100.0, 0.0), 40.0, 40.0).into())
        .unwrap();
    session.undo().unwrap();
    assert!(!session.document().contains_id(b));

    session.set_tool(ToolKind::Eraser);
    drag(&mut session, &[(20.0, 20.0), (20.0, 20.0)]);
    assert!(!session.document().contains_id(a));
    assert!(!session.redo().unwrap());
    assert!(!session.document().contains_id(a));
    assert!(!session.document().contains_id(b));
}

#[test]
fn test_background_change_after_undo_discards_redo() {
    let Harness { mut session, .. } = open();
    drag(&mut session, &[(0.0, 0.0), (10.0, 10.0)]);
    session.undo().unwrap();
    assert_eq!(session.history().redo_len(), 1);

    session.set_background(SerializableColor::from_hex("#FFF176").unwrap());
    assert_eq!(session.history().redo_len(), 0);
    assert!(session.is_dirty());
}

#[test]
fn test_shape_creation_is_not_undoable_by_default() {
    let Harness { mut session, .. } = open();
    drag(&mut session, &[(0.0, 0.0), (10.0, 10.0)]);
    session.set_tool(ToolKind::Shape);
    drag(&mut session, &[(100.0, 100.0), (150.0, 150.0)]);
    assert_eq!(session.history().undo_len(), 1);

    // the only entry predates both the stroke and the shape
    session.undo().unwrap();
    assert!(session.document().is_empty());
}

#[test]
fn test_shape_creation_undoable_when_configured() {
    let settings = EditorConfig {
        snapshot_shape_creation: true,
        ..EditorConfig::default()
    };
    let Harness { mut session, .. } = open_with(settings);
    drag(&mut session, &[(0.0, 0.0), (10.0, 10.0)]);
    let stroke_only = serialized(&session);
    session.set_tool(ToolKind::Shape);
    drag(&mut session, &[(100.0, 100.0), (130.0, 120.0), (150.0, 150.0)]);
    assert_eq!(session.history().undo_len(), 2);

    session.undo().unwrap();
    assert_eq!(serialized(&session), stroke_only);
}

#[test]
fn test_eraser_removal_is_autosaved() {
    let Harness {
        mut session,
        store,
        ..
    } = open();
    let id = session
        .add_object(Rectangle::new(Point::new(0.0, 0.0), 40.0, 40.0).into())
        .unwrap();
    block_on(session.flush()).unwrap();
    assert!(!session.is_dirty());

    session.set_tool(ToolKind::Eraser);
    drag(&mut session, &[(20.0, 20.0), (20.0, 20.0)]);
    assert!(!session.document().contains_id(id));
    assert!(session.is_dirty());

    block_on(session.flush()).unwrap();
    let saved = SceneDocument::load(&store.scene("board-1").unwrap()).unwrap();
    assert!(saved.is_empty());
}

#[test]
fn test_eraser_takes_the_object_on_top() {
    let Harness { mut session, .. } = open();
    let low = session
        .add_object(Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0).into())
        .unwrap();
    let high = session
        .add_object(Rectangle::new(Point::new(50.0, 50.0), 100.0, 100.0).into())
        .unwrap();
    let recorded = session.history().undo_len();

    session.set_tool(ToolKind::Eraser);
    // moving without the button held erases nothing
    session.pointer_move(Point::new(75.0, 75.0)).unwrap();
    assert_eq!(session.document().len(), 2);

    drag(&mut session, &[(75.0, 75.0), (75.0, 75.0)]);
    assert!(session.document().contains_id(low));
    assert!(!session.document().contains_id(high));
    assert_eq!(session.history().undo_len(), recorded);
}

#[test]
fn test_highlighter_uses_translucent_wide_brush() {
    let Harness { mut session, .. } = open();
    session.set_tool(ToolKind::Highlighter);
    session.set_stroke_color("#112233").unwrap();
    session.set_brush_width(4).unwrap();
    drag(&mut session, &[(0.0, 0.0), (40.0, 0.0), (80.0, 10.0)]);

    let stroke = session.document().objects().last().unwrap();
    assert_eq!(stroke.style().stroke_color.to_hex(), "#11223360");
    assert_eq!(stroke.style().stroke_width, 12.0);
}

#[test]
fn test_rectangle_drag_normalizes_to_top_left() {
    let Harness { mut session, .. } = open();
    session.set_tool(ToolKind::Shape);
    drag(&mut session, &[(100.0, 100.0), (70.0, 80.0), (40.0, 60.0)]);

    match session.document().objects() {
        [SceneObject::Rect(rect)] => {
            assert_eq!(rect.position, Point::new(40.0, 60.0));
            assert_eq!(rect.width, 60.0);
            assert_eq!(rect.height, 40.0);
        }
        other => panic!("expected one rectangle, got {other:?}"),
    }
}

#[test]
fn test_rapid_changes_coalesce_into_one_save() {
    let Harness {
        mut session,
        store,
        clock,
    } = open();
    for n in 0..5 {
        let x = n as f64 * 10.0;
        drag(&mut session, &[(x, 0.0), (x + 5.0, 5.0)]);
        clock.advance(Duration::from_millis(300));
        assert!(!block_on(session.tick()).unwrap());
    }
    assert_eq!(store.save_count(), 0);

    clock.advance(Duration::from_millis(700));
    assert!(block_on(session.tick()).unwrap());
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.scene("board-1"), Some(serialized(&session)));
}

#[test]
fn test_undo_is_persisted_like_any_change() {
    let Harness {
        mut session,
        store,
        ..
    } = open();
    drag(&mut session, &[(0.0, 0.0), (10.0, 10.0)]);
    block_on(session.flush()).unwrap();
    session.undo().unwrap();
    block_on(session.flush()).unwrap();

    assert_eq!(store.save_count(), 2);
    let saved = SceneDocument::load(&store.scene("board-1").unwrap()).unwrap();
    assert!(saved.is_empty());
}

#[test]
fn test_close_flushes_to_disk_and_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()).unwrap());
    let mut session = block_on(EditorSession::open(
        store.clone(),
        "board-1",
        EditorConfig::default(),
    ))
    .unwrap();
    session.set_tool(ToolKind::Sticky);
    session.pointer_down(Point::new(200.0, 200.0)).unwrap();
    session.pointer_up(Point::new(200.0, 200.0)).unwrap();
    assert!(session.is_dirty());

    assert!(block_on(session.close()).unwrap());
    assert!(!session.is_dirty());

    let reopened =
        block_on(EditorSession::open(store, "board-1", EditorConfig::default())).unwrap();
    assert_eq!(reopened.document(), session.document());
    assert!(!reopened.is_dirty());
}
