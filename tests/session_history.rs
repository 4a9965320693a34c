use eframe_whiteboard::config::CanvasConfig;
use eframe_whiteboard::file_handler::ScriptedDialogs;
use eframe_whiteboard::history::MAX_HISTORY_SIZE;
use eframe_whiteboard::state::CanvasSession;
use eframe_whiteboard::tools::registry::{builtin_manifest, load_plugins};
use eframe_whiteboard::{CanvasError, InputEvent, Tool, ToolKind};
use egui::{PointerButton, Pos2, Rect, pos2, vec2};

fn create_session(viewport: Rect) -> CanvasSession {
    let tools = load_plugins(&builtin_manifest()).tools;
    CanvasSession::new(&CanvasConfig::default(), viewport, tools, Box::new(ScriptedDialogs::default()))
        .expect("built-in kit provides a camera")
}

fn stroke(session: &mut CanvasSession, from: Pos2, to: Pos2) {
    let button = PointerButton::Primary;
    session.handle_event(&InputEvent::PointerDown { pos: from, button });
    session.handle_event(&InputEvent::PointerMove { pos: to });
    session.handle_event(&InputEvent::PointerUp { pos: to, button });
}

#[test]
fn test_kit_without_camera_fails_to_start() {
    let tools = load_plugins(&builtin_manifest())
        .tools
        .into_iter()
        .filter(|tool| tool.kind() != ToolKind::UtilityTool)
        .collect();
    let viewport = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
    let result = CanvasSession::new(&CanvasConfig::default(), viewport, tools, Box::new(ScriptedDialogs::default()));
    assert!(matches!(result, Err(CanvasError::MissingCamera)));
}

#[test]
fn test_new_session_starts_clean_on_the_pen() {
    let session = create_session(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)));
    assert!(!session.is_dirty());
    assert!(session.is_running());
    assert_eq!(session.active_tool().map(|t| t.id().as_str()), Some("@builtins.tools.Pen"));
    assert_eq!(session.context().history().labels().collect::<Vec<_>>(), ["Initial"]);
}

#[test]
fn test_undo_then_new_stroke_discards_redo() {
    let mut session = create_session(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)));
    stroke(&mut session, pos2(300.0, 300.0), pos2(320.0, 300.0));
    assert!(session.undo());
    assert!(!session.undo());

    stroke(&mut session, pos2(400.0, 300.0), pos2(420.0, 300.0));
    let history = session.context().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.current_index(), 1);
    assert!(!session.redo());
}

#[test]
fn test_history_is_bounded() {
    let mut session = create_session(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)));
    for i in 0..(MAX_HISTORY_SIZE + 5) {
        let x = 100.0 + i as f32 * 10.0;
        stroke(&mut session, pos2(x, 300.0), pos2(x, 310.0));
    }
    let history = session.context().history();
    assert_eq!(history.len(), MAX_HISTORY_SIZE);
    assert_eq!(history.current_index(), MAX_HISTORY_SIZE - 1);
    assert!(history.labels().all(|label| label == "Pen Stroke"));
}

#[test]
fn test_eraser_paints_background() {
    let mut session = create_session(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)));
    let at = pos2(400.0, 300.0);
    stroke(&mut session, at, at);
    let world = session.screen_to_canvas(at);
    let (x, y) = (world.x as u32, world.y as u32);
    assert_ne!(session.context().surface().pixel(x, y), Some(egui::Color32::WHITE));

    let eraser = session
        .tools()
        .iter()
        .find(|t| t.id().as_str() == "@builtins.tools.Eraser")
        .and_then(|t| t.button_rect())
        .unwrap();
    // Select, then close the popup the same click opened.
    session.handle_event(&InputEvent::PointerDown {
        pos: eraser.center(),
        button: PointerButton::Primary,
    });
    session.handle_event(&InputEvent::PointerDown {
        pos: eraser.center(),
        button: PointerButton::Primary,
    });
    assert_eq!(session.context().menu_open, None);

    stroke(&mut session, at, at);
    assert_eq!(session.context().surface().pixel(x, y), Some(egui::Color32::WHITE));
    assert_eq!(session.context().history().labels().last(), Some("Eraser Stroke"));
}

#[test]
fn test_constraints_clamp_pan_on_large_viewport() {
    let mut session = create_session(Rect::from_min_size(Pos2::ZERO, vec2(1668.0, 938.0)));
    session.set_zoom(1.0, Pos2::ZERO);
    session.context_mut().camera.pan = vec2(100.0, 100.0);
    session.apply_constraints();
    assert_eq!(session.context().camera.pan, vec2(0.0, 0.0));

    session.context_mut().camera.pan = vec2(-7000.0, -6000.0);
    session.apply_constraints();
    let once = session.context().camera.pan;
    assert_eq!(once, vec2(1668.0 - 8000.0, 938.0 - 6000.0));
    session.apply_constraints();
    assert_eq!(session.context().camera.pan, once);
}

#[test]
fn test_zoom_round_trip_about_origin() {
    let mut session = create_session(Rect::from_min_size(Pos2::ZERO, vec2(1668.0, 938.0)));
    session.context_mut().camera.pan = vec2(-1200.0, -800.0);
    let start = session.context().camera.pan;

    session.set_zoom(0.1, Pos2::ZERO);
    session.set_zoom(1.0, Pos2::ZERO);

    let pan = session.context().camera.pan;
    assert!((pan - start).length() < 1e-3);
}

#[test]
fn test_small_world_is_centered_when_zoomed_out() {
    let mut session = create_session(Rect::from_min_size(Pos2::ZERO, vec2(1668.0, 938.0)));
    session.set_zoom(0.1, pos2(834.0, 469.0));
    session.apply_constraints();
    let pan = session.context().camera.pan;
    assert!((pan.x - (1668.0 - 800.0) / 2.0).abs() < 1e-3);
    assert!((pan.y - (938.0 - 600.0) / 2.0).abs() < 1e-3);
}

#[test]
fn test_update_slides_toolbar_away_while_drawing() {
    let mut session = create_session(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)));
    let visible = session.toolbar().y();
    session.handle_event(&InputEvent::PointerDown {
        pos: pos2(400.0, 200.0),
        button: PointerButton::Primary,
    });
    for _ in 0..30 {
        session.update();
    }
    assert!(session.toolbar().y() > visible);
    assert_eq!(session.context().toolbar_y, session.toolbar().y());
}
