use eframe_whiteboard::config::CanvasConfig;
use eframe_whiteboard::file_handler::ScriptedDialogs;
use eframe_whiteboard::panels::PendingAction;
use eframe_whiteboard::state::{CanvasSession, MenuId};
use eframe_whiteboard::tools::registry::{builtin_manifest, load_plugins};
use eframe_whiteboard::{Consumer, InputEvent, Tool, ToolId};
use egui::{Color32, Key, Modifiers, PointerButton, Pos2, Rect, pos2, vec2};

// Helper to build a session over the built-in kit with a 1000x700 window
fn create_test_session() -> CanvasSession {
    let viewport = Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 700.0));
    let tools = load_plugins(&builtin_manifest()).tools;
    CanvasSession::new(&CanvasConfig::default(), viewport, tools, Box::new(ScriptedDialogs::default()))
        .expect("built-in kit provides a camera")
}

fn press(pos: Pos2, button: PointerButton) -> InputEvent {
    InputEvent::PointerDown { pos, button }
}

fn release(pos: Pos2, button: PointerButton) -> InputEvent {
    InputEvent::PointerUp { pos, button }
}

fn drag_stroke(session: &mut CanvasSession, from: Pos2, to: Pos2) -> Vec<Consumer> {
    vec![
        session.handle_event(&press(from, PointerButton::Primary)),
        session.handle_event(&InputEvent::PointerMove { pos: to }),
        session.handle_event(&release(to, PointerButton::Primary)),
    ]
}

fn pen_id() -> ToolId {
    ToolId::new("@builtins.tools.Pen")
}

#[test]
fn test_stroke_while_dialog_open_leaves_surface_untouched() {
    let mut session = create_test_session();
    drag_stroke(&mut session, pos2(400.0, 300.0), pos2(450.0, 320.0));
    assert!(session.is_dirty());

    session.request(PendingAction::NewCanvas);
    assert!(session.dialog().is_open());

    let revision = session.context().surface().revision();
    let history = session.context().history().len();
    let consumers = drag_stroke(&mut session, pos2(200.0, 200.0), pos2(600.0, 400.0));

    assert!(consumers.iter().all(|c| *c == Consumer::Dialog));
    assert_eq!(session.context().surface().revision(), revision);
    assert_eq!(session.context().history().len(), history);
}

#[test]
fn test_cancel_keeps_the_board() {
    let mut session = create_test_session();
    drag_stroke(&mut session, pos2(400.0, 300.0), pos2(450.0, 320.0));
    session.request(PendingAction::NewCanvas);

    let (_, cancel) = session.dialog().buttons()[2];
    session.handle_event(&press(cancel.center(), PointerButton::Primary));

    assert!(!session.dialog().is_open());
    assert!(session.is_dirty());
    assert_eq!(session.context().history().len(), 2);
}

#[test]
fn test_dont_save_clears_the_board() {
    let mut session = create_test_session();
    drag_stroke(&mut session, pos2(400.0, 300.0), pos2(450.0, 320.0));
    session.request(PendingAction::NewCanvas);

    let (_, dont_save) = session.dialog().buttons()[1];
    session.handle_event(&press(dont_save.center(), PointerButton::Primary));

    assert!(!session.dialog().is_open());
    assert!(!session.is_dirty());
    assert_eq!(session.context().history().labels().collect::<Vec<_>>(), ["Initial"]);
}

#[test]
fn test_soft_close_click_reaches_the_pen() {
    let mut session = create_test_session();
    let history_button = session.top_bar().history_button.center();
    session.handle_event(&press(history_button, PointerButton::Primary));
    assert!(session.context().is_menu_open(&MenuId::History));

    let before = session.context().surface().revision();
    let consumer = session.handle_event(&press(pos2(800.0, 450.0), PointerButton::Primary));

    assert_eq!(consumer, Consumer::ActiveTool(pen_id()));
    assert_eq!(session.context().menu_open, None);
    assert_ne!(session.context().surface().revision(), before);
}

#[test]
fn test_click_inside_history_menu_is_swallowed() {
    let mut session = create_test_session();
    drag_stroke(&mut session, pos2(400.0, 300.0), pos2(450.0, 320.0));
    session.handle_event(&press(session.top_bar().history_button.center(), PointerButton::Primary));

    // Below the two rows but still inside the menu panel.
    let menu = session.top_bar().history_menu;
    let empty = pos2(menu.center().x, menu.max.y - 10.0);
    let revision = session.context().surface().revision();
    assert_eq!(
        session.handle_event(&press(empty, PointerButton::Primary)),
        Consumer::TopBarMenu
    );
    assert!(session.context().is_menu_open(&MenuId::History));
    assert_eq!(session.context().surface().revision(), revision);
}

#[test]
fn test_history_row_click_jumps_back() {
    let mut session = create_test_session();
    drag_stroke(&mut session, pos2(400.0, 300.0), pos2(450.0, 320.0));
    drag_stroke(&mut session, pos2(500.0, 300.0), pos2(550.0, 320.0));
    assert_eq!(session.context().history().current_index(), 2);

    session.handle_event(&press(session.top_bar().history_button.center(), PointerButton::Primary));
    let rows = session.top_bar().history_rows(0, session.context().history().len());
    let (index, first_row) = rows[0];
    assert_eq!(index, 0);

    session.handle_event(&press(first_row.center(), PointerButton::Primary));
    assert_eq!(session.context().history().current_index(), 0);
    assert_eq!(session.context().menu_open, None);
}

#[test]
fn test_open_pen_popup_blocks_drawing() {
    let mut session = create_test_session();
    let button = session.tool(&pen_id()).and_then(|t| t.button_rect()).unwrap();
    session.handle_event(&press(button.center(), PointerButton::Primary));
    assert!(session.context().is_tool_menu_open(&pen_id()));

    let revision = session.context().surface().revision();
    let consumers = drag_stroke(&mut session, pos2(300.0, 200.0), pos2(350.0, 220.0));

    assert_eq!(consumers[0], Consumer::ToolPopup(pen_id()));
    assert_eq!(session.context().surface().revision(), revision);
    assert_eq!(session.context().menu_open, None);
}

#[test]
fn test_space_hold_pans_then_restores_pen() {
    let mut session = create_test_session();
    let start_pan = session.context().camera.pan;

    session.handle_event(&InputEvent::KeyDown {
        key: Key::Space,
        modifiers: Modifiers::NONE,
    });
    let hand = session.hand_tool_id().cloned().unwrap();
    assert_eq!(session.context().active_tool.as_ref(), Some(&hand));

    drag_stroke(&mut session, pos2(500.0, 300.0), pos2(450.0, 260.0));
    assert_eq!(session.context().camera.pan, start_pan + vec2(-50.0, -40.0));

    session.handle_event(&InputEvent::KeyUp {
        key: Key::Space,
        modifiers: Modifiers::NONE,
    });
    assert_eq!(session.context().active_tool, Some(pen_id()));
    assert!(!session.context().is_panning);
}

#[test]
fn test_wheel_over_toolbar_is_swallowed() {
    let mut session = create_test_session();
    let zoom = session.context().camera.zoom;
    let toolbar = session.toolbar().rect.center();

    let consumer = session.handle_event(&InputEvent::Wheel { pos: toolbar, delta: 1.0 });

    assert_eq!(consumer, Consumer::ScrollTarget);
    assert_eq!(session.context().camera.zoom, zoom);
}

#[test]
fn test_wheel_zoom_keeps_point_under_pointer() {
    let mut session = create_test_session();
    let pointer = pos2(600.0, 350.0);
    let world_before = session.screen_to_canvas(pointer);

    let consumer = session.handle_event(&InputEvent::Wheel { pos: pointer, delta: -1.0 });

    assert!(matches!(consumer, Consumer::UtilityTool(_)));
    assert!((session.context().camera.zoom - 0.9).abs() < 1e-4);
    let world_after = session.screen_to_canvas(pointer);
    assert!((world_after - world_before).length() < 1e-2);
}

fn space(down: bool) -> InputEvent {
    if down {
        InputEvent::KeyDown { key: Key::Space, modifiers: Modifiers::NONE }
    } else {
        InputEvent::KeyUp { key: Key::Space, modifiers: Modifiers::NONE }
    }
}

fn pixel_under(session: &CanvasSession, pos: Pos2) -> Option<Color32> {
    let world = session.screen_to_canvas(pos);
    session.context().surface().pixel(world.x as u32, world.y as u32)
}

fn assert_idle(session: &CanvasSession) {
    assert!(!session.context().is_drawing, "still drawing");
    assert!(!session.context().is_panning, "still panning");
}

#[test]
fn test_space_mid_stroke_ends_the_stroke() {
    let mut session = create_test_session();
    session.handle_event(&press(pos2(300.0, 300.0), PointerButton::Primary));
    session.handle_event(&InputEvent::PointerMove { pos: pos2(320.0, 300.0) });

    session.handle_event(&space(true));
    assert_idle(&session);
    assert_eq!(session.context().history().len(), 2);
    assert_eq!(session.context().history().labels().last(), Some("Pen Stroke"));

    session.handle_event(&release(pos2(320.0, 300.0), PointerButton::Primary));
    session.handle_event(&space(false));
    assert_eq!(session.context().active_tool, Some(pen_id()));
    assert_idle(&session);

    // Hovering after the pan must not leave ink behind.
    let hover = pos2(700.0, 500.0);
    session.handle_event(&InputEvent::PointerMove { pos: hover });
    assert_eq!(pixel_under(&session, hover), Some(Color32::WHITE));
    assert_eq!(pixel_under(&session, pos2(310.0, 300.0)), Some(Color32::BLACK));
    assert_eq!(session.context().history().len(), 2);
}

#[test]
fn test_space_release_mid_pan_leaves_idle_flags() {
    let mut session = create_test_session();
    session.handle_event(&space(true));
    session.handle_event(&press(pos2(500.0, 300.0), PointerButton::Primary));
    session.handle_event(&InputEvent::PointerMove { pos: pos2(480.0, 300.0) });
    assert!(session.context().is_panning);

    session.handle_event(&space(false));
    assert_idle(&session);
    assert_eq!(session.context().active_tool, Some(pen_id()));

    // The late button release is an ordinary pen event with no stroke behind it.
    session.handle_event(&release(pos2(480.0, 300.0), PointerButton::Primary));
    assert_idle(&session);
    assert_eq!(session.context().history().len(), 1);
}

#[test]
fn test_space_tap_keeps_hand_picked_from_toolbar() {
    let mut session = create_test_session();
    let hand = session.hand_tool_id().cloned().unwrap();
    let button = session.tool(&hand).and_then(|tool| tool.button_rect()).unwrap();

    let consumer = session.handle_event(&press(button.center(), PointerButton::Primary));
    assert_eq!(consumer, Consumer::ToolbarButton(hand.clone()));
    session.handle_event(&release(button.center(), PointerButton::Primary));

    session.handle_event(&space(true));
    session.handle_event(&space(false));
    assert_eq!(session.context().active_tool.as_ref(), Some(&hand));
}

#[test]
fn test_toolbar_pick_during_space_pan_survives_release() {
    let mut session = create_test_session();
    session.handle_event(&space(true));

    let eraser = ToolId::new("@builtins.tools.Eraser");
    let button = session.tool(&eraser).and_then(|tool| tool.button_rect()).unwrap();
    session.handle_event(&press(button.center(), PointerButton::Primary));
    session.handle_event(&space(false));

    assert_eq!(session.context().active_tool, Some(eraser));
}

#[test]
fn test_close_request_mid_stroke_keeps_the_stroke() {
    let mut session = create_test_session();
    session.handle_event(&press(pos2(300.0, 300.0), PointerButton::Primary));
    session.handle_event(&InputEvent::PointerMove { pos: pos2(340.0, 310.0) });

    assert_eq!(session.handle_event(&InputEvent::CloseRequested), Consumer::System);
    assert_idle(&session);
    assert!(session.dialog().is_open());
    assert_eq!(session.context().history().labels().last(), Some("Pen Stroke"));

    let up = session.handle_event(&release(pos2(340.0, 310.0), PointerButton::Primary));
    assert_eq!(up, Consumer::Dialog);
    assert!(session.is_running());
}
