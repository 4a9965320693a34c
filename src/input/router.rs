//! The ordered input dispatch pipeline.
//!
//! Every event walks the stages below in order until one consumes it:
//! dialog, system events, scroll targets, utility tools, menu hover,
//! shortcuts, top-bar menus, an open tool popup, toolbar buttons and finally
//! the active tool. Changing the order changes behaviour: a toolbar click
//! must never reach the canvas underneath an open menu.

use egui::Key;

use super::InputEvent;
use crate::geometry::any_contains;
use crate::panels::{PendingAction, TopBar};
use crate::state::{CanvasSession, MenuId};
use crate::tools::{Tool, ToolId, ToolKind};

/// Which stage consumed an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consumer {
    Dialog,
    System,
    ScrollTarget,
    UtilityTool(ToolId),
    MenuHover,
    Shortcut,
    TopBarMenu,
    ToolPopup(ToolId),
    ToolbarButton(ToolId),
    ActiveTool(ToolId),
    /// Nobody took it (including a soft-closing click).
    None,
}

impl Consumer {
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Consumer::None)
    }
}

/// Routes one input event through the canvas pipeline
pub fn route_event(event: &InputEvent, session: &mut CanvasSession) -> Consumer {
    if let Some(pos) = event.pos() {
        session.ctx.mouse_pos = pos;
    }
    session.refresh_canvas_mouse_pos();
    session.ctx.click_on_ui = match event {
        InputEvent::PointerDown { pos, .. } => any_contains(&session.ctx.ui_hotspots, *pos),
        _ => false,
    };

    let stages: [fn(&InputEvent, &mut CanvasSession) -> Option<Consumer>; 11] = [
        dialog_stage,
        system_stage,
        scroll_stage,
        utility_stage,
        menu_hover_stage,
        shortcut_stage,
        top_bar_stage,
        tool_popup_stage,
        toolbar_button_stage,
        soft_close_stage,
        active_tool_stage,
    ];
    for stage in stages {
        if let Some(consumer) = stage(event, session) {
            session.ctx.click_on_ui = true;
            return consumer;
        }
    }
    Consumer::None
}

/// An open dialog owns every event.
fn dialog_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    if !session.dialog.is_open() {
        return None;
    }
    if let Some(pos) = event.primary_down() {
        if let Some(choice) = session.dialog.button_at(pos) {
            session.resolve_dialog(choice);
        }
    }
    Some(Consumer::Dialog)
}

fn system_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    match event {
        InputEvent::OpenFileRequested => {
            session.open_file();
            Some(Consumer::System)
        }
        InputEvent::CloseRequested => {
            session.request(PendingAction::Exit);
            Some(Consumer::System)
        }
        _ => None,
    }
}

/// History scrolling, or swallowing the wheel over chrome.
fn scroll_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    let InputEvent::Wheel { pos, delta } = event else {
        return None;
    };
    let ctx = &mut session.ctx;
    if ctx.is_menu_open(&MenuId::History) && session.top_bar.history_menu.contains(*pos) {
        ctx.history_scroll = TopBar::scroll_history(ctx.history_scroll, *delta, ctx.history().len());
        return Some(Consumer::ScrollTarget);
    }
    if session.top_bar.rect.contains(*pos) || session.toolbar.rect.contains(*pos) {
        return Some(Consumer::ScrollTarget);
    }
    None
}

/// Utility tools get first refusal on everything else.
fn utility_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    let CanvasSession { tools, ctx, .. } = session;
    tools
        .iter_mut()
        .filter(|tool| tool.kind() == ToolKind::UtilityTool)
        .find_map(|tool| {
            tool.handle_event(event, ctx)
                .then(|| Consumer::UtilityTool(tool.id().clone()))
        })
}

/// Hovering the other top-bar button while a menu is open switches to it.
fn menu_hover_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    let InputEvent::PointerMove { pos } = event else {
        return None;
    };
    let ctx = &mut session.ctx;
    if ctx.menu_open.is_none() {
        return None;
    }
    let target = if session.top_bar.file_button.contains(*pos) {
        MenuId::File
    } else if session.top_bar.history_button.contains(*pos) {
        MenuId::History
    } else {
        return None;
    };
    if ctx.is_menu_open(&target) {
        return None;
    }
    ctx.menu_open = Some(target);
    Some(Consumer::MenuHover)
}

fn shortcut_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    match event {
        InputEvent::KeyDown { key, modifiers } => {
            let command = modifiers.command || modifiers.ctrl;
            match key {
                Key::Space => {
                    let hand = session.hand_tool_id()?.clone();
                    if session.ctx.is_active(&hand) {
                        return None;
                    }
                    log::debug!("Space held: panning with {hand}");
                    session.finish_interaction();
                    let ctx = &mut session.ctx;
                    ctx.previous_tool = ctx.active_tool.take();
                    ctx.active_tool = Some(hand);
                    ctx.space_pan = true;
                }
                Key::Z if command && modifiers.shift => {
                    session.finish_interaction();
                    session.redo();
                }
                Key::Z if command => {
                    session.finish_interaction();
                    session.undo();
                }
                Key::Y if command && !modifiers.shift => {
                    session.finish_interaction();
                    session.redo();
                }
                Key::E if modifiers.shift && !command => {
                    session.export();
                }
                _ => return None,
            }
            Some(Consumer::Shortcut)
        }
        InputEvent::KeyUp { key: Key::Space, .. } => {
            let hand = session.hand_tool_id()?.clone();
            if !std::mem::take(&mut session.ctx.space_pan) {
                return Some(Consumer::Shortcut);
            }
            // A toolbar pick made while space was held wins.
            if session.ctx.is_active(&hand) {
                session.finish_interaction();
                session.ctx.active_tool = session.ctx.previous_tool.clone();
            }
            Some(Consumer::Shortcut)
        }
        _ => None,
    }
}

/// File / History toggles, dropdown items and clicks inside a menu's hot zone.
fn top_bar_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    let pos = event.primary_down()?;
    let top_bar = &session.top_bar;

    if top_bar.file_button.contains(pos) {
        session.ctx.toggle_menu(MenuId::File);
        return Some(Consumer::TopBarMenu);
    }
    if top_bar.history_button.contains(pos) {
        session.ctx.toggle_menu(MenuId::History);
        return Some(Consumer::TopBarMenu);
    }

    let has_project = session.project_path().is_some();
    match session.ctx.menu_open {
        Some(MenuId::File) => {
            if let Some(item) = top_bar.file_item_at(pos, has_project) {
                session.ctx.menu_open = None;
                session.perform_file_item(item);
                return Some(Consumer::TopBarMenu);
            }
            any_contains(&top_bar.hot_zone(&MenuId::File, has_project), pos).then_some(Consumer::TopBarMenu)
        }
        Some(MenuId::History) => {
            if !top_bar.history_menu.contains(pos) {
                return None;
            }
            let len = session.ctx.history().len();
            if let Some(index) = top_bar.history_row_at(pos, session.ctx.history_scroll, len) {
                session.jump_to_history(index);
                session.ctx.menu_open = None;
            }
            Some(Consumer::TopBarMenu)
        }
        _ => None,
    }
}

/// An open tool popup handles the event exclusively, consumed or not.
fn tool_popup_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    let Some(MenuId::Tool(id)) = session.ctx.menu_open.clone() else {
        return None;
    };
    let CanvasSession { tools, ctx, .. } = session;
    let tool = tools.iter_mut().find(|tool| *tool.id() == id)?;
    tool.handle_event(event, ctx);
    Some(Consumer::ToolPopup(id))
}

/// A click on a toolbar button goes to the first tool whose button contains it.
fn toolbar_button_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    let pos = event.primary_down()?;
    let CanvasSession { tools, ctx, .. } = session;
    let tool = tools
        .iter_mut()
        .find(|tool| tool.button_rect().is_some_and(|rect| rect.contains(pos)))?;
    tool.handle_event(event, ctx)
        .then(|| Consumer::ToolbarButton(tool.id().clone()))
}

/// A click outside an open top-bar menu closes it and still falls through.
fn soft_close_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    let pos = event.primary_down()?;
    let menu = session.ctx.menu_open.clone()?;
    if matches!(menu, MenuId::File | MenuId::History)
        && !any_contains(&session.top_bar.hot_zone(&menu, session.project_path().is_some()), pos)
    {
        log::debug!("Closing {menu:?} menu on outside click");
        session.ctx.menu_open = None;
    }
    None
}

/// Everything left goes to the active tool, except the space release that
/// ends a temporary pan.
fn active_tool_stage(event: &InputEvent, session: &mut CanvasSession) -> Option<Consumer> {
    if event.is_key_up(Key::Space) {
        return None;
    }
    let id = session.ctx.active_tool.clone()?;
    let CanvasSession { tools, ctx, .. } = session;
    let tool = tools.iter_mut().find(|tool| *tool.id() == id)?;
    tool.handle_event(event, ctx).then_some(Consumer::ActiveTool(id))
}
