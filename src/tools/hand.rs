use egui::{CursorIcon, Painter, PointerButton, Rect};

use crate::camera::PanAnchor;
use crate::input::InputEvent;
use crate::state::SharedContext;
use crate::tools::{CursorInfo, Injection, Tool, ToolDescriptor};
use crate::widgets::ToolButton;

/// Drag-to-pan tool; also the target of spacebar-hold panning.
#[derive(Debug, Clone)]
pub struct HandTool {
    descriptor: ToolDescriptor,
    button: ToolButton,
}

pub fn new_hand_tool(descriptor: ToolDescriptor) -> super::ToolType {
    super::ToolType::Hand(HandTool {
        button: ToolButton::new(descriptor.name.clone(), descriptor.icon.clone()),
        descriptor,
    })
}

fn is_pan_button(button: PointerButton) -> bool {
    matches!(button, PointerButton::Primary | PointerButton::Middle)
}

impl Tool for HandTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool {
        if let Some(pos) = event.primary_down() {
            if self.button.contains(pos) {
                ctx.active_tool = Some(self.descriptor.id.clone());
                ctx.menu_open = None;
                return true;
            }
        }

        if !ctx.is_active(self.id()) {
            return false;
        }

        match event {
            InputEvent::PointerDown { pos, button } if is_pan_button(*button) => {
                if ctx.click_on_ui {
                    return false;
                }
                ctx.is_panning = true;
                ctx.pan_anchor = PanAnchor::new(*pos, ctx.camera.pan);
                // Hides the toolbar like any other canvas interaction.
                ctx.is_drawing = true;
                true
            }
            InputEvent::PointerUp { button, .. } if is_pan_button(*button) => {
                if !ctx.is_panning {
                    return false;
                }
                ctx.is_panning = false;
                ctx.is_drawing = false;
                true
            }
            InputEvent::PointerMove { pos } if ctx.is_panning => {
                ctx.camera.pan = ctx.pan_anchor.drag_to(*pos);
                true
            }
            _ => false,
        }
    }

    fn draw(&mut self, painter: &Painter, _ctx: &SharedContext) {
        self.button.paint(painter);
    }

    fn update_button_position(&mut self, x: f32, y: f32) {
        self.button.set_position(x, y);
    }

    fn button_rect(&self) -> Option<Rect> {
        Some(self.button.rect())
    }

    fn cursor_info(&self, ctx: &SharedContext) -> CursorInfo {
        let fallback = if ctx.is_panning {
            CursorIcon::Grabbing
        } else {
            CursorIcon::Grab
        };
        CursorInfo::Custom { fallback }
    }

    fn injections(&self) -> &'static [Injection] {
        &[Injection::HandToolId]
    }
}
