use egui::{Align2, Color32, FontId, Painter, PointerButton, Pos2, Rect, Stroke, vec2};

use crate::input::InputEvent;
use crate::state::{MenuId, SharedContext};
use crate::tools::{CursorInfo, Tool, ToolDescriptor, popup_rect};
use crate::widgets::{Slider, ToolButton};

const POPUP_SIZE: egui::Vec2 = vec2(280.0, 80.0);
const SLIDER_SIZE: egui::Vec2 = vec2(160.0, 30.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrushMode {
    /// Paints `draw_color` at `draw_size`.
    Pen,
    /// Paints the surface background at `eraser_size`.
    Eraser,
}

impl BrushMode {
    fn history_label(self) -> &'static str {
        match self {
            BrushMode::Pen => "Pen Stroke",
            BrushMode::Eraser => "Eraser Stroke",
        }
    }
}

/// Freehand brush used for both the pen and the eraser.
#[derive(Debug, Clone)]
pub struct BrushTool {
    descriptor: ToolDescriptor,
    mode: BrushMode,
    button: ToolButton,
    slider: Slider,
    popup: Rect,
    /// World position of the previous stamp while a stroke is in progress.
    last_pos: Option<Pos2>,
}

pub fn new_pen_tool(descriptor: ToolDescriptor) -> super::ToolType {
    super::ToolType::Brush(BrushTool::new(descriptor, BrushMode::Pen))
}

pub fn new_eraser_tool(descriptor: ToolDescriptor) -> super::ToolType {
    super::ToolType::Brush(BrushTool::new(descriptor, BrushMode::Eraser))
}

impl BrushTool {
    fn new(descriptor: ToolDescriptor, mode: BrushMode) -> Self {
        let (min, max, initial) = match mode {
            BrushMode::Pen => (1.0, 40.0, 5.0),
            BrushMode::Eraser => (5.0, 200.0, 50.0),
        };
        Self {
            button: ToolButton::new(descriptor.name.clone(), descriptor.icon.clone()),
            descriptor,
            mode,
            slider: Slider::new(SLIDER_SIZE, min, max, initial),
            popup: Rect::from_min_size(Pos2::ZERO, POPUP_SIZE),
            last_pos: None,
        }
    }

    fn size(&self, ctx: &SharedContext) -> f32 {
        match self.mode {
            BrushMode::Pen => ctx.draw_size,
            BrushMode::Eraser => ctx.eraser_size,
        }
    }

    fn set_size(&self, ctx: &mut SharedContext, size: f32) {
        match self.mode {
            BrushMode::Pen => ctx.draw_size = size,
            BrushMode::Eraser => ctx.eraser_size = size,
        }
    }

    fn color(&self, ctx: &SharedContext) -> Color32 {
        match self.mode {
            BrushMode::Pen => ctx.draw_color,
            BrushMode::Eraser => ctx.surface().background(),
        }
    }

    fn layout_popup(&mut self, ctx: &SharedContext) {
        self.popup = popup_rect(POPUP_SIZE, self.button.rect(), ctx.toolbar_y, ctx.viewport);
        self.slider.set_position(self.popup.min + vec2(20.0, 25.0));
    }

    fn handle_popup(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool {
        self.layout_popup(ctx);

        if self.slider.handle_event(event) {
            let size = self.slider.value().round();
            self.set_size(ctx, size);
            return true;
        }

        if let Some(pos) = event.primary_down() {
            if !self.popup.contains(pos) {
                ctx.menu_open = None;
            }
            return true;
        }

        if event.pos().is_some_and(|pos| self.popup.contains(pos)) {
            return true;
        }

        self.handle_drawing(event, ctx)
    }

    fn handle_drawing(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool {
        if !ctx.is_active(self.id()) {
            return false;
        }

        let canvas_pos = ctx.canvas_mouse_pos();
        let size = self.size(ctx);
        let color = self.color(ctx);
        let radius = (size / 2.0).floor().max(1.0);

        match event {
            InputEvent::PointerDown {
                button: PointerButton::Primary,
                ..
            } => {
                if ctx.click_on_ui {
                    return false;
                }
                self.last_pos = Some(canvas_pos);
                ctx.is_drawing = true;
                ctx.surface_mut().fill_circle(canvas_pos, radius, color);
                true
            }
            InputEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } => {
                if !ctx.is_drawing {
                    return false;
                }
                ctx.is_drawing = false;
                if self.last_pos.take().is_some() {
                    ctx.add_history(self.mode.history_label());
                }
                true
            }
            InputEvent::PointerMove { .. } => {
                let Some(last) = self.last_pos else {
                    return false;
                };
                if !ctx.is_drawing {
                    return false;
                }
                let surface = ctx.surface_mut();
                surface.fill_circle(last, radius, color);
                surface.fill_circle(canvas_pos, radius, color);
                surface.stroke_segment(last, canvas_pos, size.max(1.0), color);
                self.last_pos = Some(canvas_pos);
                true
            }
            _ => false,
        }
    }
}

impl Tool for BrushTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool {
        if let Some(pos) = event.primary_down() {
            if self.button.contains(pos) {
                ctx.active_tool = Some(self.descriptor.id.clone());
                if ctx.toggle_menu(MenuId::Tool(self.descriptor.id.clone())) {
                    // Popup opens showing the live size.
                    self.slider.set_value(self.size(ctx));
                }
                return true;
            }
        }

        if ctx.is_tool_menu_open(self.id()) {
            self.handle_popup(event, ctx)
        } else {
            self.handle_drawing(event, ctx)
        }
    }

    fn draw(&mut self, painter: &Painter, ctx: &SharedContext) {
        self.button.paint(painter);

        if !ctx.is_tool_menu_open(self.id()) {
            return;
        }
        self.layout_popup(ctx);
        painter.rect_filled(self.popup, 0.0, Color32::from_gray(220));
        painter.rect_stroke(self.popup, 0.0, Stroke::new(2.0, Color32::BLACK));
        self.slider.paint(painter);
        painter.text(
            egui::pos2(self.slider.rect().max.x + 15.0, self.slider.rect().center().y),
            Align2::LEFT_CENTER,
            format!("{} px", self.size(ctx).round() as i32),
            FontId::proportional(20.0),
            Color32::BLACK,
        );
    }

    fn update_button_position(&mut self, x: f32, y: f32) {
        self.button.set_position(x, y);
    }

    fn button_rect(&self) -> Option<Rect> {
        Some(self.button.rect())
    }

    fn cursor_info(&self, ctx: &SharedContext) -> CursorInfo {
        let radius = (self.size(ctx) / 2.0).floor();
        let color = match self.mode {
            BrushMode::Pen => ctx.draw_color,
            BrushMode::Eraser => Color32::WHITE,
        };
        CursorInfo::Circle { radius, color }
    }
}
