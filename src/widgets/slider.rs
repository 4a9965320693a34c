use egui::{Color32, Painter, PointerButton, Pos2, Rect, Stroke, Vec2};

use crate::input::InputEvent;

/// Horizontal value slider driven by the canvas input pipeline rather than by
/// egui's own widget interaction, so it obeys the same consumption rules as
/// every other stage.
#[derive(Debug, Clone)]
pub struct Slider {
    rect: Rect,
    min: f32,
    max: f32,
    value: f32,
    dragging: bool,
}

impl Slider {
    pub fn new(size: Vec2, min: f32, max: f32, value: f32) -> Self {
        Self {
            rect: Rect::from_min_size(Pos2::ZERO, size),
            min,
            max,
            value: value.clamp(min, max),
            dragging: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_position(&mut self, top_left: Pos2) {
        self.rect = Rect::from_min_size(top_left, self.rect.size());
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value.clamp(self.min, self.max);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn value_at(&self, x: f32) -> f32 {
        let t = ((x - self.rect.min.x) / self.rect.width().max(1.0)).clamp(0.0, 1.0);
        self.min + t * (self.max - self.min)
    }

    fn knob_x(&self) -> f32 {
        let t = (self.value - self.min) / (self.max - self.min).max(f32::EPSILON);
        self.rect.min.x + t * self.rect.width()
    }

    /// Returns true when the slider took the event (press on the track, drag,
    /// or the release ending a drag).
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
            } if self.rect.contains(*pos) => {
                self.dragging = true;
                self.value = self.value_at(pos.x);
                true
            }
            InputEvent::PointerMove { pos } if self.dragging => {
                self.value = self.value_at(pos.x);
                true
            }
            InputEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } if self.dragging => {
                self.dragging = false;
                true
            }
            _ => false,
        }
    }

    pub fn paint(&self, painter: &Painter) {
        let track = Rect::from_center_size(self.rect.center(), egui::vec2(self.rect.width(), 6.0));
        painter.rect_filled(track, 3.0, Color32::from_gray(160));
        let knob = egui::pos2(self.knob_x(), self.rect.center().y);
        painter.circle(knob, self.rect.height() / 3.0, Color32::WHITE, Stroke::new(1.5, Color32::BLACK));
    }
}
