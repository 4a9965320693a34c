use egui::{Painter, Pos2, Rect, pos2, vec2};

use super::*;
use crate::geometry::lerp;

/// The bottom toolbar. It slides up when wanted and tucks away (leaving a
/// strip visible) while the user draws.
#[derive(Debug, Clone)]
pub struct Toolbar {
    pub rect: Rect,
    viewport: Rect,
}

impl Toolbar {
    pub fn new(viewport: Rect) -> Self {
        let mut toolbar = Self {
            rect: Rect::NOTHING,
            viewport,
        };
        toolbar.rect = Rect::from_min_size(
            pos2(viewport.min.x, toolbar.visible_y()),
            vec2(viewport.width(), TOOLBAR_HEIGHT),
        );
        toolbar
    }

    /// Keep the current slide position relative to the bottom edge.
    pub fn set_viewport(&mut self, viewport: Rect) {
        let from_bottom = self.viewport.max.y - self.rect.min.y;
        self.viewport = viewport;
        self.rect = Rect::from_min_size(
            pos2(viewport.min.x, viewport.max.y - from_bottom),
            vec2(viewport.width(), TOOLBAR_HEIGHT),
        );
    }

    pub fn visible_y(&self) -> f32 {
        self.viewport.max.y - TOOLBAR_HEIGHT
    }

    pub fn hidden_y(&self) -> f32 {
        self.viewport.max.y - TOOLBAR_SLIDE_DISTANCE
    }

    pub fn y(&self) -> f32 {
        self.rect.min.y
    }

    /// Where the toolbar wants to be this frame.
    pub fn target_y(&self, overlay_open: bool, is_drawing: bool, mouse_pos: Pos2) -> f32 {
        if overlay_open {
            self.visible_y()
        } else if is_drawing {
            self.hidden_y()
        } else if mouse_pos.y > self.viewport.max.y - 20.0 || self.rect.contains(mouse_pos) {
            self.visible_y()
        } else {
            self.hidden_y()
        }
    }

    /// Move one animation step towards `target_y`.
    pub fn animate(&mut self, target_y: f32) {
        let current = self.rect.min.y;
        let mut y = lerp(current, target_y, TOOLBAR_SLIDE_FACTOR).round();
        // Rounding stalls the last couple of pixels.
        if y == current || (target_y - y).abs() < 1.0 {
            y = target_y;
        }
        self.rect = Rect::from_min_size(pos2(self.rect.min.x, y), self.rect.size());
    }

    /// Top-left corner of the `index`th tool button.
    pub fn button_pos(&self, index: usize) -> Pos2 {
        pos2(
            self.viewport.min.x + TOOLBAR_PADDING + index as f32 * (TOOL_BUTTON_SIZE + TOOL_BUTTON_GAP),
            self.rect.min.y + 10.0,
        )
    }

    /// Anchor of the utility controls, placed after `button_count` buttons.
    pub fn utility_pos(&self, button_count: usize) -> Pos2 {
        pos2(
            self.viewport.min.x
                + TOOLBAR_PADDING
                + button_count as f32 * (TOOL_BUTTON_SIZE + TOOL_BUTTON_GAP)
                + 10.0,
            self.rect.min.y + 25.0,
        )
    }

    pub fn paint(&self, painter: &Painter) {
        painter.rect_filled(self.rect, 0.0, CANVAS_BACKDROP);
    }
}
