use std::path::PathBuf;

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, TextureHandle, pos2, vec2};

use crate::panels::TOOL_BUTTON_SIZE;
use crate::texture_manager;

#[derive(Clone)]
enum Icon {
    Unloaded,
    Loaded(TextureHandle),
    /// No icon declared, or it failed to load; the label is drawn instead.
    Missing,
}

// `TextureHandle` has no `Debug`; its id is what identifies it.
impl std::fmt::Debug for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Icon::Unloaded => f.write_str("Unloaded"),
            Icon::Loaded(handle) => f.debug_tuple("Loaded").field(&handle.id()).finish(),
            Icon::Missing => f.write_str("Missing"),
        }
    }
}

/// Square toolbar button owned by a tool.
#[derive(Debug, Clone)]
pub struct ToolButton {
    rect: Rect,
    label: String,
    icon_path: Option<PathBuf>,
    icon: Icon,
}

impl ToolButton {
    pub fn new(label: impl Into<String>, icon_path: Option<PathBuf>) -> Self {
        let icon = if icon_path.is_some() { Icon::Unloaded } else { Icon::Missing };
        Self {
            rect: Rect::from_min_size(Pos2::ZERO, vec2(TOOL_BUTTON_SIZE, TOOL_BUTTON_SIZE)),
            label: label.into(),
            icon_path,
            icon,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.rect = Rect::from_min_size(pos2(x, y), self.rect.size());
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.rect.contains(pos)
    }

    fn ensure_icon(&mut self, ctx: &egui::Context) {
        if !matches!(self.icon, Icon::Unloaded) {
            return;
        }
        self.icon = match &self.icon_path {
            Some(path) => match texture_manager::load_texture_from_path(ctx, path) {
                Ok(handle) => Icon::Loaded(handle),
                Err(err) => {
                    log::warn!("Icon for {}: {err}", self.label);
                    Icon::Missing
                }
            },
            None => Icon::Missing,
        };
    }

    pub fn paint(&mut self, painter: &Painter) {
        self.ensure_icon(painter.ctx());
        painter.rect_filled(self.rect, 4.0, Color32::from_gray(100));
        match &self.icon {
            Icon::Loaded(handle) => {
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                painter.image(handle.id(), self.rect.shrink(6.0), uv, Color32::WHITE);
            }
            _ => {
                // First letter stands in for a missing icon.
                let glyph: String = self.label.chars().take(1).collect();
                painter.text(
                    self.rect.center(),
                    Align2::CENTER_CENTER,
                    glyph,
                    FontId::proportional(26.0),
                    Color32::WHITE,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_shows_icon_state() {
        let button = ToolButton::new("Pen", None);
        let text = format!("{button:?}");
        assert!(text.contains("Missing"), "{text}");

        let ctx = egui::Context::default();
        let handle = ctx.load_texture("icon", egui::ColorImage::new([2, 2], Color32::RED), Default::default());
        let text = format!("{:?}", Icon::Loaded(handle.clone()));
        assert_eq!(text, format!("Loaded({:?})", handle.id()));
    }
}
