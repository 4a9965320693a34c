use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};

use egui::{Color32, Context, CursorIcon, Painter, Pos2, Rect, Stroke, pos2, vec2};

use crate::geometry::any_contains;
use crate::panels::CANVAS_BACKDROP;
use crate::state::{CanvasSession, MenuId};
use crate::texture_manager::{TextureKey, TextureManager, decode_image};
use crate::tools::{CursorInfo, Tool, ToolId, ToolKind, ToolType};

/// Canvas plus one cursor per tool is plenty.
const TEXTURE_CACHE_SIZE: usize = 16;

/// Paints a whole frame of the board: canvas, cursor, chrome, tools, dialog.
pub struct Renderer {
    textures: TextureManager,
    /// Tools whose cursor bitmap failed to load; they use their fallback.
    broken_cursors: HashSet<ToolId>,
    /// How many times the visible canvas has been resampled.
    canvas_uploads: u64,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            textures: TextureManager::new(TEXTURE_CACHE_SIZE),
            broken_cursors: HashSet::new(),
            canvas_uploads: 0,
        }
    }

    pub fn canvas_uploads(&self) -> u64 {
        self.canvas_uploads
    }

    pub fn render(&mut self, egui_ctx: &Context, painter: &Painter, session: &mut CanvasSession) {
        self.textures.begin_frame();
        painter.rect_filled(session.ctx.viewport, 0.0, CANVAS_BACKDROP);

        self.draw_canvas(egui_ctx, painter, session);
        self.draw_cursor(egui_ctx, painter, session);

        let has_project = session.project_path().is_some();
        let ctx = &session.ctx;
        session.top_bar.paint(
            painter,
            ctx.menu_open.as_ref(),
            has_project,
            ctx.history(),
            ctx.history_scroll,
            ctx.mouse_pos,
        );
        session.toolbar.paint(painter);
        draw_highlights(painter, session);

        // Utility controls paint over the buttons they sit next to.
        let CanvasSession { tools, ctx, .. } = session;
        let (utilities, buttons): (Vec<&mut ToolType>, Vec<&mut ToolType>) =
            tools.iter_mut().partition(|tool| tool.kind() == ToolKind::UtilityTool);
        for tool in buttons.into_iter().chain(utilities) {
            tool.draw(painter, ctx);
        }

        session.dialog.paint(painter);
    }

    fn draw_canvas(&mut self, egui_ctx: &Context, painter: &Painter, session: &CanvasSession) {
        let Some(region) = session.visible_region() else {
            return;
        };
        let version = canvas_version(session);
        // Resampled only when the version changes.
        let mut resampled = false;
        let texture = self.textures.get_or_update(
            TextureKey::Canvas,
            version,
            || {
                resampled = true;
                Ok(region.sample(session.ctx.surface()))
            },
            egui_ctx,
        );
        if resampled {
            self.canvas_uploads += 1;
        }
        match texture {
            Ok(id) => {
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                painter.image(id, region.dest_rect, uv, Color32::WHITE);
            }
            Err(err) => log::warn!("Canvas texture: {err}"),
        }
    }

    fn draw_cursor(&mut self, egui_ctx: &Context, painter: &Painter, session: &CanvasSession) {
        let ctx = &session.ctx;
        let over_chrome = any_contains(&ctx.ui_hotspots, ctx.mouse_pos) || session.dialog.is_open();
        let Some(tool) = session.active_tool().filter(|_| !over_chrome && ctx.menu_open.is_none()) else {
            return;
        };

        match tool.cursor_info(ctx) {
            CursorInfo::Circle { radius, color } => {
                egui_ctx.set_cursor_icon(CursorIcon::None);
                let radius = (radius * ctx.camera.zoom).max(1.0);
                painter.circle_filled(ctx.mouse_pos, radius, color);
                painter.circle_stroke(ctx.mouse_pos, radius, Stroke::new(1.0, Color32::BLACK));
                painter.circle_stroke(ctx.mouse_pos, radius + 1.0, Stroke::new(1.0, Color32::WHITE));
            }
            CursorInfo::Custom { fallback } => {
                if !self.draw_cursor_bitmap(egui_ctx, painter, tool, ctx.mouse_pos) {
                    egui_ctx.set_cursor_icon(fallback);
                }
            }
            CursorInfo::Default => {}
        }
    }

    /// Draw the tool's cursor bitmap; false when it has none that loads.
    fn draw_cursor_bitmap(&mut self, egui_ctx: &Context, painter: &Painter, tool: &ToolType, pointer: Pos2) -> bool {
        let id = tool.id();
        if self.broken_cursors.contains(id) {
            return false;
        }
        let Some(spec) = tool.descriptor().cursor.as_ref() else {
            return false;
        };
        let Some(path) = spec.icon.as_deref() else {
            return false;
        };

        let key = TextureKey::Cursor(id.clone());
        let texture = match self.textures.get_or_update(key.clone(), 0, || decode_image(path), egui_ctx) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("Cursor for {id}: {err}");
                self.broken_cursors.insert(id.clone());
                return false;
            }
        };
        let natural = self
            .textures
            .size(&key)
            .map(|[w, h]| vec2(w as f32, h as f32))
            .unwrap_or_default();
        let size = spec.display_size(natural);
        let rect = Rect::from_min_size(spec.draw_origin(pointer, size), size);

        egui_ctx.set_cursor_icon(CursorIcon::None);
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        painter.image(texture, rect, uv, Color32::WHITE);
        true
    }
}

/// Changes whenever the visible canvas image would.
fn canvas_version(session: &CanvasSession) -> u64 {
    let ctx = &session.ctx;
    let mut hasher = DefaultHasher::new();
    ctx.surface().revision().hash(&mut hasher);
    let viewport = ctx.viewport;
    for value in [
        ctx.camera.zoom,
        ctx.camera.pan.x,
        ctx.camera.pan.y,
        viewport.min.x,
        viewport.min.y,
        viewport.max.x,
        viewport.max.y,
    ] {
        value.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Behind the active drawing tool's button and any tool whose popup is open.
fn draw_highlights(painter: &Painter, session: &CanvasSession) {
    let ctx = &session.ctx;
    for tool in session.tools() {
        let Some(button) = tool.button_rect() else {
            continue;
        };
        let kind = tool.kind();
        let active = kind == ToolKind::DrawingTool && ctx.is_active(tool.id());
        let open = ctx.menu_open == Some(MenuId::Tool(tool.id().clone()));
        if active || open {
            painter.rect_filled(button.expand(4.0), 6.0, kind.highlight_color());
        }
    }
}
