//! The record every tool and pipeline stage reads and writes.
//!
//! `SharedContext` is handed to tools by `&mut` for the duration of one call;
//! tools must not hold on to anything borrowed from it. The drawing surface
//! can be painted through [`SharedContext::surface_mut`] but only the history
//! operations and project loading replace it wholesale.

use egui::ecolor::Hsva;
use egui::{Color32, Pos2, Rect};

use crate::camera::{CameraState, PanAnchor};
use crate::config::CanvasConfig;
use crate::history::History;
use crate::surface::Surface;
use crate::tools::ToolId;

pub const BACKGROUND_COLOR: Color32 = Color32::WHITE;

/// Which popup or dropdown is open. At most one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MenuId {
    File,
    History,
    Tool(ToolId),
}

#[derive(Debug)]
pub struct SharedContext {
    /// Screen rectangle of the window.
    pub viewport: Rect,
    pub draw_color: Color32,
    /// Colour picker state; kept separately so hue survives a zero value.
    pub current_hsv: Hsva,
    pub draw_size: f32,
    pub eraser_size: f32,
    pub active_tool: Option<ToolId>,
    /// Single-slot save used while space is held for panning.
    pub previous_tool: Option<ToolId>,
    /// Space swapped the hand tool in; releasing it swaps back.
    pub space_pan: bool,
    pub menu_open: Option<MenuId>,
    /// The current press landed on chrome, or a stage has claimed the event.
    pub click_on_ui: bool,
    pub mouse_pos: Pos2,
    canvas_mouse_pos: Pos2,
    pub toolbar_y: f32,
    /// Chrome rectangles that swallow wheel zoom.
    pub ui_hotspots: Vec<Rect>,
    pub camera: CameraState,
    pub is_drawing: bool,
    pub is_panning: bool,
    pub pan_anchor: PanAnchor,
    /// First visible row of the history menu.
    pub history_scroll: usize,
    surface: Surface,
    history: History,
    dirty: bool,
}

impl SharedContext {
    pub fn new(config: &CanvasConfig, viewport: Rect) -> Self {
        let config = config.clone().sanitized();
        let surface = Surface::new(config.world_width, config.world_height, BACKGROUND_COLOR);
        let history = History::new(&surface, "Initial", config.max_history);
        let camera = CameraState::new(config.world_size(), config.min_zoom, config.max_zoom)
            .centered_in(viewport.size());
        Self {
            viewport,
            draw_color: Color32::BLACK,
            current_hsv: Hsva::new(0.0, 0.0, 0.0, 1.0),
            draw_size: 5.0,
            eraser_size: 50.0,
            active_tool: None,
            previous_tool: None,
            space_pan: false,
            menu_open: None,
            click_on_ui: false,
            mouse_pos: Pos2::ZERO,
            canvas_mouse_pos: Pos2::ZERO,
            toolbar_y: viewport.max.y,
            ui_hotspots: Vec::new(),
            camera,
            is_drawing: false,
            is_panning: false,
            pan_anchor: PanAnchor::default(),
            history_scroll: 0,
            surface,
            history,
            dirty: false,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Pointer position in world space, refreshed by the host.
    pub fn canvas_mouse_pos(&self) -> Pos2 {
        self.canvas_mouse_pos
    }

    pub(crate) fn set_canvas_mouse_pos(&mut self, pos: Pos2) {
        self.canvas_mouse_pos = pos;
    }

    pub fn screen_to_canvas(&self, pos: Pos2) -> Pos2 {
        self.camera.screen_to_canvas(pos)
    }

    pub fn canvas_to_screen(&self, pos: Pos2) -> Pos2 {
        self.camera.canvas_to_screen(pos)
    }

    pub fn is_active(&self, id: &ToolId) -> bool {
        self.active_tool.as_ref() == Some(id)
    }

    pub fn is_menu_open(&self, menu: &MenuId) -> bool {
        self.menu_open.as_ref() == Some(menu)
    }

    pub fn is_tool_menu_open(&self, id: &ToolId) -> bool {
        matches!(&self.menu_open, Some(MenuId::Tool(open)) if open == id)
    }

    /// Open `menu`, or close it if it is already the open one. Returns whether
    /// it is open afterwards.
    pub fn toggle_menu(&mut self, menu: MenuId) -> bool {
        if self.is_menu_open(&menu) {
            self.menu_open = None;
            false
        } else {
            self.menu_open = Some(menu);
            true
        }
    }

    /// Record the current surface as a new history step.
    pub fn add_history(&mut self, label: impl Into<String>) {
        let label = label.into();
        log::debug!("History: {label}");
        self.history.push(&self.surface, label);
        self.dirty = true;
        self.history_scroll = self.history.len().saturating_sub(crate::panels::HISTORY_VISIBLE_ROWS);
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(surface) => {
                self.restore(surface);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(surface) => {
                self.restore(surface);
                true
            }
            None => false,
        }
    }

    pub fn jump_to_history(&mut self, index: usize) -> bool {
        match self.history.jump_to(index) {
            Some(surface) => {
                self.restore(surface);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, surface: Surface) {
        self.surface = surface;
        // Moving through history counts as an unsaved change.
        self.dirty = true;
    }

    /// Blank surface, a single "Initial" history entry, nothing to save.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.history.reset(&self.surface, "Initial");
        self.history_scroll = 0;
        self.dirty = false;
    }

    /// Replace the surface with freshly loaded content.
    pub fn load_surface(&mut self, surface: Surface, label: impl Into<String>) {
        self.surface = surface;
        self.history.reset(&self.surface, label);
        self.history_scroll = 0;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn small_context() -> SharedContext {
        let config = CanvasConfig {
            world_width: 200,
            world_height: 100,
            ..Default::default()
        };
        SharedContext::new(&config, Rect::from_min_size(Pos2::ZERO, vec2(400.0, 300.0)))
    }

    #[test]
    fn starts_clean_with_initial_entry() {
        let ctx = small_context();
        assert!(!ctx.is_dirty());
        assert_eq!(ctx.history().labels().collect::<Vec<_>>(), ["Initial"]);
        assert_eq!(ctx.camera.pan, vec2(100.0, 100.0));
    }

    #[test]
    fn undo_restores_copy_and_marks_dirty() {
        let mut ctx = small_context();
        ctx.surface_mut().fill_circle(pos2(10.0, 10.0), 3.0, Color32::BLACK);
        ctx.add_history("Pen Stroke");
        ctx.mark_clean();

        assert!(ctx.undo());
        assert!(ctx.is_dirty());
        assert_eq!(ctx.surface().pixel(10, 10), Some(Color32::WHITE));

        // Painting on the restored surface must not leak into history.
        ctx.surface_mut().put_pixel(50, 50, Color32::RED);
        assert!(ctx.redo());
        assert_eq!(ctx.surface().pixel(10, 10), Some(Color32::BLACK));
        assert_eq!(ctx.surface().pixel(50, 50), Some(Color32::WHITE));
        assert!(!ctx.redo());
    }

    #[test]
    fn clear_resets_everything() {
        let mut ctx = small_context();
        ctx.surface_mut().put_pixel(1, 1, Color32::BLACK);
        ctx.add_history("Dot");
        ctx.clear();
        assert!(!ctx.is_dirty());
        assert_eq!(ctx.history().len(), 1);
        assert_eq!(ctx.surface().pixel(1, 1), Some(Color32::WHITE));
    }

    #[test]
    fn toggling_menus_keeps_one_open() {
        let mut ctx = small_context();
        let pen = ToolId::new("pen");
        assert!(ctx.toggle_menu(MenuId::File));
        assert!(ctx.toggle_menu(MenuId::Tool(pen.clone())));
        assert!(ctx.is_tool_menu_open(&pen));
        assert!(!ctx.is_menu_open(&MenuId::File));
        assert!(!ctx.toggle_menu(MenuId::Tool(pen)));
        assert_eq!(ctx.menu_open, None);
    }

    #[test]
    fn history_scroll_follows_newest_entry() {
        let mut ctx = small_context();
        for i in 0..14 {
            ctx.add_history(format!("Step {i}"));
        }
        assert_eq!(ctx.history().len(), 15);
        assert_eq!(ctx.history_scroll, 5);
    }

    #[test]
    fn inverted_zoom_bounds_are_repaired() {
        let config = CanvasConfig {
            world_width: 200,
            world_height: 100,
            min_zoom: 3.0,
            max_zoom: 0.5,
            ..Default::default()
        };
        let mut ctx = SharedContext::new(&config, Rect::from_min_size(Pos2::ZERO, vec2(400.0, 300.0)));
        assert!(ctx.camera.min_zoom <= ctx.camera.max_zoom);
        ctx.camera.set_zoom(10.0, pos2(200.0, 150.0));
        assert_eq!(ctx.camera.zoom, ctx.camera.max_zoom);
    }
}
