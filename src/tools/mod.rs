use egui::{Painter, Pos2, Rect, Vec2};

use crate::geometry::clamp_rect_inside;
use crate::input::InputEvent;
use crate::state::SharedContext;

mod descriptor;
pub use descriptor::{
    CAMERA_INJECTIONS, CursorInfo, CursorSpec, Hotspot, HotspotAnchor, Injection, ToolDescriptor, ToolId,
    ToolKind,
};

mod brush;
pub use brush::{BrushTool, new_eraser_tool, new_pen_tool};

mod color_palette;
pub use color_palette::{ColorPaletteTool, MAX_RECENT_COLORS, new_color_palette_tool};

mod hand;
pub use hand::{HandTool, new_hand_tool};

mod camera;
pub use camera::{CameraTool, new_camera_tool};

pub mod registry;

/// Tool trait defines the interface every loaded tool satisfies.
pub trait Tool: Send + Sync {
    /// Registry identity, display name, kind and assets.
    fn descriptor(&self) -> &ToolDescriptor;

    fn id(&self) -> &ToolId {
        &self.descriptor().id
    }

    fn kind(&self) -> ToolKind {
        self.descriptor().kind
    }

    /// Returns true iff the event was consumed; dispatch stops there.
    fn handle_event(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool;

    /// Paint the toolbar button and any open popup.
    fn draw(&mut self, painter: &Painter, ctx: &SharedContext);

    /// Called every frame as the toolbar slides.
    fn update_button_position(&mut self, x: f32, y: f32);

    /// Toolbar button rectangle; utility tools have none.
    fn button_rect(&self) -> Option<Rect> {
        None
    }

    /// How the host should draw the pointer while this tool is active.
    fn cursor_info(&self, _ctx: &SharedContext) -> CursorInfo {
        CursorInfo::Default
    }

    /// Capabilities this tool publishes into the host at load time.
    fn injections(&self) -> &'static [Injection] {
        &[]
    }

    fn as_camera_provider(&self) -> Option<&dyn CameraProvider> {
        None
    }

    fn as_camera_provider_mut(&mut self) -> Option<&mut dyn CameraProvider> {
        None
    }
}

/// The four camera operations the canvas delegates to exactly one utility tool.
pub trait CameraProvider {
    fn screen_to_canvas(&self, ctx: &SharedContext, screen_pos: Pos2) -> Pos2;

    fn canvas_to_screen(&self, ctx: &SharedContext, canvas_pos: Pos2) -> Pos2;

    /// Zoom while keeping the world point under `pivot` fixed.
    fn set_zoom(&mut self, ctx: &mut SharedContext, new_zoom: f32, pivot: Pos2);

    /// Bound the pan offset for the current zoom and viewport.
    fn apply_constraints(&mut self, ctx: &mut SharedContext);
}

/// Popup of `size` sitting 10px above the toolbar, centered on the tool's
/// button and kept 5px inside the window.
pub fn popup_rect(size: Vec2, button: Rect, toolbar_y: f32, viewport: Rect) -> Rect {
    let min = egui::pos2(button.center().x - size.x / 2.0, toolbar_y - 10.0 - size.y);
    clamp_rect_inside(Rect::from_min_size(min, size), viewport.shrink(5.0))
}

/// Enum representing all available tool types
/// This keeps the tool set closed and avoids `Box<dyn Tool>`
#[derive(Debug, Clone)]
pub enum ToolType {
    Brush(BrushTool),
    ColorPalette(ColorPaletteTool),
    Hand(HandTool),
    Camera(CameraTool),
}

impl Tool for ToolType {
    fn descriptor(&self) -> &ToolDescriptor {
        match self {
            Self::Brush(tool) => tool.descriptor(),
            Self::ColorPalette(tool) => tool.descriptor(),
            Self::Hand(tool) => tool.descriptor(),
            Self::Camera(tool) => tool.descriptor(),
        }
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool {
        match self {
            Self::Brush(tool) => tool.handle_event(event, ctx),
            Self::ColorPalette(tool) => tool.handle_event(event, ctx),
            Self::Hand(tool) => tool.handle_event(event, ctx),
            Self::Camera(tool) => tool.handle_event(event, ctx),
        }
    }

    fn draw(&mut self, painter: &Painter, ctx: &SharedContext) {
        match self {
            Self::Brush(tool) => tool.draw(painter, ctx),
            Self::ColorPalette(tool) => tool.draw(painter, ctx),
            Self::Hand(tool) => tool.draw(painter, ctx),
            Self::Camera(tool) => tool.draw(painter, ctx),
        }
    }

    fn update_button_position(&mut self, x: f32, y: f32) {
        match self {
            Self::Brush(tool) => tool.update_button_position(x, y),
            Self::ColorPalette(tool) => tool.update_button_position(x, y),
            Self::Hand(tool) => tool.update_button_position(x, y),
            Self::Camera(tool) => tool.update_button_position(x, y),
        }
    }

    fn button_rect(&self) -> Option<Rect> {
        match self {
            Self::Brush(tool) => tool.button_rect(),
            Self::ColorPalette(tool) => tool.button_rect(),
            Self::Hand(tool) => tool.button_rect(),
            Self::Camera(tool) => tool.button_rect(),
        }
    }

    fn cursor_info(&self, ctx: &SharedContext) -> CursorInfo {
        match self {
            Self::Brush(tool) => tool.cursor_info(ctx),
            Self::ColorPalette(tool) => tool.cursor_info(ctx),
            Self::Hand(tool) => tool.cursor_info(ctx),
            Self::Camera(tool) => tool.cursor_info(ctx),
        }
    }

    fn injections(&self) -> &'static [Injection] {
        match self {
            Self::Brush(tool) => tool.injections(),
            Self::ColorPalette(tool) => tool.injections(),
            Self::Hand(tool) => tool.injections(),
            Self::Camera(tool) => tool.injections(),
        }
    }

    fn as_camera_provider(&self) -> Option<&dyn CameraProvider> {
        match self {
            Self::Camera(tool) => tool.as_camera_provider(),
            _ => None,
        }
    }

    fn as_camera_provider_mut(&mut self) -> Option<&mut dyn CameraProvider> {
        match self {
            Self::Camera(tool) => tool.as_camera_provider_mut(),
            _ => None,
        }
    }
}

impl ToolType {
    /// True when this tool can serve as the canvas camera.
    pub fn provides_camera(&self) -> bool {
        self.kind() == ToolKind::UtilityTool
            && CAMERA_INJECTIONS.iter().all(|inj| self.injections().contains(inj))
            && self.as_camera_provider().is_some()
    }

    pub fn provides_hand_id(&self) -> bool {
        self.injections().contains(&Injection::HandToolId)
    }
}
