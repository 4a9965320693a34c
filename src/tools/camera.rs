use egui::{Align2, Color32, FontId, Key, Painter, PointerButton, Pos2, Rect, pos2, vec2};

use crate::camera::{KEY_ZOOM_STEP, PanAnchor, WHEEL_ZOOM_STEP};
use crate::geometry::any_contains;
use crate::input::InputEvent;
use crate::state::SharedContext;
use crate::tools::{CAMERA_INJECTIONS, CameraProvider, Injection, Tool, ToolDescriptor};
use crate::widgets::Slider;

/// Zoom slider, wheel and keyboard zoom, and middle-button panning.
///
/// Holds no camera state of its own: every operation reads and writes
/// `SharedContext::camera`, which makes this the canvas camera provider.
#[derive(Debug, Clone)]
pub struct CameraTool {
    descriptor: ToolDescriptor,
    /// Position along the zoom range, `0..=1`.
    slider: Slider,
    middle_pan: Option<PanAnchor>,
}

pub fn new_camera_tool(descriptor: ToolDescriptor) -> super::ToolType {
    super::ToolType::Camera(CameraTool {
        descriptor,
        slider: Slider::new(vec2(200.0, 30.0), 0.0, 1.0, 0.0),
        middle_pan: None,
    })
}

impl CameraTool {
    fn sync_slider(&mut self, ctx: &SharedContext) {
        let camera = &ctx.camera;
        let range = (camera.max_zoom - camera.min_zoom).max(f32::EPSILON);
        self.slider.set_value((camera.zoom - camera.min_zoom) / range);
    }

    fn slider_zoom(&self, ctx: &SharedContext) -> f32 {
        let camera = &ctx.camera;
        camera.min_zoom + self.slider.value() * (camera.max_zoom - camera.min_zoom)
    }

    fn zoom_by(&mut self, ctx: &mut SharedContext, step: f32, pivot: Pos2) {
        let zoom = ctx.camera.zoom + step;
        self.set_zoom(ctx, zoom, pivot);
    }
}

impl Tool for CameraTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool {
        if self.slider.handle_event(event) {
            let zoom = self.slider_zoom(ctx);
            let center = ctx.viewport.center();
            self.set_zoom(ctx, zoom, center);
            return true;
        }

        match event {
            InputEvent::PointerDown {
                pos,
                button: PointerButton::Middle,
            } => {
                self.middle_pan = Some(PanAnchor::new(*pos, ctx.camera.pan));
                true
            }
            InputEvent::PointerUp {
                button: PointerButton::Middle,
                ..
            } => {
                self.middle_pan = None;
                true
            }
            InputEvent::PointerMove { pos } => match &self.middle_pan {
                Some(anchor) => {
                    ctx.camera.pan = anchor.drag_to(*pos);
                    true
                }
                None => false,
            },
            InputEvent::Wheel { pos, delta } => {
                if any_contains(&ctx.ui_hotspots, *pos) {
                    return false;
                }
                if *delta > 0.0 {
                    self.zoom_by(ctx, WHEEL_ZOOM_STEP, *pos);
                } else if *delta < 0.0 {
                    self.zoom_by(ctx, -WHEEL_ZOOM_STEP, *pos);
                }
                true
            }
            InputEvent::KeyDown { key, modifiers } if modifiers.command || modifiers.ctrl => {
                let pivot = ctx.mouse_pos;
                match key {
                    Key::Num0 => {
                        ctx.camera.reset();
                        self.sync_slider(ctx);
                        true
                    }
                    Key::Equals | Key::Plus => {
                        self.zoom_by(ctx, KEY_ZOOM_STEP, pivot);
                        true
                    }
                    Key::Minus => {
                        self.zoom_by(ctx, -KEY_ZOOM_STEP, pivot);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn draw(&mut self, painter: &Painter, ctx: &SharedContext) {
        if !self.slider.is_dragging() {
            self.sync_slider(ctx);
        }
        self.slider.paint(painter);
        let rect = self.slider.rect();
        painter.text(
            pos2(rect.max.x + 10.0, rect.center().y),
            Align2::LEFT_CENTER,
            format!("{}%", (ctx.camera.zoom * 100.0) as i32),
            FontId::proportional(20.0),
            Color32::WHITE,
        );
    }

    fn update_button_position(&mut self, x: f32, y: f32) {
        self.slider.set_position(pos2(x, y));
    }

    fn injections(&self) -> &'static [Injection] {
        &CAMERA_INJECTIONS
    }

    fn as_camera_provider(&self) -> Option<&dyn CameraProvider> {
        Some(self)
    }

    fn as_camera_provider_mut(&mut self) -> Option<&mut dyn CameraProvider> {
        Some(self)
    }
}

impl CameraProvider for CameraTool {
    fn screen_to_canvas(&self, ctx: &SharedContext, screen_pos: Pos2) -> Pos2 {
        ctx.camera.screen_to_canvas(screen_pos)
    }

    fn canvas_to_screen(&self, ctx: &SharedContext, canvas_pos: Pos2) -> Pos2 {
        ctx.camera.canvas_to_screen(canvas_pos)
    }

    fn set_zoom(&mut self, ctx: &mut SharedContext, new_zoom: f32, pivot: Pos2) {
        ctx.camera.set_zoom(new_zoom, pivot);
        self.sync_slider(ctx);
    }

    fn apply_constraints(&mut self, ctx: &mut SharedContext) {
        let world = ctx.camera.world_size;
        let viewport: Rect = ctx.viewport;
        ctx.camera.apply_constraints(world, viewport.size());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::tools::{ToolKind, ToolType};
    use egui::Modifiers;

    fn setup() -> (CameraTool, SharedContext) {
        let ctx = SharedContext::new(
            &CanvasConfig::default(),
            Rect::from_min_size(Pos2::ZERO, vec2(1668.0, 938.0)),
        );
        let mut tool = match new_camera_tool(ToolDescriptor::new("zoom", "Zoom", ToolKind::UtilityTool)) {
            ToolType::Camera(tool) => tool,
            _ => unreachable!(),
        };
        tool.update_button_position(220.0, 760.0);
        (tool, ctx)
    }

    #[test]
    fn wheel_zooms_about_pointer() {
        let (mut tool, mut ctx) = setup();
        let pointer = pos2(500.0, 400.0);
        let before = ctx.screen_to_canvas(pointer);

        assert!(tool.handle_event(&InputEvent::Wheel { pos: pointer, delta: 1.0 }, &mut ctx));
        assert!((ctx.camera.zoom - 1.1).abs() < 1e-5);
        let after = ctx.screen_to_canvas(pointer);
        assert!((after - before).length() < 1e-2);
    }

    #[test]
    fn wheel_over_chrome_is_ignored() {
        let (mut tool, mut ctx) = setup();
        ctx.ui_hotspots = vec![Rect::from_min_size(Pos2::ZERO, vec2(1668.0, 40.0))];
        assert!(!tool.handle_event(&InputEvent::Wheel { pos: pos2(10.0, 10.0), delta: 1.0 }, &mut ctx));
        assert_eq!(ctx.camera.zoom, 1.0);
    }

    #[test]
    fn keyboard_zoom_and_reset() {
        let (mut tool, mut ctx) = setup();
        ctx.mouse_pos = pos2(100.0, 100.0);
        let key = |key| InputEvent::KeyDown { key, modifiers: Modifiers::COMMAND };

        assert!(tool.handle_event(&key(Key::Minus), &mut ctx));
        assert_eq!(ctx.camera.zoom, 0.75);
        assert!(tool.handle_event(&key(Key::Num0), &mut ctx));
        assert_eq!(ctx.camera.zoom, 1.0);
        assert_eq!(ctx.camera.pan, egui::Vec2::ZERO);

        let plain = InputEvent::KeyDown { key: Key::Minus, modifiers: Modifiers::NONE };
        assert!(!tool.handle_event(&plain, &mut ctx));
    }

    #[test]
    fn slider_zooms_about_screen_center() {
        let (mut tool, mut ctx) = setup();
        let center = ctx.viewport.center();
        let before = ctx.screen_to_canvas(center);
        let track = tool.slider.rect();

        let down = InputEvent::PointerDown { pos: track.right_center(), button: PointerButton::Primary };
        assert!(tool.handle_event(&down, &mut ctx));
        assert_eq!(ctx.camera.zoom, ctx.camera.max_zoom);
        assert!((ctx.screen_to_canvas(center) - before).length() < 1e-2);
    }

    #[test]
    fn middle_drag_pans() {
        let (mut tool, mut ctx) = setup();
        ctx.camera.pan = vec2(-500.0, -500.0);
        let down = InputEvent::PointerDown { pos: pos2(600.0, 400.0), button: PointerButton::Middle };
        assert!(tool.handle_event(&down, &mut ctx));
        assert!(tool.handle_event(&InputEvent::PointerMove { pos: pos2(650.0, 410.0) }, &mut ctx));
        assert_eq!(ctx.camera.pan, vec2(-450.0, -490.0));
        let up = InputEvent::PointerUp { pos: pos2(650.0, 410.0), button: PointerButton::Middle };
        assert!(tool.handle_event(&up, &mut ctx));
        assert!(!tool.handle_event(&InputEvent::PointerMove { pos: pos2(0.0, 0.0) }, &mut ctx));
    }

    #[test]
    fn provider_constrains_pan() {
        let (mut tool, mut ctx) = setup();
        ctx.camera.zoom = 1.0;
        ctx.camera.pan = vec2(100.0, 100.0);
        tool.apply_constraints(&mut ctx);
        assert_eq!(ctx.camera.pan, egui::Vec2::ZERO);
    }
}
