//! Camera controller: zoom level, pan offset and the rules that bound them.
//!
//! `pan` is the screen position of the world origin. All mutation funnels
//! through [`CameraState::set_zoom`], [`PanAnchor::drag_to`] and
//! [`CameraState::apply_constraints`]; out-of-range requests are clamped,
//! never rejected.

use egui::{Pos2, Vec2, vec2};

use crate::geometry::{canvas_to_screen, screen_to_canvas};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 2.0;
/// Zoom change per wheel notch.
pub const WHEEL_ZOOM_STEP: f32 = 0.1;
/// Zoom change per `Ctrl +` / `Ctrl -`.
pub const KEY_ZOOM_STEP: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub zoom: f32,
    pub pan: Vec2,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub world_size: Vec2,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(vec2(8000.0, 6000.0), MIN_ZOOM, MAX_ZOOM)
    }
}

impl CameraState {
    pub fn new(world_size: Vec2, min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            min_zoom,
            max_zoom,
            world_size,
        }
    }

    /// Camera at zoom 1.0 with the world centered in `viewport_size`.
    pub fn centered_in(mut self, viewport_size: Vec2) -> Self {
        self.zoom = 1.0;
        self.pan = (viewport_size - self.world_size) / 2.0;
        self
    }

    pub fn screen_to_canvas(&self, screen_pos: Pos2) -> Pos2 {
        screen_to_canvas(screen_pos, self.zoom, self.pan)
    }

    pub fn canvas_to_screen(&self, canvas_pos: Pos2) -> Pos2 {
        canvas_to_screen(canvas_pos, self.zoom, self.pan)
    }

    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Change zoom while keeping the world point under `pivot` fixed on screen.
    pub fn set_zoom(&mut self, new_zoom: f32, pivot: Pos2) {
        let new_zoom = self.clamp_zoom(new_zoom);
        // Must be sampled with the old zoom/pan.
        let pivot_world = self.screen_to_canvas(pivot);
        self.zoom = new_zoom;
        self.pan = pivot.to_vec2() - pivot_world.to_vec2() * new_zoom;
    }

    /// `Ctrl 0`: back to 1:1 with the world origin at the screen origin.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    /// Bound the pan offset for `viewport_size`.
    ///
    /// On each axis where the scaled world covers the viewport, the world edge
    /// may not be dragged inside the viewport edge. Where it is smaller than the
    /// viewport, the world is centered on that axis instead.
    pub fn apply_constraints(&mut self, world_size: Vec2, viewport_size: Vec2) {
        self.world_size = world_size;
        self.pan.x = constrain_axis(self.pan.x, world_size.x, self.zoom, viewport_size.x);
        self.pan.y = constrain_axis(self.pan.y, world_size.y, self.zoom, viewport_size.y);
    }
}

fn constrain_axis(offset: f32, world: f32, zoom: f32, viewport: f32) -> f32 {
    let scaled = world * zoom;
    if scaled >= viewport {
        offset.clamp(viewport - scaled, 0.0)
    } else {
        (viewport - scaled) / 2.0
    }
}

/// Screen position and pan offset captured when a pan drag starts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanAnchor {
    pub start_pos: Pos2,
    pub start_offset: Vec2,
}

impl PanAnchor {
    pub fn new(start_pos: Pos2, start_offset: Vec2) -> Self {
        Self { start_pos, start_offset }
    }

    /// Pan offset for the pointer now being at `mouse_pos`.
    pub fn drag_to(&self, mouse_pos: Pos2) -> Vec2 {
        self.start_offset + (mouse_pos - self.start_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    const VIEWPORT: Vec2 = vec2(1668.0, 938.0);
    const WORLD: Vec2 = vec2(8000.0, 6000.0);

    fn approx_eq(a: Pos2, b: Pos2) -> bool {
        (a.x - b.x).abs() < 1e-2 && (a.y - b.y).abs() < 1e-2
    }

    #[test]
    fn zoom_keeps_pivot_fixed() {
        let mut camera = CameraState::new(WORLD, MIN_ZOOM, MAX_ZOOM);
        camera.pan = vec2(-1200.0, -730.0);
        let pivot = pos2(611.0, 402.0);
        let before = camera.screen_to_canvas(pivot);

        camera.set_zoom(1.7, pivot);

        assert_eq!(camera.zoom, 1.7);
        assert!(approx_eq(camera.screen_to_canvas(pivot), before));
        assert!(approx_eq(camera.canvas_to_screen(before), pivot));
    }

    #[test]
    fn zoom_is_clamped_to_bounds() {
        let mut camera = CameraState::new(WORLD, MIN_ZOOM, MAX_ZOOM);
        camera.set_zoom(50.0, Pos2::ZERO);
        assert_eq!(camera.zoom, MAX_ZOOM);
        camera.set_zoom(-3.0, Pos2::ZERO);
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn zoom_round_trip_about_origin_restores_offset() {
        let mut camera = CameraState::new(WORLD, MIN_ZOOM, MAX_ZOOM);
        camera.pan = vec2(-256.0, -128.0);
        let original = camera;

        camera.set_zoom(0.1, pos2(0.0, 0.0));
        camera.set_zoom(1.0, pos2(0.0, 0.0));

        assert!((camera.pan.x - original.pan.x).abs() < 1e-3);
        assert!((camera.pan.y - original.pan.y).abs() < 1e-3);
        assert_eq!(camera.zoom, original.zoom);
    }

    #[test]
    fn constraints_clamp_when_world_covers_viewport() {
        let mut camera = CameraState::new(WORLD, MIN_ZOOM, MAX_ZOOM);
        camera.pan = vec2(100.0, 100.0);
        camera.apply_constraints(WORLD, VIEWPORT);
        assert_eq!(camera.pan, vec2(0.0, 0.0));

        camera.pan = vec2(-10_000.0, -10_000.0);
        camera.apply_constraints(WORLD, VIEWPORT);
        assert_eq!(camera.pan, vec2(1668.0 - 8000.0, 938.0 - 6000.0));
        assert_eq!(camera.pan.x, -6332.0);
    }

    #[test]
    fn constraints_center_when_world_is_smaller_than_viewport() {
        let mut camera = CameraState::new(WORLD, MIN_ZOOM, MAX_ZOOM);
        camera.set_zoom(0.1, Pos2::ZERO);
        camera.pan = vec2(-500.0, 900.0);
        camera.apply_constraints(WORLD, VIEWPORT);
        // 800x600 world on a 1668x938 viewport.
        assert!((camera.pan.x - 434.0).abs() < 1e-3);
        assert!((camera.pan.y - 169.0).abs() < 1e-3);
    }

    #[test]
    fn constraints_mix_clamp_and_center_per_axis() {
        let mut camera = CameraState::new(vec2(2000.0, 500.0), MIN_ZOOM, MAX_ZOOM);
        camera.pan = vec2(50.0, 0.0);
        camera.apply_constraints(vec2(2000.0, 500.0), VIEWPORT);
        assert_eq!(camera.pan.x, 0.0);
        assert_eq!(camera.pan.y, (938.0 - 500.0) / 2.0);
    }

    #[test]
    fn constraints_are_idempotent() {
        let mut camera = CameraState::new(WORLD, MIN_ZOOM, MAX_ZOOM);
        camera.set_zoom(0.37, pos2(100.0, 900.0));
        camera.pan += vec2(4321.0, -9876.0);
        camera.apply_constraints(WORLD, VIEWPORT);
        let once = camera.pan;
        camera.apply_constraints(WORLD, VIEWPORT);
        assert_eq!(camera.pan, once);
    }

    #[test]
    fn centered_start_puts_world_center_at_viewport_center() {
        let camera = CameraState::new(WORLD, MIN_ZOOM, MAX_ZOOM).centered_in(VIEWPORT);
        let center = camera.screen_to_canvas((VIEWPORT / 2.0).to_pos2());
        assert!(approx_eq(center, pos2(4000.0, 3000.0)));
    }

    #[test]
    fn pan_anchor_follows_pointer_delta() {
        let anchor = PanAnchor::new(pos2(100.0, 100.0), vec2(-50.0, -60.0));
        assert_eq!(anchor.drag_to(pos2(130.0, 90.0)), vec2(-20.0, -70.0));
        assert_eq!(anchor.drag_to(pos2(100.0, 100.0)), vec2(-50.0, -60.0));
    }
}
