//! Viewport culling for the backing surface.
//!
//! Only the part of the surface that is actually on screen is sampled, scaled
//! to screen pixels and handed to the renderer.

use egui::{ColorImage, Pos2, Rect};

use crate::surface::Surface;

/// Where the visible part of the surface sits, in world and screen space.
///
/// Cheap to compute; the pixels are only resampled by [`ViewportRegion::sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRegion {
    /// World rectangle to sample.
    pub world_rect: Rect,
    /// Where the sampled image goes on screen.
    pub dest_rect: Rect,
    /// Sampled image size in screen pixels.
    pub size: [usize; 2],
}

impl ViewportRegion {
    pub fn sample(&self, surface: &Surface) -> ColorImage {
        surface.sample_region(self.world_rect, self.size[0], self.size[1])
    }
}

/// The visible slice of the surface, already scaled for display.
#[derive(Debug, Clone)]
pub struct ViewportFrame {
    pub image: ColorImage,
    /// Where `image` goes on screen.
    pub dest_rect: Rect,
    /// World rectangle the image was sampled from.
    pub world_rect: Rect,
}

/// World rectangle covered by `viewport`, from the four inverse-transformed
/// corners.
pub fn visible_world_rect(viewport: Rect, to_world: impl Fn(Pos2) -> Pos2) -> Rect {
    let corners = [
        viewport.left_top(),
        viewport.right_top(),
        viewport.left_bottom(),
        viewport.right_bottom(),
    ];
    Rect::from_points(&corners.map(to_world))
}

/// Locate the visible part of `surface` without touching its pixels.
///
/// Returns `None` when nothing of the surface is on screen or the clipped
/// region collapses below one screen pixel.
pub fn visible_region(
    surface: &Surface,
    viewport: Rect,
    to_world: impl Fn(Pos2) -> Pos2,
    to_screen: impl Fn(Pos2) -> Pos2,
) -> Option<ViewportRegion> {
    let visible = visible_world_rect(viewport, to_world);
    let world_rect = visible.intersect(surface.rect());
    if !world_rect.is_positive() {
        return None;
    }

    let dest_rect = Rect::from_two_pos(to_screen(world_rect.min), to_screen(world_rect.max));
    let dest_w = dest_rect.width().round() as usize;
    let dest_h = dest_rect.height().round() as usize;
    if dest_w == 0 || dest_h == 0 {
        return None;
    }
    Some(ViewportRegion {
        world_rect,
        dest_rect,
        size: [dest_w, dest_h],
    })
}

/// Extract and scale the visible part of `surface`.
pub fn compose(
    surface: &Surface,
    viewport: Rect,
    to_world: impl Fn(Pos2) -> Pos2,
    to_screen: impl Fn(Pos2) -> Pos2,
) -> Option<ViewportFrame> {
    let region = visible_region(surface, viewport, to_world, to_screen)?;
    Some(ViewportFrame {
        image: region.sample(surface),
        dest_rect: region.dest_rect,
        world_rect: region.world_rect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;
    use egui::{Color32, pos2, vec2};

    fn frame_for(surface: &Surface, camera: &CameraState, viewport: Rect) -> Option<ViewportFrame> {
        compose(
            surface,
            viewport,
            |p| camera.screen_to_canvas(p),
            |p| camera.canvas_to_screen(p),
        )
    }

    #[test]
    fn visible_rect_at_identity_matches_viewport() {
        let viewport = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 50.0));
        let rect = visible_world_rect(viewport, |p| p);
        assert_eq!(rect, viewport);
    }

    #[test]
    fn clipped_to_surface_when_zoomed_out() {
        let surface = Surface::new(400, 300, Color32::WHITE);
        let mut camera = CameraState::new(vec2(400.0, 300.0), 0.1, 2.0);
        let viewport = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        camera.set_zoom(0.5, Pos2::ZERO);
        camera.apply_constraints(vec2(400.0, 300.0), viewport.size());

        let frame = frame_for(&surface, &camera, viewport).expect("surface on screen");
        assert_eq!(frame.world_rect, surface.rect());
        assert_eq!(frame.image.size, [200, 150]);
        // Centered: (800 - 200) / 2, (600 - 150) / 2
        assert_eq!(frame.dest_rect.min, pos2(300.0, 225.0));
    }

    #[test]
    fn only_visible_region_is_sampled_when_zoomed_in() {
        let mut surface = Surface::new(1000, 1000, Color32::WHITE);
        surface.put_pixel(110, 60, Color32::RED);
        let mut camera = CameraState::new(vec2(1000.0, 1000.0), 0.1, 2.0);
        camera.zoom = 2.0;
        camera.pan = vec2(-200.0, -100.0);
        let viewport = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 80.0));

        let frame = frame_for(&surface, &camera, viewport).expect("visible");
        assert_eq!(frame.world_rect, Rect::from_min_max(pos2(100.0, 50.0), pos2(150.0, 90.0)));
        assert_eq!(frame.image.size, [100, 80]);
        // World (110, 60) lands at screen (20, 20)..(22, 22).
        assert_eq!(frame.image.pixels[20 * 100 + 20], Color32::RED);
        assert_eq!(frame.image.pixels[21 * 100 + 21], Color32::RED);
        assert_eq!(frame.image.pixels[0], Color32::WHITE);
    }

    #[test]
    fn nothing_rendered_when_surface_off_screen() {
        let surface = Surface::new(100, 100, Color32::WHITE);
        let mut camera = CameraState::new(vec2(100.0, 100.0), 0.1, 2.0);
        camera.pan = vec2(500.0, 0.0);
        let viewport = Rect::from_min_size(Pos2::ZERO, vec2(200.0, 200.0));
        assert!(frame_for(&surface, &camera, viewport).is_none());
    }

    #[test]
    fn region_matches_composed_frame() {
        let surface = Surface::new(400, 300, Color32::WHITE);
        let camera = CameraState::new(vec2(400.0, 300.0), 0.1, 2.0);
        let viewport = Rect::from_min_size(Pos2::ZERO, vec2(250.0, 200.0));

        let region = visible_region(
            &surface,
            viewport,
            |p| camera.screen_to_canvas(p),
            |p| camera.canvas_to_screen(p),
        )
        .expect("visible");
        let frame = frame_for(&surface, &camera, viewport).expect("visible");
        assert_eq!(region.world_rect, frame.world_rect);
        assert_eq!(region.dest_rect, frame.dest_rect);
        assert_eq!(region.size, frame.image.size);
    }
}
