//! Mapping between screen pixels and world (canvas) coordinates.
//!
//! A camera is fully described by a zoom scalar and a pan offset. The offset is
//! the screen position of the world origin, so
//! `screen = world * zoom + offset` and `world = (screen - offset) / zoom`.

use egui::{Pos2, Vec2};

/// Convert a screen-space position to world space.
pub fn screen_to_canvas(screen_pos: Pos2, zoom: f32, offset: Vec2) -> Pos2 {
    ((screen_pos - offset).to_vec2() / zoom).to_pos2()
}

/// Convert a world-space position to screen space.
pub fn canvas_to_screen(canvas_pos: Pos2, zoom: f32, offset: Vec2) -> Pos2 {
    (canvas_pos.to_vec2() * zoom + offset).to_pos2()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    fn approx_eq(a: Pos2, b: Pos2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn identity_camera_is_noop() {
        let p = pos2(123.0, 45.5);
        assert_eq!(screen_to_canvas(p, 1.0, Vec2::ZERO), p);
        assert_eq!(canvas_to_screen(p, 1.0, Vec2::ZERO), p);
    }

    #[test]
    fn zoom_and_offset_are_applied_in_order() {
        let world = screen_to_canvas(pos2(110.0, 220.0), 2.0, vec2(10.0, 20.0));
        assert!(approx_eq(world, pos2(50.0, 100.0)));

        let screen = canvas_to_screen(pos2(50.0, 100.0), 2.0, vec2(10.0, 20.0));
        assert!(approx_eq(screen, pos2(110.0, 220.0)));
    }

    #[test]
    fn transforms_are_inverse_across_zoom_range() {
        let offsets = [vec2(0.0, 0.0), vec2(-3166.0, -2531.0), vec2(412.5, -88.25)];
        let points = [pos2(0.0, 0.0), pos2(834.0, 469.0), pos2(1667.0, 937.0)];
        for step in 0..=19 {
            let zoom = 0.1 + step as f32 * 0.1;
            for offset in offsets {
                for p in points {
                    let back = canvas_to_screen(screen_to_canvas(p, zoom, offset), zoom, offset);
                    assert!(approx_eq(back, p), "zoom {zoom} offset {offset:?} point {p:?} -> {back:?}");
                }
            }
        }
    }
}
