use egui::{Pos2, Rect};

/// True if `pos` lies inside any of `rects`.
pub fn any_contains(rects: &[Rect], pos: Pos2) -> bool {
    rects.iter().any(|rect| rect.contains(pos))
}

/// Linear interpolation between `a` and `b` by factor `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp `rect` so it stays inside `bounds`, keeping its size when it fits.
pub fn clamp_rect_inside(rect: Rect, bounds: Rect) -> Rect {
    let mut min = rect.min;
    if rect.max.x > bounds.max.x {
        min.x -= rect.max.x - bounds.max.x;
    }
    if rect.max.y > bounds.max.y {
        min.y -= rect.max.y - bounds.max.y;
    }
    min.x = min.x.max(bounds.min.x);
    min.y = min.y.max(bounds.min.y);
    Rect::from_min_size(min, rect.size())
}
