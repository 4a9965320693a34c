pub mod hit_testing;
pub mod transform;

pub use hit_testing::{any_contains, clamp_rect_inside, lerp};
pub use transform::{canvas_to_screen, screen_to_canvas};
