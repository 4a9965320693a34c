mod slider;
mod tool_button;

pub use slider::Slider;
pub use tool_button::ToolButton;
