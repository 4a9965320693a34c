#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod error;
pub mod file_handler;
pub mod geometry;
pub mod history;
pub mod id_generator;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod state;
pub mod surface;
pub mod texture_manager;
pub mod tools;
pub mod widgets;

pub use app::WhiteboardApp;
pub use config::CanvasConfig;
pub use error::{CanvasError, PluginError};
pub use input::{Consumer, InputEvent, InputHandler};
pub use renderer::Renderer;
pub use state::{CanvasSession, SharedContext};
pub use surface::Surface;
pub use tools::{CameraProvider, Tool, ToolId, ToolKind, ToolType};
