//! Host chrome drawn around the canvas: the top bar with its File and History
//! dropdowns, the sliding toolbar, and the unsaved-changes dialog.

mod dialog;
mod toolbar;
mod top_bar;

pub use dialog::{ConfirmDialog, DialogChoice, PendingAction};
pub use toolbar::Toolbar;
pub use top_bar::{FileMenuItem, TopBar};

use egui::Color32;

pub const TOP_BAR_HEIGHT: f32 = 40.0;
pub const MENU_BUTTON_WIDTH: f32 = 100.0;
pub const FILE_ITEM_WIDTH: f32 = 300.0;
pub const FILE_ITEM_HEIGHT: f32 = 40.0;

pub const HISTORY_MENU_WIDTH: f32 = 300.0;
pub const HISTORY_ROW_HEIGHT: f32 = 25.0;
pub const HISTORY_VISIBLE_ROWS: usize = 10;
pub const HISTORY_MENU_PADDING: f32 = 5.0;

pub const TOOLBAR_HEIGHT: f32 = 80.0;
/// How much of the toolbar peeks out while it is hidden.
pub const TOOLBAR_SLIDE_DISTANCE: f32 = 60.0;
pub const TOOLBAR_PADDING: f32 = 10.0;
pub const TOOL_BUTTON_SIZE: f32 = 60.0;
pub const TOOL_BUTTON_GAP: f32 = 10.0;
/// Per-frame lerp factor of the toolbar slide.
pub const TOOLBAR_SLIDE_FACTOR: f32 = 0.2;

pub const CANVAS_BACKDROP: Color32 = Color32::from_rgb(80, 80, 80);
pub const MENU_BG: Color32 = Color32::from_rgb(200, 200, 200);
pub const MENU_ACTIVE_BG: Color32 = Color32::from_rgb(225, 225, 225);
pub const MENU_DROPDOWN_BG: Color32 = Color32::from_rgb(220, 220, 220);
pub const MENU_HOVER_BG: Color32 = Color32::from_rgb(200, 220, 255);
pub const MENU_SELECTED_BG: Color32 = Color32::from_rgb(180, 180, 180);
pub const MENU_TEXT: Color32 = Color32::BLACK;
pub const MENU_TEXT_MUTED: Color32 = Color32::from_rgb(150, 150, 150);
pub const MENU_TEXT_HOVER: Color32 = Color32::from_rgb(0, 0, 200);
pub const MENU_BORDER: Color32 = Color32::from_rgb(150, 150, 150);
