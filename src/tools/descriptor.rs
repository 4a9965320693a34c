use std::fmt;
use std::path::PathBuf;

use egui::{Color32, CursorIcon, Vec2, vec2};
use serde::{Deserialize, Serialize};

/// Stable, unique identity of a loaded tool (its registry id).
///
/// All dispatch, `active_tool` and `menu_open` comparisons go through this
/// type. Display names are labels only and may collide across kits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(String);

impl ToolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Paints on (or otherwise interacts with) the canvas when active.
    DrawingTool,
    /// Owns a popup but never becomes the active canvas tool.
    ContextTool,
    /// No toolbar button; sees every event first (camera, zoom).
    UtilityTool,
}

impl ToolKind {
    pub fn has_button(self) -> bool {
        !matches!(self, ToolKind::UtilityTool)
    }

    /// Highlight drawn behind an active or open toolbar button.
    pub fn highlight_color(self) -> Color32 {
        match self {
            ToolKind::DrawingTool => Color32::from_rgb(200, 200, 0),
            ToolKind::ContextTool => Color32::from_rgb(150, 0, 200),
            ToolKind::UtilityTool => Color32::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotAnchor {
    Center,
}

/// Point of a cursor bitmap that sits under the pointer: `"center"` or `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Hotspot {
    Point([f32; 2]),
    Anchor(HotspotAnchor),
}

impl Default for Hotspot {
    fn default() -> Self {
        Hotspot::Point([0.0, 0.0])
    }
}

impl Hotspot {
    pub fn resolve(&self, bitmap_size: Vec2) -> Vec2 {
        match self {
            Hotspot::Point([x, y]) => vec2(*x, *y),
            Hotspot::Anchor(HotspotAnchor::Center) => bitmap_size / 2.0,
        }
    }
}

/// Custom cursor bitmap declared by a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorSpec {
    pub icon: Option<PathBuf>,
    pub hotspot: Hotspot,
    /// Scale the bitmap to this size. Bitmaps over 64px are shrunk to 64x64
    /// when unset.
    pub size: Option<[f32; 2]>,
    pub offset: [f32; 2],
}

impl CursorSpec {
    pub const MAX_AUTO_SIZE: f32 = 64.0;

    /// On-screen size for a bitmap of `natural` pixels.
    pub fn display_size(&self, natural: Vec2) -> Vec2 {
        match self.size {
            Some([w, h]) => vec2(w, h),
            None if natural.x > Self::MAX_AUTO_SIZE || natural.y > Self::MAX_AUTO_SIZE => {
                Vec2::splat(Self::MAX_AUTO_SIZE)
            }
            None => natural,
        }
    }

    /// Top-left of the bitmap for a pointer at `pointer`.
    pub fn draw_origin(&self, pointer: egui::Pos2, display_size: Vec2) -> egui::Pos2 {
        pointer - self.hotspot.resolve(display_size) + vec2(self.offset[0], self.offset[1])
    }
}

/// Everything the host knows about a tool without looking inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub id: ToolId,
    pub name: String,
    pub kind: ToolKind,
    pub icon: Option<PathBuf>,
    pub cursor: Option<CursorSpec>,
}

impl ToolDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ToolKind) -> Self {
        Self {
            id: ToolId::new(id),
            name: name.into(),
            kind,
            icon: None,
            cursor: None,
        }
    }
}

/// How the host should draw the pointer while a tool is active.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorInfo {
    /// Brush preview; `radius` is in world pixels and scaled by zoom.
    Circle { radius: f32, color: Color32 },
    /// The tool's cursor bitmap, or `fallback` when it has none.
    Custom { fallback: CursorIcon },
    Default,
}

/// A capability a utility tool publishes into the host at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Injection {
    ScreenToCanvas,
    CanvasToScreen,
    SetZoom,
    ApplyConstraints,
    HandToolId,
}

/// Injections a camera provider must declare for the canvas to start.
pub const CAMERA_INJECTIONS: [Injection; 4] = [
    Injection::ScreenToCanvas,
    Injection::CanvasToScreen,
    Injection::SetZoom,
    Injection::ApplyConstraints,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_kind_uses_snake_case_names() {
        let kind: ToolKind = serde_json::from_str("\"context_tool\"").unwrap();
        assert_eq!(kind, ToolKind::ContextTool);
        assert!(!ToolKind::UtilityTool.has_button());
    }

    #[test]
    fn hotspot_accepts_center_or_point() {
        let spec: CursorSpec =
            serde_json::from_str(r#"{"icon": "hand.png", "hotspot": "center", "offset": [2, 3]}"#).unwrap();
        assert_eq!(spec.hotspot, Hotspot::Anchor(HotspotAnchor::Center));
        assert_eq!(spec.hotspot.resolve(vec2(32.0, 20.0)), vec2(16.0, 10.0));

        let spec: CursorSpec = serde_json::from_str(r#"{"hotspot": [4, 5]}"#).unwrap();
        assert_eq!(spec.hotspot.resolve(vec2(32.0, 32.0)), vec2(4.0, 5.0));
        assert_eq!(spec.offset, [0.0, 0.0]);
    }

    #[test]
    fn cursor_bitmap_sizing_and_origin() {
        let spec = CursorSpec {
            hotspot: Hotspot::Anchor(HotspotAnchor::Center),
            offset: [1.0, -1.0],
            ..Default::default()
        };
        assert_eq!(spec.display_size(vec2(128.0, 32.0)), vec2(64.0, 64.0));
        assert_eq!(spec.display_size(vec2(24.0, 24.0)), vec2(24.0, 24.0));
        let origin = spec.draw_origin(egui::pos2(100.0, 100.0), vec2(24.0, 24.0));
        assert_eq!(origin, egui::pos2(89.0, 87.0));
    }
}
