//! Startup-time tool registry.
//!
//! A kit manifest lists tools by registry id and names the factory that builds
//! each one. Factories form a closed set; an entry that cannot be built is
//! logged and skipped without affecting the others.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PluginError;
use crate::tools::{
    CursorSpec, Hotspot, HotspotAnchor, Tool, ToolDescriptor, ToolId, ToolKind, ToolType, new_camera_tool,
    new_color_palette_tool, new_eraser_tool, new_hand_tool, new_pen_tool,
};

pub const BUILTIN_KIT: &str = "@builtins";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub registry_id: ToolId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub factory: String,
    #[serde(default)]
    pub icon: Option<PathBuf>,
    #[serde(default)]
    pub cursor: Option<CursorSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitManifest {
    pub kit: String,
    pub tools: Vec<ManifestEntry>,
}

/// Tools that loaded, plus the entries that were skipped and why.
#[derive(Debug, Default)]
pub struct LoadedKit {
    pub tools: Vec<ToolType>,
    pub skipped: Vec<PluginError>,
}

fn entry(id: &str, name: &str, kind: ToolKind, factory: &str) -> ManifestEntry {
    ManifestEntry {
        registry_id: ToolId::new(id),
        name: name.to_string(),
        kind,
        factory: factory.to_string(),
        icon: None,
        cursor: None,
    }
}

/// The kit compiled into the binary.
pub fn builtin_manifest() -> KitManifest {
    let mut hand = entry("@builtins.tools.Hand", "Hand", ToolKind::DrawingTool, "hand");
    hand.cursor = Some(CursorSpec {
        hotspot: Hotspot::Anchor(HotspotAnchor::Center),
        ..Default::default()
    });
    KitManifest {
        kit: BUILTIN_KIT.to_string(),
        tools: vec![
            entry("@builtins.tools.Pen", "Pen", ToolKind::DrawingTool, "pen"),
            entry("@builtins.tools.Eraser", "Eraser", ToolKind::DrawingTool, "eraser"),
            entry("@builtins.tools.ColorPalette", "Color", ToolKind::ContextTool, "color_palette"),
            hand,
            entry("@builtins.utils.zoom", "Zoom", ToolKind::UtilityTool, "camera"),
        ],
    }
}

/// Read a manifest; relative icon and cursor paths resolve against its folder.
pub fn load_manifest(path: &Path) -> Result<KitManifest, PluginError> {
    let text = fs::read_to_string(path).map_err(|source| PluginError::ReadManifest {
        path: path.to_path_buf(),
        source,
    })?;
    let mut manifest: KitManifest = serde_json::from_str(&text).map_err(|source| PluginError::ParseManifest {
        path: path.to_path_buf(),
        source,
    })?;

    let base = path.parent().unwrap_or(Path::new(""));
    let resolve = |p: &mut PathBuf| {
        if p.is_relative() {
            *p = base.join(&*p);
        }
    };
    for tool in &mut manifest.tools {
        if let Some(icon) = tool.icon.as_mut() {
            resolve(icon);
        }
        if let Some(icon) = tool.cursor.as_mut().and_then(|c| c.icon.as_mut()) {
            resolve(icon);
        }
    }
    Ok(manifest)
}

type Factory = fn(ToolDescriptor) -> ToolType;

fn factory(name: &str) -> Option<(Factory, &'static [ToolKind])> {
    const DRAWING: &[ToolKind] = &[ToolKind::DrawingTool];
    match name {
        "pen" => Some((new_pen_tool as Factory, DRAWING)),
        "eraser" => Some((new_eraser_tool as Factory, DRAWING)),
        "hand" => Some((new_hand_tool as Factory, DRAWING)),
        "color_palette" => Some((new_color_palette_tool as Factory, &[ToolKind::ContextTool, ToolKind::DrawingTool])),
        "camera" => Some((new_camera_tool as Factory, &[ToolKind::UtilityTool])),
        _ => None,
    }
}

/// Build one tool from its manifest entry.
pub fn build_tool(entry: &ManifestEntry) -> Result<ToolType, PluginError> {
    let (build, kinds) = factory(&entry.factory).ok_or_else(|| PluginError::UnknownFactory {
        id: entry.registry_id.clone(),
        factory: entry.factory.clone(),
    })?;
    if !kinds.contains(&entry.kind) {
        return Err(PluginError::KindMismatch {
            id: entry.registry_id.clone(),
            factory: entry.factory.clone(),
            kind: entry.kind,
        });
    }
    let mut descriptor = ToolDescriptor::new(entry.registry_id.as_str(), entry.name.clone(), entry.kind);
    descriptor.icon = entry.icon.clone();
    descriptor.cursor = entry.cursor.clone();
    Ok(build(descriptor))
}

/// Build every entry of `manifest` in order, skipping the ones that fail.
pub fn load_plugins(manifest: &KitManifest) -> LoadedKit {
    let mut loaded = LoadedKit::default();
    let mut seen = HashSet::new();

    for entry in &manifest.tools {
        let result = if seen.contains(&entry.registry_id) {
            Err(PluginError::DuplicateId {
                id: entry.registry_id.clone(),
            })
        } else {
            build_tool(entry)
        };
        match result {
            Ok(tool) => {
                log::info!("Loaded tool {} ({:?}) from {}", tool.id(), tool.kind(), manifest.kit);
                seen.insert(entry.registry_id.clone());
                loaded.tools.push(tool);
            }
            Err(err) => {
                log::warn!("Skipping tool: {err}");
                loaded.skipped.push(err);
            }
        }
    }
    loaded
}

/// Load the kit at `path`, or the built-in kit when there is none or it
/// cannot be read.
pub fn load_kit(path: Option<&Path>) -> LoadedKit {
    let manifest = match path.map(load_manifest) {
        Some(Ok(manifest)) => manifest,
        Some(Err(err)) => {
            log::error!("{err}; falling back to the built-in kit");
            builtin_manifest()
        }
        None => builtin_manifest(),
    };
    load_plugins(&manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_kit_loads_every_tool() {
        let loaded = load_plugins(&builtin_manifest());
        assert!(loaded.skipped.is_empty());
        let ids: Vec<&str> = loaded.tools.iter().map(|t| t.id().as_str()).collect();
        assert_eq!(
            ids,
            [
                "@builtins.tools.Pen",
                "@builtins.tools.Eraser",
                "@builtins.tools.ColorPalette",
                "@builtins.tools.Hand",
                "@builtins.utils.zoom",
            ]
        );
        assert_eq!(loaded.tools.iter().filter(|t| t.provides_camera()).count(), 1);
    }

    #[test]
    fn bad_entries_are_skipped_individually() {
        let mut manifest = builtin_manifest();
        manifest.tools.insert(0, entry("x.laser", "Laser", ToolKind::DrawingTool, "laser"));
        manifest.tools.push(entry("@builtins.tools.Pen", "Pen again", ToolKind::DrawingTool, "pen"));
        manifest.tools.push(entry("x.cam", "Cam", ToolKind::DrawingTool, "camera"));

        let loaded = load_plugins(&manifest);
        assert_eq!(loaded.tools.len(), 5);
        assert!(matches!(loaded.skipped[0], PluginError::UnknownFactory { .. }));
        assert!(matches!(loaded.skipped[1], PluginError::DuplicateId { .. }));
        assert!(matches!(loaded.skipped[2], PluginError::KindMismatch { .. }));
    }

    #[test]
    fn manifest_paths_resolve_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kit.json");
        fs::write(
            &path,
            r#"{
                "kit": "mine",
                "tools": [
                    {"registryId": "mine.pen", "name": "Pen", "type": "drawing_tool",
                     "factory": "pen", "icon": "icons/pen.png"},
                    {"registryId": "mine.hand", "name": "Hand", "type": "drawing_tool",
                     "factory": "hand", "cursor": {"icon": "hand.png", "hotspot": "center"}}
                ]
            }"#,
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.tools[0].icon, Some(dir.path().join("icons/pen.png")));
        let cursor = manifest.tools[1].cursor.as_ref().unwrap();
        assert_eq!(cursor.icon, Some(dir.path().join("hand.png")));
    }

    #[test]
    fn unreadable_manifest_falls_back_to_builtins() {
        let loaded = load_kit(Some(Path::new("/no/such/kit.json")));
        assert_eq!(loaded.tools.len(), builtin_manifest().tools.len());
    }
}
