//! The canvas session: owns the shared context, the loaded tools and the
//! chrome, and runs the per-event pipeline and the per-frame update.

use std::path::{Path, PathBuf};

use egui::{PointerButton, Pos2, Rect};

use crate::compositor::{ViewportRegion, visible_region};
use crate::config::CanvasConfig;
use crate::error::CanvasError;
use crate::file_handler::FileDialogs;
use crate::input::{Consumer, InputEvent, route_event};
use crate::panels::{ConfirmDialog, DialogChoice, FileMenuItem, PendingAction, Toolbar, TopBar};
use crate::state::persistence::{self, PersistenceResult};
use crate::state::{BACKGROUND_COLOR, SharedContext};
use crate::tools::{CameraProvider, Tool, ToolId, ToolKind, ToolType};

pub struct CanvasSession {
    pub(crate) ctx: SharedContext,
    pub(crate) tools: Vec<ToolType>,
    /// Index into `tools` of the camera provider, validated at start-up.
    camera: usize,
    hand_tool: Option<ToolId>,
    pub(crate) top_bar: TopBar,
    pub(crate) toolbar: Toolbar,
    pub(crate) dialog: ConfirmDialog,
    project_path: Option<PathBuf>,
    dialogs: Box<dyn FileDialogs>,
    running: bool,
}

impl std::fmt::Debug for CanvasSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSession")
            .field("tools", &self.tools.iter().map(|t| t.id().as_str()).collect::<Vec<_>>())
            .field("active_tool", &self.ctx.active_tool)
            .field("project_path", &self.project_path)
            .field("dirty", &self.ctx.is_dirty())
            .finish_non_exhaustive()
    }
}

impl CanvasSession {
    /// Wire up a session around the loaded tools.
    ///
    /// Fails when no tool can act as the camera; there is no built-in one.
    pub fn new(
        config: &CanvasConfig,
        viewport: Rect,
        tools: Vec<ToolType>,
        dialogs: Box<dyn FileDialogs>,
    ) -> Result<Self, CanvasError> {
        let camera = tools
            .iter()
            .position(ToolType::provides_camera)
            .ok_or(CanvasError::MissingCamera)?;
        log::info!("Camera provided by {}", tools[camera].id());

        let hand_tool = tools.iter().find(|t| t.provides_hand_id()).map(|t| t.id().clone());
        if let Some(hand) = &hand_tool {
            log::info!("Space-to-pan uses {hand}");
        }

        let mut ctx = SharedContext::new(config, viewport);
        let first_drawing = tools
            .iter()
            .find(|t| t.kind() == ToolKind::DrawingTool)
            .map(|t| t.id().clone());
        ctx.active_tool = first_drawing.clone();
        ctx.previous_tool = first_drawing;

        let toolbar = Toolbar::new(viewport);
        ctx.toolbar_y = toolbar.y();
        let mut session = Self {
            ctx,
            tools,
            camera,
            hand_tool,
            top_bar: TopBar::new(viewport),
            toolbar,
            dialog: ConfirmDialog::new(viewport),
            project_path: None,
            dialogs,
            running: true,
        };
        session.layout_tools();
        session.refresh_hotspots();
        session.apply_constraints();
        Ok(session)
    }

    pub fn context(&self) -> &SharedContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SharedContext {
        &mut self.ctx
    }

    pub fn tools(&self) -> &[ToolType] {
        &self.tools
    }

    pub fn tool(&self, id: &ToolId) -> Option<&ToolType> {
        self.tools.iter().find(|t| t.id() == id)
    }

    pub(crate) fn tool_mut(&mut self, id: &ToolId) -> Option<&mut ToolType> {
        self.tools.iter_mut().find(|t| t.id() == id)
    }

    pub fn active_tool(&self) -> Option<&ToolType> {
        self.ctx.active_tool.as_ref().and_then(|id| self.tool(id))
    }

    pub fn camera_tool(&self) -> &ToolType {
        &self.tools[self.camera]
    }

    pub fn hand_tool_id(&self) -> Option<&ToolId> {
        self.hand_tool.as_ref()
    }

    pub fn top_bar(&self) -> &TopBar {
        &self.top_bar
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn dialog(&self) -> &ConfirmDialog {
        &self.dialog
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.ctx.is_dirty()
    }

    /// False once the user has chosen to leave.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one input event through the dispatch pipeline.
    pub fn handle_event(&mut self, event: &InputEvent) -> Consumer {
        let consumer = route_event(event, self);
        log::trace!("{event:?} -> {consumer:?}");
        consumer
    }

    /// End the active tool's stroke or drag as if the primary button had
    /// been released under the pointer. Both interaction flags are clear
    /// afterwards.
    pub fn finish_interaction(&mut self) {
        if !self.ctx.is_drawing && !self.ctx.is_panning {
            return;
        }
        let release = InputEvent::PointerUp {
            pos: self.ctx.mouse_pos,
            button: PointerButton::Primary,
        };
        let CanvasSession { tools, ctx, .. } = self;
        if let Some(id) = ctx.active_tool.clone() {
            if let Some(tool) = tools.iter_mut().find(|tool| *tool.id() == id) {
                log::debug!("Finishing {id} interaction");
                tool.handle_event(&release, ctx);
            }
        }
        self.ctx.is_drawing = false;
        self.ctx.is_panning = false;
    }

    /// Per-frame state update: toolbar slide, tool layout, hot spots and
    /// camera constraints.
    pub fn update(&mut self) {
        self.refresh_canvas_mouse_pos();

        let overlay_open = self.ctx.menu_open.is_some() || self.dialog.is_open();
        let target = self.toolbar.target_y(overlay_open, self.ctx.is_drawing, self.ctx.mouse_pos);
        self.toolbar.animate(target);
        self.ctx.toolbar_y = self.toolbar.y();

        self.layout_tools();
        self.refresh_hotspots();
        self.apply_constraints();
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        if viewport == self.ctx.viewport {
            return;
        }
        log::debug!("Viewport resized to {:?}", viewport.size());
        self.ctx.viewport = viewport;
        self.top_bar = TopBar::new(viewport);
        self.toolbar.set_viewport(viewport);
        self.ctx.toolbar_y = self.toolbar.y();
        self.dialog.set_viewport(viewport);
        self.layout_tools();
        self.refresh_hotspots();
        self.apply_constraints();
    }

    fn layout_tools(&mut self) {
        let mut buttons = 0;
        for tool in self.tools.iter_mut().filter(|t| t.kind().has_button()) {
            let pos = self.toolbar.button_pos(buttons);
            tool.update_button_position(pos.x, pos.y);
            buttons += 1;
        }
        let utility = self.toolbar.utility_pos(buttons);
        for tool in self.tools.iter_mut().filter(|t| !t.kind().has_button()) {
            tool.update_button_position(utility.x, utility.y);
        }
    }

    fn refresh_hotspots(&mut self) {
        self.ctx.ui_hotspots = vec![self.top_bar.rect, self.toolbar.rect];
    }

    /// Borrow the camera provider together with the context it works on.
    fn with_camera<R>(&mut self, f: impl FnOnce(&mut dyn CameraProvider, &mut SharedContext) -> R) -> Option<R> {
        let provider = self.tools[self.camera].as_camera_provider_mut()?;
        Some(f(provider, &mut self.ctx))
    }

    pub fn screen_to_canvas(&self, pos: Pos2) -> Pos2 {
        match self.tools[self.camera].as_camera_provider() {
            Some(provider) => provider.screen_to_canvas(&self.ctx, pos),
            None => self.ctx.screen_to_canvas(pos),
        }
    }

    pub fn canvas_to_screen(&self, pos: Pos2) -> Pos2 {
        match self.tools[self.camera].as_camera_provider() {
            Some(provider) => provider.canvas_to_screen(&self.ctx, pos),
            None => self.ctx.canvas_to_screen(pos),
        }
    }

    pub fn set_zoom(&mut self, zoom: f32, pivot: Pos2) {
        self.with_camera(|camera, ctx| camera.set_zoom(ctx, zoom, pivot));
    }

    pub fn apply_constraints(&mut self) {
        self.with_camera(|camera, ctx| camera.apply_constraints(ctx));
    }

    pub(crate) fn refresh_canvas_mouse_pos(&mut self) {
        let world = self.screen_to_canvas(self.ctx.mouse_pos);
        self.ctx.set_canvas_mouse_pos(world);
    }

    /// Re-apply the current zoom about the window centre, then constrain.
    fn recenter_zoom(&mut self) {
        let zoom = self.ctx.camera.zoom;
        let center = self.ctx.viewport.center();
        self.set_zoom(zoom, center);
        self.apply_constraints();
    }

    /// Where the visible part of the surface lands, without resampling it.
    pub fn visible_region(&self) -> Option<ViewportRegion> {
        visible_region(
            self.ctx.surface(),
            self.ctx.viewport,
            |p| self.screen_to_canvas(p),
            |p| self.canvas_to_screen(p),
        )
    }

    pub fn undo(&mut self) -> bool {
        self.ctx.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.ctx.redo()
    }

    pub fn jump_to_history(&mut self, index: usize) -> bool {
        self.ctx.jump_to_history(index)
    }

    /// Blank board with fresh history and no project file.
    pub fn clear_canvas(&mut self) {
        self.ctx.clear();
        self.project_path = None;
        self.recenter_zoom();
        log::info!("New whiteboard");
    }

    /// Ask for a project file and load it. Cancelling or a failed load
    /// leaves the board untouched.
    pub fn open_file(&mut self) -> bool {
        let Some(path) = self.dialogs.pick_open() else {
            return false;
        };
        match self.open_path(&path) {
            Ok(()) => true,
            Err(err) => {
                log::error!("Failed to open {}: {err}", path.display());
                false
            }
        }
    }

    pub fn open_path(&mut self, path: &Path) -> PersistenceResult<()> {
        let surface = self.ctx.surface();
        let (width, height) = (surface.width(), surface.height());
        let surface = persistence::load_project(path)?.into_surface(width, height, BACKGROUND_COLOR)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.ctx.load_surface(surface, format!("Opened: {name}"));
        self.project_path = Some(path.to_path_buf());
        self.recenter_zoom();
        Ok(())
    }

    /// Save to the current project file, or ask for one.
    pub fn save(&mut self) -> bool {
        match self.project_path.clone() {
            Some(path) => self.save_to(&path),
            None => self.save_as(),
        }
    }

    pub fn save_as(&mut self) -> bool {
        match self.dialogs.pick_save() {
            Some(path) => self.save_to(&path),
            None => false,
        }
    }

    fn save_to(&mut self, path: &Path) -> bool {
        match persistence::save_project(self.ctx.surface(), path) {
            Ok(()) => {
                self.project_path = Some(path.to_path_buf());
                self.ctx.mark_clean();
                true
            }
            Err(err) => {
                log::error!("Failed to save {}: {err}", path.display());
                false
            }
        }
    }

    pub fn export(&mut self) -> bool {
        let Some(path) = self.dialogs.pick_export() else {
            return false;
        };
        match persistence::export_image(self.ctx.surface(), &path) {
            Ok(()) => true,
            Err(err) => {
                log::error!("Failed to export {}: {err}", path.display());
                false
            }
        }
    }

    /// New / Open / Exit go through the unsaved-changes prompt when dirty.
    pub fn request(&mut self, action: PendingAction) {
        // A stroke in progress counts as work to keep.
        self.finish_interaction();
        if self.ctx.is_dirty() {
            self.dialog.open(action);
        } else {
            self.perform(action);
        }
    }

    fn perform(&mut self, action: PendingAction) {
        match action {
            PendingAction::NewCanvas => self.clear_canvas(),
            PendingAction::OpenFile => {
                self.open_file();
            }
            PendingAction::Exit => {
                log::info!("Exiting");
                self.running = false;
            }
        }
    }

    pub fn perform_file_item(&mut self, item: FileMenuItem) {
        log::debug!("File menu: {}", item.label());
        match item {
            FileMenuItem::NewWhiteboard => self.request(PendingAction::NewCanvas),
            FileMenuItem::OpenFrom => self.request(PendingAction::OpenFile),
            FileMenuItem::Save => {
                self.save();
            }
            FileMenuItem::SaveAs => {
                self.save_as();
            }
            FileMenuItem::Export => {
                self.export();
            }
            FileMenuItem::Exit => self.request(PendingAction::Exit),
        }
    }

    /// Apply the user's answer to the unsaved-changes prompt.
    pub fn resolve_dialog(&mut self, choice: DialogChoice) {
        let Some(action) = self.dialog.pending() else {
            return;
        };
        log::debug!("Dialog {choice:?} for {action:?}");
        match choice {
            DialogChoice::Cancel => self.dialog.close(),
            DialogChoice::DontSave => {
                self.dialog.close();
                self.perform(action);
            }
            DialogChoice::Save => {
                self.save();
                // Only proceed once the work is actually on disk.
                if !self.ctx.is_dirty() {
                    self.dialog.close();
                    self.perform(action);
                }
            }
        }
    }
}
