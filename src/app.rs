use std::path::PathBuf;

use crate::input::{InputEvent, InputHandler};
use crate::renderer::Renderer;
use crate::state::CanvasSession;

/// Small UI preferences kept across restarts through eframe storage.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct UiMemory {
    /// Last project opened or saved.
    pub last_project: Option<PathBuf>,
}

/// The eframe application: feeds input into the session and paints it.
pub struct WhiteboardApp {
    session: CanvasSession,
    input_handler: InputHandler,
    renderer: Renderer,
    memory: UiMemory,
    /// Events queued for the next frame, e.g. `--open`.
    pending: Vec<InputEvent>,
}

impl WhiteboardApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, session: CanvasSession, open_on_start: bool) -> Self {
        let memory: UiMemory = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        if let Some(path) = &memory.last_project {
            log::info!("Last project: {}", path.display());
        }

        // Ctrl +/- belong to the camera, not to egui's UI scale.
        cc.egui_ctx.options_mut(|options| options.zoom_with_keyboard = false);

        let mut app = Self::with_session(session);
        app.memory = memory;
        if open_on_start {
            app.pending.push(InputEvent::OpenFileRequested);
        }
        app
    }

    pub fn with_session(session: CanvasSession) -> Self {
        Self {
            session,
            input_handler: InputHandler::new(),
            renderer: Renderer::new(),
            memory: UiMemory::default(),
            pending: Vec::new(),
        }
    }

    pub fn session(&self) -> &CanvasSession {
        &self.session
    }

    pub fn memory(&self) -> &UiMemory {
        &self.memory
    }

    /// Run queued and fresh events through the session, then advance one frame.
    pub fn step(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        let queued = std::mem::take(&mut self.pending);
        for event in queued.into_iter().chain(events) {
            self.session.handle_event(&event);
        }
        self.session.update();

        if let Some(path) = self.session.project_path() {
            if self.memory.last_project.as_deref() != Some(path) {
                self.memory.last_project = Some(path.to_path_buf());
            }
        }
    }
}

impl eframe::App for WhiteboardApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.memory);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let events = self.input_handler.process_input(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.session.set_viewport(rect);
                self.step(events);

                let (_response, painter) = ui.allocate_painter(rect.size(), egui::Sense::click_and_drag());
                self.renderer.render(ctx, &painter, &mut self.session);
            });

        if ctx.input(|input| input.viewport().close_requested()) && self.session.is_running() {
            // The session decides, possibly after the unsaved-changes prompt.
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
        if !self.session.is_running() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        // The toolbar slide animates towards its target.
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::file_handler::ScriptedDialogs;
    use crate::tools::registry::{builtin_manifest, load_plugins};
    use egui::{Pos2, Rect, vec2};

    fn app(dialogs: ScriptedDialogs) -> WhiteboardApp {
        let viewport = Rect::from_min_size(Pos2::ZERO, vec2(1000.0, 700.0));
        let session = CanvasSession::new(
            &CanvasConfig::default(),
            viewport,
            load_plugins(&builtin_manifest()).tools,
            Box::new(dialogs),
        )
        .unwrap();
        WhiteboardApp::with_session(session)
    }

    #[test]
    fn saved_project_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.wbrd");
        let mut app = app(ScriptedDialogs::new([Some(path.clone())]));

        app.session.save();
        app.step([]);
        assert_eq!(app.memory().last_project, Some(path));
    }

    #[test]
    fn queued_open_request_runs_on_first_step() {
        let mut app = app(ScriptedDialogs::new([None::<PathBuf>]));
        app.pending.push(InputEvent::OpenFileRequested);
        app.step([]);
        assert!(app.pending.is_empty());
        assert!(app.session().project_path().is_none());
    }
}
