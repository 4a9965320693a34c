#![warn(clippy::all, rust_2018_idioms)]

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use eframe_whiteboard::config::CanvasConfig;
use eframe_whiteboard::file_handler::NativeDialogs;
use eframe_whiteboard::state::CanvasSession;
use eframe_whiteboard::tools::registry::load_kit;
use eframe_whiteboard::WhiteboardApp;

const INITIAL_SIZE: [f32; 2] = [1280.0, 800.0];

#[derive(Debug, Parser)]
#[command(name = "whiteboard", version, about = "An infinite-feeling pixel whiteboard")]
struct Cli {
    /// JSON config file (world size, zoom bounds, history depth)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON tool kit manifest; overrides the one named in the config
    #[arg(long)]
    kit: Option<PathBuf>,

    /// Show the open-project dialog right after start-up
    #[arg(long)]
    open: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).
    let cli = Cli::parse();

    let config = CanvasConfig::load_or_default(cli.config.as_deref());
    let kit = load_kit(cli.kit.as_deref().or(config.kit.as_deref()));
    if !kit.skipped.is_empty() {
        log::warn!("{} tool(s) could not be loaded", kit.skipped.len());
    }

    let viewport = egui::Rect::from_min_size(egui::Pos2::ZERO, INITIAL_SIZE.into());
    let session = match CanvasSession::new(&config, viewport, kit.tools, Box::new(NativeDialogs::new())) {
        Ok(session) => session,
        Err(err) => {
            log::error!("Cannot start: {err}");
            return Err(err.into());
        }
    };
    let open_on_start = cli.open || config.open_on_start;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(INITIAL_SIZE)
            .with_min_inner_size([640.0, 480.0])
            .with_title("Whiteboard"),
        ..Default::default()
    };
    eframe::run_native(
        "eframe_whiteboard",
        native_options,
        Box::new(move |cc| Ok(Box::new(WhiteboardApp::new(cc, session, open_on_start)))),
    )?;
    Ok(())
}
