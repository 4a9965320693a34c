//! Everything a running board owns: the shared tool context, the session that
//! ties tools, chrome and files together, and the on-disk project format.

mod context;
pub(crate) mod persistence;
mod session;

pub use context::{BACKGROUND_COLOR, MenuId, SharedContext};
pub use persistence::{
    PROJECT_EXTENSION, PROJECT_VERSION, PersistenceError, PersistenceResult, ProjectFile, export_image,
    load_project, save_project,
};
pub use session::CanvasSession;
