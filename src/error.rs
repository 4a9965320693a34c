use std::path::PathBuf;

use thiserror::Error;

use crate::tools::{ToolId, ToolKind};

/// Unrecoverable start-up failures.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error(
        "no utility tool provides the camera (screen_to_canvas, canvas_to_screen, set_zoom, apply_constraints)"
    )]
    MissingCamera,
}

/// A single kit entry that could not be loaded. The rest of the kit still loads.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to read kit manifest {path}: {source}")]
    ReadManifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed kit manifest {path}: {source}")]
    ParseManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{id}: unknown factory `{factory}`")]
    UnknownFactory { id: ToolId, factory: String },
    #[error("{id}: registry id already loaded")]
    DuplicateId { id: ToolId },
    #[error("{id}: factory `{factory}` cannot build a {kind:?}")]
    KindMismatch {
        id: ToolId,
        factory: String,
        kind: ToolKind,
    },
}
