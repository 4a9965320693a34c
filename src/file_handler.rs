use std::collections::VecDeque;
use std::path::PathBuf;

use crate::state::PROJECT_EXTENSION;

/// Where the session asks the user for file paths. Returning `None` means the
/// user cancelled.
pub trait FileDialogs {
    fn pick_open(&mut self) -> Option<PathBuf>;

    fn pick_save(&mut self) -> Option<PathBuf>;

    fn pick_export(&mut self) -> Option<PathBuf>;
}

/// Blocking native dialogs.
#[derive(Debug, Default)]
pub struct NativeDialogs {
    /// Folder of the last chosen file, used as the next starting folder.
    last_dir: Option<PathBuf>,
}

impl NativeDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    fn dialog(&self) -> rfd::FileDialog {
        let dialog = rfd::FileDialog::new();
        match &self.last_dir {
            Some(dir) => dialog.set_directory(dir),
            None => dialog,
        }
    }

    fn remember(&mut self, picked: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(dir) = picked.as_ref().and_then(|p| p.parent()) {
            self.last_dir = Some(dir.to_path_buf());
        }
        match &picked {
            Some(path) => log::info!("Picked {}", path.display()),
            None => log::info!("File dialog cancelled"),
        }
        picked
    }
}

impl FileDialogs for NativeDialogs {
    fn pick_open(&mut self) -> Option<PathBuf> {
        let picked = self
            .dialog()
            .set_title("Open Whiteboard")
            .add_filter("Whiteboard", &[PROJECT_EXTENSION])
            .pick_file();
        self.remember(picked)
    }

    fn pick_save(&mut self) -> Option<PathBuf> {
        let picked = self
            .dialog()
            .set_title("Save Whiteboard")
            .add_filter("Whiteboard", &[PROJECT_EXTENSION])
            .set_file_name(format!("untitled.{PROJECT_EXTENSION}"))
            .save_file()
            .map(|path| {
                if path.extension().is_none() {
                    path.with_extension(PROJECT_EXTENSION)
                } else {
                    path
                }
            });
        self.remember(picked)
    }

    fn pick_export(&mut self) -> Option<PathBuf> {
        let picked = self
            .dialog()
            .set_title("Export Image")
            .add_filter("PNG", &["png"])
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name("whiteboard.png")
            .save_file();
        self.remember(picked)
    }
}

/// Answers dialogs from a fixed queue; an empty queue acts as a cancel.
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    answers: VecDeque<Option<PathBuf>>,
}

impl ScriptedDialogs {
    pub fn new<I, P>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<P>>,
        P: Into<PathBuf>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
        }
    }

    pub fn push(&mut self, answer: Option<PathBuf>) {
        self.answers.push_back(answer);
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self) -> Option<PathBuf> {
        self.answers.pop_front().flatten()
    }
}

impl FileDialogs for ScriptedDialogs {
    fn pick_open(&mut self) -> Option<PathBuf> {
        self.next()
    }

    fn pick_save(&mut self) -> Option<PathBuf> {
        self.next()
    }

    fn pick_export(&mut self) -> Option<PathBuf> {
        self.next()
    }
}
