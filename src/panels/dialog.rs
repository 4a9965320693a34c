use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, pos2, vec2};

const DIALOG_SIZE: egui::Vec2 = vec2(500.0, 200.0);
const BUTTON_SIZE: egui::Vec2 = vec2(140.0, 40.0);
const BUTTON_GAP: f32 = 10.0;

/// What the user was trying to do when the unsaved-changes prompt appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    NewCanvas,
    OpenFile,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    Save,
    DontSave,
    Cancel,
}

impl DialogChoice {
    fn label(self) -> &'static str {
        match self {
            DialogChoice::Save => "Save",
            DialogChoice::DontSave => "Don't Save",
            DialogChoice::Cancel => "Cancel",
        }
    }

    fn colors(self) -> (Color32, Color32) {
        match self {
            DialogChoice::Save => (Color32::from_rgb(0, 150, 0), Color32::WHITE),
            DialogChoice::DontSave => (Color32::from_rgb(150, 150, 150), Color32::BLACK),
            DialogChoice::Cancel => (Color32::from_rgb(200, 0, 0), Color32::WHITE),
        }
    }
}

/// Modal "unsaved changes" prompt. While open it owns every input event.
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pending: Option<PendingAction>,
    rect: Rect,
    viewport: Rect,
}

impl ConfirmDialog {
    pub fn new(viewport: Rect) -> Self {
        Self {
            pending: None,
            rect: Rect::from_center_size(viewport.center(), DIALOG_SIZE),
            viewport,
        }
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.rect = Rect::from_center_size(viewport.center(), DIALOG_SIZE);
    }

    pub fn open(&mut self, action: PendingAction) {
        log::debug!("Confirm dialog opened for {action:?}");
        self.pending = Some(action);
    }

    pub fn close(&mut self) {
        self.pending = None;
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn buttons(&self) -> [(DialogChoice, Rect); 3] {
        let total = BUTTON_SIZE.x * 3.0 + BUTTON_GAP * 2.0;
        let x = self.rect.center().x - total / 2.0;
        let y = self.rect.max.y - BUTTON_SIZE.y - 20.0;
        let at = |i: f32| Rect::from_min_size(pos2(x + i * (BUTTON_SIZE.x + BUTTON_GAP), y), BUTTON_SIZE);
        [
            (DialogChoice::Save, at(0.0)),
            (DialogChoice::DontSave, at(1.0)),
            (DialogChoice::Cancel, at(2.0)),
        ]
    }

    pub fn button_at(&self, pos: Pos2) -> Option<DialogChoice> {
        self.buttons()
            .into_iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(choice, _)| choice)
    }

    pub fn paint(&self, painter: &Painter) {
        if !self.is_open() {
            return;
        }
        painter.rect_filled(self.viewport, 0.0, Color32::from_black_alpha(180));
        painter.rect_filled(self.rect, 5.0, Color32::from_gray(230));
        painter.rect_stroke(self.rect, 5.0, Stroke::new(2.0, Color32::from_gray(100)));
        painter.text(
            pos2(self.rect.center().x, self.rect.min.y + 20.0),
            Align2::CENTER_TOP,
            "You have unsaved changes!",
            FontId::proportional(26.0),
            Color32::BLACK,
        );
        painter.text(
            pos2(self.rect.center().x, self.rect.min.y + 60.0),
            Align2::CENTER_TOP,
            "What would you like to do?",
            FontId::proportional(20.0),
            Color32::from_gray(50),
        );
        for (choice, rect) in self.buttons() {
            let (fill, text) = choice.colors();
            painter.rect_filled(rect, 4.0, fill);
            painter.text(rect.center(), Align2::CENTER_CENTER, choice.label(), FontId::proportional(18.0), text);
        }
    }
}
