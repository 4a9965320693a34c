use egui::{Align2, FontId, Painter, Pos2, Rect, Stroke, pos2, vec2};

use super::*;
use crate::history::History;
use crate::state::MenuId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMenuItem {
    NewWhiteboard,
    OpenFrom,
    /// Only offered once the session has a project path.
    Save,
    SaveAs,
    Export,
    Exit,
}

impl FileMenuItem {
    pub fn label(self) -> &'static str {
        match self {
            FileMenuItem::NewWhiteboard => "New Whiteboard",
            FileMenuItem::OpenFrom => "Open From...",
            FileMenuItem::Save => "Save",
            FileMenuItem::SaveAs => "Save As... (.wbrd)",
            FileMenuItem::Export => "Export as... (.png)",
            FileMenuItem::Exit => "Exit",
        }
    }

    pub fn entries(has_project: bool) -> Vec<FileMenuItem> {
        let mut items = vec![FileMenuItem::NewWhiteboard, FileMenuItem::OpenFrom];
        if has_project {
            items.push(FileMenuItem::Save);
        }
        items.extend([FileMenuItem::SaveAs, FileMenuItem::Export, FileMenuItem::Exit]);
        items
    }
}

/// Layout and hit-testing of the top bar and its two dropdowns.
#[derive(Debug, Clone)]
pub struct TopBar {
    pub rect: Rect,
    pub file_button: Rect,
    pub history_button: Rect,
    /// Fixed-size panel the history rows scroll inside.
    pub history_menu: Rect,
}

impl TopBar {
    pub fn new(viewport: Rect) -> Self {
        let rect = Rect::from_min_size(viewport.min, vec2(viewport.width(), TOP_BAR_HEIGHT));
        let file_button = Rect::from_min_size(rect.min, vec2(MENU_BUTTON_WIDTH, TOP_BAR_HEIGHT));
        let history_button = Rect::from_min_size(
            pos2(file_button.max.x, rect.min.y),
            vec2(MENU_BUTTON_WIDTH, TOP_BAR_HEIGHT),
        );
        let history_menu = Rect::from_min_size(
            pos2(history_button.min.x, rect.max.y),
            vec2(
                HISTORY_MENU_WIDTH,
                HISTORY_ROW_HEIGHT * HISTORY_VISIBLE_ROWS as f32 + HISTORY_MENU_PADDING * 2.0,
            ),
        );
        Self {
            rect,
            file_button,
            history_button,
            history_menu,
        }
    }

    pub fn file_items(&self, has_project: bool) -> Vec<(FileMenuItem, Rect)> {
        FileMenuItem::entries(has_project)
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let min = pos2(self.file_button.min.x, self.file_button.max.y + i as f32 * FILE_ITEM_HEIGHT);
                (item, Rect::from_min_size(min, vec2(FILE_ITEM_WIDTH, FILE_ITEM_HEIGHT)))
            })
            .collect()
    }

    pub fn file_item_at(&self, pos: Pos2, has_project: bool) -> Option<FileMenuItem> {
        self.file_items(has_project)
            .into_iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(item, _)| item)
    }

    /// Rectangles where a click does not close the open top-bar menu.
    pub fn hot_zone(&self, menu: &MenuId, has_project: bool) -> Vec<Rect> {
        match menu {
            MenuId::File => std::iter::once(self.file_button)
                .chain(self.file_items(has_project).into_iter().map(|(_, r)| r))
                .collect(),
            MenuId::History => vec![self.history_button, self.history_menu],
            MenuId::Tool(_) => Vec::new(),
        }
    }

    fn history_rows_clip(&self) -> Rect {
        self.history_menu.shrink2(vec2(2.0, HISTORY_MENU_PADDING))
    }

    /// Visible history rows as `(history index, rect)`.
    pub fn history_rows(&self, scroll: usize, len: usize) -> Vec<(usize, Rect)> {
        let clip = self.history_rows_clip();
        (0..HISTORY_VISIBLE_ROWS)
            .map(|row| (row, scroll + row))
            .take_while(|(_, index)| *index < len)
            .map(|(row, index)| {
                let min = pos2(clip.min.x, clip.min.y + row as f32 * HISTORY_ROW_HEIGHT);
                (index, Rect::from_min_size(min, vec2(clip.width(), HISTORY_ROW_HEIGHT)))
            })
            .collect()
    }

    pub fn history_row_at(&self, pos: Pos2, scroll: usize, len: usize) -> Option<usize> {
        self.history_rows(scroll, len)
            .into_iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(index, _)| index)
    }

    pub fn max_history_scroll(len: usize) -> usize {
        len.saturating_sub(HISTORY_VISIBLE_ROWS)
    }

    /// New scroll offset after a wheel turn of `delta` notches over the menu.
    pub fn scroll_history(scroll: usize, delta: f32, len: usize) -> usize {
        if delta > 0.0 {
            scroll.saturating_sub(1)
        } else if delta < 0.0 {
            (scroll + 1).min(Self::max_history_scroll(len))
        } else {
            scroll
        }
    }

    pub fn paint(
        &self,
        painter: &Painter,
        menu_open: Option<&MenuId>,
        has_project: bool,
        history: &History,
        history_scroll: usize,
        mouse_pos: Pos2,
    ) {
        let font = FontId::proportional(18.0);
        painter.rect_filled(self.rect, 0.0, MENU_BG);

        for (button, label, menu) in [
            (self.file_button, "File", MenuId::File),
            (self.history_button, "History", MenuId::History),
        ] {
            if menu_open == Some(&menu) {
                painter.rect_filled(button.shrink(4.0), 10.0, MENU_ACTIVE_BG);
            }
            painter.text(button.center(), Align2::CENTER_CENTER, label, font.clone(), MENU_TEXT);
        }

        match menu_open {
            Some(MenuId::File) => {
                for (item, rect) in self.file_items(has_project) {
                    painter.rect_filled(rect, 0.0, MENU_DROPDOWN_BG);
                    let hovered = rect.contains(mouse_pos);
                    if hovered {
                        painter.rect_filled(rect.shrink(2.0), 10.0, MENU_HOVER_BG);
                    }
                    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, MENU_BORDER));
                    let color = if hovered { MENU_TEXT_HOVER } else { MENU_TEXT };
                    painter.text(
                        pos2(rect.min.x + 10.0, rect.center().y),
                        Align2::LEFT_CENTER,
                        item.label(),
                        font.clone(),
                        color,
                    );
                }
            }
            Some(MenuId::History) => {
                painter.rect_filled(self.history_menu, 0.0, MENU_DROPDOWN_BG);
                let clipped = painter.with_clip_rect(self.history_rows_clip());
                let labels: Vec<&str> = history.labels().collect();
                for (index, rect) in self.history_rows(history_scroll, labels.len()) {
                    let selected = index == history.current_index();
                    let hovered = rect.contains(mouse_pos);
                    let mut color = MENU_TEXT_MUTED;
                    if selected {
                        color = MENU_TEXT;
                        clipped.rect_filled(rect.shrink(2.0), 5.0, MENU_SELECTED_BG);
                    } else if hovered {
                        color = MENU_TEXT_HOVER;
                        clipped.rect_filled(rect.shrink(2.0), 5.0, MENU_HOVER_BG);
                    }
                    clipped.text(
                        pos2(rect.min.x + 5.0, rect.center().y),
                        Align2::LEFT_CENTER,
                        format!("{}. {}", index + 1, labels[index]),
                        FontId::proportional(16.0),
                        color,
                    );
                }
            }
            _ => {}
        }
    }
}
