//! Bounded, linear undo/redo over whole-surface snapshots.
//!
//! Snapshots are [`Surface`] clones, which share tiles with the live surface
//! until either side paints. Restoring hands out another clone, so the stored
//! entry is never aliased by later drawing.

use crate::surface::Surface;

pub const MAX_HISTORY_SIZE: usize = 30;

/// A labelled snapshot of the drawing surface.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub surface: Surface,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    current: usize,
    max_size: usize,
}

impl History {
    /// A history holding a single entry for `surface`.
    pub fn new(surface: &Surface, label: impl Into<String>, max_size: usize) -> Self {
        Self {
            entries: vec![HistoryEntry {
                surface: surface.clone(),
                label: label.into(),
            }],
            current: 0,
            max_size: max_size.max(1),
        }
    }

    /// Throw everything away and start over from `surface`.
    pub fn reset(&mut self, surface: &Surface, label: impl Into<String>) {
        self.entries.clear();
        self.entries.push(HistoryEntry {
            surface: surface.clone(),
            label: label.into(),
        });
        self.current = 0;
    }

    /// Record `surface` after the current entry. Any redo tail is discarded and
    /// the oldest entry is evicted once the bound is exceeded.
    pub fn push(&mut self, surface: &Surface, label: impl Into<String>) {
        self.entries.truncate(self.current + 1);
        self.entries.push(HistoryEntry {
            surface: surface.clone(),
            label: label.into(),
        });
        self.current = self.entries.len() - 1;

        if self.entries.len() > self.max_size {
            self.entries.remove(0);
            self.current -= 1;
        }
    }

    /// Step back. Returns the surface to restore, or `None` at the first entry.
    pub fn undo(&mut self) -> Option<Surface> {
        if self.current == 0 {
            return None;
        }
        self.current -= 1;
        Some(self.entries[self.current].surface.clone())
    }

    /// Step forward. Returns the surface to restore, or `None` at the last entry.
    pub fn redo(&mut self) -> Option<Surface> {
        if self.current + 1 >= self.entries.len() {
            return None;
        }
        self.current += 1;
        Some(self.entries[self.current].surface.clone())
    }

    /// Seek to `index`. Out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize) -> Option<Surface> {
        let entry = self.entries.get(index)?;
        self.current = index;
        Some(entry.surface.clone())
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
