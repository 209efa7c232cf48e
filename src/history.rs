//! Linear undo/redo over full diagram snapshots.
//!
//! Every committed mutation stores the diagram as it was *before* the
//! mutation. The cursor counts how many of those snapshots are "behind" the
//! live diagram; undoing the first time also parks the live diagram at the
//! tip so redo can return to it. A new commit truncates everything past the
//! cursor, so history is a line, never a tree.

use crate::diagram::Diagram;

/// Default number of snapshots kept
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Snapshot history with a cursor
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Diagram>,
    cursor: usize,
    max_history: usize,
}

impl History {
    /// Create an empty history keeping at most `max_history` snapshots
    pub fn new(max_history: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            max_history: max_history.max(1),
        }
    }

    /// Record the pre-mutation diagram of a committed mutation
    pub fn commit(&mut self, before: Diagram) {
        self.entries.truncate(self.cursor);
        self.entries.push(before);

        // Limit history size
        while self.entries.len() > self.max_history {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
    }

    /// Step back; `current` is the live diagram, kept for redo
    pub fn undo(&mut self, current: &Diagram) -> Option<Diagram> {
        if self.cursor == 0 {
            return None;
        }
        if self.cursor == self.entries.len() {
            self.entries.push(current.clone());
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Step forward to the diagram that was undone
    pub fn redo(&mut self) -> Option<Diagram> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of stored snapshots, including a parked redo tip
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
