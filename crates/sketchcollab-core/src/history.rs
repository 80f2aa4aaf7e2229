//! Bounded snapshot history for linear undo/redo.

use crate::elements::Element;

/// Maximum number of snapshots kept, the current state included.
pub const MAX_HISTORY: usize = 50;

/// Linear log of full document snapshots with a cursor.
///
/// Every entry is the state *after* a mutation; the entry under the cursor
/// mirrors the live store. The log starts with the initial state.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Vec<Element>>,
    cursor: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl History {
    /// Create a history seeded with `initial`.
    pub fn new(initial: Vec<Element>) -> Self {
        Self::with_capacity(initial, MAX_HISTORY)
    }

    /// Create a history with a custom capacity (at least 1).
    pub fn with_capacity(initial: Vec<Element>, capacity: usize) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append a snapshot, discarding the redo tail and the oldest entries
    /// beyond capacity.
    pub fn push(&mut self, snapshot: Vec<Element>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry, returning a copy of the state to restore.
    pub fn undo(&mut self) -> Option<Vec<Element>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Step forward one entry, returning a copy of the state to restore.
    pub fn redo(&mut self) -> Option<Vec<Element>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
