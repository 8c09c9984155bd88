use std::collections::VecDeque;

use mailcraft::Document;

/// Number of snapshots kept when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Undo/redo stacks of whole-document snapshots.
///
/// Documents are flat arenas, so a snapshot is a single clone. The undo
/// stack drops its oldest entry once `limit` is reached.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Document>,
    redo: Vec<Document>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        History::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        History {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Remember the document as it was before a mutation. Clears redo.
    pub fn record(&mut self, previous: Document) {
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(previous);
        self.redo.clear();
    }

    /// Step back: returns the document to restore, stashing `current` for redo.
    pub fn undo(&mut self, current: Document) -> Option<Document> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: Document) -> Option<Document> {
        let next = self.redo.pop()?;
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
