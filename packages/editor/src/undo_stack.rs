//! # Undo/Redo Stack
//!
//! Tracks page history as snapshots of the whole page.
//!
//! ## Design
//!
//! - Every committed edit records the page as it was before the edit
//! - Undo swaps the current page for the last snapshot and keeps the current
//!   one for redo
//! - New edits clear the redo stack
//! - Batches group several edits into one undo step (only the state before
//!   the first edit is kept)
//!
//! Trees are immutable values between edits, so a snapshot is just the
//! previous value.

use blockpage_document::PageDocument;

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Page as it was before the step
    pub snapshot: PageDocument,

    /// Optional description of this step
    pub description: Option<String>,
}

/// Undo/redo stack for page editing
#[derive(Debug)]
pub struct UndoStack {
    /// Steps that can be undone (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Steps that can be redone (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<HistoryEntry>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record the page as it was before an edit
    pub fn record(&mut self, before: PageDocument, description: Option<String>) {
        if let Some(batch) = &mut self.current_batch {
            if batch.description.is_none() {
                batch.description = description;
            }
            return;
        }

        self.push(HistoryEntry {
            snapshot: before,
            description,
        });
    }

    /// Start a batch of edits (undone/redone together). `before` is the page
    /// as it is now.
    pub fn begin_batch(&mut self, before: PageDocument, description: Option<String>) {
        if self.current_batch.is_none() {
            self.current_batch = Some(HistoryEntry {
                snapshot: before,
                description,
            });
        }
    }

    /// End the current batch. `changed` tells whether any edit in it took
    /// effect; empty batches leave no undo step.
    pub fn end_batch(&mut self, changed: bool) {
        if let Some(batch) = self.current_batch.take() {
            if changed {
                self.push(batch);
            }
        }
    }

    pub fn in_batch(&self) -> bool {
        self.current_batch.is_some()
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Step back. Returns the page to restore, keeping `current` for redo.
    pub fn undo(&mut self, current: PageDocument) -> Option<PageDocument> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    /// Step forward again
    pub fn redo(&mut self, current: PageDocument) -> Option<PageDocument> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Description of the next undo step
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().and_then(|entry| entry.description.as_deref())
    }

    /// Description of the next redo step
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpage_document::{Block, BlockType};

    fn page(ids: &[&str]) -> PageDocument {
        PageDocument {
            blocks: ids.iter().map(|id| Block::new(BlockType::Text, *id)).collect(),
            forms: vec![],
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_then_redo() {
        let mut stack = UndoStack::new();
        stack.record(page(&[]), Some("add a".into()));

        let restored = stack.undo(page(&["a"])).unwrap();
        assert!(restored.blocks.is_empty());
        assert_eq!(stack.redo_description(), Some("add a"));

        let again = stack.redo(restored).unwrap();
        assert_eq!(again.blocks[0].id, "a");
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut stack = UndoStack::new();
        stack.record(page(&[]), None);
        stack.undo(page(&["a"]));
        assert!(stack.can_redo());

        stack.record(page(&[]), None);
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_batch_is_one_step() {
        let mut stack = UndoStack::new();
        stack.begin_batch(page(&[]), Some("paste twice".into()));
        stack.record(page(&[]), None);
        stack.record(page(&["a"]), None);
        stack.end_batch(true);

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("paste twice"));
        assert!(stack.undo(page(&["a", "b"])).unwrap().blocks.is_empty());
    }

    #[test]
    fn test_empty_batch_leaves_no_step() {
        let mut stack = UndoStack::new();
        stack.begin_batch(page(&[]), None);
        stack.end_batch(false);
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_max_levels() {
        let mut stack = UndoStack::with_max_levels(2);
        stack.record(page(&[]), Some("1".into()));
        stack.record(page(&["a"]), Some("2".into()));
        stack.record(page(&["a", "b"]), Some("3".into()));

        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo_description(), Some("3"));
    }
}
