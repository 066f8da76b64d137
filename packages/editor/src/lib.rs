//! # Blockpage Editor
//!
//! Editing engine for block pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: Block tree, paths, styles, forms  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: PageStore + pure tree operations    │
//! │  - Insert/remove/move/duplicate/update      │
//! │  - Drop reconciliation + drag lifecycle     │
//! │  - Clipboard, selection, forms              │
//! │  - Snapshot undo/redo                       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ styles: Responsive values → flat CSS        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One owner**: the store holds the only copy of the page
//! 2. **Pure edits**: tree operations return a new tree or an error
//! 3. **Paths are ephemeral**: ids are stable, paths are re-derived per edit
//! 4. **Quiet failures**: an illegal edit leaves the page as it was
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blockpage_editor::{PageStore, DropZone, DragItem};
//! use blockpage_document::{BlockPath, BlockType};
//!
//! let mut store = PageStore::default();
//! let container = store.add_block(BlockType::Container, None, None).unwrap();
//! let text = store.add_block(BlockType::Text, None, Some(&"0-0".parse()?)).unwrap();
//!
//! let item = DragItem::existing_block(store.block(&text).unwrap().clone(), "0-0".parse()?);
//! store.handle_drop(&DropZone::page(BlockPath::top(1)), item);
//! ```

mod clipboard;
mod commands;
mod drag;
mod errors;
pub mod forms;
pub mod mutations;
mod reconcile;
mod store;
pub mod tree;
mod undo_stack;

pub use clipboard::Clipboard;
pub use commands::{CommandOutcome, EditCommand};
pub use drag::{DragEnd, DragSession, DragState};
pub use errors::EditorError;
pub use forms::{FieldPatch, FormError, FormPatch};
pub use mutations::{BlockPatch, MutationError};
pub use reconcile::{reconcile, DragItem, DropDecision, DropRejection, DropZone};
pub use store::{PageStore, StoreEvent, StoreOptions};
pub use undo_stack::{HistoryEntry, UndoStack};

// Re-export document types for convenience
pub use blockpage_document::{Block, BlockPath, BlockType, Breakpoint, PageDocument};
