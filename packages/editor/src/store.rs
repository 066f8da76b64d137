//! # Page Store
//!
//! The single owner of an authoring session's page.
//!
//! Views never hold their own copy of the tree: they read through the store,
//! write through its operations and learn about changes from
//! [`PageStore::subscribe`]. Every operation runs to completion before the
//! next one starts, and every tree edit replaces the tree with a new value.
//!
//! Failed edits (stale paths, illegal drops, unknown ids) leave the page
//! unchanged. They are logged at debug level and reported through the
//! operation's return value; nothing is raised past the store.

use std::fmt;
use std::path::Path;

use blockpage_common::{assign_levels, collect_ids, find_path, PageStorage};
use blockpage_document::{
    Block, BlockPath, BlockType, Breakpoint, FieldType, FormItem, IdGenerator, PageDocument,
};
use blockpage_styles::{resolve_styles, stylesheet, ResolvedStyle};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::clipboard::Clipboard;
use crate::drag::{DragEnd, DragSession};
use crate::errors::EditorError;
use crate::forms::{self, FieldPatch, FormError, FormPatch};
use crate::mutations::{self, BlockPatch};
use crate::reconcile::{reconcile, DragItem, DropDecision, DropRejection, DropZone};
use crate::tree::{block_at, find_block};
use crate::undo_stack::UndoStack;

const EVENT_CAPACITY: usize = 64;

/// Change notifications for subscribed views
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum StoreEvent {
    TreeChanged { version: u64 },
    FormsChanged { version: u64 },
    SelectionChanged { block_id: Option<String> },
    ActiveFormChanged { form_id: Option<String> },
    BreakpointChanged { breakpoint: Breakpoint },
    ClipboardChanged,
    DropRejected { reason: String },
    /// A user-facing validation message (e.g. duplicate field name)
    Validation { message: String },
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Seed for generated ids
    pub id_seed: String,
    /// Undo levels kept (0 = unlimited)
    pub history_limit: usize,
    pub breakpoint: Breakpoint,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            id_seed: "page".to_string(),
            history_limit: 100,
            breakpoint: Breakpoint::Default,
        }
    }
}

pub struct PageStore {
    page: PageDocument,
    version: u64,
    selected_block_id: Option<String>,
    active_form_id: Option<String>,
    breakpoint: Breakpoint,
    clipboard: Clipboard,
    ids: IdGenerator,
    history: UndoStack,
    drag: DragSession,
    events: broadcast::Sender<StoreEvent>,
}

impl PageStore {
    pub fn new(options: StoreOptions) -> Self {
        Self::from_page(PageDocument::new(), options)
    }

    /// Take ownership of an existing page. Ids already in the page are
    /// reserved so generated ids never collide with them.
    pub fn from_page(mut page: PageDocument, options: StoreOptions) -> Self {
        let mut ids = IdGenerator::from_seed(options.id_seed);
        for id in collect_ids(&page.blocks) {
            ids.observe(&id);
        }
        for block in &page.blocks {
            observe_field_ids(block, &mut ids);
        }
        for form in &page.forms {
            ids.observe(&form.id);
            for field in &form.fields {
                ids.observe(&field.id);
            }
        }
        assign_levels(&mut page.blocks);

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            page,
            version: 0,
            selected_block_id: None,
            active_form_id: None,
            breakpoint: options.breakpoint,
            clipboard: Clipboard::new(),
            ids,
            history: UndoStack::with_max_levels(options.history_limit),
            drag: DragSession::new(),
            events,
        }
    }

    pub fn load<S: PageStorage>(storage: &S, path: &Path, options: StoreOptions) -> Result<Self, EditorError> {
        let page = storage.load(path)?;
        tracing::debug!(path = %path.display(), blocks = page.blocks.len(), "loaded page");
        Ok(Self::from_page(page, options))
    }

    pub fn save<S: PageStorage>(&self, storage: &mut S, path: &Path) -> Result<(), EditorError> {
        storage.save(path, &self.page)?;
        tracing::debug!(path = %path.display(), version = self.version, "saved page");
        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // Reads

    pub fn page(&self) -> &PageDocument {
        &self.page
    }

    pub fn blocks(&self) -> &[Block] {
        &self.page.blocks
    }

    pub fn forms(&self) -> &[FormItem] {
        &self.page.forms
    }

    /// Increments on every committed change
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        find_block(&self.page.blocks, id)
    }

    /// Current path of a block, derived from the tree as it is now
    pub fn path_of(&self, id: &str) -> Option<BlockPath> {
        find_path(&self.page.blocks, id)
    }

    pub fn block_at(&self, path: &BlockPath) -> Option<&Block> {
        block_at(&self.page.blocks, path)
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    // Block operations

    /// Insert a new block of `kind`, optionally pre-populated with `data`,
    /// at `path` (end of the root list when `None`). Returns the new id.
    pub fn add_block(&mut self, kind: BlockType, data: Option<&BlockPatch>, path: Option<&BlockPath>) -> Option<String> {
        let mut block = Block::new(kind, self.ids.new_id());
        if let Some(data) = data {
            data.apply_to(&mut block);
        }
        let id = block.id.clone();
        let path = path
            .cloned()
            .unwrap_or_else(|| BlockPath::top(self.page.blocks.len()));

        match mutations::insert_block(&self.page.blocks, &path, block, &mut self.ids) {
            Ok(next) => {
                self.commit_tree(next, format!("add {}", kind));
                Some(id)
            }
            Err(err) => {
                self.rejected("add_block", &err);
                None
            }
        }
    }

    pub fn update_block(&mut self, patch: &BlockPatch, id: &str) -> bool {
        match self.try_update_block(patch, id) {
            Ok(()) => true,
            Err(err) => {
                self.rejected("update_block", &err);
                false
            }
        }
    }

    /// [`update_block`](Self::update_block) with the reason for a rejection.
    /// A `fields` patch must keep field ids and names unique; a clash is also
    /// published as [`StoreEvent::Validation`].
    pub fn try_update_block(&mut self, patch: &BlockPatch, id: &str) -> Result<(), EditorError> {
        if let Some(fields) = &patch.fields {
            if let Err(err) = forms::validate_fields(fields) {
                self.emit(StoreEvent::Validation {
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        }
        let next = mutations::update_block(&self.page.blocks, id, patch)?;
        self.commit_tree(next, "edit block".to_string());
        Ok(())
    }

    pub fn remove_block(&mut self, id: &str) -> bool {
        let Some(path) = self.path_of(id) else {
            self.rejected("remove_block", &format!("unknown block {}", id));
            return false;
        };

        match mutations::remove_block(&self.page.blocks, &path) {
            Ok(next) => {
                self.commit_tree(next, "remove block".to_string());
                self.drop_stale_selection();
                true
            }
            Err(err) => {
                self.rejected("remove_block", &err);
                false
            }
        }
    }

    /// Returns the id of the copy
    pub fn duplicate_block(&mut self, id: &str) -> Option<String> {
        let Some(path) = self.path_of(id) else {
            self.rejected("duplicate_block", &format!("unknown block {}", id));
            return None;
        };

        match mutations::duplicate_block(&self.page.blocks, &path, &mut self.ids) {
            Ok((next, copy_id)) => {
                self.commit_tree(next, "duplicate block".to_string());
                Some(copy_id)
            }
            Err(err) => {
                self.rejected("duplicate_block", &err);
                None
            }
        }
    }

    pub fn copy_block(&mut self, id: &str) -> bool {
        let Some(block) = find_block(&self.page.blocks, id) else {
            self.rejected("copy_block", &format!("unknown block {}", id));
            return false;
        };
        self.clipboard.store(block);
        self.emit(StoreEvent::ClipboardChanged);
        true
    }

    pub fn cut_block(&mut self, id: &str) -> bool {
        self.copy_block(id) && self.remove_block(id)
    }

    /// Paste a fresh-id copy of the clipboard: into the selected block when
    /// it is a container that accepts it, otherwise right after the selected
    /// block, otherwise at the end of the root list. Returns the new id.
    pub fn paste_block(&mut self) -> Option<String> {
        let Some(block) = self.clipboard.paste(&mut self.ids) else {
            self.rejected("paste_block", &"clipboard is empty");
            return None;
        };

        let path = self.paste_target(block.kind);
        let id = block.id.clone();

        match mutations::insert_block(&self.page.blocks, &path, block, &mut self.ids) {
            Ok(next) => {
                self.commit_tree(next, "paste block".to_string());
                Some(id)
            }
            Err(err) => {
                self.rejected("paste_block", &err);
                None
            }
        }
    }

    fn paste_target(&self, kind: BlockType) -> BlockPath {
        let root_end = BlockPath::top(self.page.blocks.len());

        let Some(selected) = self.selected_block_id.as_deref() else {
            return root_end;
        };
        let (Some(path), Some(block)) = (self.path_of(selected), self.block(selected)) else {
            return root_end;
        };

        if block.can_accept(kind) {
            return path.child(block.blocks.len());
        }
        path.next_sibling().unwrap_or(root_end)
    }

    // Drag and drop

    /// Commit a drop of `item` at `zone`, if legal. Returns what was decided.
    pub fn handle_drop(&mut self, zone: &DropZone, item: DragItem) -> DropDecision {
        let decision = reconcile(&self.page.blocks, &self.page.forms, zone, &item);

        let result: Result<(), String> = match (&decision, item) {
            (DropDecision::Move { from, to, .. }, _) => {
                mutations::move_block(&self.page.blocks, from, to, &mut self.ids)
                    .map(|(next, landing)| {
                        tracing::debug!(from = %from, landing = %landing, "moved block");
                        self.commit_tree(next, "move block".to_string());
                    })
                    .map_err(|e| e.to_string())
            }
            (DropDecision::Insert { to }, DragItem::Block { block, .. }) => {
                let block = block.clone_with_fresh_ids(&mut self.ids);
                mutations::insert_block(&self.page.blocks, to, block, &mut self.ids)
                    .map(|next| self.commit_tree(next, "insert block".to_string()))
                    .map_err(|e| e.to_string())
            }
            (DropDecision::MoveField { form_id, from, landing }, _) => {
                let (form_id, from, landing) = (form_id.clone(), *from, *landing);
                self.edit_form(&form_id, "move field", |form, _| forms::move_field(form, from, landing))
                    .map_err(|e| e.to_string())
            }
            (DropDecision::InsertField { form_id, index }, DragItem::Field { field, .. }) => {
                let (form_id, index) = (form_id.clone(), *index);
                self.edit_form(&form_id, "insert field", |form, ids| {
                    forms::insert_field(form, field, index, ids).map(|_| ())
                })
                .map_err(|e| e.to_string())
            }
            (DropDecision::Reject(rejection), _) => {
                self.emit(StoreEvent::DropRejected {
                    reason: rejection.to_string(),
                });
                Err(rejection.to_string())
            }
            _ => Ok(()),
        };

        match result {
            Ok(()) => decision,
            Err(reason) => {
                self.rejected("handle_drop", &reason);
                match decision {
                    DropDecision::Reject(_) => decision,
                    _ => DropDecision::Reject(DropRejection::StalePath {
                        path: zone_label(zone),
                    }),
                }
            }
        }
    }

    pub fn drag_start(&mut self, item: DragItem) {
        self.drag.start(item);
    }

    /// Pointer over a zone; returns whether releasing here would change anything
    pub fn drag_enter(&mut self, zone: DropZone) -> bool {
        self.drag.enter(zone, &self.page.blocks, &self.page.forms);
        self.drag.hover_is_legal()
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    /// Release the pointer. Outside any zone the gesture is cancelled and the
    /// page is untouched.
    pub fn drag_end(&mut self) -> DropDecision {
        match self.drag.release() {
            DragEnd::Dropped { item, zone } => self.handle_drop(&zone, item),
            DragEnd::Cancelled => DropDecision::NoOp,
        }
    }

    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    // Selection

    /// Focus a block for editing; `None` clears. Unknown ids are ignored.
    pub fn select_block(&mut self, id: Option<&str>) -> bool {
        if let Some(id) = id {
            if self.block(id).is_none() {
                self.rejected("select_block", &format!("unknown block {}", id));
                return false;
            }
        }
        let next = id.map(str::to_string);
        if next != self.selected_block_id {
            self.selected_block_id = next;
            self.emit(StoreEvent::SelectionChanged {
                block_id: self.selected_block_id.clone(),
            });
        }
        true
    }

    pub fn selected_block_id(&self) -> Option<&str> {
        self.selected_block_id.as_deref()
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected_block_id.as_deref().and_then(|id| self.block(id))
    }

    fn drop_stale_selection(&mut self) {
        let stale = self
            .selected_block_id
            .as_deref()
            .is_some_and(|id| find_block(&self.page.blocks, id).is_none());
        if stale {
            self.selected_block_id = None;
            self.emit(StoreEvent::SelectionChanged { block_id: None });
        }

        let stale_form = self
            .active_form_id
            .as_deref()
            .is_some_and(|id| !self.page.forms.iter().any(|f| f.id == id));
        if stale_form {
            self.active_form_id = None;
            self.emit(StoreEvent::ActiveFormChanged { form_id: None });
        }
    }

    // Forms

    /// Create an empty form, make it active and return its id
    pub fn add_form(&mut self) -> String {
        let id = self.ids.new_id();
        let form = FormItem::new(id.clone(), format!("Form {}", self.page.forms.len() + 1));

        let mut forms = self.page.forms.clone();
        forms.push(form);
        self.commit_forms(forms, "add form".to_string());
        self.select_form(&id);
        id
    }

    /// Patch the active form
    pub fn update_form(&mut self, patch: &FormPatch) -> bool {
        let Some(form_id) = self.active_form_id.clone() else {
            self.rejected("update_form", &"no active form");
            return false;
        };
        let patch = patch.clone();
        match self.edit_form(&form_id, "edit form", move |form, _| {
            patch.apply_to(form);
            Ok(())
        }) {
            Ok(()) => true,
            Err(err) => {
                self.rejected("update_form", &err);
                false
            }
        }
    }

    pub fn remove_form(&mut self, id: &str) -> bool {
        if !self.page.forms.iter().any(|f| f.id == id) {
            self.rejected("remove_form", &FormError::FormNotFound(id.to_string()));
            return false;
        }
        let forms = self.page.forms.iter().filter(|f| f.id != id).cloned().collect();
        self.commit_forms(forms, "remove form".to_string());
        self.drop_stale_selection();
        true
    }

    pub fn select_form(&mut self, id: &str) -> bool {
        if !self.page.forms.iter().any(|f| f.id == id) {
            self.rejected("select_form", &FormError::FormNotFound(id.to_string()));
            return false;
        }
        if self.active_form_id.as_deref() != Some(id) {
            self.active_form_id = Some(id.to_string());
            self.emit(StoreEvent::ActiveFormChanged {
                form_id: self.active_form_id.clone(),
            });
        }
        true
    }

    pub fn active_form(&self) -> Option<&FormItem> {
        let id = self.active_form_id.as_deref()?;
        self.page.forms.iter().find(|f| f.id == id)
    }

    /// Returns the new field's id
    pub fn add_field(&mut self, form_id: &str, kind: FieldType) -> Option<String> {
        let mut created = None;
        let result = self.edit_form(form_id, "add field", |form, ids| {
            created = Some(forms::add_field(form, kind, None, ids)?);
            Ok(())
        });
        match result {
            Ok(()) => created,
            Err(err) => {
                self.rejected("add_field", &err);
                None
            }
        }
    }

    /// Duplicate names are rejected: the field keeps its old name and a
    /// [`StoreEvent::Validation`] message is published.
    pub fn update_field(&mut self, form_id: &str, field_id: &str, patch: &FieldPatch) -> Result<(), FormError> {
        let result = self.edit_form(form_id, "edit field", |form, _| forms::update_field(form, field_id, patch));
        if let Err(err) = &result {
            self.rejected("update_field", err);
            if matches!(err, FormError::DuplicateFieldName(_)) {
                self.emit(StoreEvent::Validation {
                    message: err.to_string(),
                });
            }
        }
        result
    }

    pub fn remove_field(&mut self, form_id: &str, field_id: &str) -> bool {
        match self.edit_form(form_id, "remove field", |form, _| forms::remove_field(form, field_id).map(|_| ())) {
            Ok(()) => true,
            Err(err) => {
                self.rejected("remove_field", &err);
                false
            }
        }
    }

    /// Apply `edit` to a copy of one form and commit it when it succeeds
    fn edit_form<F>(&mut self, form_id: &str, description: &str, edit: F) -> Result<(), FormError>
    where
        F: FnOnce(&mut FormItem, &mut IdGenerator) -> Result<(), FormError>,
    {
        let mut forms = self.page.forms.clone();
        let form = forms
            .iter_mut()
            .find(|f| f.id == form_id)
            .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;
        edit(form, &mut self.ids)?;
        self.commit_forms(forms, description.to_string());
        Ok(())
    }

    // Styles

    pub fn set_breakpoint(&mut self, breakpoint: Breakpoint) {
        if breakpoint != self.breakpoint {
            self.breakpoint = breakpoint;
            self.emit(StoreEvent::BreakpointChanged { breakpoint });
        }
    }

    pub fn current_breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    /// Flat style of a block at the current breakpoint
    pub fn resolved_style(&self, id: &str) -> Option<ResolvedStyle> {
        self.block(id).map(|block| resolve_styles(&block.styles, self.breakpoint))
    }

    pub fn stylesheet(&self) -> String {
        stylesheet(&self.page.blocks)
    }

    // History

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.page.clone()) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.page.clone()) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    /// Run several operations as one undo step
    pub fn batch<F: FnOnce(&mut Self)>(&mut self, description: &str, f: F) {
        let start = self.version;
        self.history.begin_batch(self.page.clone(), Some(description.to_string()));
        f(self);
        self.history.end_batch(self.version != start);
    }

    fn restore(&mut self, page: PageDocument) {
        self.page = page;
        self.version += 1;
        self.emit(StoreEvent::TreeChanged { version: self.version });
        self.emit(StoreEvent::FormsChanged { version: self.version });
        self.drop_stale_selection();
    }

    // Commit plumbing

    fn commit_tree(&mut self, blocks: Vec<Block>, description: String) {
        let before = PageDocument {
            blocks: std::mem::replace(&mut self.page.blocks, blocks),
            forms: self.page.forms.clone(),
        };
        self.history.record(before, Some(description));
        self.version += 1;
        tracing::trace!(version = self.version, "tree committed");
        self.emit(StoreEvent::TreeChanged { version: self.version });
    }

    fn commit_forms(&mut self, forms: Vec<FormItem>, description: String) {
        let before = PageDocument {
            blocks: self.page.blocks.clone(),
            forms: std::mem::replace(&mut self.page.forms, forms),
        };
        self.history.record(before, Some(description));
        self.version += 1;
        self.emit(StoreEvent::FormsChanged { version: self.version });
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn rejected(&self, operation: &str, reason: &dyn fmt::Display) {
        tracing::debug!(operation, %reason, "edit rejected, page unchanged");
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

fn observe_field_ids(block: &Block, ids: &mut IdGenerator) {
    for field in &block.fields {
        ids.observe(&field.id);
    }
    for child in &block.blocks {
        observe_field_ids(child, ids);
    }
}

fn zone_label(zone: &DropZone) -> String {
    match zone {
        DropZone::Page { path } => path.to_string(),
        DropZone::Form { form_id, index } => format!("{}#{}", form_id, index),
    }
}

