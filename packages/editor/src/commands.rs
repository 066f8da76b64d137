//! Serializable edit commands.
//!
//! Every store operation has a command form so edits can be scripted,
//! replayed from a file or sent over a wire. Commands carry ids and paths
//! only; they are resolved against the tree at dispatch time.

use blockpage_document::{BlockPath, BlockType, Breakpoint, FieldType};
use serde::{Deserialize, Serialize};

use crate::forms::{FieldPatch, FormPatch};
use crate::mutations::BlockPatch;
use crate::reconcile::{DragItem, DropDecision, DropZone};
use crate::store::PageStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditCommand {
    AddBlock {
        #[serde(rename = "type")]
        kind: BlockType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<BlockPatch>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<BlockPath>,
    },
    UpdateBlock {
        id: String,
        patch: BlockPatch,
    },
    RemoveBlock {
        id: String,
    },
    DuplicateBlock {
        id: String,
    },
    CutBlock {
        id: String,
    },
    CopyBlock {
        id: String,
    },
    PasteBlock,
    SelectBlock {
        #[serde(default)]
        id: Option<String>,
    },
    /// Move an existing block to the drop zone at `to`
    MoveBlock {
        id: String,
        to: BlockPath,
    },
    DropItem {
        zone: DropZone,
        item: DragItem,
    },
    SetBreakpoint {
        breakpoint: Breakpoint,
    },
    AddForm,
    UpdateForm {
        patch: FormPatch,
    },
    RemoveForm {
        id: String,
    },
    SelectForm {
        id: String,
    },
    #[serde(rename_all = "camelCase")]
    AddField {
        form_id: String,
        #[serde(rename = "type")]
        kind: FieldType,
    },
    #[serde(rename_all = "camelCase")]
    UpdateField {
        form_id: String,
        field_id: String,
        patch: FieldPatch,
    },
    #[serde(rename_all = "camelCase")]
    RemoveField {
        form_id: String,
        field_id: String,
    },
    Undo,
    Redo,
}

/// Result of dispatching one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CommandOutcome {
    Applied {
        #[serde(skip_serializing_if = "Option::is_none")]
        created: Option<String>,
    },
    Unchanged,
    Rejected {
        reason: String,
    },
}

impl CommandOutcome {
    fn applied() -> Self {
        CommandOutcome::Applied { created: None }
    }

    fn created(id: Option<String>, op: &str) -> Self {
        match id {
            Some(id) => CommandOutcome::Applied { created: Some(id) },
            None => CommandOutcome::rejected(op),
        }
    }

    fn from_flag(ok: bool, op: &str) -> Self {
        if ok {
            CommandOutcome::applied()
        } else {
            CommandOutcome::rejected(op)
        }
    }

    fn rejected(op: &str) -> Self {
        CommandOutcome::Rejected {
            reason: format!("{} had no effect", op),
        }
    }

    fn from_drop(decision: DropDecision) -> Self {
        match decision {
            DropDecision::NoOp => CommandOutcome::Unchanged,
            DropDecision::Reject(rejection) => CommandOutcome::Rejected {
                reason: rejection.to_string(),
            },
            _ => CommandOutcome::applied(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied { .. })
    }
}

impl PageStore {
    pub fn dispatch(&mut self, command: EditCommand) -> CommandOutcome {
        tracing::trace!(?command, "dispatch");

        match command {
            EditCommand::AddBlock { kind, data, path } => {
                CommandOutcome::created(self.add_block(kind, data.as_ref(), path.as_ref()), "addBlock")
            }
            EditCommand::UpdateBlock { id, patch } => match self.try_update_block(&patch, &id) {
                Ok(()) => CommandOutcome::applied(),
                Err(err) => CommandOutcome::Rejected {
                    reason: err.to_string(),
                },
            },
            EditCommand::RemoveBlock { id } => CommandOutcome::from_flag(self.remove_block(&id), "removeBlock"),
            EditCommand::DuplicateBlock { id } => {
                CommandOutcome::created(self.duplicate_block(&id), "duplicateBlock")
            }
            EditCommand::CutBlock { id } => CommandOutcome::from_flag(self.cut_block(&id), "cutBlock"),
            EditCommand::CopyBlock { id } => CommandOutcome::from_flag(self.copy_block(&id), "copyBlock"),
            EditCommand::PasteBlock => CommandOutcome::created(self.paste_block(), "pasteBlock"),
            EditCommand::SelectBlock { id } => {
                CommandOutcome::from_flag(self.select_block(id.as_deref()), "selectBlock")
            }
            EditCommand::MoveBlock { id, to } => {
                let item = match (self.block(&id), self.path_of(&id)) {
                    (Some(block), Some(origin)) => DragItem::existing_block(block.clone(), origin),
                    _ => {
                        return CommandOutcome::Rejected {
                            reason: format!("Block not found: {}", id),
                        }
                    }
                };
                CommandOutcome::from_drop(self.handle_drop(&DropZone::page(to), item))
            }
            EditCommand::DropItem { zone, item } => CommandOutcome::from_drop(self.handle_drop(&zone, item)),
            EditCommand::SetBreakpoint { breakpoint } => {
                if breakpoint == self.current_breakpoint() {
                    return CommandOutcome::Unchanged;
                }
                self.set_breakpoint(breakpoint);
                CommandOutcome::applied()
            }
            EditCommand::AddForm => CommandOutcome::created(Some(self.add_form()), "addForm"),
            EditCommand::UpdateForm { patch } => CommandOutcome::from_flag(self.update_form(&patch), "updateForm"),
            EditCommand::RemoveForm { id } => CommandOutcome::from_flag(self.remove_form(&id), "removeForm"),
            EditCommand::SelectForm { id } => CommandOutcome::from_flag(self.select_form(&id), "selectForm"),
            EditCommand::AddField { form_id, kind } => {
                CommandOutcome::created(self.add_field(&form_id, kind), "addField")
            }
            EditCommand::UpdateField {
                form_id,
                field_id,
                patch,
            } => match self.update_field(&form_id, &field_id, &patch) {
                Ok(()) => CommandOutcome::applied(),
                Err(err) => CommandOutcome::Rejected {
                    reason: err.to_string(),
                },
            },
            EditCommand::RemoveField { form_id, field_id } => {
                CommandOutcome::from_flag(self.remove_field(&form_id, &field_id), "removeField")
            }
            EditCommand::Undo => CommandOutcome::from_flag(self.undo(), "undo"),
            EditCommand::Redo => CommandOutcome::from_flag(self.redo(), "redo"),
        }
    }

    /// Dispatch a sequence, stopping at nothing; returns one outcome per command
    pub fn dispatch_all(&mut self, commands: impl IntoIterator<Item = EditCommand>) -> Vec<CommandOutcome> {
        commands.into_iter().map(|command| self.dispatch(command)).collect()
    }
}
