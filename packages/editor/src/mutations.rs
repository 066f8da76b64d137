//! # Tree Mutations
//!
//! Path-addressed structural edits on a block tree.
//!
//! ## Design Principles
//!
//! 1. **Pure**: every operation takes the current tree and returns a new one;
//!    the input is never modified
//! 2. **Validated**: stale paths are detected before indexing and reported
//!    as errors instead of panicking
//! 3. **Fresh ids**: every copy that lands in the tree gets new ids for itself
//!    and all descendants
//!
//! ## Mutation Semantics
//!
//! ### Insert
//! - Splices at the terminal index, shifting later siblings by one
//! - A missing parent at the next free slot is created as an empty container
//!
//! ### Move
//! - Remove then insert
//! - Fails on self or descendant targets (would create a cycle)
//! - The destination is given in pre-removal coordinates; a removal that
//!   shifts an index on the destination path is compensated
//!
//! ### Update
//! - Located by id, not path
//! - Shallow merge; styles deep-merge per category and property

use blockpage_common::assign_levels;
use blockpage_document::{
    Block, BlockPath, BlockStyles, BlockType, FormFieldConfig, FormSubmission, IdGenerator,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::tree::{block_at, children_at_mut, find_block_mut};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Path does not match the tree: {0}")]
    InvalidPath(BlockPath),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Cannot drop a block onto itself")]
    SelfDrop,

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Block does not allow nesting: {0}")]
    NestingNotAllowed(String),

    #[error("{parent} does not accept {child}")]
    NotAccepted { parent: BlockType, child: BlockType },
}

/// Partial update for a block. `id`, `type` and children are never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<BlockStyles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_nesting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_children: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_base_styles: Option<BlockStyles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FormFieldConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<FormSubmission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    /// Merged key by key
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn styles(styles: BlockStyles) -> Self {
        Self {
            styles: Some(styles),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, block: &mut Block) {
        if let Some(content) = &self.content {
            block.content = content.clone();
        }
        if let Some(styles) = &self.styles {
            block.styles.merge(styles);
        }
        if let Some(allow_nesting) = self.allow_nesting {
            block.allow_nesting = allow_nesting;
        }
        if let Some(expected) = self.expected_children {
            block.expected_children = Some(expected);
        }
        if let Some(base) = &self.children_base_styles {
            block.children_base_styles = Some(base.clone());
        }
        if let Some(fields) = &self.fields {
            block.fields = fields.clone();
        }
        if let Some(form_data) = &self.form_data {
            block.form_data = Some(form_data.clone());
        }
        if let Some(form_id) = &self.form_id {
            block.form_id = Some(form_id.clone());
        }
        for (key, value) in &self.attributes {
            block.attributes.insert(key.clone(), value.clone());
        }
    }
}

/// Insert `block` at `path`, shifting later siblings.
pub fn insert_block(
    tree: &[Block],
    path: &BlockPath,
    block: Block,
    ids: &mut IdGenerator,
) -> Result<Vec<Block>, MutationError> {
    let mut next = tree.to_vec();
    insert_in_place(&mut next, path, block, ids)?;
    assign_levels(&mut next);
    Ok(next)
}

/// Delete the block at `path` together with its descendants
pub fn remove_block(tree: &[Block], path: &BlockPath) -> Result<Vec<Block>, MutationError> {
    let mut next = tree.to_vec();
    take_in_place(&mut next, path)?;
    assign_levels(&mut next);
    Ok(next)
}

/// Move the block at `from` to the drop position `to` (pre-removal
/// coordinates). Returns the new tree and the block's landing path.
pub fn move_block(
    tree: &[Block],
    from: &BlockPath,
    to: &BlockPath,
    ids: &mut IdGenerator,
) -> Result<(Vec<Block>, BlockPath), MutationError> {
    if from.is_root() || to.is_root() {
        return Err(MutationError::InvalidPath(BlockPath::root()));
    }
    if from == to {
        return Err(MutationError::SelfDrop);
    }
    if to.is_descendant_of(from) {
        return Err(MutationError::CycleDetected);
    }

    let landing = landing_path(from, to);

    let mut next = tree.to_vec();
    let moved = take_in_place(&mut next, from)?;
    insert_in_place(&mut next, &landing, moved, ids)?;
    assign_levels(&mut next);

    Ok((next, landing))
}

/// Where a block removed from `from` ends up when dropped at `to`.
///
/// Removing `from` shifts every later sibling in its parent list down by one.
/// If `to` runs through that list at a later index, that segment is
/// decremented.
/// A root `from` has no parent list, so `to` comes back unchanged.
pub fn landing_path(from: &BlockPath, to: &BlockPath) -> BlockPath {
    let mut segments = to.segments().to_vec();
    let Some(depth) = from.depth().checked_sub(1) else {
        return BlockPath::new(segments);
    };

    let same_list = segments.len() > depth && segments[..depth] == from.segments()[..depth];
    if same_list && from.segments()[depth] < segments[depth] {
        segments[depth] -= 1;
    }

    BlockPath::new(segments)
}

/// Insert a fresh-id copy of the block at `path` directly after it.
/// Returns the new tree and the copy's id.
pub fn duplicate_block(
    tree: &[Block],
    path: &BlockPath,
    ids: &mut IdGenerator,
) -> Result<(Vec<Block>, String), MutationError> {
    let original = block_at(tree, path).ok_or_else(|| MutationError::InvalidPath(path.clone()))?;
    let copy = original.clone_with_fresh_ids(ids);
    let copy_id = copy.id.clone();

    let (parent, index) = split(path)?;
    let mut next = tree.to_vec();
    let siblings = children_at_mut(&mut next, &parent).ok_or_else(|| MutationError::InvalidPath(path.clone()))?;
    siblings.insert(index + 1, copy);
    assign_levels(&mut next);

    Ok((next, copy_id))
}

/// Merge `patch` into the block with `id`, wherever it is
pub fn update_block(tree: &[Block], id: &str, patch: &BlockPatch) -> Result<Vec<Block>, MutationError> {
    let mut next = tree.to_vec();
    let block = find_block_mut(&mut next, id).ok_or_else(|| MutationError::BlockNotFound(id.to_string()))?;
    patch.apply_to(block);
    Ok(next)
}

fn split(path: &BlockPath) -> Result<(BlockPath, usize), MutationError> {
    match (path.parent(), path.index()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(MutationError::InvalidPath(path.clone())),
    }
}

pub(crate) fn take_in_place(tree: &mut Vec<Block>, path: &BlockPath) -> Result<Block, MutationError> {
    let (parent, index) = split(path)?;
    let siblings = children_at_mut(tree, &parent).ok_or_else(|| MutationError::InvalidPath(path.clone()))?;
    if index >= siblings.len() {
        return Err(MutationError::InvalidPath(path.clone()));
    }
    Ok(siblings.remove(index))
}

pub(crate) fn insert_in_place(
    tree: &mut Vec<Block>,
    path: &BlockPath,
    block: Block,
    ids: &mut IdGenerator,
) -> Result<(), MutationError> {
    let (parent, index) = split(path)?;
    let siblings = ensure_children(tree, &parent, block.kind, ids)?;
    if index > siblings.len() {
        return Err(MutationError::InvalidPath(path.clone()));
    }
    siblings.insert(index, block);
    Ok(())
}

/// Child list at `parent`, creating empty containers for any missing
/// ancestor that sits exactly at the next free slot of its list.
fn ensure_children<'a>(
    tree: &'a mut Vec<Block>,
    parent: &BlockPath,
    child: BlockType,
    ids: &mut IdGenerator,
) -> Result<&'a mut Vec<Block>, MutationError> {
    let segments = parent.segments();
    let mut list = tree;

    for (depth, &index) in segments.iter().enumerate() {
        if index == list.len() {
            list.push(Block::container_shell(ids.new_id()));
        }

        let node = list
            .get_mut(index)
            .ok_or_else(|| MutationError::InvalidPath(parent.clone()))?;

        if !node.allow_nesting {
            return Err(MutationError::NestingNotAllowed(node.id.clone()));
        }
        if depth + 1 == segments.len() && !node.kind.accepts(child) {
            return Err(MutationError::NotAccepted {
                parent: node.kind,
                child,
            });
        }

        list = &mut node.blocks;
    }

    Ok(list)
}
