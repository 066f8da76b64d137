//! # Drop Reconciliation
//!
//! Decides what a drop does before anything is mutated.
//!
//! A drop zone sits *between* blocks: zone `n` in a list means "before the
//! block currently at index `n`". For a block dragged from index `s`, zones
//! `s` and `s + 1` in the same list both put it back where it already is, so
//! they are no-ops. Everything here is evaluated against the current tree;
//! drag payload paths are re-derived from the dragged id first.

use blockpage_common::find_path;
use blockpage_document::{Block, BlockPath, BlockType, FormFieldConfig, FormItem};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mutations::landing_path;

/// What is being dragged. Exists only for one drag gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DragItem {
    /// A block; `origin` is `None` for a new block from the palette
    Block {
        block: Block,
        #[serde(default)]
        origin: Option<BlockPath>,
    },
    /// A form field; `origin` is its index in the form, `None` when new
    Field {
        field: FormFieldConfig,
        #[serde(default)]
        origin: Option<usize>,
    },
}

impl DragItem {
    pub fn new_block(block: Block) -> Self {
        DragItem::Block { block, origin: None }
    }

    pub fn existing_block(block: Block, origin: BlockPath) -> Self {
        DragItem::Block {
            block,
            origin: Some(origin),
        }
    }
}

/// Where the item is released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tree", rename_all = "camelCase")]
pub enum DropZone {
    Page {
        path: BlockPath,
    },
    #[serde(rename_all = "camelCase")]
    Form {
        form_id: String,
        index: usize,
    },
}

impl DropZone {
    pub fn page(path: BlockPath) -> Self {
        DropZone::Page { path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum DropRejection {
    SelfDrop,
    IntoDescendant,
    NotAccepted { parent: BlockType, child: BlockType },
    /// Field payload over a page zone or block payload over a form zone
    WrongTree,
    StalePath { path: String },
    UnknownForm { form_id: String },
}

impl fmt::Display for DropRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropRejection::SelfDrop => write!(f, "cannot drop onto itself"),
            DropRejection::IntoDescendant => write!(f, "cannot drop into its own descendant"),
            DropRejection::NotAccepted { parent, child } => write!(f, "{} does not accept {}", parent, child),
            DropRejection::WrongTree => write!(f, "item does not belong in this tree"),
            DropRejection::StalePath { path } => write!(f, "drop target {:?} no longer exists", path),
            DropRejection::UnknownForm { form_id } => write!(f, "unknown form {}", form_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropDecision {
    /// Existing block changes position
    Move {
        from: BlockPath,
        to: BlockPath,
        landing: BlockPath,
    },
    /// New block from the palette
    Insert { to: BlockPath },
    MoveField {
        form_id: String,
        from: usize,
        landing: usize,
    },
    InsertField { form_id: String, index: usize },
    /// Dropped where it already is
    NoOp,
    Reject(DropRejection),
}

impl DropDecision {
    /// Whether committing the drop would change anything
    pub fn is_effective(&self) -> bool {
        !matches!(self, DropDecision::NoOp | DropDecision::Reject(_))
    }
}

pub fn reconcile(tree: &[Block], forms: &[FormItem], zone: &DropZone, item: &DragItem) -> DropDecision {
    match (zone, item) {
        (DropZone::Page { path }, DragItem::Block { block, origin }) => {
            reconcile_block(tree, path, block, origin.as_ref())
        }
        (DropZone::Form { form_id, index }, DragItem::Field { field, origin }) => {
            match forms.iter().find(|form| &form.id == form_id) {
                Some(form) => reconcile_field(form, *index, field, *origin),
                None => DropDecision::Reject(DropRejection::UnknownForm {
                    form_id: form_id.clone(),
                }),
            }
        }
        _ => DropDecision::Reject(DropRejection::WrongTree),
    }
}

fn reconcile_block(tree: &[Block], to: &BlockPath, block: &Block, origin: Option<&BlockPath>) -> DropDecision {
    let (Some(parent), Some(drop_index)) = (to.parent(), to.index()) else {
        return stale(to);
    };

    let from = match origin {
        None => None,
        // The payload path was captured at drag start; trust the id instead.
        Some(_) => match find_path(tree, &block.id) {
            Some(current) => Some(current),
            None => return stale(to),
        },
    };

    if let Some(from) = &from {
        if from == to {
            return DropDecision::Reject(DropRejection::SelfDrop);
        }
        if to.is_descendant_of(from) {
            return DropDecision::Reject(DropRejection::IntoDescendant);
        }
        if from.parent().as_ref() == Some(&parent) && from.index().map(|i| i + 1) == Some(drop_index) {
            return DropDecision::NoOp;
        }
    }

    if let Err(rejection) = check_target(tree, to, &parent, drop_index, block.kind) {
        return DropDecision::Reject(rejection);
    }

    match from {
        Some(from) => DropDecision::Move {
            landing: landing_path(&from, to),
            to: to.clone(),
            from,
        },
        None => DropDecision::Insert { to: to.clone() },
    }
}

/// The slot at `to` must exist (or be the next free slot) and its parent
/// must accept `child`. A missing parent at the next free slot of its list is
/// fine: insertion creates an empty container there.
fn check_target(
    tree: &[Block],
    to: &BlockPath,
    parent: &BlockPath,
    drop_index: usize,
    child: BlockType,
) -> Result<(), DropRejection> {
    let mut list: &[Block] = tree;
    let mut holder: Option<&Block> = None;

    for &index in parent.segments() {
        match list.get(index) {
            Some(block) => {
                if !block.allow_nesting {
                    return Err(DropRejection::NotAccepted {
                        parent: block.kind,
                        child,
                    });
                }
                holder = Some(block);
                list = &block.blocks;
            }
            // Would become a new container; everything below it is empty.
            None if index == list.len() => {
                holder = None;
                list = &[];
            }
            None => return Err(DropRejection::StalePath { path: to.to_string() }),
        }
    }

    if let Some(parent_block) = holder {
        if !parent_block.can_accept(child) {
            return Err(DropRejection::NotAccepted {
                parent: parent_block.kind,
                child,
            });
        }
    }

    if drop_index > list.len() {
        return Err(DropRejection::StalePath { path: to.to_string() });
    }

    Ok(())
}

fn reconcile_field(form: &FormItem, index: usize, field: &FormFieldConfig, origin: Option<usize>) -> DropDecision {
    let from = match origin {
        None => None,
        Some(_) => match form.fields.iter().position(|f| f.id == field.id) {
            Some(current) => Some(current),
            None => return DropDecision::Reject(DropRejection::StalePath { path: index.to_string() }),
        },
    };

    if index > form.fields.len() {
        return DropDecision::Reject(DropRejection::StalePath { path: index.to_string() });
    }

    match from {
        Some(from) if from == index => DropDecision::Reject(DropRejection::SelfDrop),
        Some(from) if from + 1 == index => DropDecision::NoOp,
        Some(from) => DropDecision::MoveField {
            form_id: form.id.clone(),
            from,
            landing: if from < index { index - 1 } else { index },
        },
        None => DropDecision::InsertField {
            form_id: form.id.clone(),
            index,
        },
    }
}

fn stale(path: &BlockPath) -> DropDecision {
    DropDecision::Reject(DropRejection::StalePath { path: path.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpage_document::FieldType;

    fn p(s: &str) -> BlockPath {
        s.parse().unwrap()
    }

    fn tree() -> Vec<Block> {
        let mut container = Block::new(BlockType::Container, "c");
        container.blocks.push(Block::new(BlockType::Text, "t1"));
        container.blocks.push(Block::new(BlockType::Text, "t2"));
        container.blocks.push(Block::new(BlockType::Text, "t3"));
        vec![container, Block::new(BlockType::Image, "img")]
    }

    fn dragging(tree: &[Block], path: &str) -> DragItem {
        let path = p(path);
        let block = crate::tree::block_at(tree, &path).unwrap().clone();
        DragItem::existing_block(block, path)
    }

    fn decide(tree: &[Block], item: &DragItem, to: &str) -> DropDecision {
        reconcile(tree, &[], &DropZone::page(p(to)), item)
    }

    #[test]
    fn test_self_drop_rejected() {
        let tree = tree();
        let item = dragging(&tree, "0-1");
        assert_eq!(decide(&tree, &item, "0-1"), DropDecision::Reject(DropRejection::SelfDrop));
    }

    #[test]
    fn test_adjacent_drop_is_noop() {
        let tree = tree();
        let item = dragging(&tree, "0-1");
        assert_eq!(decide(&tree, &item, "0-2"), DropDecision::NoOp);
        assert!(!decide(&tree, &item, "0-2").is_effective());
    }

    #[test]
    fn test_non_adjacent_same_parent_moves() {
        let tree = tree();
        let item = dragging(&tree, "0-0");
        assert_eq!(
            decide(&tree, &item, "0-3"),
            DropDecision::Move {
                from: p("0-0"),
                to: p("0-3"),
                landing: p("0-2"),
            }
        );

        let item = dragging(&tree, "0-2");
        assert_eq!(
            decide(&tree, &item, "0-0"),
            DropDecision::Move {
                from: p("0-2"),
                to: p("0-0"),
                landing: p("0-0"),
            }
        );
    }

    #[test]
    fn test_descendant_drop_rejected() {
        let tree = tree();
        let item = dragging(&tree, "0");
        assert_eq!(decide(&tree, &item, "0-1"), DropDecision::Reject(DropRejection::IntoDescendant));
    }

    #[test]
    fn test_leaf_parent_rejects() {
        let tree = tree();
        let item = dragging(&tree, "0-0");
        assert_eq!(
            decide(&tree, &item, "1-0"),
            DropDecision::Reject(DropRejection::NotAccepted {
                parent: BlockType::Image,
                child: BlockType::Text,
            })
        );
    }

    #[test]
    fn test_stale_targets_rejected() {
        let tree = tree();
        let item = DragItem::new_block(Block::new(BlockType::Text, "new"));
        assert!(matches!(
            decide(&tree, &item, "0-9"),
            DropDecision::Reject(DropRejection::StalePath { .. })
        ));
        assert!(matches!(
            decide(&tree, &item, "7-0"),
            DropDecision::Reject(DropRejection::StalePath { .. })
        ));
    }

    #[test]
    fn test_palette_insert_into_new_slot() {
        let tree = tree();
        let item = DragItem::new_block(Block::new(BlockType::Text, "new"));
        assert_eq!(decide(&tree, &item, "2"), DropDecision::Insert { to: p("2") });
        // Brand-new container at root slot 2
        assert_eq!(decide(&tree, &item, "2-0"), DropDecision::Insert { to: p("2-0") });
    }

    #[test]
    fn test_stale_origin_uses_current_position() {
        let tree = tree();
        let block = crate::tree::block_at(&tree, &p("0-2")).unwrap().clone();
        // Origin recorded before an earlier edit shifted things
        let item = DragItem::existing_block(block, p("0-0"));
        assert_eq!(decide(&tree, &item, "0-3"), DropDecision::NoOp);
    }

    #[test]
    fn test_removed_origin_is_stale() {
        let tree = tree();
        let item = DragItem::existing_block(Block::new(BlockType::Text, "gone"), p("0-0"));
        assert!(matches!(
            decide(&tree, &item, "1"),
            DropDecision::Reject(DropRejection::StalePath { .. })
        ));
    }

    #[test]
    fn test_wrong_tree_rejected() {
        let tree = tree();
        let field = FormFieldConfig::new("f", "email", FieldType::Email);
        let item = DragItem::Field { field, origin: None };
        assert_eq!(decide(&tree, &item, "0"), DropDecision::Reject(DropRejection::WrongTree));
    }

    #[test]
    fn test_field_reordering() {
        let mut form = FormItem::new("form", "Contact");
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            form.fields.push(FormFieldConfig::new(format!("f{}", i), *name, FieldType::Text));
        }
        let forms = vec![form];
        let item = DragItem::Field {
            field: forms[0].fields[0].clone(),
            origin: Some(0),
        };
        let zone = |index| DropZone::Form {
            form_id: "form".into(),
            index,
        };

        assert_eq!(reconcile(&[], &forms, &zone(1), &item), DropDecision::NoOp);
        assert_eq!(
            reconcile(&[], &forms, &zone(0), &item),
            DropDecision::Reject(DropRejection::SelfDrop)
        );
        assert_eq!(
            reconcile(&[], &forms, &zone(3), &item),
            DropDecision::MoveField {
                form_id: "form".into(),
                from: 0,
                landing: 2,
            }
        );
        assert!(matches!(
            reconcile(&[], &forms, &DropZone::page(p("0")), &item),
            DropDecision::Reject(DropRejection::WrongTree)
        ));
    }
}
