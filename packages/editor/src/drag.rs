//! # Drag Lifecycle
//!
//! ```text
//! Idle ──start──▶ Dragging ──enter──▶ Hovering ──drop──▶ Dropped ─┐
//!                    ▲  │               │  ▲                       │
//!                    └──┼────leave──────┘  └─enter (re-evaluated)  │
//!                       └──cancel / drop outside──▶ Cancelled ─────┴──▶ Idle
//! ```
//!
//! The session only tracks the gesture; committing a drop is the store's job.

use blockpage_document::{Block, FormItem};

use crate::reconcile::{reconcile, DragItem, DropDecision, DropZone};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        item: DragItem,
    },
    Hovering {
        item: DragItem,
        zone: DropZone,
        decision: DropDecision,
    },
}

/// How a gesture ended
#[derive(Debug, Clone, PartialEq)]
pub enum DragEnd {
    Dropped { item: DragItem, zone: DropZone },
    Cancelled,
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    pub fn item(&self) -> Option<&DragItem> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { item } | DragState::Hovering { item, .. } => Some(item),
        }
    }

    /// Begin a gesture. A gesture still in progress is abandoned.
    pub fn start(&mut self, item: DragItem) {
        self.state = DragState::Dragging { item };
    }

    /// Pointer entered a drop zone; legality is evaluated against the
    /// current tree every time.
    pub fn enter(&mut self, zone: DropZone, tree: &[Block], forms: &[FormItem]) -> Option<&DropDecision> {
        let item = match std::mem::take(&mut self.state) {
            DragState::Idle => return None,
            DragState::Dragging { item } | DragState::Hovering { item, .. } => item,
        };

        let decision = reconcile(tree, forms, &zone, &item);
        self.state = DragState::Hovering { item, zone, decision };

        match &self.state {
            DragState::Hovering { decision, .. } => Some(decision),
            _ => None,
        }
    }

    /// Whether the zone under the pointer would accept the drop
    pub fn hover_is_legal(&self) -> bool {
        matches!(&self.state, DragState::Hovering { decision, .. } if decision.is_effective())
    }

    pub fn leave(&mut self) {
        if let DragState::Hovering { item, .. } = std::mem::take(&mut self.state) {
            self.state = DragState::Dragging { item };
        }
    }

    /// Release. Over a zone this yields the drop; anywhere else the gesture
    /// is cancelled. The session returns to idle either way.
    pub fn release(&mut self) -> DragEnd {
        match std::mem::take(&mut self.state) {
            DragState::Hovering { item, zone, .. } => DragEnd::Dropped { item, zone },
            _ => DragEnd::Cancelled,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
