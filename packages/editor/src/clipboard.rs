use blockpage_document::{Block, IdGenerator};

/// One-slot clipboard for cut/copied subtrees, scoped to the session
#[derive(Debug, Default, Clone)]
pub struct Clipboard {
    slot: Option<Block>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a copy of `block`
    pub fn store(&mut self, block: &Block) {
        self.slot = Some(block.clone());
    }

    pub fn peek(&self) -> Option<&Block> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// A fresh-id copy of the contents; the clipboard keeps its copy so it
    /// can be pasted again.
    pub fn paste(&self, ids: &mut IdGenerator) -> Option<Block> {
        self.slot.as_ref().map(|block| block.clone_with_fresh_ids(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpage_document::BlockType;

    #[test]
    fn test_store_replaces_previous() {
        let mut clipboard = Clipboard::new();
        clipboard.store(&Block::new(BlockType::Text, "a"));
        clipboard.store(&Block::new(BlockType::Image, "b"));
        assert_eq!(clipboard.peek().unwrap().id, "b");
    }

    #[test]
    fn test_paste_twice_gives_distinct_ids() {
        let mut ids = IdGenerator::from_seed("c");
        let mut clipboard = Clipboard::new();
        let mut container = Block::new(BlockType::Container, "orig");
        container.blocks.push(Block::new(BlockType::Text, "orig-child"));
        clipboard.store(&container);

        let first = clipboard.paste(&mut ids).unwrap();
        let second = clipboard.paste(&mut ids).unwrap();

        assert_ne!(first.id, "orig");
        assert_ne!(first.id, second.id);
        assert_ne!(first.blocks[0].id, second.blocks[0].id);
        assert!(!clipboard.is_empty());
    }

    #[test]
    fn test_empty_paste() {
        let mut ids = IdGenerator::from_seed("c");
        assert!(Clipboard::new().paste(&mut ids).is_none());
    }
}
