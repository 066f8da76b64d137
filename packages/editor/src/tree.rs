//! Path- and id-based lookups over a block tree.
//!
//! All lookups validate bounds and return `None` for paths that no longer
//! match the tree shape.

use blockpage_document::{Block, BlockPath};

/// Block at `path`; `None` for the root path or a stale path
pub fn block_at<'a>(tree: &'a [Block], path: &BlockPath) -> Option<&'a Block> {
    let (first, rest) = path.segments().split_first()?;
    let mut block = tree.get(*first)?;
    for &index in rest {
        block = block.blocks.get(index)?;
    }
    Some(block)
}

pub fn block_at_mut<'a>(tree: &'a mut [Block], path: &BlockPath) -> Option<&'a mut Block> {
    let (first, rest) = path.segments().split_first()?;
    let mut block = tree.get_mut(*first)?;
    for &index in rest {
        block = block.blocks.get_mut(index)?;
    }
    Some(block)
}

/// Child list addressed by `parent` (the root list for the root path)
pub fn children_at<'a>(tree: &'a [Block], parent: &BlockPath) -> Option<&'a [Block]> {
    if parent.is_root() {
        return Some(tree);
    }
    block_at(tree, parent).map(|block| block.blocks.as_slice())
}

pub fn children_at_mut<'a>(tree: &'a mut Vec<Block>, parent: &BlockPath) -> Option<&'a mut Vec<Block>> {
    let mut list = tree;
    for &index in parent.segments() {
        list = &mut list.get_mut(index)?.blocks;
    }
    Some(list)
}

/// Recursive id search
pub fn find_block<'a>(tree: &'a [Block], id: &str) -> Option<&'a Block> {
    for block in tree {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_block(&block.blocks, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_block_mut<'a>(tree: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    for block in tree {
        if block.id == id {
            return Some(block);
        }
        if let Some(found) = find_block_mut(&mut block.blocks, id) {
            return Some(found);
        }
    }
    None
}

/// Total number of blocks in the tree
pub fn node_count(tree: &[Block]) -> usize {
    tree.iter().map(Block::node_count).sum()
}
