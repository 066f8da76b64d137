use blockpage_document::{Block, BlockPath, FormFieldConfig, FormItem, PageDocument};

/// Visitor pattern for traversing a page immutably
///
/// Default implementations walk the entire tree depth-first, in document
/// order. Every block is visited together with its current path.
pub trait Visitor: Sized {
    fn visit_page(&mut self, page: &PageDocument) {
        walk_page(self, page);
    }

    fn visit_blocks(&mut self, blocks: &[Block], parent: &BlockPath) {
        walk_blocks(self, blocks, parent);
    }

    fn visit_block(&mut self, block: &Block, path: &BlockPath) {
        walk_block(self, block, path);
    }

    fn visit_form(&mut self, form: &FormItem) {
        walk_form(self, form);
    }

    fn visit_field(&mut self, _field: &FormFieldConfig) {
        // Leaf node, no children to walk
    }
}

/// Mutable visitor pattern for transforming blocks in place
pub trait VisitorMut: Sized {
    fn visit_blocks_mut(&mut self, blocks: &mut [Block], depth: usize) {
        walk_blocks_mut(self, blocks, depth);
    }

    fn visit_block_mut(&mut self, block: &mut Block, depth: usize) {
        walk_block_mut(self, block, depth);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_page<V: Visitor>(visitor: &mut V, page: &PageDocument) {
    visitor.visit_blocks(&page.blocks, &BlockPath::root());
    for form in &page.forms {
        visitor.visit_form(form);
    }
}

pub fn walk_blocks<V: Visitor>(visitor: &mut V, blocks: &[Block], parent: &BlockPath) {
    for (index, block) in blocks.iter().enumerate() {
        visitor.visit_block(block, &parent.child(index));
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block, path: &BlockPath) {
    for field in &block.fields {
        visitor.visit_field(field);
    }
    visitor.visit_blocks(&block.blocks, path);
}

pub fn walk_form<V: Visitor>(visitor: &mut V, form: &FormItem) {
    for field in &form.fields {
        visitor.visit_field(field);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_blocks_mut<V: VisitorMut>(visitor: &mut V, blocks: &mut [Block], depth: usize) {
    for block in blocks {
        visitor.visit_block_mut(block, depth);
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block, depth: usize) {
    visitor.visit_blocks_mut(&mut block.blocks, depth + 1);
}

/// Collects every block id in document order
#[derive(Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_block(&mut self, block: &Block, path: &BlockPath) {
        self.ids.push(block.id.clone());
        walk_block(self, block, path);
    }
}

/// Finds the current path of a block id
pub struct PathFinder<'a> {
    target: &'a str,
    pub found: Option<BlockPath>,
}

impl<'a> PathFinder<'a> {
    pub fn new(target: &'a str) -> Self {
        Self { target, found: None }
    }
}

impl Visitor for PathFinder<'_> {
    fn visit_block(&mut self, block: &Block, path: &BlockPath) {
        if self.found.is_some() {
            return;
        }
        if block.id == self.target {
            self.found = Some(path.clone());
            return;
        }
        walk_block(self, block, path);
    }
}

/// Rewrites `level` from the actual tree depth
pub struct LevelAssigner;

impl VisitorMut for LevelAssigner {
    fn visit_block_mut(&mut self, block: &mut Block, depth: usize) {
        block.level = depth;
        walk_block_mut(self, block, depth);
    }
}

/// Every block id under `blocks`, in document order
pub fn collect_ids(blocks: &[Block]) -> Vec<String> {
    let mut collector = IdCollector::default();
    collector.visit_blocks(blocks, &BlockPath::root());
    collector.ids
}

/// Current path of the block with `id`, if present
pub fn find_path(blocks: &[Block], id: &str) -> Option<BlockPath> {
    let mut finder = PathFinder::new(id);
    finder.visit_blocks(blocks, &BlockPath::root());
    finder.found
}

/// Recompute `level` for every block
pub fn assign_levels(blocks: &mut [Block]) {
    LevelAssigner.visit_blocks_mut(blocks, 0);
}
