//! # Blocks
//!
//! The page is an ordered list of blocks; containers nest further blocks.
//! The tree shape is authoritative. `level` is kept for display only and is
//! recomputed by the editor after every structural edit.

use crate::form::{FormFieldConfig, FormSubmission};
use crate::id_generator::IdGenerator;
use crate::styles::BlockStyles;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Text,
    Paragraph,
    Image,
    Button,
    Html,
    Divider,
    Container,
    Quote,
    Code,
    Video,
    Form,
}

impl BlockType {
    pub const ALL: [BlockType; 17] = [
        BlockType::H1,
        BlockType::H2,
        BlockType::H3,
        BlockType::H4,
        BlockType::H5,
        BlockType::H6,
        BlockType::Text,
        BlockType::Paragraph,
        BlockType::Image,
        BlockType::Button,
        BlockType::Html,
        BlockType::Divider,
        BlockType::Container,
        BlockType::Quote,
        BlockType::Code,
        BlockType::Video,
        BlockType::Form,
    ];

    pub fn is_heading(self) -> bool {
        matches!(
            self,
            BlockType::H1 | BlockType::H2 | BlockType::H3 | BlockType::H4 | BlockType::H5 | BlockType::H6
        )
    }

    /// Types whose `content` is user-visible text
    pub fn is_text_like(self) -> bool {
        self.is_heading()
            || matches!(
                self,
                BlockType::Text
                    | BlockType::Paragraph
                    | BlockType::Button
                    | BlockType::Html
                    | BlockType::Quote
                    | BlockType::Code
            )
    }

    pub fn allows_nesting(self) -> bool {
        matches!(self, BlockType::Container)
    }

    /// Whether a block of this type may hold a child of type `child`.
    ///
    /// Containers take any content, including further containers. Leaf types
    /// take nothing.
    pub fn accepts(self, child: BlockType) -> bool {
        match self {
            BlockType::Container => BlockType::ALL.contains(&child),
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::H1 => "h1",
            BlockType::H2 => "h2",
            BlockType::H3 => "h3",
            BlockType::H4 => "h4",
            BlockType::H5 => "h5",
            BlockType::H6 => "h6",
            BlockType::Text => "text",
            BlockType::Paragraph => "paragraph",
            BlockType::Image => "image",
            BlockType::Button => "button",
            BlockType::Html => "html",
            BlockType::Divider => "divider",
            BlockType::Container => "container",
            BlockType::Quote => "quote",
            BlockType::Code => "code",
            BlockType::Video => "video",
            BlockType::Form => "form",
        }
    }

    fn default_content(self) -> &'static str {
        match self {
            BlockType::H1 | BlockType::H2 | BlockType::H3 | BlockType::H4 | BlockType::H5 | BlockType::H6 => {
                "Heading"
            }
            BlockType::Text => "Text",
            BlockType::Paragraph => "Write something here...",
            BlockType::Button => "Button",
            BlockType::Html => "<div></div>",
            BlockType::Quote => "Quote",
            BlockType::Code => "// code",
            _ => "",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the page tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: BlockType,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub styles: BlockStyles,

    #[serde(default)]
    pub blocks: Vec<Block>,

    #[serde(default)]
    pub allow_nesting: bool,

    #[serde(default)]
    pub level: usize,

    /// Placeholder drop slots rendered while a container is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_children: Option<usize>,

    /// Style template for those placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_base_styles: Option<BlockStyles>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormFieldConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<FormSubmission>,

    /// Standalone form this block renders, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,

    /// Type-specific string properties (`src`, `alt`, `href`, `target`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Block {
    /// A block of `kind` with every field downstream code relies on filled in
    pub fn new(kind: BlockType, id: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        match kind {
            BlockType::Image => {
                attributes.insert("src".to_string(), String::new());
                attributes.insert("alt".to_string(), String::new());
            }
            BlockType::Button => {
                attributes.insert("href".to_string(), "#".to_string());
            }
            BlockType::Video => {
                attributes.insert("src".to_string(), String::new());
            }
            _ => {}
        }

        let is_container = kind == BlockType::Container;
        let is_form = kind == BlockType::Form;

        Self {
            id: id.into(),
            kind,
            content: kind.default_content().to_string(),
            styles: BlockStyles::default(),
            blocks: Vec::new(),
            allow_nesting: kind.allows_nesting(),
            level: 0,
            expected_children: is_container.then_some(1),
            children_base_styles: is_container.then(BlockStyles::default),
            fields: Vec::new(),
            form_data: is_form.then(FormSubmission::default),
            form_id: None,
            attributes,
        }
    }

    /// Empty container used when a drop lands under a parent that does not exist yet
    pub fn container_shell(id: impl Into<String>) -> Self {
        Self::new(BlockType::Container, id)
    }

    pub fn is_container(&self) -> bool {
        self.kind == BlockType::Container
    }

    /// Whether this block can hold a child of `child` type right now
    pub fn can_accept(&self, child: BlockType) -> bool {
        self.allow_nesting && self.kind.accepts(child)
    }

    /// This block plus all descendants
    pub fn node_count(&self) -> usize {
        1 + self.blocks.iter().map(Block::node_count).sum::<usize>()
    }

    /// Deep copy with new ids for this block and every descendant
    pub fn clone_with_fresh_ids(&self, ids: &mut IdGenerator) -> Block {
        let mut copy = self.clone();
        reassign_ids(&mut copy, ids);
        copy
    }
}

fn reassign_ids(block: &mut Block, ids: &mut IdGenerator) {
    block.id = ids.new_id();
    for field in &mut block.fields {
        field.id = ids.new_id();
    }
    for child in &mut block.blocks {
        reassign_ids(child, ids);
    }
}
