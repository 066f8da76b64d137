//! CSS emission for resolved block styles.
//!
//! Every block gets a base rule for `default`, then one
//! `@media (max-width: Npx)` rule per narrower breakpoint carrying only the
//! properties that change relative to the next wider breakpoint.

use crate::resolve::{resolve_styles, ResolvedStyle};
use blockpage_document::{Block, Breakpoint};

/// A single CSS rule
#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selector: String,
    pub media_query: Option<String>,
    pub properties: ResolvedStyle,
}

impl CssRule {
    pub fn to_css(&self) -> String {
        let mut body = String::new();
        body.push_str(&self.selector);
        body.push_str(" {\n");
        for (key, value) in self.properties.iter() {
            body.push_str("  ");
            body.push_str(key);
            body.push_str(": ");
            body.push_str(value);
            body.push_str(";\n");
        }
        body.push('}');

        match &self.media_query {
            Some(query) => {
                let indented = body
                    .lines()
                    .map(|line| format!("  {}", line))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{} {{\n{}\n}}\n", query, indented)
            }
            None => format!("{}\n", body),
        }
    }
}

/// Selector the renderer puts on a block's element
pub fn block_selector(block: &Block) -> String {
    format!("[data-block-id=\"{}\"]", block.id)
}

/// Rules for one block (not its children)
pub fn block_rules(block: &Block) -> Vec<CssRule> {
    let selector = block_selector(block);
    let mut rules = Vec::new();
    let mut wider = ResolvedStyle::new();

    for breakpoint in Breakpoint::ALL {
        let resolved = resolve_styles(&block.styles, breakpoint);
        let properties = resolved.difference(&wider);

        if !properties.is_empty() {
            rules.push(CssRule {
                selector: selector.clone(),
                media_query: breakpoint
                    .max_width()
                    .map(|width| format!("@media (max-width: {}px)", width)),
                properties,
            });
        }

        wider = resolved;
    }

    rules
}

/// Stylesheet for a whole tree, in document order
pub fn stylesheet(blocks: &[Block]) -> String {
    fn collect(blocks: &[Block], out: &mut Vec<CssRule>) {
        for block in blocks {
            out.extend(block_rules(block));
            collect(&block.blocks, out);
        }
    }

    let mut rules = Vec::new();
    collect(blocks, &mut rules);
    rules.iter().map(CssRule::to_css).collect::<Vec<_>>().join("\n")
}
