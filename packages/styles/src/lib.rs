//! # Blockpage Styles
//!
//! Turns block style records into concrete CSS for a breakpoint: a flat
//! property map for inline rendering, or a stylesheet with media queries.

pub mod css;
pub mod resolve;

pub use css::{block_rules, block_selector, stylesheet, CssRule};
pub use resolve::{resolve_category, resolve_styles, resolve_value, ResolvedStyle};
