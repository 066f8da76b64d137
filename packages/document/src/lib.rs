//! # Blockpage Document
//!
//! Data model for the block-based page builder: blocks, their styles, form
//! definitions, positional paths and id generation.
//!
//! Everything here is plain data. Editing lives in `blockpage-editor`,
//! style resolution in `blockpage-styles`.

pub mod block;
pub mod error;
pub mod form;
pub mod id_generator;
pub mod path;
pub mod styles;

pub use block::{Block, BlockType};
pub use error::{BreakpointParseError, PathParseError};
pub use form::{
    FieldOption, FieldType, FieldValidation, FormFieldConfig, FormItem, FormSubmission, HttpMethod,
    SuccessAction,
};
pub use id_generator::{document_seed, IdGenerator};
pub use path::BlockPath;
pub use styles::{
    BackgroundStyle, BlockStyles, BorderStyle, Breakpoint, ButtonStyle, ContainerStyle, DimensionsStyle,
    ImageStyle, Responsive, SpacingStyle, StyleCategory, TypographyStyle, VideoStyle,
};

use serde::{Deserialize, Serialize};

/// A whole page: the root block list plus the forms it uses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub forms: Vec<FormItem>,
}

impl PageDocument {
    pub fn new() -> Self {
        Self::default()
    }
}
