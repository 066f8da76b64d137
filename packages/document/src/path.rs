//! # Block Paths
//!
//! Positional addresses of blocks inside a page tree.
//!
//! A path is the ordered list of zero-based child indices from the root list
//! down to a block. Its string form joins the indices with `-`, so `"0-2-1"`
//! means: root block 0, its child 2, that child's child 1.
//!
//! Paths are derived from the current tree shape and go stale after any
//! structural edit. Recompute them; never cache them across mutations.

use crate::error::PathParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structured position of a block in the tree.
///
/// The empty path addresses the root list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockPath(Vec<usize>);

impl BlockPath {
    /// The root list (no segments)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<usize>) -> Self {
        Self(segments)
    }

    /// Path of a top-level block
    pub fn top(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn parse(s: &str) -> Result<Self, PathParseError> {
        s.parse()
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path of the `index`th child of this block
    pub fn child(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }

    /// Path minus its last segment. Top-level paths yield the root path;
    /// the root has no parent.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Last segment
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Same parent, different terminal index
    pub fn with_index(&self, index: usize) -> Option<Self> {
        let parent = self.parent()?;
        Some(parent.child(index))
    }

    pub fn next_sibling(&self) -> Option<Self> {
        let index = self.index()?;
        self.with_index(index + 1)
    }

    /// True when `self` lies strictly below `ancestor`.
    ///
    /// Compares whole segments, so `1-0` is under `1` but `10` is not.
    pub fn is_descendant_of(&self, ancestor: &BlockPath) -> bool {
        self.0.len() > ancestor.0.len() && self.0.starts_with(&ancestor.0)
    }

    /// `self` equals `other` or lies below it
    pub fn is_within(&self, other: &BlockPath) -> bool {
        self == other || self.is_descendant_of(other)
    }

    pub fn is_sibling_of(&self, other: &BlockPath) -> bool {
        !self.is_root() && !other.is_root() && self != other && self.parent() == other.parent()
    }
}

impl fmt::Display for BlockPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                f.write_str("-")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for BlockPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        trimmed
            .split('-')
            .map(|segment| {
                segment.parse::<usize>().map_err(|_| PathParseError::InvalidSegment {
                    path: s.to_string(),
                    segment: segment.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl TryFrom<String> for BlockPath {
    type Error = PathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockPath> for String {
    fn from(path: BlockPath) -> Self {
        path.to_string()
    }
}

impl From<Vec<usize>> for BlockPath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}
