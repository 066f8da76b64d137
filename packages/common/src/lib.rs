//! Shared plumbing for blockpage crates: page storage and tree traversal.

pub mod error;
pub mod storage;
pub mod visitor;

pub use error::*;
pub use storage::*;
pub use visitor::*;
