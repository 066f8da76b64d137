use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathParseError {
    #[error("Invalid segment {segment:?} in path {path:?}")]
    InvalidSegment { path: String, segment: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BreakpointParseError {
    #[error("Unknown breakpoint: {0}")]
    Unknown(String),
}
