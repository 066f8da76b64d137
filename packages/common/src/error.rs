use thiserror::Error;

/// Errors from reading and writing pages
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Page not found: {0}")]
    NotFound(String),
}

pub type CommonResult<T> = Result<T, CommonError>;
