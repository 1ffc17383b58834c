//! Error types for tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scan failed: {0}")]
    EmptyScan(String),

    #[error("Vision error: {0}")]
    Vision(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A split needs at least 2 people, got {0}")]
    SplitTooFew(usize),

    #[error("Assignment flow is already complete")]
    FlowComplete,

    #[error("Nothing to undo")]
    NothingToUndo,
}

pub type Result<T> = std::result::Result<T, Error>;
