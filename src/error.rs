//! Error types for chaptext operations.

use thiserror::Error;

/// Errors that can occur while parsing a chapter or loading its container.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unparsable document: {0}")]
    UnparsableDocument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("chapter not found in container: {0}")]
    ChapterNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
