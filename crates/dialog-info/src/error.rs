//! Error types for dialog-info processing

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialogInfoError {
    /// Input was not a well-formed dialog-info document: malformed markup,
    /// wrong root element, or a required root attribute missing/duplicated.
    #[error("Bad dialog-info document: {0}")]
    BadDocument(String),

    /// The subscriber did not declare the dialog-info media type acceptable.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Re-serialization of a structurally valid element failed.
    #[error("Fragment serialization failed: {0}")]
    InternalSerializationError(String),
}

pub type Result<T> = std::result::Result<T, DialogInfoError>;
