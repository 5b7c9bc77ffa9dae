//! Error types for graph construction and serialization.

use thiserror::Error;

/// Errors surfaced by the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O error writing a graph or statistics document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Statistics document serialization failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
