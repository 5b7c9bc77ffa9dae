//! Error types for rendering.

use thiserror::Error;

/// Errors surfaced while producing visual outputs.
#[derive(Error, Debug)]
pub enum RenderError {
    /// I/O error writing an output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Graph data serialization failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The embedded viewer template is missing from the binary.
    #[error("viewer template not embedded")]
    MissingTemplate,
}
