//! Error types for STEP file decoding.

use thiserror::Error;

/// Errors that can occur while reading a STEP file.
#[derive(Error, Debug)]
pub enum StepError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed Part 21 syntax.
    #[error("syntax error at line {line}, column {col}: {message}")]
    Syntax {
        /// Line number (1-indexed).
        line: usize,
        /// Column number (1-indexed).
        col: usize,
        /// Error message.
        message: String,
    },

    /// An entity referenced another entity that does not exist.
    #[error("missing entity reference: #{0}")]
    MissingEntity(u64),

    /// An entity argument had an unexpected type.
    #[error("type mismatch at entity #{id}: expected {expected}")]
    TypeMismatch {
        /// Entity where the mismatch occurred.
        id: u64,
        /// Expected type or entity kind.
        expected: String,
    },

    /// The file parsed but contained no solids to extract.
    #[error("no solids found in STEP file")]
    NoSolids,
}

impl StepError {
    /// Create a syntax error.
    pub fn syntax(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            col,
            message: message.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(id: u64, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            id,
            expected: expected.into(),
        }
    }
}
