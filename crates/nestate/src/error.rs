//! Error types for nestate operations.
//!
//! The update engine itself is permissive by design: missing intermediate
//! keys are created and non-object intermediates are overwritten, never
//! faulted on. Errors only arise from caller-supplied fallible updaters,
//! internal invariant breaches, and JSON interop.

use crate::Path;
use thiserror::Error;

/// Result type alias for nestate operations.
pub type NestateResult<T> = Result<T, NestateError>;

/// Errors that can occur during nestate operations.
#[derive(Debug, Error)]
pub enum NestateError {
    /// A caller-supplied fallible updater refused the update.
    ///
    /// The snapshot is left untouched; nothing is partially committed.
    #[error("update aborted at {path}: {message}")]
    UpdateAborted {
        /// The path the update targeted.
        path: Path,
        /// Why the updater refused.
        message: String,
    },

    /// Invalid operation error.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of what went wrong.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NestateError {
    /// Create an update aborted error.
    #[inline]
    pub fn update_aborted(path: Path, message: impl Into<String>) -> Self {
        NestateError::UpdateAborted {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid operation error.
    #[inline]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        NestateError::InvalidOperation {
            message: message.into(),
        }
    }
}
