//! Cryptographic error types.

use thiserror::Error;

/// Boxed cause carried by [`CryptoError::Unexpected`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during cryptographic and encoding operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Caller supplied an out-of-range or missing argument.
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// Malformed hex, base64 or charset input.
    #[error("decode error at offset {position}: {reason}")]
    Decode {
        /// Byte offset of the offending input.
        position: usize,
        /// What was wrong, including the offending text where available.
        reason: String,
    },

    /// Cipher payload is too short to contain its embedded IV.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// An underlying primitive failed (unsupported algorithm, bad key length,
    /// bad padding, ...). These indicate environment or configuration defects.
    #[error("unexpected crypto error during {operation}: {source}")]
    Unexpected {
        /// Operation that was running when the primitive failed.
        operation: &'static str,
        /// Original cause.
        #[source]
        source: BoxedCause,
    },

    /// Caller is not authorized to perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The process-wide cipher backend has already been installed.
    #[error("cipher backend already configured")]
    AlreadyConfigured,
}

impl CryptoError {
    /// Wraps a primitive failure.
    pub fn unexpected(operation: &'static str, source: impl Into<BoxedCause>) -> Self {
        Self::Unexpected {
            operation,
            source: source.into(),
        }
    }

    pub(crate) fn decode(position: usize, reason: impl Into<String>) -> Self {
        Self::Decode {
            position,
            reason: reason.into(),
        }
    }
}
