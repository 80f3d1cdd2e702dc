//! Shared error type across the Locate crates.

use thiserror::Error;

/// Machine-readable error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A fixed-width read ran past the end of the buffer.
    Truncated,
    /// Configuration could not be parsed or failed validation.
    BadConfig,
    /// Unsupported configuration/schema version.
    UnsupportedVersion,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and tool output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Truncated => "TRUNCATED",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LocateError>;

/// Unified error type used by the codec and the session layer.
///
/// `Truncated` is the only failure the codec itself raises; unknown fields,
/// unmatched capabilities and duplicate requests are absorbed where they occur.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocateError {
    #[error("truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl LocateError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            LocateError::Truncated { .. } => ErrorCode::Truncated,
            LocateError::BadConfig(_) => ErrorCode::BadConfig,
            LocateError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            LocateError::Internal(_) => ErrorCode::Internal,
        }
    }
}
