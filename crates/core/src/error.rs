//! Error types for the MathDesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all MathDesk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Input errors ---
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Student already has an archive: {0}")]
    DuplicateStudent(String),

    #[error("No archive for student: {0}")]
    UnknownStudent(String),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Archive persistence errors ---
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Shorthand for an input validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read archive at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write archive at {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Archive at {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn corrupt_archive_names_the_file() {
        let err = Error::Persistence(StoreError::Corrupt {
            path: PathBuf::from("/data/student_archives.json"),
            reason: "expected value at line 1 column 1".into(),
        });
        let text = err.to_string();
        assert!(text.contains("student_archives.json"));
        assert!(text.contains("corrupt"));
    }
}
