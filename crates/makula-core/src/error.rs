// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Makula collection tracker.

use thiserror::Error;

/// The primary error type used across Makula store traits and flow operations.
///
/// No variant is process-fatal: handlers and conversation steps catch these
/// at the boundary and convert them to a user-visible message plus a log entry.
#[derive(Debug, Error)]
pub enum MakulaError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Bad input shape or range. Carries the user-visible reason.
    #[error("{0}")]
    Validation(String),

    /// A referenced entity is absent.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Registration with a login that is already taken.
    #[error("a user with this login already exists")]
    DuplicateLogin,

    /// Wrong credentials at login.
    #[error("invalid login or password")]
    AuthFailure,

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Media service errors (upload failure, unreachable host).
    #[error("media error: {message}")]
    Media {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Channel errors (Telegram API failure, message format).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MakulaError {
    /// Shorthand for a [`MakulaError::NotFound`] with the given subject.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// True when the error should be surfaced to the user as retryable
    /// rather than ending the current flow.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Media { .. } | Self::Channel { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_renders_subject() {
        let err = MakulaError::not_found("account");
        assert_eq!(err.to_string(), "account not found");
    }

    #[test]
    fn validation_renders_reason_verbatim() {
        let err = MakulaError::Validation("weight must be greater than 0".into());
        assert_eq!(err.to_string(), "weight must be greater than 0");
    }

    #[test]
    fn upstream_errors_are_retryable() {
        let storage = MakulaError::Storage {
            source: "disk full".into(),
        };
        assert!(storage.is_retryable());
        assert!(!MakulaError::DuplicateLogin.is_retryable());
        assert!(!MakulaError::AuthFailure.is_retryable());
    }
}
