// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unified error type for the Verdant workspace.

use thiserror::Error;

/// The unified error type used across all Verdant crates.
#[derive(Debug, Error)]
pub enum VerdantError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend failure (SQLite open, query, or migration).
    #[error("storage error: {source}")]
    Storage {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Gateway transport failure (bind, serve, or channel closed).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM provider failure (HTTP transport, API error, or parse failure).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A tool invocation failed in a way its caller cannot recover from.
    ///
    /// Recoverable tool failures are returned as error-flagged tool output
    /// text instead, so the reasoning loop can react to them.
    #[error("tool error: {message}")]
    Tool { message: String },

    /// The user identifier in a turn was missing or malformed.
    #[error("invalid user identifier: {0}")]
    InvalidUserId(String),

    /// The user has exhausted their message allowance.
    #[error("user is rate limited")]
    RateLimited,

    /// Operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats() {
        let e = VerdantError::Config("bad key".into());
        assert_eq!(e.to_string(), "configuration error: bad key");

        let e = VerdantError::Provider {
            message: "API returned 500".into(),
            source: None,
        };
        assert_eq!(e.to_string(), "provider error: API returned 500");

        let e = VerdantError::InvalidUserId("not a number".into());
        assert!(e.to_string().contains("not a number"));
    }

    #[test]
    fn storage_error_preserves_source() {
        let e = VerdantError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert!(std::error::Error::source(&e).is_some());
    }
}
