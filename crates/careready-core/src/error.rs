// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Careready coordination services.

use thiserror::Error;

/// The primary error type used across all Careready crates.
#[derive(Debug, Error)]
pub enum CarereadyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Queue transport errors (enqueue/dequeue failure, payload serialization).
    #[error("queue error: {message}")]
    Queue {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Inference capability errors (API failure, malformed or schema-invalid output).
    #[error("inference error: {message}")]
    Inference {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced appointment does not exist.
    #[error("unknown appointment: {0}")]
    UnknownAppointment(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CarereadyError {
    /// Shorthand for an inference error wrapping an underlying cause.
    pub fn inference(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CarereadyError::Inference {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a queue error wrapping an underlying cause.
    pub fn queue(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CarereadyError::Queue {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
