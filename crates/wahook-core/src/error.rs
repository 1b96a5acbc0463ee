// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the wahook gateway.

use thiserror::Error;

/// The primary error type used across wahook crates and collaborator traits.
#[derive(Debug, Error)]
pub enum WahookError {
    /// Configuration errors (invalid values, missing collaborators).
    #[error("configuration error: {0}")]
    Config(String),

    /// No instance with this id is known to the persistence collaborator.
    #[error("instance not found: {0}")]
    InstanceNotFound(String),

    /// No live session is registered for this instance.
    #[error("no session for instance {0}")]
    SessionNotFound(String),

    /// Failure reported by the chat session runtime (send, read, presence, download).
    #[error("session error: {message}")]
    Session {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The instance lookup collaborator failed.
    #[error("instance lookup failed: {source}")]
    Lookup {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Blob storage or local temp file failure.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Webhook delivery failure (transport error or non-success status).
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An event could not be converted into a notification.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WahookError {
    /// Shorthand for a session runtime failure without an underlying source.
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for the not-found family, which callers drop silently.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InstanceNotFound(_) | Self::SessionNotFound(_))
    }
}
