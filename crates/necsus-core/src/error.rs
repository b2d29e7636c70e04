// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Necsus room client.

use thiserror::Error;

/// The primary error type used across all Necsus crates.
///
/// Only [`NecsusError::Submission`] is expected to reach a user: transport,
/// decode, and execution failures are absorbed (logged) by the component that
/// owns them.
#[derive(Debug, Error)]
pub enum NecsusError {
    /// Configuration errors (invalid TOML, bad server URL, inconsistent delays).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport errors (connect refused, socket dropped, send on closed socket).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An inbound frame could not be decoded into a stream event.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedded executable content failed while running.
    #[error("execution error: {message}")]
    Execution { message: String },

    /// A user-initiated action (post, form, roster edit) was rejected.
    #[error("submission failed: {message}")]
    Submission {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A URL could not be parsed or joined.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NecsusError {
    /// Shorthand for a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a submission error without a status or source.
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Whether the error belongs to the recoverable transport class.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}
