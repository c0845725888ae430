//! Common types and utilities shared across Pulse crates.
//!
//! This crate defines the shared error type, the `Result` alias, and the
//! [`observability`] module used by every binary in the workspace. It is
//! intentionally lightweight so that all crates can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`PulseError`] and [`Result`]: Shared error handling
//! - [`observability`]: Centralised tracing/logging initialisation
use serde::Serialize;

pub mod observability;

/// Error types used across the Pulse system.
///
/// Upstream variants mirror the three failure modes of the completion
/// service the pipeline cares about: timeout, HTTP status error, and
/// anything else at the network layer. Only these and [`PulseError::Config`]
/// are ever user-visible; parsing failures are recovered internally by the
/// extraction pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PulseError {
    /// Configuration was incomplete or invalid (e.g. missing credential).
    /// Raised before any network call is attempted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The completion service did not answer within the request timeout.
    #[error("upstream request timed out")]
    UpstreamTimeout,

    /// The completion service answered with a non-success status.
    #[error("upstream HTTP error {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// Connection-level failure talking to the completion service.
    #[error("upstream network error: {0}")]
    UpstreamNetwork(String),

    /// Anything else (I/O, setup, ...).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`PulseError`].
pub type Result<T> = std::result::Result<T, PulseError>;

/// Wire shape for user-visible failures.
///
/// The original frontend contract reports errors as `{"error": "..."}`
/// objects rather than HTTP-level failures, so binaries render terminal
/// errors through this struct.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn from_error(err: &PulseError) -> Self {
        let error = match err {
            PulseError::UpstreamTimeout => {
                "completion service timed out. Try again later.".to_string()
            }
            other => other.to_string(),
        };
        Self { error }
    }
}
