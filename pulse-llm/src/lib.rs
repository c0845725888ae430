//! Opaque completion-service integration for Pulse.
//!
//! The pipeline treats the upstream LLM as text-in/text-out: build a prompt,
//! get back free-form text that is only informally constrained to be JSON.
//! This crate exposes the [`traits::CompletionClient`] interface and the
//! Grok chat-completions implementation in [`grok`].
pub mod grok;
pub mod traits;

pub use grok::GrokClient;
pub use traits::{CompletionClient, CompletionOptions};

/// Default model for briefing requests.
pub const DEFAULT_GROK_MODEL: &str = "grok-3";
