//! Briefing pipeline: prompts, repair orchestration, and response shaping.
//!
//! One pipeline serves both output schemas. [`prompts`] holds the topic
//! instruction table, the schema descriptors embedded verbatim in every
//! prompt, and the prompt builders. [`pipeline`] sequences
//! normalize → extract → repair round-trip → extract → heuristic floor and
//! tags every response with the stage that produced it.
pub mod pipeline;
pub mod prompts;

pub use pipeline::{exec_brief, tweet_brief, ExecBrief, Provenance, TweetBrief};
pub use prompts::DEFAULT_COUNTRIES;
