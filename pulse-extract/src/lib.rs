//! Tolerant JSON reconstruction for model output.
//!
//! Upstream completion services are only informally constrained to produce
//! JSON, so this crate recovers a schema-conformant record set from whatever
//! text actually comes back. The layers, in the order the pipeline applies
//! them:
//!
//! - [`normalize`]: strip code fences, trailing commas, smart quotes
//! - [`structured`]: balanced-brace scan + strict parse with quote repair
//! - [`miner`]: regex mining of tweet-shaped fragments when parsing fails
//! - [`sanitize`]: total coercion of extracted fields to bounded strings
//! - [`document`]: lenient projection of a parsed value onto known keys
//!
//! Every function here is pure; compiled patterns are process-wide
//! read-only statics.
pub mod document;
pub mod miner;
pub mod normalize;
pub mod sanitize;
pub mod structured;

pub use document::{ParsedDocument, SourceRef, Table};
pub use miner::{mine_summary, mine_tweet_blocks};
pub use normalize::normalize_model_text;
pub use sanitize::TweetRecord;
pub use structured::{extract_json_from_text, ExtractError};
