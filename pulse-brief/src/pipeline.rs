//! The repair orchestrator.
//!
//! A bounded state machine with four terminal outcomes: structured parse,
//! structured parse after one repair round-trip, heuristic mining after the
//! repair text also failed to parse, and heuristic mining because the repair
//! call itself failed. The fallback always mines the ORIGINAL pre-repair
//! content; repaired text that did not parse is discarded. There is no
//! unrecoverable failure mode past the primary call: the floor is an empty
//! record set plus the raw text for caller-side debugging.

use crate::prompts;
use pulse_common::Result;
use pulse_extract::{
    extract_json_from_text, mine_summary, mine_tweet_blocks, normalize_model_text,
    ParsedDocument, SourceRef, Table, TweetRecord,
};
use pulse_llm::{CompletionClient, CompletionOptions};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Which pipeline stage produced the final record set. Callers use this to
/// gauge how much to trust the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Structured,
    StructuredAfterRepair,
    HeuristicFallback,
    HeuristicFallbackDirect,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::StructuredAfterRepair => "structured_after_repair",
            Self::HeuristicFallback => "heuristic_fallback",
            Self::HeuristicFallbackDirect => "heuristic_fallback_direct",
        }
    }
}

/// Response for the tweet-list schema.
#[derive(Debug, Serialize)]
pub struct TweetBrief {
    pub topic: String,
    pub tweets: Vec<TweetRecord>,
    pub summary: String,
    pub cfo_insights: Vec<String>,
    pub source: Provenance,
    pub raw_content: Option<String>,
}

/// Response for the executive-briefing schema.
#[derive(Debug, Serialize)]
pub struct ExecBrief {
    pub document: String,
    pub highlights: Vec<String>,
    pub tables: Vec<Table>,
    pub sources: Vec<SourceRef>,
    pub source: Provenance,
    pub raw_content: Option<String>,
}

/// Schema-agnostic result of one primary + optional repair round.
enum Outcome {
    Parsed { value: Value, source: Provenance },
    Unparsed { source: Provenance },
}

struct Run {
    outcome: Outcome,
    /// Normalized primary content; heuristic stages mine THIS, never the
    /// repaired text.
    content: String,
}

struct CallPlan<'a> {
    system: &'a str,
    prompt: String,
    opts: CompletionOptions,
    repair_system: &'a str,
    repair_opts: CompletionOptions,
    repair_prompt: fn(&str) -> String,
}

/// Drive the state machine. A primary-call failure is terminal and
/// propagates; every later failure degrades to a less-structured outcome.
async fn run(client: &dyn CompletionClient, plan: CallPlan<'_>) -> Result<Run> {
    let raw = client.send(plan.system, &plan.prompt, plan.opts).await?;
    let content = normalize_model_text(&raw);

    if let Ok(value) = extract_json_from_text(&content) {
        return Ok(Run {
            outcome: Outcome::Parsed {
                value,
                source: Provenance::Structured,
            },
            content,
        });
    }

    tracing::info!(content_len = content.len(), "pipeline.primary_parse_failed");
    let repair_prompt = (plan.repair_prompt)(&content);
    let outcome = match client
        .send(plan.repair_system, &repair_prompt, plan.repair_opts)
        .await
    {
        Ok(fixed) => match extract_json_from_text(&normalize_model_text(&fixed)) {
            Ok(value) => Outcome::Parsed {
                value,
                source: Provenance::StructuredAfterRepair,
            },
            Err(_) => {
                tracing::warn!("pipeline.repair_parse_failed");
                Outcome::Unparsed {
                    source: Provenance::HeuristicFallback,
                }
            }
        },
        Err(err) => {
            // Demoted, not propagated: the repair round-trip is best-effort.
            tracing::warn!(error = %err, "pipeline.repair_call_failed");
            Outcome::Unparsed {
                source: Provenance::HeuristicFallbackDirect,
            }
        }
    };

    Ok(Run { outcome, content })
}

/// Fetch and reconstruct a tweet brief for `topic`, bounded to `n` records.
pub async fn tweet_brief(
    client: &dyn CompletionClient,
    topic: &str,
    n: usize,
    debug_raw: bool,
) -> Result<TweetBrief> {
    let plan = CallPlan {
        system: prompts::TWEET_SYSTEM_PROMPT,
        prompt: prompts::build_tweet_prompt(topic, n, true),
        opts: CompletionOptions::default()
            .with_max_tokens(1400)
            .with_timeout(Duration::from_secs(90)),
        repair_system: prompts::TWEET_REPAIR_SYSTEM_PROMPT,
        repair_opts: CompletionOptions::default()
            .with_max_tokens(1200)
            .with_timeout(Duration::from_secs(30)),
        repair_prompt: prompts::build_tweet_repair_prompt,
    };

    let Run { outcome, content } = run(client, plan).await?;

    let brief = match outcome {
        Outcome::Parsed { value, source } => {
            let doc = ParsedDocument::from_value(&value);
            let tweets = sanitize_bounded(&doc.tweets, n);
            tracing::info!(source = source.as_str(), count = tweets.len(), "pipeline.tweets_done");
            TweetBrief {
                topic: topic.to_string(),
                tweets,
                summary: doc.summary,
                cfo_insights: doc.cfo_insights,
                source,
                raw_content: keep_raw(source, &content, debug_raw),
            }
        }
        Outcome::Unparsed { source } => {
            let mined = mine_tweet_blocks(&content);
            let tweets = sanitize_bounded(&mined, n);
            tracing::info!(source = source.as_str(), count = tweets.len(), "pipeline.tweets_done");
            TweetBrief {
                topic: topic.to_string(),
                tweets,
                summary: mine_summary(&content),
                cfo_insights: Vec::new(),
                source,
                raw_content: Some(content),
            }
        }
    };

    Ok(brief)
}

/// Fetch and reconstruct an executive briefing scoped to `countries`.
///
/// The heuristic floor differs from the tweet schema: there is nothing
/// tweet-shaped to mine, so the raw content becomes the `document` itself.
pub async fn exec_brief(
    client: &dyn CompletionClient,
    countries: &[String],
    debug_raw: bool,
) -> Result<ExecBrief> {
    let countries: Vec<String> = if countries.is_empty() {
        prompts::DEFAULT_COUNTRIES
            .iter()
            .map(|c| c.to_string())
            .collect()
    } else {
        countries.to_vec()
    };

    let plan = CallPlan {
        system: prompts::EXEC_SYSTEM_PROMPT,
        prompt: prompts::build_exec_prompt(&countries),
        opts: CompletionOptions::default()
            .with_max_tokens(3500)
            .with_timeout(Duration::from_secs(180)),
        repair_system: prompts::EXEC_REPAIR_SYSTEM_PROMPT,
        repair_opts: CompletionOptions::default()
            .with_max_tokens(10_000)
            .with_timeout(Duration::from_secs(80)),
        repair_prompt: prompts::build_exec_repair_prompt,
    };

    let Run { outcome, content } = run(client, plan).await?;

    let brief = match outcome {
        Outcome::Parsed { value, source } => {
            let doc = ParsedDocument::from_value(&value);
            tracing::info!(source = source.as_str(), "pipeline.exec_done");
            ExecBrief {
                document: doc.document,
                highlights: doc.highlights,
                tables: doc.tables,
                sources: doc.sources,
                source,
                raw_content: keep_raw(source, &content, debug_raw),
            }
        }
        Outcome::Unparsed { source } => {
            tracing::info!(source = source.as_str(), "pipeline.exec_done");
            ExecBrief {
                document: content.clone(),
                highlights: Vec::new(),
                tables: Vec::new(),
                sources: Vec::new(),
                source,
                raw_content: Some(content),
            }
        }
    };

    Ok(brief)
}

/// Every extracted record passes through the sanitizer, and the sequence is
/// truncated to the caller-requested count.
fn sanitize_bounded(raw: &[Value], n: usize) -> Vec<TweetRecord> {
    raw.iter().take(n).map(TweetRecord::from_value).collect()
}

/// First-pass structured results omit the raw echo; everything less certain
/// carries it for debugging.
fn keep_raw(source: Provenance, content: &str, debug_raw: bool) -> Option<String> {
    if debug_raw || source != Provenance::Structured {
        Some(content.to_string())
    } else {
        None
    }
}
