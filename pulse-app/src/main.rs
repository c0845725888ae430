//! One-shot CLI for the Pulse briefing pipeline.
//!
//! Prints the normalized, provenance-tagged JSON response to stdout. Terminal
//! failures (missing credential, primary-call network errors) render as
//! `{"error": "..."}` objects, mirroring the frontend contract.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pulse_brief::{exec_brief, tweet_brief};
use pulse_common::observability::{init_logging, LogConfig};
use pulse_common::{ErrorBody, PulseError};
use pulse_config::{LlmConfig, PulseConfig, PulseConfigLoader};
use pulse_llm::GrokClient;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pulse", about = "Market & tech news briefings from an LLM backend")]
struct Cli {
    /// Config file (YAML); `PULSE__`-prefixed env vars override it.
    #[arg(long, default_value = "pulse.yaml")]
    config: PathBuf,

    /// Duplicate log events to stderr.
    #[arg(long)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a tweet brief for a topic (ai, cyber, regulation, ma, market, audit, ...).
    Tweets {
        #[arg(long)]
        topic: String,
        /// Number of records to return; defaults to the configured value.
        #[arg(long)]
        count: Option<usize>,
        /// Include the raw model content for debugging.
        #[arg(long)]
        raw: bool,
    },
    /// Fetch an executive briefing pack.
    Exec {
        /// Comma-separated country list; defaults to the configured scope.
        #[arg(long)]
        countries: Option<String>,
        /// Include the raw model content for debugging.
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LogConfig {
        app_name: "pulse",
        emit_stderr: cli.log_stderr,
        ..LogConfig::default()
    })?;

    let cfg: PulseConfig = match PulseConfigLoader::new().with_file(&cli.config).load() {
        Ok(cfg) => cfg,
        Err(e) => return bail_user_visible(&PulseError::Config(e.to_string())),
    };

    let LlmConfig::Grok {
        api_key,
        model,
        endpoint,
    } = cfg.llm;

    let client = match GrokClient::with_endpoint(api_key, model, &endpoint) {
        Ok(client) => client,
        Err(e) => return bail_user_visible(&e),
    };

    let rendered = match cli.command {
        Command::Tweets { topic, count, raw } => {
            let n = count.unwrap_or(cfg.brief.max_tweets);
            tweet_brief(&client, &topic, n, raw)
                .await
                .map(|brief| serde_json::to_string_pretty(&brief))
        }
        Command::Exec { countries, raw } => {
            let countries = countries
                .as_deref()
                .map(parse_countries)
                .unwrap_or(cfg.brief.countries);
            exec_brief(&client, &countries, raw)
                .await
                .map(|brief| serde_json::to_string_pretty(&brief))
        }
    };

    match rendered {
        Ok(body) => {
            println!("{}", body?);
            Ok(())
        }
        Err(e) => bail_user_visible(&e),
    }
}

fn parse_countries(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn bail_user_visible(err: &PulseError) -> Result<()> {
    tracing::error!(error = %err, "request failed");
    println!(
        "{}",
        serde_json::to_string_pretty(&ErrorBody::from_error(err))?
    );
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countries_parse_trims_and_drops_empties() {
        assert_eq!(
            parse_countries(" Qatar , Oman ,,Bahrain"),
            vec!["Qatar", "Oman", "Bahrain"]
        );
        assert!(parse_countries(" , ").is_empty());
    }
}
