//! Prompt templates and schema descriptors.
//!
//! The schema constants are embedded verbatim in every prompt so the model
//! knows the contract it is asked to honor. They are design constants, not
//! computed values.

use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

/// Target shape for tweet-list requests.
pub const TWEET_SCHEMA_JSON: &str = r#"{
  "tweets": [
    {
      "id": "<tweet id>",
      "author": "@handle",
      "created_at": "YYYY-MM-DDTHH:MM:SSZ",
      "text": "exact tweet text (verbatim, no added commentary)",
      "url": "https://x.com/handle/status/<id>",
      "retweets": 0,
      "replies": 0,
      "likes": 0,
      "why_selected": "short reason"
    }
  ],
  "summary": "3-6 line text summarizing the theme / developments",
  "cfo_insights": ["short bullet 1", "short bullet 2"]
}"#;

/// Target shape for executive-briefing requests, including machine-readable
/// tables.
pub const EXEC_SCHEMA_JSON: &str = r#"{
  "document": "Full executive briefing document as a single string (with sections and dates).",
  "highlights": ["short bullet 1", "short bullet 2"],
  "tables": [
    {
      "title": "M&A table",
      "headers": ["Date", "Acquirer", "Acquiree", "Size/Valuation", "Rationale"],
      "rows": [["2025-10-29", "Acquirer", "Acquiree", "$X", "Reason"]]
    }
  ],
  "sources": [
    {"title": "source title", "url": "https://..."}
  ]
}"#;

pub const TWEET_SYSTEM_PROMPT: &str =
    "You are a precise data extractor. Output valid JSON only.";
pub const TWEET_REPAIR_SYSTEM_PROMPT: &str =
    "You are a precise data extractor. Output VALID, STRICT JSON only. Never repeat keys or leave trailing commas.";
pub const EXEC_SYSTEM_PROMPT: &str =
    "You are a precise briefing writer. Output valid JSON only.";
pub const EXEC_REPAIR_SYSTEM_PROMPT: &str = "You are a detailed executive intelligence assistant. \
Write longer, analytical, and context-rich briefings (8,000-10,000 characters). \
Cover implications, causal links, and impact where relevant. \
Important! - Ensure all text fits within VALID JSON under the field names exactly as specified.";

/// Default scope for executive briefings when the caller supplies none.
pub const DEFAULT_COUNTRIES: [&str; 7] = [
    "Saudi Arabia",
    "United Arab Emirates",
    "Qatar",
    "Kuwait",
    "Bahrain",
    "Oman",
    "Iraq",
];

/// Per-topic search instructions; pure lookup with a generic default for
/// unrecognized keys.
pub fn topic_instruction(topic: &str) -> String {
    match topic.to_lowercase().as_str() {
        "ai" => "Return tweets strictly about AI developments, deployments, or AI adoption in industries or countries. \
            Exclude unrelated items (no audit/merger/regulation tweets unless they specifically mention AI). \
            Prioritise official accounts, vendors, research labs, regulators' AI announcements, CTO/CIO posts, or high-engagement posts."
            .to_string(),
        "cyber" => "Return tweets strictly about newly reported cyber incidents, breaches, ransomware, or large-scale security events. \
            For each incident try to indicate sector (private / government), impact (data loss / downtime / money), type (ransomware / exploit), suspected actor if mentioned, and recovery efforts."
            .to_string(),
        "regulation" => "Return tweets strictly about regulatory developments: laws, policy announcements, guidance, enforcement actions or rule changes across fintech, banking, crypto, data privacy, taxation, auditing. \
            Prefer tweets from regulators, law firms, major journalists, and authoritative accounts."
            .to_string(),
        "ma" => "Return tweets strictly about M&A deals announced or executed: acquirer, acquiree, deal value/size (if given), rationale/strategic reason, valuation metrics if included, and immediate market reaction."
            .to_string(),
        "market" => "Return tweets strictly about market updates (equities, FX, commodities, bonds, crypto, gold/silver). \
            Prefer tweets that give prices, indices moves, indicators, or quick market commentary (and identify region - e.g., India/EU/US/EM)."
            .to_string(),
        "audit" => "Return tweets strictly about audit / consulting firms (EY, KPMG, PwC, Deloitte, Grant Thornton, BDO): fines, violations, AI adoption in audit, major client changes or regulatory interactions."
            .to_string(),
        other => format!("Return tweets strictly about {other}."),
    }
}

/// The UTC last-24-hours window as inclusive RFC 3339 bounds.
pub fn last_24h_window() -> (String, String) {
    let end = OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .expect("zero nanosecond");
    let start = end - Duration::hours(24);
    (
        start.format(&Rfc3339).expect("rfc3339 start"),
        end.format(&Rfc3339).expect("rfc3339 end"),
    )
}

/// Build the primary tweet-extraction prompt for a topic.
pub fn build_tweet_prompt(topic: &str, n: usize, prefer_verified: bool) -> String {
    let (start_iso, end_iso) = last_24h_window();
    let topic_instr = topic_instruction(topic);

    let do_not_rules = "Do NOT paraphrase or rewrite the tweet text field - return the tweet text EXACTLY as posted (verbatim). \
Do NOT add commentary inline. Do NOT invent URLs. If you cannot determine the exact tweet URL or it is not available, set url to \"\". \
All dates must be ISO 8601 (UTC). Use double quotes only. Output only a single top-level JSON object and nothing else.";

    let ranking = format!(
        "Return up to {n} tweets, ranked primarily by engagement (likes+retweets+replies) and secondarily by recency. \
Prefer tweets from authoritative/verified accounts and official sources when available."
    );

    format!(
        "You are an assistant that searches Twitter/X for very recent, high-quality posts.\n\n\
Output Requirement:\n\
Return a STRICT, valid JSON object using the exact schema below (no extra keys, no commentary):\n\n\
{TWEET_SCHEMA_JSON}\n\n\
Search & filtering instructions:\n\
- TIME WINDOW: Only consider tweets posted between {start_iso} (inclusive) and {end_iso} (inclusive) - i.e., the last 24 hours.\n\
- TOPIC: {topic_instr}\n\
- RANKING: {ranking}\n\
- PREFER_VERIFIED: {}\n\n\
Field rules and details:\n\
- tweet.text must be EXACT verbatim tweet text (do not summarize or paraphrase). Replace newline characters with a single space.\n\
- tweet.created_at must be ISO 8601 UTC (e.g. 2025-10-27T14:23:00Z). If you cannot get exact timestamp, set created_at to empty string.\n\
- tweet.url must be the canonical X/Twitter URL of the tweet if available (https://x.com/<handle>/status/<id>). If you cannot reliably provide the URL, set it to \"\".\n\
- Provide engagement numbers (retweets, replies, likes) if available; otherwise set to 0.\n\
- why_selected: one short sentence (<= 120 chars) explaining why this tweet was chosen.\n\n\
Other rules:\n{do_not_rules}\n\n\
If you are unable to return the fully valid JSON (for example due to truncation), return the best-effort JSON object that remains valid JSON (do not return text or code blocks).",
        if prefer_verified { "Yes" } else { "No" }
    )
}

/// Ask the model to rewrite its own malformed output into strict
/// tweet-schema JSON.
pub fn build_tweet_repair_prompt(raw_content: &str) -> String {
    format!(
        "The content below was intended to be valid JSON following a strict schema, \
but the returned text appears malformed or truncated. \
Please OUTPUT ONLY a valid JSON object that follows the schema previously requested. \
If a tweet is incomplete, drop it. Keep fields compact and use double quotes.\n\n\
RAW CONTENT START:\n\n{raw_content}\n\nRAW CONTENT END."
    )
}

/// Build the executive-briefing prompt scoped to the given countries.
pub fn build_exec_prompt(countries: &[String]) -> String {
    let (start_iso, end_iso) = last_24h_window();
    let countries_text = countries.join(", ");

    let user_brief = "Prepare Executive Briefing Pack covering regulatory developments, AI developments in tech \
and in deployment/adoption by different industries/countries, M&A update deals executed and its details, \
cyberattack. Discuss with date of events and cover your analysis in last 24 hours.\n\n\
Cyber attack : New attacks reported in different parts of world, details of incident, impact it caused, \
segregate that into private sector, govt sector, who caused it, what sort of attack (e.g., ransomware) and recovery efforts. \
If no attack, bring recovery efforts underway for earlier reported incidents.\n\n\
Rules and regulations development : in fintech, banking, different industries related regulatory new updates, crypto world developments, \
accounting, taxation, insurance, law, data privacy, auditing - only new updates.\n\n\
Audit /consulting firms news update : It can cover audit firms related news such as EY/KPMG/PwC related actions - violation/fines/use of AI/Deployment of AI in finance/audit world.\n\n\
Mergers & Acquisitions : New deals announced, acquirer, acquiree, size, valuation metrics, rationale, impact, valuation basis.\n\n\
Give citation references from where details sought so users can click and expand more. General CFO - Lessons from the above - just summary lines.";

    let do_not_rules = "Return only a single VALID JSON object and nothing else. Use double quotes only. \
Do NOT include salutations, greetings, 'Hello', 'Hi', 'Dear', or conversational openers. \
Start the `document` content directly with the briefing title or first section (no preamble). \
The `document` field should be readable and may include Markdown (including markdown tables). \
Additionally, include a machine-readable `tables` array: each table entry must be {title, headers: [...], rows: [[...],[...]]}. \
If you include a visual table inside `document`, also include the same table in `tables` for programmatic use.";

    format!(
        "You are an assistant that prepares high-quality Executive Briefing Packs for senior executives.\n\n\
Output Requirement:\n\
Return a STRICT, valid JSON object using the exact schema below (no extra keys, no commentary):\n\n\
{EXEC_SCHEMA_JSON}\n\n\
Instructions:\n\
- TIME WINDOW: Only consider news and social posts published between {start_iso} (inclusive) and {end_iso} (inclusive) - i.e., the last 24 hours.\n\
- SCOPE: Limit your search and synthesis to events and reporting relating to these countries ONLY: {countries_text}.\n\
- FORMAT: Provide the briefing in `document` (readable text). If there are tabular items (e.g., M&A or deals), embed a readable Markdown table in `document` and ALSO include a corresponding structured object in `tables`.\n\n\
USER BRIEF:\n{user_brief}\n\n\
Other rules:\n{do_not_rules}\n\n\
If you cannot find content for a subsection, explicitly state 'No material new items in the last 24 hours' for that subsection but provide a short analytical comment. Always return valid JSON even if some arrays are empty."
    )
}

/// Ask the model to rewrite its own malformed output into strict
/// exec-schema JSON, converting any narrative tables into arrays.
pub fn build_exec_repair_prompt(raw_content: &str) -> String {
    format!(
        "The content below was intended to be valid JSON following this schema:\n\n\
{EXEC_SCHEMA_JSON}\n\n\
However it's malformed/truncated. Please OUTPUT ONLY a single VALID JSON object exactly following the schema. \
If you included any readable tables in the `document`, also add a corresponding entry in `tables` with 'title', 'headers' and 'rows'. \
If a subsection has no new items, put: 'No material new items in the last 24 hours' for that subsection.\n\n\
RAW CONTENT START:\n\n{raw_content}\n\nRAW CONTENT END."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_topics_have_specific_instructions() {
        for topic in ["ai", "cyber", "regulation", "ma", "market", "audit"] {
            let instr = topic_instruction(topic);
            assert!(instr.starts_with("Return tweets strictly about"));
            assert!(!instr.contains("strictly about {"));
        }
    }

    #[test]
    fn unknown_topic_falls_back_to_generic_instruction() {
        assert_eq!(
            topic_instruction("space"),
            "Return tweets strictly about space."
        );
    }

    #[test]
    fn topic_lookup_is_case_insensitive() {
        assert_eq!(topic_instruction("AI"), topic_instruction("ai"));
    }

    #[test]
    fn tweet_prompt_embeds_schema_and_count() {
        let prompt = build_tweet_prompt("market", 5, true);
        assert!(prompt.contains("\"tweets\": ["));
        assert!(prompt.contains("Return up to 5 tweets"));
        assert!(prompt.contains("PREFER_VERIFIED: Yes"));
    }

    #[test]
    fn exec_prompt_scopes_to_countries() {
        let countries = vec!["Qatar".to_string(), "Oman".to_string()];
        let prompt = build_exec_prompt(&countries);
        assert!(prompt.contains("Qatar, Oman"));
        assert!(prompt.contains("\"document\":"));
    }

    #[test]
    fn repair_prompts_embed_the_raw_content() {
        let raw = "{\"tweets\": [truncated";
        assert!(build_tweet_repair_prompt(raw).contains(raw));
        assert!(build_exec_repair_prompt(raw).contains(raw));
    }

    #[test]
    fn window_bounds_are_rfc3339_and_ordered() {
        let (start, end) = last_24h_window();
        assert!(start < end);
        assert!(start.ends_with('Z') || start.contains('+'));
    }
}
