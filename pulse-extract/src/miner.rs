//! Regex mining of tweet-shaped fragments from arbitrary text.
//!
//! Engaged only when structured parsing is exhausted; never fails. Each
//! `"text": "..."` occurrence anchors a bounded context window so one
//! record's companion fields cannot be contaminated by a neighbour's. When
//! no `"text"` fields exist at all, canonical post URLs become the anchors
//! instead.

use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Context window around a `"text"` match (primary strategy).
const TEXT_WINDOW: usize = 500;
/// Asymmetric window around a URL match (secondary strategy): the text of a
/// post usually trails its URL in model commentary.
const URL_WINDOW_BEFORE: usize = 200;
const URL_WINDOW_AFTER: usize = 400;

static RE_POST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:x\.com|twitter\.com)/(?P<author>[^/\s]+)/status/(?P<id>\d+)")
        .expect("post url pattern")
});
static RE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""id"\s*:\s*"?(?P<id>\d{5,})"?"#).expect("id pattern"));
static RE_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""author"\s*:\s*"?(?P<author>@?[\w]{1,30})"?"#).expect("author pattern")
});
static RE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"text"\s*:\s*"(?P<text>(?:\\.|[^"\\])*)""#).expect("text pattern")
});
static RE_CREATED_AT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""created_at"\s*:\s*"(?P<created>[^"]+)""#).expect("created_at pattern")
});
static RE_WHY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"why_selected"\s*:\s*"(?P<why>(?:\\.|[^"\\])*)""#).expect("why pattern")
});
static RE_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"summary"\s*:\s*"(?P<summary>(?:\\.|[^"\\])*)""#).expect("summary pattern")
});

/// Best-effort recovery of tweet-shaped fragments from `text`.
///
/// Returns loosely-typed field mappings; callers must still run every entry
/// through the record sanitizer. An empty result is a valid outcome.
pub fn mine_tweet_blocks(text: &str) -> Vec<Value> {
    let mut results: Vec<Value> = Vec::new();
    if text.is_empty() {
        return results;
    }

    for m in RE_TEXT.captures_iter(text) {
        let whole = m.get(0).expect("capture 0");
        let window = window_around(text, whole.start(), whole.end(), TEXT_WINDOW, TEXT_WINDOW);

        let mut tweet = empty_block();
        tweet["text"] = json!(unescape_fragment(&m["text"]));
        if let Some(id) = RE_ID.captures(window) {
            tweet["id"] = json!(&id["id"]);
        }
        if let Some(author) = RE_AUTHOR.captures(window) {
            tweet["author"] = json!(with_at_prefix(&author["author"]));
        }
        if let Some(created) = RE_CREATED_AT.captures(window) {
            tweet["created_at"] = json!(&created["created"]);
        }
        if let Some(why) = RE_WHY.captures(window) {
            tweet["why_selected"] = json!(unescape_fragment(&why["why"]));
        }
        if let Some(url) = RE_POST_URL.captures(window) {
            tweet["url"] = json!(url.get(0).expect("capture 0").as_str());
            // The URL itself carries id and author; use them only as backfill.
            if tweet["id"] == json!("") {
                tweet["id"] = json!(&url["id"]);
            }
            if tweet["author"] == json!("") {
                tweet["author"] = json!(with_at_prefix(&url["author"]));
            }
        }
        results.push(tweet);
    }

    if results.is_empty() {
        for m in RE_POST_URL.captures_iter(text) {
            let whole = m.get(0).expect("capture 0");
            let window = window_around(
                text,
                whole.start(),
                whole.end(),
                URL_WINDOW_BEFORE,
                URL_WINDOW_AFTER,
            );

            let mut tweet = empty_block();
            tweet["id"] = json!(&m["id"]);
            tweet["author"] = json!(with_at_prefix(&m["author"]));
            tweet["url"] = json!(whole.as_str());
            if let Some(t) = RE_TEXT.captures(window) {
                tweet["text"] = json!(unescape_fragment(&t["text"]));
            }
            if let Some(why) = RE_WHY.captures(window) {
                tweet["why_selected"] = json!(unescape_fragment(&why["why"]));
            }
            if let Some(created) = RE_CREATED_AT.captures(window) {
                tweet["created_at"] = json!(&created["created"]);
            }
            results.push(tweet);
        }
    }

    dedup_merge(results)
}

/// Recover a bare `"summary"` field from otherwise unparseable text.
pub fn mine_summary(text: &str) -> String {
    RE_SUMMARY
        .captures(text)
        .map(|m| m["summary"].to_string())
        .unwrap_or_default()
}

fn empty_block() -> Value {
    json!({
        "id": "",
        "author": "",
        "text": "",
        "url": "",
        "why_selected": "",
        "created_at": ""
    })
}

/// Identity-keyed dedup with first-wins field merge.
///
/// Key precedence: id, else url, else the first 40 characters of text. Later
/// entries only fill fields the first occurrence left empty.
fn dedup_merge(blocks: Vec<Value>) -> Vec<Value> {
    let mut ordered: Vec<Value> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for block in blocks {
        let key = identity_key(&block);
        let Some(key) = key else { continue };

        match index.get(&key) {
            Some(&at) => {
                let existing = &mut ordered[at];
                for field in ["author", "text", "url", "why_selected", "created_at"] {
                    let have = existing[field].as_str().unwrap_or_default();
                    let incoming = block[field].as_str().unwrap_or_default();
                    if have.is_empty() && !incoming.is_empty() {
                        existing[field] = json!(incoming);
                    }
                }
            }
            None => {
                index.insert(key, ordered.len());
                ordered.push(block);
            }
        }
    }

    ordered
}

fn identity_key(block: &Value) -> Option<String> {
    let field = |k: &str| {
        block
            .get(k)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    if let Some(id) = field("id") {
        return Some(id.to_string());
    }
    if let Some(url) = field("url") {
        return Some(url.to_string());
    }
    let prefix: String = field("text")?.chars().take(40).collect();
    if prefix.is_empty() { None } else { Some(prefix) }
}

/// Prefix `@` once; already-prefixed handles pass through, so the rule is
/// idempotent.
fn with_at_prefix(author: &str) -> String {
    if author.starts_with('@') {
        author.to_string()
    } else {
        format!("@{author}")
    }
}

/// Slice a byte window around `[start, end)`, clamped to char boundaries so
/// multibyte content near the edge cannot split a codepoint.
fn window_around(
    text: &str,
    start: usize,
    end: usize,
    before: usize,
    after: usize,
) -> &str {
    let lo = floor_char_boundary(text, start.saturating_sub(before));
    let hi = ceil_char_boundary(text, (end + after).min(text.len()));
    &text[lo..hi]
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, mut i: usize) -> usize {
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i.min(s.len())
}

/// Decode the escape sequences a JSON string fragment may carry. Unknown
/// escapes are kept verbatim rather than dropped.
fn unescape_fragment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
