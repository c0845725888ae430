//! Balanced-brace scanning and strict-parse-with-repair extraction.
//!
//! The model's one true answer is rarely the shortest fragment in its own
//! commentary, so candidates are ranked by length descending and the first
//! one that parses wins.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Candidates shorter than this are empty-object noise and never worth a
/// parse attempt.
const MIN_CANDIDATE_LEN: usize = 20;

static RE_SQUOTE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([A-Za-z0-9_\- ]+)'\s*:").expect("squote key pattern"));
static RE_SQUOTE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*'([^']*)'").expect("squote value pattern"));

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No substring of the input parsed as a JSON object, even after repair.
    #[error("no valid JSON object found in text")]
    NoJsonFound,
}

/// Recover the most complete JSON object embedded in `text`.
///
/// Scans once for balanced `{`/`}` regions, deduplicates them, and tries a
/// strict parse on each from largest to smallest, falling back to a
/// single-quote repair before giving up on a candidate. Unbalanced opening
/// braces never complete a region and are silently skipped. As a last resort
/// the naive first-`{`-to-last-`}` window is attempted.
pub fn extract_json_from_text(text: &str) -> Result<Value, ExtractError> {
    if text.is_empty() {
        return Err(ExtractError::NoJsonFound);
    }

    let mut candidates: Vec<&str> = Vec::new();
    let mut starts: Vec<usize> = Vec::new();
    for (i, ch) in text.char_indices() {
        match ch {
            '{' => starts.push(i),
            '}' => {
                if let Some(start) = starts.pop() {
                    if i - start > MIN_CANDIDATE_LEN {
                        candidates.push(&text[start..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    candidates.dedup();

    for cand in &candidates {
        if let Some(parsed) = try_parse(cand) {
            tracing::debug!(candidate_len = cand.len(), "extract.structured.hit");
            return Ok(parsed);
        }
    }

    // Last resort: the widest window, even if its braces are not balanced
    // candidates (e.g. the scan threshold excluded everything).
    if let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) {
        if last > first {
            if let Some(parsed) = try_parse(&text[first..=last]) {
                tracing::debug!("extract.structured.window_hit");
                return Ok(parsed);
            }
        }
    }

    Err(ExtractError::NoJsonFound)
}

/// Strict parse, then one heuristic repair round: tabs to spaces and
/// single-quoted keys/values rewritten to double quotes.
fn try_parse(s: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str::<Value>(s) {
        return Some(v);
    }

    let fixed = s.replace('\t', " ");
    let fixed = RE_SQUOTE_KEY.replace_all(&fixed, "\"$1\":");
    let fixed = RE_SQUOTE_VALUE.replace_all(&fixed, ": \"$1\"");
    serde_json::from_str::<Value>(&fixed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recovers_object_surrounded_by_prose() {
        let text = r#"Sure! Here is the data you asked for:
            {"tweets": [{"id": "123", "text": "Fed holds rates"}], "summary": "steady"}
            Let me know if you need anything else."#;
        let v = extract_json_from_text(text).unwrap();
        assert_eq!(v["summary"], json!("steady"));
        assert_eq!(v["tweets"][0]["id"], json!("123"));
    }

    #[test]
    fn prefers_longest_parsing_candidate_over_first_positional() {
        // The first balanced region is a nested echo; the full document is
        // longer and must win.
        let text = r#"{"echo": "partial fragment here"} and the real answer
            {"tweets": [{"id": "9", "text": "hello"}], "summary": "the full document"}"#;
        let v = extract_json_from_text(text).unwrap();
        assert_eq!(v["summary"], json!("the full document"));
    }

    #[test]
    fn repairs_single_quoted_keys_and_values() {
        let text = r#"{'summary': 'rates are steady today', "tweets": []}"#;
        let v = extract_json_from_text(text).unwrap();
        assert_eq!(v["summary"], json!("rates are steady today"));
    }

    #[test]
    fn empty_input_fails_immediately() {
        assert_eq!(extract_json_from_text(""), Err(ExtractError::NoJsonFound));
    }

    #[test]
    fn prose_without_braces_fails() {
        let text = "No structured content today, sorry about that.";
        assert_eq!(
            extract_json_from_text(text),
            Err(ExtractError::NoJsonFound)
        );
    }

    #[test]
    fn unbalanced_open_brace_is_skipped_not_fatal() {
        // Truncated document: the open brace never closes, the nested object
        // does and is long enough to qualify.
        let text = r#"{"tweets": [{"id": "1", "text": "hello world, markets up"}"#;
        let v = extract_json_from_text(text).unwrap();
        assert_eq!(v["id"], json!("1"));
    }

    #[test]
    fn tiny_objects_are_ignored_as_noise() {
        let text = r#"{} {"a":1} nothing of substance"#;
        assert_eq!(
            extract_json_from_text(text),
            Err(ExtractError::NoJsonFound)
        );
    }

    #[test]
    fn nested_braces_resolve_to_outer_document() {
        let text = r#"{"outer": {"inner": {"id": "42"}}, "summary": "nested"}"#;
        let v = extract_json_from_text(text).unwrap();
        assert_eq!(v["summary"], json!("nested"));
        assert_eq!(v["outer"]["inner"]["id"], json!("42"));
    }
}
