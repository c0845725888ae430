//! First cleanup pass over raw model output.
//!
//! Models routinely wrap their answer in markdown fences, leave trailing
//! commas, or emit typographic quotes. None of that survives a strict JSON
//! parse, so it is removed up front. The pass is total: text with nothing to
//! fix comes back unchanged (modulo outer whitespace).

use regex::Regex;
use std::sync::LazyLock;

// Bare ``` fences are stripped along with ```json ones, so markdown code
// blocks do not survive into text that later becomes a raw document floor.
static RE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?").expect("fence pattern"));
static RE_TRAILING_COMMA_OBJ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("trailing comma pattern"));
static RE_TRAILING_COMMA_ARR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]").expect("trailing comma pattern"));

/// Strip markdown code-fence markers, trailing commas before `}`/`]`, and
/// map Unicode smart quotes to their ASCII equivalents.
pub fn normalize_model_text(text: &str) -> String {
    let cleaned = text.trim();
    let cleaned = RE_FENCE.replace_all(cleaned, "");
    let cleaned = RE_TRAILING_COMMA_OBJ.replace_all(&cleaned, "}");
    let cleaned = RE_TRAILING_COMMA_ARR.replace_all(&cleaned, "]");
    cleaned
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace('\u{2019}', "'")
}
