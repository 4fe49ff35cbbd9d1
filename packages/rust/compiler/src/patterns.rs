//! Raw rule strings to `(pattern, flags)` pairs.
//!
//! Identifier categories compile to anchored exact matches, keyword
//! categories to case-insensitive boundary-delimited matches, and
//! `/pattern/flags` entries pass through verbatim.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use tubesieve_shared::{FilterSpec, TextCategory};

/// Characters that delimit a keyword match.
const BOUNDARY: &str = r#"[\s.,!?;:'"()\[\]{}<>|/\\_\-]"#;

/// Matches the `/pattern/flags` raw-regex form.
static RAW_REGEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(.+)/([a-z]*)$").expect("raw regex form"));

/// Compile raw entries for one category.
///
/// Returns `None` when `entries` is not a list of strings: the caller should
/// keep whatever it had. A list holding a single empty string is the
/// "clear all filters" signal and yields an empty list.
///
/// Entries are trimmed, blank entries and `//` comments are skipped, and
/// duplicates (by trimmed text) are dropped keeping the first occurrence.
/// An entry whose pattern does not build is logged and dropped without
/// affecting the rest of the category.
pub fn compile_entries(entries: &Value, category: TextCategory) -> Option<Vec<FilterSpec>> {
    let Some(items) = entries.as_array() else {
        warn!(%category, "rule entries are not a list, leaving category unchanged");
        return None;
    };

    let mut raw: Vec<&str> = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) => raw.push(s),
            None => {
                warn!(%category, "rule list contains a non-string entry, leaving category unchanged");
                return None;
            }
        }
    }

    if raw.len() == 1 && raw[0].is_empty() {
        debug!(%category, "clearing category");
        return Some(Vec::new());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut specs = Vec::new();

    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if !seen.insert(trimmed) {
            continue;
        }

        let spec = compile_entry(trimmed, category);
        match spec.to_regex() {
            Ok(_) => specs.push(spec),
            Err(e) => warn!(%category, entry = trimmed, error = %e, "dropping invalid rule"),
        }
    }

    debug!(%category, count = specs.len(), "compiled rules");
    Some(specs)
}

/// Compile a single, already trimmed entry.
///
/// Identifier values are regex-escaped before anchoring, so `a.b` becomes
/// `^a\.b$` rather than the verbatim `^a.b$`.
pub fn compile_entry(entry: &str, category: TextCategory) -> FilterSpec {
    if category.is_identifier() {
        return FilterSpec::new(format!("^{}$", regex::escape(entry)), "");
    }

    if let Some(caps) = RAW_REGEX_RE.captures(entry) {
        return FilterSpec::new(&caps[1], &caps[2]);
    }

    FilterSpec::new(keyword_pattern(entry), "i")
}

/// Escape `keyword` and wrap it so it only matches between boundaries.
fn keyword_pattern(keyword: &str) -> String {
    format!(
        "(^|{BOUNDARY})({})({BOUNDARY}|$)",
        regex::escape(keyword)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn specs(entries: Value, category: TextCategory) -> Vec<FilterSpec> {
        compile_entries(&entries, category).expect("list input")
    }

    fn matches(spec: &FilterSpec, text: &str) -> bool {
        spec.to_regex().expect("valid regex").is_match(text)
    }

    #[test]
    fn identifier_is_anchored() {
        let out = specs(json!(["BLOCKED_1"]), TextCategory::VideoId);
        assert_eq!(out, vec![FilterSpec::new("^BLOCKED_1$", "")]);
        assert!(matches(&out[0], "BLOCKED_1"));
        assert!(!matches(&out[0], "BLOCKED_1x"));
    }

    #[test]
    fn identifier_metacharacters_are_literal() {
        let out = specs(json!(["@some.handle"]), TextCategory::ChannelId);
        assert_eq!(out[0].pattern, r"^@some\.handle$");
        assert!(matches(&out[0], "@some.handle"));
        assert!(!matches(&out[0], "@someXhandle"));
    }

    #[test]
    fn identifier_ignores_raw_regex_form() {
        let out = specs(json!(["/abc/i"]), TextCategory::VideoId);
        assert!(matches(&out[0], "/abc/i"));
        assert!(!matches(&out[0], "ABC"));
    }

    #[test]
    fn keyword_is_case_insensitive_and_bounded() {
        let out = specs(json!(["block"]), TextCategory::Title);
        assert_eq!(out[0].flags, "i");
        assert!(matches(&out[0], "please block this"));
        assert!(matches(&out[0], "BLOCK"));
        assert!(matches(&out[0], "(block)"));
        assert!(!matches(&out[0], "blockchain"));
        assert!(!matches(&out[0], "unblock"));
    }

    #[test]
    fn keyword_escapes_metacharacters() {
        let out = specs(json!(["c++ (2024)"]), TextCategory::Title);
        assert!(matches(&out[0], "learn c++ (2024) fast"));
        assert!(!matches(&out[0], "learn cc (2024) fast"));
    }

    #[test]
    fn raw_regex_passes_through() {
        let out = specs(json!(["/foo/i", "/bar/"]), TextCategory::Title);
        assert_eq!(out[0], FilterSpec::new("foo", "i"));
        assert_eq!(out[1], FilterSpec::new("bar", ""));
        assert!(matches(&out[0], "Foo bar"));
        assert!(!matches(&FilterSpec::new("foo", ""), "Foo bar"));
    }

    #[test]
    fn duplicates_removed_in_order() {
        let out = specs(json!(["dup", "dup", "x", "  dup  "]), TextCategory::ChannelName);
        assert_eq!(out.len(), 2);
        assert!(matches(&out[0], "dup"));
        assert!(matches(&out[1], "x"));
    }

    #[test]
    fn blanks_and_comments_skipped() {
        let out = specs(json!(["", "   ", "// note", "  // indented note", "real"]), TextCategory::VideoId);
        assert_eq!(out, vec![FilterSpec::new("^real$", "")]);
    }

    #[test]
    fn single_empty_string_clears() {
        assert_eq!(compile_entries(&json!([""]), TextCategory::Title), Some(Vec::new()));
        assert_eq!(compile_entries(&json!([]), TextCategory::Title), Some(Vec::new()));
    }

    #[test]
    fn non_list_is_unchanged() {
        assert_eq!(compile_entries(&json!("title"), TextCategory::Title), None);
        assert_eq!(compile_entries(&json!(null), TextCategory::Title), None);
        assert_eq!(compile_entries(&json!(["ok", 3]), TextCategory::Title), None);
    }

    #[test]
    fn invalid_regex_dropped_others_kept() {
        let out = specs(json!(["/(unclosed/", "/fine/i", "/x/q", "keyword"]), TextCategory::Comment);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], FilterSpec::new("fine", "i"));
    }
}
