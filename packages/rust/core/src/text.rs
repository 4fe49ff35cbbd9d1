//! Rich-text flattening.
//!
//! Text in listing payloads arrives as a plain string, as
//! `{"simpleText": "..."}`, as `{"content": "..."}`, or as
//! `{"runs": [{"text": "..."}, ...]}`. These helpers reduce all of them to a
//! plain string.

use std::borrow::Cow;

use serde_json::Value;

/// Keys holding the whole text directly.
const DIRECT_TEXT_KEYS: [&str; 2] = ["simpleText", "content"];

/// Flatten a rich-text value.
///
/// A direct-text field wins; otherwise a `runs` list is joined with single
/// spaces, skipping runs without text. Anything else is returned unchanged.
pub fn flatten(value: &Value) -> Cow<'_, Value> {
    for key in DIRECT_TEXT_KEYS {
        if let Some(text) = value.get(key).filter(|v| v.is_string()) {
            return Cow::Borrowed(text);
        }
    }

    if let Some(Value::Array(runs)) = value.get("runs") {
        let joined = runs
            .iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        return Cow::Owned(Value::String(joined));
    }

    Cow::Borrowed(value)
}

/// Flatten `value` and render it as a string, if it is textual or numeric.
pub fn text_of(value: &Value) -> Option<String> {
    match flatten(value).as_ref() {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_text_wins() {
        let value = json!({"simpleText": "Hello", "runs": [{"text": "ignored"}]});
        assert_eq!(flatten(&value).as_ref(), &json!("Hello"));
    }

    #[test]
    fn attributed_content() {
        let value = json!({"content": "Lockup title", "styleRuns": []});
        assert_eq!(text_of(&value).as_deref(), Some("Lockup title"));
    }

    #[test]
    fn runs_joined_with_spaces() {
        let value = json!({"runs": [{"text": "Breaking"}, {"emoji": {}}, {"text": "news"}]});
        assert_eq!(flatten(&value).as_ref(), &json!("Breaking news"));
    }

    #[test]
    fn empty_runs_is_empty_string() {
        let value = json!({"runs": []});
        assert_eq!(flatten(&value).as_ref(), &json!(""));
    }

    #[test]
    fn passthrough() {
        let plain = json!("already text");
        assert!(matches!(flatten(&plain), Cow::Borrowed(_)));
        assert_eq!(flatten(&plain).as_ref(), &plain);

        let other = json!({"accessibility": {}});
        assert_eq!(flatten(&other).as_ref(), &other);
        assert_eq!(text_of(&other), None);
    }

    #[test]
    fn numbers_render_as_text() {
        assert_eq!(text_of(&json!(213)).as_deref(), Some("213"));
    }
}
