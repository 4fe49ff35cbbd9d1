//! Path expressions over untyped documents.
//!
//! A path is a dotted string with optional `name[index]` brackets
//! (`contents[0].videoRenderer.title`) or a pre-split list of segments.
//! When a field segment lands on a list, the list's elements are searched in
//! order and the first one the rest of the path resolves against wins.

use std::borrow::Cow;

use serde_json::Value;

use crate::text::flatten;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Mapping key lookup, or a search across list elements.
    Field(String),
    /// Direct list index.
    Index(usize),
    /// A bracket that is not a non-negative integer (e.g. `[-1]`, `[x]`).
    /// Never resolves.
    Invalid,
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Parse a dotted/bracketed expression. Empty pieces (`a..b`) are skipped.
    pub fn parse(expr: &str) -> Self {
        let mut segments = Vec::new();

        for piece in expr.split('.') {
            let (name, mut brackets) = match piece.find('[') {
                Some(pos) => piece.split_at(pos),
                None => (piece, ""),
            };
            if !name.is_empty() {
                segments.push(Segment::Field(name.to_string()));
            }

            while !brackets.is_empty() {
                let Some(end) = brackets.find(']') else {
                    segments.push(Segment::Invalid);
                    break;
                };
                let inner = brackets.get(1..end).unwrap_or_default();
                segments.push(parse_index(inner).map_or(Segment::Invalid, Segment::Index));
                brackets = &brackets[end + 1..];
                if !brackets.is_empty() && !brackets.starts_with('[') {
                    segments.push(Segment::Invalid);
                    break;
                }
            }
        }

        Self { segments }
    }

    /// Build a path from pre-split segments; all-digit segments are indices.
///
/// An index applied to a mapping looks up its decimal key instead.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|s| {
                let s = s.as_ref();
                parse_index(s).map_or_else(|| Segment::Field(s.to_string()), Segment::Index)
            })
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for Path {
    fn from(expr: &str) -> Self {
        Self::parse(expr)
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => write!(f, "{name}")?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
                Segment::Invalid => f.write_str("[?]")?,
            }
        }
        Ok(())
    }
}

/// Strictly digits; a sign is not index syntax.
fn parse_index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve `path` against `root`.
///
/// Returns `None` for an empty path, a missing field, an out-of-range index,
/// an invalid segment, or a value that resolves to `null`.
pub fn resolve<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    resolve_segments(root, &path.segments)
}

fn resolve_segments<'a>(value: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    let Some((head, rest)) = segments.split_first() else {
        return (!value.is_null()).then_some(value);
    };

    match (head, value) {
        (Segment::Field(name), Value::Object(map)) => resolve_segments(map.get(name)?, rest),
        (Segment::Field(_), Value::Array(items)) => items
            .iter()
            .find_map(|item| resolve_segments(item, segments)),
        (Segment::Index(idx), Value::Array(items)) => resolve_segments(items.get(*idx)?, rest),
        (Segment::Index(idx), Value::Object(map)) => {
            resolve_segments(map.get(&idx.to_string())?, rest)
        }
        _ => None,
    }
}

/// Resolve `path` against `root`, falling back to `default`.
pub fn get_by_path<'a>(root: &'a Value, path: &Path, default: &'a Value) -> &'a Value {
    resolve(root, path).unwrap_or(default)
}

/// Resolve the first candidate path that exists.
pub fn resolve_first<'a>(root: &'a Value, paths: &[Path]) -> Option<&'a Value> {
    paths.iter().find_map(|path| resolve(root, path))
}

/// Resolve the first candidate path that exists and flatten it as rich text.
pub fn get_flattened_by_path<'a>(
    root: &'a Value,
    paths: &[Path],
    default: &'a Value,
) -> Cow<'a, Value> {
    match resolve_first(root, paths) {
        Some(value) => flatten(value),
        None => Cow::Borrowed(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "videoRenderer": {
                "videoId": "abc",
                "ownerText": {
                    "runs": [
                        {"text": "Channel"},
                        {"text": "Name", "navigationEndpoint": {"browseEndpoint": {"browseId": "UC42"}}}
                    ]
                },
                "thumbnailOverlays": [
                    {"thumbnailOverlayTimeStatusRenderer": {"text": {"simpleText": "4:20"}}},
                    {"thumbnailOverlayResumePlaybackRenderer": {"percentDurationWatched": 75}}
                ],
                "empty": null
            }
        })
    }

    #[test]
    fn parse_dotted_and_bracketed() {
        let path = Path::parse("contents[0][2].title.runs");
        assert_eq!(
            path.segments(),
            &[
                Segment::Field("contents".into()),
                Segment::Index(0),
                Segment::Index(2),
                Segment::Field("title".into()),
                Segment::Field("runs".into()),
            ]
        );
        assert_eq!(path.to_string(), "contents[0][2].title.runs");
    }

    #[test]
    fn negative_and_malformed_brackets_are_invalid() {
        assert_eq!(
            Path::parse("items[-1]").segments(),
            &[Segment::Field("items".into()), Segment::Invalid]
        );
        assert_eq!(
            Path::parse("items[+1]").segments(),
            &[Segment::Field("items".into()), Segment::Invalid]
        );
        assert_eq!(
            Path::parse("items[0").segments(),
            &[Segment::Field("items".into()), Segment::Invalid]
        );
    }

    #[test]
    fn resolves_simple_fields() {
        let doc = doc();
        assert_eq!(
            resolve(&doc, &Path::parse("videoRenderer.videoId")),
            Some(&json!("abc"))
        );
    }

    #[test]
    fn searches_lists_for_first_match() {
        let doc = doc();
        let channel = Path::parse("videoRenderer.ownerText.runs.navigationEndpoint.browseEndpoint.browseId");
        assert_eq!(resolve(&doc, &channel), Some(&json!("UC42")));

        let watched = Path::parse(
            "videoRenderer.thumbnailOverlays.thumbnailOverlayResumePlaybackRenderer.percentDurationWatched",
        );
        assert_eq!(resolve(&doc, &watched), Some(&json!(75)));
    }

    #[test]
    fn indexes_directly() {
        let doc = doc();
        let first = Path::parse("videoRenderer.ownerText.runs[0].text");
        assert_eq!(resolve(&doc, &first), Some(&json!("Channel")));

        let out_of_range = Path::parse("videoRenderer.ownerText.runs[5].text");
        assert_eq!(resolve(&doc, &out_of_range), None);

        let negative = Path::parse("videoRenderer.ownerText.runs[-1].text");
        assert_eq!(resolve(&doc, &negative), None);
    }

    #[test]
    fn failures_return_default() {
        let doc = doc();
        let fallback = json!("fallback");
        for expr in ["", "nope", "videoRenderer.empty", "videoRenderer.videoId.deeper"] {
            assert_eq!(get_by_path(&doc, &Path::parse(expr), &fallback), &fallback, "{expr}");
        }
        assert_eq!(get_by_path(&Value::Null, &Path::parse("a"), &fallback), &fallback);
    }

    #[test]
    fn pre_split_segments() {
        let doc = doc();
        let path = Path::from_segments(["videoRenderer", "ownerText", "runs", "1", "text"]);
        assert_eq!(resolve(&doc, &path), Some(&json!("Name")));
    }

    #[test]
    fn digit_segments_match_mapping_keys() {
        let doc = json!({"a": {"0": "zero"}, "list": ["first"]});
        let path = Path::from_segments(["a", "0"]);
        assert_eq!(resolve(&doc, &path), Some(&json!("zero")));
        assert_eq!(resolve(&doc, &Path::parse("list[0]")), Some(&json!("first")));
    }

    #[test]
    fn flattened_tries_candidates_in_order() {
        let doc = doc();
        let paths = [
            Path::parse("videoRenderer.lengthText"),
            Path::parse("videoRenderer.thumbnailOverlays.thumbnailOverlayTimeStatusRenderer.text"),
        ];
        let fallback = Value::Null;
        assert_eq!(get_flattened_by_path(&doc, &paths, &fallback).as_ref(), &json!("4:20"));

        let owner = [Path::parse("videoRenderer.ownerText")];
        assert_eq!(
            get_flattened_by_path(&doc, &owner, &fallback).as_ref(),
            &json!("Channel Name")
        );

        let missing = [Path::parse("videoRenderer.missing")];
        assert!(get_flattened_by_path(&doc, &missing, &fallback).is_null());
    }
}
