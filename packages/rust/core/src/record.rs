//! Candidate records: the comparable fields extracted from one node.

use serde::Serialize;
use serde_json::Value;

use tubesieve_shared::{Category, TextCategory};

use crate::numeric::{ParsedDuration, parse_duration, parse_view_count};
use crate::path::{Path, resolve_first};
use crate::rules::RuleSpec;
use crate::text::text_of;

/// Fields extracted from a node according to its [`RuleSpec`].
///
/// Anything the node does not carry is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub duration: Option<ParsedDuration>,
    pub view_count: Option<u64>,
    pub percent_watched: Option<f64>,
    pub categories: Vec<Category>,
}

impl CandidateRecord {
    /// Extract a record from `node` (the value under the node-type key).
    pub fn extract(node: &Value, spec: &RuleSpec) -> Self {
        let duration = first_text(node, &spec.duration).map(|t| parse_duration(&t));

        let mut categories: Vec<Category> = spec
            .categories
            .iter()
            .filter(|rule| rule.when.as_ref().is_none_or(|cond| cond.holds(node)))
            .map(|rule| rule.category)
            .collect();
        if duration == Some(ParsedDuration::ShortForm) && !categories.contains(&Category::Shorts) {
            categories.push(Category::Shorts);
        }

        Self {
            video_id: first_text(node, &spec.video_id),
            channel_id: first_text(node, &spec.channel_id),
            channel_name: first_text(node, &spec.channel_name),
            title: first_text(node, &spec.title),
            comment: first_text(node, &spec.comment),
            description: first_text(node, &spec.description),
            duration,
            view_count: first_text(node, &spec.view_count).and_then(|t| parse_view_count(&t)),
            percent_watched: resolve_first(node, &spec.percent_watched).and_then(as_percent),
            categories,
        }
    }

    /// The extracted value for a text category.
    pub fn text(&self, category: TextCategory) -> Option<&str> {
        match category {
            TextCategory::VideoId => self.video_id.as_deref(),
            TextCategory::ChannelId => self.channel_id.as_deref(),
            TextCategory::ChannelName => self.channel_name.as_deref(),
            TextCategory::Title => self.title.as_deref(),
            TextCategory::Comment => self.comment.as_deref(),
            TextCategory::Description => self.description.as_deref(),
        }
    }
}

fn first_text(node: &Value, paths: &[Path]) -> Option<String> {
    resolve_first(node, paths).and_then(text_of)
}

fn as_percent(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::FilterScope;
    use serde_json::json;

    #[test]
    fn extracts_video_renderer() {
        let node = json!({
            "videoId": "dQw4w9WgXcQ",
            "title": {"runs": [{"text": "Never"}, {"text": "Gonna"}]},
            "ownerText": {"runs": [{
                "text": "Rick",
                "navigationEndpoint": {"browseEndpoint": {"browseId": "UCuAXFkgsw1L7xaCfnd5JJOw"}}
            }]},
            "lengthText": {"simpleText": "3:33"},
            "viewCountText": {"simpleText": "1,234,567 views"},
            "thumbnailOverlays": [
                {"thumbnailOverlayResumePlaybackRenderer": {"percentDurationWatched": 40}}
            ]
        });
        let spec = FilterScope::Main.table().get("videoRenderer").expect("spec");
        let record = CandidateRecord::extract(&node, spec);

        assert_eq!(record.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(record.channel_id.as_deref(), Some("UCuAXFkgsw1L7xaCfnd5JJOw"));
        assert_eq!(record.channel_name.as_deref(), Some("Rick"));
        assert_eq!(record.title.as_deref(), Some("Never Gonna"));
        assert_eq!(record.duration, Some(ParsedDuration::Seconds(213)));
        assert_eq!(record.view_count, Some(1_234_567));
        assert_eq!(record.percent_watched, Some(40.0));
        assert!(record.categories.is_empty());
        assert_eq!(record.comment, None);
    }

    #[test]
    fn short_form_overlay_marks_shorts() {
        let node = json!({
            "videoId": "s1",
            "thumbnailOverlays": [
                {"thumbnailOverlayTimeStatusRenderer": {"text": {"simpleText": "SHORTS"}, "style": "SHORTS"}}
            ]
        });
        let spec = FilterScope::Main.table().get("gridVideoRenderer").expect("spec");
        let record = CandidateRecord::extract(&node, spec);
        assert_eq!(record.duration, Some(ParsedDuration::ShortForm));
        assert_eq!(record.categories, vec![Category::Shorts]);
    }

    #[test]
    fn serializes_for_predicates() {
        let record = CandidateRecord {
            title: Some("x".into()),
            duration: Some(ParsedDuration::ShortForm),
            categories: vec![Category::Mixes],
            ..Default::default()
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["title"], "x");
        assert_eq!(value["duration"], -2);
        assert_eq!(value["categories"], json!(["mixes"]));
        assert!(value["videoId"].is_null());
    }
}
