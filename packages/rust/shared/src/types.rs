//! Core domain types: rule specs, filter options, and the compiled config.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TubeSieveError};

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// One compiled `(pattern, flags)` rule in transport form.
///
/// Deliberately a pair of strings rather than a built matcher, so the compiled
/// config can be serialized between the compiling side and the filtering side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
}

impl FilterSpec {
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    /// Build a matcher for this spec.
    ///
    /// `i`, `m` and `s` map onto the matching regex options; `g`, `u`, `y`
    /// and `d` only affect iteration state and are ignored. Any other flag is
    /// rejected.
    pub fn to_regex(&self) -> Result<Regex> {
        let mut builder = RegexBuilder::new(&self.pattern);
        for flag in self.flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'g' | 'u' | 'y' | 'd' => &mut builder,
                other => {
                    return Err(TubeSieveError::pattern(
                        &self.pattern,
                        &self.flags,
                        format!("unsupported flag '{other}'"),
                    ));
                }
            };
        }
        builder
            .build()
            .map_err(|e| TubeSieveError::pattern(&self.pattern, &self.flags, e.to_string()))
    }
}

impl std::fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Text rule categories carried in `filterData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextCategory {
    VideoId,
    ChannelId,
    ChannelName,
    Title,
    Comment,
    Description,
}

impl TextCategory {
    /// All categories, in predicate evaluation order.
    pub const ALL: [TextCategory; 6] = [
        TextCategory::VideoId,
        TextCategory::ChannelId,
        TextCategory::ChannelName,
        TextCategory::Title,
        TextCategory::Comment,
        TextCategory::Description,
    ];

    /// Wire name used in `filterData`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VideoId => "videoId",
            Self::ChannelId => "channelId",
            Self::ChannelName => "channelName",
            Self::Title => "title",
            Self::Comment => "comment",
            Self::Description => "description",
        }
    }

    /// Identifier categories match whole values exactly instead of keywords.
    pub fn is_identifier(self) -> bool {
        matches!(self, Self::VideoId | Self::ChannelId)
    }
}

impl std::fmt::Display for TextCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content categories that can be hidden wholesale with a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Shorts,
    Movies,
    Mixes,
    Trending,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How the duration range is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationMode {
    /// Keep items inside the range, remove everything else.
    Allow,
    /// Remove items inside the range.
    #[default]
    Block,
}

/// The `options` section: category toggles, duration mode, predicate switch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    pub shorts: bool,
    pub movies: bool,
    pub mixes: bool,
    pub trending: bool,
    pub duration_mode: DurationMode,
    /// Enables the custom predicate, if one is configured.
    pub custom_predicate: bool,
}

impl FilterOptions {
    /// Whether the toggle for `category` is on.
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Shorts => self.shorts,
            Category::Movies => self.movies,
            Category::Mixes => self.mixes,
            Category::Trending => self.trending,
        }
    }

    pub fn any_category_enabled(&self) -> bool {
        self.shorts || self.movies || self.mixes || self.trending
    }
}

// ---------------------------------------------------------------------------
// DurationRange
// ---------------------------------------------------------------------------

/// A `[min, max]` duration range in seconds; either bound may be unset.
///
/// On the wire this is a one- or two-element array. `null`, negative and
/// non-finite bounds are treated as unset, so `[60, null]` and `[60]` both
/// mean "at least a minute".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Option<f64>>", into = "Vec<Option<f64>>")]
pub struct DurationRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DurationRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.filter(|v| v.is_finite() && *v >= 0.0),
            max: max.filter(|v| v.is_finite() && *v >= 0.0),
        }
    }

    /// A range with no bounds never filters anything.
    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Whether `seconds` lies within the (inclusive) bounds.
    ///
    /// Always `false` for an inactive range or a NaN input.
    pub fn contains(&self, seconds: f64) -> bool {
        if !self.is_active() || seconds.is_nan() {
            return false;
        }
        self.min.is_none_or(|min| seconds >= min) && self.max.is_none_or(|max| seconds <= max)
    }
}

impl From<Vec<Option<f64>>> for DurationRange {
    fn from(bounds: Vec<Option<f64>>) -> Self {
        let min = bounds.first().copied().flatten();
        let max = bounds.get(1).copied().flatten();
        Self::new(min, max)
    }
}

impl From<DurationRange> for Vec<Option<f64>> {
    fn from(range: DurationRange) -> Self {
        vec![range.min, range.max]
    }
}

// ---------------------------------------------------------------------------
// CompiledConfig
// ---------------------------------------------------------------------------

/// Compiled `filterData`: per-category rule lists plus pass-through numerics.
///
/// Categories absent from the raw config stay `None`; nothing is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledFilterData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<Vec<FilterSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Vec<FilterSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<Vec<FilterSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Vec<FilterSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Vec<FilterSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Vec<FilterSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vid_length: Option<DurationRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_watched_hide: Option<f64>,
    /// Source of the scripted custom predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_predicate: Option<String>,
}

impl CompiledFilterData {
    /// The compiled rules for `category`, if that category was present.
    pub fn specs(&self, category: TextCategory) -> Option<&[FilterSpec]> {
        match category {
            TextCategory::VideoId => self.video_id.as_deref(),
            TextCategory::ChannelId => self.channel_id.as_deref(),
            TextCategory::ChannelName => self.channel_name.as_deref(),
            TextCategory::Title => self.title.as_deref(),
            TextCategory::Comment => self.comment.as_deref(),
            TextCategory::Description => self.description.as_deref(),
        }
    }

    /// Mutable slot for `category`.
    pub fn specs_mut(&mut self, category: TextCategory) -> &mut Option<Vec<FilterSpec>> {
        match category {
            TextCategory::VideoId => &mut self.video_id,
            TextCategory::ChannelId => &mut self.channel_id,
            TextCategory::ChannelName => &mut self.channel_name,
            TextCategory::Title => &mut self.title,
            TextCategory::Comment => &mut self.comment,
            TextCategory::Description => &mut self.description,
        }
    }

    /// A threshold of zero or below is treated as unset.
    pub fn watched_threshold(&self) -> Option<f64> {
        self.percent_watched_hide.filter(|t| *t > 0.0)
    }
}

/// Everything one traversal needs, ready to be handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledConfig {
    #[serde(default)]
    pub filter_data: CompiledFilterData,
    #[serde(default)]
    pub options: FilterOptions,
}

impl CompiledConfig {
    /// Whether the scripted custom predicate is both configured and switched on.
    pub fn custom_predicate_source(&self) -> Option<&str> {
        if !self.options.custom_predicate {
            return None;
        }
        self.filter_data
            .custom_predicate
            .as_deref()
            .filter(|src| !src.trim().is_empty())
    }

    /// `false` when no rule, range, threshold, toggle or predicate is active.
    pub fn has_active_filters(&self) -> bool {
        let any_specs = TextCategory::ALL
            .iter()
            .any(|c| self.filter_data.specs(*c).is_some_and(|s| !s.is_empty()));

        any_specs || self.has_active_thresholds() || self.custom_predicate_source().is_some()
    }

    /// Duration range, watched threshold or category toggle in effect.
    pub fn has_active_thresholds(&self) -> bool {
        self.filter_data.vid_length.is_some_and(|r| r.is_active())
            || self.filter_data.watched_threshold().is_some()
            || self.options.any_category_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_spec_flags() {
        let insensitive = FilterSpec::new("foo", "i").to_regex().expect("build");
        assert!(insensitive.is_match("Foo bar"));

        let sensitive = FilterSpec::new("foo", "").to_regex().expect("build");
        assert!(!sensitive.is_match("Foo bar"));

        let global = FilterSpec::new("foo", "gu").to_regex().expect("build");
        assert!(global.is_match("foo"));
    }

    #[test]
    fn filter_spec_rejects_bad_input() {
        let err = FilterSpec::new("foo", "q").to_regex().unwrap_err();
        assert!(err.to_string().contains("unsupported flag 'q'"));

        assert!(FilterSpec::new("(unclosed", "").to_regex().is_err());
    }

    #[test]
    fn duration_range_from_wire() {
        let range: DurationRange = serde_json::from_str("[60, null]").expect("deserialize");
        assert_eq!(range.min, Some(60.0));
        assert_eq!(range.max, None);

        let range: DurationRange = serde_json::from_str("[-1, 120]").expect("deserialize");
        assert_eq!(range.min, None);
        assert_eq!(range.max, Some(120.0));

        let range: DurationRange = serde_json::from_str("[]").expect("deserialize");
        assert!(!range.is_active());
    }

    #[test]
    fn duration_range_contains() {
        let range = DurationRange::new(Some(60.0), Some(120.0));
        assert!(range.contains(90.0));
        assert!(range.contains(60.0));
        assert!(!range.contains(180.0));
        assert!(!range.contains(f64::NAN));

        let open = DurationRange::new(Some(60.0), None);
        assert!(open.contains(3600.0));
        assert!(!open.contains(30.0));
    }

    #[test]
    fn compiled_config_omits_absent_categories() {
        let config = CompiledConfig {
            filter_data: CompiledFilterData {
                title: Some(vec![FilterSpec::new("^x$", "")]),
                ..Default::default()
            },
            options: FilterOptions::default(),
        };

        let json = serde_json::to_value(&config).expect("serialize");
        let data = json["filterData"].as_object().expect("filterData object");
        assert_eq!(data.len(), 1);
        assert!(data.contains_key("title"));
        assert_eq!(json["options"]["durationMode"], "block");
    }

    #[test]
    fn empty_config_has_no_active_filters() {
        let mut config = CompiledConfig::default();
        assert!(!config.has_active_filters());

        config.filter_data.title = Some(Vec::new());
        config.filter_data.vid_length = Some(DurationRange::new(None, None));
        config.filter_data.custom_predicate = Some("true".into());
        assert!(!config.has_active_filters());

        config.options.custom_predicate = true;
        assert!(config.has_active_filters());
    }

    #[test]
    fn thresholds_alone_activate_filtering() {
        let mut config = CompiledConfig::default();
        config.filter_data.percent_watched_hide = Some(0.0);
        assert!(!config.has_active_thresholds());

        config.filter_data.vid_length = Some(DurationRange::new(Some(60.0), None));
        assert!(config.has_active_thresholds());
        assert!(config.has_active_filters());

        config.filter_data.vid_length = None;
        config.options.shorts = true;
        assert!(config.has_active_thresholds());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: FilterOptions =
            serde_json::from_str(r#"{"shorts": true, "durationMode": "allow"}"#)
                .expect("deserialize");
        assert!(options.is_enabled(Category::Shorts));
        assert!(!options.is_enabled(Category::Movies));
        assert_eq!(options.duration_mode, DurationMode::Allow);
    }
}
