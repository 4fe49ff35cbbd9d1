//! Declarative rule tables: which node types are content items and where
//! their comparable fields live.
//!
//! A node "is of type T" when it is a mapping containing the key `T`. Each
//! table maps such keys to a [`RuleSpec`] listing candidate paths (relative
//! to the value under the key) for every extracted field. New node types are
//! supported by adding entries here, nothing else.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;

use tubesieve_shared::{Category, TextCategory};

use crate::path::{Path, resolve};
use crate::text::text_of;

// ---------------------------------------------------------------------------
// RuleSpec
// ---------------------------------------------------------------------------

/// A test on a node's own fields.
#[derive(Debug, Clone)]
pub enum Condition {
    /// The path resolves to text equal to the given value.
    Equals(Path, String),
    /// The path resolves at all.
    Present(Path),
}

impl Condition {
    pub fn holds(&self, node: &Value) -> bool {
        match self {
            Self::Equals(path, expected) => resolve(node, path)
                .and_then(text_of)
                .is_some_and(|text| text == *expected),
            Self::Present(path) => resolve(node, path).is_some(),
        }
    }
}

/// Membership of a node type in a toggleable category.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    /// When set, membership only applies if the condition holds.
    pub when: Option<Condition>,
}

/// Extraction spec for one node type.
///
/// Every field lists candidate paths tried in order; the first that resolves
/// wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    pub video_id: Vec<Path>,
    pub channel_id: Vec<Path>,
    pub channel_name: Vec<Path>,
    pub title: Vec<Path>,
    pub comment: Vec<Path>,
    pub description: Vec<Path>,
    pub duration: Vec<Path>,
    pub view_count: Vec<Path>,
    pub percent_watched: Vec<Path>,
    pub categories: Vec<CategoryRule>,
}

fn paths(exprs: &[&str]) -> Vec<Path> {
    exprs.iter().map(|e| Path::parse(e)).collect()
}

impl RuleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn video_id(mut self, exprs: &[&str]) -> Self {
        self.video_id = paths(exprs);
        self
    }

    pub fn channel_id(mut self, exprs: &[&str]) -> Self {
        self.channel_id = paths(exprs);
        self
    }

    pub fn channel_name(mut self, exprs: &[&str]) -> Self {
        self.channel_name = paths(exprs);
        self
    }

    pub fn title(mut self, exprs: &[&str]) -> Self {
        self.title = paths(exprs);
        self
    }

    pub fn comment(mut self, exprs: &[&str]) -> Self {
        self.comment = paths(exprs);
        self
    }

    pub fn description(mut self, exprs: &[&str]) -> Self {
        self.description = paths(exprs);
        self
    }

    pub fn duration(mut self, exprs: &[&str]) -> Self {
        self.duration = paths(exprs);
        self
    }

    pub fn view_count(mut self, exprs: &[&str]) -> Self {
        self.view_count = paths(exprs);
        self
    }

    pub fn percent_watched(mut self, exprs: &[&str]) -> Self {
        self.percent_watched = paths(exprs);
        self
    }

    /// Unconditional category membership.
    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(CategoryRule {
            category,
            when: None,
        });
        self
    }

    /// Membership only when `path` resolves to `expected`.
    pub fn category_when_eq(mut self, category: Category, path: &str, expected: &str) -> Self {
        self.categories.push(CategoryRule {
            category,
            when: Some(Condition::Equals(Path::parse(path), expected.to_string())),
        });
        self
    }

    /// Membership only when `path` resolves.
    pub fn category_when_present(mut self, category: Category, path: &str) -> Self {
        self.categories.push(CategoryRule {
            category,
            when: Some(Condition::Present(Path::parse(path))),
        });
        self
    }

    /// Candidate paths for a text category.
    pub fn text_paths(&self, category: TextCategory) -> &[Path] {
        match category {
            TextCategory::VideoId => &self.video_id,
            TextCategory::ChannelId => &self.channel_id,
            TextCategory::ChannelName => &self.channel_name,
            TextCategory::Title => &self.title,
            TextCategory::Comment => &self.comment,
            TextCategory::Description => &self.description,
        }
    }
}

// ---------------------------------------------------------------------------
// RuleTable
// ---------------------------------------------------------------------------

/// Ordered map from node-type key to [`RuleSpec`].
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    entries: Vec<(String, RuleSpec)>,
    index: HashMap<String, usize>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the spec for `key`.
    pub fn with(mut self, key: impl Into<String>, spec: RuleSpec) -> Self {
        self.insert(key, spec);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, spec: RuleSpec) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = spec,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, spec));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&RuleSpec> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Union of two tables; `other` wins on shared keys.
    pub fn merged(&self, other: &RuleTable) -> RuleTable {
        let mut table = self.clone();
        for (key, spec) in &other.entries {
            table.insert(key.clone(), spec.clone());
        }
        table
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Prunable containers
// ---------------------------------------------------------------------------

/// Keys whose value may be removed once filtering leaves it empty.
pub const PRUNABLE_CONTAINERS: &[&str] = &[
    "content",
    "comment",
    "richItemRenderer",
    "richSectionRenderer",
    "richShelfRenderer",
    "itemSectionRenderer",
    "shelfRenderer",
    "reelShelfRenderer",
    "gridRenderer",
    "horizontalListRenderer",
    "verticalListRenderer",
    "expandedShelfContentsRenderer",
    "horizontalCardListRenderer",
    "commentThreadRenderer",
    "guideSectionRenderer",
];

pub fn is_prunable_container(key: &str) -> bool {
    PRUNABLE_CONTAINERS.contains(&key)
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

const BYLINE_CHANNEL_ID: &[&str] = &[
    "shortBylineText.runs.navigationEndpoint.browseEndpoint.browseId",
    "longBylineText.runs.navigationEndpoint.browseEndpoint.browseId",
    "ownerText.runs.navigationEndpoint.browseEndpoint.browseId",
    "channelThumbnailSupportedRenderers.channelThumbnailWithLinkRenderer.navigationEndpoint.browseEndpoint.browseId",
];
const BYLINE_NAME: &[&str] = &["shortBylineText", "longBylineText", "ownerText"];
const OVERLAY_DURATION: &str = "thumbnailOverlays.thumbnailOverlayTimeStatusRenderer.text";
const OVERLAY_WATCHED: &str =
    "thumbnailOverlays.thumbnailOverlayResumePlaybackRenderer.percentDurationWatched";

/// Shared shape of the classic video renderers.
fn video_item() -> RuleSpec {
    RuleSpec::new()
        .video_id(&["videoId"])
        .channel_id(BYLINE_CHANNEL_ID)
        .channel_name(BYLINE_NAME)
        .title(&["title"])
        .duration(&["lengthText", OVERLAY_DURATION])
        .view_count(&["viewCountText", "shortViewCountText"])
        .percent_watched(&[OVERLAY_WATCHED])
}

fn main_table() -> RuleTable {
    RuleTable::new()
        .with(
            "videoRenderer",
            video_item().description(&["detailedMetadataSnippets.snippetText", "descriptionSnippet"]),
        )
        .with("gridVideoRenderer", video_item())
        .with("compactVideoRenderer", video_item())
        .with(
            "videoWithContextRenderer",
            video_item().title(&["headline", "title"]),
        )
        .with(
            "playlistVideoRenderer",
            video_item().duration(&["lengthText", "lengthSeconds", OVERLAY_DURATION]),
        )
        .with("playlistPanelVideoRenderer", video_item())
        .with(
            "endScreenVideoRenderer",
            video_item().duration(&["lengthText", "lengthInSeconds", OVERLAY_DURATION]),
        )
        .with(
            "watchCardCompactVideoRenderer",
            RuleSpec::new()
                .video_id(&["navigationEndpoint.watchEndpoint.videoId"])
                .channel_id(&["byline.runs.navigationEndpoint.browseEndpoint.browseId"])
                .channel_name(&["byline"])
                .title(&["title"])
                .duration(&["lengthText"]),
        )
        .with(
            "lockupViewModel",
            RuleSpec::new()
                .video_id(&["contentId"])
                .channel_id(&[
                    "metadata.lockupMetadataViewModel.image.decoratedAvatarViewModel.rendererContext.commandContext.onTap.innertubeCommand.browseEndpoint.browseId",
                ])
                .title(&["metadata.lockupMetadataViewModel.title"])
                .percent_watched(&[
                    "contentImage.thumbnailViewModel.overlays.thumbnailBottomOverlayViewModel.progressBar.thumbnailOverlayProgressBarViewModel.startPercent",
                ]),
        )
        .with(
            "channelRenderer",
            RuleSpec::new()
                .channel_id(&["channelId"])
                .channel_name(&["title", "displayName"])
                .description(&["descriptionSnippet"]),
        )
        .with(
            "gridChannelRenderer",
            RuleSpec::new().channel_id(&["channelId"]).channel_name(&["title"]),
        )
        .with(
            "backstagePostRenderer",
            RuleSpec::new()
                .channel_id(&["authorEndpoint.browseEndpoint.browseId"])
                .channel_name(&["authorText"])
                .description(&["contentText"]),
        )
        .with(
            "postRenderer",
            RuleSpec::new()
                .channel_id(&["authorEndpoint.browseEndpoint.browseId"])
                .channel_name(&["authorText"])
                .description(&["contentText"]),
        )
        .with(
            "sharedPostRenderer",
            RuleSpec::new()
                .channel_id(&["endpoint.browseEndpoint.browseId"])
                .channel_name(&["displayName"])
                .description(&["content"]),
        )
        .with(
            "movieRenderer",
            video_item()
                .description(&["descriptionSnippet"])
                .category(Category::Movies),
        )
        .with("gridMovieRenderer", video_item().category(Category::Movies))
        .with(
            "radioRenderer",
            RuleSpec::new()
                .title(&["title"])
                .category(Category::Mixes),
        )
        .with(
            "compactRadioRenderer",
            RuleSpec::new()
                .title(&["title"])
                .category(Category::Mixes),
        )
        .with(
            "reelItemRenderer",
            RuleSpec::new()
                .video_id(&["videoId"])
                .title(&["headline"])
                .view_count(&["viewCountText"])
                .category(Category::Shorts),
        )
        .with(
            "shortsLockupViewModel",
            RuleSpec::new()
                .video_id(&["onTap.innertubeCommand.reelWatchEndpoint.videoId"])
                .title(&["overlayMetadata.primaryText"])
                .category(Category::Shorts),
        )
        .with(
            "reelShelfRenderer",
            RuleSpec::new().title(&["title"]).category(Category::Shorts),
        )
}

fn guide_table() -> RuleTable {
    let entry = || {
        RuleSpec::new()
            .channel_id(&["navigationEndpoint.browseEndpoint.browseId"])
            .channel_name(&["formattedTitle", "title"])
            .category_when_eq(
                Category::Trending,
                "navigationEndpoint.browseEndpoint.browseId",
                "FEtrending",
            )
            .category_when_present(Category::Shorts, "navigationEndpoint.reelWatchEndpoint")
    };

    RuleTable::new()
        .with("guideEntryRenderer", entry())
        .with("miniGuideEntryRenderer", entry())
        .with(
            "pivotBarItemRenderer",
            RuleSpec::new()
                .category_when_eq(Category::Trending, "pivotIdentifier", "FEtrending")
                .category_when_eq(Category::Shorts, "pivotIdentifier", "FEshorts"),
        )
}

fn comments_table() -> RuleTable {
    let live_chat = || {
        RuleSpec::new()
            .channel_id(&["authorExternalChannelId"])
            .channel_name(&["authorName"])
            .comment(&["message"])
    };

    RuleTable::new()
        .with(
            "commentRenderer",
            RuleSpec::new()
                .channel_id(&["authorEndpoint.browseEndpoint.browseId"])
                .channel_name(&["authorText"])
                .comment(&["contentText"]),
        )
        .with("liveChatTextMessageRenderer", live_chat())
        .with("liveChatPaidMessageRenderer", live_chat())
}

fn player_table() -> RuleTable {
    RuleTable::new()
        .with(
            "videoDetails",
            RuleSpec::new()
                .video_id(&["videoId"])
                .channel_id(&["channelId"])
                .channel_name(&["author"])
                .title(&["title"])
                .description(&["shortDescription"])
                .duration(&["lengthSeconds"]),
        )
        .with(
            "playerMicroformatRenderer",
            RuleSpec::new()
                .video_id(&["externalVideoId"])
                .channel_id(&["externalChannelId"])
                .channel_name(&["ownerChannelName"])
                .title(&["title"])
                .description(&["description"])
                .duration(&["lengthSeconds"]),
        )
}

static MAIN: LazyLock<RuleTable> = LazyLock::new(main_table);
static GUIDE: LazyLock<RuleTable> = LazyLock::new(guide_table);
static COMMENTS: LazyLock<RuleTable> = LazyLock::new(comments_table);
static PLAYER: LazyLock<RuleTable> = LazyLock::new(player_table);
static MAIN_AND_COMMENTS: LazyLock<RuleTable> = LazyLock::new(|| MAIN.merged(&COMMENTS));

// ---------------------------------------------------------------------------
// FilterScope
// ---------------------------------------------------------------------------

/// Which built-in table a traversal classifies against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterScope {
    #[default]
    Main,
    Guide,
    Comments,
    Player,
    MainAndComments,
}

impl FilterScope {
    pub fn table(self) -> &'static RuleTable {
        match self {
            Self::Main => &MAIN,
            Self::Guide => &GUIDE,
            Self::Comments => &COMMENTS,
            Self::Player => &PLAYER,
            Self::MainAndComments => &MAIN_AND_COMMENTS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Guide => "guide",
            Self::Comments => "comments",
            Self::Player => "player",
            Self::MainAndComments => "main+comments",
        }
    }
}

impl std::fmt::Display for FilterScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterScope {
    type Err = tubesieve_shared::TubeSieveError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "main" => Ok(Self::Main),
            "guide" => Ok(Self::Guide),
            "comments" => Ok(Self::Comments),
            "player" => Ok(Self::Player),
            "main+comments" => Ok(Self::MainAndComments),
            other => Err(tubesieve_shared::TubeSieveError::validation(format!(
                "unknown filter scope '{other}' (expected main, guide, comments, player or main+comments)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merged_table_is_union() {
        let merged = FilterScope::MainAndComments.table();
        assert!(merged.get("videoRenderer").is_some());
        assert!(merged.get("commentRenderer").is_some());
        assert_eq!(
            merged.len(),
            FilterScope::Main.table().len() + FilterScope::Comments.table().len()
        );
        assert!(FilterScope::Main.table().get("commentRenderer").is_none());
    }

    #[test]
    fn insert_replaces_in_place() {
        let table = RuleTable::new()
            .with("a", RuleSpec::new().title(&["one"]))
            .with("b", RuleSpec::new())
            .with("a", RuleSpec::new().title(&["two"]));
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        let spec = table.get("a").expect("a present");
        assert_eq!(spec.title, vec![Path::parse("two")]);
    }

    #[test]
    fn conditional_category() {
        let spec = FilterScope::Guide
            .table()
            .get("guideEntryRenderer")
            .expect("guide entry");
        let trending = json!({"navigationEndpoint": {"browseEndpoint": {"browseId": "FEtrending"}}});
        let channel = json!({"navigationEndpoint": {"browseEndpoint": {"browseId": "UC1"}}});

        let trending_rule = spec
            .categories
            .iter()
            .find(|r| r.category == Category::Trending)
            .expect("trending rule");
        let when = trending_rule.when.as_ref().expect("conditional");
        assert!(when.holds(&trending));
        assert!(!when.holds(&channel));
    }

    #[test]
    fn scope_parses() {
        assert_eq!("main+comments".parse::<FilterScope>().ok(), Some(FilterScope::MainAndComments));
        assert!("everything".parse::<FilterScope>().is_err());
        assert_eq!(FilterScope::Player.to_string(), "player");
    }

    #[test]
    fn prunable_set() {
        assert!(is_prunable_container("richItemRenderer"));
        assert!(!is_prunable_container("contents"));
    }
}
