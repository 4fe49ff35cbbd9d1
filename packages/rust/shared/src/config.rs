//! Raw filter configuration and rule-file loading.
//!
//! Rule files live at `~/.tubesieve/rules.toml` by default and may also be
//! JSON (chosen by file extension). Both use the camelCase wire shape:
//! a `filterData` section with per-category rule lists and an `options`
//! section with toggles.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TubeSieveError};
use crate::types::{DurationRange, FilterOptions, TextCategory};

/// Default rules file name.
const CONFIG_FILE_NAME: &str = "rules.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tubesieve";

// ---------------------------------------------------------------------------
// Raw config structs
// ---------------------------------------------------------------------------

/// Raw, user-edited configuration, as handed to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(default)]
    pub filter_data: RawFilterData,

    #[serde(default)]
    pub options: FilterOptions,
}

/// `filterData` section.
///
/// Text categories are kept as untyped JSON so the compiler can tell a
/// malformed category (left unchanged) from an explicit list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilterData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<serde_json::Value>,

    /// `[min, max]` duration bounds in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vid_length: Option<DurationRange>,

    /// Hide items watched at least this many percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_watched_hide: Option<f64>,

    /// Source of the scripted custom predicate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_predicate: Option<String>,
}

impl RawFilterData {
    /// The raw value for `category`, if present.
    pub fn entries(&self, category: TextCategory) -> Option<&serde_json::Value> {
        match category {
            TextCategory::VideoId => self.video_id.as_ref(),
            TextCategory::ChannelId => self.channel_id.as_ref(),
            TextCategory::ChannelName => self.channel_name.as_ref(),
            TextCategory::Title => self.title.as_ref(),
            TextCategory::Comment => self.comment.as_ref(),
            TextCategory::Description => self.description.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tubesieve/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TubeSieveError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the default rules file (`~/.tubesieve/rules.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the default rules file. Returns an empty config if it does not exist.
pub fn load_config() -> Result<RawConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "rules file not found, using empty config");
        return Ok(RawConfig::default());
    }

    load_config_from(&path)
}

/// Load a rules file from a specific path. `.json` files are parsed as JSON,
/// everything else as TOML.
pub fn load_config_from(path: &Path) -> Result<RawConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TubeSieveError::io(path, e))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_json_config(&content)
            .map_err(|e| TubeSieveError::config(format!("failed to parse {}: {e}", path.display())))
    } else {
        parse_toml_config(&content)
            .map_err(|e| TubeSieveError::config(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Parse a raw config from a JSON string.
pub fn parse_json_config(content: &str) -> Result<RawConfig> {
    serde_json::from_str(content).map_err(|e| TubeSieveError::parse(e.to_string()))
}

/// Parse a raw config from a TOML string.
pub fn parse_toml_config(content: &str) -> Result<RawConfig> {
    toml::from_str(content).map_err(|e| TubeSieveError::parse(e.to_string()))
}

/// Create the config directory and write an empty rules file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TubeSieveError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = RawConfig {
        filter_data: RawFilterData {
            video_id: Some(serde_json::Value::Array(Vec::new())),
            channel_id: Some(serde_json::Value::Array(Vec::new())),
            channel_name: Some(serde_json::Value::Array(Vec::new())),
            title: Some(serde_json::Value::Array(Vec::new())),
            comment: Some(serde_json::Value::Array(Vec::new())),
            description: Some(serde_json::Value::Array(Vec::new())),
            ..Default::default()
        },
        options: FilterOptions::default(),
    };
    let content =
        toml::to_string_pretty(&config).map_err(|e| TubeSieveError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TubeSieveError::io(&path, e))?;
    tracing::info!(?path, "created default rules file");

    Ok(path)
}
