//! Shared types, error model, and configuration for TubeSieve.
//!
//! This crate is the foundation depended on by all other TubeSieve crates.
//! It provides:
//! - [`TubeSieveError`] — the unified error type
//! - Rule types ([`FilterSpec`], [`CompiledConfig`], [`FilterOptions`], [`DurationRange`])
//! - Raw configuration ([`RawConfig`]) and rule-file loading

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    RawConfig, RawFilterData, config_dir, config_file_path, init_config, load_config,
    load_config_from, parse_json_config, parse_toml_config,
};
pub use error::{Result, TubeSieveError};
pub use types::{
    Category, CompiledConfig, CompiledFilterData, DurationMode, DurationRange, FilterOptions,
    FilterSpec, TextCategory,
};
