//! Rule compilation: raw config to the transport-safe compiled config.
//!
//! This crate provides:
//! - [`compile_entries`] — one category's raw strings to `(pattern, flags)` pairs
//! - [`compile_all`] — a whole [`RawConfig`] to a [`CompiledConfig`]
//! - [`compile_update`] — the same, keeping previous rules for categories the
//!   raw config does not hold as a list

mod patterns;

use tracing::{debug, instrument};

use tubesieve_shared::{CompiledConfig, CompiledFilterData, RawConfig, TextCategory};

pub use patterns::{compile_entries, compile_entry};

/// Compile every category present in `raw`.
///
/// Categories absent from `raw`, or present but not a list of strings, are
/// absent from the result. Numeric fields and options pass through as-is.
#[instrument(skip_all)]
pub fn compile_all(raw: &RawConfig) -> CompiledConfig {
    compile_onto(raw, CompiledFilterData::default())
}

/// Compile `raw` on top of `previous`.
///
/// A category present in `raw` as a list replaces the previous rules; one
/// that is missing or malformed keeps them.
#[instrument(skip_all)]
pub fn compile_update(previous: &CompiledConfig, raw: &RawConfig) -> CompiledConfig {
    compile_onto(raw, previous.filter_data.clone())
}

fn compile_onto(raw: &RawConfig, mut data: CompiledFilterData) -> CompiledConfig {
    for category in TextCategory::ALL {
        let Some(entries) = raw.filter_data.entries(category) else {
            continue;
        };
        if let Some(specs) = compile_entries(entries, category) {
            *data.specs_mut(category) = Some(specs);
        }
    }

    data.vid_length = raw.filter_data.vid_length;
    data.percent_watched_hide = raw.filter_data.percent_watched_hide;
    data.custom_predicate = raw.filter_data.custom_predicate.clone();

    let compiled = CompiledConfig {
        filter_data: data,
        options: raw.options.clone(),
    };
    debug!(active = compiled.has_active_filters(), "config compiled");
    compiled
}
