//! Rule-driven filtering of content-listing payloads.
//!
//! This crate provides:
//! - [`path`] — path expressions and resolution over untyped documents
//! - [`text`] — rich-text flattening
//! - [`numeric`] — duration and view-count parsing
//! - [`rules`] — the built-in rule tables and [`FilterScope`]
//! - [`FilterEngine`] — the traversal that removes matching nodes

pub mod engine;
pub mod numeric;
pub mod path;
pub mod predicate;
pub mod record;
pub mod rules;
pub mod text;

pub use engine::{FilterEngine, FilterReport, RemovalReason, SharedEngine};
pub use numeric::{ParsedDuration, parse_duration, parse_view_count};
pub use path::{Path, Segment, get_by_path, get_flattened_by_path, resolve};
pub use predicate::{CustomPredicate, ScriptPredicate};
pub use record::CandidateRecord;
pub use rules::{FilterScope, RuleSpec, RuleTable};
pub use text::flatten;
