//! The filtering engine: classify, decide, remove, prune.
//!
//! A traversal walks the document depth-first. At every mapping it looks up
//! each key in the active [`RuleTable`]; a matching node is evaluated and, if
//! any predicate fires, its key is deleted from the mapping. Lists are
//! filtered in place, dropping elements emptied by a removal, and containers
//! emptied by a removal are deleted too when their key is prunable.

use std::sync::{Arc, PoisonError, RwLock};

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace, warn};

use tubesieve_shared::{CompiledConfig, DurationMode, TextCategory};

use crate::predicate::{CustomPredicate, ScriptPredicate};
use crate::numeric::ParsedDuration;
use crate::record::CandidateRecord;
use crate::rules::{FilterScope, RuleSpec, RuleTable, is_prunable_container};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Outcome of one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// No rule, range, threshold, toggle or predicate was active; the
    /// document was not walked.
    pub nothing_to_filter: bool,
    /// Content nodes removed by a predicate (pruned containers not counted).
    pub removed: usize,
}

/// Why a node was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    Rule(TextCategory),
    Duration,
    Watched,
    Category,
    CustomPredicate,
}

// ---------------------------------------------------------------------------
// FilterEngine
// ---------------------------------------------------------------------------

/// Filters documents against one compiled config.
///
/// The config is fixed for the engine's lifetime; build a new engine to
/// reconfigure (see [`SharedEngine`]).
pub struct FilterEngine {
    config: CompiledConfig,
    matchers: Vec<(TextCategory, Vec<Regex>)>,
    predicate: Option<Arc<dyn CustomPredicate>>,
}

impl std::fmt::Debug for FilterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterEngine")
            .field("config", &self.config)
            .field("has_predicate", &self.predicate.is_some())
            .finish_non_exhaustive()
    }
}

impl FilterEngine {
    /// Build an engine, compiling every rule and the scripted predicate.
    ///
    /// Rules that fail to build and a script that fails to compile are
    /// logged and skipped.
    pub fn new(config: CompiledConfig) -> Self {
        let matchers = TextCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let specs = config.filter_data.specs(category)?;
                let regexes: Vec<Regex> = specs
                    .iter()
                    .filter_map(|spec| match spec.to_regex() {
                        Ok(re) => Some(re),
                        Err(e) => {
                            warn!(%category, error = %e, "skipping rule that does not build");
                            None
                        }
                    })
                    .collect();
                (!regexes.is_empty()).then_some((category, regexes))
            })
            .collect();

        let predicate = config.custom_predicate_source().and_then(|source| {
            match ScriptPredicate::compile(source) {
                Ok(script) => Some(Arc::new(script) as Arc<dyn CustomPredicate>),
                Err(e) => {
                    warn!(error = %e, "custom predicate disabled");
                    None
                }
            }
        });

        Self {
            config,
            matchers,
            predicate,
        }
    }

    /// Use `predicate` as the custom predicate (replacing any script).
    ///
    /// It still only runs while the config's `customPredicate` option is on.
    pub fn with_predicate(mut self, predicate: impl CustomPredicate + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn config(&self) -> &CompiledConfig {
        &self.config
    }

    fn active_predicate(&self) -> Option<&dyn CustomPredicate> {
        if !self.config.options.custom_predicate {
            return None;
        }
        self.predicate.as_deref()
    }

    /// Whether a traversal could remove anything at all.
    ///
    /// Unlike [`CompiledConfig::has_active_filters`], this counts the rules
    /// that actually built and a programmatic predicate.
    pub fn has_active_filters(&self) -> bool {
        !self.matchers.is_empty()
            || self.config.has_active_thresholds()
            || self.active_predicate().is_some()
    }

    /// Filter `doc` in place against a built-in table.
    pub fn filter(&self, doc: &mut Value, scope: FilterScope) -> FilterReport {
        self.filter_with(doc, scope.table())
    }

    /// Filter `doc` in place against any table.
    #[instrument(skip_all, fields(entries = table.len()))]
    pub fn filter_with(&self, doc: &mut Value, table: &RuleTable) -> FilterReport {
        if !self.has_active_filters() {
            debug!("no active filters, skipping traversal");
            return FilterReport {
                nothing_to_filter: true,
                removed: 0,
            };
        }

        let mut pass = Pass {
            engine: self,
            table,
            removed: 0,
        };
        pass.walk(doc, Parent::Root);

        debug!(removed = pass.removed, "traversal complete");
        FilterReport {
            nothing_to_filter: false,
            removed: pass.removed,
        }
    }

    /// Decide whether the node under `node_type` goes, and why.
    ///
    /// Checks run cheapest first and stop at the first hit.
    pub fn evaluate(&self, record: &CandidateRecord, node_type: &str) -> Option<RemovalReason> {
        for (category, regexes) in &self.matchers {
            let Some(value) = record.text(*category) else {
                continue;
            };
            if regexes.iter().any(|re| re.is_match(value)) {
                return Some(RemovalReason::Rule(*category));
            }
        }

        let data = &self.config.filter_data;
        if let Some(range) = data.vid_length.filter(|r| r.is_active()) {
            let length = record.duration.map(ParsedDuration::as_f64);
            if let Some(length) = length.filter(|l| !l.is_nan()) {
                let inside = range.contains(length);
                let remove = match self.config.options.duration_mode {
                    DurationMode::Block => inside,
                    DurationMode::Allow => !inside,
                };
                if remove {
                    return Some(RemovalReason::Duration);
                }
            }
        }

        if let Some(threshold) = data.watched_threshold() {
            if record.percent_watched.is_some_and(|pct| pct >= threshold) {
                return Some(RemovalReason::Watched);
            }
        }

        if record
            .categories
            .iter()
            .any(|c| self.config.options.is_enabled(*c))
        {
            return Some(RemovalReason::Category);
        }

        if let Some(predicate) = self.active_predicate() {
            match predicate.evaluate(record, node_type) {
                Ok(true) => return Some(RemovalReason::CustomPredicate),
                Ok(false) => {}
                Err(e) => warn!(node_type, error = %e, "custom predicate failed, keeping node"),
            }
        }

        None
    }

    fn should_remove(&self, node: &Value, spec: &RuleSpec, node_type: &str) -> bool {
        if !node.is_object() {
            return false;
        }
        let record = CandidateRecord::extract(node, spec);
        match self.evaluate(&record, node_type) {
            Some(reason) => {
                trace!(node_type, ?reason, video_id = ?record.video_id, "removing node");
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Where a value sits in its parent.
#[derive(Clone, Copy)]
enum Parent<'k> {
    Root,
    List,
    Key(&'k str),
}

struct Pass<'e> {
    engine: &'e FilterEngine,
    table: &'e RuleTable,
    removed: usize,
}

impl Pass<'_> {
    /// Filter `value`; returns `true` when the parent should drop it.
    fn walk(&mut self, value: &mut Value, parent: Parent<'_>) -> bool {
        let emptied = match value {
            Value::Object(map) => self.walk_object(map),
            Value::Array(items) => self.walk_array(items),
            _ => return false,
        };

        emptied
            && match parent {
                Parent::Root => false,
                Parent::List => true,
                Parent::Key(key) => is_prunable_container(key),
            }
    }

    /// Returns `true` if a removal left `map` empty.
    fn walk_object(&mut self, map: &mut Map<String, Value>) -> bool {
        let engine = self.engine;
        let table = self.table;
        let keys: Vec<String> = map.keys().cloned().collect();
        let mut changed = false;

        for key in keys {
            let Some(child) = map.get_mut(&key) else {
                continue;
            };

            let remove = match table.get(&key) {
                Some(spec) if engine.should_remove(child, spec, &key) => {
                    self.removed += 1;
                    true
                }
                _ => self.walk(child, Parent::Key(&key)),
            };

            if remove {
                map.remove(&key);
                changed = true;
            }
        }

        changed && map.is_empty()
    }

    /// Returns `true` if a removal left `items` empty.
    fn walk_array(&mut self, items: &mut Vec<Value>) -> bool {
        let before = items.len();
        items.retain_mut(|item| !self.walk(item, Parent::List));
        before != items.len() && items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SharedEngine
// ---------------------------------------------------------------------------

/// The current engine, swapped whole on reconfiguration.
///
/// Each traversal works on an `Arc` snapshot, so a swap never affects a pass
/// already in flight.
#[derive(Debug)]
pub struct SharedEngine {
    current: RwLock<Arc<FilterEngine>>,
}

impl SharedEngine {
    pub fn new(engine: FilterEngine) -> Self {
        Self {
            current: RwLock::new(Arc::new(engine)),
        }
    }

    /// The engine in effect right now.
    pub fn snapshot(&self) -> Arc<FilterEngine> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install `engine`, returning the one it replaces.
    pub fn replace(&self, engine: FilterEngine) -> Arc<FilterEngine> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(engine))
    }

    /// Filter with the current snapshot.
    pub fn filter(&self, doc: &mut Value, scope: FilterScope) -> FilterReport {
        self.snapshot().filter(doc, scope)
    }
}
