//! Custom predicate hook.
//!
//! A predicate sees each candidate record and its node-type key and decides
//! whether the node goes. Failures are returned as errors; the engine logs
//! them and keeps the node.

use rhai::{AST, Engine, Scope};
use tracing::debug;

use tubesieve_shared::{Result, TubeSieveError};

use crate::record::CandidateRecord;

/// User-supplied removal test.
pub trait CustomPredicate: Send + Sync {
    /// `Ok(true)` removes the node.
    fn evaluate(&self, record: &CandidateRecord, node_type: &str) -> Result<bool>;
}

impl<F> CustomPredicate for F
where
    F: Fn(&CandidateRecord, &str) -> Result<bool> + Send + Sync,
{
    fn evaluate(&self, record: &CandidateRecord, node_type: &str) -> Result<bool> {
        self(record, node_type)
    }
}

/// A predicate written as a Rhai script.
///
/// The script runs with `record` (the candidate record as a map, missing
/// fields are `()`) and `node_type` in scope and must evaluate to a bool:
///
/// ```rhai
/// node_type == "videoRenderer" && type_of(record.viewCount) == "i64" && record.viewCount < 1000
/// ```
pub struct ScriptPredicate {
    /// Pre-compiled AST for repeated evaluation.
    ast: AST,
    engine: Engine,
}

impl std::fmt::Debug for ScriptPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptPredicate").finish_non_exhaustive()
    }
}

impl ScriptPredicate {
    /// Compile `source`.
    ///
    /// # Errors
    ///
    /// Returns [`TubeSieveError::Predicate`] if the script does not parse.
    pub fn compile(source: &str) -> Result<Self> {
        let engine = Self::create_engine();
        let ast = engine
            .compile(source)
            .map_err(|e| TubeSieveError::predicate(format!("script compilation failed: {e}")))?;

        debug!(len = source.len(), "compiled custom predicate script");
        Ok(Self { ast, engine })
    }

    /// Engine with limits, so a runaway script errors out instead of hanging.
    fn create_engine() -> Engine {
        let mut engine = Engine::new();

        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(100_000);
        engine.set_max_string_size(1_000_000);
        engine.set_max_array_size(10_000);
        engine.set_max_map_size(10_000);
        engine.set_max_call_levels(16);
        engine.set_optimization_level(rhai::OptimizationLevel::Full);

        engine
    }
}

impl CustomPredicate for ScriptPredicate {
    fn evaluate(&self, record: &CandidateRecord, node_type: &str) -> Result<bool> {
        let record = rhai::serde::to_dynamic(record)
            .map_err(|e| TubeSieveError::predicate(format!("record conversion failed: {e}")))?;

        let mut scope = Scope::new();
        scope.push("record", record);
        scope.push("node_type", node_type.to_string());

        self.engine
            .eval_ast_with_scope::<bool>(&mut scope, &self.ast)
            .map_err(|e| TubeSieveError::predicate(format!("script evaluation failed: {e}")))
    }
}
