use super::{EngineError, EngineResult};
use crate::policy::{Filter, Policy, Rule};
use cel_interpreter::{Context, ExecutionError, Program, Value};
use core::panic::AssertUnwindSafe;
use std::any::Any;
use std::panic;
use std::sync::{Arc, Mutex, PoisonError};

/// Serializes the panic hook swap around the parser.
static PARSER_HOOK: Mutex<()> = Mutex::new(());

/// Where a compiled program came from.
#[derive(Debug, Clone)]
pub enum ProgramSource {
    /// A policy rule, optionally attached to the policy declaring it.
    Rule { policy: Option<Arc<Policy>>, rule: Rule },

    /// A legacy filter.
    Filter(Filter),
}

/// An expression compiled together with the rule or filter it came from.
///
/// Immutable once created and shared with the evaluation results it wins.
#[derive(Debug)]
pub struct CompiledProgram {
    source: ProgramSource,
    program: Program,
}

impl CompiledProgram {
    pub(super) fn compile(source: ProgramSource) -> EngineResult<Self> {
        let (name, expression) = match &source {
            ProgramSource::Rule { rule, .. } => (rule.name.as_str(), rule.value.as_str()),
            ProgramSource::Filter(filter) => (filter.name.as_str(), filter.value.as_str()),
        };

        let program = parse(expression).map_err(|message| EngineError::Compile {
            name: name.to_string(),
            message,
        })?;

        Ok(Self { source, program })
    }

    pub(super) fn execute(&self, context: &Context<'_>) -> Result<Value, ExecutionError> {
        self.program.execute(context)
    }

    #[must_use]
    pub const fn source(&self) -> &ProgramSource {
        &self.source
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match &self.source {
            ProgramSource::Rule { rule, .. } => &rule.name,
            ProgramSource::Filter(filter) => &filter.name,
        }
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        match &self.source {
            ProgramSource::Rule { rule, .. } => &rule.value,
            ProgramSource::Filter(filter) => &filter.value,
        }
    }

    /// Human-readable description of what a match means.
    ///
    /// Falls back to the expression when the rule or filter carries no prose.
    #[must_use]
    pub fn summary(&self) -> &str {
        let prose = match &self.source {
            ProgramSource::Rule { rule, .. } => rule.description.as_str(),
            ProgramSource::Filter(filter) if !filter.summary.is_empty() => filter.summary.as_str(),
            ProgramSource::Filter(filter) => filter.description.as_str(),
        };

        if prose.is_empty() { self.expression() } else { prose }
    }

    #[must_use]
    pub fn policy(&self) -> Option<&Arc<Policy>> {
        match &self.source {
            ProgramSource::Rule { policy, .. } => policy.as_ref(),
            ProgramSource::Filter(_) => None,
        }
    }

    #[must_use]
    pub const fn rule(&self) -> Option<&Rule> {
        match &self.source {
            ProgramSource::Rule { rule, .. } => Some(rule),
            ProgramSource::Filter(_) => None,
        }
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&Filter> {
        match &self.source {
            ProgramSource::Rule { .. } => None,
            ProgramSource::Filter(filter) => Some(filter),
        }
    }
}

/// Parse an expression, reporting a parser panic as a syntax error.
///
/// The CEL parser panics on some malformed input instead of returning an error.
/// The default hook output is suppressed while the parser runs.
fn parse(expression: &str) -> Result<Program, String> {
    let outcome = {
        let _guard = PARSER_HOOK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| Program::compile(expression)));
        panic::set_hook(previous_hook);
        outcome
    };

    match outcome {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());

    match detail {
        Some(detail) if !detail.is_empty() => format!("syntax error ({detail})"),
        _ => "syntax error".to_string(),
    }
}
