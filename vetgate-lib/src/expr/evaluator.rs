use super::{Clock, CompiledProgram, EngineError, EngineResult, EvaluationResult, SystemClock};
use crate::input::ProjectInput;
use crate::models::Package;
use cel_interpreter::{Context, Value};
use std::sync::Arc;

const LOG_TARGET: &str = "      expr";

/// Evaluates packages against an ordered list of compiled programs.
///
/// Programs run in insertion order and evaluation stops at the first program
/// returning `true`. Two evaluators holding the same programs in a different
/// order may therefore report a different winning program.
pub trait Evaluator {
    fn name(&self) -> &str;

    /// Project `package` and run programs against it until one matches.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingInsights`] if the package cannot be projected, and
    /// [`EngineError::Evaluation`] if a program fails while runtime errors are not ignored.
    fn evaluate(&self, package: &Package) -> EngineResult<EvaluationResult>;

    fn program_count(&self) -> usize;

    /// Maximum number of programs this evaluator accepts.
    fn capacity(&self) -> usize;
}

/// Options shared by both evaluator generations.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Skip programs raising runtime errors instead of failing the evaluation.
    pub ignore_error: bool,

    /// Time source for the `now()` function.
    pub clock: Arc<dyn Clock>,

    /// The consuming project, bound to `project` in policy expressions.
    pub project: ProjectInput,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            ignore_error: false,
            clock: Arc::new(SystemClock),
            project: ProjectInput::default(),
        }
    }
}

impl EvaluatorConfig {
    #[must_use]
    pub fn with_ignore_error(ignore_error: bool) -> Self {
        Self {
            ignore_error,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn project(mut self, project: ProjectInput) -> Self {
        self.project = project;
        self
    }
}

/// Reject adding `additional` programs when it would exceed `limit`.
pub(super) fn check_capacity(current: usize, additional: usize, limit: usize) -> EngineResult<()> {
    if current + additional > limit {
        return Err(EngineError::LimitReached { limit });
    }

    Ok(())
}

/// Run `programs` in order against `context`, stopping at the first `true`.
pub(super) fn run_programs(
    evaluator: &str,
    ignore_error: bool,
    programs: &[Arc<CompiledProgram>],
    context: &Context<'_>,
) -> EngineResult<EvaluationResult> {
    let mut failed = 0;

    for program in programs {
        match program.execute(context) {
            Ok(Value::Bool(true)) => {
                log::debug!(target: LOG_TARGET, "[{evaluator}] '{}' matched", program.name());
                return Ok(EvaluationResult::matched(Arc::clone(program), failed));
            }
            Ok(Value::Bool(false)) => {}
            Ok(other) => {
                log::debug!(target: LOG_TARGET, "[{evaluator}] '{}' returned a non-boolean value '{other:?}', treating as no match", program.name());
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "[{evaluator}] could not evaluate '{}': {e}", program.name());

                if !ignore_error {
                    return Err(EngineError::Evaluation {
                        name: program.name().to_string(),
                        message: e.to_string(),
                    });
                }

                failed += 1;
            }
        }
    }

    Ok(EvaluationResult::not_matched(failed))
}
