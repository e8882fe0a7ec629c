use super::CompiledProgram;
use std::sync::Arc;

/// The outcome of evaluating one package.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    program: Option<Arc<CompiledProgram>>,
    failed_programs: usize,
}

impl EvaluationResult {
    pub(super) const fn matched(program: Arc<CompiledProgram>, failed_programs: usize) -> Self {
        Self {
            program: Some(program),
            failed_programs,
        }
    }

    pub(super) const fn not_matched(failed_programs: usize) -> Self {
        Self {
            program: None,
            failed_programs,
        }
    }

    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.program.is_some()
    }

    /// The first program that evaluated to `true`.
    #[must_use]
    pub const fn program(&self) -> Option<&Arc<CompiledProgram>> {
        self.program.as_ref()
    }

    /// Programs that raised a runtime error and were skipped.
    ///
    /// Always zero for evaluators that propagate runtime errors.
    #[must_use]
    pub const fn failed_programs(&self) -> usize {
        self.failed_programs
    }
}
