use thiserror::Error;

/// Result type returned by the expression engine.
pub type EngineResult<T> = core::result::Result<T, EngineError>;

/// Errors raised while building evaluators, adding programs, or evaluating packages.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The evaluation environment itself is malformed. Prevents evaluator creation.
    #[error("could not build the expression environment for evaluator '{evaluator}': {reason}")]
    Environment { evaluator: String, reason: String },

    /// An expression failed to parse. Nothing was added to the evaluator.
    #[error("could not compile expression '{name}': {message}")]
    Compile { name: String, message: String },

    /// The evaluator already holds its maximum number of programs.
    #[error("program limit reached, an evaluator holds at most {limit} programs")]
    LimitReached { limit: usize },

    /// The package lacks the insight data the input schema is built from.
    #[error("package '{package}' does not have the insight data required for policy evaluation")]
    MissingInsights { package: String },

    /// The projected input could not be encoded for the interpreter.
    #[error("could not encode evaluation input: {0}")]
    InputEncoding(#[from] serde_json::Error),

    /// A compiled program failed while running against a package.
    #[error("could not evaluate expression '{name}': {message}")]
    Evaluation { name: String, message: String },
}

impl EngineError {
    /// Whether this error only concerns the package being evaluated.
    ///
    /// Callers skip such packages and keep scanning the rest of the batch.
    #[must_use]
    pub const fn is_missing_insights(&self) -> bool {
        matches!(self, Self::MissingInsights { .. })
    }
}
