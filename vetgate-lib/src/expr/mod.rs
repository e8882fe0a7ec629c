//! Policy expression evaluation engine
//!
//! Rules are CEL expressions compiled once, when they are added to an evaluator,
//! and evaluated against a projection of each package (see [`crate::input`]).
//!
//! # Implementation Model
//!
//! Two evaluator generations implement the [`Evaluator`] trait:
//!
//! - [`PolicyEvaluator`]: policy rules over the current input schema, with the
//!   `Ecosystem` and `ProjectSourceType` enum tables, up to [`MAX_POLICY_PROGRAMS`] rules
//! - [`FilterEvaluator`]: legacy filters over the legacy input schema, up to
//!   [`MAX_FILTER_PROGRAMS`] filters
//!
//! Both build an immutable [`Environment`] at construction time. Adding a rule
//! or filter is the write phase: it compiles the expression and appends a
//! [`CompiledProgram`] to an ordered list. Evaluation only reads the environment
//! and the program list, binding the projected input in a per-call child scope.
//!
//! Evaluation is first-match-wins. Runtime errors either abort the evaluation
//! or are logged and skipped, depending on [`EvaluatorConfig::ignore_error`].
//! A program returning anything other than a boolean never matches.
//!
//! The custom function library adds `contains_license` (SPDX satisfaction) and
//! `now()`, which reads the configured [`Clock`].

mod clock;
mod enums;
mod environment;
mod error;
mod evaluation_result;
mod evaluator;
mod filter_evaluator;
mod functions;
mod policy_evaluator;
mod program;

pub use clock::{Clock, FixedClock, SystemClock};
pub use enums::{EnumTable, registered_tables};
pub use environment::Environment;
pub use error::{EngineError, EngineResult};
pub use evaluation_result::EvaluationResult;
pub use evaluator::{Evaluator, EvaluatorConfig};
pub use filter_evaluator::{FilterEvaluator, MAX_FILTER_PROGRAMS};
pub use functions::contains_license;
pub use policy_evaluator::{MAX_POLICY_PROGRAMS, PolicyEvaluator};
pub use program::{CompiledProgram, ProgramSource};
