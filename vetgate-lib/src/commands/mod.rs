//! Command-line interface for vetgate
//!
//! Three commands are available:
//!
//! - **check**: load a package dump and evaluate it against a policy file, a
//!   legacy filter suite, or a single expression, printing every unique match
//!   and a summary line. Exits with status 1 on a match when `--fail-on-match`
//!   is given, and with status 2 when evaluation could not complete.
//! - **validate**: load a policy or filter suite and compile its expressions.
//! - **exceptions**: write an exceptions file for the packages a filter selects.
//!
//! All output goes through a [`Host`] so commands can be exercised in tests.

mod check;
mod common;
mod exceptions;
mod host;
mod report;
mod run;
mod validate;

pub use check::{CheckArgs, check_packages};
pub use common::{ColorMode, EXIT_EVALUATION_FAILURE, EXIT_POLICY_VIOLATION, LogLevel};
pub use exceptions::{ExceptionsArgs, generate_exceptions};
pub use host::Host;
pub use run::run;
pub use validate::{ValidateArgs, validate_document};
