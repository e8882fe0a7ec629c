//! Command dispatch logic for vetgate

use super::{CheckArgs, ExceptionsArgs, ValidateArgs, check_packages, generate_exceptions, validate_document};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "vetgate", author, version, long_about = None)]
#[command(about = "Gate dependencies on supply-chain security policies")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: VetgateSubcommand,
}

#[derive(Subcommand, Debug)]
enum VetgateSubcommand {
    /// Evaluate packages against a policy, a filter suite, or a single expression
    Check(Box<CheckArgs>),
    /// Check that a policy or filter suite loads and compiles
    Validate(ValidateArgs),
    /// Generate an exceptions file for the packages selected by a filter
    Exceptions(ExceptionsArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        VetgateSubcommand::Check(check_args) => check_packages(host, check_args),
        VetgateSubcommand::Validate(validate_args) => validate_document(host, validate_args),
        VetgateSubcommand::Exceptions(exceptions_args) => generate_exceptions(host, exceptions_args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_requires_a_source() {
        let err = Cli::try_parse_from(["vetgate", "check", "--packages", "p.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_check_sources_are_exclusive() {
        let err = Cli::try_parse_from(["vetgate", "check", "--packages", "p.json", "--query", "true", "--filter", "true"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "vetgate",
            "check",
            "--packages",
            "p.json",
            "--policy",
            "policy.yml",
            "--fail-on-match",
            "--color",
            "never",
        ])
        .unwrap();

        let VetgateSubcommand::Check(args) = cli.command else {
            panic!("expected the check subcommand");
        };
        assert!(args.fail_on_match);
        assert!(!args.strict);
        assert_eq!(args.policy.as_deref().map(camino::Utf8Path::as_str), Some("policy.yml"));
    }
}
