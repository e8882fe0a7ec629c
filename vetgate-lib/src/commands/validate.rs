use super::Host;
use crate::Result;
use crate::analyzer::{AnalyzerOptions, PolicyAnalyzer};
use crate::expr::Evaluator;
use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser};
use std::io::Write;

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("document").required(true).args(["policy", "filter_suite"])))]
pub struct ValidateArgs {
    /// Path to a policy file
    #[arg(long, value_name = "PATH")]
    pub policy: Option<Utf8PathBuf>,

    /// Path to a legacy filter suite file
    #[arg(long, value_name = "PATH")]
    pub filter_suite: Option<Utf8PathBuf>,
}

/// Load a document and compile every expression it declares, returning a description of what was found
fn validate_inner(args: &ValidateArgs) -> Result<String> {
    if let Some(path) = &args.policy {
        let analyzer = PolicyAnalyzer::from_policy_file(path, AnalyzerOptions::default())?;
        return Ok(format!("Policy file '{path}' is valid ({} rule(s))", analyzer.evaluator().program_count()));
    }

    if let Some(path) = &args.filter_suite {
        let analyzer = PolicyAnalyzer::from_filter_suite_file(path, AnalyzerOptions::default())?;
        return Ok(format!("Filter suite '{path}' is valid ({} filter(s))", analyzer.evaluator().program_count()));
    }

    Err(ohno::app_err!("one of --policy or --filter-suite is required"))
}

/// Check that a policy or filter suite loads and that all its expressions compile
///
/// # Errors
///
/// Returns an error if the document cannot be loaded or an expression does not compile
pub fn validate_document<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    match validate_inner(args) {
        Ok(message) => {
            let _ = writeln!(host.output(), "{message}");
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Validation failed: {e}");
            host.exit(super::common::EXIT_EVALUATION_FAILURE);
            Err(e)
        }
    }
}
