use super::common::{ColorMode, EXIT_EVALUATION_FAILURE, EXIT_POLICY_VIOLATION, LogLevel, init_logging, load_manifests};
use super::report::{format_event, format_summary};
use super::Host;
use crate::Result;
use crate::analyzer::{AnalysisSummary, AnalyzerEvent, AnalyzerOptions, PolicyAnalyzer};
use crate::expr::{Evaluator, EvaluatorConfig};
use crate::input::ProjectInput;
use crate::models::{PackageManifest, ProjectSourceType};
use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser};
use std::io::Write;

const LOG_TARGET: &str = "  commands";

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["policy", "filter_suite", "query", "filter"])))]
pub struct CheckArgs {
    /// Path to a policy file
    #[arg(long, value_name = "PATH")]
    pub policy: Option<Utf8PathBuf>,

    /// Path to a legacy filter suite file
    #[arg(long, value_name = "PATH")]
    pub filter_suite: Option<Utf8PathBuf>,

    /// A single policy expression
    #[arg(long, value_name = "EXPR")]
    pub query: Option<String>,

    /// A single legacy filter expression
    #[arg(long, value_name = "EXPR")]
    pub filter: Option<String>,

    /// JSON dump of enriched package manifests
    #[arg(long, value_name = "PATH")]
    pub packages: Utf8PathBuf,

    /// Exit with status code 1 if any package matches
    #[arg(long)]
    pub fail_on_match: bool,

    /// Stop evaluating a package at the first expression error, and exit with status code 2 if any occurred
    #[arg(long)]
    pub strict: bool,

    /// Name of the project consuming the packages
    #[arg(long, value_name = "NAME", default_value = "")]
    pub project_name: String,

    /// URL of the project consuming the packages
    #[arg(long, value_name = "URL", default_value = "")]
    pub project_url: String,

    /// Control when to use colored output
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    pub color: ColorMode,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

impl CheckArgs {
    fn options(&self) -> AnalyzerOptions {
        let project = ProjectInput::new(&self.project_name, &self.project_url, project_source_type(&self.project_url));

        AnalyzerOptions::default()
            .fail_on_match(self.fail_on_match)
            .evaluator(EvaluatorConfig::with_ignore_error(!self.strict).project(project))
    }
}

fn project_source_type(url: &str) -> ProjectSourceType {
    let url = url.to_ascii_lowercase();
    if url.contains("github.com") {
        ProjectSourceType::GitHub
    } else if url.contains("gitlab.com") {
        ProjectSourceType::GitLab
    } else if url.contains("bitbucket.org") {
        ProjectSourceType::Bitbucket
    } else {
        ProjectSourceType::Unspecified
    }
}

#[derive(Debug)]
struct Outcome {
    summary: AnalysisSummary,
    fail_signalled: bool,
}

/// Evaluate a package dump against a policy, filter suite or single expression
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or the expressions do not compile
pub fn check_packages<H: Host>(host: &mut H, args: &CheckArgs) -> Result<()> {
    init_logging(args.log_level);

    match check_packages_inner(host, args) {
        Ok(outcome) => {
            // An incomplete evaluation outranks a policy violation.
            if args.strict && outcome.summary.stats.error_count() > 0 {
                let _ = writeln!(
                    host.error(),
                    "❌ {} expression error(s) occurred during evaluation",
                    outcome.summary.stats.error_count()
                );
                host.exit(EXIT_EVALUATION_FAILURE);
            } else if outcome.fail_signalled {
                host.exit(EXIT_POLICY_VIOLATION);
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Check failed: {e}");
            host.exit(EXIT_EVALUATION_FAILURE);
            Err(e)
        }
    }
}

fn check_packages_inner<H: Host>(host: &mut H, args: &CheckArgs) -> Result<Outcome> {
    let manifests = load_manifests(&args.packages)?;
    let options = args.options();

    if let Some(path) = &args.policy {
        analyze_all(host, PolicyAnalyzer::from_policy_file(path, options)?, &manifests, args.color)
    } else if let Some(path) = &args.filter_suite {
        analyze_all(host, PolicyAnalyzer::from_filter_suite_file(path, options)?, &manifests, args.color)
    } else if let Some(query) = &args.query {
        analyze_all(host, PolicyAnalyzer::from_query(query, options)?, &manifests, args.color)
    } else if let Some(filter) = &args.filter {
        analyze_all(host, PolicyAnalyzer::from_filter_query(filter, options)?, &manifests, args.color)
    } else {
        Err(ohno::app_err!("one of --policy, --filter-suite, --query or --filter is required"))
    }
}

fn analyze_all<H: Host, E: Evaluator>(
    host: &mut H,
    mut analyzer: PolicyAnalyzer<E>,
    manifests: &[PackageManifest],
    color: ColorMode,
) -> Result<Outcome> {
    let use_colors = color.use_colors();
    let mut fail_signalled = false;

    for manifest in manifests {
        let mut handler = |event: &AnalyzerEvent<'_>| -> Result<()> {
            if event.is_fail_on_match() {
                fail_signalled = true;
            }

            let mut line = String::new();
            _ = format_event(event, use_colors, &mut line);
            let _ = write!(host.output(), "{line}");
            Ok(())
        };

        analyzer.analyze(manifest, &mut handler)?;
    }

    let summary = analyzer.finish();
    log::debug!(target: LOG_TARGET, "{} unique match(es) reported by '{}'", summary.matches.len(), summary.analyzer);

    let mut text = String::new();
    _ = format_summary(&summary, use_colors, &mut text);
    let _ = write!(host.output(), "{text}");

    Ok(Outcome { summary, fail_signalled })
}
