use super::{AnalyzerEvent, AnalyzerEventKind, MatchStats};
use crate::Result;
use crate::expr::{CompiledProgram, Evaluator, EvaluatorConfig, FilterEvaluator, PolicyEvaluator};
use crate::models::{ManifestRef, Package, PackageManifest};
use crate::policy::{Filter, FilterSuite, Policy, Rule};
use camino::Utf8Path;
use ohno::IntoAppError;
use rustc_hash::FxHashSet;
use std::sync::Arc;

const LOG_TARGET: &str = "  analyzer";

/// Name of the evaluator built for a single ad-hoc policy query.
pub const SINGLE_QUERY_EVALUATOR: &str = "single-filter-v2";

/// Rule name given to a single ad-hoc policy query.
pub const SINGLE_QUERY_RULE: &str = "filter-v2-query";

/// Name of the evaluator built for a policy document.
pub const POLICY_SUITE_EVALUATOR: &str = "filter-suite-v2";

/// Name of the evaluator built for a legacy filter suite.
pub const FILTER_SUITE_EVALUATOR: &str = "filter-suite";

/// Name of the evaluator built for a single legacy filter query.
pub const SINGLE_FILTER_EVALUATOR: &str = "single-filter";

/// Filter name given to a single legacy filter query.
pub const SINGLE_FILTER_NAME: &str = "filter-query";

/// Options shared by every analyzer constructor.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Emit a [`AnalyzerEventKind::FailOnMatch`] event once something matched.
    pub fail_on_match: bool,

    /// Configuration of the underlying evaluator.
    pub evaluator: EvaluatorConfig,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            fail_on_match: false,
            evaluator: EvaluatorConfig::with_ignore_error(true),
        }
    }
}

impl AnalyzerOptions {
    #[must_use]
    pub const fn fail_on_match(mut self, fail_on_match: bool) -> Self {
        self.fail_on_match = fail_on_match;
        self
    }

    #[must_use]
    pub fn evaluator(mut self, evaluator: EvaluatorConfig) -> Self {
        self.evaluator = evaluator;
        self
    }
}

/// A package that matched, kept once per package identity.
#[derive(Debug, Clone)]
pub struct MatchedPackage {
    pub package: Package,
    pub manifest: ManifestRef,
    pub program: Arc<CompiledProgram>,
}

/// Everything an analysis session produced.
#[derive(Debug, Clone)]
pub struct AnalysisSummary {
    pub analyzer: String,
    pub stats: MatchStats,

    /// Unique matches, in the order they were first seen.
    pub matches: Vec<MatchedPackage>,
}

impl AnalysisSummary {
    #[must_use]
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Runs an evaluator over the packages of successive manifests.
///
/// Each package identity is reported at most once per session, no matter how
/// many manifests it appears in. Packages without the insight data the evaluator
/// needs are skipped with a warning and do not count as errors.
#[derive(Debug)]
pub struct PolicyAnalyzer<E> {
    evaluator: E,
    fail_on_match: bool,
    fail_signalled: bool,
    seen: FxHashSet<String>,
    matches: Vec<MatchedPackage>,
    stats: MatchStats,
}

impl PolicyAnalyzer<PolicyEvaluator> {
    /// Build an analyzer from a policy document.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy has too many rules or one of them does not compile
    pub fn from_policy(policy: Policy, options: AnalyzerOptions) -> Result<Self> {
        let mut evaluator = PolicyEvaluator::with_config(POLICY_SUITE_EVALUATOR, options.evaluator)
            .into_app_err("unable to create the policy evaluator")?;

        let name = policy.name.clone();
        evaluator
            .add_policy(Arc::new(policy))
            .into_app_err_with(|| format!("unable to add policy '{name}'"))?;

        log::info!(target: LOG_TARGET, "Loaded policy '{name}' with {} rule(s)", evaluator.program_count());
        Ok(Self::new(evaluator, options.fail_on_match))
    }

    /// Build an analyzer from a policy file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or its rules cannot be compiled
    pub fn from_policy_file(path: &Utf8Path, options: AnalyzerOptions) -> Result<Self> {
        Self::from_policy(Policy::load(path)?, options)
    }

    /// Build an analyzer from a single policy expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not compile
    pub fn from_query(expression: &str, options: AnalyzerOptions) -> Result<Self> {
        let mut evaluator = PolicyEvaluator::with_config(SINGLE_QUERY_EVALUATOR, options.evaluator)
            .into_app_err("unable to create the policy evaluator")?;

        evaluator
            .add_rule(None, Rule::new(SINGLE_QUERY_RULE, expression))
            .into_app_err("unable to add the policy query")?;

        Ok(Self::new(evaluator, options.fail_on_match))
    }
}

impl PolicyAnalyzer<FilterEvaluator> {
    /// Build an analyzer from a legacy filter suite.
    ///
    /// # Errors
    ///
    /// Returns an error if the suite has too many filters or one of them does not compile
    pub fn from_filter_suite(suite: FilterSuite, options: AnalyzerOptions) -> Result<Self> {
        let mut evaluator = FilterEvaluator::with_config(FILTER_SUITE_EVALUATOR, options.evaluator)
            .into_app_err("unable to create the filter evaluator")?;

        for filter in suite.filters {
            let name = filter.name.clone();
            evaluator
                .add_filter(filter)
                .into_app_err_with(|| format!("unable to add filter '{name}' of suite '{}'", suite.name))?;
        }

        log::info!(target: LOG_TARGET, "Loaded filter suite '{}' with {} filter(s)", suite.name, evaluator.program_count());
        Ok(Self::new(evaluator, options.fail_on_match))
    }

    /// Build an analyzer from a legacy filter suite file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or its filters cannot be compiled
    pub fn from_filter_suite_file(path: &Utf8Path, options: AnalyzerOptions) -> Result<Self> {
        Self::from_filter_suite(FilterSuite::load(path)?, options)
    }

    /// Build an analyzer from a single legacy filter expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not compile
    pub fn from_filter_query(expression: &str, options: AnalyzerOptions) -> Result<Self> {
        let mut evaluator = FilterEvaluator::with_config(SINGLE_FILTER_EVALUATOR, options.evaluator)
            .into_app_err("unable to create the filter evaluator")?;

        evaluator
            .add_filter(Filter::new(SINGLE_FILTER_NAME, expression))
            .into_app_err("unable to add the filter query")?;

        Ok(Self::new(evaluator, options.fail_on_match))
    }
}

impl<E: Evaluator> PolicyAnalyzer<E> {
    #[must_use]
    pub fn new(evaluator: E, fail_on_match: bool) -> Self {
        Self {
            evaluator,
            fail_on_match,
            fail_signalled: false,
            seen: FxHashSet::default(),
            matches: Vec::new(),
            stats: MatchStats::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.evaluator.name()
    }

    #[must_use]
    pub const fn evaluator(&self) -> &E {
        &self.evaluator
    }

    #[must_use]
    pub const fn stats(&self) -> MatchStats {
        self.stats
    }

    /// Evaluate every package of `manifest`, reporting new matches to `handler`.
    ///
    /// Evaluation failures are counted and never stop the scan. Only an error
    /// returned by `handler` aborts the call.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by `handler`
    pub fn analyze<F>(&mut self, manifest: &PackageManifest, handler: &mut F) -> Result<()>
    where
        F: FnMut(&AnalyzerEvent<'_>) -> Result<()>,
    {
        self.stats.inc_evaluated_manifests();
        log::debug!(target: LOG_TARGET, "[{}] analyzing {} package(s) of '{}'", self.name(), manifest.packages().len(), manifest.path);

        for package in manifest.packages() {
            self.stats.inc_evaluated_packages();

            let result = match self.evaluator.evaluate(package) {
                Ok(result) => result,
                Err(e) if e.is_missing_insights() => {
                    log::warn!(target: LOG_TARGET, "Skipping {}@{}: {e}", package.name(), package.version());
                    continue;
                }
                Err(e) => {
                    log::error!(target: LOG_TARGET, "Failed to evaluate {}@{}: {e}", package.name(), package.version());
                    self.stats.add_errors(1);
                    continue;
                }
            };

            self.stats.add_errors(result.failed_programs());

            let Some(program) = result.program() else {
                continue;
            };

            if !self.seen.insert(package.id()) {
                log::debug!(target: LOG_TARGET, "{}@{} already matched, not reporting again", package.name(), package.version());
                continue;
            }

            self.stats.inc_matched_packages();
            self.matches.push(MatchedPackage {
                package: package.clone(),
                manifest: manifest.reference(),
                program: Arc::clone(program),
            });

            handler(&AnalyzerEvent {
                source: self.evaluator.name(),
                kind: AnalyzerEventKind::FilterExpressionMatched,
                manifest,
                package: Some(package),
                program: Some(Arc::clone(program)),
            })?;
        }

        if self.fail_on_match && !self.fail_signalled && self.stats.matched_packages() > 0 {
            self.fail_signalled = true;

            handler(&AnalyzerEvent {
                source: self.evaluator.name(),
                kind: AnalyzerEventKind::FailOnMatch,
                manifest,
                package: None,
                program: None,
            })?;
        }

        Ok(())
    }

    /// Close the session and return what it found.
    #[must_use]
    pub fn finish(self) -> AnalysisSummary {
        log::info!(target: LOG_TARGET, "{}", self.stats);

        AnalysisSummary {
            analyzer: self.evaluator.name().to_string(),
            stats: self.stats,
            matches: self.matches,
        }
    }
}
