use super::evaluator::{check_capacity, run_programs};
use super::{CompiledProgram, EngineResult, Environment, EvaluationResult, Evaluator, EvaluatorConfig, ProgramSource};
use crate::input::{FilterInput, cel_field, encode, to_cel_value};
use crate::models::Package;
use crate::policy::Filter;
use std::sync::Arc;

/// Maximum number of filters a legacy filter evaluator accepts.
pub const MAX_FILTER_PROGRAMS: usize = 50;

const VAR_ROOT: &str = "_";
const VAR_PACKAGE: &str = "pkg";
const VAR_VULNS: &str = "vulns";
const VAR_SCORECARD: &str = "scorecard";
const VAR_PROJECTS: &str = "projects";
const VAR_LICENSES: &str = "licenses";

const VARIABLES: &[&str] = &[VAR_ROOT, VAR_PACKAGE, VAR_VULNS, VAR_SCORECARD, VAR_PROJECTS, VAR_LICENSES];

/// Evaluates legacy filters against [`FilterInput`] documents.
#[derive(Debug)]
pub struct FilterEvaluator {
    name: String,
    env: Environment,
    programs: Vec<Arc<CompiledProgram>>,
    config: EvaluatorConfig,
}

impl FilterEvaluator {
    /// # Errors
    ///
    /// Returns an environment error if the evaluation environment is malformed
    pub fn new(name: impl Into<String>, ignore_error: bool) -> EngineResult<Self> {
        Self::with_config(name, EvaluatorConfig::with_ignore_error(ignore_error))
    }

    /// # Errors
    ///
    /// Returns an environment error if the evaluation environment is malformed
    pub fn with_config(name: impl Into<String>, config: EvaluatorConfig) -> EngineResult<Self> {
        let name = name.into();
        let env = Environment::build(&name, VARIABLES, &[], Arc::clone(&config.clock))?;

        Ok(Self {
            name,
            env,
            programs: Vec::new(),
            config,
        })
    }

    /// Compile `filter` and append it to the program list.
    ///
    /// # Errors
    ///
    /// Returns a limit error if the evaluator is full, or a compile error if the
    /// expression does not parse. The evaluator is unchanged in both cases.
    pub fn add_filter(&mut self, filter: Filter) -> EngineResult<()> {
        check_capacity(self.programs.len(), 1, MAX_FILTER_PROGRAMS)?;

        let program = CompiledProgram::compile(ProgramSource::Filter(filter))?;
        self.programs.push(Arc::new(program));
        Ok(())
    }

    #[must_use]
    pub fn programs(&self) -> &[Arc<CompiledProgram>] {
        &self.programs
    }
}

impl Evaluator for FilterEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, package: &Package) -> EngineResult<EvaluationResult> {
        let root = to_cel_value(&encode(&FilterInput::from_package(package), "filter")?);

        let scope = self.env.bind(vec![
            (VAR_PACKAGE, cel_field(&root, VAR_PACKAGE)),
            (VAR_VULNS, cel_field(&root, VAR_VULNS)),
            (VAR_SCORECARD, cel_field(&root, VAR_SCORECARD)),
            (VAR_PROJECTS, cel_field(&root, VAR_PROJECTS)),
            (VAR_LICENSES, cel_field(&root, VAR_LICENSES)),
            (VAR_ROOT, root),
        ]);

        run_programs(&self.name, self.config.ignore_error, &self.programs, &scope)
    }

    fn program_count(&self) -> usize {
        self.programs.len()
    }

    fn capacity(&self) -> usize {
        MAX_FILTER_PROGRAMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::EngineError;
    use crate::models::{
        Ecosystem, PackageDetails, PackageVersionInsight, ProjectInfo, Scorecard, ScorecardCheck, ScorecardContent, Severity, SeverityRisk,
        SeverityType, Vulnerability,
    };

    fn evaluator(ignore_error: bool, filters: &[&str]) -> FilterEvaluator {
        let mut eval = FilterEvaluator::new("test", ignore_error).unwrap();
        for (i, value) in filters.iter().enumerate() {
            eval.add_filter(Filter::new(format!("f{i}"), *value)).unwrap();
        }
        eval
    }

    fn package_with_licenses(licenses: &[&str]) -> Package {
        Package::new(PackageDetails::new(Ecosystem::Npm, "lodash", "4.17.21")).with_insights(PackageVersionInsight {
            licenses: Some(licenses.iter().map(ToString::to_string).collect()),
            ..PackageVersionInsight::default()
        })
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_license_expressions() {
        let cases = [
            (&["MIT"][..], "licenses.contains_license('MIT')", true),
            (&["MIT OR Apache-2.0"][..], "licenses.contains_license('MIT')", true),
            (&["MIT OR Apache-2.0"][..], "licenses.contains_license('Apache-2.0 OR MIT')", true),
            (&["MIT OR Apache-2.0"][..], "licenses.contains_license('Apache-2.0 AND MIT')", false),
            (&["GPL-2.0-only"][..], "licenses.contains_license('MIT')", false),
            (&[][..], "licenses.contains_license('MIT')", false),
        ];

        for (licenses, value, expected) in cases {
            let eval = evaluator(false, &[value]);
            let result = eval.evaluate(&package_with_licenses(licenses)).unwrap();
            assert_eq!(result.is_match(), expected, "{licenses:?} / {value}");
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_package_without_insights_evaluates() {
        let eval = evaluator(false, &["pkg.ecosystem == 'npm' && pkg.name == 'react' && size(vulns.all) == 0 && scorecard.score == 0.0"]);
        let pkg = Package::new(PackageDetails::new(Ecosystem::Npm, "react", "18.2.0"));
        assert!(eval.evaluate(&pkg).unwrap().is_match());
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_vulnerability_and_scorecard_variables() {
        let insight = PackageVersionInsight {
            vulnerabilities: Some(vec![Vulnerability {
                id: Some("GHSA-1".to_string()),
                aliases: Some(vec!["CVE-2021-44228".to_string()]),
                severities: Some(vec![Severity {
                    kind: Some(SeverityType::CvssV3),
                    score: Some("10.0".to_string()),
                    risk: Some(SeverityRisk::Critical),
                }]),
                ..Vulnerability::default()
            }]),
            projects: Some(vec![ProjectInfo {
                name: Some("apache/logging-log4j2".to_string()),
                kind: Some("github".to_string()),
                stars: Some(3_000),
                ..ProjectInfo::default()
            }]),
            scorecard: Some(Scorecard {
                content: Some(ScorecardContent {
                    score: Some(4.2),
                    checks: Some(vec![ScorecardCheck {
                        name: Some("Maintained".to_string()),
                        score: Some(0.0),
                    }]),
                }),
            }),
            ..PackageVersionInsight::default()
        };
        let pkg = Package::new(PackageDetails::new(Ecosystem::Maven, "log4j-core", "2.14.1")).with_insights(insight);

        for value in [
            "vulns.critical.exists(v, v.cve == 'CVE-2021-44228')",
            "size(vulns.high) == 0 && size(vulns.all) == 1",
            "scorecard.score < 5.0 && scorecard.scores.Maintained == 0.0",
            "projects.exists(p, p.type == 'GITHUB' && p.stars > 1000)",
            "_.pkg.ecosystem == 'maven'",
        ] {
            let eval = evaluator(false, &[value]);
            assert!(eval.evaluate(&pkg).unwrap().is_match(), "expected '{value}' to match");
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_short_circuit_and_error_policy() {
        let pkg = package_with_licenses(&["MIT"]);

        let eval = evaluator(false, &["true", "undefined_var == 1"]);
        assert_eq!(eval.evaluate(&pkg).unwrap().program().unwrap().name(), "f0");

        let eval = evaluator(false, &["undefined_var == 1", "true"]);
        let err = eval.evaluate(&pkg).unwrap_err();
        assert!(matches!(err, EngineError::Evaluation { .. }));

        let eval = evaluator(true, &["undefined_var == 1", "true"]);
        let result = eval.evaluate(&pkg).unwrap();
        assert_eq!(result.program().unwrap().name(), "f1");
        assert_eq!(result.failed_programs(), 1);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_capacity_guard() {
        let mut eval = FilterEvaluator::new("test", false).unwrap();
        for i in 0..MAX_FILTER_PROGRAMS {
            eval.add_filter(Filter::new(format!("f{i}"), "false")).unwrap();
        }

        let err = eval.add_filter(Filter::new("extra", "true")).unwrap_err();
        assert!(matches!(err, EngineError::LimitReached { limit: MAX_FILTER_PROGRAMS }));
        assert_eq!(eval.program_count(), MAX_FILTER_PROGRAMS);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_enum_tables_are_not_registered() {
        let eval = evaluator(false, &["Ecosystem.NPM == 2"]);
        let _ = eval.evaluate(&package_with_licenses(&[])).unwrap_err();
    }

    const fn assert_send_sync<T: Send + Sync>() {}
    const _: () = assert_send_sync::<FilterEvaluator>();

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_shared_evaluator_across_threads() {
        let eval = evaluator(false, &["licenses.contains_license('MIT')"]);
        let cases = [(&["MIT"][..], true), (&["GPL-2.0-only"][..], false), (&["Apache-2.0 OR MIT"][..], true)];

        std::thread::scope(|scope| {
            for (licenses, expected) in cases {
                let eval = &eval;
                let _ = scope.spawn(move || {
                    let pkg = package_with_licenses(licenses);
                    for _ in 0..25 {
                        assert_eq!(eval.evaluate(&pkg).unwrap().is_match(), expected, "{licenses:?}");
                    }
                });
            }
        });
    }
}
