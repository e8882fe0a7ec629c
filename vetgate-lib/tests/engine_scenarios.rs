//! End-to-end behavior of the expression engine through the public API.

use std::sync::Arc;
use vetgate_lib::analyzer::{AnalyzerEvent, AnalyzerOptions, PolicyAnalyzer};
use vetgate_lib::expr::{EngineError, Evaluator, MAX_POLICY_PROGRAMS, PolicyEvaluator};
use vetgate_lib::models::{
    Ecosystem, LicenseMeta, Package, PackageDetails, PackageManifest, PackageVersionInsightV2, Risk, SeverityV2, VulnerabilityV2,
};
use vetgate_lib::policy::{Policy, Rule, RuleCheck};

fn package(name: &str, version: &str) -> Package {
    Package::new(PackageDetails::new(Ecosystem::Npm, name, version)).with_insights_v2(PackageVersionInsightV2 {
        licenses: vec![LicenseMeta::new("MIT OR Apache-2.0")],
        ..PackageVersionInsightV2::default()
    })
}

fn evaluator(ignore_error: bool, rules: &[(&str, &str)]) -> PolicyEvaluator {
    let mut evaluator = PolicyEvaluator::new("scenario", ignore_error).unwrap();
    for (name, value) in rules {
        evaluator.add_rule(None, Rule::new(*name, *value)).unwrap();
    }
    evaluator
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_lodash_policy_scenario() {
    let policy = Policy {
        name: "scenario".to_string(),
        rules: vec![Rule::new("r1", "pkg.name == 'lodash'").with_check(RuleCheck::Vulnerability)],
        ..Policy::default()
    };

    let mut evaluator = PolicyEvaluator::new("scenario", false).unwrap();
    evaluator.add_policy(Arc::new(policy)).unwrap();

    let result = evaluator.evaluate(&package("lodash", "4.17.21")).unwrap();
    assert!(result.is_match());

    let program = result.program().unwrap();
    assert_eq!(program.name(), "r1");
    assert_eq!(program.policy().unwrap().name, "scenario");
    assert_eq!(program.rule().unwrap().check, RuleCheck::Vulnerability);

    let result = evaluator.evaluate(&package("react", "18.2.0")).unwrap();
    assert!(!result.is_match());
    assert!(result.program().is_none());
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_first_match_hides_later_errors() {
    for ignore_error in [false, true] {
        let evaluator = evaluator(ignore_error, &[("always", "true"), ("broken", "pkg.no_such_field == 'x'")]);
        let result = evaluator.evaluate(&package("lodash", "4.17.21")).unwrap();
        assert_eq!(result.program().unwrap().name(), "always");
        assert_eq!(result.failed_programs(), 0);
    }
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_error_before_match_depends_on_policy() {
    let rules = [("broken", "pkg.no_such_field == 'x'"), ("always", "true")];

    let strict = evaluator(false, &rules);
    let err = strict.evaluate(&package("lodash", "4.17.21")).unwrap_err();
    assert!(matches!(err, EngineError::Evaluation { ref name, .. } if name == "broken"), "{err}");

    let lenient = evaluator(true, &rules);
    let result = lenient.evaluate(&package("lodash", "4.17.21")).unwrap();
    assert_eq!(result.program().unwrap().name(), "always");
    assert_eq!(result.failed_programs(), 1);
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_capacity_guard() {
    let mut evaluator = PolicyEvaluator::new("full", false).unwrap();
    for i in 0..MAX_POLICY_PROGRAMS {
        evaluator.add_rule(None, Rule::new(format!("r{i}"), "false")).unwrap();
    }

    let err = evaluator.add_rule(None, Rule::new("one-too-many", "true")).unwrap_err();
    assert!(matches!(err, EngineError::LimitReached { limit } if limit == MAX_POLICY_PROGRAMS));
    assert_eq!(evaluator.program_count(), MAX_POLICY_PROGRAMS);
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_license_satisfaction_in_expressions() {
    let evaluator = evaluator(
        false,
        &[
            ("and-is-unsupported", "pkg.licenses.contains_license('Apache-2.0 AND MIT')"),
            ("reordered-or", "pkg.licenses.contains_license('Apache-2.0 OR MIT')"),
        ],
    );

    let result = evaluator.evaluate(&package("dual", "1.0.0")).unwrap();
    assert_eq!(result.program().unwrap().name(), "reordered-or");
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_severity_and_cve_projection() {
    let pkg = Package::new(PackageDetails::new(Ecosystem::Npm, "vulnerable", "1.0.0")).with_insights_v2(PackageVersionInsightV2 {
        vulnerabilities: vec![VulnerabilityV2 {
            id: "GHSA-1".to_string(),
            aliases: vec!["GHSA-xxxx".to_string(), "CVE-2023-1111".to_string(), "CVE-2023-2222".to_string()],
            severities: vec![SeverityV2 {
                score: "9.8".to_string(),
                risk: Risk::Critical,
                ..SeverityV2::default()
            }],
        }],
        ..PackageVersionInsightV2::default()
    });

    let evaluator = evaluator(
        false,
        &[(
            "critical",
            "pkg.vulnerabilities.exists(v, v.severity == 'CRITICAL' && v.cvss_score > 9.7 && v.cve_id == 'CVE-2023-1111')",
        )],
    );

    assert!(evaluator.evaluate(&pkg).unwrap().is_match());
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_dedup_across_manifests() {
    let mut analyzer = PolicyAnalyzer::from_query("pkg.name == 'lodash'", AnalyzerOptions::default()).unwrap();

    let mut first = PackageManifest::new("a/package-lock.json", Ecosystem::Npm);
    first.add_package(package("lodash", "4.17.21"));
    let mut second = PackageManifest::new("b/package-lock.json", Ecosystem::Npm);
    second.add_package(package("lodash", "4.17.21"));

    let mut events = 0;
    for manifest in [&first, &second] {
        analyzer
            .analyze(manifest, &mut |_: &AnalyzerEvent<'_>| {
                events += 1;
                Ok(())
            })
            .unwrap();
    }

    let summary = analyzer.finish();
    assert_eq!(events, 1);
    assert_eq!(summary.matches.len(), 1);
    assert_eq!(summary.stats.matched_packages(), 1);
    assert_eq!(summary.stats.evaluated_packages(), 2);
}

#[test]
fn test_strict_schema_loading() {
    let err = Policy::from_yaml_str("name: p\nrules: []\nseverity: high\n").unwrap_err();
    assert!(err.to_string().contains("unknown field"), "{err}");
}
