use crate::expr::CompiledProgram;
use crate::models::{Package, PackageManifest};
use std::sync::Arc;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AnalyzerEventKind {
    /// A package matched a rule or filter.
    FilterExpressionMatched,

    /// At least one package matched and the analyzer was asked to fail on a match.
    FailOnMatch,
}

/// An event reported by an analyzer to its handler.
#[derive(Debug, Clone)]
pub struct AnalyzerEvent<'a> {
    pub source: &'a str,
    pub kind: AnalyzerEventKind,
    pub manifest: &'a PackageManifest,
    pub package: Option<&'a Package>,
    pub program: Option<Arc<CompiledProgram>>,
}

impl AnalyzerEvent<'_> {
    #[must_use]
    pub fn is_filter_match(&self) -> bool {
        self.kind == AnalyzerEventKind::FilterExpressionMatched
    }

    #[must_use]
    pub fn is_fail_on_match(&self) -> bool {
        self.kind == AnalyzerEventKind::FailOnMatch
    }

    /// Name of the policy declaring the matched rule, if any.
    #[must_use]
    pub fn policy_name(&self) -> Option<&str> {
        self.program.as_ref().and_then(|p| p.policy()).map(|policy| policy.name.as_str())
    }

    /// Name of the matched rule or filter.
    #[must_use]
    pub fn rule_name(&self) -> Option<&str> {
        self.program.as_deref().map(CompiledProgram::name)
    }

    #[must_use]
    pub fn summary(&self) -> String {
        match (self.kind, &self.program, self.package) {
            (AnalyzerEventKind::FilterExpressionMatched, Some(program), Some(package)) => format!(
                "{}@{} matched '{}': {}",
                package.name(),
                package.version(),
                program.name(),
                program.summary()
            ),
            (AnalyzerEventKind::FailOnMatch, _, _) => format!("{}: failing on policy match in '{}'", self.source, self.manifest.path),
            _ => format!("{}: {}", self.source, self.kind),
        }
    }
}
