use super::enums::registered_tables;
use super::evaluator::{check_capacity, run_programs};
use super::{CompiledProgram, EngineResult, Environment, EvaluationResult, Evaluator, EvaluatorConfig, ProgramSource};
use crate::input::{ManifestInput, PolicyInput, cel_field, encode, to_cel_value};
use crate::models::Package;
use crate::policy::{Policy, Rule};
use std::sync::Arc;

/// Maximum number of rules a policy evaluator accepts.
pub const MAX_POLICY_PROGRAMS: usize = 150;

const VAR_ROOT: &str = "_";
const VAR_PACKAGE: &str = "pkg";
const VAR_PROJECT: &str = "project";
const VAR_MANIFEST: &str = "manifest";

const VARIABLES: &[&str] = &[VAR_ROOT, VAR_PACKAGE, VAR_PROJECT, VAR_MANIFEST];

/// Evaluates policy rules against [`PolicyInput`] documents.
///
/// Expressions see `_` (the whole input), `pkg`, `project` and `manifest`, the
/// `Ecosystem` and `ProjectSourceType` enum tables, and the custom functions.
#[derive(Debug)]
pub struct PolicyEvaluator {
    name: String,
    env: Environment,
    programs: Vec<Arc<CompiledProgram>>,
    config: EvaluatorConfig,
}

impl PolicyEvaluator {
    /// Create an evaluator with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an environment error if the evaluation environment is malformed
    pub fn new(name: impl Into<String>, ignore_error: bool) -> EngineResult<Self> {
        Self::with_config(name, EvaluatorConfig::with_ignore_error(ignore_error))
    }

    /// Create an evaluator with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an environment error if the evaluation environment is malformed
    pub fn with_config(name: impl Into<String>, config: EvaluatorConfig) -> EngineResult<Self> {
        let name = name.into();
        let env = Environment::build(&name, VARIABLES, &registered_tables(), Arc::clone(&config.clock))?;

        Ok(Self {
            name,
            env,
            programs: Vec::new(),
            config,
        })
    }

    /// Compile `rule` and append it to the program list.
    ///
    /// # Errors
    ///
    /// Returns a limit error if the evaluator is full, or a compile error if the
    /// expression does not parse. The evaluator is unchanged in both cases.
    pub fn add_rule(&mut self, policy: Option<Arc<Policy>>, rule: Rule) -> EngineResult<()> {
        check_capacity(self.programs.len(), 1, MAX_POLICY_PROGRAMS)?;

        let program = CompiledProgram::compile(ProgramSource::Rule { policy, rule })?;
        self.programs.push(Arc::new(program));
        Ok(())
    }

    /// Compile and append every rule of `policy`, in declaration order.
    ///
    /// Either all rules are added or none are.
    ///
    /// # Errors
    ///
    /// Returns a limit error if the rules do not all fit, or the compile error of
    /// the first rule that does not parse
    pub fn add_policy(&mut self, policy: Arc<Policy>) -> EngineResult<()> {
        check_capacity(self.programs.len(), policy.rules.len(), MAX_POLICY_PROGRAMS)?;

        let compiled = policy
            .rules
            .iter()
            .map(|rule| {
                CompiledProgram::compile(ProgramSource::Rule {
                    policy: Some(Arc::clone(&policy)),
                    rule: rule.clone(),
                })
                .map(Arc::new)
            })
            .collect::<EngineResult<Vec<_>>>()?;

        self.programs.extend(compiled);
        Ok(())
    }

    #[must_use]
    pub fn programs(&self) -> &[Arc<CompiledProgram>] {
        &self.programs
    }

    #[must_use]
    pub const fn ignore_error(&self) -> bool {
        self.config.ignore_error
    }
}

impl Evaluator for PolicyEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, package: &Package) -> EngineResult<EvaluationResult> {
        let input = PolicyInput::from_package(package, &self.config.project)?;
        let root = to_cel_value(&encode(&input, "policy")?);

        let manifest = if input.manifest.is_some() {
            cel_field(&root, VAR_MANIFEST)
        } else {
            to_cel_value(&encode(&ManifestInput::unknown(), "manifest")?)
        };

        let scope = self.env.bind(vec![
            (VAR_PACKAGE, cel_field(&root, "package")),
            (VAR_PROJECT, cel_field(&root, VAR_PROJECT)),
            (VAR_MANIFEST, manifest),
            (VAR_ROOT, root),
        ]);

        run_programs(&self.name, self.config.ignore_error, &self.programs, &scope)
    }

    fn program_count(&self) -> usize {
        self.programs.len()
    }

    fn capacity(&self) -> usize {
        MAX_POLICY_PROGRAMS
    }
}
