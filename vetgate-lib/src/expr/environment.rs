use super::enums::EnumTable;
use super::{Clock, EngineError, EngineResult, functions};
use cel_interpreter::{Context, Value};
use core::fmt;
use std::sync::Arc;

/// The immutable evaluation environment of one evaluator.
///
/// Holds the standard library, the custom function library, and the enum
/// tables. Input variables are declared here but only bound per evaluation,
/// in a child scope returned by [`Environment::bind`].
pub struct Environment {
    root: Context<'static>,
    variables: &'static [&'static str],
}

impl Environment {
    /// Build an environment declaring `variables` as the input variables of expressions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Environment`] if an enum table is malformed, two tables
    /// share a name, or a table name shadows an input variable.
    pub fn build(evaluator: &str, variables: &'static [&'static str], tables: &[EnumTable], clock: Arc<dyn Clock>) -> EngineResult<Self> {
        let mut root = Context::default();
        functions::register(&mut root, clock);

        let mut registered: Vec<&str> = Vec::with_capacity(tables.len());
        for table in tables {
            let name = table.name();
            if variables.contains(&name) || registered.contains(&name) || name == functions::CONTAINS_LICENSE || name == functions::NOW {
                return Err(EngineError::Environment {
                    evaluator: evaluator.to_string(),
                    reason: format!("enum table '{name}' collides with another declaration"),
                });
            }

            root.add_variable_from_value(name, table.to_value(evaluator)?);
            registered.push(name);
        }

        Ok(Self { root, variables })
    }

    #[must_use]
    pub const fn variables(&self) -> &'static [&'static str] {
        self.variables
    }

    /// Create a per-evaluation scope with the input variables bound.
    ///
    /// Declared variables missing from `bindings` are bound to `null`.
    #[must_use]
    pub fn bind(&self, bindings: Vec<(&'static str, Value)>) -> Context<'_> {
        let mut scope = self.root.new_inner_scope();

        for name in self.variables {
            if !bindings.iter().any(|(bound, _)| bound == name) {
                scope.add_variable_from_value(*name, Value::Null);
            }
        }

        for (name, value) in bindings {
            debug_assert!(self.variables.contains(&name), "binding undeclared variable '{name}'");
            scope.add_variable_from_value(name, value);
        }

        scope
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment").field("variables", &self.variables).finish_non_exhaustive()
    }
}
