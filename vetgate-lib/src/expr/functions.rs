//! Custom functions callable from expressions
//!
//! - `contains_license(list, string) -> bool`: SPDX license satisfaction
//! - `now() -> timestamp`: the evaluator clock's current time

use super::Clock;
use cel_interpreter::extractors::This;
use cel_interpreter::objects::Key;
use cel_interpreter::{Context, Value};
use spdx::expression::{ExprNode, Operator};
use spdx::{Expression, ParseMode};
use std::sync::Arc;

const LOG_TARGET: &str = " functions";

pub const CONTAINS_LICENSE: &str = "contains_license";
pub const NOW: &str = "now";

/// Register the custom function library on a root context.
pub(super) fn register(context: &mut Context<'static>, clock: Arc<dyn Clock>) {
    context.add_function(CONTAINS_LICENSE, contains_license);
    context.add_function(NOW, move || clock.now().fixed_offset());
}

/// Whether any license in `licenses` satisfies the `wanted` SPDX expression.
///
/// Entries are SPDX expressions, either plain strings or license objects carrying
/// a `license_id` field. Iteration stops at the first satisfying entry. Entries
/// that cannot be parsed are logged and treated as non-satisfying.
///
/// A `wanted` expression using `AND` is not supported and never matches.
pub fn contains_license(This(licenses): This<Value>, wanted: Arc<String>) -> bool {
    let Value::List(entries) = licenses else {
        log::warn!(target: LOG_TARGET, "{CONTAINS_LICENSE}: receiver is not a list");
        return false;
    };

    let wanted_expr = match Expression::parse_mode(&wanted, ParseMode::LAX) {
        Ok(expr) => expr,
        Err(e) => {
            log::warn!(target: LOG_TARGET, "{CONTAINS_LICENSE}: could not parse wanted license expression '{wanted}': {e}");
            return false;
        }
    };

    if wanted_expr.iter().any(|node| matches!(node, ExprNode::Op(Operator::And))) {
        log::warn!(target: LOG_TARGET, "{CONTAINS_LICENSE}: AND expressions are not supported, '{wanted}' never matches");
        return false;
    }

    entries.iter().any(|entry| entry_satisfies(entry, &wanted_expr))
}

fn entry_satisfies(entry: &Value, wanted: &Expression) -> bool {
    let Some(text) = license_text(entry) else {
        log::warn!(target: LOG_TARGET, "{CONTAINS_LICENSE}: ignoring license entry that is neither a string nor a license object");
        return false;
    };

    match Expression::parse_mode(text, ParseMode::LAX) {
        Ok(available) => wanted.evaluate(|req| available.requirements().any(|r| r.req == *req)),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "{CONTAINS_LICENSE}: could not parse license expression '{text}': {e}");
            false
        }
    }
}

fn license_text(entry: &Value) -> Option<&str> {
    match entry {
        Value::String(s) => Some(s.as_str()),
        Value::Map(map) => match map.map.get(&Key::String(Arc::new("license_id".to_string()))) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::FixedClock;
    use cel_interpreter::Program;
    use cel_interpreter::objects::Map;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn string_list(items: &[&str]) -> Value {
        Value::List(Arc::new(items.iter().map(|s| Value::String(Arc::new((*s).to_string()))).collect()))
    }

    fn check(licenses: &[&str], wanted: &str) -> bool {
        contains_license(This(string_list(licenses)), Arc::new(wanted.to_string()))
    }

    #[test]
    fn test_single_license_in_disjunction() {
        assert!(check(&["MIT OR Apache-2.0"], "MIT"));
        assert!(check(&["MIT OR Apache-2.0"], "Apache-2.0"));
    }

    #[test]
    fn test_wanted_disjunction() {
        assert!(check(&["MIT OR Apache-2.0"], "Apache-2.0 OR MIT"));
        assert!(check(&["GPL-3.0-only"], "MIT OR GPL-3.0-only"));
    }

    #[test]
    fn test_wanted_conjunction_is_not_supported() {
        // AND in the wanted expression is a known limitation and never matches
        assert!(!check(&["MIT OR Apache-2.0"], "Apache-2.0 AND MIT"));
        assert!(!check(&["MIT AND Apache-2.0"], "MIT AND Apache-2.0"));
    }

    #[test]
    fn test_no_matching_license() {
        assert!(!check(&["MIT"], "GPL-3.0-only"));
        assert!(!check(&[], "MIT"));
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        assert!(!check(&["this is (not a license"], "MIT"));
        assert!(check(&["this is (not a license", "MIT"], "MIT"));
    }

    #[test]
    fn test_malformed_wanted_never_matches() {
        assert!(!check(&["MIT"], "MIT OR ("));
    }

    #[test]
    fn test_non_list_receiver() {
        assert!(!contains_license(This(Value::Int(3)), Arc::new("MIT".to_string())));
    }

    #[test]
    fn test_license_objects() {
        let mut fields = HashMap::new();
        let _ = fields.insert(Key::String(Arc::new("license_id".to_string())), Value::String(Arc::new("Apache-2.0".to_string())));
        let _ = fields.insert(Key::String(Arc::new("name".to_string())), Value::String(Arc::new("Apache License 2.0".to_string())));
        let list = Value::List(Arc::new(vec![Value::Map(Map::from(fields))]));

        assert!(contains_license(This(list.clone()), Arc::new("Apache-2.0".to_string())));
        assert!(!contains_license(This(list), Arc::new("MIT".to_string())));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_callable_as_member_and_function() {
        let mut context = Context::default();
        register(&mut context, Arc::new(FixedClock(Utc::now())));
        context.add_variable_from_value("licenses", string_list(&["MIT OR Apache-2.0"]));

        let member = Program::compile("licenses.contains_license('MIT')").unwrap();
        assert_eq!(member.execute(&context).unwrap(), Value::Bool(true));

        let function = Program::compile("contains_license(licenses, 'BSD-3-Clause')").unwrap();
        assert_eq!(function.execute(&context).unwrap(), Value::Bool(false));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_now_uses_clock() {
        let instant = Utc.with_ymd_and_hms(2026, 2, 15, 13, 0, 0).unwrap();
        let mut context = Context::default();
        register(&mut context, Arc::new(FixedClock(instant)));

        let program = Program::compile("now() == timestamp('2026-02-15T13:00:00Z')").unwrap();
        assert_eq!(program.execute(&context).unwrap(), Value::Bool(true));

        let program = Program::compile("now() > timestamp('2026-02-15T10:00:00Z')").unwrap();
        assert_eq!(program.execute(&context).unwrap(), Value::Bool(true));
    }
}
