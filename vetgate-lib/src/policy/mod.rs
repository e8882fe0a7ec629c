//! Policy and filter-suite documents
//!
//! Policies (the current generation) are named, ordered collections of rules
//! with an allow/deny intent. Filter suites are the legacy generation: a flat
//! list of filters evaluated against the legacy input schema.
//!
//! Both documents are persisted as YAML and deserialized strictly: any field
//! not part of the schema fails the load with an `unknown field` error.

mod filter_suite;
mod policy_doc;

pub use filter_suite::{CheckType, Filter, FilterSuite};
pub use policy_doc::{Policy, PolicyTarget, PolicyType, PolicyVersion, Rule, RuleCheck};
