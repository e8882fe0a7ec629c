//! Batch analysis of manifests.
//!
//! An analyzer drives an evaluator over every package of successive manifests,
//! keeps running statistics, reports each matching package identity once per
//! session, and optionally signals that the overall run should fail.

mod event;
mod exceptions;
mod policy_analyzer;
mod stats;

pub use event::{AnalyzerEvent, AnalyzerEventKind};
pub use exceptions::{EXPIRY_DATE_FORMAT, ExceptionEntry, ExceptionSuite, ExceptionsGenerator};
pub use policy_analyzer::{
    AnalysisSummary, AnalyzerOptions, FILTER_SUITE_EVALUATOR, MatchedPackage, POLICY_SUITE_EVALUATOR, PolicyAnalyzer,
    SINGLE_FILTER_EVALUATOR, SINGLE_FILTER_NAME, SINGLE_QUERY_EVALUATOR, SINGLE_QUERY_RULE,
};
pub use stats::MatchStats;
