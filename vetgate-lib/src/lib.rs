#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for vetgate
//!
//! This library evaluates supply-chain security policies, written as CEL
//! expressions, against packages enriched with license, vulnerability and
//! project insights.
//!
//! # Module Organization
//!
//! - [`models`]: Packages, manifests and the insight data attached to them
//! - [`policy`]: Policy documents and legacy filter suites
//! - [`input`]: Projection of packages into the documents expressions see
//! - [`expr`]: Expression environment, custom functions and evaluators
//! - [`analyzer`]: Batch evaluation of manifests with match aggregation
//! - [`commands`]: Command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod analyzer;
pub mod expr;
pub mod input;
pub mod models;
pub mod policy;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub use crate::commands::{Host, run};
