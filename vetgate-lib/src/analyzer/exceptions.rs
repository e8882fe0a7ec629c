use crate::Result;
use crate::expr::{Evaluator, EvaluatorConfig, FilterEvaluator};
use crate::models::PackageManifest;
use crate::policy::Filter;
use camino::Utf8Path;
use chrono::{NaiveDate, SecondsFormat};
use ohno::{IntoAppError, app_err};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};

const LOG_TARGET: &str = "exceptions";

const EXCEPTIONS_FILTER: &str = "exceptions-filter";
const DEFAULT_FILTER: &str = "true";
const SUITE_NAME: &str = "Auto Generated Exceptions";
const SUITE_DESCRIPTION: &str = "Exceptions file auto-generated using vet";

/// Format of the expiry date given on input.
pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

/// A package excluded from enforcement until it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionEntry {
    pub id: String,
    pub ecosystem: String,
    pub name: String,
    pub version: String,

    /// RFC 3339 timestamp after which the exception no longer applies.
    pub expires: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionSuite {
    pub name: String,
    pub description: String,
    pub exceptions: Vec<ExceptionEntry>,
}

/// Collects packages selected by a legacy filter into an exceptions suite.
#[derive(Debug)]
pub struct ExceptionsGenerator {
    evaluator: FilterEvaluator,
    expires: String,
    seen: FxHashSet<String>,
    entries: Vec<ExceptionEntry>,
}

impl ExceptionsGenerator {
    /// Create a generator selecting packages with `filter`, or every package when absent.
    ///
    /// `expires_on` is a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is malformed or the filter does not compile
    pub fn new(filter: Option<&str>, expires_on: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(expires_on, EXPIRY_DATE_FORMAT)
            .map_err(|e| app_err!("invalid expiry date '{expires_on}', expected YYYY-MM-DD: {e}"))?;
        let expires = date.and_time(chrono::NaiveTime::MIN).and_utc().to_rfc3339_opts(SecondsFormat::Secs, true);

        let filter = filter.map_or(DEFAULT_FILTER, str::trim);
        let filter = if filter.is_empty() { DEFAULT_FILTER } else { filter };

        let mut evaluator = FilterEvaluator::with_config(EXCEPTIONS_FILTER, EvaluatorConfig::with_ignore_error(true))
            .into_app_err("unable to create the exceptions filter")?;
        evaluator
            .add_filter(Filter::new(EXCEPTIONS_FILTER, filter))
            .into_app_err("unable to compile the exceptions filter")?;

        Ok(Self {
            evaluator,
            expires,
            seen: FxHashSet::default(),
            entries: Vec::new(),
        })
    }

    /// Add every selected package of `manifest` not already collected.
    ///
    /// # Errors
    ///
    /// Returns an error if a package cannot be evaluated
    pub fn analyze(&mut self, manifest: &PackageManifest) -> Result<()> {
        for package in manifest.packages() {
            let result = self
                .evaluator
                .evaluate(package)
                .into_app_err_with(|| format!("unable to evaluate {}@{}", package.name(), package.version()))?;

            if !result.is_match() {
                continue;
            }

            let id = package.id();
            if !self.seen.insert(id.clone()) {
                continue;
            }

            log::debug!(target: LOG_TARGET, "Adding exception for {}@{}", package.name(), package.version());
            self.entries.push(ExceptionEntry {
                id,
                ecosystem: package.ecosystem().to_string(),
                name: package.name().to_string(),
                version: package.version().to_string(),
                expires: self.expires.clone(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub fn entries(&self) -> &[ExceptionEntry] {
        &self.entries
    }

    #[must_use]
    pub fn suite(&self) -> ExceptionSuite {
        ExceptionSuite {
            name: SUITE_NAME.to_string(),
            description: SUITE_DESCRIPTION.to_string(),
            exceptions: self.entries.clone(),
        }
    }

    /// Write the collected exceptions as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails
    pub fn write_to(&self, writer: impl Write) -> Result<()> {
        serde_yaml::to_writer(writer, &self.suite()).map_err(|e| app_err!("unable to write exceptions: {e}"))
    }

    /// Write the collected exceptions to a YAML file, replacing it if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written
    pub fn write_to_file(&self, path: &Utf8Path) -> Result<()> {
        let file = File::create(path).into_app_err_with(|| format!("unable to create exceptions file '{path}'"))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().into_app_err_with(|| format!("unable to write exceptions file '{path}'"))?;

        log::info!(target: LOG_TARGET, "Wrote {} exception(s) to '{path}'", self.entries.len());
        Ok(())
    }
}
