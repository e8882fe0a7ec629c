//! Logging, color and input handling shared by the commands.

use crate::Result;
use crate::models::PackageManifest;
use camino::Utf8Path;
use clap::ValueEnum;
use ohno::{IntoAppError, app_err};
use std::fs;

const LOG_TARGET: &str = "  commands";

/// Process exit code when a policy matched and `--fail-on-match` was given.
pub const EXIT_POLICY_VIOLATION: i32 = 1;

/// Process exit code when evaluation could not complete.
pub const EXIT_EVALUATION_FAILURE: i32 = 2;

/// Color mode configuration for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Always use colors
    Always,

    /// Never use colors
    Never,

    /// Use colors if the output is a terminal, otherwise don't use colors
    Auto,
}

impl ColorMode {
    #[must_use]
    pub fn use_colors(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                use std::io::{IsTerminal, stdout};
                stdout().is_terminal()
            }
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Initialize logger based on log level
pub fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    // a logger may already be installed when commands run more than once in a process
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}

/// Load a JSON array of enriched manifests and link their packages.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid manifest dump
pub fn load_manifests(path: &Utf8Path) -> Result<Vec<PackageManifest>> {
    let text = fs::read_to_string(path).into_app_err_with(|| format!("reading package dump '{path}'"))?;
    let mut manifests: Vec<PackageManifest> =
        serde_json::from_str(&text).map_err(|e| app_err!("parsing package dump '{path}': {e}"))?;

    for manifest in &mut manifests {
        manifest.link_packages();
    }

    log::info!(
        target: LOG_TARGET,
        "Loaded {} manifest(s) with {} package(s) from '{path}'",
        manifests.len(),
        manifests.iter().map(|m| m.packages().len()).sum::<usize>()
    );

    Ok(manifests)
}
