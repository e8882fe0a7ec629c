use super::Host;
use super::common::{EXIT_EVALUATION_FAILURE, LogLevel, init_logging, load_manifests};
use crate::Result;
use crate::analyzer::ExceptionsGenerator;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ExceptionsArgs {
    /// JSON dump of enriched package manifests
    #[arg(long, value_name = "PATH")]
    pub packages: Utf8PathBuf,

    /// Legacy filter expression selecting the packages to exempt (default is every package)
    #[arg(long, value_name = "EXPR")]
    pub filter: Option<String>,

    /// Date the exceptions expire on, as YYYY-MM-DD
    #[arg(long, value_name = "DATE")]
    pub expires_on: String,

    /// Path of the exceptions file to write
    #[arg(long, short = 'o', value_name = "PATH", default_value = "exceptions.yml")]
    pub output: Utf8PathBuf,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

fn generate_inner(args: &ExceptionsArgs) -> Result<usize> {
    let manifests = load_manifests(&args.packages)?;
    let mut generator = ExceptionsGenerator::new(args.filter.as_deref(), &args.expires_on)?;

    for manifest in &manifests {
        generator.analyze(manifest)?;
    }

    generator.write_to_file(&args.output)?;
    Ok(generator.entries().len())
}

/// Write an exceptions file covering the packages selected by a filter
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded, the filter does not compile, or the file cannot be written
pub fn generate_exceptions<H: Host>(host: &mut H, args: &ExceptionsArgs) -> Result<()> {
    init_logging(args.log_level);

    match generate_inner(args) {
        Ok(count) => {
            let _ = writeln!(host.output(), "Wrote {count} exception(s) to '{}'", args.output);
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Exceptions generation failed: {e}");
            host.exit(EXIT_EVALUATION_FAILURE);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ExceptionSuite;
    use crate::commands::host::TestHost;
    use std::fs;

    const PACKAGES: &str = r#"[
  {"path": "a/requirements.txt", "ecosystem": "PyPI", "packages": [
    {"package_detail": {"ecosystem": "PyPI", "name": "requests", "version": "2.31.0"}},
    {"package_detail": {"ecosystem": "PyPI", "name": "flask", "version": "3.0.0"}}
  ]},
  {"path": "b/requirements.txt", "ecosystem": "PyPI", "packages": [
    {"package_detail": {"ecosystem": "PyPI", "name": "requests", "version": "2.31.0"}}
  ]}
]"#;

    fn args(filter: Option<&str>) -> (tempfile::TempDir, ExceptionsArgs) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let packages = root.join("packages.json");
        fs::write(&packages, PACKAGES).unwrap();

        let args = ExceptionsArgs {
            packages,
            filter: filter.map(str::to_string),
            expires_on: "2026-12-31".to_string(),
            output: root.join("exceptions.yml"),
            log_level: LogLevel::None,
        };
        (dir, args)
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_generates_deduplicated_file() {
        let (_dir, args) = args(None);

        let mut host = TestHost::new();
        generate_exceptions(&mut host, &args).unwrap();
        assert!(host.output_text().contains("Wrote 2 exception(s)"));

        let suite: ExceptionSuite = serde_yaml::from_str(&fs::read_to_string(&args.output).unwrap()).unwrap();
        let names: Vec<_> = suite.exceptions.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["requests", "flask"]);
        assert!(suite.exceptions.iter().all(|e| e.expires == "2026-12-31T00:00:00Z"));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_filter_applied() {
        let (_dir, args) = args(Some("pkg.name == 'flask'"));

        let mut host = TestHost::new();
        generate_exceptions(&mut host, &args).unwrap();
        assert!(host.output_text().contains("Wrote 1 exception(s)"));
    }

    #[test]
    fn test_bad_date() {
        let (_dir, mut args) = args(None);
        args.expires_on = "tomorrow".to_string();

        let mut host = TestHost::new();
        let _ = generate_exceptions(&mut host, &args).unwrap_err();
        assert_eq!(host.exit_code, Some(EXIT_EVALUATION_FAILURE));
        assert!(!args.output.exists());
    }
}
