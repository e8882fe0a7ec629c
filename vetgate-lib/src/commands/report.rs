use crate::analyzer::{AnalysisSummary, AnalyzerEvent};
use core::fmt::{self, Write};
use owo_colors::OwoColorize;

/// Render a single analyzer event as one console line.
pub fn format_event<W: Write>(event: &AnalyzerEvent<'_>, use_colors: bool, writer: &mut W) -> fmt::Result {
    if event.is_fail_on_match() {
        let text = format!("Policy violation in '{}'", event.manifest.path);
        if use_colors {
            return writeln!(writer, "{}", text.red().bold());
        }
        return writeln!(writer, "{text}");
    }

    let Some(package) = event.package else {
        return Ok(());
    };

    let coordinates = format!("{}/{}@{}", package.ecosystem(), package.name(), package.version());
    let rule = match (event.policy_name(), event.rule_name()) {
        (Some(policy), Some(rule)) if !policy.is_empty() => format!("{policy}/{rule}"),
        (_, Some(rule)) => rule.to_string(),
        (_, None) => String::new(),
    };
    let summary = event.program.as_deref().map_or("", |p| p.summary());

    if use_colors {
        writeln!(writer, "  🗙 {} [{}] {}", coordinates.yellow().bold(), rule.cyan(), summary)
    } else {
        writeln!(writer, "  🗙 {coordinates} [{rule}] {summary}")
    }
}

/// Render the closing summary of an analysis session.
pub fn format_summary<W: Write>(summary: &AnalysisSummary, use_colors: bool, writer: &mut W) -> fmt::Result {
    writeln!(writer)?;

    let stats = summary.stats.to_string();
    if !use_colors {
        return writeln!(writer, "{stats}");
    }

    if summary.has_matches() {
        writeln!(writer, "{}", stats.yellow().bold())
    } else if summary.stats.error_count() > 0 {
        writeln!(writer, "{}", stats.red())
    } else {
        writeln!(writer, "{}", stats.green())
    }
}
