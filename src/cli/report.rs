//! Report formatting and printing.
//!
//! The model itself goes to stdout (or the output file); everything printed
//! here goes to stderr so the JSON stays pipeable.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{CommandResult, CommandSummary, ExtractSummary, InitSummary};
use crate::{
    config::CONFIG_FILE_NAME,
    core::{Diagnostic, Severity},
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(result, verbose, &mut io::stderr().lock());
}

pub fn print_to<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    match &result.summary {
        CommandSummary::Extract(summary) => print_extract(summary, verbose, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} already exists", CONFIG_FILE_NAME).red()
        );
    }
}

fn print_extract<W: Write>(summary: &ExtractSummary, verbose: bool, writer: &mut W) {
    for diagnostic in &summary.diagnostics {
        if diagnostic.severity == Severity::Warning || verbose {
            print_diagnostic(diagnostic, writer);
        }
    }

    if verbose {
        print_components(summary, writer);
    }

    let components = summary.model.components.len();
    let mut line = format!(
        "Extracted {} {} ({} {}, {} {}) from {} source {}",
        components,
        plural(components, "component", "components"),
        summary.property_count(),
        plural(summary.property_count(), "property", "properties"),
        summary.event_count(),
        plural(summary.event_count(), "event", "events"),
        summary.files_scanned,
        plural(summary.files_scanned, "file", "files"),
    );
    if let Some(output) = &summary.output {
        line.push_str(&format!(" into {}", output.display()));
    }
    let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), line.green());

    let runtime = &summary.model.runtime;
    match &runtime.federation {
        Some(federation) => {
            let _ = writeln!(
                writer,
                "  {} {} (federation remote {})",
                "bundler:".dimmed(),
                runtime.bundler,
                federation.remote_name.cyan()
            );
        }
        None => {
            let _ = writeln!(writer, "  {} {}", "bundler:".dimmed(), runtime.bundler);
        }
    }

    let warnings = summary
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    if warnings > 0 {
        let _ = writeln!(
            writer,
            "{} {} {} emitted",
            "warning:".bold().yellow(),
            warnings,
            plural(warnings, "warning", "warnings")
        );
    }
}

/// `warning: message  kind` followed by `--> file:line`, cargo-style.
fn print_diagnostic<W: Write>(diagnostic: &Diagnostic, writer: &mut W) {
    let severity = match diagnostic.severity {
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "info".bold().blue(),
    };
    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity,
        diagnostic.message,
        diagnostic.kind.to_string().dimmed().cyan()
    );
    match (&diagnostic.file, diagnostic.line) {
        (Some(file), Some(line)) => {
            let _ = writeln!(writer, "  {} {}:{}", "-->".blue(), file, line);
        }
        (Some(file), None) => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), file);
        }
        _ => {}
    }
}

/// One aligned row per component: tag, implementation, module.
fn print_components<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    let components = &summary.model.components;
    let tag_width = components
        .iter()
        .map(|c| UnicodeWidthStr::width(c.tag_name.as_str()))
        .max()
        .unwrap_or(0);
    let ref_width = components
        .iter()
        .map(|c| UnicodeWidthStr::width(c.implementation_ref.as_str()))
        .max()
        .unwrap_or(0);

    for component in components {
        let tag_padding = tag_width - UnicodeWidthStr::width(component.tag_name.as_str());
        let ref_padding = ref_width - UnicodeWidthStr::width(component.implementation_ref.as_str());
        let _ = writeln!(
            writer,
            "  {}{:tag_padding$}  {}{:ref_padding$}  {}  {}",
            component.tag_name.bold(),
            "",
            component.implementation_ref,
            "",
            component.module_path.dimmed(),
            format!(
                "{}p/{}e",
                component.properties.len(),
                component.events.len()
            )
            .dimmed(),
            tag_padding = tag_padding,
            ref_padding = ref_padding
        );
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
