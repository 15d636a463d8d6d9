pub mod extract;
pub mod init;

use std::path::PathBuf;

use crate::core::{Diagnostic, IntermediateModel, Severity};

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub model: IntermediateModel,
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
    /// Where the model was written; `None` for stdout.
    pub output: Option<PathBuf>,
}

impl ExtractSummary {
    pub fn property_count(&self) -> usize {
        self.model.components.iter().map(|c| c.properties.len()).sum()
    }

    pub fn event_count(&self) -> usize {
        self.model.components.iter().map(|c| c.events.len()).sum()
    }
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// Result of running a wcscan command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub warning_count: usize,
    /// If true, exit status 1 is returned when `warning_count > 0`.
    pub exit_on_warnings: bool,
}

impl CommandResult {
    pub fn extract(summary: ExtractSummary, strict: bool) -> Self {
        let warning_count = summary
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        Self {
            summary: CommandSummary::Extract(summary),
            warning_count,
            exit_on_warnings: strict,
        }
    }

    pub fn init(created: bool) -> Self {
        Self {
            summary: CommandSummary::Init(InitSummary { created }),
            warning_count: 0,
            exit_on_warnings: false,
        }
    }
}
