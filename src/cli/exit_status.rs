use std::process::ExitCode;

use super::commands::{CommandResult, CommandSummary};

/// Exit status for CLI commands.
///
/// - `Success` (0): the command completed
/// - `Failure` (1): `--strict` and warnings were emitted, or `init` found an existing config
/// - `Error` (2): the command failed (missing root, invalid config, write error)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl ExitStatus {
    pub fn from_result(result: &CommandResult) -> Self {
        match &result.summary {
            CommandSummary::Init(summary) if !summary.created => ExitStatus::Failure,
            _ if result.exit_on_warnings && result.warning_count > 0 => ExitStatus::Failure,
            _ => ExitStatus::Success,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::from(0));
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::from(1));
        assert_eq!(ExitCode::from(ExitStatus::Error), ExitCode::from(2));
    }

    #[test]
    fn init_over_existing_config_fails() {
        assert_eq!(
            ExitStatus::from_result(&CommandResult::init(false)),
            ExitStatus::Failure
        );
        assert_eq!(
            ExitStatus::from_result(&CommandResult::init(true)),
            ExitStatus::Success
        );
    }
}
