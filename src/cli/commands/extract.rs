use std::{
    fs,
    io::{self, Write},
    path,
};

use anyhow::{Context, Result};

use super::{CommandResult, ExtractSummary};
use crate::{
    cli::args::ExtractCommand,
    config::load_config,
    core::{AnalysisContext, IntermediateModel},
};

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let common = &cmd.common;

    // Priority: CLI args > config file > defaults
    let config_result = load_config(&common.root)?;
    if !config_result.from_file {
        tracing::debug!("no .wcscanrc.json found, using default configuration");
    }
    let mut config = config_result.config;
    if let Some(build_config) = &common.build_config {
        // Relative to the working directory, not the project root.
        let build_config = path::absolute(build_config)
            .with_context(|| format!("Invalid build config path: {}", build_config.display()))?;
        config.build_config = Some(build_config.to_string_lossy().into_owned());
    }

    let ctx = AnalysisContext::new(&common.root, config)?;
    let outcome = ctx.run()?;

    let json = render(&outcome.model, cmd.compact)?;
    match &cmd.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
        }
    }

    let summary = ExtractSummary {
        model: outcome.model,
        diagnostics: outcome.diagnostics.into_vec(),
        files_scanned: outcome.files_scanned,
        output: cmd.output.clone(),
    };
    Ok(CommandResult::extract(summary, cmd.strict))
}

fn render(model: &IntermediateModel, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(model)
    } else {
        serde_json::to_string_pretty(model)
    };
    json.context("Failed to serialize the component model")
}
