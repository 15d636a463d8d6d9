use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use crate::{
    config::Config,
    core::{
        assemble::assemble,
        diagnostics::Diagnostics,
        file_scanner::scan_files,
        model::IntermediateModel,
        program::Program,
        resolve::ResolutionContext,
        runtime::extract_runtime_config,
    },
};

/// Result of one analysis pass.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub model: IntermediateModel,
    pub diagnostics: Diagnostics,
    /// Files found by the scanner (imported modules loaded on top are not counted).
    pub files_scanned: usize,
    /// Files the scanner left out because of ignore patterns.
    pub files_skipped: usize,
}

/// Drives the pipeline for one project.
///
/// 1. Scan the project for source files.
/// 2. Parse them and every local module they import into a [`Program`].
/// 3. Read the build config.
/// 4. Discover registrations and extract each component.
pub struct AnalysisContext {
    root: PathBuf,
    config: Config,
}

impl AnalysisContext {
    /// Fails when the project root does not exist or is not a directory.
    pub fn new(root: &Path, config: Config) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Project root {} does not exist", root.display()))?;
        if !root.is_dir() {
            bail!("Project root {} is not a directory", root.display());
        }
        config.validate()?;
        Ok(Self { root, config })
    }

    pub fn run(&self) -> Result<AnalysisOutcome> {
        let mut diagnostics = Diagnostics::new();

        let scanned = scan_files(
            &self.root,
            &self.config.includes,
            &self.config.ignores,
            self.config.ignore_test_files,
        );
        tracing::info!(
            "scanned {} source files ({} skipped) under {}",
            scanned.files.len(),
            scanned.skipped_count,
            self.root.display()
        );

        let program = Program::load(&self.root, &scanned.files, &mut diagnostics);
        tracing::debug!("loaded {} modules", program.files().len());

        let runtime = extract_runtime_config(
            &self.root,
            self.config.build_config.as_deref().map(Path::new),
            &mut diagnostics,
        );

        let resolution = ResolutionContext::new(&program, &self.config.conventions);
        let model = assemble(&resolution, runtime, &mut diagnostics);
        tracing::info!("extracted {} components", model.components.len());

        Ok(AnalysisOutcome {
            model,
            diagnostics,
            files_scanned: scanned.files.len(),
            files_skipped: scanned.skipped_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use insta::assert_json_snapshot;
    use tempfile::tempdir;

    use super::*;
    use crate::core::diagnostics::DiagnosticKind;

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let error = AnalysisContext::new(&missing, Config::default())
            .err()
            .unwrap();
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn test_project_on_disk() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("register.ts"),
            "import { Toggle } from './toggle';\ncustomElements.define('x-toggle', Toggle);\n",
        )
        .unwrap();
        fs::write(
            src.join("toggle.ts"),
            r#"
import type { ToggleDetail } from './types';

/** A switch. */
export class Toggle extends HTMLElement {
  /** Whether the switch is on. */
  @property({ type: Boolean }) checked = false;

  flip() {
    this.dispatchEvent(new CustomEvent<ToggleDetail>('change', { bubbles: true }));
  }
}
"#,
        )
        .unwrap();
        fs::write(src.join("types.ts"), "export interface ToggleDetail { checked: boolean }\n")
            .unwrap();
        fs::write(src.join("toggle.test.ts"), "customElements.define('x-test', Fake);\n").unwrap();
        fs::write(
            dir.path().join("vite.config.ts"),
            "export default { plugins: [federation({ name: 'toggles' })] };\n",
        )
        .unwrap();

        let outcome = AnalysisContext::new(dir.path(), Config::default())
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(outcome.diagnostics.of_kind(DiagnosticKind::UnresolvedSymbol).count(), 0);
        assert_json_snapshot!(outcome.model, @r#"
        {
          "runtime": {
            "bundler": "vite",
            "federation": {
              "remoteName": "toggles"
            }
          },
          "components": [
            {
              "tagName": "x-toggle",
              "implementationRef": "Toggle",
              "modulePath": "src/toggle.ts",
              "properties": [
                {
                  "name": "checked",
                  "externalName": "checked",
                  "schema": {
                    "type": "boolean"
                  },
                  "required": true,
                  "sourceKind": "decorator",
                  "description": "Whether the switch is on.",
                  "default": false
                }
              ],
              "events": [
                {
                  "name": "change",
                  "type": "CustomEvent",
                  "payloadSchema": {
                    "type": "object",
                    "properties": {
                      "checked": {
                        "type": "boolean"
                      }
                    },
                    "required": [
                      "checked"
                    ]
                  },
                  "sourceKind": "dispatch",
                  "bubbles": true
                }
              ]
            }
          ]
        }
        "#);
    }
}
