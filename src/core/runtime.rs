//! Build-tool configuration discovery.
//!
//! Recovers the bundler in use and, when present, the module federation
//! options (`remoteName`, `libraryType`, `exposes`) from the project's build
//! config. Only literal values are read; the config is never evaluated.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use swc_common::SourceMap;
use swc_ecma_ast::{CallExpr, Expr, NewExpr, ObjectLit, Prop, PropOrSpread};
use swc_ecma_visit::{Visit, VisitWith};

use crate::{
    core::{
        collect::helpers::{callee_name, expr_name, object_entry, object_string_entry, prop_name, string_literal, unwrap_ts_expr},
        diagnostics::{Diagnostic, DiagnosticKind, Diagnostics},
        model::{FederationConfig, RuntimeConfig},
        parsers::source::parse_source,
    },
    utils::relative_display,
};

/// Build configs looked for in the project root, in order.
pub const BUILD_CONFIG_CANDIDATES: &[&str] = &[
    "webpack.config.js",
    "webpack.config.ts",
    "webpack.config.mjs",
    "webpack.config.cjs",
    "rspack.config.js",
    "rspack.config.ts",
    "vite.config.ts",
    "vite.config.js",
    "vite.config.mjs",
    "rollup.config.js",
    "rollup.config.mjs",
];

const FALLBACK_DIR: &str = "src";
const FALLBACK_EXTENSIONS: &[&str] = &["js", "ts", "mjs", "cjs"];
const KNOWN_BUNDLERS: &[&str] = &["webpack", "rspack", "vite", "rollup"];

/// Locate the build config of a project.
pub fn find_build_config(root: &Path) -> Option<PathBuf> {
    if let Some(found) = BUILD_CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
    {
        return Some(found);
    }

    let entries = fs::read_dir(root.join(FALLBACK_DIR)).ok()?;
    let mut configs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_config_file_name(path))
        .collect();
    configs.sort();
    configs.into_iter().next()
}

/// `*.config.{js,ts,mjs,cjs}`
fn is_config_file_name(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    FALLBACK_EXTENSIONS.iter().any(|ext| {
        name.strip_suffix(ext)
            .and_then(|rest| rest.strip_suffix('.'))
            .is_some_and(|stem| stem.ends_with(".config") && stem.len() > ".config".len())
    })
}

/// Bundler name from a config file name: `vite.config.ts` → `vite`.
pub fn bundler_name(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if let Some(known) = KNOWN_BUNDLERS
        .iter()
        .find(|bundler| name.starts_with(&format!("{}.", bundler)))
    {
        return known.to_string();
    }
    name.split('.').next().unwrap_or(name).to_string()
}

/// Read the runtime configuration of the project at `root`.
///
/// Never fails: a missing or unparsable config yields an `unknown` bundler
/// and a diagnostic.
pub fn extract_runtime_config(
    root: &Path,
    explicit: Option<&Path>,
    diagnostics: &mut Diagnostics,
) -> RuntimeConfig {
    let path = match explicit {
        Some(path) => {
            let path = root.join(path);
            if !path.is_file() {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::MissingBuildConfig,
                    format!("build config '{}' does not exist", path.display()),
                ));
                return RuntimeConfig::unknown();
            }
            path
        }
        None => match find_build_config(root) {
            Some(path) => path,
            None => {
                diagnostics.push(Diagnostic::info(
                    DiagnosticKind::MissingBuildConfig,
                    "no build config found; runtime bundler is unknown",
                ));
                return RuntimeConfig::unknown();
            }
        },
    };

    let display_path = relative_display(root, &path);
    tracing::debug!("reading build config {}", display_path);

    match read_federation(&path) {
        Ok(federation) => RuntimeConfig {
            bundler: bundler_name(&path),
            federation,
        },
        Err(e) => {
            diagnostics.push(
                Diagnostic::warning(DiagnosticKind::UnparsableConfig, format!("{:#}", e))
                    .in_file(display_path),
            );
            RuntimeConfig::unknown()
        }
    }
}

fn read_federation(path: &Path) -> Result<Option<FederationConfig>> {
    let code = fs::read_to_string(path)
        .with_context(|| format!("Failed to read build config {}", path.display()))?;
    let parsed = parse_source(code, &path.to_string_lossy(), Arc::new(SourceMap::default()))?;

    let mut finder = FederationFinder::default();
    parsed.module.visit_with(&mut finder);
    Ok(finder.federation)
}

#[derive(Default)]
struct FederationFinder {
    federation: Option<FederationConfig>,
}

impl FederationFinder {
    fn record(&mut self, options: Option<&ObjectLit>) {
        if self.federation.is_some() {
            return;
        }
        if let Some(options) = options {
            self.federation = federation_options(options);
        }
    }
}

fn first_object<'a>(args: impl IntoIterator<Item = &'a Expr>) -> Option<&'a ObjectLit> {
    args.into_iter().next().and_then(|expr| match unwrap_ts_expr(expr) {
        Expr::Object(object) => Some(object),
        _ => None,
    })
}

impl Visit for FederationFinder {
    fn visit_new_expr(&mut self, node: &NewExpr) {
        if expr_name(&node.callee).is_some_and(|name| name.ends_with("ModuleFederationPlugin")) {
            let args = node.args.iter().flatten().map(|arg| &*arg.expr);
            self.record(first_object(args));
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if callee_name(&node.callee).is_some_and(|name| name == "federation") {
            self.record(first_object(node.args.iter().map(|arg| &*arg.expr)));
        }
        node.visit_children_with(self);
    }
}

fn federation_options(options: &ObjectLit) -> Option<FederationConfig> {
    let Some(remote_name) = object_string_entry(options, "name") else {
        tracing::debug!("federation options without a literal name are ignored");
        return None;
    };

    let library_type = object_entry(options, "library")
        .and_then(|library| match unwrap_ts_expr(library) {
            Expr::Object(library) => object_string_entry(library, "type"),
            _ => None,
        })
        .or_else(|| object_string_entry(options, "libraryType"));

    let exposes = object_entry(options, "exposes").and_then(|exposes| match unwrap_ts_expr(exposes) {
        Expr::Object(exposes) => Some(exposed_modules(exposes)),
        _ => None,
    });

    Some(FederationConfig {
        remote_name,
        library_type,
        exposes,
    })
}

/// `'./Button': './src/Button'` or `'./Button': { import: './src/Button' }`.
fn exposed_modules(exposes: &ObjectLit) -> IndexMap<String, String> {
    let mut modules = IndexMap::new();
    for prop in &exposes.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(kv) = &**prop else {
            continue;
        };
        let Some(name) = prop_name(&kv.key) else {
            continue;
        };
        let target = match unwrap_ts_expr(&kv.value) {
            Expr::Object(entry) => object_string_entry(entry, "import"),
            other => string_literal(other),
        };
        if let Some(target) = target {
            modules.insert(name, target);
        }
    }
    modules
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_webpack_module_federation() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("webpack.config.js"),
            r#"
const { ModuleFederationPlugin } = require('webpack').container;
module.exports = {
  plugins: [
    new ModuleFederationPlugin({
      name: 'widgets',
      library: { type: 'var', name: 'widgets' },
      exposes: {
        './Button': './src/button.ts',
        './Card': { import: './src/card.ts' },
      },
    }),
  ],
};
"#,
        )
        .unwrap();

        let mut diagnostics = Diagnostics::new();
        let runtime = extract_runtime_config(dir.path(), None, &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(
            serde_json::to_value(runtime).unwrap(),
            json!({
                "bundler": "webpack",
                "federation": {
                    "remoteName": "widgets",
                    "libraryType": "var",
                    "exposes": {"./Button": "./src/button.ts", "./Card": "./src/card.ts"}
                }
            })
        );
    }

    #[test]
    fn test_vite_federation_call() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("vite.config.ts"),
            r#"
import federation from '@originjs/vite-plugin-federation';
export default defineConfig({
  plugins: [federation({ name: 'remote', exposes: { './App': './src/App.tsx' } })],
});
"#,
        )
        .unwrap();

        let runtime = extract_runtime_config(dir.path(), None, &mut Diagnostics::new());
        assert_eq!(runtime.bundler, "vite");
        let federation = runtime.federation.unwrap();
        assert_eq!(federation.remote_name, "remote");
        assert_eq!(federation.library_type, None);
        assert_eq!(federation.exposes.unwrap()["./App"], "./src/App.tsx");
    }

    #[test]
    fn test_candidate_order_and_src_fallback() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/module-federation.config.ts"), "export default {};").unwrap();
        fs::write(dir.path().join("src/app.ts"), "").unwrap();

        let found = find_build_config(dir.path()).unwrap();
        assert!(found.ends_with("src/module-federation.config.ts"));
        assert_eq!(bundler_name(&found), "module-federation");

        fs::write(dir.path().join("rollup.config.js"), "export default {};").unwrap();
        fs::write(dir.path().join("webpack.config.ts"), "export default {};").unwrap();
        let found = find_build_config(dir.path()).unwrap();
        assert!(found.ends_with("webpack.config.ts"));
    }

    #[test]
    fn test_missing_config_is_informational() {
        let dir = tempdir().unwrap();
        let mut diagnostics = Diagnostics::new();
        let runtime = extract_runtime_config(dir.path(), None, &mut diagnostics);

        assert_eq!(runtime, RuntimeConfig::unknown());
        assert_eq!(diagnostics.warning_count(), 0);
        assert_eq!(
            diagnostics.of_kind(DiagnosticKind::MissingBuildConfig).count(),
            1
        );
    }

    #[test]
    fn test_unparsable_config() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("rollup.config.js"), "export default {").unwrap();

        let mut diagnostics = Diagnostics::new();
        let runtime = extract_runtime_config(dir.path(), None, &mut diagnostics);

        assert_eq!(runtime.bundler, "unknown");
        assert_eq!(diagnostics.of_kind(DiagnosticKind::UnparsableConfig).count(), 1);
    }

    #[test]
    fn test_config_without_federation() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("custom.build.js"), "module.exports = { mode: 'production' };")
            .unwrap();

        let runtime = extract_runtime_config(
            dir.path(),
            Some(Path::new("custom.build.js")),
            &mut Diagnostics::new(),
        );
        assert_eq!(runtime.bundler, "custom");
        assert_eq!(runtime.federation, None);
    }
}
