//! In-memory snapshot of the parsed project.
//!
//! `Program` owns every parsed source file. Scanned files are parsed in
//! parallel; relative imports and re-exports are then followed until every
//! reachable local module is loaded, so that cross-file resolution never
//! touches the filesystem again.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Result, anyhow};
use rayon::prelude::*;
use swc_common::SourceMap;
use swc_ecma_ast::{ModuleDecl, ModuleItem};

use crate::{
    core::{
        diagnostics::{Diagnostic, DiagnosticKind, Diagnostics},
        file_scanner::is_generated_file,
        parsers::source::{ParsedSource, parse_source},
        resolve::paths::{fallback_candidates, is_relative_specifier},
    },
    utils::{normalize_path, relative_display},
};

pub struct SourceFile {
    /// Index into [`Program::files`].
    pub id: usize,
    pub path: PathBuf,
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
    pub parsed: ParsedSource,
    /// Whether registrations are searched for in this file.
    pub discoverable: bool,
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceFile")
            .field("id", &self.id)
            .field("relative_path", &self.relative_path)
            .field("discoverable", &self.discoverable)
            .finish()
    }
}

impl SourceFile {
    pub fn line_of(&self, pos: swc_common::BytePos) -> usize {
        self.parsed.line_of(pos)
    }
}

#[derive(Debug)]
pub struct Program {
    root: PathBuf,
    files: Vec<SourceFile>,
    by_path: HashMap<PathBuf, usize>,
}

struct LoadedFile {
    path: PathBuf,
    parsed: ParsedSource,
    discoverable: bool,
}

fn parse_file(path: &Path) -> Result<ParsedSource> {
    let code = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read file: {}", e))?;
    let source_map = Arc::new(SourceMap::default());
    parse_source(code, &path.to_string_lossy(), source_map)
}

/// Relative module specifiers imported or re-exported by a module.
fn module_specifiers(parsed: &ParsedSource) -> Vec<&str> {
    parsed
        .module
        .body
        .iter()
        .filter_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => import.src.value.as_str(),
            ModuleItem::ModuleDecl(ModuleDecl::ExportAll(export)) => export.src.value.as_str(),
            ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(export)) => {
                export.src.as_ref().and_then(|src| src.value.as_str())
            }
            _ => None,
        })
        .filter(|specifier| is_relative_specifier(specifier))
        .collect()
}

impl Program {
    /// Parse the scanned files and every local module they reach.
    ///
    /// Unreadable or unparsable files are reported as `ParseError`
    /// diagnostics and left out of the program.
    pub fn load(root: &Path, scanned: &[PathBuf], diagnostics: &mut Diagnostics) -> Self {
        let root = normalize_path(root);
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut loaded: Vec<LoadedFile> = Vec::new();

        let mut pending: Vec<(PathBuf, bool)> = scanned
            .iter()
            .map(|path| normalize_path(path))
            .filter(|path| seen.insert(path.clone()))
            .map(|path| {
                let discoverable = !is_generated_file(&path);
                (path, discoverable)
            })
            .collect();

        while !pending.is_empty() {
            let results: Vec<_> = pending
                .par_iter()
                .map(|(path, discoverable)| (path.clone(), *discoverable, parse_file(path)))
                .collect();

            let mut next: Vec<(PathBuf, bool)> = Vec::new();
            for (path, discoverable, result) in results {
                match result {
                    Ok(parsed) => {
                        for specifier in module_specifiers(&parsed) {
                            let target = fallback_candidates(&path, specifier)
                                .into_iter()
                                .find(|candidate| seen.contains(candidate) || candidate.is_file());
                            if let Some(target) = target
                                && seen.insert(target.clone())
                            {
                                tracing::debug!(
                                    "following import '{}' to {}",
                                    specifier,
                                    target.display()
                                );
                                next.push((target, false));
                            }
                        }
                        loaded.push(LoadedFile {
                            path,
                            parsed,
                            discoverable,
                        });
                    }
                    Err(e) => diagnostics.push(
                        Diagnostic::warning(DiagnosticKind::ParseError, e.to_string())
                            .in_file(relative_display(&root, &path)),
                    ),
                }
            }
            pending = next;
        }

        Self::from_loaded(root, loaded)
    }

    /// Build a program from in-memory sources keyed by root-relative path.
    ///
    /// Fails on the first source that does not parse.
    pub fn from_sources(root: &Path, sources: &[(&str, &str)]) -> Result<Self> {
        let root = normalize_path(root);
        let loaded = sources
            .iter()
            .map(|(relative, code)| {
                let path = normalize_path(&root.join(relative));
                let parsed = parse_source(
                    code.to_string(),
                    &path.to_string_lossy(),
                    Arc::new(SourceMap::default()),
                )?;
                Ok(LoadedFile {
                    discoverable: !is_generated_file(&path),
                    path,
                    parsed,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_loaded(root, loaded))
    }

    fn from_loaded(root: PathBuf, mut loaded: Vec<LoadedFile>) -> Self {
        loaded.sort_by(|a, b| a.path.cmp(&b.path));

        let mut files = Vec::with_capacity(loaded.len());
        let mut by_path = HashMap::with_capacity(loaded.len());
        for (id, file) in loaded.into_iter().enumerate() {
            by_path.insert(file.path.clone(), id);
            files.push(SourceFile {
                id,
                relative_path: relative_display(&root, &file.path),
                path: file.path,
                parsed: file.parsed,
                discoverable: file.discoverable,
            });
        }

        Self {
            root,
            files,
            by_path,
        }
    }

    /// All files in lexicographic path order.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&SourceFile> {
        self.by_path.get(path).map(|&id| &self.files[id])
    }

    /// Look a file up by its root-relative path.
    pub fn file_by_relative(&self, relative: &str) -> Option<&SourceFile> {
        self.file(&normalize_path(&self.root.join(relative)))
    }

    pub fn discoverable_files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter().filter(|f| f.discoverable)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_from_sources_orders_files_and_flags_generated() {
        let program = Program::from_sources(
            Path::new("/project"),
            &[
                ("src/b.ts", "export const b = 1;"),
                ("src/types.d.ts", "export interface T { a: string }"),
                ("src/a.ts", "export const a = 1;"),
            ],
        )
        .unwrap();

        let names: Vec<_> = program
            .files()
            .iter()
            .map(|f| f.relative_path.as_str())
            .collect();
        assert_eq!(names, vec!["src/a.ts", "src/b.ts", "src/types.d.ts"]);
        assert_eq!(program.discoverable_files().count(), 2);
        assert!(program.file_by_relative("src/a.ts").is_some());
    }

    #[test]
    fn test_load_follows_relative_imports() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let shared = dir.path().join("shared");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&shared).unwrap();
        fs::write(
            src.join("app.ts"),
            "import { Props } from '../shared/props';\nexport const x: Props = { a: 1 };",
        )
        .unwrap();
        fs::write(shared.join("props.ts"), "export interface Props { a: number }").unwrap();

        let mut diagnostics = Diagnostics::new();
        let program = Program::load(dir.path(), &[src.join("app.ts")], &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(program.files().len(), 2);
        let props = program.file_by_relative("shared/props.ts").unwrap();
        assert!(!props.discoverable);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("ok.ts"), "export const ok = true;").unwrap();
        fs::write(dir.path().join("broken.ts"), "export class {").unwrap();

        let mut diagnostics = Diagnostics::new();
        let program = Program::load(
            dir.path(),
            &[dir.path().join("broken.ts"), dir.path().join("ok.ts")],
            &mut diagnostics,
        );

        assert_eq!(program.files().len(), 1);
        let errors: Vec<_> = diagnostics.of_kind(DiagnosticKind::ParseError).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file.as_deref(), Some("broken.ts"));
    }
}
