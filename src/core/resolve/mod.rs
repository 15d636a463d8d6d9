//! Cross-file declaration resolution.
//!
//! [`ResolutionContext::resolve_declaration`] tries, in order:
//!
//! 1. a declaration in the same file;
//! 2. the import's target through the symbol table, following re-exports,
//!    `export *` and default exports;
//! 3. a path-based fallback that scans each candidate file's top-level
//!    declarations regardless of what it exports.

pub mod paths;

use std::collections::HashSet;

use crate::{
    config::Conventions,
    core::{
        collect::symbols::{Declaration, ExportEntry, FileSymbols, ImportInfo},
        program::{Program, SourceFile},
    },
};
use paths::{fallback_candidates, module_candidates};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Namespace {
    Value,
    Type,
}

/// Read-only view over the program shared by every extractor.
pub struct ResolutionContext<'p> {
    pub program: &'p Program,
    pub conventions: &'p Conventions,
    symbols: Vec<FileSymbols<'p>>,
}

impl<'p> ResolutionContext<'p> {
    pub fn new(program: &'p Program, conventions: &'p Conventions) -> Self {
        let symbols = program.files().iter().map(FileSymbols::collect).collect();
        Self {
            program,
            conventions,
            symbols,
        }
    }

    pub fn symbols(&self, file: &SourceFile) -> &FileSymbols<'p> {
        &self.symbols[file.id]
    }

    /// Resolve a value name (class, function, variable) as seen from `from`.
    pub fn resolve_declaration(&self, name: &str, from: &'p SourceFile) -> Option<Declaration<'p>> {
        self.resolve_in(name, from, Namespace::Value)
    }

    /// Resolve a type name (interface, alias, enum, class) as seen from `from`.
    pub fn resolve_type_declaration(
        &self,
        name: &str,
        from: &'p SourceFile,
    ) -> Option<Declaration<'p>> {
        self.resolve_in(name, from, Namespace::Type)
    }

    /// Resolve `ns.Name` where `ns` is a namespace import.
    pub fn resolve_qualified_type(
        &self,
        namespace: &str,
        name: &str,
        from: &'p SourceFile,
    ) -> Option<Declaration<'p>> {
        let import = self.symbols(from).import(namespace)?;
        if import.imported_name != "*" {
            return None;
        }
        let target = self.module_file(from, &import.module_path)?;
        self.resolve_export(target, name, Namespace::Type, &mut HashSet::new())
    }

    fn resolve_in(&self, name: &str, from: &'p SourceFile, ns: Namespace) -> Option<Declaration<'p>> {
        let symbols = self.symbols(from);
        if let Some(declaration) = local(symbols, name, ns) {
            return Some(declaration.clone());
        }

        let import = symbols.import(name)?;
        if let Some(target) = self.module_file(from, &import.module_path)
            && let Some(declaration) =
                self.resolve_export(target, &import.imported_name, ns, &mut HashSet::new())
        {
            return Some(declaration);
        }

        let fallback = self.resolve_by_path(from, import, ns);
        if fallback.is_none() {
            tracing::debug!(
                "cannot resolve '{}' imported from '{}' in {}",
                name,
                import.module_path,
                from.relative_path
            );
        }
        fallback
    }

    fn module_file(&self, from: &SourceFile, specifier: &str) -> Option<&'p SourceFile> {
        module_candidates(&from.path, specifier)
            .iter()
            .find_map(|candidate| self.program.file(candidate))
    }

    fn resolve_export(
        &self,
        file: &'p SourceFile,
        exported: &str,
        ns: Namespace,
        visited: &mut HashSet<(usize, String)>,
    ) -> Option<Declaration<'p>> {
        if !visited.insert((file.id, exported.to_string())) {
            return None;
        }
        let symbols = self.symbols(file);

        for entry in &symbols.exports {
            match entry {
                ExportEntry::Local {
                    exported: name,
                    local: local_name,
                } if name == exported => {
                    if let Some(declaration) = local(symbols, local_name, ns) {
                        return Some(declaration.clone());
                    }
                    // `import { A } from './a'; export { A };`
                    if let Some(import) = symbols.import(local_name)
                        && let Some(target) = self.module_file(file, &import.module_path)
                        && let Some(declaration) =
                            self.resolve_export(target, &import.imported_name, ns, visited)
                    {
                        return Some(declaration);
                    }
                }
                ExportEntry::ReExport {
                    exported: name,
                    imported,
                    module_path,
                } if name == exported && imported != "*" => {
                    if let Some(target) = self.module_file(file, module_path)
                        && let Some(declaration) =
                            self.resolve_export(target, imported, ns, visited)
                    {
                        return Some(declaration);
                    }
                }
                _ => {}
            }
        }

        if exported == "default" {
            return None;
        }
        symbols.exports.iter().find_map(|entry| match entry {
            ExportEntry::Star { module_path } => self
                .module_file(file, module_path)
                .and_then(|target| self.resolve_export(target, exported, ns, visited)),
            _ => None,
        })
    }

    fn resolve_by_path(
        &self,
        from: &SourceFile,
        import: &ImportInfo,
        ns: Namespace,
    ) -> Option<Declaration<'p>> {
        if import.imported_name == "*" {
            return None;
        }
        fallback_candidates(&from.path, &import.module_path)
            .iter()
            .filter_map(|candidate| self.program.file(candidate))
            .find_map(|file| {
                let symbols = self.symbols(file);
                let name = if import.imported_name == "default" {
                    symbols.local_export("default").unwrap_or("default")
                } else {
                    import.imported_name.as_str()
                };
                local(symbols, name, ns).cloned()
            })
    }
}

fn local<'s, 'p>(symbols: &'s FileSymbols<'p>, name: &str, ns: Namespace) -> Option<&'s Declaration<'p>> {
    match ns {
        Namespace::Value => symbols.values.get(name),
        Namespace::Type => symbols.types.get(name),
    }
}
