//! Per-file symbol table.
//!
//! Built once per parsed file from its top-level items. Declarations borrow
//! straight from the program's ASTs, so the table lives exactly as long as the
//! [`Program`](crate::core::program::Program) it indexes.

use std::collections::HashMap;

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{
    Class, Decl, DefaultDecl, ExportSpecifier, Expr, Function, ImportSpecifier, ModuleDecl,
    ModuleItem, Pat, Stmt, TsEnumDecl, TsInterfaceDecl, TsType, TsTypeAliasDecl,
};

use super::helpers::export_name;
use crate::core::program::SourceFile;

/// Import statement information for cross-file resolution.
///
/// ```typescript
/// import { Props as ButtonProps } from "./types";
/// // local_name: "ButtonProps", imported_name: "Props", module_path: "./types"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    pub local_name: String,
    /// Original name in the imported module; `"default"` for default imports,
    /// `"*"` for namespace imports.
    pub imported_name: String,
    pub module_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEntry {
    /// `export class A`, `export { a as b }`, `export default a`.
    Local { exported: String, local: String },
    /// `export { a as b } from './x'`, `export * as ns from './x'` (imported `"*"`).
    ReExport {
        exported: String,
        imported: String,
        module_path: String,
    },
    /// `export * from './x'`.
    Star { module_path: String },
}

#[derive(Debug, Clone, Copy)]
pub enum DeclarationNode<'p> {
    Class(&'p Class),
    Function(&'p Function),
    Variable {
        init: Option<&'p Expr>,
        annotation: Option<&'p TsType>,
    },
    Interface(&'p TsInterfaceDecl),
    TypeAlias(&'p TsTypeAliasDecl),
    Enum(&'p TsEnumDecl),
}

/// A top-level declaration of one source file.
#[derive(Debug, Clone)]
pub struct Declaration<'p> {
    pub name: String,
    pub file: &'p SourceFile,
    pub node: DeclarationNode<'p>,
    /// Positions a documentation block may be attached to, outermost first.
    pub anchors: Vec<BytePos>,
    pub span: Span,
}

/// Identity of a declaration across the program.
pub type DeclarationKey = (usize, BytePos, BytePos);

impl<'p> Declaration<'p> {
    pub fn key(&self) -> DeclarationKey {
        (self.file.id, self.span.lo, self.span.hi)
    }

    pub fn kind_name(&self) -> &'static str {
        match self.node {
            DeclarationNode::Class(_) => "class",
            DeclarationNode::Function(_) => "function",
            DeclarationNode::Variable { .. } => "variable",
            DeclarationNode::Interface(_) => "interface",
            DeclarationNode::TypeAlias(_) => "type alias",
            DeclarationNode::Enum(_) => "enum",
        }
    }
}

#[derive(Debug, Default)]
pub struct FileSymbols<'p> {
    pub values: HashMap<String, Declaration<'p>>,
    pub types: HashMap<String, Declaration<'p>>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportEntry>,
}

impl<'p> FileSymbols<'p> {
    pub fn collect(file: &'p SourceFile) -> Self {
        let mut symbols = Self::default();
        for item in &file.parsed.module.body {
            match item {
                ModuleItem::Stmt(Stmt::Decl(decl)) => {
                    symbols.add_decl(file, decl, Vec::new(), false);
                }
                ModuleItem::Stmt(_) => {}
                ModuleItem::ModuleDecl(module_decl) => symbols.add_module_decl(file, module_decl),
            }
        }
        symbols
    }

    pub fn import(&self, local_name: &str) -> Option<&ImportInfo> {
        self.imports.iter().find(|i| i.local_name == local_name)
    }

    /// Local name bound to `exported` by a plain export of this file.
    pub fn local_export(&self, exported: &str) -> Option<&str> {
        self.exports.iter().find_map(|entry| match entry {
            ExportEntry::Local {
                exported: e,
                local,
            } if e == exported => Some(local.as_str()),
            _ => None,
        })
    }

    fn add_module_decl(&mut self, file: &'p SourceFile, module_decl: &'p ModuleDecl) {
        match module_decl {
            ModuleDecl::Import(import) => {
                let Some(module_path) = import.src.value.as_str() else {
                    return;
                };
                for specifier in &import.specifiers {
                    let (local, imported) = match specifier {
                        ImportSpecifier::Named(named) => {
                            let local = named.local.sym.to_string();
                            let imported = named
                                .imported
                                .as_ref()
                                .map(export_name)
                                .unwrap_or_else(|| local.clone());
                            (local, imported)
                        }
                        ImportSpecifier::Default(default) => {
                            (default.local.sym.to_string(), "default".to_string())
                        }
                        ImportSpecifier::Namespace(ns) => {
                            (ns.local.sym.to_string(), "*".to_string())
                        }
                    };
                    self.imports.push(ImportInfo {
                        local_name: local,
                        imported_name: imported,
                        module_path: module_path.to_string(),
                    });
                }
            }
            ModuleDecl::ExportDecl(export) => {
                self.add_decl(file, &export.decl, vec![export.span.lo], true);
            }
            ModuleDecl::ExportDefaultDecl(export) => {
                let anchors = vec![export.span.lo];
                let (name, node, mut anchors) = match &export.decl {
                    DefaultDecl::Class(class_expr) => (
                        class_expr.ident.as_ref().map(|i| i.sym.to_string()),
                        DeclarationNode::Class(&class_expr.class),
                        class_anchors(anchors, &class_expr.class),
                    ),
                    DefaultDecl::Fn(fn_expr) => (
                        fn_expr.ident.as_ref().map(|i| i.sym.to_string()),
                        DeclarationNode::Function(&fn_expr.function),
                        anchors,
                    ),
                    DefaultDecl::TsInterfaceDecl(interface) => (
                        Some(interface.id.sym.to_string()),
                        DeclarationNode::Interface(interface),
                        anchors,
                    ),
                };
                anchors.dedup();
                let name = name.unwrap_or_else(|| "default".to_string());
                self.exports.push(ExportEntry::Local {
                    exported: "default".to_string(),
                    local: name.clone(),
                });
                self.insert(Declaration {
                    name,
                    file,
                    node,
                    anchors,
                    span: export.span,
                });
            }
            ModuleDecl::ExportDefaultExpr(export) => match &*export.expr {
                Expr::Ident(ident) => self.exports.push(ExportEntry::Local {
                    exported: "default".to_string(),
                    local: ident.sym.to_string(),
                }),
                expr => {
                    self.exports.push(ExportEntry::Local {
                        exported: "default".to_string(),
                        local: "default".to_string(),
                    });
                    self.insert(Declaration {
                        name: "default".to_string(),
                        file,
                        node: DeclarationNode::Variable {
                            init: Some(expr),
                            annotation: None,
                        },
                        anchors: vec![export.span.lo],
                        span: export.span,
                    });
                }
            },
            ModuleDecl::ExportNamed(named) => {
                let module_path = named
                    .src
                    .as_ref()
                    .and_then(|src| src.value.as_str())
                    .map(|s| s.to_string());
                for specifier in &named.specifiers {
                    let (exported, imported) = match specifier {
                        ExportSpecifier::Named(spec) => {
                            let orig = export_name(&spec.orig);
                            let exported = spec
                                .exported
                                .as_ref()
                                .map(export_name)
                                .unwrap_or_else(|| orig.clone());
                            (exported, orig)
                        }
                        ExportSpecifier::Namespace(spec) => (export_name(&spec.name), "*".into()),
                        ExportSpecifier::Default(spec) => {
                            (spec.exported.sym.to_string(), "default".into())
                        }
                    };
                    self.exports.push(match &module_path {
                        Some(module_path) => ExportEntry::ReExport {
                            exported,
                            imported,
                            module_path: module_path.clone(),
                        },
                        None => ExportEntry::Local {
                            exported,
                            local: imported,
                        },
                    });
                }
            }
            ModuleDecl::ExportAll(all) => {
                if let Some(module_path) = all.src.value.as_str() {
                    self.exports.push(ExportEntry::Star {
                        module_path: module_path.to_string(),
                    });
                }
            }
            _ => {}
        }
    }

    fn add_decl(
        &mut self,
        file: &'p SourceFile,
        decl: &'p Decl,
        mut anchors: Vec<BytePos>,
        exported: bool,
    ) {
        let mut declared = Vec::new();
        match decl {
            Decl::Class(class_decl) => {
                anchors.push(class_decl.span().lo);
                declared.push(Declaration {
                    name: class_decl.ident.sym.to_string(),
                    file,
                    node: DeclarationNode::Class(&class_decl.class),
                    anchors: class_anchors(anchors, &class_decl.class),
                    span: class_decl.class.span,
                });
            }
            Decl::Fn(fn_decl) => {
                anchors.push(fn_decl.function.span.lo);
                declared.push(Declaration {
                    name: fn_decl.ident.sym.to_string(),
                    file,
                    node: DeclarationNode::Function(&fn_decl.function),
                    anchors,
                    span: fn_decl.function.span,
                });
            }
            Decl::Var(var) => {
                anchors.push(var.span.lo);
                for declarator in &var.decls {
                    let Pat::Ident(binding) = &declarator.name else {
                        continue;
                    };
                    let mut anchors = anchors.clone();
                    anchors.push(declarator.span.lo);
                    declared.push(Declaration {
                        name: binding.id.sym.to_string(),
                        file,
                        node: DeclarationNode::Variable {
                            init: declarator.init.as_deref(),
                            annotation: binding.type_ann.as_ref().map(|ann| &*ann.type_ann),
                        },
                        anchors,
                        span: declarator.span,
                    });
                }
            }
            Decl::TsInterface(interface) => {
                anchors.push(interface.span.lo);
                declared.push(Declaration {
                    name: interface.id.sym.to_string(),
                    file,
                    node: DeclarationNode::Interface(interface),
                    anchors,
                    span: interface.span,
                });
            }
            Decl::TsTypeAlias(alias) => {
                anchors.push(alias.span.lo);
                declared.push(Declaration {
                    name: alias.id.sym.to_string(),
                    file,
                    node: DeclarationNode::TypeAlias(alias),
                    anchors,
                    span: alias.span,
                });
            }
            Decl::TsEnum(ts_enum) => {
                anchors.push(ts_enum.span.lo);
                declared.push(Declaration {
                    name: ts_enum.id.sym.to_string(),
                    file,
                    node: DeclarationNode::Enum(ts_enum),
                    anchors,
                    span: ts_enum.span,
                });
            }
            _ => {}
        }

        for mut declaration in declared {
            declaration.anchors.dedup();
            if exported {
                self.exports.push(ExportEntry::Local {
                    exported: declaration.name.clone(),
                    local: declaration.name.clone(),
                });
            }
            self.insert(declaration);
        }
    }

    fn insert(&mut self, declaration: Declaration<'p>) {
        let name = declaration.name.clone();
        match declaration.node {
            DeclarationNode::Class(_) | DeclarationNode::Enum(_) => {
                self.types.insert(name.clone(), declaration.clone());
                self.values.insert(name, declaration);
            }
            DeclarationNode::Interface(_) | DeclarationNode::TypeAlias(_) => {
                self.types.insert(name, declaration);
            }
            DeclarationNode::Function(_) | DeclarationNode::Variable { .. } => {
                self.values.insert(name, declaration);
            }
        }
    }
}

/// Decorators come before `export`, so their positions are anchors too.
fn class_anchors(mut anchors: Vec<BytePos>, class: &Class) -> Vec<BytePos> {
    let decorator_anchors: Vec<BytePos> = class.decorators.iter().map(|d| d.span.lo).collect();
    let mut all = decorator_anchors;
    all.append(&mut anchors);
    all.push(class.span.lo);
    all
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::program::Program;

    fn program(code: &str) -> Program {
        Program::from_sources(Path::new("/project"), &[("src/a.ts", code)]).unwrap()
    }

    #[test]
    fn test_collects_declarations_by_namespace() {
        let program = program(
            r#"
export class Button {}
function helper() {}
export const Card = () => null;
interface Props { a: string }
type Size = 'sm' | 'lg';
enum Color { Red }
"#,
        );
        let symbols = FileSymbols::collect(&program.files()[0]);

        let mut values: Vec<_> = symbols.values.keys().cloned().collect();
        values.sort();
        assert_eq!(values, vec!["Button", "Card", "Color", "helper"]);

        let mut types: Vec<_> = symbols.types.keys().cloned().collect();
        types.sort();
        assert_eq!(types, vec!["Button", "Color", "Props", "Size"]);

        assert_eq!(symbols.local_export("Button"), Some("Button"));
        assert_eq!(symbols.local_export("helper"), None);
    }

    #[test]
    fn test_collects_imports() {
        let program = program(
            r#"
import Default, { Named, Other as Alias } from './mod';
import * as ns from '../ns';
"#,
        );
        let symbols = FileSymbols::collect(&program.files()[0]);

        assert_eq!(
            symbols.imports,
            vec![
                ImportInfo {
                    local_name: "Default".into(),
                    imported_name: "default".into(),
                    module_path: "./mod".into(),
                },
                ImportInfo {
                    local_name: "Named".into(),
                    imported_name: "Named".into(),
                    module_path: "./mod".into(),
                },
                ImportInfo {
                    local_name: "Alias".into(),
                    imported_name: "Other".into(),
                    module_path: "./mod".into(),
                },
                ImportInfo {
                    local_name: "ns".into(),
                    imported_name: "*".into(),
                    module_path: "../ns".into(),
                },
            ]
        );
    }

    #[test]
    fn test_collects_export_forms() {
        let program = program(
            r#"
const inner = 1;
export { inner as outer };
export { Button } from './button';
export * from './all';
export default class extends HTMLElement {}
"#,
        );
        let symbols = FileSymbols::collect(&program.files()[0]);

        assert_eq!(
            symbols.exports,
            vec![
                ExportEntry::Local {
                    exported: "outer".into(),
                    local: "inner".into(),
                },
                ExportEntry::ReExport {
                    exported: "Button".into(),
                    imported: "Button".into(),
                    module_path: "./button".into(),
                },
                ExportEntry::Star {
                    module_path: "./all".into(),
                },
                ExportEntry::Local {
                    exported: "default".into(),
                    local: "default".into(),
                },
            ]
        );
        assert!(matches!(
            symbols.values["default"].node,
            DeclarationNode::Class(_)
        ));
    }

    #[test]
    fn test_export_default_identifier() {
        let program = program("function Card() {}\nexport default Card;");
        let symbols = FileSymbols::collect(&program.files()[0]);

        assert_eq!(symbols.local_export("default"), Some("Card"));
    }

    #[test]
    fn test_declaration_anchor_finds_doc_block() {
        let program = program("/** A card. */\nexport class Card {}");
        let file = &program.files()[0];
        let symbols = FileSymbols::collect(file);
        let card = &symbols.values["Card"];

        let doc = card
            .anchors
            .iter()
            .find_map(|pos| file.parsed.comments.doc_block_at(*pos));
        assert_eq!(doc, Some("* A card. "));
    }
}
