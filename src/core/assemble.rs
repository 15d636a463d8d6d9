//! Intermediate model assembly.
//!
//! Walks every registration in file order, resolves its implementation and
//! runs the extractors. A registration that cannot be resolved or extracted
//! becomes a diagnostic and is left out; the rest of the pass continues.

use anyhow::Result;
use indexmap::IndexMap;
use rayon::prelude::*;
use swc_ecma_ast::Expr;

use crate::core::{
    collect::{
        Registration, RegistrationTarget, collect_registrations,
        helpers::{callee_name, unwrap_ts_expr},
        symbols::{Declaration, DeclarationNode},
    },
    diagnostics::{Diagnostic, DiagnosticKind, Diagnostics},
    extract::{ComponentSurface, ExtractContext, extract_component},
    model::{ComponentDefinition, IntermediateModel, RuntimeConfig},
    program::SourceFile,
    resolve::ResolutionContext,
};

const MAX_ALIAS_DEPTH: usize = 8;

/// Collect the registrations of every discoverable file, in file order.
pub fn discover_registrations(ctx: &ResolutionContext<'_>, diagnostics: &mut Diagnostics) -> Vec<Registration> {
    let files: Vec<&SourceFile> = ctx.program.discoverable_files().collect();
    let per_file: Vec<_> = files
        .par_iter()
        .map(|file| collect_registrations(file, ctx.conventions))
        .collect();

    let mut registrations = Vec::new();
    for (found, file_diagnostics) in per_file {
        diagnostics.extend(file_diagnostics);
        registrations.extend(found);
    }
    tracing::info!(
        "found {} registrations in {} files",
        registrations.len(),
        files.len()
    );
    registrations
}

/// Build the model from the program's registrations.
pub fn assemble(
    ctx: &ResolutionContext<'_>,
    runtime: RuntimeConfig,
    diagnostics: &mut Diagnostics,
) -> IntermediateModel {
    let registrations = discover_registrations(ctx, diagnostics);

    let mut components: IndexMap<String, ComponentDefinition> = IndexMap::new();
    for registration in &registrations {
        let file = &ctx.program.files()[registration.file_id];
        let Some(component) = assemble_component(ctx, registration, file, diagnostics) else {
            continue;
        };
        if let Some(previous) = components.shift_remove(&component.tag_name) {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::DuplicateTagName,
                    format!(
                        "'{}' is registered again; '{}' from {} replaces '{}' from {}",
                        component.tag_name,
                        component.implementation_ref,
                        component.module_path,
                        previous.implementation_ref,
                        previous.module_path
                    ),
                )
                .in_file(&file.relative_path)
                .at_line(registration.line),
            );
        }
        components.insert(component.tag_name.clone(), component);
    }

    IntermediateModel {
        runtime,
        components: components.into_values().collect(),
    }
}

fn assemble_component<'p>(
    ctx: &ResolutionContext<'p>,
    registration: &'p Registration,
    file: &'p SourceFile,
    diagnostics: &mut Diagnostics,
) -> Option<ComponentDefinition> {
    let surface = match &registration.target {
        RegistrationTarget::Named(name) => {
            let Some(declaration) = ctx.resolve_declaration(name, file) else {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticKind::UnresolvedSymbol,
                        format!(
                            "cannot resolve '{}' registered as '{}'",
                            name, registration.tag_name
                        ),
                    )
                    .in_file(&file.relative_path)
                    .at_line(registration.line),
                );
                return None;
            };
            let declaration = follow_aliases(ctx, declaration);
            match ComponentSurface::from_declaration(&declaration, ctx) {
                Ok(surface) => surface,
                Err(e) => {
                    report_failure(registration, file, e, diagnostics);
                    return None;
                }
            }
        }
        RegistrationTarget::InlineClass(class) => ComponentSurface::from_inline_class(
            registration.tag_name.clone(),
            file,
            class,
            ctx,
        ),
    };

    let cx = ExtractContext::new(ctx, &surface);
    let (properties, events) = extract_component(&cx);
    Some(ComponentDefinition {
        tag_name: registration.tag_name.clone(),
        implementation_ref: surface.name.clone(),
        module_path: surface.file.relative_path.clone(),
        properties,
        events,
    })
}

fn report_failure(
    registration: &Registration,
    file: &SourceFile,
    error: anyhow::Error,
    diagnostics: &mut Diagnostics,
) {
    diagnostics.push(
        Diagnostic::warning(
            DiagnosticKind::ExtractionFailed,
            format!("skipping '{}': {:#}", registration.tag_name, error),
        )
        .in_file(&file.relative_path)
        .at_line(registration.line),
    );
}

/// Follow `const Wrapped = wrap(Impl)` and `const Alias = Impl` to `Impl`.
fn follow_aliases<'p>(ctx: &ResolutionContext<'p>, mut declaration: Declaration<'p>) -> Declaration<'p> {
    for _ in 0..MAX_ALIAS_DEPTH {
        let Some(target) = alias_target(ctx, &declaration) else {
            break;
        };
        match ctx.resolve_declaration(target, declaration.file) {
            Some(next) => declaration = next,
            None => break,
        }
    }
    declaration
}

fn alias_target<'p>(ctx: &ResolutionContext<'p>, declaration: &Declaration<'p>) -> Option<&'p str> {
    let DeclarationNode::Variable {
        init: Some(init), ..
    } = declaration.node
    else {
        return None;
    };
    match unwrap_ts_expr(init) {
        Expr::Ident(ident) if ident.sym.as_str() != declaration.name => Some(ident.sym.as_str()),
        Expr::Call(call)
            if callee_name(&call.callee).is_some_and(|name| ctx.conventions.is_wrapper_factory(name)) =>
        {
            match unwrap_ts_expr(&call.args.first()?.expr) {
                Expr::Ident(ident) => Some(ident.sym.as_str()),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Assemble a model from in-memory sources; used by tests across the crate.
#[cfg(test)]
pub(crate) fn assemble_sources(sources: &[(&str, &str)]) -> Result<(IntermediateModel, Diagnostics)> {
    use std::path::Path;

    use crate::{config::Conventions, core::program::Program};

    let program = Program::from_sources(Path::new("/project"), sources)?;
    let conventions = Conventions::default();
    let ctx = ResolutionContext::new(&program, &conventions);
    let mut diagnostics = Diagnostics::new();
    let model = assemble(&ctx, RuntimeConfig::unknown(), &mut diagnostics);
    Ok((model, diagnostics))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn tags(model: &IntermediateModel) -> Vec<&str> {
        model.components.iter().map(|c| c.tag_name.as_str()).collect()
    }

    #[test]
    fn test_non_literal_tag_is_skipped() {
        let (model, diagnostics) = assemble_sources(&[(
            "src/elements.ts",
            r#"
const tag = 'x-dynamic';
class Dynamic extends HTMLElement {}
class Fixed extends HTMLElement {}
customElements.define(tag, Dynamic);
customElements.define('x-fixed', Fixed);
"#,
        )])
        .unwrap();

        assert_eq!(tags(&model), vec!["x-fixed"]);
        let malformed: Vec<_> = diagnostics
            .of_kind(DiagnosticKind::MalformedRegistration)
            .collect();
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].file.as_deref(), Some("src/elements.ts"));
        assert_eq!(malformed[0].line, Some(5));
    }

    #[test]
    fn test_wrapper_variable_resolves_to_implementation() {
        let (model, diagnostics) = assemble_sources(&[
            (
                "src/register.ts",
                r#"
import { Counter } from './counter';
const CounterElement = r2wc(Counter);
customElements.define('x-counter', CounterElement);
"#,
            ),
            (
                "src/counter.tsx",
                r#"
interface CounterProps { start: number; label?: string }
export function Counter({ start, label = 'Count' }: CounterProps) {
  return <span>{label}: {start}</span>;
}
"#,
            ),
        ])
        .unwrap();

        assert!(diagnostics.is_empty());
        let component = &model.components[0];
        assert_eq!(component.implementation_ref, "Counter");
        assert_eq!(component.module_path, "src/counter.tsx");
        assert_eq!(
            serde_json::to_value(component.props_schema()).unwrap(),
            json!({
                "type": "object",
                "properties": {"start": {"type": "number"}, "label": {"type": "string"}},
                "required": ["start"]
            })
        );
        assert_eq!(component.properties[1].default, Some(json!("Count")));
    }

    #[test]
    fn test_duplicate_tag_last_wins() {
        let (model, diagnostics) = assemble_sources(&[
            (
                "src/a.ts",
                "class First extends HTMLElement {}\ncustomElements.define('x-dup', First);",
            ),
            (
                "src/b.ts",
                "class Second extends HTMLElement {}\ncustomElements.define('x-dup', Second);",
            ),
        ])
        .unwrap();

        assert_eq!(model.components.len(), 1);
        assert_eq!(model.components[0].implementation_ref, "Second");
        assert_eq!(
            diagnostics.of_kind(DiagnosticKind::DuplicateTagName).count(),
            1
        );
    }

    #[test]
    fn test_unresolved_and_failed_components_are_reported() {
        let (model, diagnostics) = assemble_sources(&[(
            "src/main.ts",
            r#"
import { Missing } from './missing';
const answer = 42;
class Good extends HTMLElement {}
customElements.define('x-missing', Missing);
customElements.define('x-answer', answer);
customElements.define('x-good', Good);
"#,
        )])
        .unwrap();

        assert_eq!(tags(&model), vec!["x-good"]);
        let unresolved: Vec<_> = diagnostics.of_kind(DiagnosticKind::UnresolvedSymbol).collect();
        assert_eq!(unresolved.len(), 1);
        assert!(unresolved[0].message.contains("'x-missing'"));
        let failed: Vec<_> = diagnostics.of_kind(DiagnosticKind::ExtractionFailed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].line, Some(6));
    }

    #[test]
    fn test_inline_class_and_decorator_registrations() {
        let (model, _) = assemble_sources(&[(
            "src/inline.ts",
            r#"
customElements.define('x-inline', class extends HTMLElement {
  /** Greeting text. */
  @property() greeting = 'hi';
});

@customElement('x-decorated')
export class Decorated extends LitElement {
  @property({ type: Number }) count = 0;
}
"#,
        )])
        .unwrap();

        assert_eq!(tags(&model), vec!["x-inline", "x-decorated"]);
        assert_eq!(model.components[0].implementation_ref, "x-inline");
        assert_eq!(model.components[0].properties[0].name, "greeting");
        assert_eq!(
            model.components[0].properties[0].description.as_deref(),
            Some("Greeting text.")
        );
        assert_eq!(model.components[1].properties[0].default, Some(json!(0)));
    }

    #[test]
    fn test_identical_input_gives_identical_output() {
        let sources = [
            (
                "src/panel.ts",
                r#"
export class Panel extends HTMLElement {
  @property() open = false;
  close() { this.dispatchEvent(new CustomEvent('closed', { detail: { reason: 'user' } })); }
}
customElements.define('x-panel', Panel);
"#,
            ),
        ];
        let (first, _) = assemble_sources(&sources).unwrap();
        let (second, _) = assemble_sources(&sources).unwrap();
        assert_eq!(first, second);
    }
}
