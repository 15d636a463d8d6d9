//! Registration discovery.
//!
//! Finds the call sites and decorators that bind a literal tag name to an
//! implementation:
//!
//! ```typescript
//! customElements.define('x-card', Card);
//! customElements.define('x-react-card', r2wc(ReactCard));
//! const Wrapped = createCustomElement(Impl); define('x-impl', Wrapped);
//! @customElement('x-greeting') class Greeting extends LitElement {}
//! ```

use std::collections::{HashMap, HashSet};

use swc_common::Span;
use swc_ecma_ast::{
    AssignExpr, AssignTarget, CallExpr, Callee, Class, ClassDecl, DefaultDecl, Expr,
    ExportDefaultDecl, MemberProp, Pat, SimpleAssignTarget, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::helpers::{callee_name, decorator_name, object_string_entry, string_literal, unwrap_ts_expr};
use crate::{
    config::Conventions,
    core::{
        diagnostics::{Diagnostic, DiagnosticKind},
        program::SourceFile,
    },
};

#[derive(Debug, Clone)]
pub enum RegistrationTarget {
    /// Name of the implementation as visible in the registering file.
    Named(String),
    /// Class expression passed directly to the registration call.
    InlineClass(Box<Class>),
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub tag_name: String,
    pub target: RegistrationTarget,
    /// Id of the registering file.
    pub file_id: usize,
    pub line: usize,
}

/// Collect every registration in one file.
pub fn collect_registrations(
    file: &SourceFile,
    conventions: &Conventions,
) -> (Vec<Registration>, Vec<Diagnostic>) {
    let mut collector = RegistrationCollector::new(file, conventions);
    file.parsed.module.visit_with(&mut collector);
    collector.finish()
}

pub struct RegistrationCollector<'a> {
    file: &'a SourceFile,
    conventions: &'a Conventions,
    registrations: Vec<Registration>,
    diagnostics: Vec<Diagnostic>,
    /// Variables assigned from a wrapper factory call, by name.
    wrapper_bindings: HashMap<String, RegistrationTarget>,
}

impl<'a> RegistrationCollector<'a> {
    pub fn new(file: &'a SourceFile, conventions: &'a Conventions) -> Self {
        Self {
            file,
            conventions,
            registrations: Vec::new(),
            diagnostics: Vec::new(),
            wrapper_bindings: HashMap::new(),
        }
    }

    /// Substitute wrapper-bound variables and hand back the results.
    pub fn finish(mut self) -> (Vec<Registration>, Vec<Diagnostic>) {
        for registration in &mut self.registrations {
            let mut seen = HashSet::new();
            loop {
                let RegistrationTarget::Named(name) = &registration.target else {
                    break;
                };
                if !seen.insert(name.clone()) {
                    break;
                }
                let Some(bound) = self.wrapper_bindings.get(name) else {
                    break;
                };
                tracing::debug!(
                    "registration '{}' uses wrapper binding '{}'",
                    registration.tag_name,
                    name
                );
                registration.target = bound.clone();
            }
        }
        (self.registrations, self.diagnostics)
    }

    fn malformed(&mut self, span: Span, message: String) {
        self.diagnostics.push(
            Diagnostic::warning(DiagnosticKind::MalformedRegistration, message)
                .in_file(self.file.relative_path.clone())
                .at_line(self.file.line_of(span.lo)),
        );
    }

    fn push(&mut self, tag_name: String, target: RegistrationTarget, span: Span) {
        self.registrations.push(Registration {
            tag_name,
            target,
            file_id: self.file.id,
            line: self.file.line_of(span.lo),
        });
    }

    /// `customElements.define`, `window.customElements.define`, or a bare
    /// registration function.
    fn is_registration_call(&self, call: &CallExpr) -> bool {
        let Callee::Expr(callee) = &call.callee else {
            return false;
        };
        match unwrap_ts_expr(callee) {
            Expr::Member(member) => {
                let is_define = matches!(&member.prop, MemberProp::Ident(p) if p.sym.as_str() == "define");
                is_define
                    && match unwrap_ts_expr(&member.obj) {
                        Expr::Ident(obj) => obj.sym.as_str() == "customElements",
                        Expr::Member(inner) => {
                            matches!(&inner.prop, MemberProp::Ident(p) if p.sym.as_str() == "customElements")
                        }
                        _ => false,
                    }
            }
            Expr::Ident(ident) => {
                self.conventions.is_registration_function(ident.sym.as_str())
                    && call.args.len() == 2
            }
            _ => false,
        }
    }

    fn check_registration_call(&mut self, call: &CallExpr) {
        let tag_arg = call.args.first().filter(|arg| arg.spread.is_none());
        let Some(tag_name) = tag_arg.and_then(|arg| string_literal(&arg.expr)) else {
            self.malformed(
                call.span,
                "registration tag name is not a string literal".to_string(),
            );
            return;
        };
        let Some(impl_arg) = call.args.get(1).filter(|arg| arg.spread.is_none()) else {
            self.malformed(
                call.span,
                format!("registration of '{}' has no implementation argument", tag_name),
            );
            return;
        };
        match self.target_of(&impl_arg.expr) {
            Some(target) => self.push(tag_name, target, call.span),
            None => self.malformed(
                call.span,
                format!(
                    "implementation of '{}' is neither a name nor a class expression",
                    tag_name
                ),
            ),
        }
    }

    fn target_of(&self, expr: &Expr) -> Option<RegistrationTarget> {
        match unwrap_ts_expr(expr) {
            Expr::Ident(ident) => Some(RegistrationTarget::Named(ident.sym.to_string())),
            Expr::Class(class_expr) => Some(RegistrationTarget::InlineClass(class_expr.class.clone())),
            Expr::Call(call) => self.wrapped_target(call),
            _ => None,
        }
    }

    /// Implementation passed to a wrapper factory call.
    fn wrapped_target(&self, call: &CallExpr) -> Option<RegistrationTarget> {
        let name = callee_name(&call.callee)?;
        if !self.conventions.is_wrapper_factory(name) {
            return None;
        }
        let first = call.args.first()?;
        self.target_of(&first.expr)
    }

    fn bind_wrapper(&mut self, name: &str, value: &Expr) {
        if let Expr::Call(call) = unwrap_ts_expr(value)
            && let Some(target) = self.wrapped_target(call)
        {
            self.wrapper_bindings.insert(name.to_string(), target);
        }
    }

    /// `@customElement('x-tag')` / `@Component({ tag: 'x-tag' })` on a class.
    fn check_class_decorators(&mut self, name: &str, class: &Class) {
        for decorator in &class.decorators {
            let Some(decorator_fn) = decorator_name(decorator) else {
                continue;
            };
            if !self.conventions.is_element_decorator(decorator_fn) {
                continue;
            }
            let Expr::Call(call) = &*decorator.expr else {
                continue;
            };
            let Some(arg) = call.args.first() else {
                continue;
            };
            let tag_name = match unwrap_ts_expr(&arg.expr) {
                Expr::Object(options) => match object_string_entry(options, "tag") {
                    Some(tag) => tag,
                    // Selector-only components are not element registrations.
                    None => continue,
                },
                other => match string_literal(other) {
                    Some(tag) => tag,
                    None => {
                        self.malformed(
                            decorator.span,
                            format!("@{} tag name is not a string literal", decorator_fn),
                        );
                        continue;
                    }
                },
            };
            self.push(
                tag_name,
                RegistrationTarget::Named(name.to_string()),
                decorator.span,
            );
        }
    }
}

impl Visit for RegistrationCollector<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if self.is_registration_call(node) {
            self.check_registration_call(node);
        }
        node.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let Pat::Ident(binding) = &node.name
            && let Some(init) = &node.init
        {
            self.bind_wrapper(binding.id.sym.as_str(), init);
        }
        node.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        if let AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) = &node.left {
            self.bind_wrapper(binding.id.sym.as_str(), &node.right);
        }
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.check_class_decorators(node.ident.sym.as_str(), &node.class);
        node.visit_children_with(self);
    }

    fn visit_export_default_decl(&mut self, node: &ExportDefaultDecl) {
        if let DefaultDecl::Class(class_expr) = &node.decl {
            let name = class_expr
                .ident
                .as_ref()
                .map(|ident| ident.sym.as_str())
                .unwrap_or("default");
            self.check_class_decorators(name, &class_expr.class);
        }
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::program::Program;

    fn collect(code: &str) -> (Vec<(String, String)>, Vec<Diagnostic>) {
        let program = Program::from_sources(Path::new("/project"), &[("src/main.ts", code)]).unwrap();
        let file = program.file_by_relative("src/main.ts").unwrap();
        let (registrations, diagnostics) = collect_registrations(file, &Conventions::default());
        let pairs = registrations
            .into_iter()
            .map(|r| {
                let target = match r.target {
                    RegistrationTarget::Named(name) => name,
                    RegistrationTarget::InlineClass(_) => "<class>".to_string(),
                };
                (r.tag_name, target)
            })
            .collect();
        (pairs, diagnostics)
    }

    fn pair(tag: &str, target: &str) -> (String, String) {
        (tag.to_string(), target.to_string())
    }

    #[test]
    fn test_define_calls() {
        let (registrations, diagnostics) = collect(
            r#"
customElements.define('x-card', Card);
window.customElements.define('x-list', List, { extends: 'ul' });
define('x-item', Item);
"#,
        );
        assert_eq!(
            registrations,
            vec![pair("x-card", "Card"), pair("x-list", "List"), pair("x-item", "Item")]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_wrapper_variable_resolves_to_implementation() {
        let (registrations, _) = collect(
            r#"
const Wrapped = r2wc(Impl, { props: { name: 'string' } });
customElements.define('x-impl', Wrapped);
"#,
        );
        assert_eq!(registrations, vec![pair("x-impl", "Impl")]);
    }

    #[test]
    fn test_reassigned_wrapper_and_inline_wrapper() {
        let (registrations, _) = collect(
            r#"
let Element;
Element = createCustomElement(Counter);
customElements.define('x-counter', Element);
customElements.define('x-badge', reactToWebComponent(Badge));
"#,
        );
        assert_eq!(
            registrations,
            vec![pair("x-counter", "Counter"), pair("x-badge", "Badge")]
        );
    }

    #[test]
    fn test_inline_class_expression() {
        let (registrations, _) = collect(
            "customElements.define('x-inline', class extends HTMLElement { label = ''; });",
        );
        assert_eq!(registrations, vec![pair("x-inline", "<class>")]);
    }

    #[test]
    fn test_non_literal_tag_is_reported_and_skipped() {
        let (registrations, diagnostics) = collect(
            r#"
const tag = 'x-dynamic';
customElements.define(tag, Dynamic);
customElements.define('x-static', Static);
"#,
        );
        assert_eq!(registrations, vec![pair("x-static", "Static")]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedRegistration);
        assert_eq!(diagnostics[0].line, Some(3));
        assert_eq!(diagnostics[0].file.as_deref(), Some("src/main.ts"));
    }

    #[test]
    fn test_decorator_registrations() {
        let (registrations, _) = collect(
            r#"
@customElement('x-greeting')
export class Greeting extends LitElement {}

@Component({ tag: 'x-stencil', shadow: true })
export class Stencil {}

@Component({ selector: 'app-root' })
export class AppRoot {}
"#,
        );
        assert_eq!(
            registrations,
            vec![pair("x-greeting", "Greeting"), pair("x-stencil", "Stencil")]
        );
    }

    #[test]
    fn test_unrelated_calls_are_ignored() {
        let (registrations, diagnostics) = collect(
            r#"
define(['dep'], function () {}, extra);
registry.define('x-other', Other);
"#,
        );
        assert!(registrations.is_empty());
        assert!(diagnostics.is_empty());
    }
}
