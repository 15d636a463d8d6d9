//! Event extraction.
//!
//! Three sources, lowest precedence first:
//!
//! 1. `@fires` tags on the component's own documentation;
//! 2. callback members of the input shape (`onSave` → `save`);
//! 3. dispatch calls in the component body
//!    (`this.dispatchEvent(new CustomEvent('save', { detail }))`).
//!
//! Descriptors are keyed by event name and later sources overwrite earlier
//! ones, so each event reflects the most reliable source that produced it.

use std::collections::HashMap;

use indexmap::IndexMap;
use swc_common::{BytePos, Spanned};
use swc_ecma_ast::{
    ArrowExpr, CallExpr, ClassMember, Expr, FnDecl, Function, NewExpr, ObjectLit, Pat, Prop,
    PropOrSpread, VarDecl, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::{ComponentBody, ExtractContext, detail::infer_value};
use crate::{
    core::{
        annotate::{DocBlock, docs_at, parse_doc_block},
        collect::helpers::{
            bool_literal, callee_name, expr_name, object_entry, prop_name, string_literal,
            unwrap_ts_expr,
        },
        model::{EventDescriptor, EventSource},
        schema::{SchemaModel, resolver::resolve_type},
    },
    utils::lower_first,
};

/// Kind reported for events that are not constructed explicitly.
const DEFAULT_EVENT_KIND: &str = "CustomEvent";

pub fn extract_events(cx: &ExtractContext<'_, '_>) -> Vec<EventDescriptor> {
    let mut events: IndexMap<String, EventDescriptor> = IndexMap::new();
    let mut add = |descriptors: Vec<EventDescriptor>| {
        for descriptor in descriptors {
            events.insert(descriptor.name.clone(), descriptor);
        }
    };
    add(documented_events(cx));
    add(callback_events(cx));
    add(dispatched_events(cx));
    events.into_values().collect()
}

fn documented_events(cx: &ExtractContext<'_, '_>) -> Vec<EventDescriptor> {
    cx.surface
        .docs
        .fires
        .iter()
        .map(|entry| EventDescriptor {
            name: entry.name.clone(),
            kind: DEFAULT_EVENT_KIND.to_string(),
            payload_schema: None,
            source_kind: EventSource::Documentation,
            bubbles: None,
            composed: None,
            description: entry.description.clone(),
            deprecated: false,
        })
        .collect()
}

fn callback_events(cx: &ExtractContext<'_, '_>) -> Vec<EventDescriptor> {
    let conventions = cx.conventions();
    cx.surface
        .shape
        .iter()
        .filter_map(|member| {
            let stripped = conventions.strip_callback_prefix(&member.name)?;
            let callback = member.callback.as_ref()?;
            let docs = docs_at(member.file(), &[member.anchor]);
            Some(EventDescriptor {
                name: docs.event_name.unwrap_or_else(|| lower_first(stripped)),
                kind: DEFAULT_EVENT_KIND.to_string(),
                payload_schema: callback
                    .param
                    .map(|ty| resolve_type(cx.resolution, ty, &callback.scope)),
                source_kind: EventSource::Callback,
                bubbles: None,
                composed: None,
                description: docs.description,
                deprecated: docs.deprecated,
            })
        })
        .collect()
}

fn dispatched_events(cx: &ExtractContext<'_, '_>) -> Vec<EventDescriptor> {
    let mut finder = DispatchFinder::new(cx);
    if let Some(class) = cx.surface.class {
        for member in &class.body {
            let anchors = match member {
                ClassMember::Method(method) => vec![method.span.lo, method.key.span().lo],
                ClassMember::PrivateMethod(method) => vec![method.span.lo, method.key.span.lo],
                ClassMember::ClassProp(prop) => vec![prop.span.lo, prop.key.span().lo],
                ClassMember::PrivateProp(prop) => vec![prop.span.lo, prop.key.span.lo],
                ClassMember::Constructor(constructor) => vec![constructor.span.lo],
                _ => vec![member.span().lo],
            };
            finder.anchors.push(anchors);
            finder.with_scope(std::iter::empty(), |finder| member.visit_with(finder));
            finder.anchors.pop();
        }
    }
    match cx.surface.body {
        Some(ComponentBody::Block(block)) => block.visit_with(&mut finder),
        Some(ComponentBody::Expr(expr)) => expr.visit_with(&mut finder),
        None => {}
    }
    finder.events
}

/// An event construction seen before it was dispatched.
#[derive(Debug, Clone)]
struct ConstructedEvent {
    name: String,
    kind: String,
    payload: Option<SchemaModel>,
    bubbles: Option<bool>,
    composed: Option<bool>,
}

struct DispatchFinder<'c, 'a, 'p> {
    cx: &'c ExtractContext<'a, 'p>,
    /// Doc anchors of the enclosing members, outermost first.
    anchors: Vec<Vec<BytePos>>,
    /// `const event = new CustomEvent(..)` bindings in scope, by variable name.
    constructed: HashMap<String, ConstructedEvent>,
    events: Vec<EventDescriptor>,
}

impl<'c, 'a, 'p> DispatchFinder<'c, 'a, 'p> {
    fn new(cx: &'c ExtractContext<'a, 'p>) -> Self {
        Self {
            cx,
            anchors: Vec::new(),
            constructed: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// Visit a function body with its own bindings. Parameters shadow
    /// constructions of the enclosing scope; the body's own constructions
    /// are dropped on exit.
    fn with_scope<'n>(
        &mut self,
        params: impl IntoIterator<Item = &'n Pat>,
        visit: impl FnOnce(&mut Self),
    ) {
        let saved = self.constructed.clone();
        for param in params {
            if let Pat::Ident(binding) = param {
                self.constructed.remove(binding.id.sym.as_str());
            }
        }
        visit(self);
        self.constructed = saved;
    }

    /// Docs of the innermost enclosing member that has any.
    fn enclosing_docs(&self) -> DocBlock {
        let file = self.cx.surface.file;
        self.anchors
            .iter()
            .rev()
            .find_map(|anchors| {
                anchors
                    .iter()
                    .find_map(|&pos| file.parsed.comments.doc_block_at(pos))
            })
            .map(parse_doc_block)
            .unwrap_or_default()
    }

    /// `new CustomEvent('name', { detail, bubbles, composed })`.
    fn construction(&self, new_expr: &NewExpr) -> Option<ConstructedEvent> {
        let kind = expr_name(&new_expr.callee)?;
        if !kind.ends_with("Event") {
            return None;
        }
        let args = new_expr.args.as_deref().unwrap_or(&[]);
        let Some(name) = args.first().and_then(|arg| string_literal(&arg.expr)) else {
            tracing::debug!("skipping {} constructed with a non-literal name", kind);
            return None;
        };
        let options = args.get(1).and_then(|arg| match unwrap_ts_expr(&arg.expr) {
            Expr::Object(object) => Some(object),
            _ => None,
        });
        let type_arg = new_expr
            .type_args
            .as_ref()
            .and_then(|args| args.params.first())
            .map(|ty| self.cx.resolve_type(ty));

        Some(ConstructedEvent {
            name,
            kind: kind.to_string(),
            payload: self.payload(options, type_arg),
            bubbles: flag(options, "bubbles"),
            composed: flag(options, "composed"),
        })
    }

    fn payload(&self, options: Option<&ObjectLit>, type_arg: Option<SchemaModel>) -> Option<SchemaModel> {
        let has_detail = options.is_some_and(|o| has_entry(o, "detail"));
        options
            .and_then(|o| object_entry(o, "detail"))
            .and_then(|expr| infer_value(expr, self.cx))
            .or(type_arg)
            .or_else(|| has_detail.then_some(SchemaModel::Unconstrained))
    }

    fn dispatched(&self, call: &CallExpr) -> Option<ConstructedEvent> {
        let method = callee_name(&call.callee)?;
        if !self.cx.conventions().is_dispatch_method(method) || call.args.len() != 1 {
            return None;
        }
        match unwrap_ts_expr(&call.args[0].expr) {
            Expr::New(new_expr) => self.construction(new_expr),
            Expr::Ident(ident) => self.constructed.get(ident.sym.as_str()).cloned(),
            _ => None,
        }
    }
}

/// Whether an object literal names `key`, as a value entry or shorthand.
fn has_entry(object: &ObjectLit, key: &str) -> bool {
    object.props.iter().any(|prop| match prop {
        PropOrSpread::Prop(prop) => match &**prop {
            Prop::Shorthand(ident) => ident.sym.as_str() == key,
            Prop::KeyValue(kv) => prop_name(&kv.key).as_deref() == Some(key),
            _ => false,
        },
        PropOrSpread::Spread(_) => false,
    })
}

fn flag(options: Option<&ObjectLit>, key: &str) -> Option<bool> {
    options
        .and_then(|o| object_entry(o, key))
        .and_then(bool_literal)
}

impl Visit for DispatchFinder<'_, '_, '_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Some(event) = self.dispatched(node) {
            let docs = self.enclosing_docs();
            self.events.push(EventDescriptor {
                name: event.name,
                kind: event.kind,
                payload_schema: event.payload,
                source_kind: EventSource::Dispatch,
                bubbles: event.bubbles,
                composed: event.composed,
                description: docs.description,
                deprecated: docs.deprecated,
            });
        }
        node.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let Pat::Ident(binding) = &node.name
            && let Some(init) = &node.init
            && let Expr::New(new_expr) = unwrap_ts_expr(init)
            && let Some(event) = self.construction(new_expr)
        {
            self.constructed.insert(binding.id.sym.to_string(), event);
        }
        node.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        self.anchors.push(vec![node.span.lo]);
        node.visit_children_with(self);
        self.anchors.pop();
    }

    fn visit_function(&mut self, node: &Function) {
        self.with_scope(node.params.iter().map(|p| &p.pat), |finder| {
            node.visit_children_with(finder)
        });
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.with_scope(&node.params, |finder| node.visit_children_with(finder));
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.anchors.push(vec![node.span().lo, node.function.span.lo]);
        node.visit_children_with(self);
        self.anchors.pop();
    }
}
