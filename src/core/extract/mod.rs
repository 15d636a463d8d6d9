//! Per-component extraction.
//!
//! A resolved implementation declaration is first reduced to a
//! [`ComponentSurface`]: the class or function body to scan, the members of
//! its input shape, destructuring defaults, and its own documentation. The
//! property and event extractors then read only the surface.

pub mod detail;
pub mod events;
pub mod properties;

use std::collections::HashMap;

use anyhow::{Result, bail};
use serde_json::Value;
use swc_ecma_ast::{
    BlockStmt, BlockStmtOrExpr, Class, Expr, ObjectPat, ObjectPatProp, Pat, TsEntityName, TsType,
};

use crate::{
    config::Conventions,
    core::{
        annotate::{DocBlock, docs_at, literal_default},
        collect::{
            helpers::{callee_name, expr_name, prop_name, unwrap_ts_expr},
            symbols::{Declaration, DeclarationNode},
        },
        model::{EventDescriptor, PropertyDescriptor},
        program::SourceFile,
        resolve::ResolutionContext,
        schema::{
            SchemaModel,
            resolver::{
                ShapeMember, TypeResolver, TypeScope, heritage_name, resolve_type, shape_members,
            },
        },
    },
};

/// Calls that wrap a function component without changing its props.
const COMPONENT_WRAPPERS: &[&str] = &["memo", "forwardRef", "observer"];

/// Type annotations whose first argument is a function component's props.
const FUNCTION_COMPONENT_TYPES: &[&str] = &["FC", "FunctionComponent", "VFC", "SFC"];

/// Base classes whose first type argument is the props shape.
const PROPS_BASE_CLASSES: &[&str] = &["Component", "PureComponent"];

const MAX_WRAPPER_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy)]
pub enum ComponentBody<'p> {
    Block(&'p BlockStmt),
    Expr(&'p Expr),
}

/// Everything the extractors need from one implementation.
pub struct ComponentSurface<'p> {
    pub name: String,
    pub file: &'p SourceFile,
    pub class: Option<&'p Class>,
    pub body: Option<ComponentBody<'p>>,
    /// Members of the component's input shape, inherited members first.
    pub shape: Vec<ShapeMember<'p>>,
    /// Destructuring defaults of a function component's props parameter.
    pub param_defaults: HashMap<String, Value>,
    pub docs: DocBlock,
}

impl<'p> ComponentSurface<'p> {
    /// Build the surface of a resolved declaration.
    ///
    /// Fails when the declaration cannot implement a component (an
    /// interface, a type alias, an uninitialized variable, ...).
    pub fn from_declaration(
        declaration: &Declaration<'p>,
        ctx: &ResolutionContext<'p>,
    ) -> Result<Self> {
        let docs = docs_at(declaration.file, &declaration.anchors);
        let mut surface = Self::empty(declaration.name.clone(), declaration.file, docs);

        match declaration.node {
            DeclarationNode::Class(class) => surface.read_class(class, ctx),
            DeclarationNode::Function(function) => {
                let param = function.params.first().map(|p| &p.pat);
                let body = function.body.as_ref().map(ComponentBody::Block);
                surface.read_function(param, body, ctx);
            }
            DeclarationNode::Variable { init, annotation } => {
                let Some(init) = init else {
                    bail!("'{}' is declared without an initializer", declaration.name);
                };
                if !surface.read_value(init, ctx, 0) {
                    bail!(
                        "'{}' is not initialized with a class or a function",
                        declaration.name
                    );
                }
                if let Some(props) = annotation.and_then(function_component_props) {
                    let scope = TypeScope::new(declaration.file);
                    surface.add_shape(shape_members(ctx, props, &scope));
                }
            }
            DeclarationNode::Interface(_)
            | DeclarationNode::TypeAlias(_)
            | DeclarationNode::Enum(_) => {
                bail!(
                    "'{}' ({}) cannot implement a component",
                    declaration.name,
                    declaration.kind_name()
                );
            }
        }

        Ok(surface)
    }

    /// Surface of a class expression passed inline to a registration call.
    pub fn from_inline_class(
        name: String,
        file: &'p SourceFile,
        class: &'p Class,
        ctx: &ResolutionContext<'p>,
    ) -> Self {
        let mut surface = Self::empty(name, file, DocBlock::default());
        surface.read_class(class, ctx);
        surface
    }

    fn empty(name: String, file: &'p SourceFile, docs: DocBlock) -> Self {
        Self {
            name,
            file,
            class: None,
            body: None,
            shape: Vec::new(),
            param_defaults: HashMap::new(),
            docs,
        }
    }

    fn add_shape(&mut self, members: Vec<ShapeMember<'p>>) {
        for member in members {
            self.shape.retain(|m| m.name != member.name);
            self.shape.push(member);
        }
    }

    fn read_class(&mut self, class: &'p Class, ctx: &ResolutionContext<'p>) {
        self.class = Some(class);
        let scope = TypeScope::new(self.file);
        let mut resolver = TypeResolver::new(ctx);

        if let Some(super_class) = &class.super_class
            && expr_name(super_class).is_some_and(|name| PROPS_BASE_CLASSES.contains(&name))
            && let Some(props) = class.super_type_params.as_ref().and_then(|t| t.params.first())
        {
            let members = resolver.members(props, &scope);
            self.add_shape(members);
        }

        for implemented in &class.implements {
            if let Some((None, name)) = heritage_name(&implemented.expr) {
                let members = resolver.named_members(name, implemented.type_args.as_deref(), &scope);
                self.add_shape(members);
            }
        }
    }

    fn read_function(
        &mut self,
        param: Option<&'p Pat>,
        body: Option<ComponentBody<'p>>,
        ctx: &ResolutionContext<'p>,
    ) {
        self.body = body;
        let Some(param) = param else {
            return;
        };
        let (pattern, annotation) = props_param(param);
        if let Some(Pat::Object(object)) = pattern {
            self.param_defaults = destructuring_defaults(object);
        }
        if let Some(props) = annotation {
            let scope = TypeScope::new(self.file);
            self.add_shape(shape_members(ctx, props, &scope));
        }
    }

    /// Read a variable initializer; returns whether it was a component.
    fn read_value(&mut self, init: &'p Expr, ctx: &ResolutionContext<'p>, depth: usize) -> bool {
        match unwrap_ts_expr(init) {
            Expr::Class(class_expr) => {
                self.read_class(&class_expr.class, ctx);
                true
            }
            Expr::Arrow(arrow) => {
                let body = match &*arrow.body {
                    BlockStmtOrExpr::BlockStmt(block) => ComponentBody::Block(block),
                    BlockStmtOrExpr::Expr(expr) => ComponentBody::Expr(expr),
                };
                self.read_function(arrow.params.first(), Some(body), ctx);
                true
            }
            Expr::Fn(fn_expr) => {
                let param = fn_expr.function.params.first().map(|p| &p.pat);
                let body = fn_expr.function.body.as_ref().map(ComponentBody::Block);
                self.read_function(param, body, ctx);
                true
            }
            Expr::Call(call) if depth < MAX_WRAPPER_DEPTH => {
                let wraps = callee_name(&call.callee).is_some_and(|name| {
                    COMPONENT_WRAPPERS.contains(&name) || ctx.conventions.is_wrapper_factory(name)
                });
                let Some(first) = call.args.first().filter(|_| wraps) else {
                    return false;
                };
                match unwrap_ts_expr(&first.expr) {
                    Expr::Ident(ident) => {
                        let Some(inner) = ctx.resolve_declaration(ident.sym.as_str(), self.file)
                        else {
                            return false;
                        };
                        match inner.node {
                            DeclarationNode::Class(class) => {
                                self.file = inner.file;
                                self.read_class(class, ctx);
                                true
                            }
                            DeclarationNode::Function(function) => {
                                self.file = inner.file;
                                let param = function.params.first().map(|p| &p.pat);
                                let body = function.body.as_ref().map(ComponentBody::Block);
                                self.read_function(param, body, ctx);
                                true
                            }
                            DeclarationNode::Variable {
                                init: Some(init), ..
                            } => {
                                self.file = inner.file;
                                self.read_value(init, ctx, depth + 1)
                            }
                            _ => false,
                        }
                    }
                    other => self.read_value(other, ctx, depth + 1),
                }
            }
            _ => false,
        }
    }
}

/// The pattern and type annotation of a props parameter, looking through a
/// parameter default (`props: Props = {}`).
fn props_param(param: &Pat) -> (Option<&Pat>, Option<&TsType>) {
    match param {
        Pat::Ident(binding) => (Some(param), binding.type_ann.as_ref().map(|a| &*a.type_ann)),
        Pat::Object(object) => (Some(param), object.type_ann.as_ref().map(|a| &*a.type_ann)),
        Pat::Assign(assign) => props_param(&assign.left),
        _ => (None, None),
    }
}

fn destructuring_defaults(object: &ObjectPat) -> HashMap<String, Value> {
    let mut defaults = HashMap::new();
    for prop in &object.props {
        match prop {
            ObjectPatProp::Assign(assign) => {
                if let Some(value) = assign.value.as_deref().and_then(literal_default) {
                    defaults.insert(assign.key.id.sym.to_string(), value);
                }
            }
            ObjectPatProp::KeyValue(kv) => {
                if let Pat::Assign(assign) = &*kv.value
                    && let Some(name) = prop_name(&kv.key)
                    && let Some(value) = literal_default(&assign.right)
                {
                    defaults.insert(name, value);
                }
            }
            ObjectPatProp::Rest(_) => {}
        }
    }
    defaults
}

/// `FC<Props>` / `React.FunctionComponent<Props>` → `Props`.
fn function_component_props(annotation: &TsType) -> Option<&TsType> {
    let TsType::TsTypeRef(reference) = annotation else {
        return None;
    };
    let name = match &reference.type_name {
        TsEntityName::Ident(ident) => ident.sym.as_str(),
        TsEntityName::TsQualifiedName(qualified) => qualified.right.sym.as_str(),
    };
    if !FUNCTION_COMPONENT_TYPES.contains(&name) {
        return None;
    }
    reference.type_params.as_ref()?.params.first().map(|p| &**p)
}

/// Shared state of one component's extraction.
pub struct ExtractContext<'a, 'p> {
    pub resolution: &'a ResolutionContext<'p>,
    pub surface: &'a ComponentSurface<'p>,
}

impl<'a, 'p> ExtractContext<'a, 'p> {
    pub fn new(resolution: &'a ResolutionContext<'p>, surface: &'a ComponentSurface<'p>) -> Self {
        Self {
            resolution,
            surface,
        }
    }

    pub fn conventions(&self) -> &Conventions {
        self.resolution.conventions
    }

    /// Resolve a type written in the component's own file.
    pub fn resolve_type(&self, ty: &TsType) -> SchemaModel {
        resolve_type(self.resolution, ty, &TypeScope::new(self.surface.file))
    }
}

/// Properties and events of one component.
pub fn extract_component(
    ctx: &ExtractContext<'_, '_>,
) -> (Vec<PropertyDescriptor>, Vec<EventDescriptor>) {
    let properties = properties::extract_properties(ctx);
    let events = events::extract_events(ctx);
    tracing::debug!(
        "{}: {} properties, {} events",
        ctx.surface.name,
        properties.len(),
        events.len()
    );
    (properties, events)
}
