//! Property extraction.
//!
//! Every class field and every member of the component's input shape is a
//! [`Candidate`]. The [`PropertyStrategy`] matchers are tried in order on
//! each candidate and the first match produces the descriptor:
//!
//! 1. [`TaggedField`]: `@property() name: string`, `@Input('alias') x`
//! 2. [`FactoryField`]: `size = input<number>(3)`, `id = input.required<string>()`
//! 3. [`ImplicitShape`]: members of the props interface / parameter type
//!
//! A legacy `static properties = { ... }` block is read last and may only
//! backfill descriptions and defaults of properties found above.

use enum_dispatch::enum_dispatch;
use indexmap::IndexMap;
use swc_common::{BytePos, Spanned};
use swc_ecma_ast::{
    CallExpr, Callee, Class, ClassMember, Decorator, Expr, Key, MemberProp, MethodKind, ObjectLit,
    Pat, Prop, PropOrSpread, Stmt, TsType,
};

use super::{ExtractContext, detail::infer_value};
use crate::{
    core::{
        annotate::{docs_at, literal_default},
        collect::helpers::{
            bool_literal, decorator_name, object_entry, object_string_entry, prop_name,
            string_literal, unwrap_ts_expr,
        },
        model::{PropertyDescriptor, PropertySource},
        schema::{
            SchemaModel,
            resolver::{ShapeMember, resolve_type},
        },
    },
    utils::kebab_case,
};

/// A class field or accessor that may declare a property.
#[derive(Debug, Clone)]
pub struct FieldCandidate<'p> {
    pub name: String,
    pub decorators: &'p [Decorator],
    pub value: Option<&'p Expr>,
    pub type_ann: Option<&'p TsType>,
    pub optional: bool,
    pub anchors: Vec<BytePos>,
}

#[derive(Debug, Clone)]
pub enum Candidate<'p> {
    Field(FieldCandidate<'p>),
    Member(ShapeMember<'p>),
}

#[enum_dispatch(PropertyMatcher)]
#[derive(Debug, Clone, Copy)]
pub enum PropertyStrategy {
    TaggedField(TaggedField),
    FactoryField(FactoryField),
    ImplicitShape(ImplicitShape),
}

impl PropertyStrategy {
    /// All strategies, in the order they are tried.
    pub fn all() -> [PropertyStrategy; 3] {
        [
            TaggedField.into(),
            FactoryField.into(),
            ImplicitShape.into(),
        ]
    }
}

/// One way of recognizing a property declaration.
#[enum_dispatch]
pub trait PropertyMatcher {
    fn match_candidate<'a, 'p>(
        &self,
        candidate: &Candidate<'p>,
        cx: &ExtractContext<'a, 'p>,
    ) -> Option<PropertyDescriptor>;
}

#[derive(Debug, Clone, Copy)]
pub struct TaggedField;

#[derive(Debug, Clone, Copy)]
pub struct FactoryField;

#[derive(Debug, Clone, Copy)]
pub struct ImplicitShape;

impl PropertyMatcher for TaggedField {
    fn match_candidate<'a, 'p>(
        &self,
        candidate: &Candidate<'p>,
        cx: &ExtractContext<'a, 'p>,
    ) -> Option<PropertyDescriptor> {
        let Candidate::Field(field) = candidate else {
            return None;
        };
        let decorator = field.decorators.iter().find(|d| {
            decorator_name(d).is_some_and(|name| cx.conventions().is_property_decorator(name))
        })?;
        let (explicit_name, options) = decorator_arguments(decorator);

        let schema = field
            .type_ann
            .map(|ty| cx.resolve_type(ty))
            .or_else(|| {
                options
                    .and_then(|o| object_entry(o, "type"))
                    .map(constructor_schema)
            })
            .or_else(|| field.value.and_then(|v| infer_value(v, cx)))
            .unwrap_or_default();
        let required = !field.optional
            && options
                .and_then(|o| object_entry(o, "required"))
                .and_then(bool_literal)
                .unwrap_or(true);

        Some(field_descriptor(
            field,
            schema,
            required,
            explicit_name,
            field.value.and_then(literal_default),
            PropertySource::Decorator,
            cx,
        ))
    }
}

impl PropertyMatcher for FactoryField {
    fn match_candidate<'a, 'p>(
        &self,
        candidate: &Candidate<'p>,
        cx: &ExtractContext<'a, 'p>,
    ) -> Option<PropertyDescriptor> {
        let Candidate::Field(field) = candidate else {
            return None;
        };
        let Expr::Call(call) = unwrap_ts_expr(field.value?) else {
            return None;
        };
        let required = factory_variant(call, cx)?;

        let (default_arg, options_arg) = if required {
            (None, call.args.first())
        } else {
            (call.args.first(), call.args.get(1))
        };
        let options = options_arg.and_then(|arg| match unwrap_ts_expr(&arg.expr) {
            Expr::Object(object) => Some(object),
            _ => None,
        });
        let explicit_name = options.and_then(|o| object_string_entry(o, "alias"));
        let default = default_arg.and_then(|arg| literal_default(&arg.expr));

        let schema = call
            .type_args
            .as_ref()
            .and_then(|args| args.params.first())
            .map(|ty| cx.resolve_type(ty))
            .or_else(|| default_arg.and_then(|arg| infer_value(&arg.expr, cx)))
            .unwrap_or_default();

        Some(field_descriptor(
            field,
            schema,
            required,
            explicit_name,
            default,
            PropertySource::Factory,
            cx,
        ))
    }
}

impl PropertyMatcher for ImplicitShape {
    fn match_candidate<'a, 'p>(
        &self,
        candidate: &Candidate<'p>,
        cx: &ExtractContext<'a, 'p>,
    ) -> Option<PropertyDescriptor> {
        let Candidate::Member(member) = candidate else {
            return None;
        };
        let conventions = cx.conventions();
        if conventions.is_reserved_member(&member.name) {
            return None;
        }
        // Prefixed callbacks are events.
        if member.callback.is_some() && conventions.strip_callback_prefix(&member.name).is_some() {
            return None;
        }
        let ty = member.ty?;

        let docs = docs_at(member.file(), &[member.anchor]);
        let schema = resolve_type(cx.resolution, ty, &member.scope);
        Some(PropertyDescriptor {
            external_name: docs
                .attribute
                .clone()
                .unwrap_or_else(|| kebab_case(&member.name)),
            name: member.name.clone(),
            schema,
            required: !member.optional,
            source_kind: PropertySource::Shape,
            default: docs
                .default
                .or_else(|| cx.surface.param_defaults.get(&member.name).cloned()),
            description: docs.description,
            deprecated: docs.deprecated,
        })
    }
}

/// `Some(true)` for `input.required<T>()`, `Some(false)` for `input<T>()`.
fn factory_variant(call: &CallExpr, cx: &ExtractContext<'_, '_>) -> Option<bool> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let conventions = cx.conventions();
    match unwrap_ts_expr(callee) {
        Expr::Ident(ident) if conventions.is_property_factory(ident.sym.as_str()) => Some(false),
        Expr::Member(member) => {
            let Expr::Ident(object) = unwrap_ts_expr(&member.obj) else {
                return None;
            };
            let is_required =
                matches!(&member.prop, MemberProp::Ident(p) if p.sym.as_str() == "required");
            (is_required && conventions.is_property_factory(object.sym.as_str())).then_some(true)
        }
        _ => None,
    }
}

/// Explicit name and options object of a property decorator call.
fn decorator_arguments(decorator: &Decorator) -> (Option<String>, Option<&ObjectLit>) {
    let Expr::Call(call) = &*decorator.expr else {
        return (None, None);
    };
    let mut explicit = None;
    let mut options = None;
    for arg in &call.args {
        match unwrap_ts_expr(&arg.expr) {
            Expr::Object(object) => options = Some(object),
            other => {
                if explicit.is_none() {
                    explicit = string_literal(other);
                }
            }
        }
    }
    if explicit.is_none() {
        explicit = options.and_then(|o| {
            object_string_entry(o, "attribute").or_else(|| object_string_entry(o, "alias"))
        });
    }
    (explicit, options)
}

/// Schema of a runtime constructor used as a type hint (`type: Number`).
fn constructor_schema(expr: &Expr) -> SchemaModel {
    let Expr::Ident(ident) = unwrap_ts_expr(expr) else {
        return SchemaModel::Unconstrained;
    };
    match ident.sym.as_str() {
        "String" => SchemaModel::string(),
        "Number" => SchemaModel::number(),
        "Boolean" => SchemaModel::boolean(),
        "Array" => SchemaModel::array(SchemaModel::Unconstrained),
        "Object" => SchemaModel::bare_object(),
        "Date" => SchemaModel::date_time(),
        _ => SchemaModel::Unconstrained,
    }
}

fn field_descriptor(
    field: &FieldCandidate<'_>,
    schema: SchemaModel,
    required: bool,
    explicit_name: Option<String>,
    literal: Option<serde_json::Value>,
    source_kind: PropertySource,
    cx: &ExtractContext<'_, '_>,
) -> PropertyDescriptor {
    let docs = docs_at(cx.surface.file, &field.anchors);
    PropertyDescriptor {
        external_name: explicit_name
            .or(docs.attribute)
            .unwrap_or_else(|| kebab_case(&field.name)),
        name: field.name.clone(),
        schema,
        required,
        source_kind,
        description: docs.description,
        default: docs.default.or(literal),
        deprecated: docs.deprecated,
    }
}

/// Instance fields and decorated accessors of a class, in source order.
fn field_candidates<'p>(class: &'p Class, cx: &ExtractContext<'_, 'p>) -> Vec<FieldCandidate<'p>> {
    let mut candidates = Vec::new();
    for member in &class.body {
        let candidate = match member {
            ClassMember::ClassProp(prop) if !prop.is_static => {
                let Some(name) = prop_name(&prop.key) else {
                    continue;
                };
                FieldCandidate {
                    name,
                    decorators: &prop.decorators,
                    value: prop.value.as_deref(),
                    type_ann: prop.type_ann.as_ref().map(|a| &*a.type_ann),
                    optional: prop.is_optional,
                    anchors: member_anchors(prop.span.lo, &prop.decorators, prop.key.span().lo),
                }
            }
            ClassMember::AutoAccessor(accessor) if !accessor.is_static => {
                let Key::Public(key) = &accessor.key else {
                    continue;
                };
                let Some(name) = prop_name(key) else {
                    continue;
                };
                FieldCandidate {
                    name,
                    decorators: &accessor.decorators,
                    value: accessor.value.as_deref(),
                    type_ann: accessor.type_ann.as_ref().map(|a| &*a.type_ann),
                    optional: false,
                    anchors: member_anchors(accessor.span.lo, &accessor.decorators, key.span().lo),
                }
            }
            ClassMember::Method(method)
                if !method.is_static
                    && matches!(method.kind, MethodKind::Getter | MethodKind::Setter) =>
            {
                let decorators = &method.function.decorators;
                let is_property = decorators.iter().any(|d| {
                    decorator_name(d).is_some_and(|n| cx.conventions().is_property_decorator(n))
                });
                let Some(name) = prop_name(&method.key).filter(|_| is_property) else {
                    continue;
                };
                let type_ann = match method.kind {
                    MethodKind::Setter => method.function.params.first().and_then(|p| match &p.pat {
                        Pat::Ident(binding) => binding.type_ann.as_ref().map(|a| &*a.type_ann),
                        _ => None,
                    }),
                    _ => method.function.return_type.as_ref().map(|a| &*a.type_ann),
                };
                FieldCandidate {
                    name,
                    decorators,
                    value: None,
                    type_ann,
                    optional: method.is_optional,
                    anchors: member_anchors(method.span.lo, decorators, method.key.span().lo),
                }
            }
            _ => continue,
        };
        candidates.push(candidate);
    }
    candidates
}

fn member_anchors(start: BytePos, decorators: &[Decorator], key: BytePos) -> Vec<BytePos> {
    let mut anchors = vec![start];
    anchors.extend(decorators.iter().map(|d| d.span.lo));
    anchors.push(key);
    anchors
}

/// Entries of a `static properties = { ... }` block (or static getter).
fn legacy_block(class: &Class) -> Option<&ObjectLit> {
    class.body.iter().find_map(|member| match member {
        ClassMember::ClassProp(prop)
            if prop.is_static && prop_name(&prop.key).as_deref() == Some("properties") =>
        {
            match unwrap_ts_expr(prop.value.as_deref()?) {
                Expr::Object(object) => Some(object),
                _ => None,
            }
        }
        ClassMember::Method(method)
            if method.is_static
                && method.kind == MethodKind::Getter
                && prop_name(&method.key).as_deref() == Some("properties") =>
        {
            let body = method.function.body.as_ref()?;
            body.stmts.iter().find_map(|stmt| match stmt {
                Stmt::Return(ret) => match unwrap_ts_expr(ret.arg.as_deref()?) {
                    Expr::Object(object) => Some(object),
                    _ => None,
                },
                _ => None,
            })
        }
        _ => None,
    })
}

/// Merge the legacy block into `properties`.
fn apply_legacy_block(
    block: &ObjectLit,
    properties: &mut IndexMap<String, PropertyDescriptor>,
    cx: &ExtractContext<'_, '_>,
) {
    for prop in &block.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(kv) = &**prop else {
            continue;
        };
        let Some(name) = prop_name(&kv.key) else {
            continue;
        };
        let options = match unwrap_ts_expr(&kv.value) {
            Expr::Object(object) => Some(object),
            _ => None,
        };
        let docs = docs_at(cx.surface.file, &[kv.key.span().lo]);
        let default = docs.default.clone().or_else(|| {
            options
                .and_then(|o| object_entry(o, "value"))
                .and_then(literal_default)
        });

        if let Some(existing) = properties.get_mut(&name) {
            if existing.description.is_none() {
                existing.description = docs.description;
            }
            if existing.default.is_none() {
                existing.default = default;
            }
            continue;
        }

        let schema = match options {
            Some(o) => object_entry(o, "type").map(constructor_schema).unwrap_or_default(),
            // `name: String` shorthand.
            None => constructor_schema(&kv.value),
        };
        let external_name = options
            .and_then(|o| object_string_entry(o, "attribute"))
            .or(docs.attribute)
            .unwrap_or_else(|| kebab_case(&name));
        properties.insert(
            name.clone(),
            PropertyDescriptor {
                name,
                external_name,
                schema,
                required: false,
                source_kind: PropertySource::Legacy,
                description: docs.description,
                default,
                deprecated: docs.deprecated,
            },
        );
    }
}

/// Extract the component's properties, uniquely named, in discovery order.
pub fn extract_properties(cx: &ExtractContext<'_, '_>) -> Vec<PropertyDescriptor> {
    let surface = cx.surface;
    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    if let Some(class) = surface.class {
        candidates.extend(field_candidates(class, cx).into_iter().map(Candidate::Field));
    }
    candidates.extend(surface.shape.iter().cloned().map(Candidate::Member));

    // Class fields come first, so a declared field keeps its name against a
    // shape member of the same name.
    let strategies = PropertyStrategy::all();
    let mut properties: IndexMap<String, PropertyDescriptor> = IndexMap::new();
    for candidate in &candidates {
        if let Some(descriptor) = strategies
            .iter()
            .find_map(|strategy| strategy.match_candidate(candidate, cx))
        {
            properties
                .entry(descriptor.name.clone())
                .or_insert(descriptor);
        }
    }

    if let Some(block) = surface.class.and_then(legacy_block) {
        apply_legacy_block(block, &mut properties, cx);
    }

    properties.into_values().collect()
}
