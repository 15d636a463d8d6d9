//! Type expression → [`SchemaModel`].
//!
//! Resolution is a pure function of the type node, its [`TypeScope`] and the
//! read-only [`ResolutionContext`]. Named types are expanded through the
//! symbol table; the declarations currently being expanded are tracked so a
//! self-referential type resolves to `Unconstrained` where it recurs.

use std::collections::{HashMap, HashSet};

use swc_common::BytePos;
use swc_ecma_ast::{
    Accessibility, Class, ClassMember, Expr, Lit, MemberProp, TsEntityName, TsEnumDecl, TsEnumMemberId,
    TsExprWithTypeArgs, TsFnOrConstructorType, TsFnParam, TsKeywordTypeKind, TsLit, TsType,
    TsTypeElement, TsTypeOperatorOp, TsTypeParamDecl, TsTypeParamInstantiation,
    TsUnionOrIntersectionType,
};

use super::{LiteralValue, ObjectSchema, SchemaModel};
use crate::core::{
    collect::{
        helpers::{number_literal, prop_name, string_literal},
        symbols::{Declaration, DeclarationKey, DeclarationNode},
    },
    program::SourceFile,
    resolve::ResolutionContext,
};

/// Where a type expression is read: the file whose imports apply, plus the
/// generic parameters bound at the reference site.
#[derive(Debug, Clone)]
pub struct TypeScope<'p> {
    pub file: &'p SourceFile,
    pub bindings: HashMap<String, SchemaModel>,
}

impl<'p> TypeScope<'p> {
    pub fn new(file: &'p SourceFile) -> Self {
        Self {
            file,
            bindings: HashMap::new(),
        }
    }
}

/// Function-like member: its first parameter's type and the scope to read it in.
#[derive(Debug, Clone)]
pub struct Callback<'p> {
    pub param: Option<&'p TsType>,
    pub scope: TypeScope<'p>,
}

/// One member of a structural shape (interface, type literal, alias, ...).
#[derive(Debug, Clone)]
pub struct ShapeMember<'p> {
    pub name: String,
    pub optional: bool,
    /// Declared type; `None` for method signatures.
    pub ty: Option<&'p TsType>,
    pub callback: Option<Callback<'p>>,
    /// Position the member's documentation block is attached to.
    pub anchor: BytePos,
    pub scope: TypeScope<'p>,
}

impl<'p> ShapeMember<'p> {
    pub fn file(&self) -> &'p SourceFile {
        self.scope.file
    }
}

/// Resolve a type expression to its schema.
pub fn resolve_type<'p>(
    ctx: &ResolutionContext<'p>,
    ty: &TsType,
    scope: &TypeScope<'p>,
) -> SchemaModel {
    TypeResolver::new(ctx).resolve(ty, scope)
}

/// Enumerate the members of a structural type.
pub fn shape_members<'p>(
    ctx: &ResolutionContext<'p>,
    ty: &'p TsType,
    scope: &TypeScope<'p>,
) -> Vec<ShapeMember<'p>> {
    TypeResolver::new(ctx).members(ty, scope)
}

/// Combine already-resolved union members into one schema.
///
/// Same-kind enums merge into one deduplicated enum, bare primitives become a
/// multi-type, anything else becomes alternatives.
pub fn classify_union(members: Vec<SchemaModel>) -> SchemaModel {
    let mut unique: Vec<SchemaModel> = Vec::new();
    for member in members {
        match member {
            SchemaModel::Alternatives(nested) => {
                for m in nested {
                    if !unique.contains(&m) {
                        unique.push(m);
                    }
                }
            }
            SchemaModel::Unconstrained => return SchemaModel::Unconstrained,
            other => {
                if !unique.contains(&other) {
                    unique.push(other);
                }
            }
        }
    }

    match unique.len() {
        0 => return SchemaModel::null(),
        1 => return unique.remove(0),
        _ => {}
    }

    if let Some(SchemaModel::Enum { kind, .. }) = unique.first() {
        let kind = *kind;
        if unique
            .iter()
            .all(|m| matches!(m, SchemaModel::Enum { kind: k, .. } if *k == kind))
        {
            let mut values: Vec<LiteralValue> = Vec::new();
            for member in unique {
                if let SchemaModel::Enum { values: vs, .. } = member {
                    for v in vs {
                        if !values.contains(&v) {
                            values.push(v);
                        }
                    }
                }
            }
            return SchemaModel::Enum { kind, values };
        }
    }

    let all_bare = unique.iter().all(|m| {
        matches!(
            m,
            SchemaModel::Primitive { format: None, .. } | SchemaModel::MultiType(_)
        )
    });
    if all_bare {
        let mut kinds = Vec::new();
        for member in &unique {
            let member_kinds = match member {
                SchemaModel::Primitive { kind, .. } => vec![*kind],
                SchemaModel::MultiType(ks) => ks.clone(),
                _ => Vec::new(),
            };
            for kind in member_kinds {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        return if kinds.len() == 1 {
            SchemaModel::primitive(kinds[0])
        } else {
            SchemaModel::MultiType(kinds)
        };
    }

    SchemaModel::Alternatives(unique)
}

pub struct TypeResolver<'a, 'p> {
    ctx: &'a ResolutionContext<'p>,
    expanding: HashSet<DeclarationKey>,
}

impl<'a, 'p> TypeResolver<'a, 'p> {
    pub fn new(ctx: &'a ResolutionContext<'p>) -> Self {
        Self {
            ctx,
            expanding: HashSet::new(),
        }
    }

    pub fn resolve(&mut self, ty: &TsType, scope: &TypeScope<'p>) -> SchemaModel {
        match ty {
            TsType::TsKeywordType(keyword) => keyword_schema(keyword.kind),
            TsType::TsTypeRef(reference) => {
                self.resolve_reference(&reference.type_name, reference.type_params.as_deref(), scope)
            }
            TsType::TsTypeLit(lit) => SchemaModel::Object(self.object_from_elements(&lit.members, scope)),
            TsType::TsArrayType(array) => SchemaModel::array(self.resolve(&array.elem_type, scope)),
            TsType::TsTupleType(tuple) => {
                let elements: Vec<SchemaModel> = tuple
                    .elem_types
                    .iter()
                    .map(|element| self.resolve(&element.ty, scope))
                    .collect();
                if elements.is_empty() {
                    SchemaModel::array(SchemaModel::Unconstrained)
                } else {
                    SchemaModel::array(classify_union(elements))
                }
            }
            TsType::TsOptionalType(optional) => self.resolve(&optional.type_ann, scope),
            TsType::TsRestType(rest) => match self.resolve(&rest.type_ann, scope) {
                SchemaModel::Array(items) => *items,
                other => other,
            },
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
                let members = union
                    .types
                    .iter()
                    .filter(|member| !is_undefined_like(member))
                    .map(|member| self.resolve(member, scope))
                    .collect();
                classify_union(members)
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(
                intersection,
            )) => {
                let mut merged = ObjectSchema::default();
                for member in &intersection.types {
                    match self.resolve(member, scope) {
                        SchemaModel::Object(object) => merged.merge(object),
                        _ => return SchemaModel::Unconstrained,
                    }
                }
                SchemaModel::Object(merged)
            }
            TsType::TsParenthesizedType(paren) => self.resolve(&paren.type_ann, scope),
            TsType::TsTypeOperator(operator) => match operator.op {
                TsTypeOperatorOp::ReadOnly => self.resolve(&operator.type_ann, scope),
                TsTypeOperatorOp::KeyOf => match self.resolve(&operator.type_ann, scope) {
                    SchemaModel::Object(object) if !object.properties.is_empty() => {
                        SchemaModel::Enum {
                            kind: super::PrimitiveKind::String,
                            values: object
                                .properties
                                .keys()
                                .map(|k| LiteralValue::String(k.clone()))
                                .collect(),
                        }
                    }
                    _ => SchemaModel::string(),
                },
                TsTypeOperatorOp::Unique => SchemaModel::Unconstrained,
            },
            TsType::TsIndexedAccessType(access) => {
                let object = self.resolve(&access.obj_type, scope);
                match (object, &*access.index_type) {
                    (SchemaModel::Object(mut object), TsType::TsLitType(lit)) => {
                        let TsLit::Str(key) = &lit.lit else {
                            return SchemaModel::Unconstrained;
                        };
                        key.value
                            .as_str()
                            .and_then(|k| object.properties.shift_remove(k))
                            .unwrap_or_default()
                    }
                    (SchemaModel::Array(items), TsType::TsKeywordType(k))
                        if k.kind == TsKeywordTypeKind::TsNumberKeyword =>
                    {
                        *items
                    }
                    _ => SchemaModel::Unconstrained,
                }
            }
            TsType::TsMappedType(_) => SchemaModel::bare_object(),
            TsType::TsLitType(lit) => literal_type_schema(&lit.lit),
            TsType::TsTypePredicate(_) => SchemaModel::boolean(),
            TsType::TsThisType(_)
            | TsType::TsFnOrConstructorType(_)
            | TsType::TsTypeQuery(_)
            | TsType::TsInferType(_)
            | TsType::TsConditionalType(_)
            | TsType::TsImportType(_) => SchemaModel::Unconstrained,
        }
    }

    fn resolve_args(&mut self, args: &[Box<TsType>], scope: &TypeScope<'p>) -> Vec<SchemaModel> {
        args.iter().map(|arg| self.resolve(arg, scope)).collect()
    }

    fn first_arg(&mut self, args: &[Box<TsType>], scope: &TypeScope<'p>) -> SchemaModel {
        args.first()
            .map(|arg| self.resolve(arg, scope))
            .unwrap_or_default()
    }

    fn resolve_reference(
        &mut self,
        name: &TsEntityName,
        type_args: Option<&TsTypeParamInstantiation>,
        scope: &TypeScope<'p>,
    ) -> SchemaModel {
        let args: &[Box<TsType>] = type_args.map(|t| t.params.as_slice()).unwrap_or(&[]);
        match name {
            TsEntityName::Ident(ident) => self.resolve_named(ident.sym.as_str(), args, scope),
            TsEntityName::TsQualifiedName(qualified) => {
                let TsEntityName::Ident(left) = &qualified.left else {
                    return SchemaModel::Unconstrained;
                };
                self.resolve_qualified(left.sym.as_str(), qualified.right.sym.as_str(), args, scope)
            }
        }
    }

    fn resolve_named(
        &mut self,
        name: &str,
        args: &[Box<TsType>],
        scope: &TypeScope<'p>,
    ) -> SchemaModel {
        if let Some(bound) = scope.bindings.get(name) {
            return bound.clone();
        }
        if let Some(schema) = self.resolve_well_known(name, args, scope) {
            return schema;
        }
        match self.ctx.resolve_type_declaration(name, scope.file) {
            Some(declaration) => {
                let args = self.resolve_args(args, scope);
                self.expand(&declaration, args)
            }
            None => {
                tracing::debug!(
                    "type '{}' not found from {}, leaving it unconstrained",
                    name,
                    scope.file.relative_path
                );
                SchemaModel::Unconstrained
            }
        }
    }

    /// `Enum.Member` or `namespace.Type`.
    fn resolve_qualified(
        &mut self,
        left: &str,
        right: &str,
        args: &[Box<TsType>],
        scope: &TypeScope<'p>,
    ) -> SchemaModel {
        if let Some(declaration) = self.ctx.resolve_type_declaration(left, scope.file)
            && let DeclarationNode::Enum(ts_enum) = declaration.node
        {
            return enum_member_value(ts_enum, right)
                .map(SchemaModel::literal)
                .unwrap_or_default();
        }
        match self.ctx.resolve_qualified_type(left, right, scope.file) {
            Some(declaration) => {
                let args = self.resolve_args(args, scope);
                self.expand(&declaration, args)
            }
            None => SchemaModel::Unconstrained,
        }
    }

    fn resolve_well_known(
        &mut self,
        name: &str,
        args: &[Box<TsType>],
        scope: &TypeScope<'p>,
    ) -> Option<SchemaModel> {
        let schema = match name {
            "Array" | "ReadonlyArray" | "Set" | "ReadonlySet" | "Iterable" => {
                SchemaModel::array(self.first_arg(args, scope))
            }
            "Date" => SchemaModel::date_time(),
            "Record" | "Map" | "ReadonlyMap" | "WeakMap" | "Object" => SchemaModel::bare_object(),
            "String" => SchemaModel::string(),
            "Number" => SchemaModel::number(),
            "Boolean" => SchemaModel::boolean(),
            "Promise" | "PromiseLike" | "Function" => SchemaModel::Unconstrained,
            "Readonly" | "NonNullable" => self.first_arg(args, scope),
            "Partial" => match self.first_arg(args, scope) {
                SchemaModel::Object(mut object) => {
                    object.required.clear();
                    SchemaModel::Object(object)
                }
                other => other,
            },
            "Required" => match self.first_arg(args, scope) {
                SchemaModel::Object(mut object) => {
                    object.required = object.properties.keys().cloned().collect();
                    SchemaModel::Object(object)
                }
                other => other,
            },
            "Pick" | "Omit" => {
                let keys = args.get(1).map(|k| literal_keys(k)).unwrap_or_default();
                match self.first_arg(args, scope) {
                    SchemaModel::Object(object) => {
                        let keep = |key: &String| keys.contains(key) == (name == "Pick");
                        let mut filtered = ObjectSchema::default();
                        for (key, schema) in object.properties {
                            if keep(&key) {
                                let required = object.required.contains(&key);
                                filtered.insert(key, schema, required);
                            }
                        }
                        SchemaModel::Object(filtered)
                    }
                    other => other,
                }
            }
            _ => return None,
        };
        Some(schema)
    }

    /// Expand a named declaration with type arguments already resolved in the
    /// caller's scope.
    fn expand(&mut self, declaration: &Declaration<'p>, args: Vec<SchemaModel>) -> SchemaModel {
        let key = declaration.key();
        if !self.expanding.insert(key) {
            return SchemaModel::Unconstrained;
        }

        let file = declaration.file;
        let schema = match declaration.node {
            DeclarationNode::Interface(interface) => {
                let scope = self.bind_params(interface.type_params.as_deref(), &args, file);
                let mut object = ObjectSchema::default();
                for parent in &interface.extends {
                    if let SchemaModel::Object(parent) = self.resolve_heritage(parent, &scope) {
                        object.merge(parent);
                    }
                }
                object.merge(self.object_from_elements(&interface.body.body, &scope));
                SchemaModel::Object(object)
            }
            DeclarationNode::TypeAlias(alias) => {
                let scope = self.bind_params(alias.type_params.as_deref(), &args, file);
                self.resolve(&alias.type_ann, &scope)
            }
            DeclarationNode::Enum(ts_enum) => enum_schema(ts_enum),
            DeclarationNode::Class(class) => {
                let scope = self.bind_params(class.type_params.as_deref(), &args, file);
                let mut object = ObjectSchema::default();
                for member in class_fields(class) {
                    let schema = member
                        .ty
                        .map(|ty| self.resolve(ty, &scope))
                        .unwrap_or_default();
                    object.insert(member.name, schema, !member.optional);
                }
                SchemaModel::Object(object)
            }
            DeclarationNode::Function(_) | DeclarationNode::Variable { .. } => {
                SchemaModel::Unconstrained
            }
        };

        self.expanding.remove(&key);
        schema
    }

    fn bind_params(
        &mut self,
        params: Option<&TsTypeParamDecl>,
        args: &[SchemaModel],
        file: &'p SourceFile,
    ) -> TypeScope<'p> {
        let mut scope = TypeScope::new(file);
        let Some(params) = params else {
            return scope;
        };
        for (index, param) in params.params.iter().enumerate() {
            let schema = match args.get(index) {
                Some(arg) => arg.clone(),
                None => param
                    .default
                    .as_ref()
                    .map(|default| self.resolve(default, &scope))
                    .unwrap_or_default(),
            };
            scope.bindings.insert(param.name.sym.to_string(), schema);
        }
        scope
    }

    fn resolve_heritage(&mut self, parent: &TsExprWithTypeArgs, scope: &TypeScope<'p>) -> SchemaModel {
        let args: &[Box<TsType>] = parent
            .type_args
            .as_deref()
            .map(|t| t.params.as_slice())
            .unwrap_or(&[]);
        match heritage_name(&parent.expr) {
            Some((None, name)) => self.resolve_named(name, args, scope),
            Some((Some(left), right)) => self.resolve_qualified(left, right, args, scope),
            None => SchemaModel::Unconstrained,
        }
    }

    fn object_from_elements(&mut self, elements: &[TsTypeElement], scope: &TypeScope<'p>) -> ObjectSchema {
        let mut object = ObjectSchema::default();
        for element in elements {
            match element {
                TsTypeElement::TsPropertySignature(property) => {
                    let Some(name) = member_key(&property.key) else {
                        continue;
                    };
                    let schema = property
                        .type_ann
                        .as_ref()
                        .map(|ann| self.resolve(&ann.type_ann, scope))
                        .unwrap_or_default();
                    object.insert(name, schema, !property.optional);
                }
                TsTypeElement::TsGetterSignature(getter) => {
                    let Some(name) = member_key(&getter.key) else {
                        continue;
                    };
                    let schema = getter
                        .type_ann
                        .as_ref()
                        .map(|ann| self.resolve(&ann.type_ann, scope))
                        .unwrap_or_default();
                    object.insert(name, schema, true);
                }
                _ => {}
            }
        }
        object
    }

    // ============================================================
    // Shape members
    // ============================================================

    pub fn members(&mut self, ty: &'p TsType, scope: &TypeScope<'p>) -> Vec<ShapeMember<'p>> {
        match ty {
            TsType::TsTypeLit(lit) => self.members_of_elements(&lit.members, scope),
            TsType::TsParenthesizedType(paren) => self.members(&paren.type_ann, scope),
            TsType::TsTypeOperator(operator) if operator.op == TsTypeOperatorOp::ReadOnly => {
                self.members(&operator.type_ann, scope)
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(
                intersection,
            )) => {
                let mut all = Vec::new();
                for member in &intersection.types {
                    let members = self.members(member, scope);
                    merge_members(&mut all, members);
                }
                all
            }
            TsType::TsTypeRef(reference) => {
                let args = reference.type_params.as_deref();
                match &reference.type_name {
                    TsEntityName::Ident(ident) => self.named_members(ident.sym.as_str(), args, scope),
                    TsEntityName::TsQualifiedName(qualified) => {
                        let TsEntityName::Ident(left) = &qualified.left else {
                            return Vec::new();
                        };
                        match self.ctx.resolve_qualified_type(
                            left.sym.as_str(),
                            qualified.right.sym.as_str(),
                            scope.file,
                        ) {
                            Some(declaration) => {
                                let args = self.resolve_args(type_args(args), scope);
                                self.declaration_members(&declaration, args)
                            }
                            None => Vec::new(),
                        }
                    }
                }
            }
            _ => Vec::new(),
        }
    }

    /// Members of a named shape such as `implements Props` or `Partial<Props>`.
    pub fn named_members(
        &mut self,
        name: &str,
        type_args: Option<&'p TsTypeParamInstantiation>,
        scope: &TypeScope<'p>,
    ) -> Vec<ShapeMember<'p>> {
        let args = self::type_args(type_args);
        match name {
            "Partial" | "Required" | "Readonly" => {
                let mut members = args
                    .first()
                    .map(|arg| self.members(arg, scope))
                    .unwrap_or_default();
                if name != "Readonly" {
                    for member in &mut members {
                        member.optional = name == "Partial";
                    }
                }
                return members;
            }
            "Pick" | "Omit" => {
                let keys = args.get(1).map(|k| literal_keys(k)).unwrap_or_default();
                let mut members = args
                    .first()
                    .map(|arg| self.members(arg, scope))
                    .unwrap_or_default();
                members.retain(|m| keys.contains(&m.name) == (name == "Pick"));
                return members;
            }
            _ => {}
        }

        let Some(declaration) = self.ctx.resolve_type_declaration(name, scope.file) else {
            return Vec::new();
        };
        let args = self.resolve_args(args, scope);
        self.declaration_members(&declaration, args)
    }

    fn declaration_members(
        &mut self,
        declaration: &Declaration<'p>,
        args: Vec<SchemaModel>,
    ) -> Vec<ShapeMember<'p>> {
        let key = declaration.key();
        if !self.expanding.insert(key) {
            return Vec::new();
        }

        let file = declaration.file;
        let members = match declaration.node {
            DeclarationNode::Interface(interface) => {
                let scope = self.bind_params(interface.type_params.as_deref(), &args, file);
                let mut all = Vec::new();
                for parent in &interface.extends {
                    let inherited = match heritage_name(&parent.expr) {
                        Some((None, name)) => {
                            self.named_members(name, parent.type_args.as_deref(), &scope)
                        }
                        _ => Vec::new(),
                    };
                    merge_members(&mut all, inherited);
                }
                let own = self.members_of_elements(&interface.body.body, &scope);
                merge_members(&mut all, own);
                all
            }
            DeclarationNode::TypeAlias(alias) => {
                let scope = self.bind_params(alias.type_params.as_deref(), &args, file);
                self.members(&alias.type_ann, &scope)
            }
            DeclarationNode::Class(class) => {
                let scope = self.bind_params(class.type_params.as_deref(), &args, file);
                class_fields(class)
                    .into_iter()
                    .map(|field| ShapeMember {
                        callback: field.ty.and_then(|ty| self.callback_signature(ty, &scope)),
                        name: field.name,
                        optional: field.optional,
                        ty: field.ty,
                        anchor: field.anchor,
                        scope: scope.clone(),
                    })
                    .collect()
            }
            _ => Vec::new(),
        };

        self.expanding.remove(&key);
        members
    }

    fn members_of_elements(
        &mut self,
        elements: &'p [TsTypeElement],
        scope: &TypeScope<'p>,
    ) -> Vec<ShapeMember<'p>> {
        let mut members = Vec::new();
        for element in elements {
            let member = match element {
                TsTypeElement::TsPropertySignature(property) => {
                    let Some(name) = member_key(&property.key) else {
                        continue;
                    };
                    let ty = property.type_ann.as_ref().map(|ann| &*ann.type_ann);
                    ShapeMember {
                        name,
                        optional: property.optional,
                        ty,
                        callback: ty.and_then(|ty| self.callback_signature(ty, scope)),
                        anchor: property.span.lo,
                        scope: scope.clone(),
                    }
                }
                TsTypeElement::TsMethodSignature(method) => {
                    let Some(name) = member_key(&method.key) else {
                        continue;
                    };
                    ShapeMember {
                        name,
                        optional: method.optional,
                        ty: None,
                        callback: Some(Callback {
                            param: first_param_type(&method.params),
                            scope: scope.clone(),
                        }),
                        anchor: method.span.lo,
                        scope: scope.clone(),
                    }
                }
                TsTypeElement::TsGetterSignature(getter) => {
                    let Some(name) = member_key(&getter.key) else {
                        continue;
                    };
                    ShapeMember {
                        name,
                        optional: false,
                        ty: getter.type_ann.as_ref().map(|ann| &*ann.type_ann),
                        callback: None,
                        anchor: getter.span.lo,
                        scope: scope.clone(),
                    }
                }
                _ => continue,
            };
            members.push(member);
        }
        members
    }

    /// If `ty` is function-like, the callback's first parameter.
    pub fn callback_signature(&mut self, ty: &'p TsType, scope: &TypeScope<'p>) -> Option<Callback<'p>> {
        match ty {
            TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsFnType(function)) => {
                Some(Callback {
                    param: first_param_type(&function.params),
                    scope: scope.clone(),
                })
            }
            TsType::TsParenthesizedType(paren) => self.callback_signature(&paren.type_ann, scope),
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
                let mut candidates = union.types.iter().filter(|t| !is_nullish(t));
                let first = candidates.next()?;
                if candidates.next().is_some() {
                    return None;
                }
                self.callback_signature(first, scope)
            }
            TsType::TsTypeRef(reference) => {
                let TsEntityName::Ident(ident) = &reference.type_name else {
                    return None;
                };
                let name = ident.sym.as_str();
                if name == "Function" {
                    return Some(Callback {
                        param: None,
                        scope: scope.clone(),
                    });
                }
                if scope.bindings.contains_key(name) {
                    return None;
                }
                let args = type_args(reference.type_params.as_deref());
                match self.ctx.resolve_type_declaration(name, scope.file) {
                    Some(declaration) => {
                        let DeclarationNode::TypeAlias(alias) = declaration.node else {
                            return None;
                        };
                        let key = declaration.key();
                        if !self.expanding.insert(key) {
                            return None;
                        }
                        let resolved_args = self.resolve_args(args, scope);
                        let alias_scope = self.bind_params(
                            alias.type_params.as_deref(),
                            &resolved_args,
                            declaration.file,
                        );
                        let callback = self.callback_signature(&alias.type_ann, &alias_scope);
                        self.expanding.remove(&key);
                        callback
                    }
                    // Handler types from external packages (`MouseEventHandler<T>`).
                    None if is_handler_name(name) => Some(Callback {
                        param: args.first().map(|arg| &**arg),
                        scope: scope.clone(),
                    }),
                    None => None,
                }
            }
            _ => None,
        }
    }
}

fn type_args(type_args: Option<&TsTypeParamInstantiation>) -> &[Box<TsType>] {
    type_args.map(|t| t.params.as_slice()).unwrap_or(&[])
}

fn is_handler_name(name: &str) -> bool {
    ["Handler", "Listener", "Callback"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

fn keyword_schema(kind: TsKeywordTypeKind) -> SchemaModel {
    match kind {
        TsKeywordTypeKind::TsStringKeyword => SchemaModel::string(),
        TsKeywordTypeKind::TsNumberKeyword | TsKeywordTypeKind::TsBigIntKeyword => {
            SchemaModel::number()
        }
        TsKeywordTypeKind::TsBooleanKeyword => SchemaModel::boolean(),
        TsKeywordTypeKind::TsNullKeyword
        | TsKeywordTypeKind::TsUndefinedKeyword
        | TsKeywordTypeKind::TsVoidKeyword => SchemaModel::null(),
        TsKeywordTypeKind::TsObjectKeyword => SchemaModel::bare_object(),
        _ => SchemaModel::Unconstrained,
    }
}

fn literal_type_schema(lit: &TsLit) -> SchemaModel {
    match lit {
        TsLit::Str(s) => s
            .value
            .as_str()
            .map(|s| SchemaModel::literal(LiteralValue::String(s.to_string())))
            .unwrap_or_else(SchemaModel::string),
        TsLit::Number(n) => SchemaModel::literal(LiteralValue::Number(n.value)),
        TsLit::Bool(b) => SchemaModel::literal(LiteralValue::Boolean(b.value)),
        TsLit::BigInt(_) => SchemaModel::number(),
        TsLit::Tpl(_) => SchemaModel::string(),
    }
}

fn is_undefined_like(ty: &TsType) -> bool {
    matches!(
        ty,
        TsType::TsKeywordType(k) if matches!(
            k.kind,
            TsKeywordTypeKind::TsUndefinedKeyword | TsKeywordTypeKind::TsVoidKeyword
        )
    )
}

fn is_nullish(ty: &TsType) -> bool {
    is_undefined_like(ty)
        || matches!(ty, TsType::TsKeywordType(k) if k.kind == TsKeywordTypeKind::TsNullKeyword)
}

/// String keys named by a literal or a union of literals (`'a' | 'b'`).
fn literal_keys(ty: &TsType) -> Vec<String> {
    match ty {
        TsType::TsLitType(lit) => match &lit.lit {
            TsLit::Str(s) => s.value.as_str().map(|s| vec![s.to_string()]).unwrap_or_default(),
            _ => Vec::new(),
        },
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
            union.types.iter().flat_map(|t| literal_keys(t)).collect()
        }
        TsType::TsParenthesizedType(paren) => literal_keys(&paren.type_ann),
        _ => Vec::new(),
    }
}

fn member_key(key: &Expr) -> Option<String> {
    match key {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        other => string_literal(other),
    }
}

/// `Name` or `ns.Name` of an `extends` / `implements` clause.
pub fn heritage_name(expr: &Expr) -> Option<(Option<&str>, &str)> {
    match expr {
        Expr::Ident(ident) => Some((None, ident.sym.as_str())),
        Expr::Member(member) => {
            let Expr::Ident(object) = &*member.obj else {
                return None;
            };
            match &member.prop {
                MemberProp::Ident(prop) => Some((Some(object.sym.as_str()), prop.sym.as_str())),
                _ => None,
            }
        }
        _ => None,
    }
}

pub fn first_param_type(params: &[TsFnParam]) -> Option<&TsType> {
    match params.first()? {
        TsFnParam::Ident(binding) => binding.type_ann.as_ref().map(|ann| &*ann.type_ann),
        TsFnParam::Object(object) => object.type_ann.as_ref().map(|ann| &*ann.type_ann),
        TsFnParam::Array(array) => array.type_ann.as_ref().map(|ann| &*ann.type_ann),
        TsFnParam::Rest(_) => None,
    }
}

struct ClassField<'p> {
    name: String,
    ty: Option<&'p TsType>,
    optional: bool,
    anchor: BytePos,
}

/// Public instance fields of a class, read as a structural type.
fn class_fields(class: &Class) -> Vec<ClassField<'_>> {
    class
        .body
        .iter()
        .filter_map(|member| match member {
            ClassMember::ClassProp(prop)
                if !prop.is_static
                    && !matches!(
                        prop.accessibility,
                        Some(Accessibility::Private) | Some(Accessibility::Protected)
                    ) =>
            {
                Some(ClassField {
                    name: prop_name(&prop.key)?,
                    ty: prop.type_ann.as_ref().map(|ann| &*ann.type_ann),
                    optional: prop.is_optional,
                    anchor: prop.span.lo,
                })
            }
            _ => None,
        })
        .collect()
}

fn merge_members<'p>(all: &mut Vec<ShapeMember<'p>>, members: Vec<ShapeMember<'p>>) {
    for member in members {
        all.retain(|m| m.name != member.name);
        all.push(member);
    }
}

fn enum_values(ts_enum: &TsEnumDecl) -> Vec<(String, LiteralValue)> {
    let mut next = 0.0;
    let mut values = Vec::new();
    for member in &ts_enum.members {
        let name = match &member.id {
            TsEnumMemberId::Ident(ident) => ident.sym.to_string(),
            TsEnumMemberId::Str(s) => s.value.to_string_lossy().to_string(),
        };
        let value = match member.init.as_deref() {
            None => LiteralValue::Number(next),
            Some(init) => {
                if let Some(s) = string_literal(init) {
                    LiteralValue::String(s)
                } else if let Some(n) = number_literal(init) {
                    LiteralValue::Number(n)
                } else if let Expr::Lit(Lit::Str(s)) = init {
                    LiteralValue::String(s.value.to_string_lossy().to_string())
                } else {
                    continue;
                }
            }
        };
        if let LiteralValue::Number(n) = value {
            next = n + 1.0;
        }
        values.push((name, value));
    }
    values
}

fn enum_schema(ts_enum: &TsEnumDecl) -> SchemaModel {
    let members = enum_values(ts_enum)
        .into_iter()
        .map(|(_, value)| SchemaModel::literal(value))
        .collect::<Vec<_>>();
    if members.is_empty() {
        return SchemaModel::Unconstrained;
    }
    classify_union(members)
}

fn enum_member_value(ts_enum: &TsEnumDecl, member: &str) -> Option<LiteralValue> {
    enum_values(ts_enum)
        .into_iter()
        .find(|(name, _)| name == member)
        .map(|(_, value)| value)
}
