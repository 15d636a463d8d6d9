//! Helper functions for AST node extraction.
//!
//! Pure functions with no state dependencies, shared by the collectors and
//! the extractors.

use swc_ecma_ast::{
    Callee, Decorator, Expr, Lit, MemberProp, ModuleExportName, ObjectLit, Prop, PropName,
    PropOrSpread, UnaryOp,
};

/// Unwrap TypeScript-specific expression wrappers to get the inner expression.
pub fn unwrap_ts_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::TsAs(ts_as) => unwrap_ts_expr(&ts_as.expr),
        Expr::TsConstAssertion(ts_const) => unwrap_ts_expr(&ts_const.expr),
        Expr::TsSatisfies(ts_sat) => unwrap_ts_expr(&ts_sat.expr),
        Expr::TsNonNull(non_null) => unwrap_ts_expr(&non_null.expr),
        Expr::TsTypeAssertion(assertion) => unwrap_ts_expr(&assertion.expr),
        Expr::Paren(paren) => unwrap_ts_expr(&paren.expr),
        _ => expr,
    }
}

/// String value of a string literal or a template literal without substitutions.
pub fn string_literal(expr: &Expr) -> Option<String> {
    match unwrap_ts_expr(expr) {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
            .quasis
            .first()
            .and_then(|q| q.cooked.as_ref())
            .and_then(|s| s.as_str().map(|s| s.to_string())),
        _ => None,
    }
}

pub fn bool_literal(expr: &Expr) -> Option<bool> {
    match unwrap_ts_expr(expr) {
        Expr::Lit(Lit::Bool(b)) => Some(b.value),
        _ => None,
    }
}

/// Numeric literal, including a unary minus in front of one.
pub fn number_literal(expr: &Expr) -> Option<f64> {
    match unwrap_ts_expr(expr) {
        Expr::Lit(Lit::Num(n)) => Some(n.value),
        Expr::Unary(unary) if unary.op == UnaryOp::Minus => {
            number_literal(&unary.arg).map(|n| -n)
        }
        _ => None,
    }
}

pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(|s| s.to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

pub fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string_lossy().to_string(),
    }
}

/// Name of the called function: `foo(..)` → `foo`, `a.b.foo(..)` → `foo`.
pub fn callee_name(callee: &Callee) -> Option<&str> {
    match callee {
        Callee::Expr(expr) => expr_name(expr),
        _ => None,
    }
}

/// Identifier name or the last segment of a member chain.
pub fn expr_name(expr: &Expr) -> Option<&str> {
    match unwrap_ts_expr(expr) {
        Expr::Ident(ident) => Some(ident.sym.as_str()),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(prop) => Some(prop.sym.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// Name a decorator is invoked by: `@foo`, `@foo()`, `@ns.foo(..)`.
pub fn decorator_name(decorator: &Decorator) -> Option<&str> {
    match &*decorator.expr {
        Expr::Call(call) => callee_name(&call.callee),
        other => expr_name(other),
    }
}

/// Value of a `key: value` entry in an object literal.
pub fn object_entry<'a>(obj: &'a ObjectLit, key: &str) -> Option<&'a Expr> {
    obj.props.iter().find_map(|prop| match prop {
        PropOrSpread::Prop(prop) => match &**prop {
            Prop::KeyValue(kv) if prop_name(&kv.key).as_deref() == Some(key) => Some(&*kv.value),
            _ => None,
        },
        PropOrSpread::Spread(_) => None,
    })
}

/// String value of `key: '...'` in an object literal.
pub fn object_string_entry(obj: &ObjectLit, key: &str) -> Option<String> {
    object_entry(obj, key).and_then(string_literal)
}
