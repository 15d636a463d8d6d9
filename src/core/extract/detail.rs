//! Structural inference of value expressions.
//!
//! Used for event `detail` payloads and for the type of an unannotated field
//! initializer. Only literal structure is read; names and calls are opaque.

use swc_ecma_ast::{Expr, Lit, Prop, PropOrSpread, UnaryOp};

use super::ExtractContext;
use crate::core::{
    collect::helpers::prop_name,
    schema::{ObjectSchema, SchemaModel},
};

/// Infer a schema from a literal value expression.
///
/// Returns `None` when the expression itself is opaque (an identifier, a
/// call, ...). Opaque values nested inside a literal are unconstrained.
pub fn infer_value(expr: &Expr, cx: &ExtractContext<'_, '_>) -> Option<SchemaModel> {
    match expr {
        Expr::TsAs(ts_as) => Some(cx.resolve_type(&ts_as.type_ann)),
        Expr::TsTypeAssertion(assertion) => Some(cx.resolve_type(&assertion.type_ann)),
        Expr::TsSatisfies(satisfies) => infer_value(&satisfies.expr, cx),
        Expr::TsConstAssertion(constant) => infer_value(&constant.expr, cx),
        Expr::TsNonNull(non_null) => infer_value(&non_null.expr, cx),
        Expr::Paren(paren) => infer_value(&paren.expr, cx),
        Expr::Lit(lit) => Some(match lit {
            Lit::Str(_) => SchemaModel::string(),
            Lit::Num(_) | Lit::BigInt(_) => SchemaModel::number(),
            Lit::Bool(_) => SchemaModel::boolean(),
            Lit::Null(_) => SchemaModel::Unconstrained,
            _ => return None,
        }),
        Expr::Tpl(_) => Some(SchemaModel::string()),
        Expr::Unary(unary) => match unary.op {
            UnaryOp::Minus | UnaryOp::Plus if matches!(&*unary.arg, Expr::Lit(Lit::Num(_))) => {
                Some(SchemaModel::number())
            }
            _ => None,
        },
        Expr::Object(object) => {
            let mut schema = ObjectSchema::default();
            for prop in &object.props {
                let PropOrSpread::Prop(prop) = prop else {
                    continue;
                };
                match &**prop {
                    Prop::KeyValue(kv) => {
                        if let Some(name) = prop_name(&kv.key) {
                            let value = infer_value(&kv.value, cx).unwrap_or_default();
                            schema.properties.insert(name, value);
                        }
                    }
                    Prop::Shorthand(ident) => {
                        schema
                            .properties
                            .insert(ident.sym.to_string(), SchemaModel::Unconstrained);
                    }
                    _ => {}
                }
            }
            Some(SchemaModel::Object(schema))
        }
        Expr::Array(array) => {
            let items = array
                .elems
                .iter()
                .flatten()
                .find(|element| element.spread.is_none())
                .and_then(|element| infer_value(&element.expr, cx))
                .unwrap_or_default();
            Some(SchemaModel::array(items))
        }
        _ => None,
    }
}
