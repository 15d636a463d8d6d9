//! Structured metadata from JSDoc blocks.
//!
//! Recognized tags:
//!
//! - `@default` / `@defaultValue`: default value, parsed as JSON when possible
//! - `@deprecated`
//! - `@attribute` / `@attr`: external property name
//! - `@event` / `@eventName`: event name of a callback member
//! - `@fires` / `@fire` / `@emits`: `name` or `name - description`, with an
//!   optional leading `{Type}`
//! - `@description`: used when the block has no leading free text

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use swc_common::BytePos;
use swc_ecma_ast::{Expr, Lit};

use crate::core::{
    collect::helpers::{bool_literal, number_literal, string_literal, unwrap_ts_expr},
    program::SourceFile,
};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][\w-]*)\s*(.*)$").expect("valid tag regex"));

static FIRES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\{[^}]*\}\s*)?(\S+)(?:\s+-?\s*(.*))?$").expect("valid fires regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiresEntry {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocBlock {
    pub description: Option<String>,
    pub default: Option<Value>,
    pub deprecated: bool,
    pub attribute: Option<String>,
    pub event_name: Option<String>,
    pub fires: Vec<FiresEntry>,
}

/// Parse the text of a `/** ... */` comment (without the delimiters).
pub fn parse_doc_block(raw: &str) -> DocBlock {
    let mut free_text: Vec<&str> = Vec::new();
    let mut tags: Vec<(String, String)> = Vec::new();

    for line in raw.lines() {
        let line = clean_line(line);
        if let Some(caps) = TAG_RE.captures(line) {
            tags.push((caps[1].to_string(), caps[2].trim().to_string()));
        } else if let Some((_, text)) = tags.last_mut() {
            if !line.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(line);
            }
        } else {
            free_text.push(line);
        }
    }

    let mut doc = DocBlock {
        description: non_empty(free_text.join("\n").trim()),
        ..Default::default()
    };

    for (tag, text) in tags {
        match tag.as_str() {
            "default" | "defaultValue" => doc.default = parse_default(&text),
            "deprecated" => doc.deprecated = true,
            "attribute" | "attr" => doc.attribute = first_word(&text),
            "event" | "eventName" => doc.event_name = first_word(&text),
            "fires" | "fire" | "emits" => {
                if let Some(entry) = parse_fires(&text) {
                    doc.fires.push(entry);
                }
            }
            "description" if doc.description.is_none() => doc.description = non_empty(&text),
            _ => {}
        }
    }

    doc
}

/// Documentation attached to the first anchor that carries a doc block.
pub fn docs_at(file: &SourceFile, anchors: &[BytePos]) -> DocBlock {
    anchors
        .iter()
        .find_map(|&pos| file.parsed.comments.doc_block_at(pos))
        .map(parse_doc_block)
        .unwrap_or_default()
}

/// Default value of a primitive literal initializer.
pub fn literal_default(expr: &Expr) -> Option<Value> {
    if let Some(s) = string_literal(expr) {
        return Some(Value::String(s));
    }
    if let Some(n) = number_literal(expr) {
        return number_value(n);
    }
    if let Some(b) = bool_literal(expr) {
        return Some(Value::Bool(b));
    }
    match unwrap_ts_expr(expr) {
        Expr::Lit(Lit::Null(_)) => Some(Value::Null),
        _ => None,
    }
}

pub fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(Value::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

fn clean_line(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix('*').unwrap_or(line);
    line.trim()
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

fn first_word(text: &str) -> Option<String> {
    text.split_whitespace().next().map(str::to_string)
}

fn parse_default(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return Some(Value::String(text[1..text.len() - 1].to_string()));
    }
    Some(Value::String(text.to_string()))
}

fn parse_fires(text: &str) -> Option<FiresEntry> {
    let caps = FIRES_RE.captures(text.trim())?;
    Some(FiresEntry {
        name: caps[1].to_string(),
        description: caps.get(2).and_then(|m| non_empty(m.as_str().trim())),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use swc_common::Spanned;
    use swc_ecma_ast::{Decl, ModuleItem, Stmt};

    use super::*;
    use crate::core::program::Program;

    #[test]
    fn test_description_and_tags() {
        let doc = parse_doc_block(
            "*\n * A labelled button.\n * Second line.\n *\n * @attribute btn-label\n * @deprecated use x-action\n ",
        );
        assert_eq!(doc.description.as_deref(), Some("A labelled button.\nSecond line."));
        assert_eq!(doc.attribute.as_deref(), Some("btn-label"));
        assert!(doc.deprecated);
    }

    #[test]
    fn test_default_values() {
        assert_eq!(parse_doc_block("* @default 42 ").default, Some(json!(42)));
        assert_eq!(parse_doc_block("* @default 'md' ").default, Some(json!("md")));
        assert_eq!(parse_doc_block("* @defaultValue \"md\" ").default, Some(json!("md")));
        assert_eq!(parse_doc_block("* @default false ").default, Some(json!(false)));
        assert_eq!(
            parse_doc_block("* @default new Date() ").default,
            Some(json!("new Date()"))
        );
    }

    #[test]
    fn test_fires_entries() {
        let doc = parse_doc_block(
            "*\n * @fires saved - Fired after saving.\n * @fires {CustomEvent<string>} closed\n * @emits opened Emitted on open\n ",
        );
        assert_eq!(
            doc.fires,
            vec![
                FiresEntry {
                    name: "saved".into(),
                    description: Some("Fired after saving.".into()),
                },
                FiresEntry {
                    name: "closed".into(),
                    description: None,
                },
                FiresEntry {
                    name: "opened".into(),
                    description: Some("Emitted on open".into()),
                },
            ]
        );
    }

    #[test]
    fn test_event_name_override() {
        let doc = parse_doc_block("* Called on change.\n * @event value-change ");
        assert_eq!(doc.event_name.as_deref(), Some("value-change"));
        assert_eq!(doc.description.as_deref(), Some("Called on change."));
    }

    #[test]
    fn test_multiline_tag_text_is_joined() {
        let doc = parse_doc_block("*\n * @fires saved - Fired after\n *   saving completes.\n ");
        assert_eq!(
            doc.fires[0].description.as_deref(),
            Some("Fired after saving completes.")
        );
    }

    #[test]
    fn test_docs_at_reads_attached_block() {
        let program = Program::from_sources(
            Path::new("/project"),
            &[(
                "src/a.ts",
                "/**\n * The size.\n * @default 3\n */\nconst size = 3;\n",
            )],
        )
        .unwrap();
        let file = program.file_by_relative("src/a.ts").unwrap();
        let (pos, init) = match &file.parsed.module.body[0] {
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                (var.span().lo, var.decls[0].init.as_deref().unwrap())
            }
            _ => panic!("expected variable"),
        };

        let doc = docs_at(file, &[pos]);
        assert_eq!(doc.description.as_deref(), Some("The size."));
        assert_eq!(doc.default, Some(json!(3)));
        assert_eq!(literal_default(init), Some(json!(3)));
    }

    #[test]
    fn test_literal_default_only_accepts_primitives() {
        let program = Program::from_sources(
            Path::new("/project"),
            &[(
                "src/a.ts",
                "const a = 'x'; const b = -1.5; const c = true; const d = null; const e = [1];",
            )],
        )
        .unwrap();
        let file = program.file_by_relative("src/a.ts").unwrap();
        let defaults: Vec<_> = file
            .parsed
            .module
            .body
            .iter()
            .map(|item| match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                    literal_default(var.decls[0].init.as_deref().unwrap())
                }
                _ => panic!("expected variable"),
            })
            .collect();
        assert_eq!(
            defaults,
            vec![
                Some(json!("x")),
                Some(json!(-1.5)),
                Some(json!(true)),
                Some(json!(null)),
                None
            ]
        );
    }
}
