use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::Arc;
use swc_common::{
    BytePos, FileName, Globals, SourceMap,
    comments::{Comment, CommentKind, SingleThreadedComments},
};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// Map of byte positions to comments.
pub type CommentMap = HashMap<BytePos, Vec<Comment>>;

/// Thread-safe extracted comments from SingleThreadedComments.
/// Extracted during parsing and stored independently of swc types.
#[derive(Debug, Clone, Default)]
pub struct ExtractedComments {
    pub leading: CommentMap,
    pub trailing: CommentMap,
}

impl ExtractedComments {
    /// Extract comments from SingleThreadedComments.
    /// This must be called before SingleThreadedComments is dropped.
    pub fn from_swc(comments: &SingleThreadedComments) -> Self {
        let (leading, trailing) = comments.borrow_all();
        Self {
            leading: leading.iter().map(|(k, v)| (*k, v.clone())).collect(),
            trailing: trailing.iter().map(|(k, v)| (*k, v.clone())).collect(),
        }
    }

    /// The JSDoc block (`/** ... */`) closest to the token at `pos`, if any.
    ///
    /// Returned text still carries the leading `*` of the opening delimiter.
    pub fn doc_block_at(&self, pos: BytePos) -> Option<&str> {
        self.leading.get(&pos)?.iter().rev().find_map(|comment| {
            let is_doc = matches!(comment.kind, CommentKind::Block) && comment.text.starts_with('*');
            is_doc.then(|| &*comment.text)
        })
    }
}

pub struct ParsedSource {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    pub comments: ExtractedComments,
}

impl ParsedSource {
    /// 1-based line number of a byte position.
    pub fn line_of(&self, pos: BytePos) -> usize {
        self.source_map.lookup_char_pos(pos).line
    }
}

/// Pick the parser syntax from the file name.
///
/// Plain `.ts` files are parsed without JSX so that `<T>(x) => x` and
/// `<T>value` keep their TypeScript meaning.
fn syntax_for(file_path: &str) -> Syntax {
    let is_plain_ts = [".ts", ".mts", ".cts"]
        .iter()
        .any(|ext| file_path.ends_with(ext));
    Syntax::Typescript(TsSyntax {
        tsx: !is_plain_ts,
        decorators: true,
        dts: file_path.ends_with(".d.ts"),
        ..Default::default()
    })
}

/// Parse TS/TSX/JS source code string into an AST.
///
/// Accepts a shared SourceMap for thread-safe parallel parsing.
pub fn parse_source(code: String, file_path: &str, source_map: Arc<SourceMap>) -> Result<ParsedSource> {
    use swc_common::GLOBALS;

    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(
            syntax_for(file_path),
            StringInput::from(&*source_file),
            Some(&comments),
        );

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {:?}", file_path, e.kind()))?;

        // Extract comments immediately (before SingleThreadedComments drops)
        let extracted_comments = ExtractedComments::from_swc(&comments);

        Ok(ParsedSource {
            module,
            source_map,
            comments: extracted_comments,
        })
    })
}
