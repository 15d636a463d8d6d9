//! Source file parsing.
//!
//! - `source`: TS/TSX/JS source parser (uses swc for AST generation)

pub mod source;
