//! Lossless syntax trees and the reference parser that builds them.
//!
//! ```
//! use lintel_core::syntax::{parse, NodeKind};
//!
//! let tree = parse("foo ()").unwrap();
//! assert_eq!(tree.text(), "foo ()");
//! assert!(tree.root().descendants().any(|n| n.is(NodeKind::FunctionCallExpr)));
//! ```

pub mod ast;
mod kind;
mod lexer;
mod parser;
mod tree;
mod trivia;

pub use kind::{Keyword, NodeKind, SyntaxKind, TokenKind};
pub use lexer::tokenize;
pub use parser::MAX_NESTING_DEPTH;
pub use tree::{
    Checkpoint, NodeId, Presence, SyntaxNode, SyntaxToken, SyntaxTree, TokenData, TreeBuilder,
    ViewMode,
};
pub use trivia::{Trivia, TriviaPiece};

use crate::error::ParseFailure;

/// Parses `source` into a tree.
///
/// # Errors
///
/// Returns [`ParseFailure`] when the source cannot be tokenized at all or
/// nests deeper than [`MAX_NESTING_DEPTH`]. Other structural errors never
/// fail; they surface as missing and unexpected nodes in the tree.
pub fn parse(source: &str) -> Result<SyntaxTree, ParseFailure> {
    let tokens = tokenize(source)?;
    parser::parse_tokens(tokens)
}
