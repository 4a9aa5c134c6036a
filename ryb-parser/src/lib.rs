//!
//! This crate serves as the syntactical analyser for the Ryb bootstrap
//! compiler.
//!
//! The grammar engine is an ordered-alternative recursive-descent parser
//! with two embedded sub-parsers: an operator-precedence parser for plain
//! expressions, and a reader for inline `%s( ... )` low-level directives.
//! `require` statements with literal targets are statically resolved and
//! inlined while parsing; the include resolver memoises each required
//! source for the whole run and breaks require cycles.
//!

/// Fatal errors and the rule-outcome type.
pub mod error;
/// The grammar engine.
pub mod grammar;
/// The static include resolver.
pub mod resolve;
/// The low-level directive sub-parser.
mod sexp;
/// The operator-precedence sub-parser.
mod shunting;
/// The token cursor.
mod stream;

pub use crate::error::{ParseError, ParseResult};
pub use crate::grammar::Parser;
pub use crate::resolve::{DiskLoader, Options, Resolver, SourceLoader};

use ryb_core::ast::Expr;
use ryb_lexer::{Lexer, Token};

/// Parses an entire program into a tree, using (and filling) the given
/// resolver's require cache.
pub fn parse_program(source: &str, resolver: &mut Resolver) -> Result<Expr, ParseError> {
    let tokens: Vec<Token> = Lexer::new(source).skip_comments(true).collect();
    let mut parser = Parser::new(tokens, source.len(), resolver);
    parser.parse_program(true)
}
