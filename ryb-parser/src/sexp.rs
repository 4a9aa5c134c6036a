//! The sub-parser for inline low-level directives (`%s( ... )`).
//!
//! Directive bodies are plain nested lists of atoms, literals and operator
//! names; reserved words lose their keyword meaning inside a directive.

use ryb_core::ast::{Expr, ExprKind};
use ryb_lexer::TokenKind;

use crate::error::{ParseError, ParseResult};
use crate::grammar::Parser;

pub(crate) fn parse_sexp(p: &mut Parser<'_>) -> ParseResult<Expr> {
    let start = p.stream.position();
    if !p.stream.eat(&TokenKind::SexpBegin) {
        return Ok(None);
    }
    let elements = parse_elements(p)?;
    Ok(Some(Expr::new(
        p.stream.span_from(start),
        ExprKind::Sexp(elements),
    )))
}

fn parse_elements(p: &mut Parser<'_>) -> Result<Vec<Expr>, ParseError> {
    let mut elements = Vec::new();
    loop {
        p.stream.skip_newlines();
        let token = match p.stream.peek() {
            Some(token) => token.clone(),
            None => return Err(p.expected_err("')' for open '%s('")),
        };
        let kind = match token.kind {
            TokenKind::RParen => {
                p.stream.bump();
                return Ok(elements);
            }
            TokenKind::LParen => {
                p.stream.bump();
                let inner = parse_elements(p)?;
                let span = p.stream.span_from(token.span.from);
                elements.push(Expr::new(span, ExprKind::List(inner)));
                continue;
            }
            TokenKind::Atom(name) => ExprKind::Name(name),
            TokenKind::Keyword(keyword) => ExprKind::Name(keyword.as_str().to_string()),
            TokenKind::LitInteger(value) => ExprKind::Integer(value),
            TokenKind::LitString(value) => ExprKind::Str(value),
            TokenKind::LitSymbol(value) => ExprKind::Symbol(value),
            ref other => match operator_text(other) {
                Some(text) => ExprKind::Name(text.to_string()),
                None => return Err(p.expected_err("element or ')' in '%s(' directive")),
            },
        };
        p.stream.bump();
        elements.push(Expr::new(token.span, kind));
    }
}

fn operator_text(kind: &TokenKind) -> Option<&'static str> {
    let text = match kind {
        TokenKind::Assign => "=",
        TokenKind::EqEq => "==",
        TokenKind::Ne => "!=",
        TokenKind::Lt => "<",
        TokenKind::Gt => ">",
        TokenKind::Le => "<=",
        TokenKind::Ge => ">=",
        TokenKind::Shl => "<<",
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        TokenKind::Amp => "&",
        TokenKind::Pipe => "|",
        TokenKind::Bang => "!",
        TokenKind::Dot => ".",
        _ => return None,
    };
    Some(text)
}
