//! The operator-precedence sub-parser for plain expressions.
//!
//! The grammar engine drives this through one entry point,
//! [`parse_expression`], passing the set of keywords that must terminate
//! the expression instead of being consumed by it (notably `do`, so that
//! `while cond do ... end` keeps the block for the `while`).

use ryb_core::ast::{Expr, ExprKind};
use ryb_core::span::Span;
use ryb_lexer::{Keyword, TokenKind};

use crate::error::{ParseError, ParseResult};
use crate::grammar::Parser;

/// The binary operator table: textual form, precedence, right-associativity.
fn binary_op(kind: &TokenKind) -> Option<(&'static str, u8, bool)> {
    let op = match kind {
        TokenKind::Assign => ("=", 1, true),
        TokenKind::OrOr => ("||", 2, false),
        TokenKind::AndAnd => ("&&", 3, false),
        TokenKind::EqEq => ("==", 4, false),
        TokenKind::Ne => ("!=", 4, false),
        TokenKind::Lt => ("<", 5, false),
        TokenKind::Gt => (">", 5, false),
        TokenKind::Le => ("<=", 5, false),
        TokenKind::Ge => (">=", 5, false),
        TokenKind::Shl => ("<<", 6, false),
        TokenKind::Plus => ("+", 7, false),
        TokenKind::Minus => ("-", 7, false),
        TokenKind::Star => ("*", 8, false),
        TokenKind::Slash => ("/", 8, false),
        TokenKind::Percent => ("%", 8, false),
        _ => return None,
    };
    Some(op)
}

/// Parses one expression, or returns `Ok(None)` without consuming input if
/// the next token cannot start one.
pub(crate) fn parse_expression(p: &mut Parser<'_>, inhibit: &[Keyword]) -> ParseResult<Expr> {
    let lhs = match parse_operand(p, inhibit)? {
        Some(expr) => expr,
        None => return Ok(None),
    };
    parse_binary(p, inhibit, lhs, 0).map(Some)
}

fn parse_binary(
    p: &mut Parser<'_>,
    inhibit: &[Keyword],
    mut lhs: Expr,
    min_prec: u8,
) -> Result<Expr, ParseError> {
    while let Some((op, prec, _)) = p.stream.peek_kind().and_then(binary_op) {
        if prec < min_prec {
            break;
        }
        p.stream.bump();
        // Line breaks are allowed after a binary operator.
        p.stream.skip_newlines();
        let mut rhs = match parse_operand(p, inhibit)? {
            Some(expr) => expr,
            None => return Err(p.expected_err(&format!("expression after '{}'", op))),
        };
        loop {
            match p.stream.peek_kind().and_then(binary_op) {
                Some((_, next, right_assoc)) if next > prec || (next == prec && right_assoc) => {
                    let min = if next > prec { prec + 1 } else { prec };
                    rhs = parse_binary(p, inhibit, rhs, min)?;
                }
                _ => break,
            }
        }
        let span = Span::between(lhs.span, rhs.span);
        lhs = if op == "=" {
            Expr::new(
                span,
                ExprKind::Assign {
                    target: Box::new(lhs),
                    value: Box::new(rhs),
                },
            )
        } else {
            Expr::new(
                span,
                ExprKind::Binary {
                    op: op.to_string(),
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
            )
        };
    }
    Ok(lhs)
}

fn parse_operand(p: &mut Parser<'_>, inhibit: &[Keyword]) -> ParseResult<Expr> {
    let start = p.stream.position();
    for (token, op) in &[(TokenKind::Minus, "-"), (TokenKind::Bang, "!")] {
        if p.stream.eat(token) {
            let operand = match parse_operand(p, inhibit)? {
                Some(expr) => expr,
                None => return Err(p.expected_err(&format!("expression after '{}'", op))),
            };
            return Ok(Some(Expr::new(
                p.stream.span_from(start),
                ExprKind::Unary {
                    op: (*op).to_string(),
                    expr: Box::new(operand),
                },
            )));
        }
    }

    let mut expr = match parse_primary(p, inhibit)? {
        Some(expr) => expr,
        None => return Ok(None),
    };

    loop {
        if p.stream.eat(&TokenKind::Dot) {
            let name = match p.stream.eat_atom() {
                Some((name, _)) => name,
                None => return Err(p.expected_err("method name after '.'")),
            };
            let args = parse_call_args(p)?;
            let block = parse_attached_block(p, inhibit)?;
            expr = Expr::new(
                p.stream.span_from(start),
                ExprKind::Call {
                    receiver: Some(Box::new(expr)),
                    name,
                    args,
                    block,
                },
            );
            continue;
        }
        if let ExprKind::Name(name) = &expr.kind {
            if matches!(p.stream.peek_kind(), Some(TokenKind::LParen)) {
                let name = name.clone();
                let args = parse_call_args(p)?;
                let block = parse_attached_block(p, inhibit)?;
                expr = Expr::new(
                    p.stream.span_from(start),
                    ExprKind::Call {
                        receiver: None,
                        name,
                        args,
                        block,
                    },
                );
                continue;
            }
            if at_block_start(p, inhibit) {
                let name = name.clone();
                let block = parse_attached_block(p, inhibit)?;
                expr = Expr::new(
                    p.stream.span_from(start),
                    ExprKind::Call {
                        receiver: None,
                        name,
                        args: Vec::new(),
                        block,
                    },
                );
                continue;
            }
        }
        break;
    }
    Ok(Some(expr))
}

fn parse_primary(p: &mut Parser<'_>, _inhibit: &[Keyword]) -> ParseResult<Expr> {
    if let Some(directive) = p.parse_sexp()? {
        return Ok(Some(directive));
    }
    let token = match p.stream.peek() {
        Some(token) => token.clone(),
        None => return Ok(None),
    };
    match token.kind {
        TokenKind::LitInteger(value) => {
            p.stream.bump();
            Ok(Some(Expr::new(token.span, ExprKind::Integer(value))))
        }
        TokenKind::LitBigInteger(_) => Err(ParseError::new(
            token.span.from,
            "integer literal out of range for the bootstrap subset",
        )),
        TokenKind::LitString(value) => {
            p.stream.bump();
            Ok(Some(Expr::new(token.span, ExprKind::Str(value))))
        }
        TokenKind::LitSymbol(value) => {
            p.stream.bump();
            Ok(Some(Expr::new(token.span, ExprKind::Symbol(value))))
        }
        TokenKind::Atom(name) => {
            p.stream.bump();
            Ok(Some(Expr::new(token.span, ExprKind::Name(name))))
        }
        TokenKind::LParen => {
            p.stream.bump();
            p.stream.skip_newlines();
            let inner = match parse_expression(p, &[])? {
                Some(expr) => expr,
                None => return Err(p.expected_err("expression")),
            };
            p.stream.skip_newlines();
            if !p.stream.eat(&TokenKind::RParen) {
                return Err(p.expected_err("')'"));
            }
            Ok(Some(inner))
        }
        _ => Ok(None),
    }
}

/// Argument list of a call, when parenthesised. A call without parentheses
/// has no arguments other than a possibly attached block.
fn parse_call_args(p: &mut Parser<'_>) -> Result<Vec<Expr>, ParseError> {
    let mut args = Vec::new();
    if !p.stream.eat(&TokenKind::LParen) {
        return Ok(args);
    }
    p.stream.skip_newlines();
    if p.stream.eat(&TokenKind::RParen) {
        return Ok(args);
    }
    loop {
        let arg = match parse_expression(p, &[])? {
            Some(expr) => expr,
            None => return Err(p.expected_err("argument")),
        };
        args.push(arg);
        p.stream.skip_newlines();
        if p.stream.eat(&TokenKind::Comma) {
            p.stream.skip_newlines();
            continue;
        }
        if p.stream.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        return Err(p.expected_err("')'"));
    }
}

fn at_block_start(p: &Parser<'_>, inhibit: &[Keyword]) -> bool {
    match p.stream.peek_kind() {
        Some(TokenKind::LBrace) => true,
        Some(TokenKind::Keyword(Keyword::Do)) => !inhibit.contains(&Keyword::Do),
        _ => false,
    }
}

fn parse_attached_block(
    p: &mut Parser<'_>,
    inhibit: &[Keyword],
) -> Result<Option<Box<Expr>>, ParseError> {
    if !at_block_start(p, inhibit) {
        return Ok(None);
    }
    Ok(p.parse_block()?.map(Box::new))
}
