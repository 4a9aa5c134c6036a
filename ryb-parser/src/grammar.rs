//! The grammar engine: backtracking-free, ordered-alternative recursive
//! descent over the token stream.
//!
//! Each rule mirrors one production of the grammar. Rules used as
//! alternatives return `Ok(None)` without consuming input when their
//! leading token is absent; once a rule has consumed its leading keyword it
//! is committed, and any missing follow-on construct fails the whole parse
//! with a positioned error.

use ryb_core::ast::{ClassName, DefKind, Expr, ExprKind, MethodName, Param, Rescue, When};
use ryb_core::span::Span;
use ryb_lexer::{Keyword, Token, TokenKind};

use crate::error::{ParseError, ParseResult};
use crate::resolve::{Resolver, BOOTSTRAP_SOURCE};
use crate::sexp;
use crate::shunting;
use crate::stream::TokenStream;

/// The recursive-descent parser for one source file.
///
/// Statically required sources are parsed by fresh `Parser` instances
/// created by the shared [`Resolver`], which also carries the options for
/// the whole compilation run.
pub struct Parser<'r> {
    pub(crate) stream: TokenStream,
    resolver: &'r mut Resolver,
}

impl<'r> Parser<'r> {
    pub fn new(tokens: Vec<Token>, source_len: usize, resolver: &'r mut Resolver) -> Self {
        Self {
            stream: TokenStream::new(tokens, source_len),
            resolver,
        }
    }

    /// Consume whitespace, line breaks included.
    ///
    /// Whitespace that must not span lines is simply not consumed here:
    /// spaces never reach the token stream, so staying on the same line
    /// means not calling this.
    fn ws(&mut self) {
        self.stream.skip_newlines();
    }

    pub(crate) fn expected_err(&self, what: &str) -> ParseError {
        ParseError::new(self.stream.position(), format!("expected {}", what))
    }

    fn expected<T>(&self, what: &str) -> Result<T, ParseError> {
        Err(self.expected_err(what))
    }

    /// A `do`-tagged statement sequence covering the given statements.
    fn do_node(&self, start: usize, exprs: Vec<Expr>) -> Expr {
        let span = match (exprs.first(), exprs.last()) {
            (Some(first), Some(last)) => Span::between(first.span, last.span),
            _ => Span::point(start),
        };
        Expr::new(span, ExprKind::Do(exprs))
    }

    // name ::= atom
    fn parse_name(&mut self) -> Option<(String, Span)> {
        self.stream.eat_atom()
    }

    // arglist ::= ("*" | "&")? name ("=" subexp)? ("," ws* arglist)?
    fn parse_arglist(&mut self) -> ParseResult<Vec<Param>> {
        let prefix = if self.stream.eat(&TokenKind::Star) {
            Some("*")
        } else if self.stream.eat(&TokenKind::Amp) {
            Some("&")
        } else {
            None
        };
        if prefix.is_some() {
            self.ws();
        }
        let name = match self.parse_name() {
            Some((name, _)) => name,
            None => match prefix {
                Some(prefix) => {
                    return self.expected(&format!("argument name following '{}'", prefix))
                }
                None => return Ok(None),
            },
        };
        let param = match prefix {
            Some("*") => Param::Rest(name),
            Some(_) => Param::Block(name),
            None if self.stream.eat(&TokenKind::Assign) => {
                let default = match shunting::parse_expression(self, &[])? {
                    Some(expr) => expr,
                    None => {
                        return self.expected(&format!("default value for argument '{}'", name))
                    }
                };
                Param::Default(name, default)
            }
            None => Param::Plain(name),
        };
        let mut params = vec![param];
        // The separator must stay on the same line as the entry; a line
        // break here ends the list instead.
        if !self.stream.eat(&TokenKind::Comma) {
            return Ok(Some(params));
        }
        self.ws();
        match self.parse_arglist()? {
            Some(more) => params.extend(more),
            None => return self.expected("argument"),
        }
        Ok(Some(params))
    }

    // args ::= "(" ws* arglist? ws* ")" | arglist
    fn parse_args(&mut self) -> ParseResult<Vec<Param>> {
        if self.stream.eat(&TokenKind::LParen) {
            self.ws();
            let params = self.parse_arglist()?.unwrap_or_default();
            self.ws();
            if !self.stream.eat(&TokenKind::RParen) {
                return self.expected("')'");
            }
            return Ok(Some(params));
        }
        self.parse_arglist()
    }

    // condition ::= sexp | subexp
    //
    // `do` is inhibited so that in `while cond do ... end` the block stays
    // with the `while` instead of attaching to a call in the condition.
    fn parse_condition(&mut self) -> ParseResult<Expr> {
        if let Some(directive) = self.parse_sexp()? {
            return Ok(Some(directive));
        }
        shunting::parse_expression(self, &[Keyword::Do])
    }

    // if_unless ::= ("if" | "unless") if_body
    fn parse_if_unless(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        let negated = if self.stream.eat_keyword(Keyword::If) {
            false
        } else if self.stream.eat_keyword(Keyword::Unless) {
            true
        } else {
            return Ok(None);
        };
        self.parse_if_body(start, negated).map(Some)
    }

    // if_body ::= ws* condition ";"? "then"? ws* defexp*
    //             ("elsif" if_body | ("else" defexp*)? "end")
    fn parse_if_body(&mut self, start: usize, negated: bool) -> Result<Expr, ParseError> {
        let keyword = if negated { "unless" } else { "if" };
        self.ws();
        let cond = match self.parse_condition()? {
            Some(cond) => cond,
            None => return self.expected(&format!("condition for '{}' block", keyword)),
        };
        self.stream.eat(&TokenKind::Semicolon);
        self.stream.eat_keyword(Keyword::Then);
        self.ws();
        let body_start = self.stream.position();
        let body = self.zero_or_more_defexp()?;
        self.ws();
        let els;
        let elsif_start = self.stream.position();
        if self.stream.eat_keyword(Keyword::Elsif) {
            // "if a ... elsif b ... end" is shorthand for
            // "if a ... else if b ... end end"; the recursion owns the
            // single shared "end".
            let nested = self.parse_if_body(elsif_start, false)?;
            let span = nested.span;
            els = Some(Box::new(Expr::new(span, ExprKind::Do(vec![nested]))));
        } else {
            if self.stream.eat_keyword(Keyword::Else) {
                self.ws();
                let else_start = self.stream.position();
                let exprs = self.zero_or_more_defexp()?;
                els = Some(Box::new(self.do_node(else_start, exprs)));
            } else {
                els = None;
            }
            if !self.stream.eat_keyword(Keyword::End) {
                return self.expected(&format!("expression or 'end' for open '{}'", keyword));
            }
        }
        let body = Box::new(self.do_node(body_start, body));
        Ok(Expr::new(
            self.stream.span_from(start),
            ExprKind::If {
                negated,
                cond: Box::new(cond),
                body,
                els,
            },
        ))
    }

    // when ::= "when" ws* condition ":"? ws* defexp*
    fn parse_when(&mut self) -> ParseResult<When> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::When) {
            return Ok(None);
        }
        self.ws();
        let cond = match self.parse_condition()? {
            Some(cond) => cond,
            None => return self.expected("condition for 'when'"),
        };
        self.stream.eat(&TokenKind::Colon);
        self.ws();
        let body = self.zero_or_more_defexp()?;
        Ok(Some(When {
            span: self.stream.span_from(start),
            cond,
            body,
        }))
    }

    // case ::= "case" ws* condition when* ("else" ws* defexp*)? "end"
    fn parse_case(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::Case) {
            return Ok(None);
        }
        self.ws();
        let cond = match self.parse_condition()? {
            Some(cond) => cond,
            None => return self.expected("condition for 'case' block"),
        };
        self.ws();
        let mut whens = Vec::new();
        while let Some(arm) = self.parse_when()? {
            whens.push(arm);
        }
        self.ws();
        let els = if self.stream.eat_keyword(Keyword::Else) {
            self.ws();
            Some(self.zero_or_more_defexp()?)
        } else {
            None
        };
        self.ws();
        if !self.stream.eat_keyword(Keyword::End) {
            return self.expected("'end' for open 'case'");
        }
        Ok(Some(Expr::new(
            self.stream.span_from(start),
            ExprKind::Case {
                cond: Box::new(cond),
                whens,
                els,
            },
        )))
    }

    // while ::= "while" ws* condition ";"? "do"? defexp* "end"
    fn parse_while(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::While) {
            return Ok(None);
        }
        self.ws();
        let cond = match self.parse_condition()? {
            Some(cond) => cond,
            None => return self.expected("condition for 'while' block"),
        };
        self.stream.eat(&TokenKind::Semicolon);
        self.stream.eat_keyword(Keyword::Do);
        let body_start = self.stream.position();
        let body = self.zero_or_more_defexp()?;
        if !self.stream.eat_keyword(Keyword::End) {
            return self.expected("expression or 'end' for open 'while' block");
        }
        let body = Box::new(self.do_node(body_start, body));
        Ok(Some(Expr::new(
            self.stream.span_from(start),
            ExprKind::While {
                cond: Box::new(cond),
                body,
            },
        )))
    }

    // rescue ::= "rescue" (name ("=>" name)?)? ws* defexp*
    fn parse_rescue_clause(&mut self) -> ParseResult<Rescue> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::Rescue) {
            return Ok(None);
        }
        let class = self.parse_name().map(|(name, _)| name);
        let mut binding = None;
        if class.is_some() && self.stream.eat(&TokenKind::FatArrow) {
            self.ws();
            binding = match self.parse_name() {
                Some((name, _)) => Some(name),
                None => return self.expected("variable to hold exception"),
            };
        }
        self.ws();
        let body = self.zero_or_more_defexp()?;
        Ok(Some(Rescue {
            span: self.stream.span_from(start),
            class,
            binding,
            body,
        }))
    }

    // begin ::= "begin" ws* defexp* rescue? "end"
    fn parse_begin(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::Begin) {
            return Ok(None);
        }
        self.ws();
        let body = self.zero_or_more_defexp()?;
        let rescue = self.parse_rescue_clause()?;
        if !self.stream.eat_keyword(Keyword::End) {
            return self.expected("expression or 'end' for open 'begin' block");
        }
        Ok(Some(Expr::new(
            self.stream.span_from(start),
            ExprKind::Begin { body, rescue },
        )))
    }

    // subexp ::= expression via the operator-precedence sub-parser
    fn parse_subexp(&mut self) -> ParseResult<Expr> {
        shunting::parse_expression(self, &[])
    }

    // lambda ::= "lambda" ws* block
    fn parse_lambda(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::Lambda) {
            return Ok(None);
        }
        self.ws();
        // A lambda is structurally a block under a different tag.
        let (params, body) = match self.parse_block_parts()? {
            Some(parts) => parts,
            None => return self.expected("do .. end block"),
        };
        Ok(Some(Expr::new(
            self.stream.span_from(start),
            ExprKind::Lambda { params, body },
        )))
    }

    // defexp ::= (sexp | while | begin | case | if_unless | lambda | subexp)
    //            (("if" | "while" | "rescue") condition)?
    fn parse_defexp(&mut self) -> ParseResult<Expr> {
        self.ws();
        let start = self.stream.position();
        let expr = if let Some(expr) = self.parse_sexp()? {
            Some(expr)
        } else if let Some(expr) = self.parse_while()? {
            Some(expr)
        } else if let Some(expr) = self.parse_begin()? {
            Some(expr)
        } else if let Some(expr) = self.parse_case()? {
            Some(expr)
        } else if let Some(expr) = self.parse_if_unless()? {
            Some(expr)
        } else if let Some(expr) = self.parse_lambda()? {
            Some(expr)
        } else {
            self.parse_subexp()?
        };
        let mut expr = match expr {
            Some(expr) => expr,
            None => return Ok(None),
        };
        // A statement modifier must follow on the same line.
        let modifier = if self.stream.eat_keyword(Keyword::If) {
            Some(Keyword::If)
        } else if self.stream.eat_keyword(Keyword::While) {
            Some(Keyword::While)
        } else if self.stream.eat_keyword(Keyword::Rescue) {
            Some(Keyword::Rescue)
        } else {
            None
        };
        if let Some(keyword) = modifier {
            self.ws();
            let cond = match self.parse_condition()? {
                Some(cond) => cond,
                None => {
                    return self.expected(&format!(
                        "condition for '{}' statement modifier",
                        keyword.as_str()
                    ))
                }
            };
            self.stream.eat(&TokenKind::Semicolon);
            let span = self.stream.span_from(start);
            let cond = Box::new(cond);
            let body = Box::new(expr);
            expr = match keyword {
                Keyword::If => Expr::new(
                    span,
                    ExprKind::If {
                        negated: false,
                        cond,
                        body,
                        els: None,
                    },
                ),
                Keyword::While => Expr::new(span, ExprKind::While { cond, body }),
                _ => Expr::new(span, ExprKind::RescueMod { cond, body }),
            };
        }
        Ok(Some(expr))
    }

    fn zero_or_more_defexp(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = Vec::new();
        while let Some(expr) = self.parse_defexp()? {
            exprs.push(expr);
        }
        Ok(exprs)
    }

    // block_body ::= ws* defexp*
    fn parse_block_exps(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.ws();
        self.zero_or_more_defexp()
    }

    // block ::= ("{" | "do") ("|" name ("," name)* "|")? block_body ("}" | "end")
    pub(crate) fn parse_block(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        match self.parse_block_parts()? {
            Some((params, body)) => Ok(Some(Expr::new(
                self.stream.span_from(start),
                ExprKind::Proc { params, body },
            ))),
            None => Ok(None),
        }
    }

    fn parse_block_parts(&mut self) -> ParseResult<(Vec<String>, Vec<Expr>)> {
        let brace = if self.stream.eat(&TokenKind::LBrace) {
            true
        } else if self.stream.eat_keyword(Keyword::Do) {
            false
        } else {
            return Ok(None);
        };
        self.ws();
        let mut params = Vec::new();
        if self.stream.eat(&TokenKind::Pipe) {
            loop {
                self.ws();
                match self.parse_name() {
                    Some((name, _)) => {
                        params.push(name);
                        self.ws();
                        if !self.stream.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            if !self.stream.eat(&TokenKind::Pipe) {
                return self.expected("'|' closing the block parameter list");
            }
        }
        let body = self.parse_block_exps()?;
        self.ws();
        let closed = if brace {
            self.stream.eat(&TokenKind::RBrace)
        } else {
            self.stream.eat_keyword(Keyword::End)
        };
        if !closed {
            let what = if brace {
                "'}' for '{'-block"
            } else {
                "'end' for 'do'-block"
            };
            return self.expected(what);
        }
        Ok(Some((params, body)))
    }

    // def ::= "def" ws* name ("." name)? args? ";"? block_body "end"
    fn parse_def(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::Def) {
            return Ok(None);
        }
        self.ws();
        let first = match self.parse_method_name() {
            Some(name) => name,
            None => return self.expected("function name"),
        };
        let name = if self.stream.eat(&TokenKind::Dot) {
            match self.parse_method_name() {
                Some(second) => MethodName::Qualified(first, second),
                None => return self.expected(&format!("name following '{}.'", first)),
            }
        } else {
            MethodName::Simple(first)
        };
        let params = self.parse_args()?.unwrap_or_default();
        self.stream.eat(&TokenKind::Semicolon);
        let body = self.parse_block_exps()?;
        if !self.stream.eat_keyword(Keyword::End) {
            return self.expected(&format!("expression or 'end' for open def '{}'", name));
        }
        Ok(Some(Expr::new(
            self.stream.span_from(start),
            ExprKind::Defm { name, params, body },
        )))
    }

    /// A method name: an atom, or an operator token for operator methods
    /// (`def == other`, `def << value`, ...).
    fn parse_method_name(&mut self) -> Option<String> {
        if let Some((name, _)) = self.stream.eat_atom() {
            return Some(name);
        }
        let text = operator_method_name(self.stream.peek_kind()?)?;
        self.stream.bump();
        Some(text.to_string())
    }

    pub(crate) fn parse_sexp(&mut self) -> ParseResult<Expr> {
        sexp::parse_sexp(self)
    }

    // class ::= ("class" | "module") ws* name ("<" name)? exp* "end"
    fn parse_class(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        let kind = if self.stream.eat_keyword(Keyword::Class) {
            DefKind::Class
        } else if self.stream.eat_keyword(Keyword::Module) {
            DefKind::Module
        } else {
            return Ok(None);
        };
        self.ws();
        let name = if let Some((name, _)) = self.parse_name() {
            if !name.starts_with(char::is_uppercase) {
                return self.expected("class name");
            }
            ClassName::Named(name)
        } else if self.stream.eat(&TokenKind::Shl) {
            ClassName::Singleton
        } else {
            return self.expected("class name");
        };
        self.ws();
        let super_class = if self.stream.eat(&TokenKind::Lt) {
            self.ws();
            match self.parse_name() {
                Some((name, _)) => Some(name),
                None => return self.expected("superclass"),
            }
        } else {
            None
        };
        let body = self.zero_or_more_exp()?;
        if !self.stream.eat_keyword(Keyword::End) {
            return self.expected("expression or 'end'");
        }
        let super_class = super_class.unwrap_or_else(|| String::from("Object"));
        Ok(Some(Expr::new(
            self.stream.span_from(start),
            ExprKind::ClassDef {
                kind,
                name,
                super_class,
                body,
            },
        )))
    }

    // require ::= "require" ws* subexp
    //
    // A literal target is resolved and inlined on the spot (unless the run
    // defers requires); a computed target is carried for a later phase.
    fn parse_require(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::Require) {
            return Ok(None);
        }
        self.ws();
        let target = match self.parse_subexp()? {
            Some(expr) => expr,
            None => return self.expected("name of source to require"),
        };
        self.ws();
        if let ExprKind::Str(name) = &target.kind {
            if !self.resolver.defer_requires() {
                let name = name.clone();
                let tree = self.resolver.resolve(&name, start)?;
                return Ok(Some(Expr::new(
                    self.stream.span_from(start),
                    ExprKind::Required(Box::new(tree)),
                )));
            }
        }
        eprintln!("WARNING: not processing require for {}", target);
        Ok(Some(Expr::new(
            self.stream.span_from(start),
            ExprKind::Require(Box::new(target)),
        )))
    }

    // include ::= "include" ws* name
    fn parse_include(&mut self) -> ParseResult<Expr> {
        let start = self.stream.position();
        if !self.stream.eat_keyword(Keyword::Include) {
            return Ok(None);
        }
        self.ws();
        let name = match self.parse_name() {
            Some((name, _)) => name,
            None => return self.expected("name of module to include"),
        };
        self.ws();
        Ok(Some(Expr::new(
            self.stream.span_from(start),
            ExprKind::Include(name),
        )))
    }

    // exp ::= ws* (class | def | require | include | defexp) ";"?
    fn parse_exp(&mut self) -> ParseResult<Expr> {
        self.ws();
        let expr = if let Some(expr) = self.parse_class()? {
            Some(expr)
        } else if let Some(expr) = self.parse_def()? {
            Some(expr)
        } else if let Some(expr) = self.parse_require()? {
            Some(expr)
        } else if let Some(expr) = self.parse_include()? {
            Some(expr)
        } else {
            self.parse_defexp()?
        };
        let expr = match expr {
            Some(expr) => expr,
            None => return Ok(None),
        };
        self.ws();
        self.stream.eat(&TokenKind::Semicolon);
        self.ws();
        Ok(Some(expr))
    }

    fn zero_or_more_exp(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = Vec::new();
        while let Some(expr) = self.parse_exp()? {
            exprs.push(expr);
        }
        Ok(exprs)
    }

    // program ::= exp* ws*
    //
    // When `bootstrap` is set (and the run does not skip it), the core
    // library is statically required ahead of the program's expressions.
    pub fn parse_program(&mut self, bootstrap: bool) -> Result<Expr, ParseError> {
        let start = self.stream.position();
        let mut exprs = Vec::new();
        if bootstrap && !self.resolver.skip_bootstrap() {
            let tree = self.resolver.resolve(BOOTSTRAP_SOURCE, start)?;
            exprs.push(Expr::new(
                Span::point(start),
                ExprKind::Required(Box::new(tree)),
            ));
        }
        while let Some(expr) = self.parse_exp()? {
            exprs.push(expr);
        }
        self.ws();
        if !self.stream.at_eof() {
            return Err(ParseError::new(
                self.stream.position(),
                "expected end of input",
            ));
        }
        Ok(Expr::new(
            self.stream.span_from(start),
            ExprKind::Do(exprs),
        ))
    }
}

fn operator_method_name(kind: &TokenKind) -> Option<&'static str> {
    let text = match kind {
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
        TokenKind::Bang => "!",
        _ => return None,
    };
    Some(text)
}
