use ryb_core::span::Span;

use crate::token::{Keyword, Token, TokenKind};

/// The lexer for the Ryb bootstrap compiler.
///
/// Iterates over positioned tokens. Spaces and tabs are skipped; line
/// breaks are emitted as [`TokenKind::Newline`] tokens because the grammar
/// is sensitive to them.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    skip_comments: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Lexer<'a> {
        Lexer {
            source,
            pos: 0,
            skip_comments: false,
        }
    }

    pub fn skip_comments(mut self, value: bool) -> Lexer<'a> {
        self.skip_comments = value;
        self
    }

    /// The portion of the input that has not been consumed yet.
    pub fn text(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.text().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat_char(&mut self, ch: char) -> bool {
        if self.peek_char() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        &self.source[start..self.pos]
    }

    fn lex_number(&mut self) -> TokenKind {
        let digits = self.take_while(|ch| ch.is_ascii_digit());
        match digits.parse::<i64>() {
            Ok(value) => TokenKind::LitInteger(value),
            Err(_) => TokenKind::LitBigInteger(digits.to_string()),
        }
    }

    fn lex_string(&mut self, quote: char) -> Option<TokenKind> {
        let mut output = String::new();
        self.bump()?;
        loop {
            let ch = self.bump()?;
            match ch {
                ch if ch == quote => break Some(TokenKind::LitString(output)),
                '\\' => {
                    let ch = self.bump()?;
                    match ch {
                        _ if ch == quote => output.push(quote),
                        '\\' => output.push('\\'),
                        'n' if quote == '"' => output.push('\n'),
                        't' if quote == '"' => output.push('\t'),
                        'r' if quote == '"' => output.push('\r'),
                        _ if quote == '\'' => {
                            output.push('\\');
                            output.push(ch);
                        }
                        _ => {}
                    }
                }
                ch => output.push(ch),
            }
        }
    }

    fn lex_atom(&mut self) -> TokenKind {
        let start = self.pos;
        if self.eat_char('@') {
            self.eat_char('@');
        }
        self.take_while(is_ident_char);
        // Method-name atoms may end in '?' or '!', but a trailing '!'
        // followed by '=' is the start of a `!=` operator instead.
        match self.peek_char() {
            Some('?') => {
                self.bump();
            }
            Some('!') if !self.source[self.pos + 1..].starts_with('=') => {
                self.bump();
            }
            _ => {}
        }
        let text = &self.source[start..self.pos];
        match Keyword::lookup(text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Atom(text.to_string()),
        }
    }

    fn lex_comment(&mut self) -> TokenKind {
        self.bump();
        let text = self.take_while(|ch| ch != '\n');
        TokenKind::Comment(text.to_string())
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.take_while(|ch| ch == ' ' || ch == '\t' || ch == '\r');
            let start = self.pos;
            let peeked = self.peek_char()?;
            let kind = match peeked {
                '\n' => {
                    self.bump();
                    TokenKind::Newline
                }
                '#' => {
                    let comment = self.lex_comment();
                    if self.skip_comments {
                        continue;
                    }
                    comment
                }
                '"' | '\'' => self.lex_string(peeked)?,
                ':' => {
                    self.bump();
                    match self.peek_char() {
                        Some(ch) if is_ident_start(ch) => {
                            let name = self.take_while(is_ident_char);
                            TokenKind::LitSymbol(name.to_string())
                        }
                        _ => TokenKind::Colon,
                    }
                }
                '@' => self.lex_atom(),
                '%' => {
                    if self.text().starts_with("%s(") {
                        self.pos += 3;
                        TokenKind::SexpBegin
                    } else {
                        self.bump();
                        TokenKind::Percent
                    }
                }
                '=' => {
                    self.bump();
                    if self.eat_char('=') {
                        TokenKind::EqEq
                    } else if self.eat_char('>') {
                        TokenKind::FatArrow
                    } else {
                        TokenKind::Assign
                    }
                }
                '<' => {
                    self.bump();
                    if self.eat_char('<') {
                        TokenKind::Shl
                    } else if self.eat_char('=') {
                        TokenKind::Le
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    self.bump();
                    if self.eat_char('=') {
                        TokenKind::Ge
                    } else {
                        TokenKind::Gt
                    }
                }
                '!' => {
                    self.bump();
                    if self.eat_char('=') {
                        TokenKind::Ne
                    } else {
                        TokenKind::Bang
                    }
                }
                '&' => {
                    self.bump();
                    if self.eat_char('&') {
                        TokenKind::AndAnd
                    } else {
                        TokenKind::Amp
                    }
                }
                '|' => {
                    self.bump();
                    if self.eat_char('|') {
                        TokenKind::OrOr
                    } else {
                        TokenKind::Pipe
                    }
                }
                '(' => {
                    self.bump();
                    TokenKind::LParen
                }
                ')' => {
                    self.bump();
                    TokenKind::RParen
                }
                '{' => {
                    self.bump();
                    TokenKind::LBrace
                }
                '}' => {
                    self.bump();
                    TokenKind::RBrace
                }
                ',' => {
                    self.bump();
                    TokenKind::Comma
                }
                ';' => {
                    self.bump();
                    TokenKind::Semicolon
                }
                '.' => {
                    self.bump();
                    TokenKind::Dot
                }
                '*' => {
                    self.bump();
                    TokenKind::Star
                }
                '+' => {
                    self.bump();
                    TokenKind::Plus
                }
                '-' => {
                    self.bump();
                    TokenKind::Minus
                }
                '/' => {
                    self.bump();
                    TokenKind::Slash
                }
                ch if is_ident_start(ch) => self.lex_atom(),
                ch if ch.is_ascii_digit() => self.lex_number(),
                _ => return None,
            };
            return Some(Token::new(kind, Span::new(start, self.pos)));
        }
    }
}
