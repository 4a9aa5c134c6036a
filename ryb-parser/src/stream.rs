use ryb_core::span::Span;
use ryb_lexer::{Keyword, Token, TokenKind};

/// A cursor over the lexed tokens with single-token lookahead.
///
/// The grammar only ever peeks at the next token; everything past that is
/// consumed through the `eat_*` matchers, which take the token only when it
/// is the expected one.
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    source_len: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, source_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            source_len,
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    pub fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.clone();
        self.pos += 1;
        Some(token)
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Byte offset of the next token (or of end-of-input).
    pub fn position(&self) -> usize {
        self.peek()
            .map(|token| token.span.from)
            .unwrap_or(self.source_len)
    }

    /// Byte offset just past the most recently consumed token.
    pub fn prev_end(&self) -> usize {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span.to
        } else {
            0
        }
    }

    /// The span from a rule's start offset to the last consumed token.
    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    /// Consume the next token if it matches `kind` exactly.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        match self.peek_kind() {
            Some(next) if next == kind => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Consume the next token if it is the given keyword.
    pub fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        self.eat(&TokenKind::Keyword(keyword))
    }

    /// Consume the next token if it is an atom, returning its text.
    pub fn eat_atom(&mut self) -> Option<(String, Span)> {
        let token = self.peek()?;
        if let TokenKind::Atom(name) = &token.kind {
            let matched = (name.clone(), token.span);
            self.pos += 1;
            Some(matched)
        } else {
            None
        }
    }

    /// Consume line breaks. The grammar calls this wherever arbitrary
    /// whitespace (including line breaks) is allowed.
    pub fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }
}
