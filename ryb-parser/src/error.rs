use std::error;
use std::fmt;

/// A fatal parse error, carrying the byte offset it was raised at.
///
/// Raised when a rule has committed (consumed its leading keyword) and a
/// required follow-on construct is missing, when a required source cannot
/// be resolved, or when unparsed input remains after the program rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub pos: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(pos: usize, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset {})", self.message, self.pos)
    }
}

impl error::Error for ParseError {}

/// The outcome of applying a grammar rule.
///
/// `Ok(None)` is a silent non-match: the rule did not apply and consumed no
/// input, so a sibling alternative may be tried. `Err(_)` is a committed,
/// fatal error that `?` propagates through every alternative chain, so no
/// alternative can accidentally swallow it.
pub type ParseResult<T> = Result<Option<T>, ParseError>;
