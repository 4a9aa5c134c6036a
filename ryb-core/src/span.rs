/// Represents a region of source code, as byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

impl Span {
    /// Construct a span given its lower and upper bounds.
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// An empty span at a single offset.
    pub fn point(at: usize) -> Self {
        Self { from: at, to: at }
    }

    /// Construct the span going from the beginning of the first span to the end of the second span.
    pub fn between(s1: Self, s2: Self) -> Self {
        Self {
            from: s1.from,
            to: s2.to,
        }
    }

    /// Get the string slice corresponding to this span.
    pub fn to_str(self, source: &str) -> &str {
        &source[self.from..self.to]
    }
}

/// Compute the 1-based line and column of a byte offset within `source`.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let col = before
        .rfind('\n')
        .map(|at| offset - at)
        .unwrap_or(offset + 1);
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_from_one() {
        let source = "ab\ncde\nf";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 1), (1, 2));
        assert_eq!(line_col(source, 3), (2, 1));
        assert_eq!(line_col(source, 7), (3, 1));
        assert_eq!(line_col(source, 100), (3, 2));
    }
}
