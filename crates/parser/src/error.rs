use thiserror::Error;

use crate::lexer::Tok;

/// Compact byte-span used across the parser.
///
/// Offsets are stored as `u32`; inputs above 4GiB are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32, // exclusive
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start: clamp_u32(start),
            end: clamp_u32(end),
        }
    }

    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        let p = clamp_u32(pos);
        Self { start: p, end: p }
    }

    pub const fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub const fn to(self, other: Span) -> Span {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source text covered by this span (empty if out of bounds).
    #[inline]
    pub fn text<'src>(&self, src: &'src str) -> &'src str {
        src.get(self.start as usize..self.end as usize).unwrap_or("")
    }

    /// 1-based line and column of the span start.
    pub fn line_col(&self, src: &str) -> (usize, usize) {
        let upto = &src.as_bytes()[..(self.start as usize).min(src.len())];
        let line = 1 + memchr::memchr_iter(b'\n', upto).count();
        let col = match memchr::memrchr(b'\n', upto) {
            Some(nl) => upto.len() - nl,
            None => upto.len() + 1,
        };
        (line, col)
    }
}

#[inline]
const fn clamp_u32(x: usize) -> u32 {
    if x > u32::MAX as usize {
        u32::MAX
    } else {
        x as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    Lex,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: DiagKind,
    pub span: Span,
    pub message: String,
}

impl Diag {
    pub fn parse(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: DiagKind::Parse,
            span,
            message: message.into(),
        }
    }

    pub fn unexpected(span: Span, found: &Tok<'_>, expected: &str) -> Self {
        Self::parse(span, format!("unexpected {found}; expected {expected}"))
    }

    pub fn unexpected_eof(at: usize, expected: &str) -> Self {
        Self::parse(Span::empty_at(at), format!("unexpected EOF; expected {expected}"))
    }

    /// Renders `line:col: message` against the source the span points into.
    pub fn render(&self, src: &str) -> String {
        let (line, col) = self.span.line_col(src);
        format!("{line}:{col}: {}", self.message)
    }
}

/// Every diagnostic collected while lexing and parsing one file.
#[derive(Debug, Clone, Error)]
#[error("parse failed with {} diagnostic(s)", .diags.len())]
pub struct ParseFailure {
    pub diags: Vec<Diag>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid numeric literal")]
    InvalidNumber,
    #[error("invalid escape")]
    InvalidEscape,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Default)]
#[error("{kind}: {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Lex,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let src = "package p\n\ntype T int\n";
        let at = src.find("type").unwrap();
        assert_eq!(Span::new(at, at + 4).line_col(src), (3, 1));
        assert_eq!(Span::new(8, 9).line_col(src), (1, 9));
    }

    #[test]
    fn span_to_covers_both() {
        let a = Span::new(4, 6);
        let b = Span::new(1, 3);
        assert_eq!(a.to(b), Span::new(1, 6));
    }
}
