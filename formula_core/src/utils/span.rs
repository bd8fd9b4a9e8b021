//! Source location tracking for formula text
//!
//! Offsets are counted in characters, not bytes, so that a diagnostic caret
//! can be placed under the offending character by padding with that many
//! spaces.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range of character offsets in formula text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span from start and end character offsets
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// Create a span of `len` characters starting at `start`
    pub fn at(start: usize, len: usize) -> Self {
        Self::new(start, start + len)
    }

    /// Zero-width span at a single offset
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Extract the covered characters from the source text
    pub fn slice(&self, input: &str) -> String {
        input
            .chars()
            .skip(self.start)
            .take(self.len())
            .collect()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// A value tagged with the span it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Render the caret marker line for an offset: `offset` spaces then `^`.
pub fn caret_line(offset: usize) -> String {
    let mut line = " ".repeat(offset);
    line.push('^');
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basics() {
        let span = Span::at(2, 3);
        assert_eq!(span.start(), 2);
        assert_eq!(span.end(), 5);
        assert_eq!(span.len(), 3);
        assert!(!span.is_empty());
        assert!(Span::point(4).is_empty());
    }

    #[test]
    fn test_span_merge() {
        let merged = Span::new(4, 6).merge(Span::new(1, 2));
        assert_eq!(merged, Span::new(1, 6));
    }

    #[test]
    fn test_span_slice_counts_characters() {
        let text = "é + 1";
        assert_eq!(Span::at(0, 1).slice(text), "é");
        assert_eq!(Span::at(4, 1).slice(text), "1");
    }

    #[test]
    fn test_caret_line() {
        assert_eq!(caret_line(0), "^");
        assert_eq!(caret_line(3), "   ^");
    }

    #[test]
    fn test_spanned_map() {
        let spanned = Spanned::new(2, Span::at(0, 1)).map(|v| v * 10);
        assert_eq!(spanned.value, 20);
        assert_eq!(spanned.to_string(), "20");
    }
}
