//! Byte-offset source locations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A byte range into the original query text.
///
/// Every token and every AST node carries a `TextSpan` so that diagnostics
/// can point back at the exact source location. The range is half-open:
/// `start` is inclusive, `end()` is exclusive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextSpan {
    /// Byte offset of the first character.
    pub start: usize,
    /// Number of bytes covered.
    pub length: usize,
}

impl TextSpan {
    /// A zero-length span at offset 0, used as a placeholder.
    pub const ZERO: Self = Self {
        start: 0,
        length: 0,
    };

    #[must_use]
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Build a span from a start (inclusive) and end (exclusive) offset.
    #[must_use]
    pub const fn from_bounds(start: usize, end: usize) -> Self {
        let length = if end > start { end - start } else { 0 };
        Self { start, length }
    }

    /// A zero-length span at `offset`.
    #[must_use]
    pub const fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            length: 0,
        }
    }

    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.length
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.length == 0
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end() > other.end() {
            self.end()
        } else {
            other.end()
        };
        Self::from_bounds(start, end)
    }

    #[must_use]
    pub const fn contains(self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }

    /// The text this span covers in `source`, or `""` when the span does not
    /// fall on character boundaries inside `source`.
    #[must_use]
    pub fn slice(self, source: &str) -> &str {
        source.get(self.start..self.end()).unwrap_or("")
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_end_and_merge() {
        let a = TextSpan::new(5, 5);
        let b = TextSpan::new(15, 5);
        assert_eq!(a.end(), 10);
        let merged = a.merge(b);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end(), 20);
        assert_eq!(b.merge(a), merged);
    }

    #[test]
    fn test_span_from_bounds_never_negative() {
        assert_eq!(TextSpan::from_bounds(7, 3).length, 0);
        assert!(TextSpan::empty(4).is_empty());
        assert!(!TextSpan::new(0, 1).is_empty());
    }

    #[test]
    fn test_span_slice() {
        let src = "select 1";
        assert_eq!(TextSpan::new(0, 6).slice(src), "select");
        assert_eq!(TextSpan::new(7, 1).slice(src), "1");
        assert_eq!(TextSpan::new(7, 10).slice(src), "");
    }

    #[test]
    fn test_span_contains() {
        let s = TextSpan::new(2, 3);
        assert!(s.contains(2));
        assert!(s.contains(4));
        assert!(!s.contains(5));
    }
}
