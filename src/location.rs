//! Source locations for diagnostics.
//!
//! Every token, and transitively every AST node, carries a [`Location`] so
//! errors can point back at the offending source text.

use std::fmt;

/// A single point in a source file: 1-indexed line and column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Location { line, column }
    }

    /// Compute the location of byte offset `start` within `source`.
    ///
    /// `line` is the count of `\n` bytes before `start`, plus one. `column`
    /// is 1-based, counted from the last newline before `start` (or from
    /// the beginning of the source).
    pub fn from_offset(source: &str, start: usize) -> Self {
        let before = &source[..start];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(idx) => start - idx,
            None => start + 1,
        };
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_first_column() {
        let loc = Location::from_offset("abc", 0);
        assert_eq!(loc, Location::new(1, 1));
    }

    #[test]
    fn after_newline_resets_column() {
        let src = "abc\ndef";
        let loc = Location::from_offset(src, 4);
        assert_eq!(loc, Location::new(2, 1));
    }

    #[test]
    fn mid_line_column_counts_from_last_newline() {
        let src = "abc\ndefgh";
        let loc = Location::from_offset(src, 7);
        assert_eq!(loc, Location::new(2, 4));
    }

    #[test]
    fn multiple_newlines_increment_line() {
        let src = "a\nb\nc\nd";
        let loc = Location::from_offset(src, 6);
        assert_eq!(loc, Location::new(4, 1));
    }
}
