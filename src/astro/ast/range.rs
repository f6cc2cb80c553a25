//! Position and location tracking for source code locations
//!
//! ## Types
//!
//! - [`Position`] - A line:column position in source code
//! - [`Range`] - A source code range with start/end positions and byte span
//! - [`SourceLocation`] - Utility for converting byte offsets to positions
//!
//! ## Conventions
//!
//! - Lines are numbered from 1, columns from 0
//! - Columns count characters, not bytes, so multi-byte operators such as
//!   `≠` advance the column by one
//! - Byte spans are kept next to the line:column pair so tools can slice the
//!   source text directly

use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// Represents a position in source code (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// Represents a location in source code (start and end positions)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub span: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(span: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }

    /// A zero-width range at `pos`, used for synthetic tokens.
    pub fn empty(offset: usize, pos: Position) -> Self {
        Self::new(offset..offset, pos, pos)
    }

    /// Check if a position is contained within this location
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// True when `other` lies entirely inside this range.
    pub fn encloses(&self, other: &Range) -> bool {
        self.contains(other.start)
            && self.contains(other.end)
            && self.span.start <= other.span.start
            && other.span.end <= self.span.end
    }

    /// Build a bounding box that contains all provided ranges.
    pub fn bounding_box<'a, I>(mut ranges: I) -> Option<Range>
    where
        I: Iterator<Item = &'a Range>,
    {
        let first = ranges.next()?.clone();
        let mut span_start = first.span.start;
        let mut span_end = first.span.end;
        let mut start_pos = first.start;
        let mut end_pos = first.end;

        for range in ranges {
            if range.start < start_pos {
                start_pos = range.start;
                span_start = range.span.start;
            }
            if range.end > end_pos {
                end_pos = range.end;
                span_end = range.span.end;
            }
        }

        Some(Range::new(span_start..span_end, start_pos, end_pos))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::empty(0, Position::default())
    }
}

/// Provides fast conversion from byte offsets to line/column positions
pub struct SourceLocation<'src> {
    source: &'src str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl<'src> SourceLocation<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            source,
            line_starts,
        }
    }

    /// Convert a byte offset to a line/column position
    pub fn byte_to_position(&self, byte_offset: usize) -> Position {
        let index = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        let line_start = self.line_starts[index];
        let column = self
            .source
            .get(line_start..byte_offset)
            .map_or(byte_offset - line_start, |s| s.chars().count());

        Position::new(index + 1, column)
    }

    /// The text of a 1-based line without its line terminator.
    pub fn line_text(&self, line: usize) -> Option<&'src str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map_or(self.source.len(), |next| next - 1);
        self.source
            .get(start..end.max(start))
            .map(|text| text.trim_end_matches('\r'))
    }

    /// Get the total number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_comparison() {
        let pos1 = Position::new(1, 5);
        let pos2 = Position::new(1, 5);
        let pos3 = Position::new(2, 3);

        assert_eq!(pos1, pos2);
        assert_ne!(pos1, pos3);
        assert!(pos1 < pos3);
    }

    #[test]
    fn test_contains_and_encloses() {
        let outer = Range::new(0..20, Position::new(1, 0), Position::new(2, 5));
        let inner = Range::new(4..8, Position::new(1, 4), Position::new(1, 8));

        assert!(outer.contains(Position::new(1, 10)));
        assert!(outer.contains(Position::new(2, 5)));
        assert!(!outer.contains(Position::new(2, 6)));
        assert!(outer.encloses(&inner));
        assert!(!inner.encloses(&outer));
    }

    #[test]
    fn test_bounding_box() {
        let a = Range::new(2..4, Position::new(1, 2), Position::new(1, 4));
        let b = Range::new(10..12, Position::new(2, 1), Position::new(2, 3));

        let bbox = Range::bounding_box([a, b].iter()).unwrap();
        assert_eq!(bbox.span, 2..12);
        assert_eq!(bbox.start, Position::new(1, 2));
        assert_eq!(bbox.end, Position::new(2, 3));
        assert!(Range::bounding_box(std::iter::empty()).is_none());
    }

    #[test]
    fn test_byte_to_position_counts_characters() {
        let source = "a ≠ b\nlet x";
        let location = SourceLocation::new(source);

        assert_eq!(location.byte_to_position(0), Position::new(1, 0));
        // `b` sits after a three-byte operator
        assert_eq!(location.byte_to_position(6), Position::new(1, 4));
        assert_eq!(location.byte_to_position(8), Position::new(2, 0));
        assert_eq!(location.line_count(), 2);
    }

    #[test]
    fn test_line_text() {
        let location = SourceLocation::new("first\r\nsecond\nthird");

        assert_eq!(location.line_text(1), Some("first"));
        assert_eq!(location.line_text(2), Some("second"));
        assert_eq!(location.line_text(3), Some("third"));
        assert_eq!(location.line_text(0), None);
        assert_eq!(location.line_text(4), None);
    }
}
