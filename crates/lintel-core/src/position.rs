//! Source positions and line/column conversion.
//!
//! Positions are UTF-8 byte offsets from the start of the file. Columns
//! reported to users count Unicode scalar values and are 1-indexed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// An absolute UTF-8 byte offset into a source buffer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AbsolutePosition(pub usize);

impl AbsolutePosition {
    /// Position zero.
    pub const START: Self = Self(0);

    /// Returns the raw byte offset.
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }
}

impl fmt::Display for AbsolutePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<usize> for AbsolutePosition {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Self(self.0 + rhs)
    }
}

impl Sub for AbsolutePosition {
    type Output = usize;

    fn sub(self, rhs: Self) -> usize {
        self.0.saturating_sub(rhs.0)
    }
}

impl From<usize> for AbsolutePosition {
    fn from(offset: usize) -> Self {
        Self(offset)
    }
}

/// A half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    /// Inclusive start.
    pub start: AbsolutePosition,
    /// Exclusive end.
    pub end: AbsolutePosition,
}

impl ByteRange {
    /// Creates a range. `start` must not exceed `end`.
    #[must_use]
    pub fn new(start: AbsolutePosition, end: AbsolutePosition) -> Self {
        debug_assert!(start <= end, "range start {start} exceeds end {end}");
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range is empty (a pure insertion point).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `position` lies inside the range. The end is inclusive so
    /// that a range ending at end-of-file still contains that position.
    #[must_use]
    pub fn contains(&self, position: AbsolutePosition) -> bool {
        self.start <= position && position <= self.end
    }
}

/// A 1-indexed line and column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineColumn {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column in Unicode scalar values (1-indexed).
    pub column: usize,
}

/// Precomputed table of line start offsets for one file.
///
/// Building is O(n) over the source; lookups are O(log n) by binary search
/// plus the length of the line prefix for column counting.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text: String,
}

impl LineIndex {
    /// Builds the index for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            line_starts,
            text: text.to_string(),
        }
    }

    /// Number of lines. A trailing newline opens an (empty) final line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Length of the indexed text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the indexed text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Converts a byte offset to a line/column pair.
    ///
    /// Offsets past the end clamp to the end of the text; offsets inside a
    /// multi-byte sequence round down to the start of that scalar.
    #[must_use]
    pub fn line_column(&self, position: AbsolutePosition) -> LineColumn {
        let mut offset = position.0.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }

        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        let line_start = self.line_starts[line_index];
        let column = self.text[line_start..offset].chars().count() + 1;

        LineColumn {
            line: line_index + 1,
            column,
        }
    }

    /// Byte offset at which `line` (1-indexed) starts, if it exists.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<AbsolutePosition> {
        line.checked_sub(1)
            .and_then(|i| self.line_starts.get(i))
            .map(|&offset| AbsolutePosition(offset))
    }

    /// Byte offset just past the last character of `line`, before its newline.
    #[must_use]
    pub fn line_end(&self, line: usize) -> Option<AbsolutePosition> {
        let start = self.line_start(line)?.0;
        let next = self
            .line_starts
            .get(line)
            .map_or(self.text.len(), |&next| next - 1);
        Some(AbsolutePosition(next.max(start)))
    }

    /// Converts a 1-indexed line/column pair back to a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end.
    #[must_use]
    pub fn offset_of(&self, line: usize, column: usize) -> Option<AbsolutePosition> {
        let start = self.line_start(line)?.0;
        let end = self.line_end(line)?.0;
        let line_text = &self.text[start..end];
        let byte_in_line = line_text
            .char_indices()
            .nth(column.saturating_sub(1))
            .map_or(line_text.len(), |(i, _)| i);
        Some(AbsolutePosition(start + byte_in_line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lc(index: &LineIndex, offset: usize) -> (usize, usize) {
        let pos = index.line_column(AbsolutePosition(offset));
        (pos.line, pos.column)
    }

    #[test]
    fn empty_file_maps_to_first_line() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(lc(&index, 0), (1, 1));
        assert_eq!(lc(&index, 10), (1, 1));
    }

    #[test]
    fn trailing_newline_opens_final_empty_line() {
        let index = LineIndex::new("let a = 1\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(lc(&index, 9), (1, 10));
        assert_eq!(lc(&index, 10), (2, 1));
    }

    #[test]
    fn columns_count_unicode_scalars() {
        // "é" is two bytes, "🙂" is four.
        let index = LineIndex::new("é🙂x\nfoo");
        assert_eq!(lc(&index, 0), (1, 1));
        assert_eq!(lc(&index, 2), (1, 2));
        assert_eq!(lc(&index, 6), (1, 3));
        assert_eq!(lc(&index, 8), (2, 1));
    }

    #[test]
    fn offsets_inside_a_scalar_round_down() {
        let index = LineIndex::new("🙂x");
        assert_eq!(lc(&index, 2), (1, 1));
    }

    #[test]
    fn offset_of_round_trips() {
        let text = "func a() {}\n  é = 1\n";
        let index = LineIndex::new(text);
        for offset in [0, 5, 12, 14, 16, 20] {
            let pos = index.line_column(AbsolutePosition(offset));
            assert_eq!(
                index.offset_of(pos.line, pos.column),
                Some(AbsolutePosition(offset))
            );
        }
        assert_eq!(index.offset_of(9, 1), None);
    }

    #[test]
    fn line_end_excludes_newline() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_end(1), Some(AbsolutePosition(2)));
        assert_eq!(index.line_end(2), Some(AbsolutePosition(5)));
    }

    #[test]
    fn range_contains_its_end() {
        let range = ByteRange::new(AbsolutePosition(2), AbsolutePosition(4));
        assert!(range.contains(AbsolutePosition(2)));
        assert!(range.contains(AbsolutePosition(4)));
        assert!(!range.contains(AbsolutePosition(5)));
        assert_eq!(range.len(), 2);
    }
}
