/*
 * utils.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! One-shot conversions between offsets and positions
//!
//! Each call indexes `text` from scratch. Build a [`LineIndex`] once when
//! converting many offsets against the same text.

use crate::error::{LocationError, Result};
use crate::line_index::LineIndex;
use crate::types::{Position, Range};

fn check_boundary(text: &str, offset: usize) -> Result<()> {
    if offset > text.len() {
        return Err(LocationError::OffsetOutOfBounds {
            offset: offset as isize,
            length: text.len(),
        });
    }
    if !text.is_char_boundary(offset) {
        return Err(LocationError::NotCharBoundary { offset });
    }
    Ok(())
}

/// Convert a byte offset to a Position
pub fn position_from_offset(offset: usize, text: &str) -> Result<Position> {
    check_boundary(text, offset)?;
    LineIndex::new(text).position_at(offset)
}

/// Convert line and column numbers to a Position
///
/// Line and column are 0-indexed; the column counts bytes.
pub fn position_from_line_column(line: usize, column: usize, text: &str) -> Result<Position> {
    let position = LineIndex::new(text).position_at_line_column(line, column)?;
    check_boundary(text, position.offset)?;
    Ok(position)
}

/// Create a Range from start and end byte offsets
pub fn range_from_offsets(start: usize, end: usize, text: &str) -> Result<Range> {
    check_boundary(text, start)?;
    check_boundary(text, end)?;
    LineIndex::new(text).range_at(start, end)
}

/// Move `position` by `delta` bytes, recomputing it against `text`
///
/// `text` may differ from the text `position` was computed against; only the
/// offset is carried over.
pub fn translate(position: &Position, delta: isize, text: &str) -> Result<Position> {
    let target = position.offset as isize + delta;
    if target < 0 {
        return Err(LocationError::OffsetOutOfBounds {
            offset: target,
            length: text.len(),
        });
    }
    position_from_offset(target as usize, text)
}

impl Position {
    /// See [`translate`]
    pub fn translate(&self, delta: isize, text: &str) -> Result<Position> {
        translate(self, delta, text)
    }
}

impl Range {
    /// Move both ends by `delta` bytes, recomputing them against `text`
    pub fn translate(&self, delta: isize, text: &str) -> Result<Range> {
        let index = LineIndex::new(text);
        let start = index.translate(&self.start, delta)?;
        let end = index.translate(&self.end, delta)?;
        check_boundary(text, start.offset)?;
        check_boundary(text, end.offset)?;
        Ok(Range { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_offset_simple() {
        let source = "hello\nworld";

        let position = position_from_offset(0, source).unwrap();
        assert_eq!(position, Position::new(0, 0, 0));

        let position = position_from_offset(9, source).unwrap();
        assert_eq!(position, Position::new(1, 3, 9));

        let position = position_from_offset(11, source).unwrap();
        assert_eq!(position, Position::new(1, 5, 11));
    }

    #[test]
    fn test_position_from_offset_rejects_bad_offsets() {
        assert!(matches!(
            position_from_offset(12, "hello\nworld"),
            Err(LocationError::OffsetOutOfBounds { offset: 12, .. })
        ));
        // 'é' occupies bytes 3..5
        assert_eq!(
            position_from_offset(4, "caf\u{e9}"),
            Err(LocationError::NotCharBoundary { offset: 4 })
        );
    }

    #[test]
    fn test_position_from_line_column() {
        let source = "hello\r\nworld";

        let position = position_from_line_column(1, 2, source).unwrap();
        assert_eq!(position.offset, 9);

        assert!(position_from_line_column(2, 0, source).is_err());
        assert!(position_from_line_column(0, 9, source).is_err());
    }

    #[test]
    fn test_range_from_offsets() {
        let range = range_from_offsets(2, 8, "hello\nworld").unwrap();
        assert_eq!(range.start, Position::new(0, 2, 2));
        assert_eq!(range.end, Position::new(1, 2, 8));
        assert_eq!(range.size(), 6);

        assert!(range_from_offsets(2, 80, "hello").is_err());
    }

    #[test]
    fn test_translate_against_other_text() {
        let position = position_from_offset(2, "abcd").unwrap();

        // Same offset arithmetic, new line information
        let moved = translate(&position, 2, "ab\ncd").unwrap();
        assert_eq!(moved, Position::new(1, 1, 4));

        assert!(translate(&position, -3, "abcd").is_err());
    }

    #[test]
    fn test_range_translate() {
        let range = range_from_offsets(0, 2, "abcd").unwrap();
        let moved = range.translate(3, "ab\ncdef").unwrap();

        assert_eq!(moved.start, Position::new(1, 0, 3));
        assert_eq!(moved.end, Position::new(1, 2, 5));
        assert_eq!(moved.size(), range.size());
    }
}
