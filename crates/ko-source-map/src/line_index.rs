/*
 * line_index.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Efficient line information for location lookups

use crate::error::{LocationError, Result};
use crate::newline::{terminator_len, Newline};
use crate::types::{Position, Range};
use serde::{Deserialize, Serialize};

/// Line-start table for one text
///
/// This struct stores metadata about a text that enables fast conversion
/// between byte offsets and (line, column) positions without storing the
/// content itself. It must only be used with the text it was built from.
///
/// Every newline sequence terminates a line (`\r\n` counts once), whatever
/// style [`Newline::detect`] reports for the text, so mixed files still get
/// the line numbers an editor shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineIndex {
    /// Byte offset at which each line starts; the first entry is always 0
    line_starts: Vec<usize>,

    /// Total length of the text in bytes
    total_length: usize,

    /// Style of the first newline in the text
    newline: Option<Newline>,
}

impl LineIndex {
    /// Create line information by analyzing content
    ///
    /// Scans the content once. Lookups afterwards are O(log n) binary searches.
    ///
    /// # Example
    ///
    /// ```
    /// use ko_source_map::LineIndex;
    ///
    /// let index = LineIndex::new("hello\nworld");
    /// let position = index.position_at(6).unwrap();
    /// assert_eq!(position.line, 1);
    /// assert_eq!(position.column, 0);
    /// ```
    pub fn new(content: &str) -> Self {
        let bytes = content.as_bytes();
        let mut line_starts = vec![0];
        let mut idx = 0;

        while let Some(found) = memchr::memchr2(b'\n', b'\r', &bytes[idx..]) {
            let at = idx + found;
            // memchr only stops on '\n' or '\r', so a terminator is always there
            let width = terminator_len(bytes, at).unwrap_or(1);
            idx = at + width;
            line_starts.push(idx);
        }

        LineIndex {
            line_starts,
            total_length: content.len(),
            newline: Newline::detect(content),
        }
    }

    /// Convert a byte offset to a Position
    ///
    /// Fails with [`LocationError::OffsetOutOfBounds`] past the end of the text.
    pub fn position_at(&self, offset: usize) -> Result<Position> {
        if offset > self.total_length {
            return Err(LocationError::OffsetOutOfBounds {
                offset: offset as isize,
                length: self.total_length,
            });
        }

        // The last line start that is <= offset owns the offset. An offset
        // inside a terminator belongs to the line the terminator ends.
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let column = offset - self.line_starts[line];

        Ok(Position {
            line,
            column,
            offset,
        })
    }

    /// Convert a (line, column) pair to a byte offset
    pub fn offset_at(&self, line: usize, column: usize) -> Result<usize> {
        let line_start = *self
            .line_starts
            .get(line)
            .ok_or(LocationError::LineOutOfBounds {
                line,
                line_count: self.line_count(),
            })?;

        let max_column = match self.line_starts.get(line + 1) {
            // Columns may point into the terminator but not past it
            Some(next_start) => next_start - line_start - 1,
            None => self.total_length - line_start,
        };

        if column > max_column {
            return Err(LocationError::ColumnOutOfBounds {
                line,
                column,
                length: max_column,
            });
        }

        Ok(line_start + column)
    }

    /// Convert a (line, column) pair to a Position
    pub fn position_at_line_column(&self, line: usize, column: usize) -> Result<Position> {
        let offset = self.offset_at(line, column)?;
        Ok(Position {
            line,
            column,
            offset,
        })
    }

    /// Build a Range from two byte offsets
    pub fn range_at(&self, start: usize, end: usize) -> Result<Range> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Ok(Range {
            start: self.position_at(start)?,
            end: self.position_at(end)?,
        })
    }

    /// Move `position` by `delta` bytes and recompute it against this text
    pub fn translate(&self, position: &Position, delta: isize) -> Result<Position> {
        let target = position.offset as isize + delta;
        if target < 0 {
            return Err(LocationError::OffsetOutOfBounds {
                offset: target,
                length: self.total_length,
            });
        }
        self.position_at(target as usize)
    }

    /// Get the total length of the text in bytes
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Get the number of lines in the text
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Newline style of the text, if it has more than one line
    pub fn newline(&self) -> Option<Newline> {
        self.newline
    }
}
