/*
 * types.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Core location types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text (0-indexed)
///
/// Positions are only meaningful against the text they were computed from.
/// Use [`crate::LineIndex`] or the functions in [`crate::utils`] to build them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Byte distance from the start of the line
    pub column: usize,
    /// Byte offset from start of source
    pub offset: usize,
}

/// A range in source text from start to end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive for text, inclusive for [`Range::contains`])
    pub end: Position,
}

/// An offset-only range, used where line information is not yet known
///
/// Generated text is still changing while it is written, so the fabricator
/// records spans and only resolves them into [`Range`]s once the text is final.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset, "range start after end");
        Range { start, end }
    }

    /// A zero-width range at `position`
    pub fn empty(position: Position) -> Self {
        Range {
            start: position,
            end: position,
        }
    }

    /// Number of bytes covered by the range
    pub fn size(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Check whether `offset` lies within the range, both ends included
    pub fn contains(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset <= self.end.offset
    }

    pub fn contains_position(&self, position: &Position) -> bool {
        self.contains(position.offset)
    }

    /// Check whether `other` lies entirely within this range, both ends included
    pub fn contains_range(&self, other: &Range) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    pub fn span(&self) -> Span {
        Span::new(self.start.offset, self.end.offset)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start after end");
        Span { start, end }
    }

    pub fn empty(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    pub fn size(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Both ends included, matching [`Range::contains`]
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Shift both ends by `delta` bytes
    pub fn shifted(&self, delta: usize) -> Span {
        Span {
            start: self.start + delta,
            end: self.end + delta,
        }
    }
}

impl From<Range> for Span {
    fn from(range: Range) -> Self {
        range.span()
    }
}

impl From<&Range> for Span {
    fn from(range: &Range) -> Self {
        range.span()
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
