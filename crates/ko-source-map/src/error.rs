/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for location conversions.
//!
//! All of these are contract violations: the offset, line or column was not
//! computed against the text it is being converted with.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("offset {offset} is out of bounds for text of length {length}")]
    OffsetOutOfBounds { offset: isize, length: usize },

    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("line {line} is out of bounds for text with {line_count} lines")]
    LineOutOfBounds { line: usize, line_count: usize },

    #[error("column {column} is out of bounds for line {line} of length {length}")]
    ColumnOutOfBounds {
        line: usize,
        column: usize,
        length: usize,
    },
}

/// Result type for location conversions.
pub type Result<T> = std::result::Result<T, LocationError>;
