/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser errors with source locations.

use ko_source_map::Range;
use serde::Serialize;

/// Result type for parse steps that can abort the whole parse
pub type Result<T> = std::result::Result<T, ParserError>;

/// A problem found while parsing, located in the parsed text
///
/// Most errors are recoverable and collected in
/// [`crate::ParseResult::errors`] next to a usable tree. Structural errors that
/// leave no meaningful tree, such as an unterminated virtual element, come
/// back with no tree at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{description} ({})", .range.start)]
pub struct ParserError {
    pub range: Range,
    pub description: String,
}

impl ParserError {
    pub fn new(range: Range, description: impl Into<String>) -> Self {
        ParserError {
            range,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ko_source_map::Position;

    #[test]
    fn test_display_uses_one_based_position() {
        let start = Position::new(1, 4, 10);
        let error = ParserError::new(Range::new(start, start), "Missing end comment");

        assert_eq!(error.to_string(), "Missing end comment (2:5)");
    }
}
