/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! State shared by every stage of a single parse.

use crate::ast::{Expression, Identifier, NodeId};
use crate::error::ParserError;
use ko_source_map::{LineIndex, Newline, Position, Range, Span};

/// The parsed text, its line index and the errors collected so far
///
/// Every stage reports offsets into the original text through this context,
/// so nodes and errors never carry offsets of an intermediate string.
#[derive(Debug)]
pub(crate) struct ParseContext<'a> {
    source: &'a str,
    index: LineIndex,
    errors: Vec<ParserError>,
    next_id: usize,
}

impl<'a> ParseContext<'a> {
    pub fn new(source: &'a str) -> Self {
        ParseContext {
            source,
            index: LineIndex::new(source),
            errors: Vec::new(),
            next_id: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn slice(&self, span: Span) -> &'a str {
        self.source.get(span.start..span.end).unwrap_or_default()
    }

    pub fn newline(&self) -> Option<Newline> {
        self.index.newline()
    }

    pub fn position(&self, offset: usize) -> Position {
        // Offsets are produced against `source` itself
        self.index
            .position_at(offset.min(self.source.len()))
            .unwrap_or_default()
    }

    pub fn range(&self, span: Span) -> Range {
        Range::new(self.position(span.start), self.position(span.end))
    }

    pub fn identifier(&self, span: Span) -> Identifier {
        Identifier {
            text: self.slice(span).to_string(),
            range: self.range(span),
        }
    }

    pub fn expression(&self, span: Span) -> Expression {
        Expression {
            text: self.slice(span).to_string(),
            range: self.range(span),
        }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Record a recoverable error
    pub fn error(&mut self, span: Span, description: impl Into<String>) {
        let error = ParserError::new(self.range(span), description);
        tracing::debug!(
            offset = span.start,
            description = %error.description,
            "Recovered from parse error"
        );
        self.errors.push(error);
    }

    /// An error for the caller to return, aborting the parse
    pub fn fatal(&self, span: Span, description: impl Into<String>) -> ParserError {
        ParserError::new(self.range(span), description)
    }

    #[cfg(test)]
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }
}
