/*
 * directive.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Expressions of `ok` virtual elements.
//!
//! The expression is `<name>: <param>`. For `with` and `using` the parameter
//! is also read as an import clause:
//!
//! ```text
//! [type] <identifier | *> [type] from "<module>"
//! ```
//!
//! The clause is read by a small cursor so every error points at the exact
//! offset where the input stopped making sense.

use crate::ast::{Directive, Identifier, ImportStatement, Literal, QuoteStyle, VirtualKind};
use crate::context::ParseContext;
use ko_source_map::Span;

const IMPORTING_DIRECTIVES: &[&str] = &["with", "using"];

/// Byte cursor over a slice of the source, reporting absolute offsets
struct Cursor<'a> {
    text: &'a str,
    base: usize,
    pos: usize,
}

struct CursorError {
    at: usize,
    message: &'static str,
}

type CursorResult<T> = std::result::Result<T, CursorError>;

impl<'a> Cursor<'a> {
    fn new(text: &'a str, base: usize) -> Self {
        Cursor { text, base, pos: 0 }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn text_of(&self, span: Span) -> &'a str {
        &self.text[span.start - self.base..span.end - self.base]
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, message: &'static str) -> CursorError {
        CursorError {
            at: self.offset(),
            message: if self.at_end() {
                "Unexpected end of input"
            } else {
                message
            },
        }
    }

    /// Absolute span of the identifier at the cursor, if any
    fn identifier(&mut self) -> Option<Span> {
        let start = self.pos;
        let first = self.peek()?;
        if !(first.is_alphabetic() || first == '_' || first == '$') {
            return None;
        }
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_' || c == '$') {
                break;
            }
            self.pos += c.len_utf8();
        }
        Some(Span::new(self.base + start, self.base + self.pos))
    }

    /// Identifier or `*`
    fn import_name(&mut self) -> Option<Span> {
        if self.peek() == Some('*') {
            self.pos += 1;
            return Some(Span::new(self.offset() - 1, self.offset()));
        }
        self.identifier()
    }

    /// Consume `word` if it is the next whole word
    fn keyword(&mut self, word: &str) -> bool {
        let rest = &self.text[self.pos..];
        let Some(after) = rest.strip_prefix(word) else {
            return false;
        };
        let boundary = after
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '$'));
        if boundary {
            self.pos += word.len();
        }
        boundary
    }

    /// Absolute span of a quoted string's content
    fn string(&mut self) -> CursorResult<(Span, QuoteStyle)> {
        let quote = match self.peek() {
            Some('"') => QuoteStyle::Double,
            Some('\'') => QuoteStyle::Single,
            _ => return Err(self.error("Expected string literal")),
        };
        let delimiter = self.text.as_bytes()[self.pos];
        self.pos += 1;
        let start = self.pos;

        let bytes = self.text.as_bytes();
        let mut escaped = false;
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == delimiter {
                let content = Span::new(self.base + start, self.base + self.pos);
                self.pos += 1;
                return Ok((content, quote));
            } else if b == b'\n' || b == b'\r' {
                break;
            }
            self.pos += 1;
        }
        Err(CursorError {
            at: self.offset(),
            message: "Unterminated string literal",
        })
    }
}

/// Parse the expression of an `ok` virtual element at `expression`
pub(crate) fn parse_directive(ctx: &mut ParseContext<'_>, expression: Span) -> VirtualKind {
    let text = ctx.slice(expression);
    let mut cursor = Cursor::new(text, expression.start);

    cursor.skip_whitespace();
    let name = match cursor.identifier() {
        Some(name) => name,
        None => {
            let error = cursor.error("Expected directive name");
            ctx.error(Span::empty(error.at), error.message);
            return VirtualKind::Opaque;
        }
    };
    cursor.skip_whitespace();
    if cursor.peek() != Some(':') {
        let error = cursor.error("Expected ':' after directive name");
        ctx.error(Span::empty(error.at), error.message);
        return VirtualKind::Opaque;
    }
    cursor.pos += 1;
    cursor.skip_whitespace();

    let param_text = text[cursor.pos..].trim_end();
    let param = Span::new(cursor.offset(), cursor.offset() + param_text.len());

    let name_text = ctx.slice(name);
    let import = if IMPORTING_DIRECTIVES.contains(&name_text) {
        let param_text = ctx.slice(param);
        match parse_import(&mut Cursor::new(param_text, param.start)) {
            Ok(import) => Some(import_statement(ctx, import)),
            Err(error) => {
                ctx.error(Span::empty(error.at), error.message);
                None
            }
        }
    } else {
        None
    };

    VirtualKind::Directive(Directive {
        name: ctx.identifier(name),
        param: ctx.expression(param),
        import,
    })
}

struct RawImport {
    range: Span,
    identifier: Span,
    type_only: bool,
    module: (Span, QuoteStyle),
}

fn parse_import(cursor: &mut Cursor<'_>) -> CursorResult<RawImport> {
    let start = cursor.offset();
    let mut type_only = false;

    let mut identifier = cursor
        .import_name()
        .ok_or_else(|| cursor.error("Expected identifier or '*'"))?;
    cursor.skip_whitespace();

    // A leading `type` is a modifier unless it is the imported name itself
    if cursor.text_of(identifier) == "type" {
        let checkpoint = cursor.pos;
        match cursor.import_name() {
            Some(name) if cursor.text_of(name) != "from" => {
                type_only = true;
                identifier = name;
                cursor.skip_whitespace();
            }
            _ => cursor.pos = checkpoint,
        }
    }

    if !type_only && cursor.keyword("type") {
        type_only = true;
        cursor.skip_whitespace();
    }

    if !cursor.keyword("from") {
        return Err(cursor.error("Expected keyword 'from'"));
    }
    cursor.skip_whitespace();

    let module = cursor.string()?;
    let end = cursor.offset();

    cursor.skip_whitespace();
    if !cursor.at_end() {
        return Err(cursor.error("Unexpected input after import"));
    }

    Ok(RawImport {
        range: Span::new(start, end),
        identifier,
        type_only,
        module,
    })
}

fn import_statement(ctx: &ParseContext<'_>, import: RawImport) -> ImportStatement {
    let (module, quote) = import.module;
    ImportStatement {
        range: ctx.range(import.range),
        identifier: Identifier {
            text: ctx.slice(import.identifier).to_string(),
            range: ctx.range(import.identifier),
        },
        type_only: import.type_only,
        module: Literal {
            text: ctx.slice(module).to_string(),
            range: ctx.range(module),
            quote,
        },
    }
}
