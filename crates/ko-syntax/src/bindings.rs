/*
 * bindings.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Binding list parsing.
//!
//! A binding list is the body of a JavaScript object literal: `text: name,
//! visible: shown()`. The body is wrapped as `({<body>})` and handed to oxc;
//! every span oxc reports is moved back into the template by subtracting the
//! two-byte `({` prefix and adding the body's offset.
//!
//! When oxc rejects the whole list, one error is recorded at the failing
//! offset and the list is recovered entry by entry, so one broken binding does
//! not hide the others.

use crate::ast::{Binding, Expression, NodeId};
use crate::context::ParseContext;
use ko_source_map::{Range, Span};
use oxc_allocator::Allocator;
use oxc_ast::ast::{self, ObjectPropertyKind, PropertyKey, PropertyKind};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

/// Length of the `({` prefix added around a binding list
const PREFIX: usize = 2;

/// Parse the binding list at `body` in the context's source
pub(crate) fn parse_binding_list(
    ctx: &mut ParseContext<'_>,
    body: Span,
    owner: NodeId,
) -> Vec<Binding> {
    let text = ctx.slice(body);
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut bindings = Vec::new();
    let failure = parse_object(ctx, text, body.start, owner, &mut bindings);
    let Err(failure) = failure else {
        return bindings;
    };

    let at = failure
        .offset
        .map_or(body.end, |offset| body.start + offset.min(text.len()));
    ctx.error(Span::empty(at), failure.message);
    tracing::trace!(offset = at, "Recovering binding list entry by entry");

    for entry in split_entries(text) {
        let entry_text = &text[entry.start..entry.end];
        let base = body.start + entry.start;
        if parse_object(ctx, entry_text, base, owner, &mut bindings).is_err() {
            salvage_entry(ctx, entry_text, base, owner, &mut bindings);
        }
    }
    bindings
}

/// Why oxc rejected a text, with the offset relative to the unwrapped text
struct Failure {
    offset: Option<usize>,
    message: String,
}

fn unwrap_offset(wrapped: u32) -> usize {
    (wrapped as usize).saturating_sub(PREFIX)
}

/// Parse `text` as an object literal body, pushing its bindings
///
/// Nothing is pushed when the text does not parse.
fn parse_object(
    ctx: &mut ParseContext<'_>,
    text: &str,
    base: usize,
    owner: NodeId,
    out: &mut Vec<Binding>,
) -> Result<(), Failure> {
    let wrapped = format!("({{{text}}})");
    let allocator = Allocator::default();
    let expression = Parser::new(&allocator, &wrapped, SourceType::default())
        .parse_expression()
        .map_err(|diagnostics| {
            let first = diagnostics.first();
            Failure {
                offset: first
                    .and_then(|diagnostic| diagnostic.labels.as_ref())
                    .and_then(|labels| labels.first())
                    .map(|label| label.offset().saturating_sub(PREFIX)),
                message: first.map_or_else(
                    || "Invalid binding list".to_string(),
                    |diagnostic| diagnostic.to_string(),
                ),
            }
        })?;

    let expression = match &expression {
        ast::Expression::ParenthesizedExpression(parenthesized) => &parenthesized.expression,
        other => other,
    };
    let ast::Expression::ObjectExpression(object) = expression else {
        return Err(Failure {
            offset: Some(0),
            message: "Expected a binding list".to_string(),
        });
    };

    let to_source = |span: oxc_span::Span| {
        Span::new(base + unwrap_offset(span.start), base + unwrap_offset(span.end))
    };

    for property in &object.properties {
        let property = match property {
            ObjectPropertyKind::SpreadProperty(spread) => {
                ctx.error(
                    to_source(spread.span()),
                    "Spread syntax is not supported in bindings",
                );
                continue;
            }
            ObjectPropertyKind::ObjectProperty(property) => property,
        };

        let key = to_source(property.key.span());
        if property.computed {
            ctx.error(key, "Computed binding names are not supported");
            continue;
        }
        if property.method || property.kind != PropertyKind::Init {
            ctx.error(to_source(property.span), "Unsupported binding");
            continue;
        }
        let name = match &property.key {
            PropertyKey::StaticIdentifier(_) | PropertyKey::NumericLiteral(_) => key,
            // Name is the literal's content
            PropertyKey::StringLiteral(_) if key.size() >= 2 => {
                Span::new(key.start + 1, key.end - 1)
            }
            _ => {
                ctx.error(key, "Unsupported binding name");
                continue;
            }
        };

        let value = to_source(property.value.span());
        let binding = if property.shorthand || value.is_empty() {
            incomplete(ctx, name, key.end, owner)
        } else {
            complete(ctx, name, key.start, value, owner)
        };
        out.push(binding);
    }
    Ok(())
}

fn complete(
    ctx: &ParseContext<'_>,
    name: Span,
    start: usize,
    value: Span,
    owner: NodeId,
) -> Binding {
    Binding {
        range: ctx.range(Span::new(start, value.end)),
        name: ctx.identifier(name),
        param: ctx.expression(value),
        incomplete: false,
        owner,
    }
}

/// A binding with no parameter; the placeholder sits at `at`
fn incomplete(ctx: &ParseContext<'_>, name: Span, at: usize, owner: NodeId) -> Binding {
    let placeholder = ctx.position(at);
    Binding {
        range: ctx.range(Span::new(name.start, at.max(name.end))),
        name: ctx.identifier(name),
        param: Expression {
            text: String::new(),
            range: Range::empty(placeholder),
        },
        incomplete: true,
        owner,
    }
}

/// Top-level comma-separated entries of a binding list, trimmed
fn split_entries(text: &str) -> Vec<Span> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(Span::new(start, idx));
                start = idx + 1;
            }
            _ => {}
        }
    }
    entries.push(Span::new(start, text.len()));

    entries
        .into_iter()
        .filter_map(|span| trim_span(text, span))
        .collect()
}

fn trim_span(text: &str, span: Span) -> Option<Span> {
    let slice = &text[span.start..span.end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        None
    } else {
        let start = span.start + leading;
        Some(Span::new(start, start + trimmed.len()))
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Recover `name: value` from an entry oxc could not parse
///
/// The parse error for the whole list is already recorded, so only constructs
/// that are never valid bindings add errors here.
fn salvage_entry(
    ctx: &mut ParseContext<'_>,
    entry: &str,
    base: usize,
    owner: NodeId,
    out: &mut Vec<Binding>,
) {
    let whole = Span::new(base, base + entry.len());
    if entry.starts_with("...") {
        ctx.error(whole, "Spread syntax is not supported in bindings");
        return;
    }
    if entry.starts_with('[') {
        ctx.error(whole, "Computed binding names are not supported");
        return;
    }

    let (name, name_end) = match entry.chars().next() {
        Some(quote @ ('"' | '\'')) => match entry[1..].find(quote) {
            Some(close) => (Span::new(1, close + 1), close + 2),
            None => (Span::new(1, entry.len()), entry.len()),
        },
        _ => {
            let end = entry
                .char_indices()
                .find(|&(_, c)| !is_identifier_char(c))
                .map_or(entry.len(), |(idx, _)| idx);
            (Span::new(0, end), end)
        }
    };
    if name_end == 0 {
        ctx.error(whole, "Unsupported binding name");
        return;
    }
    let name = name.shifted(base);

    let rest = &entry[name_end..];
    let after_name = name_end + (rest.len() - rest.trim_start().len());
    let Some(after_colon) = entry[after_name..].strip_prefix(':') else {
        out.push(incomplete(ctx, name, base + name_end, owner));
        return;
    };

    let value_start = entry.len() - after_colon.trim_start().len();
    let value_text = after_colon.trim();
    match expression_span(value_text) {
        Some(span) => {
            let value = span.shifted(base + value_start);
            out.push(complete(ctx, name, name.start, value, owner));
        }
        None => {
            let at = base + after_name + 1;
            out.push(incomplete(ctx, name, at, owner));
        }
    }
}

/// Span of the longest parseable expression at the start of `text`
///
/// Tries the whole text, then the text up to where oxc gave up.
fn expression_span(text: &str) -> Option<Span> {
    if text.is_empty() {
        return None;
    }
    match parse_expression(text) {
        Ok(span) => Some(span),
        Err(Some(offset)) if offset > 0 && offset < text.len() => {
            let prefix = text.get(..offset)?.trim_end();
            if prefix.is_empty() {
                None
            } else {
                parse_expression(prefix).ok()
            }
        }
        Err(_) => None,
    }
}

fn parse_expression(text: &str) -> Result<Span, Option<usize>> {
    let allocator = Allocator::default();
    match Parser::new(&allocator, text, SourceType::default()).parse_expression() {
        Ok(expression) => {
            let span = expression.span();
            Ok(Span::new(span.start as usize, span.end as usize))
        }
        Err(diagnostics) => Err(diagnostics
            .first()
            .and_then(|diagnostic| diagnostic.labels.as_ref())
            .and_then(|labels| labels.first())
            .map(|label| label.offset())),
    }
}
