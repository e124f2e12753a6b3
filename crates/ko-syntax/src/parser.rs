/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template parser: markup tree to syntax tree.

use crate::ast::{
    Attribute, Comment, Element, Literal, Node, NodeId, SyntaxTree, Text, VirtualElement,
    VirtualKind,
};
use crate::bindings::parse_binding_list;
use crate::context::ParseContext;
use crate::directive::parse_directive;
use crate::error::{ParserError, Result};
use crate::markup::{self, RawAttribute, RawElement, RawNode};
use crate::options::ParserOptions;
use ko_source_map::Span;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// `<!-- ko <expression> -->` or `<!-- ok <expression> -->`
static START_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*(ko|ok)\s+(.*?)\s*$").unwrap());

/// `<!-- /ko -->` or `<!-- /ok -->`, optionally followed by text
static END_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*/(ko|ok)(\s|$)").unwrap());

/// Length of `<!--`
const COMMENT_OPEN: usize = 4;
/// Length of `-->`
const COMMENT_CLOSE: usize = 3;

/// Outcome of [`parse`]
///
/// A tree with errors is still usable. No tree means the errors include one
/// that leaves the structure meaningless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub tree: Option<SyntaxTree>,
    pub errors: Vec<ParserError>,
}

/// Parse a template
///
/// # Example
///
/// ```rust
/// use ko_syntax::{parse, NodeRef, ParserOptions};
///
/// let result = parse(
///     r#"<ul data-bind="foreach: items"><li data-bind="text: $data"></li></ul>"#,
///     &ParserOptions::default(),
/// );
/// assert!(result.errors.is_empty());
///
/// let tree = result.tree.unwrap();
/// let mut names = Vec::new();
/// tree.visit(
///     |node| {
///         if let NodeRef::Binding(binding) = node {
///             names.push(binding.name.text.clone());
///         }
///     },
///     None,
/// );
/// assert_eq!(names, ["foreach", "text"]);
/// ```
pub fn parse(text: &str, options: &ParserOptions) -> ParseResult {
    let mut ctx = ParseContext::new(text);
    let raw = markup::build(&mut ctx);

    let mut parser = Parser {
        ctx: &mut ctx,
        options,
    };
    let (tree, fatal) = match parser.nodes(raw) {
        Ok(nodes) => {
            let tree = SyntaxTree {
                nodes,
                range: ctx.range(Span::new(0, text.len())),
                newline: ctx.newline(),
            };
            (Some(tree), None)
        }
        Err(fatal) => (None, Some(fatal)),
    };
    let mut errors = ctx.into_errors();
    errors.extend(fatal);

    tracing::debug!(
        length = text.len(),
        errors = errors.len(),
        complete = tree.is_some(),
        "Parsed template"
    );
    ParseResult { tree, errors }
}

struct Parser<'a, 'c> {
    ctx: &'c mut ParseContext<'a>,
    options: &'c ParserOptions,
}

impl Parser<'_, '_> {
    /// Convert a sibling list, pairing virtual element comments
    fn nodes(&mut self, raw: Vec<RawNode>) -> Result<Vec<Node>> {
        let mut siblings = raw.into_iter();
        let mut nodes = Vec::new();
        while let Some(raw) = siblings.next() {
            nodes.push(self.node(raw, &mut siblings)?);
        }
        Ok(nodes)
    }

    fn node(&mut self, raw: RawNode, siblings: &mut std::vec::IntoIter<RawNode>) -> Result<Node> {
        match raw {
            RawNode::Text(span) => Ok(Node::Text(Text {
                range: self.ctx.range(span),
                content: self.ctx.slice(span).to_string(),
            })),
            RawNode::Comment(span) => {
                let content = comment_content(span);
                let text = self.ctx.slice(content);
                match START_COMMENT.captures(text) {
                    Some(captures) => {
                        let (Some(namespace), Some(expression)) = (captures.get(1), captures.get(2))
                        else {
                            return Ok(self.comment(span));
                        };
                        let namespace = Span::new(namespace.start(), namespace.end())
                            .shifted(content.start);
                        let expression = Span::new(expression.start(), expression.end())
                            .shifted(content.start);
                        self.virtual_element(span, namespace, expression, siblings)
                    }
                    None => Ok(self.comment(span)),
                }
            }
            RawNode::Element(element) => self.element(element).map(Node::Element),
        }
    }

    fn comment(&self, span: Span) -> Node {
        Node::Comment(Comment {
            range: self.ctx.range(span),
            content: self.ctx.slice(comment_content(span)).to_string(),
        })
    }

    fn virtual_element(
        &mut self,
        start_comment: Span,
        namespace: Span,
        expression: Span,
        siblings: &mut std::vec::IntoIter<RawNode>,
    ) -> Result<Node> {
        let id = self.ctx.next_id();
        let namespace_text = self.ctx.slice(namespace);

        let kind = if namespace_text == "ko" {
            VirtualKind::Bindings(parse_binding_list(self.ctx, expression, id))
        } else {
            parse_directive(self.ctx, expression)
        };

        let mut children = Vec::new();
        let end_comment = loop {
            let Some(raw) = siblings.next() else {
                return Err(self.ctx.fatal(start_comment, "Missing end comment"));
            };
            if let RawNode::Comment(span) = raw {
                if self.closes(span, namespace_text) {
                    break span;
                }
            }
            children.push(self.node(raw, siblings)?);
        };

        Ok(Node::VirtualElement(VirtualElement {
            id,
            range: self.ctx.range(Span::new(start_comment.start, end_comment.end)),
            start_comment: self.ctx.range(start_comment),
            end_comment: self.ctx.range(end_comment),
            namespace: self.ctx.identifier(namespace),
            expression: self.ctx.expression(expression),
            inner: self.ctx.range(Span::new(start_comment.end, end_comment.start)),
            children,
            kind,
        }))
    }

    /// Whether the comment at `span` ends a virtual element of `namespace`
    fn closes(&self, span: Span, namespace: &str) -> bool {
        let text = self.ctx.slice(comment_content(span));
        END_COMMENT
            .captures(text)
            .and_then(|captures| captures.get(1))
            .is_some_and(|found| found.as_str() == namespace)
    }

    fn element(&mut self, raw: RawElement) -> Result<Element> {
        let id = self.ctx.next_id();
        let mut bindings = Vec::new();
        let mut attributes = Vec::with_capacity(raw.attributes.len());

        for attribute in raw.attributes {
            let name = self.ctx.slice(attribute.name);
            if let Some((value, _)) = attribute.value {
                if self.options.is_binding_attribute(name) {
                    bindings.extend(parse_binding_list(self.ctx, value, id));
                }
            }
            attributes.push(self.attribute(attribute, id));
        }

        Ok(Element {
            id,
            range: self.ctx.range(raw.range),
            name: self.ctx.identifier(raw.name),
            attributes,
            bindings,
            children: self.nodes(raw.children)?,
            inner: self.ctx.range(raw.inner),
        })
    }

    fn attribute(&self, raw: RawAttribute, owner: NodeId) -> Attribute {
        Attribute {
            range: self.ctx.range(raw.range),
            name: self.ctx.identifier(raw.name),
            value: raw.value.map(|(span, quote)| Literal {
                text: self.ctx.slice(span).to_string(),
                range: self.ctx.range(span),
                quote,
            }),
            owner,
        }
    }
}

/// Content span of a comment spanning `<!--` through `-->`
fn comment_content(span: Span) -> Span {
    let start = (span.start + COMMENT_OPEN).min(span.end);
    let end = span.end.saturating_sub(COMMENT_CLOSE).max(start);
    Span::new(start, end)
}
