/*
 * markup.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Offset-preserving HTML fragment tree builder on top of quick-xml.
//!
//! quick-xml tokenizes in a lenient configuration; this module adds the HTML
//! rules it does not know about: void elements, raw-text elements, elements
//! left open, and end tags without a matching start tag.

use crate::ast::QuoteStyle;
use crate::context::ParseContext;
use ko_source_map::Span;
use quick_xml::Reader;
use quick_xml::events::Event;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawNode {
    Text(Span),
    /// Whole comment, `<!--` through `-->`
    Comment(Span),
    Element(RawElement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawElement {
    pub range: Span,
    pub name: Span,
    pub attributes: Vec<RawAttribute>,
    pub children: Vec<RawNode>,
    pub inner: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAttribute {
    pub range: Span,
    pub name: Span,
    /// Value content, without quotes
    pub value: Option<(Span, QuoteStyle)>,
}

struct TreeBuilder<'a, 'c> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    /// Offset of the reader's input within `source`
    base: usize,
    /// Elements whose end tag has not been seen yet
    stack: Vec<RawElement>,
    roots: Vec<RawNode>,
    ctx: &'c mut ParseContext<'a>,
}

fn reader(text: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.trim_text_start = false;
    config.trim_text_end = false;
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;
    config.expand_empty_elements = false;
    reader
}

/// Build the raw node tree of the context's source
///
/// Tokenizer failures are recorded in `ctx` and the rest of the input is kept
/// as one text node.
pub(crate) fn build(ctx: &mut ParseContext<'_>) -> Vec<RawNode> {
    let source = ctx.source();
    let mut builder = TreeBuilder {
        source,
        reader: reader(source),
        base: 0,
        stack: Vec::new(),
        roots: Vec::new(),
        ctx,
    };
    builder.run();
    builder.roots
}

impl<'a> TreeBuilder<'a, '_> {
    fn offset(&self) -> usize {
        self.base + self.reader.buffer_position() as usize
    }

    fn restart(&mut self, at: usize) {
        let at = at.min(self.source.len());
        self.reader = reader(&self.source[at..]);
        self.base = at;
    }

    fn run(&mut self) {
        loop {
            let start = self.offset();
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let at = self.base + self.reader.error_position() as usize;
                    self.ctx.error(Span::empty(at), err.to_string());
                    if start < self.source.len() {
                        self.push(RawNode::Text(Span::new(start, self.source.len())));
                    }
                    break;
                }
            };
            let end = self.offset();

            // `<` not followed by a tag name is text, as in `a < b` or `<3`
            let bare = match &event {
                Event::Start(tag) | Event::Empty(tag) => !is_tag_name(tag.name().as_ref()),
                Event::End(tag) => !is_tag_name(tag.name().as_ref()),
                _ => false,
            };
            if bare {
                self.push(RawNode::Text(Span::new(start, start + 1)));
                self.restart(start + 1);
                continue;
            }

            match event {
                Event::Start(tag) => self.open(tag.name().as_ref().len(), start, end),
                Event::Empty(tag) => {
                    let element = self.element(tag.name().as_ref().len(), start, end);
                    self.push(RawNode::Element(element));
                }
                Event::End(tag) => self.close(tag.name().as_ref().len(), start, end),
                Event::Comment(_) => self.push(RawNode::Comment(Span::new(start, end))),
                Event::Eof => break,
                // Text, CDATA, declarations and processing instructions are
                // all kept verbatim
                _ => self.push(RawNode::Text(Span::new(start, end))),
            }
        }

        let end = self.source.len();
        while !self.stack.is_empty() {
            self.close_top(end, end);
        }
    }

    /// Add a node to the innermost open element, merging adjacent text
    fn push(&mut self, node: RawNode) {
        let siblings = match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.roots,
        };
        if let (RawNode::Text(span), Some(RawNode::Text(last))) = (&node, siblings.last_mut()) {
            if last.end == span.start {
                last.end = span.end;
                return;
            }
        }
        siblings.push(node);
    }

    /// An element whose start tag spans `start..end`, with an empty body
    fn element(&self, name_len: usize, start: usize, end: usize) -> RawElement {
        let name = Span::new(start + 1, start + 1 + name_len);
        RawElement {
            range: Span::new(start, end),
            name,
            attributes: scan_attributes(self.source, name.end, end),
            children: Vec::new(),
            inner: Span::empty(end),
        }
    }

    fn open(&mut self, name_len: usize, start: usize, end: usize) {
        let source = self.source;
        let mut element = self.element(name_len, start, end);
        let name = &source[element.name.start..element.name.end];

        if is_one_of(name, VOID_ELEMENTS) {
            self.push(RawNode::Element(element));
        } else if is_one_of(name, RAW_TEXT_ELEMENTS) {
            let (content_end, close_end) = find_raw_text_end(source, end, name);
            if content_end > end {
                element.children.push(RawNode::Text(Span::new(end, content_end)));
            }
            element.inner = Span::new(end, content_end);
            element.range.end = close_end;
            self.push(RawNode::Element(element));
            self.restart(close_end);
        } else {
            self.stack.push(element);
        }
    }

    fn close(&mut self, name_len: usize, start: usize, end: usize) {
        let source = self.source;
        let name = &source[start + 2..start + 2 + name_len];
        let matching = self.stack.iter().rposition(|open| {
            source[open.name.start..open.name.end].eq_ignore_ascii_case(name)
        });

        match matching {
            Some(depth) => {
                // Elements opened after the match end where the end tag starts
                while self.stack.len() > depth + 1 {
                    self.close_top(start, start);
                }
                self.close_top(start, end);
            }
            None => {
                self.ctx.error(
                    Span::new(start, end),
                    format!("Unexpected closing tag </{name}>"),
                );
            }
        }
    }

    fn close_top(&mut self, inner_end: usize, end: usize) {
        if let Some(mut element) = self.stack.pop() {
            element.inner = Span::new(element.range.end, inner_end);
            element.range.end = end;
            self.push(RawNode::Element(element));
        }
    }
}

fn is_tag_name(name: &[u8]) -> bool {
    name.first().is_some_and(u8::is_ascii_alphabetic)
}

fn is_one_of(name: &str, names: &[&str]) -> bool {
    names.iter().any(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// End of the content of a raw-text element and end of its end tag
fn find_raw_text_end(source: &str, from: usize, name: &str) -> (usize, usize) {
    let haystack = source[from..].to_ascii_lowercase();
    let needle = format!("</{}", name.to_ascii_lowercase());

    let mut search = 0;
    while let Some(found) = haystack[search..].find(&needle) {
        let at = search + found;
        let after = at + needle.len();
        let boundary = haystack[after..]
            .chars()
            .next()
            .is_none_or(|c| c == '>' || c == '/' || c.is_ascii_whitespace());
        if boundary {
            let close_end = haystack[after..]
                .find('>')
                .map_or(source.len(), |gt| from + after + gt + 1);
            return (from + at, close_end);
        }
        search = after;
    }
    (source.len(), source.len())
}

/// Attributes of the start tag whose name ends at `from` and which closes
/// just before `tag_end`
fn scan_attributes(source: &str, from: usize, tag_end: usize) -> Vec<RawAttribute> {
    let bytes = source.as_bytes();
    // Exclude the closing `>`
    let end = if tag_end > from && bytes[tag_end - 1] == b'>' {
        tag_end - 1
    } else {
        tag_end
    };
    let is_space = |b: u8| b.is_ascii_whitespace() || b == b'/';

    let mut attributes = Vec::new();
    let mut pos = from;
    loop {
        while pos < end && is_space(bytes[pos]) {
            pos += 1;
        }
        if pos >= end {
            break;
        }

        let name_start = pos;
        while pos < end && !is_space(bytes[pos]) && bytes[pos] != b'=' {
            pos += 1;
        }
        // A stray `=` with no name still makes progress
        if pos == name_start {
            pos += 1;
            continue;
        }
        let name = Span::new(name_start, pos);

        let mut cursor = pos;
        while cursor < end && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if cursor >= end || bytes[cursor] != b'=' {
            attributes.push(RawAttribute {
                range: name,
                name,
                value: None,
            });
            continue;
        }
        cursor += 1;
        while cursor < end && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }

        let (value, value_end) = match bytes.get(cursor).copied() {
            Some(quote @ (b'"' | b'\'')) if cursor < end => {
                let content_start = cursor + 1;
                let close = source[content_start..end]
                    .find(quote as char)
                    .map_or(end, |idx| content_start + idx);
                let style = if quote == b'"' {
                    QuoteStyle::Double
                } else {
                    QuoteStyle::Single
                };
                let value_end = (close + 1).min(end);
                (Some((Span::new(content_start, close), style)), value_end)
            }
            _ => {
                let value_start = cursor;
                while cursor < end && !bytes[cursor].is_ascii_whitespace() {
                    cursor += 1;
                }
                (
                    Some((Span::new(value_start, cursor), QuoteStyle::None)),
                    cursor,
                )
            }
        };

        attributes.push(RawAttribute {
            range: Span::new(name_start, value_end),
            name,
            value,
        });
        pos = value_end;
    }
    attributes
}
