/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser for knockout markup templates.
//!
//! Templates are HTML-like markup where elements carry binding lists in
//! binding attributes (`data-bind` by default) and where comments of the form
//! `<!-- ko ... -->` ... `<!-- /ko -->` delimit virtual elements. The `ok`
//! namespace marks directive virtual elements, whose `with` and `using`
//! directives may carry an import clause.
//!
//! Every node, attribute, binding and error carries a [`Range`] into the
//! original text, with UTF-8 byte offsets.
//!
//! # Example
//!
//! ```rust
//! use ko_syntax::{parse, Node, ParserOptions};
//!
//! let source = "<!-- ko if: visible --><p>hi</p><!-- /ko -->";
//! let result = parse(source, &ParserOptions::default());
//! assert!(result.errors.is_empty());
//!
//! let tree = result.tree.unwrap();
//! let Node::VirtualElement(virtual_element) = &tree.nodes[0] else {
//!     panic!("expected a virtual element");
//! };
//! assert_eq!(virtual_element.bindings()[0].name.text, "if");
//! assert_eq!(virtual_element.bindings()[0].param.text, "visible");
//! assert_eq!(virtual_element.children.len(), 1);
//! ```
//!
//! # Errors
//!
//! Malformed binding lists, stray closing tags and bad import clauses are
//! recorded in [`ParseResult::errors`] while parsing continues. A virtual
//! element without its end comment stops the parse, and the result then has
//! no tree.
//!
//! [`Range`]: ko_source_map::Range

mod bindings;
mod context;
mod directive;
mod markup;

pub mod ast;
pub mod error;
pub mod options;
pub mod parser;

pub use ast::{
    Attribute, Binding, Comment, Directive, Element, Expression, Identifier, ImportStatement,
    Literal, Node, NodeId, NodeKind, NodeRef, QuoteStyle, SyntaxTree, Text, VirtualElement,
    VirtualKind,
};
pub use error::{ParserError, Result};
pub use options::ParserOptions;
pub use parser::{ParseResult, parse};
