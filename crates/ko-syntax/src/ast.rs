/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Syntax tree types.
//!
//! The tree is a closed set of node types. Parents own their children;
//! attributes and bindings refer back to their owner by [`NodeId`], resolved
//! with [`SyntaxTree::owner`].

use ko_source_map::{Newline, Range};
use serde::Serialize;

/// Identity of an element or virtual element within one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// A name taken verbatim from the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub text: String,
    pub range: Range,
}

/// Expression source text, kept unparsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expression {
    pub text: String,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuoteStyle {
    Double,
    Single,
    /// Unquoted attribute value
    None,
}

/// A quoted (or, for attributes, possibly unquoted) literal
///
/// `text` and `range` cover the content between the quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Literal {
    pub text: String,
    pub range: Range,
    pub quote: QuoteStyle,
}

/// Raw character content; entities are not decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Text {
    pub range: Range,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub range: Range,
    /// Everything between `<!--` and `-->`
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub range: Range,
    pub name: Identifier,
    pub value: Option<Literal>,
    pub owner: NodeId,
}

/// One `name: parameter` entry of a binding list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// From the start of the name to the end of the parameter
    pub range: Range,
    pub name: Identifier,
    pub param: Expression,
    /// The parameter is missing; `param` is an empty placeholder
    pub incomplete: bool,
    pub owner: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub id: NodeId,
    pub range: Range,
    pub name: Identifier,
    pub attributes: Vec<Attribute>,
    pub bindings: Vec<Binding>,
    pub children: Vec<Node>,
    /// Span of the children, or the insertion point of an empty body
    pub inner: Range,
}

impl Element {
    /// First attribute with this name, compared ASCII-case-insensitively
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name.text.eq_ignore_ascii_case(name))
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|binding| binding.name.text == name)
    }
}

/// `import` clause of a `with` or `using` directive
///
/// Shaped `[type] <identifier | *> [type] from "<module>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStatement {
    pub range: Range,
    pub identifier: Identifier,
    pub type_only: bool,
    pub module: Literal,
}

/// `<name>: <param>` expression of an `ok` virtual element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub name: Identifier,
    pub param: Expression,
    pub import: Option<ImportStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VirtualKind {
    /// `ko` namespace: the expression is a binding list
    Bindings(Vec<Binding>),
    /// `ok` namespace
    Directive(Directive),
    /// `ok` namespace with an expression that is not `<name>: <param>`
    Opaque,
}

/// Content delimited by `<!-- ko ... -->` and `<!-- /ko -->` comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualElement {
    pub id: NodeId,
    /// From the start comment through the end comment
    pub range: Range,
    pub start_comment: Range,
    pub end_comment: Range,
    pub namespace: Identifier,
    pub expression: Expression,
    pub inner: Range,
    pub children: Vec<Node>,
    pub kind: VirtualKind,
}

impl VirtualElement {
    /// Bindings of a `ko` virtual element, empty otherwise
    pub fn bindings(&self) -> &[Binding] {
        match &self.kind {
            VirtualKind::Bindings(bindings) => bindings,
            _ => &[],
        }
    }

    pub fn directive(&self) -> Option<&Directive> {
        match &self.kind {
            VirtualKind::Directive(directive) => Some(directive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Node {
    Text(Text),
    Comment(Comment),
    Element(Element),
    VirtualElement(VirtualElement),
}

impl Node {
    pub fn range(&self) -> &Range {
        match self {
            Node::Text(text) => &text.range,
            Node::Comment(comment) => &comment.range,
            Node::Element(element) => &element.range,
            Node::VirtualElement(virtual_element) => &virtual_element.range,
        }
    }

    pub fn as_node(&self) -> NodeRef<'_> {
        match self {
            Node::Text(text) => NodeRef::Text(text),
            Node::Comment(comment) => NodeRef::Comment(comment),
            Node::Element(element) => NodeRef::Element(element),
            Node::VirtualElement(virtual_element) => NodeRef::VirtualElement(virtual_element),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    Comment,
    Element,
    Attribute,
    Binding,
    VirtualElement,
    ImportStatement,
}

/// A borrowed view of any node in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    Text(&'a Text),
    Comment(&'a Comment),
    Element(&'a Element),
    Attribute(&'a Attribute),
    Binding(&'a Binding),
    VirtualElement(&'a VirtualElement),
    ImportStatement(&'a ImportStatement),
}

impl<'a> NodeRef<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Text(_) => NodeKind::Text,
            NodeRef::Comment(_) => NodeKind::Comment,
            NodeRef::Element(_) => NodeKind::Element,
            NodeRef::Attribute(_) => NodeKind::Attribute,
            NodeRef::Binding(_) => NodeKind::Binding,
            NodeRef::VirtualElement(_) => NodeKind::VirtualElement,
            NodeRef::ImportStatement(_) => NodeKind::ImportStatement,
        }
    }

    pub fn range(&self) -> &'a Range {
        match *self {
            NodeRef::Text(node) => &node.range,
            NodeRef::Comment(node) => &node.range,
            NodeRef::Element(node) => &node.range,
            NodeRef::Attribute(node) => &node.range,
            NodeRef::Binding(node) => &node.range,
            NodeRef::VirtualElement(node) => &node.range,
            NodeRef::ImportStatement(node) => &node.range,
        }
    }
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    pub nodes: Vec<Node>,
    /// The whole text
    pub range: Range,
    /// Newline style of the text, if it has more than one line
    pub newline: Option<Newline>,
}

impl SyntaxTree {
    /// Call `callback` on every node in document order
    ///
    /// A node comes before its attributes, then its bindings or import
    /// statement, then its children. With a `filter`, only nodes of that kind
    /// are passed, but the whole tree is still walked.
    pub fn visit<'a>(&'a self, mut callback: impl FnMut(NodeRef<'a>), filter: Option<NodeKind>) {
        let mut emit = |node: NodeRef<'a>| {
            if filter.is_none_or(|kind| kind == node.kind()) {
                callback(node);
            }
        };
        for node in &self.nodes {
            walk(node, &mut emit);
        }
    }

    /// All nodes, in [`SyntaxTree::visit`] order
    pub fn descendants(&self) -> Vec<NodeRef<'_>> {
        let mut nodes = Vec::new();
        self.visit(|node| nodes.push(node), None);
        nodes
    }

    /// Innermost node whose range contains `offset`
    ///
    /// Containment is inclusive of both ends. The smallest range wins; between
    /// equal ranges the deeper node wins.
    pub fn node_at(&self, offset: usize) -> Option<NodeRef<'_>> {
        let mut best: Option<NodeRef<'_>> = None;
        self.visit(
            |node| {
                if !node.range().contains(offset) {
                    return;
                }
                match best {
                    Some(current) if current.range().size() < node.range().size() => {}
                    _ => best = Some(node),
                }
            },
            None,
        );
        best
    }

    /// The element or virtual element with this id
    pub fn owner(&self, id: NodeId) -> Option<NodeRef<'_>> {
        let mut found = None;
        self.visit(
            |node| match node {
                NodeRef::Element(element) if element.id == id => found = Some(node),
                NodeRef::VirtualElement(virtual_element) if virtual_element.id == id => {
                    found = Some(node)
                }
                _ => {}
            },
            None,
        );
        found
    }
}

fn walk<'a>(node: &'a Node, emit: &mut impl FnMut(NodeRef<'a>)) {
    emit(node.as_node());
    match node {
        Node::Text(_) | Node::Comment(_) => {}
        Node::Element(element) => {
            for attribute in &element.attributes {
                emit(NodeRef::Attribute(attribute));
            }
            for binding in &element.bindings {
                emit(NodeRef::Binding(binding));
            }
            for child in &element.children {
                walk(child, emit);
            }
        }
        Node::VirtualElement(virtual_element) => {
            match &virtual_element.kind {
                VirtualKind::Bindings(bindings) => {
                    for binding in bindings {
                        emit(NodeRef::Binding(binding));
                    }
                }
                VirtualKind::Directive(Directive {
                    import: Some(import),
                    ..
                }) => emit(NodeRef::ImportStatement(import)),
                VirtualKind::Directive(_) | VirtualKind::Opaque => {}
            }
            for child in &virtual_element.children {
                walk(child, emit);
            }
        }
    }
}
