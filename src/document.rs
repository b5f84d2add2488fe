use crate::error::{Error, Result};
use crate::parser::DomParser;
use std::str::FromStr;

/// An attribute of an element.
///
/// `name` may carry a namespace prefix (`xlink:href`).
/// `value` is unescaped but otherwise kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Attribute {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct NodeData {
    name: String,
    attributes: Vec<Attribute>,
    text: String,
    parent: Option<Node>,
    children: Vec<Node>,
}

/// Represents an element of a parsed [`Document`].
///
/// This struct only contains a unique usize id and implements trait `Copy`.
/// The actual data of the node is stored in the [`Document`] that created it,
/// so every accessor takes that `&Document` as its first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    id: usize,
}

/// Represents a parsed XML document.
///
/// Use [`DomParser`], [`crate::parse_str()`], [`crate::parse_file()`],
/// [`crate::parse_reader()`] or [`Document::from_str()`] to create one.
///
/// # Examples
/// ```
/// use std::str::FromStr;
/// use xml_dom_builder::Document;
///
/// let doc = Document::from_str(r#"<?xml version="1.0" encoding="UTF-8"?>
/// <package>
///     <metadata>
///         <author>Lewis Carroll</author>
///     </metadata>
/// </package>
/// "#).unwrap();
/// let author = doc
///     .root()
///     .unwrap()
///     .first_child_by_name(&doc, "metadata")
///     .unwrap()
///     .first_child_by_name(&doc, "author")
///     .unwrap();
/// assert_eq!(author.text(&doc), "Lewis Carroll");
/// ```
#[derive(Debug)]
pub struct Document {
    store: Vec<NodeData>,
    root: Option<Node>,
    processing_instruction: Option<String>,
    directives: Vec<String>,
}

impl Document {
    pub(crate) fn new() -> Document {
        Document {
            store: Vec::new(),
            root: None,
            processing_instruction: None,
            directives: Vec::new(),
        }
    }

    /// Outermost element, `None` if the input had no element.
    pub fn root(&self) -> Option<Node> {
        self.root
    }

    /// The last processing instruction seen, e.g. `<?xml version="1.0"?>`.
    pub fn processing_instruction(&self) -> Option<&str> {
        self.processing_instruction.as_deref()
    }

    /// Directives (`<!DOCTYPE ...>`) in document order.
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// Number of elements in the document, the root included.
    ///
    /// A built document has a single top-level element, so this is always
    /// one more than `root.children_recursive(doc).len()`.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn set_processing_instruction(&mut self, pi: String) {
        self.processing_instruction = Some(pi);
    }

    pub(crate) fn push_directive(&mut self, directive: String) {
        self.directives.push(directive);
    }
}

impl FromStr for Document {
    type Err = Error;

    /// Parses with default settings, see [`DomParser::new()`].
    fn from_str(s: &str) -> Result<Document> {
        DomParser::new().parse_str(s)
    }
}

// Construction, only used by the tree builder.
impl Node {
    /// Allocates a node in `document` and links it under `parent`.
    /// The first node without a parent becomes the document root.
    pub(crate) fn new(
        document: &mut Document,
        name: String,
        attributes: Vec<Attribute>,
        parent: Option<Node>,
    ) -> Node {
        let node = Node {
            id: document.store.len(),
        };
        document.store.push(NodeData {
            name,
            attributes,
            text: String::new(),
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            parent.mut_data(document).children.push(node);
        }
        if document.root.is_none() {
            document.root = Some(node);
        }
        node
    }

    pub(crate) fn set_text(&self, document: &mut Document, text: String) {
        self.mut_data(document).text = text;
    }

    fn mut_data<'a>(&self, document: &'a mut Document) -> &'a mut NodeData {
        &mut document.store[self.id]
    }
}

impl Node {
    fn data<'a>(&self, document: &'a Document) -> &'a NodeData {
        &document.store[self.id]
    }

    /// Local name of the element. `<svg:rect>` -> `"rect"`.
    pub fn name<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).name
    }

    /// Attributes in source order.
    pub fn attributes<'a>(&self, document: &'a Document) -> &'a [Attribute] {
        &self.data(document).attributes
    }

    /// Value of the first attribute called `name`, prefix included (`"xlink:href"`).
    pub fn attribute<'a>(&self, document: &'a Document, name: &str) -> Option<&'a str> {
        self.attributes(document)
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Character data directly inside this element.
    pub fn text<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).text
    }

    pub fn parent(&self, document: &Document) -> Option<Node> {
        self.data(document).parent
    }

    /// ```ignore
    /// document.root() == Some(self)
    /// ```
    pub fn is_root(&self, document: &Document) -> bool {
        document.root == Some(*self)
    }

    pub fn children<'a>(&self, document: &'a Document) -> &'a [Node] {
        &self.data(document).children
    }

    /// ```ignore
    /// !self.children(document).is_empty()
    /// ```
    pub fn has_children(&self, document: &Document) -> bool {
        !self.children(document).is_empty()
    }

    fn _children_recursive(&self, document: &Document, nodes: &mut Vec<Node>) {
        for child in self.children(document) {
            nodes.push(*child);
            child._children_recursive(document, nodes);
        }
    }

    /// All descendants in document order, excluding `self`.
    pub fn children_recursive(&self, document: &Document) -> Vec<Node> {
        let mut nodes = Vec::new();
        self._children_recursive(document, &mut nodes);
        nodes
    }

    /// Descendants named `name`, in document order.
    pub fn find_by_name(&self, document: &Document, name: &str) -> Vec<Node> {
        self.children_recursive(document)
            .into_iter()
            .filter(|node| node.name(document) == name)
            .collect()
    }

    pub fn first_child_by_name(&self, document: &Document, name: &str) -> Option<Node> {
        self.children(document)
            .iter()
            .find(|node| node.name(document) == name)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, Node, Node, Node) {
        let mut doc = Document::new();
        let outer = Node::new(&mut doc, "outer".to_string(), Vec::new(), None);
        let first = Node::new(
            &mut doc,
            "item".to_string(),
            vec![Attribute::new("id", "1"), Attribute::new("xml:lang", "en")],
            Some(outer),
        );
        let second = Node::new(&mut doc, "item".to_string(), Vec::new(), Some(outer));
        (doc, outer, first, second)
    }

    #[test]
    fn test_links() {
        let (doc, outer, first, second) = sample();
        assert_eq!(doc.root(), Some(outer));
        assert!(outer.is_root(&doc));
        assert!(!first.is_root(&doc));
        assert_eq!(outer.children(&doc), &[first, second]);
        assert_eq!(first.parent(&doc), Some(outer));
        assert_eq!(outer.parent(&doc), None);
        assert_eq!(doc.len(), 3);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_attribute_lookup() {
        let (doc, _, first, second) = sample();
        assert_eq!(first.attribute(&doc, "xml:lang"), Some("en"));
        assert_eq!(first.attribute(&doc, "lang"), None);
        assert!(second.attributes(&doc).is_empty());
    }

    #[test]
    fn test_find_by_name() {
        let (mut doc, outer, first, second) = sample();
        let nested = Node::new(&mut doc, "item".to_string(), Vec::new(), Some(first));
        assert_eq!(outer.children_recursive(&doc), vec![first, nested, second]);
        assert_eq!(outer.find_by_name(&doc, "item"), vec![first, nested, second]);
        assert_eq!(outer.first_child_by_name(&doc, "item"), Some(first));
        assert_eq!(outer.first_child_by_name(&doc, "missing"), None);
        assert!(first.has_children(&doc));
        assert!(!second.has_children(&doc));
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.root(), None);
        assert_eq!(doc.processing_instruction(), None);
        assert!(doc.directives().is_empty());
    }
}
