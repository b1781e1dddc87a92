//! XML Document - Arena-based DOM representation
//!
//! Nodes live in one `Vec` and refer to each other by `NodeId`. Node 0 is
//! always the document node.

use super::builder::TreeBuilder;
use super::node::{NodeId, NodeKind, XmlNode};
use crate::core::attributes::Attributes;
use crate::core::entities::EntityTable;
use crate::core::error::Result;
use crate::reader::pull::PullParser;

/// Values from the XML declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// An XML document stored in arena format
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<XmlNode>,
    root_element: Option<NodeId>,
    pub(crate) declaration: Option<XmlDeclaration>,
    pub(crate) doctype: Option<String>,
    pub(crate) entities: EntityTable,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(XmlNode::document());
        Document {
            nodes,
            root_element: None,
            declaration: None,
            doctype: None,
            entities: EntityTable::new(),
        }
    }

    /// Parse a complete document from text
    pub fn parse(input: &str) -> Result<Self> {
        TreeBuilder::new(PullParser::new(input)).build()
    }

    /// Parse a complete document from bytes, detecting the encoding
    pub fn parse_bytes(input: Vec<u8>) -> Result<Self> {
        TreeBuilder::new(PullParser::from_bytes(input)?).build()
    }

    /// Add a node under `parent` and return its id
    pub(crate) fn append(&mut self, parent: NodeId, node: XmlNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        let is_root = parent == 0 && node.is_element();
        self.nodes.push(node);
        self.link_child(parent, node_id);
        if is_root && self.root_element.is_none() {
            self.root_element = Some(node_id);
        }
        node_id
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let last_child_opt = self.nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            self.nodes[child_id as usize].prev_sibling = Some(last_child_id);
            self.nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            self.nodes[parent_id as usize].first_child = Some(child_id);
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }

    /// Get the document node (index 0)
    pub fn document_node(&self) -> &XmlNode {
        &self.nodes[0]
    }

    /// Get the root element
    pub fn root_element(&self) -> Option<&XmlNode> {
        self.root_element.and_then(|id| self.get_node(id))
    }

    pub fn root_element_id(&self) -> Option<NodeId> {
        self.root_element
    }

    pub fn root_name(&self) -> Option<&str> {
        self.root_element().map(|node| node.name.as_str())
    }

    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.get_node(id).map(|node| node.name.as_str())
    }

    /// Get content of a text or CDATA node
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.is_text() {
            node.content.as_deref()
        } else {
            None
        }
    }

    /// Concatenated text of every text and CDATA descendant
    pub fn text(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|child| self.text_content(child))
            .collect()
    }

    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        self.get_node(id)
            .filter(|node| node.is_element())
            .map(|node| &node.attributes)
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)?.get(name)
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over the element children of a node
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(|&child| self.get_node(child).is_some_and(XmlNode::is_element))
    }

    /// Iterate over all descendants of a node in document order
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut stack = Vec::new();
        if let Some(node) = self.get_node(id) {
            let mut child_id = node.last_child;
            while let Some(cid) = child_id {
                stack.push(cid);
                child_id = self.get_node(cid).and_then(|n| n.prev_sibling);
            }
        }
        DescendantIter { doc: self, stack }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }

    /// Name given in the DOCTYPE, if any
    pub fn doctype_name(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Internal general entities declared in the DOCTYPE
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    /// Serialize the whole document back to markup
    ///
    /// The DOCTYPE is not written; every reference was already expanded
    /// while building, so text is escaped literally and the output stands
    /// alone.
    pub fn to_xml(&self) -> String {
        let mut buf = String::with_capacity(1024);
        if let Some(decl) = &self.declaration {
            buf.push_str("<?xml");
            for (name, value) in [
                ("version", &decl.version),
                ("encoding", &decl.encoding),
                ("standalone", &decl.standalone),
            ] {
                if let Some(value) = value {
                    buf.push(' ');
                    buf.push_str(name);
                    buf.push_str("=\"");
                    buf.push_str(value);
                    buf.push('"');
                }
            }
            buf.push_str("?>");
        }
        self.write_node(0, &mut buf);
        buf
    }

    /// Serialize one node and its subtree
    pub fn node_to_xml(&self, id: NodeId) -> String {
        let mut buf = String::with_capacity(256);
        self.write_node(id, &mut buf);
        buf
    }

    /// Iterative walk with an explicit stack so deep trees cannot overflow
    fn write_node(&self, node_id: NodeId, buf: &mut String) {
        enum StackEntry {
            Enter(NodeId),
            Close(NodeId),
        }

        let mut stack: Vec<StackEntry> = vec![StackEntry::Enter(node_id)];

        while let Some(entry) = stack.pop() {
            let id = match entry {
                StackEntry::Close(id) => {
                    if let Some(name) = self.node_name(id) {
                        buf.push_str("</");
                        buf.push_str(name);
                        buf.push('>');
                    }
                    continue;
                }
                StackEntry::Enter(id) => id,
            };
            let Some(node) = self.get_node(id) else {
                continue;
            };
            let content = node.content.as_deref().unwrap_or("");

            match node.kind {
                NodeKind::Element => {
                    buf.push('<');
                    buf.push_str(&node.name);
                    for attr in &node.attributes {
                        buf.push(' ');
                        buf.push_str(&attr.name);
                        buf.push_str("=\"");
                        escape_to_buf(&attr.value, buf);
                        buf.push('"');
                    }
                    if node.first_child.is_none() {
                        buf.push_str("/>");
                        continue;
                    }
                    buf.push('>');
                    stack.push(StackEntry::Close(id));
                    self.push_children(node, &mut stack, StackEntry::Enter);
                }
                NodeKind::Document => self.push_children(node, &mut stack, StackEntry::Enter),
                NodeKind::Text => escape_to_buf(content, buf),
                NodeKind::CData => {
                    buf.push_str("<![CDATA[");
                    buf.push_str(content);
                    buf.push_str("]]>");
                }
                NodeKind::Comment => {
                    buf.push_str("<!--");
                    buf.push_str(content);
                    buf.push_str("-->");
                }
                NodeKind::ProcessingInstruction => {
                    buf.push_str("<?");
                    buf.push_str(&node.name);
                    if let Some(data) = &node.content {
                        buf.push(' ');
                        buf.push_str(data);
                    }
                    buf.push_str("?>");
                }
            }
        }
    }

    /// Push children in reverse so the first child is popped first
    fn push_children<E>(&self, node: &XmlNode, stack: &mut Vec<E>, wrap: fn(NodeId) -> E) {
        let mut child_id = node.last_child;
        while let Some(cid) = child_id {
            stack.push(wrap(cid));
            child_id = self.get_node(cid).and_then(|n| n.prev_sibling);
        }
    }
}

/// Escape markup characters in an already-expanded value
///
/// Every `&` is escaped; node content never holds a reference.
#[inline]
fn escape_to_buf(s: &str, buf: &mut String) {
    for c in s.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            _ => buf.push(c),
        }
    }
}

/// Iterator over child nodes
pub struct ChildIter<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first, document order)
pub struct DescendantIter<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Some(node) = self.doc.get_node(current) {
            let mut child_id = node.last_child;
            while let Some(id) = child_id {
                self.stack.push(id);
                child_id = self.doc.get_node(id).and_then(|n| n.prev_sibling);
            }
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let doc = Document::parse("<root><child>text</child></root>").unwrap();
        assert_eq!(doc.root_name(), Some("root"));
        // document, root, child, text
        assert_eq!(doc.node_count(), 4);
    }

    #[test]
    fn test_children_and_descendants() {
        let doc = Document::parse("<r><a><b/></a><c/>tail</r>").unwrap();
        let root = doc.root_element_id().unwrap();

        let names: Vec<_> = doc
            .children(root)
            .map(|id| doc.get_node(id).unwrap().kind)
            .collect();
        assert_eq!(names, [NodeKind::Element, NodeKind::Element, NodeKind::Text]);

        let elements: Vec<_> = doc
            .descendants(root)
            .filter_map(|id| doc.get_node(id).filter(|n| n.is_element()))
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(elements, ["a", "b", "c"]);
        assert_eq!(doc.child_elements(root).count(), 2);
    }

    #[test]
    fn test_depth_and_parent() {
        let doc = Document::parse("<r><a><b/></a></r>").unwrap();
        let b = doc
            .descendants(0)
            .find(|&id| doc.node_name(id) == Some("b"))
            .unwrap();
        let node = doc.get_node(b).unwrap();
        assert_eq!(node.depth, 3);
        assert_eq!(doc.node_name(node.parent.unwrap()), Some("a"));
    }

    #[test]
    fn test_text_concatenation() {
        let doc = Document::parse("<r>a<x>b</x><![CDATA[c]]><!--no--></r>").unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.text(root), "abc");
    }

    #[test]
    fn test_attributes_expanded() {
        let doc = Document::parse(r#"<r a="1 &lt; 2" b='x'/>"#).unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.get_attribute(root, "a"), Some("1 < 2"));
        assert_eq!(doc.get_attribute(root, "b"), Some("x"));
        assert_eq!(doc.get_attribute(root, "c"), None);
        assert_eq!(doc.get_attribute(0, "a"), None);
    }

    #[test]
    fn test_to_xml_round_trip() {
        let input = r#"<?xml version="1.0"?><r id="a&amp;b"><a>1 &lt; 2</a><b/><?pi data?><!--c--><![CDATA[<raw>]]></r>"#;
        let doc = Document::parse(input).unwrap();
        assert_eq!(
            doc.to_xml(),
            r#"<?xml version="1.0"?><r id="a&amp;b"><a>1 &lt; 2</a><b/><?pi data?><!--c--><![CDATA[<raw>]]></r>"#
        );
        let reparsed = Document::parse(&doc.to_xml()).unwrap();
        assert_eq!(reparsed.node_count(), doc.node_count());
    }

    #[test]
    fn test_to_xml_escapes_expanded_ampersand() {
        let input = r#"<r a="&amp;gt;">&amp;lt;</r>"#;
        let doc = Document::parse(input).unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.text(root), "&lt;");
        assert_eq!(doc.get_attribute(root, "a"), Some("&gt;"));
        assert_eq!(doc.to_xml(), input);

        let reparsed = Document::parse(&doc.to_xml()).unwrap();
        let root = reparsed.root_element_id().unwrap();
        assert_eq!(reparsed.text(root), "&lt;");
        assert_eq!(reparsed.get_attribute(root, "a"), Some("&gt;"));
    }

    #[test]
    fn test_node_to_xml() {
        let doc = Document::parse("<r><a x=\"1\">t</a></r>").unwrap();
        let a = doc.child_elements(doc.root_element_id().unwrap()).next().unwrap();
        assert_eq!(doc.node_to_xml(a), "<a x=\"1\">t</a>");
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert_eq!(doc.root_element_id(), None);
        assert_eq!(doc.to_xml(), "");
        assert_eq!(doc.document_node().kind, NodeKind::Document);
    }
}
