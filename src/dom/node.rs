//! XML Node representation
//!
//! Uses NodeId (u32) for compact node references into the document arena.

use crate::core::attributes::Attributes;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: NodeKind,
    /// Parent node (None for document root)
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// Element name or PI target; empty otherwise
    pub name: String,
    /// Character content for text, CDATA, comment and PI nodes
    pub content: Option<String>,
    /// Attributes with values already expanded (elements only)
    pub attributes: Attributes,
    /// Depth in document tree
    pub depth: u16,
}

impl XmlNode {
    fn new(kind: NodeKind, parent: Option<NodeId>, depth: u16) -> Self {
        XmlNode {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name: String::new(),
            content: None,
            attributes: Attributes::new(),
            depth,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::new(NodeKind::Document, None, 0)
    }

    pub fn element(name: impl Into<String>, attributes: Attributes, parent: NodeId, depth: u16) -> Self {
        XmlNode {
            name: name.into(),
            attributes,
            ..Self::new(NodeKind::Element, Some(parent), depth)
        }
    }

    /// Create a character node (text, CDATA or comment)
    pub fn character(kind: NodeKind, content: impl Into<String>, parent: NodeId, depth: u16) -> Self {
        XmlNode {
            content: Some(content.into()),
            ..Self::new(kind, Some(parent), depth)
        }
    }

    pub fn processing_instruction(
        target: impl Into<String>,
        content: Option<String>,
        parent: NodeId,
        depth: u16,
    ) -> Self {
        XmlNode {
            name: target.into(),
            content,
            ..Self::new(NodeKind::ProcessingInstruction, Some(parent), depth)
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this is a text or CDATA node
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::CData)
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }
}
