//! Tree Builder
//!
//! Pulls events and grows a [`Document`], keeping a stack of the elements
//! currently being built. Text and attribute values are expanded against
//! the internal entities declared in the DOCTYPE.

use tracing::debug;

use super::document::{Document, XmlDeclaration};
use super::node::{NodeId, NodeKind, XmlNode};
use crate::core::attributes::Attributes;
use crate::core::error::Result;
use crate::core::source::is_blank;
use crate::reader::events::Event;
use crate::reader::pull::PullParser;

/// Builds a [`Document`] from a pull parser
#[derive(Debug)]
pub struct TreeBuilder {
    parser: PullParser,
    document: Document,
    /// Current build context; the bottom entry is the document node
    context: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new(parser: PullParser) -> Self {
        TreeBuilder {
            parser,
            document: Document::new(),
            context: vec![0],
        }
    }

    /// Consume events up to `EndDocument` and return the finished tree
    pub fn build(mut self) -> Result<Document> {
        loop {
            match self.parser.pull()? {
                Event::EndDocument => break,
                Event::StartElement { name, attributes } => {
                    let attributes = self.expand_attributes(&attributes)?;
                    let parent = self.current();
                    let node = XmlNode::element(name, attributes, parent, self.depth());
                    let id = self.document.append(parent, node);
                    self.context.push(id);
                }
                Event::EndElement { .. } => {
                    if self.context.len() > 1 {
                        self.context.pop();
                    }
                }
                Event::Text(raw) => {
                    // Whitespace between top-level nodes is not kept
                    if self.context.len() == 1 && is_blank(&raw) {
                        continue;
                    }
                    let text = self.parser.unnormalize(&raw, Some(&self.document.entities))?;
                    self.append_character(NodeKind::Text, text);
                }
                Event::CData(content) => self.append_character(NodeKind::CData, content),
                Event::Comment(content) => self.append_character(NodeKind::Comment, content),
                Event::ProcessingInstruction { target, content } => {
                    let parent = self.current();
                    let node = XmlNode::processing_instruction(target, content, parent, self.depth());
                    self.document.append(parent, node);
                }
                Event::XmlDecl {
                    version,
                    encoding,
                    standalone,
                } => {
                    self.document.declaration = Some(XmlDeclaration {
                        version,
                        encoding,
                        standalone,
                    });
                }
                Event::StartDoctype { name, .. } => self.document.doctype = Some(name),
                Event::EntityDecl(decl) => {
                    if let (false, Some(value)) = (decl.is_parameter, decl.internal_value()) {
                        self.document.entities.insert(decl.name.clone(), value.to_string());
                    }
                }
                _ => {}
            }
        }

        debug!(nodes = self.document.node_count(), "document built");
        Ok(self.document)
    }

    fn current(&self) -> NodeId {
        self.context.last().copied().unwrap_or(0)
    }

    fn depth(&self) -> u16 {
        u16::try_from(self.context.len()).unwrap_or(u16::MAX)
    }

    fn append_character(&mut self, kind: NodeKind, content: String) {
        let parent = self.current();
        let node = XmlNode::character(kind, content, parent, self.depth());
        self.document.append(parent, node);
    }

    fn expand_attributes(&mut self, attributes: &Attributes) -> Result<Attributes> {
        let mut expanded = Vec::with_capacity(attributes.len());
        for attr in attributes {
            let value = self
                .parser
                .unnormalize(&attr.value, Some(&self.document.entities))?;
            expanded.push((attr.name.clone(), value));
        }
        Ok(expanded.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::ParserConfig;

    #[test]
    fn test_build_with_entities() {
        let input = r#"<!DOCTYPE r [<!ENTITY n "name">]><r t="&n;">hi &n;</r>"#;
        let doc = TreeBuilder::new(PullParser::new(input)).build().unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.doctype_name(), Some("r"));
        assert_eq!(doc.get_attribute(root, "t"), Some("name"));
        assert_eq!(doc.text(root), "hi name");
        assert_eq!(doc.entities().len(), 1);
    }

    #[test]
    fn test_prolog_whitespace_dropped() {
        let doc = Document::parse("<?xml version=\"1.0\"?>\n<!--top-->\n<r/>\n").unwrap();
        let top: Vec<_> = doc
            .children(0)
            .map(|id| doc.get_node(id).unwrap().kind)
            .collect();
        assert_eq!(top, [NodeKind::Comment, NodeKind::Element]);
        assert_eq!(
            doc.declaration().and_then(|d| d.version.as_deref()),
            Some("1.0")
        );
    }

    #[test]
    fn test_build_error() {
        let err = Document::parse("<r><a></b></r>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);
    }

    #[test]
    fn test_expansion_limit_applies() {
        let input = r#"<!DOCTYPE r [<!ENTITY a "xx"><!ENTITY b "&a;&a;&a;">]><r>&b;&b;</r>"#;
        let config = ParserConfig::default().with_entity_expansion_limit(3);
        let err = TreeBuilder::new(PullParser::with_config(input, config))
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SecurityLimit);
    }
}
