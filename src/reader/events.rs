//! XML Event Types
//!
//! Event types for pull-parser style XML processing. Every payload is an
//! owned copy: events stay valid after the parser has moved on.

use crate::core::attributes::Attributes;
use crate::core::dtd::{AttListDecl, EntityDecl, ExternalId, NotationDecl};

/// XML parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Start of an element: <name attrs...>
    StartElement { name: String, attributes: Attributes },
    /// End of an element: </name>, also synthesized after <name/>
    EndElement { name: String },
    /// Raw text between tags, entity references unexpanded
    Text(String),
    /// Comment content
    Comment(String),
    /// CDATA section content
    CData(String),
    /// Processing instruction: <?target content?>
    ProcessingInstruction {
        target: String,
        content: Option<String>,
    },
    /// XML declaration: <?xml version="1.0"?>
    XmlDecl {
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<String>,
    },
    /// Start of a document type declaration
    StartDoctype {
        name: String,
        external_id: Option<ExternalId>,
    },
    /// End of a document type declaration
    EndDoctype,
    EntityDecl(EntityDecl),
    NotationDecl(NotationDecl),
    AttListDecl(AttListDecl),
    /// `<!ELEMENT ...>` as written, without the closing `>`
    ElementDecl(String),
    /// Parameter-entity reference in the internal subset: `%name;`
    ExternalEntity(String),
    /// End of document; repeated on every further pull
    EndDocument,
    /// Placeholder for consumers; never produced by the parser
    Dummy,
}

impl Event {
    /// Short snake_case name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StartElement { .. } => "start_element",
            Event::EndElement { .. } => "end_element",
            Event::Text(_) => "text",
            Event::Comment(_) => "comment",
            Event::CData(_) => "cdata",
            Event::ProcessingInstruction { .. } => "processing_instruction",
            Event::XmlDecl { .. } => "xmldecl",
            Event::StartDoctype { .. } => "start_doctype",
            Event::EndDoctype => "end_doctype",
            Event::EntityDecl(_) => "entitydecl",
            Event::NotationDecl(_) => "notationdecl",
            Event::AttListDecl(_) => "attlistdecl",
            Event::ElementDecl(_) => "elementdecl",
            Event::ExternalEntity(_) => "externalentity",
            Event::EndDocument => "end_document",
            Event::Dummy => "dummy",
        }
    }

    /// Shorthand for a start element event
    pub fn start(name: impl Into<String>, attributes: Attributes) -> Self {
        Event::StartElement {
            name: name.into(),
            attributes,
        }
    }

    /// Shorthand for an end element event
    pub fn end(name: impl Into<String>) -> Self {
        Event::EndElement { name: name.into() }
    }

    /// Shorthand for a text event
    pub fn text(raw: impl Into<String>) -> Self {
        Event::Text(raw.into())
    }

    /// Check if this is a start element event
    pub fn is_start_element(&self) -> bool {
        matches!(self, Event::StartElement { .. })
    }

    /// Check if this is an end element event
    pub fn is_end_element(&self) -> bool {
        matches!(self, Event::EndElement { .. })
    }

    /// Check if this is a text event
    pub fn is_text(&self) -> bool {
        matches!(self, Event::Text(_))
    }

    pub fn is_end_document(&self) -> bool {
        matches!(self, Event::EndDocument)
    }

    /// True for events produced inside a document type declaration
    pub fn is_doctype_event(&self) -> bool {
        matches!(
            self,
            Event::StartDoctype { .. }
                | Event::EndDoctype
                | Event::EntityDecl(_)
                | Event::NotationDecl(_)
                | Event::AttListDecl(_)
                | Event::ElementDecl(_)
                | Event::ExternalEntity(_)
        )
    }

    /// Element name of a start or end element event
    pub fn element_name(&self) -> Option<&str> {
        match self {
            Event::StartElement { name, .. } | Event::EndElement { name } => Some(name),
            _ => None,
        }
    }

    /// Get attributes of a start element event
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Event::StartElement { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Get text content of a text or CDATA event
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Event::Text(t) | Event::CData(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_element() {
        let attributes: Attributes = [("id", "1")].into_iter().collect();
        let event = Event::start("svg:rect", attributes);
        assert!(event.is_start_element());
        assert_eq!(event.element_name(), Some("svg:rect"));
        assert_eq!(event.attributes().and_then(|a| a.get("id")), Some("1"));
        assert_eq!(event.kind(), "start_element");
    }

    #[test]
    fn test_text_accessors() {
        assert_eq!(Event::text("a &amp; b").as_text(), Some("a &amp; b"));
        assert_eq!(Event::CData("<x>".into()).as_text(), Some("<x>"));
        assert_eq!(Event::end("a").as_text(), None);
    }

    #[test]
    fn test_doctype_events() {
        assert!(Event::EndDoctype.is_doctype_event());
        assert!(Event::ElementDecl("<!ELEMENT a ANY".into()).is_doctype_event());
        assert!(!Event::EndDocument.is_doctype_event());
    }
}
