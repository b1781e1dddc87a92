//! SAX Event Types
//!
//! Owned record of the callbacks a [`StreamListener`](super::StreamListener)
//! received, with text and attribute values already expanded.

/// A dispatched stream event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// Start of an element, attribute values expanded
    StartElement {
        name: String,
        attributes: Vec<(String, String)>,
    },

    /// End of an element
    EndElement { name: String },

    /// Text content, references expanded
    Text(String),

    /// CDATA section content
    CData(String),

    /// Comment content
    Comment(String),

    /// Processing instruction
    ProcessingInstruction {
        target: String,
        data: Option<String>,
    },

    /// Any declaration from the DOCTYPE, by kind and name
    Declaration { kind: &'static str, name: String },
}

impl SaxEvent {
    /// Check if this is a start element event
    pub fn is_start_element(&self) -> bool {
        matches!(self, SaxEvent::StartElement { .. })
    }

    /// Check if this is a text event
    pub fn is_text(&self) -> bool {
        matches!(self, SaxEvent::Text(_))
    }
}
