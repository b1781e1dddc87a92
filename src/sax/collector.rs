//! SAX Collector
//!
//! Implements StreamListener to gather dispatched events into a list.

use super::events::SaxEvent;
use super::stream::{StreamListener, StreamParser};
use crate::core::attributes::Attributes;
use crate::core::dtd::{AttListDecl, EntityDecl, NotationDecl};
use crate::core::error::Result;

/// Listener that records every callback as a [`SaxEvent`]
#[derive(Debug, Default)]
pub struct SaxCollector {
    events: Vec<SaxEvent>,
}

impl SaxCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn declaration(&mut self, kind: &'static str, name: &str) {
        self.events.push(SaxEvent::Declaration {
            kind,
            name: name.to_string(),
        });
    }
}

impl StreamListener for SaxCollector {
    fn tag_start(&mut self, name: &str, attributes: &Attributes) {
        self.events.push(SaxEvent::StartElement {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|a| (a.name.clone(), a.value.clone()))
                .collect(),
        });
    }

    fn tag_end(&mut self, name: &str) {
        self.events.push(SaxEvent::EndElement {
            name: name.to_string(),
        });
    }

    fn text(&mut self, text: &str) {
        self.events.push(SaxEvent::Text(text.to_string()));
    }

    fn instruction(&mut self, target: &str, content: Option<&str>) {
        self.events.push(SaxEvent::ProcessingInstruction {
            target: target.to_string(),
            data: content.map(str::to_string),
        });
    }

    fn comment(&mut self, comment: &str) {
        self.events.push(SaxEvent::Comment(comment.to_string()));
    }

    fn cdata(&mut self, content: &str) {
        self.events.push(SaxEvent::CData(content.to_string()));
    }

    fn attlistdecl(&mut self, decl: &AttListDecl) {
        self.declaration("attlist", &decl.element);
    }

    fn entitydecl(&mut self, decl: &EntityDecl) {
        self.declaration("entity", &decl.name);
    }

    fn notationdecl(&mut self, decl: &NotationDecl) {
        self.declaration("notation", &decl.name);
    }
}

/// Parse input and return the dispatched events
pub fn parse_sax(input: &str) -> Result<Vec<SaxEvent>> {
    let mut parser = StreamParser::from_str(input, SaxCollector::new());
    parser.parse()?;
    Ok(parser.into_listener().take_events())
}
