//! Stream Listener Dispatch
//!
//! Drives a [`PullParser`] to the end of the document and forwards each
//! event to a flat set of callbacks. Internal general entities declared in
//! the DOCTYPE are collected as they arrive, and text and attribute values
//! are expanded against them before the listener sees them.

use crate::core::attributes::Attributes;
use crate::core::dtd::{AttListDecl, EntityDecl, ExternalId, NotationDecl};
use crate::core::entities::EntityTable;
use crate::core::error::{ParseError, Result};
use crate::reader::events::Event;
use crate::reader::pull::PullParser;

/// Callbacks for stream parsing
///
/// Every method has an empty default, so implementors override only what
/// they need.
pub trait StreamListener {
    /// Called when an element starts; attribute values are expanded
    fn tag_start(&mut self, _name: &str, _attributes: &Attributes) {}

    /// Called when an element ends, including after `<name/>`
    fn tag_end(&mut self, _name: &str) {}

    /// Called for text content with references expanded
    fn text(&mut self, _text: &str) {}

    /// Called for processing instructions
    fn instruction(&mut self, _target: &str, _content: Option<&str>) {}

    fn comment(&mut self, _comment: &str) {}

    fn cdata(&mut self, _content: &str) {}

    fn xmldecl(&mut self, _version: Option<&str>, _encoding: Option<&str>, _standalone: Option<&str>) {}

    /// Called for the head of a DOCTYPE
    fn doctype(&mut self, _name: &str, _external_id: Option<&ExternalId>) {}

    fn doctype_end(&mut self) {}

    /// Called with an `<!ELEMENT` declaration as written
    fn elementdecl(&mut self, _content: &str) {}

    fn attlistdecl(&mut self, _decl: &AttListDecl) {}

    fn entitydecl(&mut self, _decl: &EntityDecl) {}

    fn notationdecl(&mut self, _decl: &NotationDecl) {}

    /// Called for a parameter-entity reference in the internal subset
    fn entity(&mut self, _reference: &str) {}
}

/// Pull parser driven to completion, dispatching to a [`StreamListener`]
#[derive(Debug)]
pub struct StreamParser<L> {
    parser: PullParser,
    listener: L,
    entities: EntityTable,
    tags: Vec<String>,
}

impl<L: StreamListener> StreamParser<L> {
    pub fn new(parser: PullParser, listener: L) -> Self {
        StreamParser {
            parser,
            listener,
            entities: EntityTable::new(),
            tags: Vec::new(),
        }
    }

    /// Convenience constructor over decoded text
    pub fn from_str(input: &str, listener: L) -> Self {
        Self::new(PullParser::new(input), listener)
    }

    /// Parse to the end of the document
    pub fn parse(&mut self) -> Result<()> {
        loop {
            match self.parser.pull()? {
                Event::EndDocument => {
                    if !self.tags.is_empty() {
                        return Err(ParseError::end_of_input(
                            format!("Missing end tag for '/{}'", self.tags.join("/")),
                            self.parser.position(),
                        ));
                    }
                    return Ok(());
                }
                Event::StartElement { name, attributes } => {
                    let expanded = self.expand_attributes(&attributes)?;
                    self.listener.tag_start(&name, &expanded);
                    self.tags.push(name);
                }
                Event::EndElement { name } => {
                    self.listener.tag_end(&name);
                    self.tags.pop();
                }
                Event::Text(raw) => {
                    let text = self.parser.unnormalize(&raw, Some(&self.entities))?;
                    self.listener.text(&text);
                }
                Event::ProcessingInstruction { target, content } => {
                    self.listener.instruction(&target, content.as_deref());
                }
                Event::StartDoctype { name, external_id } => {
                    self.listener.doctype(&name, external_id.as_ref());
                }
                Event::EndDoctype => self.listener.doctype_end(),
                Event::Comment(comment) => self.listener.comment(&comment),
                Event::CData(content) => self.listener.cdata(&content),
                Event::XmlDecl {
                    version,
                    encoding,
                    standalone,
                } => self.listener.xmldecl(
                    version.as_deref(),
                    encoding.as_deref(),
                    standalone.as_deref(),
                ),
                Event::ElementDecl(content) => self.listener.elementdecl(&content),
                Event::AttListDecl(decl) => self.listener.attlistdecl(&decl),
                Event::EntityDecl(decl) => {
                    if let (false, Some(value)) = (decl.is_parameter, decl.internal_value()) {
                        self.entities.insert(decl.name.clone(), value.to_string());
                    }
                    self.listener.entitydecl(&decl);
                }
                Event::NotationDecl(decl) => self.listener.notationdecl(&decl),
                Event::ExternalEntity(reference) => self.listener.entity(&reference),
                Event::Dummy => {}
            }
        }
    }

    fn expand_attributes(&mut self, attributes: &Attributes) -> Result<Attributes> {
        let mut expanded = Vec::with_capacity(attributes.len());
        for attr in attributes {
            let value = self.parser.unnormalize(&attr.value, Some(&self.entities))?;
            expanded.push((attr.name.clone(), value));
        }
        Ok(expanded.into_iter().collect())
    }

    /// Internal general entities declared so far
    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn into_listener(self) -> L {
        self.listener
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl StreamListener for Recorder {
        fn tag_start(&mut self, name: &str, attributes: &Attributes) {
            let attrs: Vec<_> = attributes.iter().map(|a| format!("{}={}", a.name, a.value)).collect();
            self.calls.push(format!("start {} [{}]", name, attrs.join(",")));
        }

        fn tag_end(&mut self, name: &str) {
            self.calls.push(format!("end {}", name));
        }

        fn text(&mut self, text: &str) {
            self.calls.push(format!("text {}", text));
        }

        fn doctype(&mut self, name: &str, _external_id: Option<&ExternalId>) {
            self.calls.push(format!("doctype {}", name));
        }

        fn entitydecl(&mut self, decl: &EntityDecl) {
            self.calls.push(format!("entity {}", decl.name));
        }
    }

    #[test]
    fn test_dispatch_expands_text_and_attributes() {
        let input = r#"<!DOCTYPE r [<!ENTITY who "world">]><r a="&who;&amp;">hello &who;</r>"#;
        let mut parser = StreamParser::from_str(input, Recorder::default());
        parser.parse().unwrap();
        assert_eq!(
            parser.listener().calls,
            [
                "doctype r",
                "entity who",
                "start r [a=world&]",
                "text hello world",
                "end r"
            ]
        );
        assert_eq!(parser.entities().get("who").map(String::as_str), Some("world"));
    }

    #[test]
    fn test_parameter_entities_not_collected() {
        let input = r#"<!DOCTYPE r [<!ENTITY % p "x">]><r>&p;</r>"#;
        let mut parser = StreamParser::from_str(input, Recorder::default());
        parser.parse().unwrap();
        assert!(parser.entities().is_empty());
        assert!(parser.listener().calls.contains(&"text &p;".to_string()));
    }

    #[test]
    fn test_default_callbacks() {
        struct Silent;
        impl StreamListener for Silent {}
        let mut parser = StreamParser::from_str("<?pi x?><r><![CDATA[c]]><!--k--></r>", Silent);
        parser.parse().unwrap();
    }

    #[test]
    fn test_errors_propagate() {
        let mut parser = StreamParser::from_str("<r><a></r>", Recorder::default());
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Structural);
        assert_eq!(parser.into_listener().calls, ["start r []", "start a []"]);
    }
}
