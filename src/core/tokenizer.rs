//! XML Tokenizer - State machine for XML event extraction
//!
//! Consumes the source cursor and produces one [`Event`] per call:
//! - Element start/end tags (a synthesized end follows every `<name/>`)
//! - Raw text, comments, CDATA sections, processing instructions
//! - The xml declaration, which may switch the source encoding
//! - The DOCTYPE head and the declarations of its internal subset
//!
//! The document status gates which productions are legal next. Open tags and
//! namespace restore frames are pushed and popped together, so their depths
//! agree after every call.

use super::attributes::parse_attributes;
use super::dtd;
use super::encoding::XmlEncoding;
use super::error::{ParseError, Result};
use super::namespace::NamespaceTracker;
use super::source::{is_blank, Source};
use crate::reader::events::Event;
use std::collections::VecDeque;

/// Which part of the document the tokenizer is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Before the DOCTYPE and the root element
    Prolog,
    /// Between `[` and `]>` of a DOCTYPE
    InDoctypeInternalSubset,
    /// DOCTYPE closed, root element not yet opened
    AfterDoctype,
    /// Root element opened (stays set after it closes)
    InElement,
}

/// Pull tokenizer over a single document
#[derive(Debug)]
pub struct Tokenizer {
    source: Source,
    status: DocumentStatus,
    namespaces: NamespaceTracker,
    /// Qualified names of the currently open elements
    tags: Vec<String>,
    /// Events synthesized together with the previous one
    pending: VecDeque<Event>,
    have_root: bool,
    /// Number of events produced so far
    produced: usize,
}

impl Tokenizer {
    pub fn new(source: Source) -> Self {
        Tokenizer {
            source,
            status: DocumentStatus::Prolog,
            namespaces: NamespaceTracker::new(),
            tags: Vec::with_capacity(16),
            pending: VecDeque::with_capacity(2),
            have_root: false,
            produced: 0,
        }
    }

    #[inline]
    pub fn status(&self) -> DocumentStatus {
        self.status
    }

    /// Byte position of the cursor in the decoded input
    #[inline]
    pub fn position(&self) -> usize {
        self.source.position()
    }

    #[inline]
    pub fn encoding(&self) -> XmlEncoding {
        self.source.encoding()
    }

    /// Nesting depth of open elements
    #[inline]
    pub fn depth(&self) -> usize {
        self.tags.len()
    }

    /// Names of the open elements, outermost first
    #[inline]
    pub fn open_tags(&self) -> &[String] {
        &self.tags
    }

    pub fn namespaces(&self) -> &NamespaceTracker {
        &self.namespaces
    }

    /// True once the input is consumed and no synthesized event is waiting
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty() && self.pending.is_empty()
    }

    /// Anchor an error raised outside the tokenizer at the cursor
    pub fn locate(&self, mut err: ParseError) -> ParseError {
        err.position = self.source.position();
        self.source.error_at(err)
    }

    /// Produce the next event
    ///
    /// After the document ends, every call returns `EndDocument` again.
    pub fn next_event(&mut self) -> Result<Event> {
        let event = self.produce().map_err(|err| self.source.error_at(err))?;
        self.produced += 1;
        tracing::trace!(kind = event.kind(), position = self.source.position(), "event");
        Ok(event)
    }

    fn produce(&mut self) -> Result<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }

        loop {
            if self.source.is_empty() {
                return self.end_of_input();
            }

            match self.status {
                DocumentStatus::Prolog => {
                    if let Some(event) = self.parse_prolog()? {
                        return Ok(event);
                    }
                }
                DocumentStatus::InDoctypeInternalSubset => {
                    self.source.skip_whitespace();
                    if self.source.is_empty() {
                        continue;
                    }
                    return self.parse_internal_subset();
                }
                DocumentStatus::AfterDoctype => {
                    self.source.skip_whitespace();
                    if self.source.is_empty() {
                        continue;
                    }
                }
                DocumentStatus::InElement => {}
            }

            if let Some(event) = self.parse_content()? {
                return Ok(event);
            }
        }
    }

    fn end_of_input(&mut self) -> Result<Event> {
        let position = self.source.position();
        if self.status == DocumentStatus::InDoctypeInternalSubset {
            return Err(ParseError::end_of_input("Malformed DOCTYPE: unclosed", position));
        }
        if !self.tags.is_empty() {
            return Err(ParseError::end_of_input(
                format!("Missing end tag for '/{}'", self.tags.join("/")),
                position,
            ));
        }
        Ok(Event::EndDocument)
    }

    /// Prolog-only productions; None falls through to content parsing
    fn parse_prolog(&mut self) -> Result<Option<Event>> {
        let start = self.source.position();
        if self.source.match_str("<?") {
            return self.parse_processing_instruction(start).map(Some);
        }
        if !self.source.starts_with("<!") {
            return Ok(None);
        }
        if self.source.match_str("<!--") {
            return self.parse_comment(start).map(Some);
        }
        if self.source.match_str("<!DOCTYPE") {
            return self.parse_doctype(start).map(Some);
        }
        Err(ParseError::structural("Invalid XML", start))
    }

    fn parse_doctype(&mut self, start: usize) -> Result<Event> {
        let head = dtd::parse_doctype(&mut self.source, start)?;
        if head.has_internal_subset {
            self.set_status(DocumentStatus::InDoctypeInternalSubset);
        } else {
            self.set_status(DocumentStatus::AfterDoctype);
            self.source.skip_whitespace();
            self.pending.push_back(Event::EndDoctype);
        }
        Ok(Event::StartDoctype {
            name: head.name,
            external_id: head.external_id,
        })
    }

    /// One markup declaration of the internal subset, or its end
    fn parse_internal_subset(&mut self) -> Result<Event> {
        let start = self.source.position();
        let source = &mut self.source;

        if source.match_str("<!ELEMENT") {
            let decl = dtd::parse_element_decl(source, start)?;
            tracing::trace!(decl = %decl, "element declaration");
            return Ok(Event::ElementDecl(decl));
        }
        if source.match_str("<!ENTITY") {
            let decl = dtd::parse_entity_decl(source, start)?;
            tracing::trace!(name = %decl.name, parameter = decl.is_parameter, "entity declaration");
            return Ok(Event::EntityDecl(decl));
        }
        if source.match_str("<!ATTLIST") {
            let decl = dtd::parse_attlist_decl(source, start)?;
            for def in &decl.defs {
                if let (Some(prefix), Some(uri)) = (def.name.strip_prefix("xmlns:"), def.default.value()) {
                    self.namespaces.declare_global(prefix, uri);
                }
            }
            tracing::trace!(element = %decl.element, defs = decl.defs.len(), "attlist declaration");
            return Ok(Event::AttListDecl(decl));
        }
        if source.match_str("<!NOTATION") {
            let decl = dtd::parse_notation_decl(source, start)?;
            tracing::trace!(name = %decl.name, "notation declaration");
            return Ok(Event::NotationDecl(decl));
        }
        if source.match_str("<!--") {
            return self.parse_comment(start);
        }
        if source.starts_with("%") {
            if let Some(name) = source.read_until(";") {
                source.skip_whitespace();
                return Ok(Event::ExternalEntity(format!("{};", name)));
            }
        }
        if source.match_str("]") {
            source.skip_whitespace();
            if source.match_str(">") {
                self.set_status(DocumentStatus::AfterDoctype);
                return Ok(Event::EndDoctype);
            }
        }
        Err(ParseError::structural("Malformed DOCTYPE: invalid declaration", start))
    }

    /// Element-level productions; None means whitespace was skipped
    fn parse_content(&mut self) -> Result<Option<Event>> {
        let start = self.source.position();

        if self.source.match_str("</") {
            return self.parse_end_tag(start).map(Some);
        }
        if self.source.match_str("<!") {
            return self.parse_bang_markup(start).map(Some);
        }
        if self.source.match_str("<?") {
            return self.parse_processing_instruction(start).map(Some);
        }
        if self.source.match_str("<") {
            return self.parse_start_tag(start).map(Some);
        }
        self.parse_text(start)
    }

    fn parse_end_tag(&mut self, start: usize) -> Result<Event> {
        let name = self.source.read_qname().map(|qname| qname.raw);
        self.source.skip_whitespace();
        let closed = name.is_some() && self.source.match_str(">");

        if self.tags.is_empty() {
            let message = match name {
                Some(name) if closed => format!("Unexpected top-level end tag (got '{}')", name),
                _ => "Unexpected top-level end tag".to_string(),
            };
            return Err(ParseError::structural(message, start));
        }

        self.namespaces.pop_frame();
        let last = self.tags.pop().unwrap_or_default();
        match name {
            Some(name) if closed && name == last => {
                if self.tags.is_empty() {
                    tracing::debug!(root = %name, "root element closed");
                }
                Ok(Event::EndElement { name })
            }
            Some(name) if closed => Err(ParseError::structural(
                format!("Missing end tag for '{}' (got '{}')", last, name),
                start,
            )),
            _ => Err(ParseError::structural(
                format!("Missing end tag for '{}'", last),
                start,
            )),
        }
    }

    /// `<!` inside content: a comment or a CDATA section
    fn parse_bang_markup(&mut self, start: usize) -> Result<Event> {
        if self.source.find(">").is_none() {
            return Err(ParseError::structural("Malformed node", start));
        }
        if self.source.starts_with("-") {
            if !self.source.match_str("--") {
                return Err(ParseError::structural("Malformed comment", start));
            }
            return self.parse_comment(start);
        }
        if self.source.match_str("[CDATA[") {
            let Some(body) = self.source.read_until("]]>") else {
                return Err(ParseError::structural("Unclosed CDATA section", start));
            };
            if self.tags.is_empty() {
                return Err(ParseError::structural(
                    "Malformed XML: CDATA section outside the root element",
                    start,
                ));
            }
            return Ok(Event::CData(body));
        }
        Err(ParseError::structural(
            "Declarations can only occur in the doctype declaration.",
            start,
        ))
    }

    /// Comment body, cursor after `<!--`
    fn parse_comment(&mut self, start: usize) -> Result<Event> {
        let Some(body) = self.source.read_until("-->") else {
            return Err(ParseError::structural("Unclosed comment", start));
        };
        if body.contains("--") || body.ends_with('-') {
            return Err(ParseError::structural("Malformed comment", start));
        }
        Ok(Event::Comment(body))
    }

    /// Processing instruction or xml declaration, cursor after `<?`
    fn parse_processing_instruction(&mut self, start: usize) -> Result<Event> {
        const UNCLOSED: &str = "Malformed XML: Unclosed processing instruction";
        let target = dtd::parse_name(
            &mut self.source,
            "Malformed XML: Invalid processing instruction node",
            start,
        )?;

        let content = if self.source.match_whitespace() {
            let body = self
                .source
                .read_until("?>")
                .ok_or_else(|| ParseError::structural(UNCLOSED, start))?;
            Some(body)
        } else {
            if !self.source.match_str("?>") {
                return Err(ParseError::structural(UNCLOSED, start));
            }
            None
        };

        if target != "xml" {
            return Ok(Event::ProcessingInstruction { target, content });
        }
        if self.produced > 0 || self.status != DocumentStatus::Prolog {
            return Err(ParseError::structural(
                "Malformed XML: XML declaration is not at the start",
                start,
            ));
        }

        let content = content.unwrap_or_default();
        let version = pseudo_attribute(&content, "version");
        let mut encoding = pseudo_attribute(&content, "encoding");
        let standalone = pseudo_attribute(&content, "standalone");

        match encoding.as_deref() {
            Some(label) if !XmlEncoding::is_utf16_label(label) => {
                self.source
                    .set_encoding(label)
                    .map_err(|err| ParseError::structural(err.message, start))?;
            }
            None if self.source.encoding().is_utf16() => {
                encoding = Some("UTF-16".to_string());
            }
            _ => {}
        }

        Ok(Event::XmlDecl {
            version,
            encoding,
            standalone,
        })
    }

    fn parse_start_tag(&mut self, start: usize) -> Result<Event> {
        let Some(qname) = self.source.read_qname() else {
            self.source.set_position(start);
            return Err(ParseError::structural("malformed XML: missing tag start", start));
        };
        self.set_status(DocumentStatus::InElement);

        self.namespaces.push_frame();
        let parsed = parse_attributes(&mut self.source, &mut self.namespaces)?;

        let undefined = qname
            .prefix
            .iter()
            .chain(parsed.prefixes.iter())
            .find(|prefix| !self.namespaces.is_bound(prefix));
        if let Some(prefix) = undefined {
            return Err(ParseError::namespace(
                format!("undefined namespace prefix {}", prefix),
                start,
            ));
        }

        let name = qname.raw;
        if self.tags.is_empty() && self.have_root {
            return Err(ParseError::structural(
                format!("Malformed XML: Extra tag at the end of the document (got '<{}')", name),
                start,
            ));
        }

        if parsed.self_closed {
            // No frame outlives a self-closed element
            self.namespaces.pop_frame();
            self.pending.push_back(Event::EndElement { name: name.clone() });
        } else {
            if self.tags.is_empty() {
                tracing::debug!(root = %name, "root element opened");
            }
            self.tags.push(name.clone());
        }
        self.have_root = true;

        Ok(Event::StartElement {
            name,
            attributes: parsed.attributes,
        })
    }

    /// Raw text up to the next `<`; insignificant top-level whitespace yields None
    fn parse_text(&mut self, start: usize) -> Result<Option<Event>> {
        let text = self.source.read_until_byte_or_end(b'<');
        if self.tags.is_empty() {
            if !is_blank(&text) {
                let message = if self.have_root {
                    format!("Malformed XML: Extra content at the end of the document (got '{}')", text)
                } else {
                    format!("Malformed XML: Content at the start of the document (got '{}')", text)
                };
                return Err(ParseError::structural(message, start));
            }
            if self.have_root {
                return Ok(None);
            }
        }
        Ok(Some(Event::Text(text)))
    }

    fn set_status(&mut self, status: DocumentStatus) {
        if self.status != status {
            tracing::debug!(from = ?self.status, to = ?status, "document status");
            self.status = status;
        }
    }
}

/// Value of `name="..."` inside an xml declaration
fn pseudo_attribute(content: &str, name: &str) -> Option<String> {
    let mut search = 0;
    while let Some(found) = content[search..].find(name) {
        let at = search + found;
        search = at + name.len();

        let word_start = content[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        if !word_start {
            continue;
        }

        let rest = content[search..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let Some(quote) = rest.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            continue;
        };
        let rest = &rest[1..];
        // only the opening quote character closes the value
        if let Some(end) = rest.find(quote) {
            return Some(rest[..end].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    fn events(input: &str) -> Result<Vec<Event>> {
        let mut tokenizer = Tokenizer::new(Source::new(input));
        let mut out = Vec::new();
        loop {
            let event = tokenizer.next_event()?;
            if event.is_end_document() {
                return Ok(out);
            }
            out.push(event);
        }
    }

    fn error(input: &str) -> ParseError {
        events(input).unwrap_err()
    }

    #[test]
    fn test_simple_element() {
        let evs = events("<root>hi</root>").unwrap();
        assert_eq!(
            evs,
            vec![
                Event::start("root", Default::default()),
                Event::text("hi"),
                Event::end("root"),
            ]
        );
    }

    #[test]
    fn test_empty_element() {
        let evs = events("<r><b/></r>").unwrap();
        assert_eq!(evs[1], Event::start("b", Default::default()));
        assert_eq!(evs[2], Event::end("b"));
    }

    #[test]
    fn test_end_document_repeats() {
        let mut tokenizer = Tokenizer::new(Source::new("<r/>"));
        for _ in 0..2 {
            tokenizer.next_event().unwrap();
        }
        assert_eq!(tokenizer.next_event().unwrap(), Event::EndDocument);
        assert_eq!(tokenizer.next_event().unwrap(), Event::EndDocument);
    }

    #[test]
    fn test_cdata() {
        let evs = events("<r><![CDATA[<x> & y]]></r>").unwrap();
        assert_eq!(evs[1], Event::CData("<x> & y".into()));
    }

    #[test]
    fn test_cdata_outside_root() {
        assert_eq!(error("<![CDATA[x]]><r/>").message, "Invalid XML");
        assert_eq!(
            error("<r/><![CDATA[x]]>").message,
            "Malformed XML: CDATA section outside the root element"
        );
    }

    #[test]
    fn test_comment() {
        let evs = events("<!-- a --><r><!--b--></r>").unwrap();
        assert_eq!(evs[0], Event::Comment(" a ".into()));
        assert_eq!(evs[2], Event::Comment("b".into()));
    }

    #[test]
    fn test_malformed_comments() {
        assert_eq!(error("<!-- a -- b --><r/>").message, "Malformed comment");
        assert_eq!(error("<r><!-- a ---></r>").message, "Malformed comment");
        assert_eq!(error("<!-- a").message, "Unclosed comment");
    }

    #[test]
    fn test_processing_instruction() {
        let evs = events("<?style href='a'?><r><?empty?></r>").unwrap();
        assert_eq!(
            evs[0],
            Event::ProcessingInstruction {
                target: "style".into(),
                content: Some("href='a'".into())
            }
        );
        assert_eq!(
            evs[2],
            Event::ProcessingInstruction {
                target: "empty".into(),
                content: None
            }
        );
    }

    #[test]
    fn test_unclosed_processing_instruction() {
        assert_eq!(
            error("<?pi data").message,
            "Malformed XML: Unclosed processing instruction"
        );
        assert_eq!(
            error("<? pi?>").message,
            "Malformed XML: Invalid processing instruction node: name is missing"
        );
    }

    #[test]
    fn test_xml_declaration() {
        let evs = events(r#"<?xml version="1.0" encoding='UTF-8' standalone="yes"?><r/>"#).unwrap();
        assert_eq!(
            evs[0],
            Event::XmlDecl {
                version: Some("1.0".into()),
                encoding: Some("UTF-8".into()),
                standalone: Some("yes".into()),
            }
        );
    }

    #[test]
    fn test_xml_declaration_not_first() {
        assert_eq!(
            error("<!-- c --><?xml version='1.0'?><r/>").message,
            "Malformed XML: XML declaration is not at the start"
        );
        assert_eq!(
            error("<r><?xml version='1.0'?></r>").message,
            "Malformed XML: XML declaration is not at the start"
        );
    }

    #[test]
    fn test_unknown_encoding_label() {
        let err = error("<?xml version='1.0' encoding='KOI8-R'?><r/>");
        assert_eq!(err.kind, ErrorKind::Structural);
    }

    #[test]
    fn test_utf16_encoding_reported() {
        let bytes: Vec<u8> = "<?xml version='1.0'?><r/>"
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        let mut tokenizer = Tokenizer::new(Source::from_bytes(bytes).unwrap());
        match tokenizer.next_event().unwrap() {
            Event::XmlDecl { encoding, .. } => assert_eq!(encoding.as_deref(), Some("UTF-16")),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_doctype_without_subset() {
        let evs = events("<!DOCTYPE r SYSTEM \"r.dtd\">\n<r/>").unwrap();
        assert!(matches!(&evs[0], Event::StartDoctype { name, external_id: Some(_) } if name == "r"));
        assert_eq!(evs[1], Event::EndDoctype);
        assert_eq!(evs[2], Event::start("r", Default::default()));
    }

    #[test]
    fn test_internal_subset() {
        let input = r#"<!DOCTYPE r [
            <!ELEMENT r (#PCDATA)>
            <!ENTITY x "hi">
            <!-- note -->
            %ext;
        ]><r>&x;</r>"#;
        let evs = events(input).unwrap();
        let kinds: Vec<_> = evs.iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            [
                "start_doctype",
                "elementdecl",
                "entitydecl",
                "comment",
                "externalentity",
                "end_doctype",
                "start_element",
                "text",
                "end_element"
            ]
        );
        assert_eq!(evs[4], Event::ExternalEntity("%ext;".into()));
        assert_eq!(evs[7], Event::text("&x;"));
    }

    #[test]
    fn test_unclosed_doctype() {
        let err = error("<!DOCTYPE r [ <!ELEMENT r ANY> ");
        assert_eq!(err.kind, ErrorKind::EndOfInput);
        assert_eq!(err.message, "Malformed DOCTYPE: unclosed");
    }

    #[test]
    fn test_invalid_subset_declaration() {
        assert_eq!(
            error("<!DOCTYPE r [ junk ]><r/>").message,
            "Malformed DOCTYPE: invalid declaration"
        );
    }

    #[test]
    fn test_attlist_declares_namespace() {
        let mut tokenizer = Tokenizer::new(Source::new(
            r#"<!DOCTYPE r [<!ATTLIST r xmlns:a CDATA "urn:a">]><a:r/>"#,
        ));
        for _ in 0..3 {
            tokenizer.next_event().unwrap();
        }
        assert_eq!(tokenizer.namespaces().resolve("a"), Some("urn:a"));
        assert!(tokenizer.next_event().unwrap().is_start_element());
    }

    #[test]
    fn test_declaration_in_content() {
        assert_eq!(
            error("<r><!ELEMENT x ANY></r>").message,
            "Declarations can only occur in the doctype declaration."
        );
        assert_eq!(error("<r><!x").message, "Malformed node");
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = error("<a><b></a>");
        assert_eq!(err.kind, ErrorKind::Structural);
        assert_eq!(err.message, "Missing end tag for 'b' (got 'a')");
    }

    #[test]
    fn test_unexpected_end_tag() {
        assert_eq!(error("</a>").message, "Unexpected top-level end tag (got 'a')");
    }

    #[test]
    fn test_truncated_end_tag_without_open_element() {
        for input in ["</", "<r/></", "<r></r></ "] {
            let err = error(input);
            assert_eq!(err.kind, ErrorKind::Structural);
            assert_eq!(err.message, "Unexpected top-level end tag", "{input:?}");
        }
    }

    #[test]
    fn test_missing_end_tags_at_eof() {
        let err = error("<a><b>text");
        assert_eq!(err.kind, ErrorKind::EndOfInput);
        assert_eq!(err.message, "Missing end tag for '/a/b'");
    }

    #[test]
    fn test_extra_content() {
        assert_eq!(
            error("<r/>tail").message,
            "Malformed XML: Extra content at the end of the document (got 'tail')"
        );
        assert_eq!(
            error("lead<r/>").message,
            "Malformed XML: Content at the start of the document (got 'lead')"
        );
    }

    #[test]
    fn test_second_root() {
        assert_eq!(
            error("<a></a><b></b>").message,
            "Malformed XML: Extra tag at the end of the document (got '<b')"
        );
        assert_eq!(
            error("<a/><b/>").message,
            "Malformed XML: Extra tag at the end of the document (got '<b')"
        );
    }

    #[test]
    fn test_trailing_whitespace_skipped() {
        let evs = events("<r/>\n  \n").unwrap();
        assert_eq!(evs.len(), 2);
    }

    #[test]
    fn test_leading_whitespace_reported() {
        let evs = events("\n<r/>").unwrap();
        assert_eq!(evs[0], Event::text("\n"));
    }

    #[test]
    fn test_undefined_prefix() {
        let err = error("<a:x/>");
        assert_eq!(err.kind, ErrorKind::Namespace);
        assert_eq!(err.message, "undefined namespace prefix a");
        assert_eq!(error("<r b:y='1'/>").message, "undefined namespace prefix b");
    }

    #[test]
    fn test_namespace_scope() {
        let mut tokenizer = Tokenizer::new(Source::new(
            r#"<r xmlns:a="urn:1"><c xmlns:a="urn:2"/><d xmlns:a="urn:3"></d></r>"#,
        ));
        tokenizer.next_event().unwrap();
        assert_eq!(tokenizer.namespaces().resolve("a"), Some("urn:1"));
        // <c/> and its synthesized end
        tokenizer.next_event().unwrap();
        assert_eq!(tokenizer.namespaces().resolve("a"), Some("urn:1"));
        assert_eq!(tokenizer.namespaces().depth(), 1);
        tokenizer.next_event().unwrap();
        assert_eq!(tokenizer.namespaces().depth(), 1);
        // <d>
        tokenizer.next_event().unwrap();
        assert_eq!(tokenizer.namespaces().resolve("a"), Some("urn:3"));
        assert_eq!(tokenizer.namespaces().depth(), 2);
        tokenizer.next_event().unwrap();
        assert_eq!(tokenizer.namespaces().resolve("a"), Some("urn:1"));
        tokenizer.next_event().unwrap();
        assert_eq!(tokenizer.namespaces().resolve("a"), None);
        assert_eq!(tokenizer.depth(), 0);
    }

    #[test]
    fn test_error_location() {
        let err = error("<r>\n  <a></b>\n</r>");
        assert_eq!((err.line, err.column), (2, 6));
    }

    #[test]
    fn test_pseudo_attribute() {
        let content = r#"version="1.0" encoding='latin1'"#;
        assert_eq!(pseudo_attribute(content, "version").as_deref(), Some("1.0"));
        assert_eq!(pseudo_attribute(content, "encoding").as_deref(), Some("latin1"));
        assert_eq!(pseudo_attribute(content, "standalone"), None);
        assert_eq!(pseudo_attribute("xversion='2'", "version"), None);
        assert_eq!(pseudo_attribute("version=\"1.0'", "version"), None);
        assert_eq!(
            pseudo_attribute("version='1.0\" x' encoding='a'", "version").as_deref(),
            Some("1.0\" x")
        );
    }
}
