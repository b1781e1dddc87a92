//! Pull Parser
//!
//! Wraps the tokenizer with a lookahead queue, listener dispatch, a fatal
//! error latch, and the entity expansion counters.
//!
//! Events reach listeners once, when the tokenizer produces them. Peeking
//! therefore notifies listeners ahead of the caller's pulls, and events put
//! back with [`PullParser::unshift`] are not announced again.

use crate::config::ParserConfig;
use crate::core::encoding::XmlEncoding;
use crate::core::entities::{EntityExpander, EntityTable};
use crate::core::error::{ParseError, Result};
use crate::core::source::Source;
use crate::core::tokenizer::{DocumentStatus, Tokenizer};
use crate::reader::events::Event;
use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;

/// Observer notified synchronously of every produced event
///
/// A listener must not drive the parser that notifies it.
pub trait Listener {
    fn receive(&mut self, event: &Event);
}

impl<F: FnMut(&Event)> Listener for F {
    fn receive(&mut self, event: &Event) {
        self(event)
    }
}

/// Streaming pull parser over one document
pub struct PullParser {
    tokenizer: Tokenizer,
    /// Events peeked or unshifted, in delivery order
    queue: VecDeque<Event>,
    listeners: Vec<Box<dyn Listener>>,
    expander: EntityExpander,
    /// First fatal error; every later call returns it
    failure: Option<ParseError>,
    /// Iterator has yielded EndDocument or an error
    finished: bool,
}

impl fmt::Debug for PullParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullParser")
            .field("tokenizer", &self.tokenizer)
            .field("queue", &self.queue)
            .field("listeners", &self.listeners.len())
            .field("expander", &self.expander)
            .field("failure", &self.failure)
            .finish()
    }
}

impl PullParser {
    /// Create a parser over already-decoded text with default limits
    pub fn new(input: &str) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &str, config: ParserConfig) -> Self {
        Self::from_source(Source::new(input), config)
    }

    /// Create a parser over raw bytes, detecting their encoding
    pub fn from_bytes(input: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with_config(input, ParserConfig::default())
    }

    pub fn from_bytes_with_config(input: Vec<u8>, config: ParserConfig) -> Result<Self> {
        let source = Source::from_bytes(input)?;
        tracing::debug!(encoding = source.encoding().name(), "detected encoding");
        Ok(Self::from_source(source, config))
    }

    fn from_source(source: Source, config: ParserConfig) -> Self {
        PullParser {
            tokenizer: Tokenizer::new(source),
            queue: VecDeque::new(),
            listeners: Vec::new(),
            expander: EntityExpander::new(
                config.entity_expansion_limit,
                config.entity_expansion_text_limit,
            ),
            failure: None,
            finished: false,
        }
    }

    /// Register an observer of every event produced from now on
    pub fn add_listener(&mut self, listener: impl Listener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Return the next event
    pub fn pull(&mut self) -> Result<Event> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if let Some(event) = self.queue.pop_front() {
            return Ok(event);
        }
        self.produce()
    }

    /// Look at the event `depth` positions ahead without consuming it
    ///
    /// Parses forward as far as needed; the first pending event is depth 0.
    pub fn peek(&mut self, depth: usize) -> Result<&Event> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        while self.queue.len() <= depth {
            let event = self.produce()?;
            self.queue.push_back(event);
        }
        Ok(&self.queue[depth])
    }

    /// Parse the whole remaining document into the queue and return its last
    /// event, which is always `EndDocument`
    ///
    /// Memory use grows with the document; avoid on untrusted input.
    pub fn peek_to_end(&mut self) -> Result<&Event> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        while !matches!(self.queue.back(), Some(Event::EndDocument)) {
            let event = self.produce()?;
            self.queue.push_back(event);
        }
        Ok(&self.queue[self.queue.len() - 1])
    }

    /// Push an event back to the front of the pending queue
    pub fn unshift(&mut self, event: Event) {
        self.queue.push_front(event);
    }

    /// True when input and queue are both exhausted
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.tokenizer.is_empty()
    }

    pub fn has_next(&self) -> bool {
        !self.is_empty()
    }

    /// Byte position of the cursor in the decoded input
    pub fn position(&self) -> usize {
        self.tokenizer.position()
    }

    pub fn status(&self) -> DocumentStatus {
        self.tokenizer.status()
    }

    pub fn encoding(&self) -> XmlEncoding {
        self.tokenizer.encoding()
    }

    /// Nesting depth at the tokenizer's position
    pub fn depth(&self) -> usize {
        self.tokenizer.depth()
    }

    /// Open elements at the tokenizer's position, outermost first
    pub fn open_tags(&self) -> &[String] {
        self.tokenizer.open_tags()
    }

    /// URI bound to `prefix` at the tokenizer's position; `""` is the default namespace
    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.tokenizer.namespaces().resolve(prefix)
    }

    /// The error that ended parsing, if any
    pub fn error(&self) -> Option<&ParseError> {
        self.failure.as_ref()
    }

    /// Entity substitutions charged so far
    pub fn entity_expansion_count(&self) -> usize {
        self.expander.count()
    }

    pub fn entity_expansion_limit(&self) -> usize {
        self.expander.count_limit()
    }

    pub fn set_entity_expansion_limit(&mut self, limit: usize) {
        self.expander.set_count_limit(limit);
    }

    pub fn entity_expansion_text_limit(&self) -> usize {
        self.expander.text_limit()
    }

    pub fn set_entity_expansion_text_limit(&mut self, limit: usize) {
        self.expander.set_text_limit(limit);
    }

    /// Expand the references in a raw text or attribute value
    ///
    /// Exceeding a limit is fatal to this parser.
    pub fn unnormalize(&mut self, raw: &str, entities: Option<&EntityTable>) -> Result<String> {
        self.unnormalize_filtered(raw, entities, &[])
    }

    /// Expand references, leaving any entity named in `filter` as written
    pub fn unnormalize_filtered(
        &mut self,
        raw: &str,
        entities: Option<&EntityTable>,
        filter: &[&str],
    ) -> Result<String> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.expander
            .unnormalize_filtered(raw, entities, filter)
            .map_err(|err| {
                let err = self.tokenizer.locate(err);
                self.fail(err.clone());
                err
            })
    }

    fn produce(&mut self) -> Result<Event> {
        match self.tokenizer.next_event() {
            Ok(event) => {
                for listener in &mut self.listeners {
                    listener.receive(&event);
                }
                Ok(event)
            }
            Err(err) => {
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    fn fail(&mut self, err: ParseError) {
        tracing::debug!(error = %err, "parse failed");
        self.failure = Some(err);
    }
}

impl Iterator for PullParser {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.pull();
        match &result {
            Ok(event) if !event.is_end_document() => {}
            _ => self.finished = true,
        }
        Some(result)
    }
}

impl FusedIterator for PullParser {}
