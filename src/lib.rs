//! RustyPull - Streaming pull parser for XML
//!
//! Layers:
//! - `core`: source cursor, tokenizer state machine, attributes, namespaces,
//!   entity expansion and DOCTYPE declarations
//! - `reader`: the `PullParser` with lookahead, listeners and limits
//! - `sax`: callback dispatch over the pull parser
//! - `dom`: arena tree built from pull events
//!
//! ```rust
//! use rustypull::{Event, PullParser};
//!
//! let mut parser = PullParser::new("<r><a>1</a></r>");
//! let mut names = Vec::new();
//! for event in &mut parser {
//!     if let Event::StartElement { name, .. } = event? {
//!         names.push(name);
//!     }
//! }
//! assert_eq!(names, ["r", "a"]);
//! # Ok::<(), rustypull::ParseError>(())
//! ```

pub mod config;
pub mod core;
pub mod dom;
pub mod reader;
pub mod sax;

pub use crate::config::ParserConfig;
pub use crate::core::attributes::{Attribute, Attributes};
pub use crate::core::dtd::{
    AttDef, AttDefault, AttListDecl, EntityDecl, EntityValue, ExternalId, NotationDecl,
};
pub use crate::core::encoding::XmlEncoding;
pub use crate::core::entities::{normalize, EntityTable};
pub use crate::core::error::{ErrorKind, ParseError, Result};
pub use crate::core::tokenizer::DocumentStatus;
pub use crate::dom::{Document, TreeBuilder};
pub use crate::reader::events::Event;
pub use crate::reader::pull::{Listener, PullParser};
pub use crate::sax::{StreamListener, StreamParser};
