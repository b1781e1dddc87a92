//! SAX (Simple API for XML) Module
//!
//! Callback-style parsing on top of the pull parser.
//!
//! ## Architecture
//!
//! ```text
//! PullParser ---> StreamParser ---> StreamListener
//!                      |
//!                      v
//!               entity table (from DOCTYPE)
//! ```
//!
//! `StreamParser` pulls every event, expands text and attribute values
//! against the internal entities declared so far, and calls the matching
//! `StreamListener` method. `SaxCollector` is a listener that records
//! everything as owned `SaxEvent`s.

pub mod collector;
pub mod events;
pub mod stream;

pub use collector::{parse_sax, SaxCollector};
pub use events::SaxEvent;
pub use stream::{StreamListener, StreamParser};
