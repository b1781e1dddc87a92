//! XML Reader Module
//!
//! - Events: owned XML event types
//! - PullParser: lookahead queue, listeners, and limits over the tokenizer

pub mod events;
pub mod pull;
