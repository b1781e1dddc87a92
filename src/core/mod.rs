//! Core XML parsing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Source: decoded input cursor with memchr-accelerated searching
//! - Encoding: BOM detection, UTF-16 and Latin-1 decoding
//! - Error: fatal parse errors with line/column
//! - Namespace: prefix bindings with per-element restore frames
//! - Attributes: start tag attribute list parsing
//! - Entities: reference expansion under count and size limits
//! - DTD: DOCTYPE head and internal subset declarations
//! - Tokenizer: state machine producing one event per call

pub mod attributes;
pub mod dtd;
pub mod encoding;
pub mod entities;
pub mod error;
pub mod namespace;
pub mod source;
pub mod tokenizer;
