//! DOM Module - Arena-based XML Document
//!
//! - Arena allocation for nodes, linked by `NodeId` indices
//! - `TreeBuilder` grows the arena from pull events
//! - Serialization back to markup with escaped text

pub mod builder;
pub mod document;
pub mod node;

pub use builder::TreeBuilder;
pub use document::{ChildIter, DescendantIter, Document, XmlDeclaration};
pub use node::{NodeId, NodeKind, XmlNode};
