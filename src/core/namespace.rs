//! Namespace Scope Tracking
//!
//! A single prefix→URI map plus a stack of restore frames. Each opened element
//! pushes a frame; every binding change made while that element's attributes
//! are parsed records the prefix's prior value in the frame, once per prefix.
//! Popping the frame reinstates those prior values.

use std::collections::HashMap;

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Prefix used as the key of the default (unprefixed) namespace
pub const DEFAULT_PREFIX: &str = "";

/// Restore frame: prefix → value before this element touched it
type Frame = HashMap<String, Option<String>>;

/// Lexically scoped prefix bindings
#[derive(Debug, Clone)]
pub struct NamespaceTracker {
    bindings: HashMap<String, String>,
    frames: Vec<Frame>,
}

impl Default for NamespaceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceTracker {
    /// Create a tracker with only the fixed `xml` prefix bound
    pub fn new() -> Self {
        let mut bindings = HashMap::with_capacity(8);
        bindings.insert("xml".to_string(), ns::XML.to_string());
        NamespaceTracker {
            bindings,
            frames: Vec::with_capacity(16),
        }
    }

    /// Enter an element scope
    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Leave an element scope, reinstating every binding it changed
    ///
    /// Returns false when there was no frame to pop.
    pub fn pop_frame(&mut self) -> bool {
        let Some(frame) = self.frames.pop() else {
            return false;
        };
        for (prefix, prior) in frame {
            match prior {
                Some(uri) => {
                    self.bindings.insert(prefix, uri);
                }
                None => {
                    self.bindings.remove(&prefix);
                }
            }
        }
        true
    }

    /// Bind `prefix` to `uri` in the current scope; `None` or an empty URI unbinds
    ///
    /// The first change to a prefix within a frame records its prior value;
    /// later changes in the same frame leave that record alone.
    pub fn bind(&mut self, prefix: &str, uri: Option<&str>) {
        if let Some(frame) = self.frames.last_mut() {
            let current = self.bindings.get(prefix).cloned();
            frame.entry(prefix.to_string()).or_insert(current);
        }
        match uri {
            Some(uri) if !uri.is_empty() => {
                self.bindings.insert(prefix.to_string(), uri.to_string());
            }
            _ => {
                self.bindings.remove(prefix);
            }
        }
    }

    /// Bind a prefix outside any element scope (ATTLIST `xmlns:*` defaults)
    pub fn declare_global(&mut self, prefix: &str, uri: &str) {
        self.bindings.insert(prefix.to_string(), uri.to_string());
    }

    /// Resolve a prefix; `DEFAULT_PREFIX` resolves the default namespace
    #[inline]
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// Check if prefix is currently bound
    #[inline]
    pub fn is_bound(&self, prefix: &str) -> bool {
        self.bindings.contains_key(prefix)
    }

    /// Number of open scopes
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_prefix_prebound() {
        let tracker = NamespaceTracker::new();
        assert_eq!(tracker.resolve("xml"), Some(ns::XML));
        assert!(!tracker.is_bound("xmlns"));
        assert_eq!(tracker.resolve(DEFAULT_PREFIX), None);
    }

    #[test]
    fn test_scope_restore() {
        let mut tracker = NamespaceTracker::new();
        tracker.push_frame();
        tracker.bind("a", Some("urn:outer"));
        tracker.push_frame();
        tracker.bind("a", Some("urn:inner"));
        assert_eq!(tracker.resolve("a"), Some("urn:inner"));
        assert!(tracker.pop_frame());
        assert_eq!(tracker.resolve("a"), Some("urn:outer"));
        assert!(tracker.pop_frame());
        assert_eq!(tracker.resolve("a"), None);
        assert!(!tracker.pop_frame());
    }

    #[test]
    fn test_first_write_wins_within_frame() {
        let mut tracker = NamespaceTracker::new();
        tracker.push_frame();
        tracker.bind("a", Some("urn:one"));
        tracker.push_frame();
        tracker.bind("a", Some("urn:two"));
        tracker.bind("a", Some("urn:three"));
        tracker.pop_frame();
        // Prior value from before the inner element, not "urn:two"
        assert_eq!(tracker.resolve("a"), Some("urn:one"));
    }

    #[test]
    fn test_empty_uri_unbinds() {
        let mut tracker = NamespaceTracker::new();
        tracker.push_frame();
        tracker.bind(DEFAULT_PREFIX, Some("urn:d"));
        tracker.push_frame();
        tracker.bind(DEFAULT_PREFIX, Some(""));
        assert_eq!(tracker.resolve(DEFAULT_PREFIX), None);
        tracker.pop_frame();
        assert_eq!(tracker.resolve(DEFAULT_PREFIX), Some("urn:d"));
    }

    #[test]
    fn test_global_declaration_survives_frames() {
        let mut tracker = NamespaceTracker::new();
        tracker.declare_global("g", "urn:g");
        tracker.push_frame();
        tracker.bind("g", Some("urn:local"));
        tracker.pop_frame();
        assert_eq!(tracker.resolve("g"), Some("urn:g"));
        assert_eq!(tracker.depth(), 0);
    }
}
