//! XML Attribute Parsing
//!
//! Parses one start tag's attribute list from the source cursor, applying
//! namespace declarations to the scope tracker as they are read. Values are
//! kept raw: entity references are expanded later by consumers.

use super::error::{ParseError, Result};
use super::namespace::{ns, NamespaceTracker, DEFAULT_PREFIX};
use super::source::Source;
use std::collections::HashMap;

const NS_DECL_REFERENCE: &str = "(http://www.w3.org/TR/REC-xml-names/#ns-decl)";

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written (may include namespace prefix)
    pub name: String,
    /// Raw attribute value, entity references unexpanded
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Local name (after colon, if namespaced)
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    /// True for `xmlns` and `xmlns:*` declarations
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.prefix() == Some("xmlns")
    }
}

/// Attributes of one tag in document order; names are unique
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(Vec::new())
    }

    /// Look up a raw value by its name as written
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|attr| attr.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, attr: Attribute) {
        self.0.push(attr);
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Attributes(iter.into_iter().map(|(n, v)| Attribute::new(n, v)).collect())
    }
}

/// Result of parsing one start tag's attribute list
#[derive(Debug)]
pub struct ParsedAttributes {
    pub attributes: Attributes,
    /// Tag ended with `/>`
    pub self_closed: bool,
    /// Prefixes used by non-declaration attributes, in order of appearance
    pub prefixes: Vec<String>,
}

/// Parse attributes up to and including the closing `>` or `/>`
///
/// The cursor must sit just after the element name. Namespace declarations
/// are applied to `namespaces` immediately, in the frame the caller pushed
/// for this element.
pub fn parse_attributes(
    source: &mut Source,
    namespaces: &mut NamespaceTracker,
) -> Result<ParsedAttributes> {
    let mut attributes = Attributes::new();
    let mut prefixes: Vec<String> = Vec::new();
    // start offset of each attribute, parallel to `attributes`
    let mut starts: Vec<usize> = Vec::new();
    let self_closed;

    loop {
        source.skip_whitespace();
        let start = source.position();

        if source.match_str(">") {
            self_closed = false;
            break;
        }
        if source.match_str("/>") {
            self_closed = true;
            break;
        }
        if source.is_empty() {
            return Err(ParseError::end_of_input("unclosed start tag", start));
        }

        let Some(qname) = source.read_qname() else {
            return Err(ParseError::structural(
                format!("Invalid attribute name: <{}>", source.next_token()),
                start,
            ));
        };
        let name = qname.raw;

        source.skip_whitespace();
        if !source.match_str("=") {
            return Err(ParseError::structural(
                format!("Missing attribute equal: <{}>", name),
                start,
            ));
        }
        source.skip_whitespace();
        let quote = match source.peek_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                return Err(ParseError::structural(
                    format!("Missing attribute value start quote: <{}>", name),
                    start,
                ))
            }
        };
        let Some((_, value)) = source.read_quoted() else {
            return Err(ParseError::structural(
                format!("Missing attribute value end quote: <{}>: <{}>", name, quote),
                start,
            ));
        };

        match qname.prefix.as_deref() {
            Some("xmlns") => {
                if qname.local == "xml" {
                    if value != ns::XML {
                        return Err(ParseError::namespace(
                            format!(
                                "The 'xml' prefix must not be bound to any other namespace {}",
                                NS_DECL_REFERENCE
                            ),
                            start,
                        ));
                    }
                } else if qname.local == "xmlns" {
                    return Err(ParseError::namespace(
                        format!("The 'xmlns' prefix must not be declared {}", NS_DECL_REFERENCE),
                        start,
                    ));
                }
                namespaces.bind(&qname.local, Some(&value));
            }
            None if qname.local == "xmlns" => {
                namespaces.bind(DEFAULT_PREFIX, Some(&value));
            }
            Some(prefix) => {
                if prefix != "xml" && !prefixes.iter().any(|p| p == prefix) {
                    prefixes.push(prefix.to_string());
                }
            }
            None => {}
        }

        if attributes.contains(&name) {
            return Err(ParseError::structural(
                format!("Duplicate attribute {:?}", name),
                start,
            ));
        }

        attributes.push(Attribute::new(name, value));
        starts.push(start);
    }

    check_expanded_names(&attributes, &starts, namespaces)?;

    Ok(ParsedAttributes {
        attributes,
        self_closed,
        prefixes,
    })
}

/// Two attributes must not share a (namespace URI, local name) pair
///
/// Runs once all of the tag's declarations are in scope. Attributes with an
/// unbound prefix are skipped; the tokenizer reports those on its own. The
/// error points at the later of the two colliding attributes.
fn check_expanded_names(
    attributes: &Attributes,
    starts: &[usize],
    namespaces: &NamespaceTracker,
) -> Result<()> {
    let mut seen: HashMap<(Option<&str>, &str), Option<&str>> = HashMap::new();

    for (attr, &position) in attributes
        .iter()
        .zip(starts)
        .filter(|(a, _)| !a.is_namespace_declaration())
    {
        let prefix = attr.prefix();
        let uri = match prefix {
            Some(p) => match namespaces.resolve(p) {
                Some(uri) => Some(uri),
                None => continue,
            },
            None => None,
        };
        let local = attr.local_name();
        if let Some(existing) = seen.insert((uri, local), prefix) {
            return Err(ParseError::namespace(
                format!(
                    "Namespace conflict in adding attribute \"{}\": Prefix \"{}\" = \"{}\" and prefix \"{}\" = \"{}\"",
                    local,
                    existing.unwrap_or_default(),
                    uri.unwrap_or_default(),
                    prefix.unwrap_or_default(),
                    uri.unwrap_or_default(),
                ),
                position,
            ));
        }
    }
    Ok(())
}
