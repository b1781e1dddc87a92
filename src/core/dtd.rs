//! DOCTYPE Declaration Parsing
//!
//! Parses the document type declaration head and the markup declarations of
//! its internal subset. Declarations are recognized syntactically and handed
//! to consumers as events; nothing is validated against element content.
//!
//! Each parser is entered with the cursor just past its keyword and receives
//! the position where the declaration began, which anchors its diagnostics.

use super::entities::starts_with_reference;
use super::error::{ParseError, Result};
use super::source::{is_name_char, is_whitespace, name_len, Source};

/// External identifier of a DOCTYPE, entity, or notation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalId {
    /// `SYSTEM "uri"`
    System { system: String },
    /// `PUBLIC "pubid" "uri"`; notations may omit the system literal
    Public {
        public: String,
        system: Option<String>,
    },
}

impl ExternalId {
    pub fn system(&self) -> Option<&str> {
        match self {
            ExternalId::System { system } => Some(system),
            ExternalId::Public { system, .. } => system.as_deref(),
        }
    }

    pub fn public(&self) -> Option<&str> {
        match self {
            ExternalId::System { .. } => None,
            ExternalId::Public { public, .. } => Some(public),
        }
    }
}

/// What an entity declaration binds its name to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityValue {
    /// Replacement text written inline, references unexpanded
    Internal(String),
    /// External entity, with its notation when unparsed (`NDATA`)
    External {
        id: ExternalId,
        ndata: Option<String>,
    },
}

/// `<!ENTITY ...>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDecl {
    pub name: String,
    pub value: EntityValue,
    /// Declared with `%`, usable only inside the DTD
    pub is_parameter: bool,
}

impl EntityDecl {
    /// Inline replacement text, if this is an internal entity
    pub fn internal_value(&self) -> Option<&str> {
        match &self.value {
            EntityValue::Internal(value) => Some(value),
            EntityValue::External { .. } => None,
        }
    }
}

/// Default declaration of one attribute definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttDefault {
    Required,
    Fixed(String),
    Value(String),
}

impl AttDefault {
    /// The default value, if the declaration supplies one
    pub fn value(&self) -> Option<&str> {
        match self {
            AttDefault::Required => None,
            AttDefault::Fixed(v) | AttDefault::Value(v) => Some(v),
        }
    }
}

/// One attribute definition of an ATTLIST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttDef {
    pub name: String,
    /// Type as written: `CDATA`, `ID`, `(a|b)`, `NOTATION (n)`, ...
    pub att_type: String,
    pub default: AttDefault,
}

/// `<!ATTLIST ...>`; `#IMPLIED` definitions are omitted from `defs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttListDecl {
    pub element: String,
    pub defs: Vec<AttDef>,
    /// Full declaration text
    pub raw: String,
}

/// `<!NOTATION ...>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationDecl {
    pub name: String,
    pub external_id: ExternalId,
}

/// Head of a document type declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctypeHead {
    pub name: String,
    pub external_id: Option<ExternalId>,
    /// `[` follows: an internal subset is open
    pub has_internal_subset: bool,
}

/// Parse `<!DOCTYPE name ExternalID? ('[' | '>')`, cursor after `<!DOCTYPE`
pub fn parse_doctype(source: &mut Source, start: usize) -> Result<DoctypeHead> {
    const BASE: &str = "Malformed DOCTYPE";
    if !source.match_whitespace() {
        let detail = if source.starts_with(">") { "name is missing" } else { "invalid name" };
        return Err(ParseError::structural(format!("{}: {}", BASE, detail), start));
    }
    let name = parse_name(source, BASE, start)?;

    let external_id = if source.peek_after_whitespace("[") || source.peek_after_whitespace(">") {
        None
    } else {
        Some(parse_external_id(source, BASE, false, start)?)
    };

    source.skip_whitespace();
    let has_internal_subset = if source.match_str("[") {
        true
    } else if source.match_str(">") {
        false
    } else {
        return Err(ParseError::structural(
            format!("{}: garbage after external ID", BASE),
            source.position(),
        ));
    };

    Ok(DoctypeHead {
        name,
        external_id,
        has_internal_subset,
    })
}

/// Read a name, reporting it as missing or invalid under `base`
pub fn parse_name(source: &mut Source, base: &str, start: usize) -> Result<String> {
    source.read_name().ok_or_else(|| {
        let detail = match source.peek_char() {
            Some(c) if !c.is_whitespace() => "invalid name",
            _ => "name is missing",
        };
        ParseError::structural(format!("{}: {}", base, detail), start)
    })
}

/// Parse an external identifier, with optional leading and trailing whitespace
///
/// With `accept_public_id`, a `PUBLIC` literal without a system literal is
/// accepted (notation declarations).
pub fn parse_external_id(
    source: &mut Source,
    base: &str,
    accept_public_id: bool,
    start: usize,
) -> Result<ExternalId> {
    let origin = source.position();

    source.skip_whitespace();
    if source.match_str("PUBLIC") && source.match_whitespace() {
        if let Some(public) = read_pubid_literal(source) {
            let after_public = source.position();
            if source.match_whitespace() {
                if let Some((_, system)) = source.read_quoted() {
                    source.skip_whitespace();
                    return Ok(ExternalId::Public {
                        public,
                        system: Some(system),
                    });
                }
            }
            if accept_public_id {
                source.set_position(after_public);
                source.skip_whitespace();
                return Ok(ExternalId::Public {
                    public,
                    system: None,
                });
            }
        }
    }

    source.set_position(origin);
    source.skip_whitespace();
    if source.match_str("SYSTEM") && source.match_whitespace() {
        if let Some((_, system)) = source.read_quoted() {
            source.skip_whitespace();
            return Ok(ExternalId::System { system });
        }
    }

    source.set_position(origin);
    let details = invalid_id_details(source.remaining(), accept_public_id);
    Err(ParseError::structural(format!("{}: {}", base, details), start))
}

/// Explain why no external identifier could be read from `rest`
fn invalid_id_details(rest: &str, accept_public_id: bool) -> &'static str {
    let rest = &rest[whitespace_len(rest)..];

    if let Some(after) = rest.strip_prefix("PUBLIC") {
        if literal_missing(after) {
            return "public ID literal is missing";
        }
        let ws = whitespace_len(after);
        let Some(len) = (ws > 0).then(|| pubid_literal(&after[ws..])).flatten() else {
            return "invalid public ID literal";
        };
        if !accept_public_id {
            return "garbage after public ID literal";
        }
        let after = &after[ws + len..];
        let ws = whitespace_len(after);
        if ws > 0 && after[ws..].starts_with(|c: char| c != '"' && c != '\'') {
            return "system ID literal is missing";
        }
        if ws == 0 || system_literal(&after[ws..]).is_none() {
            return "invalid system literal";
        }
        "garbage after system literal"
    } else if let Some(after) = rest.strip_prefix("SYSTEM") {
        if literal_missing(after) {
            return "system literal is missing";
        }
        let ws = whitespace_len(after);
        if ws == 0 || system_literal(&after[ws..]).is_none() {
            return "invalid system literal";
        }
        "garbage after system literal"
    } else if rest.starts_with(['"', '\'']) {
        "ID type is missing"
    } else {
        "invalid ID type"
    }
}

/// Keyword followed by something other than a literal, or by the declaration end
fn literal_missing(after_keyword: &str) -> bool {
    let ws = whitespace_len(after_keyword);
    let next = after_keyword[ws..].chars().next();
    match next {
        Some('[' | '>') => true,
        Some(c) => ws > 0 && c != '"' && c != '\'',
        None => false,
    }
}

fn whitespace_len(s: &str) -> usize {
    s.bytes().take_while(|&b| is_whitespace(b)).count()
}

fn is_pubid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '\r' | '\n' | '-' | '\'' | '(' | ')' | '+' | ',' | '.' | '/' | ':' | '=' | '?' | ';' | '!' | '*' | '#' | '@' | '$' | '_' | '%')
}

/// Length of a public ID literal at the start of `s`, quotes included
fn pubid_literal(s: &str) -> Option<usize> {
    let quote = s.chars().next().filter(|&c| c == '"' || c == '\'')?;
    let close = s[1..].find(quote)? + 1;
    s[1..close].chars().all(is_pubid_char).then_some(close + 1)
}

/// Length of a system literal at the start of `s`, quotes included
fn system_literal(s: &str) -> Option<usize> {
    let quote = s.chars().next().filter(|&c| c == '"' || c == '\'')?;
    s[1..].find(quote).map(|close| close + 2)
}

fn read_pubid_literal(source: &mut Source) -> Option<String> {
    let len = pubid_literal(source.remaining())?;
    let value = source.remaining()[1..len - 1].to_owned();
    source.advance(len);
    Some(value)
}

/// Parse `<!ELEMENT ...>`, cursor after `<!ELEMENT`; the content is kept verbatim
pub fn parse_element_decl(source: &mut Source, start: usize) -> Result<String> {
    source
        .read_until(">")
        .map(|body| format!("<!ELEMENT{}", body))
        .ok_or_else(|| ParseError::structural("Bad ELEMENT declaration!", start))
}

/// Parse `<!ENTITY ...>`, cursor after `<!ENTITY`
pub fn parse_entity_decl(source: &mut Source, start: usize) -> Result<EntityDecl> {
    let malformed = || ParseError::structural("Malformed entity declaration", start);

    if !source.match_whitespace() {
        return Err(malformed());
    }
    let is_parameter = if source.match_str("%") {
        if !source.match_whitespace() {
            return Err(malformed());
        }
        true
    } else {
        false
    };
    let name = source.read_name().ok_or_else(malformed)?;
    if !source.match_whitespace() {
        return Err(malformed());
    }

    let value = if let Some((quote, body)) = source.read_quoted() {
        match scan_entity_value(&body) {
            None => return Err(malformed()),
            Some(true) => {
                return Err(ParseError::structural(
                    format!(
                        "Parameter entity references forbidden in internal subset: {}{}{}",
                        quote, body, quote
                    ),
                    start,
                ))
            }
            Some(false) => EntityValue::Internal(body),
        }
    } else {
        let id = read_entity_external_id(source).ok_or_else(malformed)?;
        let ndata = if is_parameter { None } else { read_ndata(source) };
        EntityValue::External { id, ndata }
    };

    source.skip_whitespace();
    if !source.match_str(">") {
        return Err(malformed());
    }

    Ok(EntityDecl {
        name,
        value,
        is_parameter,
    })
}

/// Check an entity value's references
///
/// Returns None when a `%` or `&` does not begin a reference, otherwise
/// whether any parameter-entity reference occurs.
fn scan_entity_value(body: &str) -> Option<bool> {
    let mut has_pe_reference = false;
    for (i, c) in body.char_indices() {
        match c {
            '%' => {
                if !is_pe_reference(&body[i..]) {
                    return None;
                }
                has_pe_reference = true;
            }
            '&' if !starts_with_reference(&body[i..]) => return None,
            _ => {}
        }
    }
    Some(has_pe_reference)
}

/// `%name;` at the start of `s`
fn is_pe_reference(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('%') else {
        return false;
    };
    name_len(rest).is_some_and(|len| rest.as_bytes().get(len) == Some(&b';'))
}

/// External ID inside an entity declaration: both literals are required for PUBLIC
fn read_entity_external_id(source: &mut Source) -> Option<ExternalId> {
    let origin = source.position();
    if source.match_str("SYSTEM") && source.match_whitespace() {
        if let Some((_, system)) = source.read_quoted() {
            return Some(ExternalId::System { system });
        }
    }
    source.set_position(origin);
    if source.match_str("PUBLIC") && source.match_whitespace() {
        if let Some(public) = read_pubid_literal(source) {
            if source.match_whitespace() {
                if let Some((_, system)) = source.read_quoted() {
                    return Some(ExternalId::Public {
                        public,
                        system: Some(system),
                    });
                }
            }
        }
    }
    source.set_position(origin);
    None
}

/// Optional `NDATA name` after an external ID
fn read_ndata(source: &mut Source) -> Option<String> {
    let origin = source.position();
    if source.match_whitespace() && source.match_str("NDATA") && source.match_whitespace() {
        if let Some(notation) = source.read_name() {
            return Some(notation);
        }
    }
    source.set_position(origin);
    None
}

/// Parse `<!ATTLIST ...>`, cursor after `<!ATTLIST`
pub fn parse_attlist_decl(source: &mut Source, start: usize) -> Result<AttListDecl> {
    let bad = || ParseError::structural("Bad ATTLIST declaration!", start);
    let body_start = source.position();

    if !source.match_whitespace() {
        return Err(bad());
    }
    let element = source.read_name().ok_or_else(bad)?;

    let mut defs = Vec::new();
    loop {
        let had_space = source.match_whitespace();
        if source.match_str(">") {
            break;
        }
        if !had_space {
            return Err(bad());
        }
        let name = source.read_name().ok_or_else(bad)?;
        if !source.match_whitespace() {
            return Err(bad());
        }
        let att_type = read_att_type(source).ok_or_else(bad)?;
        if !source.match_whitespace() {
            return Err(bad());
        }
        // Outer None is a syntax error; inner None is #IMPLIED
        let default = read_default_decl(source).ok_or_else(bad)?;
        if let Some(default) = default {
            defs.push(AttDef {
                name,
                att_type,
                default,
            });
        }
    }

    let raw = format!("<!ATTLIST{}", source.slice(body_start, source.position()));
    Ok(AttListDecl { element, defs, raw })
}

fn read_att_type(source: &mut Source) -> Option<String> {
    let start = source.position();
    if source.match_str("NOTATION") {
        if source.match_whitespace() && read_enumeration(source, true) {
            return Some(source.slice(start, source.position()).to_owned());
        }
        source.set_position(start);
        return None;
    }
    if source.starts_with("(") {
        if read_enumeration(source, false) {
            return Some(source.slice(start, source.position()).to_owned());
        }
        source.set_position(start);
        return None;
    }
    // Longer keywords first so IDREFS is not read as ID
    ["CDATA", "IDREFS", "IDREF", "ID", "ENTITIES", "ENTITY", "NMTOKENS", "NMTOKEN"]
        .into_iter()
        .find(|keyword| source.match_str(keyword))
        .map(str::to_owned)
}

/// `( token ( | token )* )`; tokens are names for NOTATION types
fn read_enumeration(source: &mut Source, names_only: bool) -> bool {
    if !source.match_str("(") {
        return false;
    }
    loop {
        source.skip_whitespace();
        let read = if names_only {
            source.read_name().is_some()
        } else {
            read_nmtoken(source)
        };
        if !read {
            return false;
        }
        source.skip_whitespace();
        if source.match_str(")") {
            return true;
        }
        if !source.match_str("|") {
            return false;
        }
    }
}

fn read_nmtoken(source: &mut Source) -> bool {
    let len: usize = source
        .remaining()
        .chars()
        .take_while(|&c| is_name_char(c))
        .map(char::len_utf8)
        .sum();
    source.advance(len);
    len > 0
}

fn read_default_decl(source: &mut Source) -> Option<Option<AttDefault>> {
    if source.match_str("#REQUIRED") {
        return Some(Some(AttDefault::Required));
    }
    if source.match_str("#IMPLIED") {
        return Some(None);
    }
    let fixed = if source.match_str("#FIXED") {
        if !source.match_whitespace() {
            return None;
        }
        true
    } else {
        false
    };

    let origin = source.position();
    let (_, value) = source.read_quoted()?;
    let valid = value.char_indices().all(|(i, c)| match c {
        '<' => false,
        '&' => starts_with_reference(&value[i..]),
        _ => true,
    });
    if !valid {
        source.set_position(origin);
        return None;
    }
    Some(Some(if fixed {
        AttDefault::Fixed(value)
    } else {
        AttDefault::Value(value)
    }))
}

/// Parse `<!NOTATION ...>`, cursor after `<!NOTATION`
pub fn parse_notation_decl(source: &mut Source, start: usize) -> Result<NotationDecl> {
    const BASE: &str = "Malformed notation declaration";
    if !source.match_whitespace() {
        let detail = if source.starts_with(">") { "name is missing" } else { "invalid name" };
        return Err(ParseError::structural(format!("{}: {}", BASE, detail), start));
    }
    let name = parse_name(source, BASE, start)?;
    let external_id = parse_external_id(source, BASE, true, start)?;
    source.skip_whitespace();
    if !source.match_str(">") {
        return Err(ParseError::structural(
            format!("{}: garbage before end >", BASE),
            source.position(),
        ));
    }
    Ok(NotationDecl { name, external_id })
}
