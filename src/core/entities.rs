//! XML Entity Expansion
//!
//! Handles expansion of entity references in raw text and attribute values:
//! - Numeric character references: &#123; &#x7B; (always decoded, never charged)
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Entities declared in the document's internal subset
//!
//! Every substitution of a declared entity is charged against an expansion
//! counter, and the expanded text is bounded in size. Both limits abort the
//! parse, which keeps entity bombs bounded in time and memory.

use super::error::{ParseError, Result};
use super::source::name_len;
use memchr::memchr;
use std::borrow::Cow;
use std::collections::HashMap;

/// Declared general entities: name → replacement text
pub type EntityTable = HashMap<String, String>;

/// The five entities every document can use without declaring them
pub const PREDEFINED_ENTITIES: [(&str, &str); 5] = [
    ("lt", "<"),
    ("gt", ">"),
    ("amp", "&"),
    ("quot", "\""),
    ("apos", "'"),
];

/// Default cap on the number of entity substitutions per parser
pub const DEFAULT_EXPANSION_LIMIT: usize = 10_000;
/// Default cap on the size in bytes of one expanded value
pub const DEFAULT_EXPANSION_TEXT_LIMIT: usize = 10_240;

/// Nested entity definitions deeper than this are rejected
const MAX_NESTING: usize = 256;

/// Look up a predefined entity by name
#[inline]
pub fn predefined(name: &str) -> Option<&'static str> {
    PREDEFINED_ENTITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

/// Replace CR and CRLF line endings with LF
pub fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if memchr(b'\r', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Entity expansion with running counters and limits
#[derive(Debug, Clone)]
pub struct EntityExpander {
    count: usize,
    count_limit: usize,
    text_limit: usize,
}

impl Default for EntityExpander {
    fn default() -> Self {
        Self::new(DEFAULT_EXPANSION_LIMIT, DEFAULT_EXPANSION_TEXT_LIMIT)
    }
}

impl EntityExpander {
    pub fn new(count_limit: usize, text_limit: usize) -> Self {
        EntityExpander {
            count: 0,
            count_limit,
            text_limit,
        }
    }

    /// Substitutions charged so far
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn count_limit(&self) -> usize {
        self.count_limit
    }

    #[inline]
    pub fn text_limit(&self) -> usize {
        self.text_limit
    }

    pub fn set_count_limit(&mut self, limit: usize) {
        self.count_limit = limit;
    }

    pub fn set_text_limit(&mut self, limit: usize) {
        self.text_limit = limit;
    }

    /// Charge `delta` substitutions against the count limit
    pub fn record(&mut self, delta: usize) -> Result<()> {
        self.count = self.count.saturating_add(delta);
        if self.count > self.count_limit {
            return Err(ParseError::security_limit(
                "number of entity expansions exceeded, processing aborted.",
                0,
            ));
        }
        Ok(())
    }

    /// Expand every reference in `raw`
    ///
    /// Declared entities take precedence over the predefined ones. Unknown
    /// names are left in place verbatim.
    pub fn unnormalize(&mut self, raw: &str, entities: Option<&EntityTable>) -> Result<String> {
        self.unnormalize_filtered(raw, entities, &[])
    }

    /// Like [`unnormalize`](Self::unnormalize), leaving references to any
    /// name in `filter` unexpanded
    pub fn unnormalize_filtered(
        &mut self,
        raw: &str,
        entities: Option<&EntityTable>,
        filter: &[&str],
    ) -> Result<String> {
        let mut active = Vec::new();
        self.expand(raw, entities, filter, &mut active)
    }

    fn expand(
        &mut self,
        raw: &str,
        entities: Option<&EntityTable>,
        filter: &[&str],
        active: &mut Vec<String>,
    ) -> Result<String> {
        let text = normalize_newlines(raw);
        let bytes = text.as_bytes();
        if memchr(b'&', bytes).is_none() {
            return Ok(text.into_owned());
        }

        let mut out = String::with_capacity(text.len());
        // Expanded value and its cost, for references repeated in this value
        let mut memo: HashMap<&str, (String, usize)> = HashMap::new();
        let mut pos = 0;

        while let Some(offset) = memchr(b'&', &bytes[pos..]) {
            let amp = pos + offset;
            out.push_str(&text[pos..amp]);
            pos = amp;

            let Some((reference, len)) = read_reference(&text[amp..]) else {
                out.push('&');
                pos += 1;
                continue;
            };

            match reference {
                Reference::Char(code) => {
                    let c = char::from_u32(code).ok_or_else(|| {
                        ParseError::structural(
                            format!("Invalid character reference: {}", &text[amp..amp + len]),
                            amp,
                        )
                    })?;
                    out.push(c);
                }
                Reference::Named(name) if filter.contains(&name) => {
                    out.push_str(&text[amp..amp + len]);
                }
                Reference::Named(name) => {
                    let declared = entities.and_then(|table| table.get(name));
                    if let Some(value) = declared {
                        if let Some((expanded, delta)) = memo.get(name) {
                            self.record(*delta)?;
                            out.push_str(expanded);
                        } else {
                            let before = self.count;
                            let expanded = self.expand_declared(name, value, entities, filter, active)?;
                            out.push_str(&expanded);
                            memo.insert(name, (expanded, self.count - before));
                        }
                        if out.len() + (text.len() - amp - len) > self.text_limit {
                            return Err(ParseError::security_limit(
                                "entity expansion has grown too large",
                                amp,
                            ));
                        }
                    } else if let Some(value) = predefined(name) {
                        out.push_str(value);
                    } else {
                        out.push_str(&text[amp..amp + len]);
                    }
                }
            }
            pos = amp + len;
        }
        out.push_str(&text[pos..]);
        Ok(out)
    }

    /// Expand one declared entity's replacement text, charging one substitution
    fn expand_declared(
        &mut self,
        name: &str,
        value: &str,
        entities: Option<&EntityTable>,
        filter: &[&str],
        active: &mut Vec<String>,
    ) -> Result<String> {
        if active.iter().any(|n| n == name) {
            return Err(ParseError::security_limit(
                format!("entity expansion recursion detected: &{};", name),
                0,
            ));
        }
        if active.len() >= MAX_NESTING {
            return Err(ParseError::security_limit(
                format!("entity expansion nested too deeply: &{};", name),
                0,
            ));
        }
        self.record(1)?;
        active.push(name.to_string());
        let expanded = self.expand(value, entities, filter, active);
        active.pop();
        expanded
    }
}

/// A syntactically valid reference
enum Reference<'a> {
    Char(u32),
    Named(&'a str),
}

/// Parse a reference at the start of `input` (which begins with `&`)
///
/// Returns the reference and its length including `&` and `;`. Only the
/// reference's own characters are examined, never the rest of the input.
fn read_reference(input: &str) -> Option<(Reference<'_>, usize)> {
    let body = input.get(1..)?;

    if let Some(numeric) = body.strip_prefix('#') {
        let (digits, radix, prefix) = match numeric.strip_prefix('x') {
            Some(hex) => (hex, 16, 3),
            None => (numeric, 10, 2),
        };
        let len = digits
            .bytes()
            .take_while(|b| b.is_ascii_digit() || (radix == 16 && b.is_ascii_hexdigit()))
            .count();
        if len == 0 || digits.as_bytes().get(len) != Some(&b';') {
            return None;
        }
        let code = u32::from_str_radix(&digits[..len], radix).unwrap_or(u32::MAX);
        return Some((Reference::Char(code), prefix + len + 1));
    }

    let len = name_len(body)?;
    if body.as_bytes().get(len) != Some(&b';') {
        return None;
    }
    Some((Reference::Named(&body[..len]), len + 2))
}

/// True if `input` starts with a syntactically valid reference
pub(crate) fn starts_with_reference(input: &str) -> bool {
    read_reference(input).is_some()
}

/// Escape text for output
///
/// A `&` that does not begin a reference becomes `&amp;`, occurrences of a
/// declared entity's replacement text become references to it, and the
/// remaining markup characters are replaced by predefined entities.
pub fn normalize(input: &str, entities: Option<&EntityTable>) -> String {
    let mut copy = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        copy.push_str(&rest[..amp]);
        if starts_with_reference(&rest[amp..]) {
            copy.push('&');
        } else {
            copy.push_str("&amp;");
        }
        rest = &rest[amp + 1..];
    }
    copy.push_str(rest);

    if let Some(table) = entities {
        // Longest replacement first so nested values are not split
        let mut declared: Vec<(&String, &String)> =
            table.iter().filter(|(_, value)| !value.is_empty()).collect();
        declared.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        for (name, value) in declared {
            copy = copy.replace(value.as_str(), &format!("&{};", name));
        }
    }

    let mut out = String::with_capacity(copy.len());
    for c in copy.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
