//! Source Cursor
//!
//! Owns the decoded input and a byte position into it. Matching follows a
//! "try and consume" discipline: every `match_*` method either consumes what
//! it recognized and reports success, or leaves the position untouched.
//! Byte searching uses memchr with SIMD acceleration.

use super::encoding::XmlEncoding;
use super::error::{ParseError, Result};
use memchr::{memchr, memchr_iter, memmem, memrchr};

/// A qualified name split at its colon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// Full name as written
    pub raw: String,
    pub prefix: Option<String>,
    pub local: String,
}

/// Input cursor over decoded document text
#[derive(Debug)]
pub struct Source {
    text: String,
    pos: usize,
    encoding: XmlEncoding,
    /// Original bytes, kept so an xml declaration can switch decoding
    raw: Option<Vec<u8>>,
}

impl Source {
    /// Create a source over already-decoded text
    pub fn new(text: impl Into<String>) -> Self {
        Source {
            text: text.into(),
            pos: 0,
            encoding: XmlEncoding::Utf8,
            raw: None,
        }
    }

    /// Create a source from raw bytes, detecting their encoding
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let encoding = XmlEncoding::detect(&bytes);
        let text = encoding
            .decode(&bytes)
            .map_err(|msg| ParseError::structural(msg, 0))?;
        Ok(Source {
            text,
            pos: 0,
            encoding,
            raw: Some(bytes),
        })
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
    }

    /// Check if all input has been consumed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Unconsumed input
    #[inline]
    pub fn remaining(&self) -> &str {
        &self.text[self.pos..]
    }

    /// Get a slice of the decoded text
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.text[start..end]
    }

    pub fn encoding(&self) -> XmlEncoding {
        self.encoding
    }

    /// Switch decoding of the unconsumed input to the encoding named by `label`
    ///
    /// Only ASCII-compatible single-byte encodings can be switched between, and
    /// only while everything consumed so far is ASCII (true for any input that
    /// has not yet passed its xml declaration).
    pub fn set_encoding(&mut self, label: &str) -> Result<()> {
        let target = XmlEncoding::from_label(label).ok_or_else(|| {
            ParseError::structural(format!("Unsupported encoding: {}", label), self.pos)
        })?;
        if target == self.encoding || self.encoding.is_utf16() {
            return Ok(());
        }

        let Some(raw) = self.raw.as_ref() else {
            // Text handed in as a Rust string is already decoded
            self.encoding = target;
            return Ok(());
        };

        let consumed = &self.text[..self.pos];
        if !consumed.is_ascii() {
            return Err(ParseError::structural(
                format!("Cannot switch encoding to {} after non-ASCII content", label),
                self.pos,
            ));
        }

        // Consumed text is ASCII, so its byte length matches the raw offset
        let bom = if raw.starts_with(&[0xEF, 0xBB, 0xBF]) { 3 } else { 0 };
        let start = (bom + self.pos).min(raw.len());
        let rest = target
            .decode(&raw[start..])
            .map_err(|msg| ParseError::structural(msg, self.pos))?;

        tracing::debug!(from = self.encoding.name(), to = target.name(), "switching source encoding");
        self.text.truncate(self.pos);
        self.text.push_str(&rest);
        self.encoding = target;
        Ok(())
    }

    /// Peek at the next character without consuming it
    #[inline]
    pub fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Check if the unconsumed input starts with `literal`
    #[inline]
    pub fn starts_with(&self, literal: &str) -> bool {
        self.remaining().starts_with(literal)
    }

    /// Consume `literal` if the input starts with it
    #[inline]
    pub fn match_str(&mut self, literal: &str) -> bool {
        if self.starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.set_position(self.pos + n);
    }

    /// Skip whitespace characters, returning how many bytes were skipped
    #[inline]
    pub fn skip_whitespace(&mut self) -> usize {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && is_whitespace(bytes[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Consume one or more whitespace characters
    #[inline]
    pub fn match_whitespace(&mut self) -> bool {
        self.skip_whitespace() > 0
    }

    /// Check whether `literal` follows optional whitespace, without consuming
    pub fn peek_after_whitespace(&self, literal: &str) -> bool {
        self.remaining()
            .trim_start_matches(|c: char| c.is_ascii() && is_whitespace(c as u8))
            .starts_with(literal)
    }

    /// Find the absolute position of `needle` at or after the cursor
    #[inline]
    pub fn find(&self, needle: &str) -> Option<usize> {
        if needle.len() == 1 {
            memchr(needle.as_bytes()[0], self.remaining().as_bytes()).map(|i| self.pos + i)
        } else {
            memmem::find(self.remaining().as_bytes(), needle.as_bytes()).map(|i| self.pos + i)
        }
    }

    /// Read up to `delimiter`, consuming the delimiter as well
    ///
    /// Returns None, consuming nothing, when the delimiter never occurs.
    pub fn read_until(&mut self, delimiter: &str) -> Option<String> {
        let end = self.find(delimiter)?;
        let value = self.text[self.pos..end].to_owned();
        self.pos = end + delimiter.len();
        Some(value)
    }

    /// Read up to (not including) the next `byte`, or to the end of input
    pub fn read_until_byte_or_end(&mut self, byte: u8) -> String {
        let end = memchr(byte, self.remaining().as_bytes())
            .map(|i| self.pos + i)
            .unwrap_or(self.text.len());
        let value = self.text[self.pos..end].to_owned();
        self.pos = end;
        value
    }

    /// Read an XML name: a name start character followed by name characters
    pub fn read_name(&mut self) -> Option<String> {
        let rest = self.remaining();
        let end = name_len(rest)?;
        let name = rest[..end].to_owned();
        self.pos += end;
        Some(name)
    }

    /// Read a qualified name `(prefix:)?local`
    pub fn read_qname(&mut self) -> Option<QName> {
        let start = self.pos;
        let first = self.read_ncname()?;
        if self.starts_with(":") {
            let colon = self.pos;
            self.pos += 1;
            if let Some(local) = self.read_ncname() {
                return Some(QName {
                    raw: self.text[start..self.pos].to_owned(),
                    prefix: Some(first),
                    local,
                });
            }
            // Trailing colon is not part of the name
            self.pos = colon;
        }
        Some(QName {
            raw: first.clone(),
            prefix: None,
            local: first,
        })
    }

    /// Read a name without colons
    fn read_ncname(&mut self) -> Option<String> {
        let rest = self.remaining();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' => {}
            _ => return None,
        }
        let end = chars
            .find(|&(_, c)| !(is_name_char(c) && c != ':'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let name = rest[..end].to_owned();
        self.pos += end;
        Some(name)
    }

    /// Read a quoted literal, returning the quote and the unquoted body
    ///
    /// Consumes nothing unless both quotes are present.
    pub fn read_quoted(&mut self) -> Option<(char, String)> {
        let quote = match self.peek_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => return None,
        };
        let start = self.pos;
        self.pos += 1;
        match self.read_until(if quote == '"' { "\"" } else { "'" }) {
            Some(body) => Some((quote, body)),
            None => {
                self.pos = start;
                None
            }
        }
    }

    /// First whitespace/`>`/`/` delimited token of the unconsumed input
    pub fn next_token(&self) -> &str {
        let rest = self.remaining();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len());
        &rest[..end]
    }

    /// 1-based line and column of a byte position
    pub fn line_column(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.text.len());
        let before = &self.text.as_bytes()[..pos];
        let line = memchr_iter(b'\n', before).count() + 1;
        let line_start = memrchr(b'\n', before).map(|i| i + 1).unwrap_or(0);
        let column = self.text[line_start..pos].chars().count() + 1;
        (line, column)
    }

    /// Build an error anchored at `pos` with line/column filled in
    pub fn error_at(&self, error: ParseError) -> ParseError {
        let (line, column) = self.line_column(error.position);
        error.at(line, column)
    }
}

/// Byte length of the XML name at the start of `s`
///
/// Stops at the first character that cannot continue a name.
pub fn name_len(s: &str) -> Option<usize> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if is_name_start_char(c) => {}
        _ => return None,
    }
    Some(chars.find(|&(_, c)| !is_name_char(c)).map_or(s.len(), |(i, _)| i))
}

/// Check if byte is XML whitespace (space, tab, newline, carriage return)
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// True if the string contains only XML whitespace
#[inline]
pub fn is_blank(s: &str) -> bool {
    s.bytes().all(is_whitespace)
}

/// Check if char is valid XML name start character
#[inline]
pub fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

/// Check if char is valid XML name character
#[inline]
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '\u{B7}')
}
