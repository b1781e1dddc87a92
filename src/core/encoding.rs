//! XML Encoding Detection and Conversion
//!
//! Detects the encoding of raw input from its byte order mark or initial
//! byte pattern, decodes it to UTF-8, and maps the labels an XML declaration
//! may carry (`encoding="..."`) onto the encodings we can switch between.

/// Encodings the source can decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    /// ISO-8859-1; also used for US-ASCII, which is a strict subset
    Latin1,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    ///
    /// Input without a UTF-16 signature is treated as UTF-8 when it is valid
    /// UTF-8 and as Latin-1 otherwise; an xml declaration can still switch it.
    pub fn detect(input: &[u8]) -> Self {
        if input.len() >= 2 {
            match (input[0], input[1]) {
                // UTF-16 LE BOM: 0xFF 0xFE
                (0xFF, 0xFE) => return XmlEncoding::Utf16Le,
                // UTF-16 BE BOM: 0xFE 0xFF
                (0xFE, 0xFF) => return XmlEncoding::Utf16Be,
                // No BOM - '<' paired with a null byte
                (0x00, b'<') => return XmlEncoding::Utf16Be,
                (b'<', 0x00) => return XmlEncoding::Utf16Le,
                _ => {}
            }
        }

        if std::str::from_utf8(input).is_ok() {
            XmlEncoding::Utf8
        } else {
            XmlEncoding::Latin1
        }
    }

    /// Map an encoding label from an xml declaration (case-insensitive)
    ///
    /// UTF-16 labels return `None`: the byte layout of UTF-16 input is already
    /// known from detection, so a declared UTF-16 label never switches decoding.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(XmlEncoding::Utf8),
            "iso-8859-1" | "iso_8859-1" | "iso8859-1" | "latin1" | "latin-1" | "l1"
            | "us-ascii" | "ascii" => Some(XmlEncoding::Latin1),
            _ => None,
        }
    }

    /// True for any spelling of UTF-16
    pub fn is_utf16_label(label: &str) -> bool {
        matches!(
            label.to_ascii_lowercase().as_str(),
            "utf-16" | "utf16" | "utf-16le" | "utf-16be"
        )
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            XmlEncoding::Utf8 => "UTF-8",
            XmlEncoding::Utf16Le => "UTF-16LE",
            XmlEncoding::Utf16Be => "UTF-16BE",
            XmlEncoding::Latin1 => "ISO-8859-1",
        }
    }

    pub fn is_utf16(&self) -> bool {
        matches!(self, XmlEncoding::Utf16Le | XmlEncoding::Utf16Be)
    }

    /// Decode raw bytes, skipping a byte order mark that matches this encoding
    pub fn decode(&self, input: &[u8]) -> Result<String, String> {
        match self {
            XmlEncoding::Utf8 => {
                let bytes = input.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(input);
                std::str::from_utf8(bytes)
                    .map(str::to_owned)
                    .map_err(|e| format!("Invalid UTF-8: {}", e))
            }
            XmlEncoding::Latin1 => Ok(input.iter().map(|&b| b as char).collect()),
            XmlEncoding::Utf16Le => decode_utf16(input, &[0xFF, 0xFE], u16::from_le_bytes, "LE"),
            XmlEncoding::Utf16Be => decode_utf16(input, &[0xFE, 0xFF], u16::from_be_bytes, "BE"),
        }
    }
}

/// Convert UTF-16 in either byte order to a String
fn decode_utf16(
    input: &[u8],
    bom: &[u8; 2],
    unit: fn([u8; 2]) -> u16,
    order: &str,
) -> Result<String, String> {
    // Skip BOM if present
    let bytes = input.strip_prefix(bom).unwrap_or(input);

    // Ensure even number of bytes
    if bytes.len() % 2 != 0 {
        return Err(format!("Invalid UTF-16 {}: odd number of bytes", order));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units).map_err(|e| format!("Invalid UTF-16 {}: {}", order, e))
}
