//! Text encodings accepted in `str`/`sstr` hints

use crate::error::{FlatcableError, Result};
use std::fmt;
use std::str::FromStr;

/// A text encoding named by a descriptor hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// Look up an encoding by label, ignoring case and `-`/`_` separators
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "utf8" => Some(TextEncoding::Utf8),
            "ascii" | "usascii" => Some(TextEncoding::Ascii),
            "latin1" | "l1" | "iso88591" => Some(TextEncoding::Latin1),
            "utf16le" => Some(TextEncoding::Utf16Le),
            "utf16be" => Some(TextEncoding::Utf16Be),
            _ => None,
        }
    }

    /// Resolve an optional hint, falling back to `default`
    pub fn resolve(hint: Option<&str>, default: TextEncoding) -> Result<Self> {
        match hint {
            None => Ok(default),
            Some(label) => label.parse(),
        }
    }

    /// Canonical label
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf16Le => "utf-16-le",
            TextEncoding::Utf16Be => "utf-16-be",
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Ascii => self.encode_narrow(text, 0x7f),
            TextEncoding::Latin1 => self.encode_narrow(text, 0xff),
            TextEncoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        }
    }

    /// Byte length of `text` in this encoding, assuming `encode` accepts it
    pub fn encoded_len(self, text: &str) -> usize {
        match self {
            TextEncoding::Utf8 => text.len(),
            TextEncoding::Ascii | TextEncoding::Latin1 => text.chars().count(),
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => text.encode_utf16().count() * 2,
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| self.decode_error(e.to_string())),
            TextEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(pos) => Err(self.decode_error(format!(
                    "byte 0x{:02x} at position {} is out of range",
                    bytes[pos], pos
                ))),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Utf16Le => self.decode_utf16(bytes, u16::from_le_bytes),
            TextEncoding::Utf16Be => self.decode_utf16(bytes, u16::from_be_bytes),
        }
    }

    fn encode_narrow(self, text: &str, max: u32) -> Result<Vec<u8>> {
        text.chars()
            .enumerate()
            .map(|(pos, c)| {
                u8::try_from(u32::from(c))
                    .ok()
                    .filter(|b| u32::from(*b) <= max)
                    .ok_or_else(|| FlatcableError::Encode {
                        encoding: self.label(),
                        message: format!("character {:?} at position {} is out of range", c, pos),
                    })
            })
            .collect()
    }

    fn decode_utf16(self, bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
        if bytes.len() % 2 != 0 {
            return Err(self.decode_error("truncated code unit".to_string()));
        }
        let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
        char::decode_utf16(units)
            .collect::<std::result::Result<String, _>>()
            .map_err(|e| self.decode_error(e.to_string()))
    }

    fn decode_error(self, message: String) -> FlatcableError {
        FlatcableError::Decode {
            encoding: self.label(),
            message,
        }
    }
}

impl FromStr for TextEncoding {
    type Err = FlatcableError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| FlatcableError::UnsupportedEncoding(s.to_string()))
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
