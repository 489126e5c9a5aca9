//! Tag constants and the fixed wire layout for Flatcable
//!
//! Every number and length prefix on the wire is little-endian. The widths
//! below are the whole layout table; nothing about it changes at runtime.

use crate::encoding::TextEncoding;
use std::fmt;

/// Encoding used by `str`/`sstr` when the descriptor carries no hint.
pub const DEFAULT_ENCODING: TextEncoding = TextEncoding::Utf8;

/// Prefix used for `str`, `byt` and every container count.
pub const LONG_PREFIX: ScalarTag = ScalarTag::U64;

/// Prefix used for `sstr` and `sbyt`.
pub const SHORT_PREFIX: ScalarTag = ScalarTag::U8;

/// Largest payload a short-form prefix can frame.
pub const SHORT_MAX_LEN: u64 = u8::MAX as u64;

/// Scalar tags usable on their own or as container elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    /// `b`
    I8,
    /// `B`
    U8,
    /// `i`
    I32,
    /// `I`
    U32,
    /// `l`
    I64,
    /// `L`
    U64,
    /// `str`, long length prefix
    Str,
    /// `sstr`, one byte length prefix
    ShortStr,
    /// `byt`, long length prefix
    Bytes,
    /// `sbyt`, one byte length prefix
    ShortBytes,
}

/// Container tags, which only appear as the first descriptor component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerTag {
    /// `vec:T`, elements in caller order
    Vec,
    /// `set:T`, members in ascending order
    Set,
    /// `map:K:V`, entries in ascending key order
    Map,
}

/// Any tag that may start a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A tag that stands alone or as a container element
    Scalar(ScalarTag),
    /// A tag that must be followed by element tags
    Container(ContainerTag),
}

/// Which of the two length-prefix widths frames a variable-length payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthForm {
    /// One byte prefix, payloads up to 255 bytes
    Short,
    /// Eight byte prefix
    Long,
}

/// Broad family of a scalar tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Fixed-width integer
    Number,
    /// Length-prefixed string in some text encoding
    Text,
    /// Length-prefixed raw bytes
    Binary,
}

impl ScalarTag {
    pub const ALL: [ScalarTag; 10] = [
        ScalarTag::I8,
        ScalarTag::U8,
        ScalarTag::I32,
        ScalarTag::U32,
        ScalarTag::I64,
        ScalarTag::U64,
        ScalarTag::Str,
        ScalarTag::ShortStr,
        ScalarTag::Bytes,
        ScalarTag::ShortBytes,
    ];

    /// Convert from the descriptor spelling
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "b" => Some(ScalarTag::I8),
            "B" => Some(ScalarTag::U8),
            "i" => Some(ScalarTag::I32),
            "I" => Some(ScalarTag::U32),
            "l" => Some(ScalarTag::I64),
            "L" => Some(ScalarTag::U64),
            "str" => Some(ScalarTag::Str),
            "sstr" => Some(ScalarTag::ShortStr),
            "byt" => Some(ScalarTag::Bytes),
            "sbyt" => Some(ScalarTag::ShortBytes),
            _ => None,
        }
    }

    /// Convert to the descriptor spelling
    pub fn name(self) -> &'static str {
        match self {
            ScalarTag::I8 => "b",
            ScalarTag::U8 => "B",
            ScalarTag::I32 => "i",
            ScalarTag::U32 => "I",
            ScalarTag::I64 => "l",
            ScalarTag::U64 => "L",
            ScalarTag::Str => "str",
            ScalarTag::ShortStr => "sstr",
            ScalarTag::Bytes => "byt",
            ScalarTag::ShortBytes => "sbyt",
        }
    }

    pub fn kind(self) -> ScalarKind {
        match self {
            ScalarTag::I8
            | ScalarTag::U8
            | ScalarTag::I32
            | ScalarTag::U32
            | ScalarTag::I64
            | ScalarTag::U64 => ScalarKind::Number,
            ScalarTag::Str | ScalarTag::ShortStr => ScalarKind::Text,
            ScalarTag::Bytes | ScalarTag::ShortBytes => ScalarKind::Binary,
        }
    }

    /// Fixed byte width of a numeric tag, `None` for variable-length tags
    pub const fn width(self) -> Option<usize> {
        match self {
            ScalarTag::I8 | ScalarTag::U8 => Some(1),
            ScalarTag::I32 | ScalarTag::U32 => Some(4),
            ScalarTag::I64 | ScalarTag::U64 => Some(8),
            _ => None,
        }
    }

    /// Length-prefix form of a string or bytes tag, `None` for numbers
    pub fn length_form(self) -> Option<LengthForm> {
        match self {
            ScalarTag::Str | ScalarTag::Bytes => Some(LengthForm::Long),
            ScalarTag::ShortStr | ScalarTag::ShortBytes => Some(LengthForm::Short),
            _ => None,
        }
    }
}

impl ContainerTag {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vec" => Some(ContainerTag::Vec),
            "set" => Some(ContainerTag::Set),
            "map" => Some(ContainerTag::Map),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ContainerTag::Vec => "vec",
            ContainerTag::Set => "set",
            ContainerTag::Map => "map",
        }
    }

    /// Number of scalar components that follow the container tag
    pub fn arity(self) -> usize {
        match self {
            ContainerTag::Vec | ContainerTag::Set => 1,
            ContainerTag::Map => 2,
        }
    }
}

impl Tag {
    pub fn from_name(name: &str) -> Option<Self> {
        ScalarTag::from_name(name)
            .map(Tag::Scalar)
            .or_else(|| ContainerTag::from_name(name).map(Tag::Container))
    }
}

impl LengthForm {
    /// Tag whose width carries the prefix
    pub fn prefix_tag(self) -> ScalarTag {
        match self {
            LengthForm::Short => SHORT_PREFIX,
            LengthForm::Long => LONG_PREFIX,
        }
    }

    /// Largest payload this form can frame
    pub fn max_len(self) -> u64 {
        match self {
            LengthForm::Short => SHORT_MAX_LEN,
            LengthForm::Long => u64::MAX,
        }
    }

    /// Bytes taken by the prefix itself
    pub fn prefix_width(self) -> usize {
        match self {
            LengthForm::Short => 1,
            LengthForm::Long => 8,
        }
    }
}

impl fmt::Display for ScalarTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ContainerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_reversible() {
        for tag in ScalarTag::ALL {
            assert_eq!(ScalarTag::from_name(tag.name()), Some(tag));
        }
        assert_eq!(Tag::from_name("map"), Some(Tag::Container(ContainerTag::Map)));
        assert_eq!(Tag::from_name("q"), None);
    }

    #[test]
    fn test_widths() {
        assert_eq!(ScalarTag::I8.width(), Some(1));
        assert_eq!(ScalarTag::U32.width(), Some(4));
        assert_eq!(ScalarTag::I64.width(), Some(8));
        assert_eq!(ScalarTag::Str.width(), None);
    }

    #[test]
    fn test_prefix_layout_matches_numeric_widths() {
        assert_eq!(LONG_PREFIX.width(), Some(LengthForm::Long.prefix_width()));
        assert_eq!(SHORT_PREFIX.width(), Some(LengthForm::Short.prefix_width()));
        assert_eq!(ScalarTag::ShortStr.length_form(), Some(LengthForm::Short));
        assert_eq!(ScalarTag::Bytes.length_form(), Some(LengthForm::Long));
        assert_eq!(ScalarTag::U64.length_form(), None);
    }
}
