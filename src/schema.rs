//! Type descriptors for Flatcable
//!
//! A descriptor is a short string such as `"i"`, `"vec:sstr/latin-1"` or
//! `"map:str/ascii:L"`. It is parsed fresh for every read and write.

use crate::data_types::{ContainerTag, ScalarKind, ScalarTag, Tag};
use crate::error::{FlatcableError, Result};
use crate::value::{Scalar, Value};
use std::fmt;
use std::str::FromStr;

/// One `tag[/encoding]` piece of a descriptor, before any tag is checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component<'a> {
    pub tag: &'a str,
    pub encoding: Option<&'a str>,
}

/// Split a descriptor on `:` and each piece on its first `/`.
///
/// This never fails; unknown tags are reported by [`Descriptor::parse`].
pub fn parse_components(descriptor: &str) -> Vec<Component<'_>> {
    descriptor
        .split(':')
        .map(|piece| match piece.split_once('/') {
            Some((tag, encoding)) => Component {
                tag,
                encoding: Some(encoding),
            },
            None => Component {
                tag: piece,
                encoding: None,
            },
        })
        .collect()
}

/// A scalar tag plus its optional text-encoding hint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScalarType {
    pub tag: ScalarTag,
    /// Only consulted for `str` and `sstr`
    pub encoding: Option<String>,
}

impl ScalarType {
    pub fn new(tag: ScalarTag) -> Self {
        Self {
            tag,
            encoding: None,
        }
    }

    pub fn with_encoding(tag: ScalarTag, encoding: impl Into<String>) -> Self {
        Self {
            tag,
            encoding: Some(encoding.into()),
        }
    }

    /// The hint, or `None` when the tag is not a string tag
    pub fn text_encoding(&self) -> Option<&str> {
        match self.tag.kind() {
            ScalarKind::Text => self.encoding.as_deref(),
            ScalarKind::Number | ScalarKind::Binary => None,
        }
    }

    fn from_component(component: &Component<'_>) -> Result<Self> {
        match Tag::from_name(component.tag) {
            Some(Tag::Scalar(tag)) => Ok(Self {
                tag,
                encoding: component.encoding.map(str::to_owned),
            }),
            Some(Tag::Container(_)) | None => {
                Err(FlatcableError::UnsupportedType(component.tag.to_string()))
            }
        }
    }

    /// Validate that a scalar fits this type
    pub fn validate(&self, scalar: &Scalar) -> Result<()> {
        let ok = matches!(
            (self.tag, scalar),
            (ScalarTag::I8, Scalar::I8(_))
                | (ScalarTag::U8, Scalar::U8(_))
                | (ScalarTag::I32, Scalar::I32(_))
                | (ScalarTag::U32, Scalar::U32(_))
                | (ScalarTag::I64, Scalar::I64(_))
                | (ScalarTag::U64, Scalar::U64(_))
                | (ScalarTag::Str | ScalarTag::ShortStr, Scalar::Str(_))
                | (ScalarTag::Bytes | ScalarTag::ShortBytes, Scalar::Bytes(_))
        );
        if ok {
            Ok(())
        } else {
            Err(FlatcableError::mismatch(
                format!("{} value", self.tag),
                scalar.type_name(),
            ))
        }
    }
}

/// A parsed descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Scalar(ScalarType),
    Vec(ScalarType),
    Set(ScalarType),
    Map(ScalarType, ScalarType),
}

impl Descriptor {
    /// Create a scalar descriptor
    pub fn scalar(tag: ScalarTag) -> Self {
        Descriptor::Scalar(ScalarType::new(tag))
    }

    /// Create a vector descriptor
    pub fn vec(element: ScalarType) -> Self {
        Descriptor::Vec(element)
    }

    /// Create a set descriptor
    pub fn set(member: ScalarType) -> Self {
        Descriptor::Set(member)
    }

    /// Create a map descriptor
    pub fn map(key: ScalarType, value: ScalarType) -> Self {
        Descriptor::Map(key, value)
    }

    /// Parse a textual descriptor
    pub fn parse(descriptor: &str) -> Result<Self> {
        let components = parse_components(descriptor);
        let head = &components[0];
        let rest = &components[1..];

        let container = match Tag::from_name(head.tag) {
            Some(Tag::Scalar(_)) => {
                if !rest.is_empty() {
                    return Err(malformed(descriptor, "a scalar takes no element types"));
                }
                return ScalarType::from_component(head).map(Descriptor::Scalar);
            }
            Some(Tag::Container(container)) => container,
            None => return Err(FlatcableError::UnsupportedType(head.tag.to_string())),
        };

        let types = rest
            .iter()
            .map(ScalarType::from_component)
            .collect::<Result<Vec<_>>>()?;

        Ok(match (container, types.as_slice()) {
            (ContainerTag::Vec, [element]) => Descriptor::Vec(element.clone()),
            (ContainerTag::Set, [member]) => Descriptor::Set(member.clone()),
            (ContainerTag::Map, [key, value]) => Descriptor::Map(key.clone(), value.clone()),
            _ => {
                return Err(malformed(
                    descriptor,
                    format!(
                        "{} takes {} element type(s), found {}",
                        container,
                        container.arity(),
                        types.len()
                    ),
                ))
            }
        })
    }

    /// Validate that a value matches this descriptor
    pub fn validate(&self, value: &Value) -> Result<()> {
        match (self, value) {
            (Descriptor::Scalar(ty), Value::Scalar(s)) => ty.validate(s),
            (Descriptor::Vec(_), Value::Null) => Ok(()),
            (Descriptor::Vec(ty), Value::Vec(items)) => items.iter().try_for_each(|s| ty.validate(s)),
            (Descriptor::Set(ty), Value::Set(members)) => {
                members.iter().try_for_each(|s| ty.validate(s))
            }
            (Descriptor::Map(key_ty, value_ty), Value::Map(entries)) => {
                entries.iter().try_for_each(|(k, v)| {
                    key_ty.validate(k)?;
                    value_ty.validate(v)
                })
            }
            (expected, actual) => Err(FlatcableError::mismatch(
                expected.to_string(),
                actual.type_name(),
            )),
        }
    }
}

fn malformed(descriptor: &str, reason: impl Into<String>) -> FlatcableError {
    FlatcableError::MalformedDescriptor {
        descriptor: descriptor.to_string(),
        reason: reason.into(),
    }
}

impl FromStr for Descriptor {
    type Err = FlatcableError;

    fn from_str(s: &str) -> Result<Self> {
        Descriptor::parse(s)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.encoding {
            Some(enc) => write!(f, "{}/{}", self.tag, enc),
            None => write!(f, "{}", self.tag),
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Scalar(ty) => write!(f, "{}", ty),
            Descriptor::Vec(ty) => write!(f, "vec:{}", ty),
            Descriptor::Set(ty) => write!(f, "set:{}", ty),
            Descriptor::Map(k, v) => write!(f, "map:{}:{}", k, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_components() {
        let parts = parse_components("map:str/ascii:L");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], Component { tag: "map", encoding: None });
        assert_eq!(parts[1], Component { tag: "str", encoding: Some("ascii") });
        assert_eq!(parts[2], Component { tag: "L", encoding: None });

        // only the first slash splits
        let parts = parse_components("str/a/b");
        assert_eq!(parts[0].encoding, Some("a/b"));

        // unknown tags are not rejected here
        assert_eq!(parse_components("q")[0].tag, "q");
    }

    #[test]
    fn test_parse_descriptors() {
        assert_eq!(Descriptor::parse("I").unwrap(), Descriptor::scalar(ScalarTag::U32));
        assert_eq!(
            Descriptor::parse("vec:sstr/latin-1").unwrap(),
            Descriptor::vec(ScalarType::with_encoding(ScalarTag::ShortStr, "latin-1"))
        );
        assert_eq!(
            Descriptor::parse("map:i:I").unwrap(),
            Descriptor::map(ScalarType::new(ScalarTag::I32), ScalarType::new(ScalarTag::U32))
        );
    }

    #[test]
    fn test_unsupported_tags() {
        for descriptor in ["q", "vec:q", "map:i:q", "set:vec", "vec:vec:i"] {
            match Descriptor::parse(descriptor) {
                Err(FlatcableError::UnsupportedType(_)) => {}
                other => panic!("{}: expected UnsupportedType, got {:?}", descriptor, other),
            }
        }
        match Descriptor::parse("map:i:zz") {
            Err(FlatcableError::UnsupportedType(tag)) => assert_eq!(tag, "zz"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed() {
        for descriptor in ["vec", "map:i", "i:i", "set:i:i"] {
            assert!(
                matches!(
                    Descriptor::parse(descriptor),
                    Err(FlatcableError::MalformedDescriptor { .. })
                ),
                "{}",
                descriptor
            );
        }
    }

    #[test]
    fn test_encoding_hint_ignored_for_numbers() {
        let d = Descriptor::parse("i/utf-8").unwrap();
        match d {
            Descriptor::Scalar(ty) => assert_eq!(ty.text_encoding(), None),
            other => panic!("unexpected {:?}", other),
        }
        let ty = ScalarType::with_encoding(ScalarTag::Str, "ascii");
        assert_eq!(ty.text_encoding(), Some("ascii"));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["b", "sstr/utf-8", "vec:B", "set:L", "map:str/ascii:L"] {
            assert_eq!(Descriptor::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_validate() {
        let d = Descriptor::parse("vec:i").unwrap();
        assert!(d.validate(&Value::vec([1i32, 2])).is_ok());
        assert!(d.validate(&Value::Null).is_ok());
        assert!(matches!(
            d.validate(&Value::vec([1u32])),
            Err(FlatcableError::TypeMismatch { .. })
        ));
        assert!(Descriptor::parse("I").unwrap().validate(&Value::from("x")).is_err());
        assert!(Descriptor::parse("set:I").unwrap().validate(&Value::Null).is_err());
    }
}
