//! Values that can be written and read back

use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single primitive value
///
/// Scalars are totally ordered and hashable so they can be set members and
/// map keys. Ordering between different variants follows declaration order,
/// which never matters on the wire because a container holds one tag only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scalar {
    I8(i8),
    U8(u8),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Str(String),
    Bytes(Bytes),
}

/// A scalar or a flat container of scalars
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Absent vector; written as an empty `vec`
    Null,
    Scalar(Scalar),
    Vec(Vec<Scalar>),
    Set(HashSet<Scalar>),
    Map(HashMap<Scalar, Scalar>),
}

impl Scalar {
    /// Short name of the variant, used in mismatch errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::I8(_) => "i8",
            Scalar::U8(_) => "u8",
            Scalar::I32(_) => "i32",
            Scalar::U32(_) => "u32",
            Scalar::I64(_) => "i64",
            Scalar::U64(_) => "u64",
            Scalar::Str(_) => "string",
            Scalar::Bytes(_) => "bytes",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Scalar::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Scalar(s) => s.type_name(),
            Value::Vec(_) => "vec",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Build a set value from any iterator of scalars
    pub fn set<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Value::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a vector value from any iterator of scalars
    pub fn vec<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Value::Vec(items.into_iter().map(Into::into).collect())
    }

    /// Build a map value from any iterator of key/value pairs
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Scalar>,
        V: Into<Scalar>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Scalar::$variant(v.into())
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Scalar(v.into())
                }
            }
        )*
    };
}

scalar_from! {
    i8 => I8,
    u8 => U8,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    String => Str,
    &str => Str,
    Bytes => Bytes,
    Vec<u8> => Bytes,
}

impl From<&[u8]> for Scalar {
    fn from(v: &[u8]) -> Self {
        Scalar::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::I8(n) => write!(f, "{}", n),
            Scalar::U8(n) => write!(f, "{}", n),
            Scalar::I32(n) => write!(f, "{}", n),
            Scalar::U32(n) => write!(f, "{}", n),
            Scalar::I64(n) => write!(f, "{}", n),
            Scalar::U64(n) => write!(f, "{}", n),
            Scalar::Str(s) => write!(f, "{:?}", s),
            Scalar::Bytes(b) => write!(f, "{:?}", b),
        }
    }
}
