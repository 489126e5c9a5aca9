//! Error types for Flatcable

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FlatcableError>;

/// Main error type for Flatcable operations
#[derive(Debug, Error)]
pub enum FlatcableError {
    /// The descriptor names a tag outside the supported set.
    #[error("type {0} unsupported")]
    UnsupportedType(String),

    /// The descriptor has the wrong number of components for its container tag.
    #[error("malformed descriptor {descriptor:?}: {reason}")]
    MalformedDescriptor {
        /// The descriptor as given by the caller.
        descriptor: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A payload or count does not fit the length prefix (or the decode guard).
    #[error("length {len} exceeds the maximum of {max}")]
    LengthOverflow {
        /// The offending length.
        len: u64,
        /// The largest length allowed in this position.
        max: u64,
    },

    /// A map read found the same key twice.
    #[error("duplicate key {0}")]
    DuplicateKey(String),

    /// Bytes are not valid in the declared text encoding.
    #[error("cannot decode {encoding}: {message}")]
    Decode {
        /// Encoding that was used.
        encoding: &'static str,
        /// Details from the decoder.
        message: String,
    },

    /// Text contains a character the declared encoding cannot represent.
    #[error("cannot encode {encoding}: {message}")]
    Encode {
        /// Encoding that was used.
        encoding: &'static str,
        /// Details from the encoder.
        message: String,
    },

    /// The encoding hint names an encoding this crate does not know.
    #[error("unknown text encoding {0:?}")]
    UnsupportedEncoding(String),

    /// The value passed to a write does not have the shape the descriptor asks for.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// What the descriptor expects.
        expected: String,
        /// What the value actually was.
        actual: String,
    },

    /// Attempt to read past end of stream.
    #[error("attempt to read past end of stream")]
    OutOfData,

    /// Error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlatcableError {
    pub(crate) fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// True for failures raised by the stream rather than by the codec.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::OutOfData | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_class() {
        assert!(FlatcableError::OutOfData.is_io());
        let err: FlatcableError = std::io::Error::other("closed").into();
        assert!(err.is_io());
        assert!(!FlatcableError::UnsupportedType("q".into()).is_io());
    }

    #[test]
    fn test_messages_name_the_offender() {
        assert_eq!(
            FlatcableError::UnsupportedType("q".into()).to_string(),
            "type q unsupported"
        );
        let err = FlatcableError::LengthOverflow { len: 256, max: 255 };
        assert_eq!(err.to_string(), "length 256 exceeds the maximum of 255");
    }
}
