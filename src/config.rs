//! Per-session codec settings

use crate::data_types::DEFAULT_ENCODING;
use crate::encoding::TextEncoding;

/// Default cap on any decoded length prefix or element count (1 GiB)
pub const DEFAULT_MAX_PAYLOAD_LEN: u64 = 1 << 30;

/// Settings shared by every read and write of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Encoding for `str`/`sstr` components without a `/hint`
    pub default_encoding: TextEncoding,
    /// Largest length or count accepted while decoding
    pub max_payload_len: u64,
}

impl CodecConfig {
    pub const fn new() -> Self {
        Self {
            default_encoding: DEFAULT_ENCODING,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }

    pub fn with_default_encoding(mut self, encoding: TextEncoding) -> Self {
        self.default_encoding = encoding;
        self
    }

    pub fn with_max_payload_len(mut self, max: u64) -> Self {
        self.max_payload_len = max;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.default_encoding, TextEncoding::Utf8);
        assert_eq!(config.max_payload_len, DEFAULT_MAX_PAYLOAD_LEN);

        let config = config
            .with_default_encoding(TextEncoding::Latin1)
            .with_max_payload_len(16);
        assert_eq!(config.default_encoding, TextEncoding::Latin1);
        assert_eq!(config.max_payload_len, 16);
    }
}
