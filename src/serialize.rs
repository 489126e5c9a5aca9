//! Serialization functions

use crate::config::CodecConfig;
use crate::data_types::{LengthForm, ScalarKind};
use crate::encoding::TextEncoding;
use crate::error::{FlatcableError, Result};
use crate::fixed_int::{get_number_size, put_length, put_number};
use crate::schema::{Descriptor, ScalarType};
use crate::value::{Scalar, Value};
use bytes::{BufMut, Bytes, BytesMut};
use std::borrow::Cow;
use std::io::Write;

/// Calculate the size needed to serialize a scalar
///
/// Strings are sized in their target encoding without encoding them. The
/// figure is exact for every string the writer later accepts.
fn calculate_scalar_size(ty: &ScalarType, value: &Scalar, config: &CodecConfig) -> Result<usize> {
    match ty.tag.kind() {
        ScalarKind::Number => get_number_size(ty.tag),
        ScalarKind::Text => {
            let text = text_of(value)?;
            let encoding = TextEncoding::resolve(ty.text_encoding(), config.default_encoding)?;
            Ok(prefix_width(ty) + encoding.encoded_len(text))
        }
        ScalarKind::Binary => {
            let bytes = value
                .as_bytes()
                .ok_or_else(|| FlatcableError::mismatch("bytes", value.type_name()))?;
            Ok(prefix_width(ty) + bytes.len())
        }
    }
}

/// Calculate the size needed to serialize a value
fn calculate_value_size(
    descriptor: &Descriptor,
    value: &Value,
    config: &CodecConfig,
) -> Result<usize> {
    let count_width = LengthForm::Long.prefix_width();
    match (descriptor, value) {
        (Descriptor::Scalar(ty), Value::Scalar(s)) => calculate_scalar_size(ty, s, config),
        (Descriptor::Vec(_), Value::Null) => Ok(count_width),
        (Descriptor::Vec(ty), Value::Vec(items)) => items.iter().try_fold(count_width, |acc, s| {
            Ok(acc + calculate_scalar_size(ty, s, config)?)
        }),
        (Descriptor::Set(ty), Value::Set(members)) => {
            members.iter().try_fold(count_width, |acc, s| {
                Ok(acc + calculate_scalar_size(ty, s, config)?)
            })
        }
        (Descriptor::Map(key_ty, value_ty), Value::Map(entries)) => {
            entries.iter().try_fold(count_width, |acc, (k, v)| {
                Ok(acc
                    + calculate_scalar_size(key_ty, k, config)?
                    + calculate_scalar_size(value_ty, v, config)?)
            })
        }
        (expected, actual) => Err(FlatcableError::mismatch(
            expected.to_string(),
            actual.type_name(),
        )),
    }
}

fn prefix_width(ty: &ScalarType) -> usize {
    ty.tag.length_form().map_or(0, LengthForm::prefix_width)
}

fn text_of(value: &Scalar) -> Result<&str> {
    value
        .as_str()
        .ok_or_else(|| FlatcableError::mismatch("string", value.type_name()))
}

fn encoded_text<'a>(
    ty: &ScalarType,
    value: &'a Scalar,
    config: &CodecConfig,
) -> Result<Cow<'a, [u8]>> {
    let text = text_of(value)?;
    match TextEncoding::resolve(ty.text_encoding(), config.default_encoding)? {
        TextEncoding::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
        other => other.encode(text).map(Cow::Owned),
    }
}

fn write_payload<B: BufMut>(buf: &mut B, ty: &ScalarType, payload: &[u8]) -> Result<()> {
    let form = ty
        .tag
        .length_form()
        .ok_or_else(|| FlatcableError::mismatch("string or bytes tag", ty.tag.name()))?;
    put_length(buf, form, payload.len())?;
    buf.put_slice(payload);
    Ok(())
}

/// Write one scalar to a buffer according to its type
pub fn write_scalar<B: BufMut>(
    buf: &mut B,
    ty: &ScalarType,
    value: &Scalar,
    config: &CodecConfig,
) -> Result<()> {
    match ty.tag.kind() {
        ScalarKind::Number => put_number(buf, ty.tag, value),
        ScalarKind::Text => {
            let payload = encoded_text(ty, value, config)?;
            write_payload(buf, ty, &payload)
        }
        ScalarKind::Binary => {
            let bytes = value
                .as_bytes()
                .ok_or_else(|| FlatcableError::mismatch("bytes", value.type_name()))?;
            write_payload(buf, ty, bytes)
        }
    }
}

/// Write a vector: count, then each element in order. `None` writes an empty vector.
pub fn write_vec<B: BufMut>(
    buf: &mut B,
    ty: &ScalarType,
    items: Option<&[Scalar]>,
    config: &CodecConfig,
) -> Result<()> {
    let items = items.unwrap_or_default();
    put_length(buf, LengthForm::Long, items.len())?;
    for item in items {
        write_scalar(buf, ty, item, config)?;
    }
    Ok(())
}

/// Write a set: count, then members in ascending order
pub fn write_set<'a, B, I>(buf: &mut B, ty: &ScalarType, members: I, config: &CodecConfig) -> Result<()>
where
    B: BufMut,
    I: IntoIterator<Item = &'a Scalar>,
{
    let mut sorted: Vec<&Scalar> = members.into_iter().collect();
    sorted.sort_unstable();
    put_length(buf, LengthForm::Long, sorted.len())?;
    for member in sorted {
        write_scalar(buf, ty, member, config)?;
    }
    Ok(())
}

/// Write a map: count, then key/value pairs in ascending key order
pub fn write_map<'a, B, I>(
    buf: &mut B,
    key_ty: &ScalarType,
    value_ty: &ScalarType,
    entries: I,
    config: &CodecConfig,
) -> Result<()>
where
    B: BufMut,
    I: IntoIterator<Item = (&'a Scalar, &'a Scalar)>,
{
    let mut sorted: Vec<(&Scalar, &Scalar)> = entries.into_iter().collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
    put_length(buf, LengthForm::Long, sorted.len())?;
    for (key, value) in sorted {
        write_scalar(buf, key_ty, key, config)?;
        write_scalar(buf, value_ty, value, config)?;
    }
    Ok(())
}

/// Write a value to a buffer according to the descriptor
fn write_value<B: BufMut>(
    buf: &mut B,
    descriptor: &Descriptor,
    value: &Value,
    config: &CodecConfig,
) -> Result<()> {
    match (descriptor, value) {
        (Descriptor::Scalar(ty), Value::Scalar(s)) => write_scalar(buf, ty, s, config),
        (Descriptor::Vec(ty), Value::Null) => write_vec(buf, ty, None, config),
        (Descriptor::Vec(ty), Value::Vec(items)) => write_vec(buf, ty, Some(items), config),
        (Descriptor::Set(ty), Value::Set(members)) => write_set(buf, ty, members, config),
        (Descriptor::Map(key_ty, value_ty), Value::Map(entries)) => {
            write_map(buf, key_ty, value_ty, entries, config)
        }
        (expected, actual) => Err(FlatcableError::mismatch(
            expected.to_string(),
            actual.type_name(),
        )),
    }
}

/// Encode a value into a fresh buffer
///
/// Type mismatches surface while sizing or writing into the buffer, never
/// after bytes have left it.
pub fn encode_value(descriptor: &Descriptor, value: &Value, config: &CodecConfig) -> Result<Bytes> {
    let size = calculate_value_size(descriptor, value, config)?;
    let mut buf = BytesMut::with_capacity(size);
    write_value(&mut buf, descriptor, value, config)?;
    debug_assert_eq!(buf.len(), size);
    Ok(buf.freeze())
}

/// Encode a value according to a textual descriptor
///
/// # Example
///
/// ```rust
/// use flatcable::encode_to_bytes;
///
/// let bytes = encode_to_bytes(&42u32.into(), "I").unwrap();
/// assert_eq!(&bytes[..], &[0x2a, 0, 0, 0]);
/// ```
pub fn encode_to_bytes(value: &Value, descriptor: &str) -> Result<Bytes> {
    let descriptor = Descriptor::parse(descriptor)?;
    encode_value(&descriptor, value, &CodecConfig::default())
}

/// Serialize a value according to the descriptor and write it to the writer
///
/// The whole value is encoded before anything is written, so an encoding
/// failure leaves the writer untouched. Returns the number of bytes written.
///
/// # Arguments
///
/// * `writer` - The writer to write to
/// * `value` - The value to serialize
/// * `descriptor` - The textual type descriptor
/// * `config` - Session settings
pub fn serialize<W: Write>(
    writer: &mut W,
    value: &Value,
    descriptor: &str,
    config: &CodecConfig,
) -> Result<usize> {
    let parsed = Descriptor::parse(descriptor)?;
    let buf = encode_value(&parsed, value, config)?;
    writer.write_all(&buf)?;
    tracing::trace!(descriptor, bytes = buf.len(), "wrote value");
    Ok(buf.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn encode(value: Value, descriptor: &str) -> Vec<u8> {
        encode_to_bytes(&value, descriptor).unwrap().to_vec()
    }

    #[test]
    fn test_serialize_u32() {
        let mut buffer = Vec::new();
        let n = serialize(&mut buffer, &Value::from(42u32), "I", &CodecConfig::default()).unwrap();
        assert_eq!(n, 4);
        assert_eq!(buffer, vec![0x2a, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_serialize_short_string() {
        assert_eq!(encode(Value::from("ab"), "sstr"), vec![0x02, b'a', b'b']);
    }

    #[test]
    fn test_serialize_long_string() {
        let bytes = encode(Value::from("hello"), "str");
        assert_eq!(bytes.len(), 8 + 5);
        assert_eq!(&bytes[..8], &5u64.to_le_bytes());
        assert_eq!(&bytes[8..], b"hello");
    }

    #[test]
    fn test_string_hint_changes_payload() {
        assert_eq!(encode(Value::from("ä"), "sstr/latin-1"), vec![0x01, 0xe4]);
        assert_eq!(encode(Value::from("ä"), "sstr"), vec![0x02, 0xc3, 0xa4]);
    }

    #[test]
    fn test_default_encoding_from_config() {
        let config = CodecConfig::default().with_default_encoding(TextEncoding::Latin1);
        let mut buffer = Vec::new();
        serialize(&mut buffer, &Value::from("ä"), "sstr", &config).unwrap();
        assert_eq!(buffer, vec![0x01, 0xe4]);
    }

    #[test]
    fn test_short_form_boundary() {
        let ok = "x".repeat(255);
        assert_eq!(encode(Value::from(ok.as_str()), "sstr").len(), 256);
        let too_long = "x".repeat(256);
        assert!(matches!(
            encode_to_bytes(&Value::from(too_long.as_str()), "sstr"),
            Err(FlatcableError::LengthOverflow { len: 256, max: 255 })
        ));
        assert!(matches!(
            encode_to_bytes(&Value::from(vec![0u8; 256]), "sbyt"),
            Err(FlatcableError::LengthOverflow { .. })
        ));
    }

    #[test]
    fn test_short_form_counts_encoded_bytes() {
        // 128 two-byte characters are 256 bytes in UTF-8 but 128 in latin-1
        let text = "ä".repeat(128);
        assert!(encode_to_bytes(&Value::from(text.as_str()), "sstr").is_err());
        assert!(encode_to_bytes(&Value::from(text.as_str()), "sstr/latin-1").is_ok());
    }

    #[test]
    fn test_sized_text_matches_output() {
        let config = CodecConfig::default();
        let cases = [
            ("vec:str", Value::vec(["räksmörgås", "a🌍", ""])),
            ("vec:str/latin-1", Value::vec(["räksmörgås", "ab", ""])),
            ("vec:sstr/utf-16-le", Value::vec(["räksmörgås", "a🌍", ""])),
        ];
        for (descriptor, value) in cases {
            let parsed = Descriptor::parse(descriptor).unwrap();
            let size = calculate_value_size(&parsed, &value, &config).unwrap();
            let bytes = encode_value(&parsed, &value, &config).unwrap();
            assert_eq!(bytes.len(), size, "{}", descriptor);
        }
        // 13 code units of 2 bytes, three 1-byte prefixes
        let bytes = encode(Value::vec(["räksmörgås", "a🌍", ""]), "vec:sstr/utf-16-le");
        assert_eq!(bytes.len(), 8 + 3 + 2 * (10 + 3));
    }

    #[test]
    fn test_out_of_range_char_fails_at_write() {
        let mut buffer = Vec::new();
        let value = Value::vec(["fine", "🌍"]);
        let err = serialize(&mut buffer, &value, "vec:sstr/latin-1", &CodecConfig::default())
            .unwrap_err();
        assert!(matches!(err, FlatcableError::Encode { encoding: "latin-1", .. }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_null_vector_is_empty() {
        assert_eq!(encode(Value::Null, "vec:i"), vec![0u8; 8]);
    }

    #[test]
    fn test_set_is_sorted() {
        let bytes = encode(Value::set([3u8, 1, 2]), "set:B");
        assert_eq!(&bytes[8..], &[1, 2, 3]);
    }

    #[test]
    fn test_map_is_sorted_by_key() {
        let mut entries = HashMap::new();
        entries.insert(Scalar::from("b"), Scalar::from(2u8));
        entries.insert(Scalar::from("a"), Scalar::from(1u8));
        let bytes = encode(Value::Map(entries), "map:sstr:B");
        assert_eq!(&bytes[8..], &[1, b'a', 1, 1, b'b', 2]);
    }

    #[test]
    fn test_unsupported_type() {
        for value in [Value::from(1u8), Value::from("x"), Value::Null] {
            assert!(matches!(
                encode_to_bytes(&value, "q"),
                Err(FlatcableError::UnsupportedType(tag)) if tag == "q"
            ));
        }
    }

    #[test]
    fn test_mismatch_writes_nothing() {
        let mut buffer = Vec::new();
        let value = Value::vec([Scalar::from(1i32), Scalar::from("oops")]);
        let err = serialize(&mut buffer, &value, "vec:i", &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, FlatcableError::TypeMismatch { .. }));
        assert!(buffer.is_empty());

        let value = Value::map([("k", 1u8)]);
        let err = serialize(&mut buffer, &value, "map:sstr:I", &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, FlatcableError::TypeMismatch { .. }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_unknown_encoding_fails_at_use() {
        assert!(matches!(
            encode_to_bytes(&Value::from("x"), "str/klingon"),
            Err(FlatcableError::UnsupportedEncoding(_))
        ));
        // ignored on numbers and bytes
        assert!(encode_to_bytes(&Value::from(1i32), "i/klingon").is_ok());
        assert!(encode_to_bytes(&Value::from(vec![1u8]), "byt/klingon").is_ok());
    }
}
