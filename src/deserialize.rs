//! Deserialization functions

use crate::config::CodecConfig;
use crate::data_types::{LengthForm, ScalarKind};
use crate::encoding::TextEncoding;
use crate::error::{FlatcableError, Result};
use crate::fixed_int::{read_length, read_number};
use crate::read_context::ReadContext;
use crate::schema::{Descriptor, ScalarType};
use crate::value::{Scalar, Value};
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::io::Read;

/// Upper bound on up-front reservations, so a corrupt count cannot reserve
/// memory before the elements actually arrive.
const MAX_PREALLOC: usize = 1024;

fn read_payload<R: Read>(
    ctx: &mut ReadContext<R>,
    ty: &ScalarType,
    config: &CodecConfig,
) -> Result<Vec<u8>> {
    let form = ty
        .tag
        .length_form()
        .ok_or_else(|| FlatcableError::mismatch("string or bytes tag", ty.tag.name()))?;
    let len = read_length(ctx, form, config.max_payload_len)?;
    ctx.read_bytes(len)
}

/// Read one scalar according to its type
pub fn read_scalar<R: Read>(
    ctx: &mut ReadContext<R>,
    ty: &ScalarType,
    config: &CodecConfig,
) -> Result<Scalar> {
    match ty.tag.kind() {
        ScalarKind::Number => read_number(ctx, ty.tag),
        ScalarKind::Text => {
            let payload = read_payload(ctx, ty, config)?;
            let encoding = TextEncoding::resolve(ty.text_encoding(), config.default_encoding)?;
            let text = match encoding {
                TextEncoding::Utf8 => String::from_utf8(payload).map_err(|e| {
                    FlatcableError::Decode {
                        encoding: encoding.label(),
                        message: e.to_string(),
                    }
                })?,
                other => other.decode(&payload)?,
            };
            Ok(Scalar::Str(text))
        }
        ScalarKind::Binary => Ok(Scalar::Bytes(Bytes::from(read_payload(ctx, ty, config)?))),
    }
}

fn read_count<R: Read>(ctx: &mut ReadContext<R>, config: &CodecConfig) -> Result<usize> {
    read_length(ctx, LengthForm::Long, config.max_payload_len)
}

/// Read a vector, keeping element order
pub fn read_vec<R: Read>(
    ctx: &mut ReadContext<R>,
    ty: &ScalarType,
    config: &CodecConfig,
) -> Result<Vec<Scalar>> {
    let len = read_count(ctx, config)?;
    let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
    for _ in 0..len {
        items.push(read_scalar(ctx, ty, config)?);
    }
    Ok(items)
}

/// Read a set; repeated members collapse into one
pub fn read_set<R: Read>(
    ctx: &mut ReadContext<R>,
    ty: &ScalarType,
    config: &CodecConfig,
) -> Result<HashSet<Scalar>> {
    let len = read_count(ctx, config)?;
    let mut members = HashSet::with_capacity(len.min(MAX_PREALLOC));
    for _ in 0..len {
        members.insert(read_scalar(ctx, ty, config)?);
    }
    if members.len() < len {
        tracing::debug!(
            declared = len,
            distinct = members.len(),
            "set contained repeated members"
        );
    }
    Ok(members)
}

/// Read a map, rejecting repeated keys
pub fn read_map<R: Read>(
    ctx: &mut ReadContext<R>,
    key_ty: &ScalarType,
    value_ty: &ScalarType,
    config: &CodecConfig,
) -> Result<HashMap<Scalar, Scalar>> {
    let len = read_count(ctx, config)?;
    let mut entries = HashMap::with_capacity(len.min(MAX_PREALLOC));
    for _ in 0..len {
        let key = read_scalar(ctx, key_ty, config)?;
        let value = read_scalar(ctx, value_ty, config)?;
        if entries.contains_key(&key) {
            return Err(FlatcableError::DuplicateKey(key.to_string()));
        }
        entries.insert(key, value);
    }
    Ok(entries)
}

/// Read a value according to the descriptor
pub fn read_value<R: Read>(
    ctx: &mut ReadContext<R>,
    descriptor: &Descriptor,
    config: &CodecConfig,
) -> Result<Value> {
    match descriptor {
        Descriptor::Scalar(ty) => read_scalar(ctx, ty, config).map(Value::Scalar),
        Descriptor::Vec(ty) => read_vec(ctx, ty, config).map(Value::Vec),
        Descriptor::Set(ty) => read_set(ctx, ty, config).map(Value::Set),
        Descriptor::Map(key_ty, value_ty) => read_map(ctx, key_ty, value_ty, config).map(Value::Map),
    }
}

/// Deserialize one value from a reader
///
/// The reader must be positioned at a value written with the same
/// descriptor; nothing on the wire identifies the type.
///
/// # Example
///
/// ```rust
/// use flatcable::{deserialize, CodecConfig, Value};
///
/// let data = [0x02, b'a', b'b'];
/// let value = deserialize(&mut &data[..], "sstr", &CodecConfig::default()).unwrap();
/// assert_eq!(value, Value::from("ab"));
/// ```
pub fn deserialize<R: Read>(reader: R, descriptor: &str, config: &CodecConfig) -> Result<Value> {
    let parsed = Descriptor::parse(descriptor)?;
    let mut ctx = ReadContext::new(reader);
    let value = read_value(&mut ctx, &parsed, config)?;
    tracing::trace!(descriptor, bytes = ctx.consumed(), "read value");
    Ok(value)
}

/// Decode a single value from an in-memory buffer
pub fn decode_from_bytes(data: &[u8], descriptor: &str) -> Result<Value> {
    deserialize(data, descriptor, &CodecConfig::default())
}
