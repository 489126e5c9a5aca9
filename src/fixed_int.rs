//! Fixed-width integer encoding and decoding
//!
//! Numbers and length prefixes use the width from the tag table, little-endian.

use crate::data_types::{LengthForm, ScalarTag};
use crate::error::{FlatcableError, Result};
use crate::read_context::ReadContext;
use crate::value::Scalar;
use bytes::BufMut;
use std::io::Read;

/// Calculate the size needed to encode a number with this tag
pub fn get_number_size(tag: ScalarTag) -> Result<usize> {
    tag.width().ok_or_else(|| FlatcableError::mismatch("number tag", tag.name()))
}

/// Append a number to a buffer
pub fn put_number<B: BufMut>(buf: &mut B, tag: ScalarTag, value: &Scalar) -> Result<()> {
    match (tag, value) {
        (ScalarTag::I8, Scalar::I8(n)) => buf.put_i8(*n),
        (ScalarTag::U8, Scalar::U8(n)) => buf.put_u8(*n),
        (ScalarTag::I32, Scalar::I32(n)) => buf.put_i32_le(*n),
        (ScalarTag::U32, Scalar::U32(n)) => buf.put_u32_le(*n),
        (ScalarTag::I64, Scalar::I64(n)) => buf.put_i64_le(*n),
        (ScalarTag::U64, Scalar::U64(n)) => buf.put_u64_le(*n),
        (tag, value) => {
            return Err(FlatcableError::mismatch(
                format!("{} value", tag),
                value.type_name(),
            ))
        }
    }
    Ok(())
}

/// Read a number from a read context
pub fn read_number<R: Read>(ctx: &mut ReadContext<R>, tag: ScalarTag) -> Result<Scalar> {
    Ok(match tag {
        ScalarTag::I8 => Scalar::I8(i8::from_le_bytes(ctx.read_array()?)),
        ScalarTag::U8 => Scalar::U8(ctx.read_byte()?),
        ScalarTag::I32 => Scalar::I32(i32::from_le_bytes(ctx.read_array()?)),
        ScalarTag::U32 => Scalar::U32(u32::from_le_bytes(ctx.read_array()?)),
        ScalarTag::I64 => Scalar::I64(i64::from_le_bytes(ctx.read_array()?)),
        ScalarTag::U64 => Scalar::U64(u64::from_le_bytes(ctx.read_array()?)),
        other => return Err(FlatcableError::mismatch("number tag", other.name())),
    })
}

/// Append a length prefix, refusing lengths the form cannot carry
pub fn put_length<B: BufMut>(buf: &mut B, form: LengthForm, len: usize) -> Result<()> {
    let len = len as u64;
    if len > form.max_len() {
        return Err(FlatcableError::LengthOverflow {
            len,
            max: form.max_len(),
        });
    }
    match form {
        LengthForm::Short => buf.put_u8(len as u8),
        LengthForm::Long => buf.put_u64_le(len),
    }
    Ok(())
}

/// Read a length prefix and check it against the decode guard
pub fn read_length<R: Read>(
    ctx: &mut ReadContext<R>,
    form: LengthForm,
    max_payload_len: u64,
) -> Result<usize> {
    let len = match form {
        LengthForm::Short => u64::from(ctx.read_byte()?),
        LengthForm::Long => u64::from_le_bytes(ctx.read_array()?),
    };
    if len > max_payload_len {
        return Err(FlatcableError::LengthOverflow {
            len,
            max: max_payload_len,
        });
    }
    usize::try_from(len).map_err(|_| FlatcableError::LengthOverflow {
        len,
        max: usize::MAX as u64,
    })
}
