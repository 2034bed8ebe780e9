//! Protocol encoding/decoding traits and helpers.
//!
//! Packets that only travel server → client implement [`ProtoEncode`] alone and
//! packets that only travel client → server implement [`ProtoDecode`] alone, so
//! using a packet in the wrong direction is rejected by the compiler.

use bytes::{Buf, BufMut, Bytes};

use crate::error::ProtoError;
use crate::types::VarUInt32;

/// Longest string (in UTF-16 units, approximated by chars) the protocol allows.
pub const MAX_STRING_LENGTH: usize = 32_767;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

/// Fail with `BufferTooShort` unless `needed` bytes remain.
pub fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        return Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Write a protocol string (VarInt byte length + UTF-8).
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    VarUInt32(s.len() as u32).proto_encode(buf);
    buf.put_slice(s.as_bytes());
}

/// Read a protocol string (VarInt byte length + UTF-8).
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtoError> {
    read_bounded_string(buf, MAX_STRING_LENGTH)
}

/// Read a string whose character count may not exceed `max_chars`.
pub fn read_bounded_string(buf: &mut impl Buf, max_chars: usize) -> Result<String, ProtoError> {
    let len = VarUInt32::proto_decode(buf)?.0 as usize;
    // UTF-8 needs at most 4 bytes per char.
    if len > max_chars * 4 {
        return Err(ProtoError::StringTooLong {
            length: len,
            max: max_chars,
        });
    }
    ensure_remaining(buf, len)?;
    let data = buf.copy_to_bytes(len);
    let s = String::from_utf8(data.to_vec()).map_err(|_| ProtoError::InvalidUtf8)?;
    let chars = s.chars().count();
    if chars > max_chars {
        return Err(ProtoError::StringTooLong {
            length: chars,
            max: max_chars,
        });
    }
    Ok(s)
}

/// Write a VarInt-prefixed byte array.
pub fn write_byte_array(buf: &mut impl BufMut, data: &[u8]) {
    VarUInt32(data.len() as u32).proto_encode(buf);
    buf.put_slice(data);
}

/// Read a protocol boolean (one byte, non-zero is true).
pub fn read_bool(buf: &mut impl Buf) -> Result<bool, ProtoError> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8() != 0)
}

/// Take whatever is left in the packet body.
pub fn read_remaining(buf: &mut impl Buf) -> Bytes {
    buf.copy_to_bytes(buf.remaining())
}
