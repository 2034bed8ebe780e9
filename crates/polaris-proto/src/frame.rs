//! Length-prefixed framing.
//!
//! A frame is `VarInt(len) ++ body`. The decoder peeks at most three header
//! bytes and only commits (advances the buffer) once the whole body has
//! arrived, so it can be re-entered every time the transport delivers more
//! bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::ProtoEncode;
use crate::error::ProtoError;
use crate::types::VarUInt32;

/// Widest length header accepted on the wire.
pub const MAX_HEADER_BYTES: usize = 3;

/// Largest body a three-byte header can describe (2^21 - 1).
pub const MAX_FRAME_LENGTH: usize = (1 << (7 * MAX_HEADER_BYTES)) - 1;

/// Frame codec for `tokio_util::codec::{FramedRead, FramedWrite}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec;

/// Result of looking at the head of the input without consuming it.
enum Header {
    /// Not enough bytes to know the length yet.
    Incomplete,
    Complete { header_len: usize, body_len: usize },
}

fn peek_header(src: &[u8]) -> Result<Header, ProtoError> {
    let mut length: usize = 0;
    for i in 0..MAX_HEADER_BYTES {
        let Some(&byte) = src.get(i) else {
            return Ok(Header::Incomplete);
        };
        length |= ((byte & 0x7F) as usize) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Header::Complete {
                header_len: i + 1,
                body_len: length,
            });
        }
    }
    Err(ProtoError::CorruptedFrame)
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = ProtoError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let (header_len, body_len) = match peek_header(src)? {
            Header::Incomplete => return Ok(None),
            Header::Complete {
                header_len,
                body_len,
            } => (header_len, body_len),
        };

        let total = header_len + body_len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(header_len);
        Ok(Some(src.split_to(body_len)))
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = ProtoError;

    fn encode(&mut self, body: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        write_frame(&body, dst)
    }
}

/// Append `body` to `dst` as one frame.
pub fn write_frame(body: &[u8], dst: &mut BytesMut) -> Result<(), ProtoError> {
    if body.len() > MAX_FRAME_LENGTH {
        return Err(ProtoError::FrameTooLarge {
            length: body.len(),
            max: MAX_FRAME_LENGTH,
        });
    }
    dst.reserve(VarUInt32::encoded_len(body.len() as u32) + body.len());
    VarUInt32(body.len() as u32).proto_encode(dst);
    dst.put_slice(body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(body: &[u8]) -> BytesMut {
        let mut out = BytesMut::new();
        write_frame(body, &mut out).unwrap();
        out
    }

    #[test]
    fn complete_frame_is_emitted() {
        let mut src = framed(b"hello");
        let frame = FrameCodec.decode(&mut src).unwrap().unwrap();
        assert_eq!(&frame[..], b"hello");
        assert!(src.is_empty());
    }

    #[test]
    fn byte_at_a_time_never_yields_partial_frame() {
        let body: Vec<u8> = (0..300u32).map(|i| i as u8).collect();
        let wire = framed(&body);
        assert_eq!(wire.len(), 302); // two-byte header

        let mut src = BytesMut::new();
        let mut emitted = Vec::new();
        for (i, byte) in wire.iter().enumerate() {
            src.put_u8(*byte);
            if let Some(frame) = FrameCodec.decode(&mut src).unwrap() {
                emitted.push((i, frame));
            }
        }
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, wire.len() - 1);
        assert_eq!(&emitted[0].1[..], &body[..]);
    }

    #[test]
    fn partial_input_is_left_untouched() {
        let wire = framed(b"abcdef");
        let mut src = BytesMut::from(&wire[..4]);
        assert!(FrameCodec.decode(&mut src).unwrap().is_none());
        assert_eq!(&src[..], &wire[..4]);
    }

    #[test]
    fn back_to_back_frames() {
        let mut src = framed(b"one");
        src.extend_from_slice(&framed(b""));
        src.extend_from_slice(&framed(b"three"));
        assert_eq!(&FrameCodec.decode(&mut src).unwrap().unwrap()[..], b"one");
        assert!(FrameCodec.decode(&mut src).unwrap().unwrap().is_empty());
        assert_eq!(&FrameCodec.decode(&mut src).unwrap().unwrap()[..], b"three");
        assert!(FrameCodec.decode(&mut src).unwrap().is_none());
    }

    #[test]
    fn four_byte_header_is_corrupted() {
        let mut src = BytesMut::from(&[0x80u8, 0x80, 0x80, 0x01][..]);
        assert!(matches!(
            FrameCodec.decode(&mut src),
            Err(ProtoError::CorruptedFrame)
        ));
    }

    #[test]
    fn three_byte_header_waits_for_body() {
        // 2^21 - 1 declared, nothing supplied yet.
        let mut src = BytesMut::from(&[0xFFu8, 0xFF, 0x7F][..]);
        assert!(FrameCodec.decode(&mut src).unwrap().is_none());
        assert_eq!(src.len(), 3);
    }

    #[test]
    fn oversize_body_is_rejected_on_encode() {
        let body = Bytes::from(vec![0u8; MAX_FRAME_LENGTH + 1]);
        let mut dst = BytesMut::new();
        assert!(matches!(
            FrameCodec.encode(body, &mut dst),
            Err(ProtoError::FrameTooLarge { .. })
        ));
        assert!(dst.is_empty());
    }
}
