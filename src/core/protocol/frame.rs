// src/core/protocol/frame.rs

//! Implements the length-prefixed text frame format and the corresponding
//! `Encoder` and `Decoder` for network communication.
//!
//! Every message, in both directions, is a 2-byte big-endian unsigned payload
//! length followed by exactly that many bytes of UTF-8 text. A write of a
//! payload of length `L` emits exactly `2 + L` bytes on the wire.

use crate::core::FencelineError;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The fixed size of the length header, in bytes.
pub const FRAME_HEADER_LEN: usize = 2;

/// The largest payload a frame can carry, bounded by the u16 length header.
pub const MAX_FRAME_PAYLOAD: usize = u16::MAX as usize;

/// A `tokio_util::codec` implementation for the framed text protocol.
#[derive(Debug, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// A convenience method to encode a payload into a `Vec<u8>`.
    /// Useful for tests and client tooling that need a complete byte vector.
    pub fn encode_to_vec(payload: &str) -> Result<Vec<u8>, FencelineError> {
        let mut buf = BytesMut::new();
        FrameCodec.encode(payload.to_string(), &mut buf)?;
        Ok(buf.to_vec())
    }
}

impl Encoder<String> for FrameCodec {
    type Error = FencelineError;

    /// Encodes one payload as a length header followed by its UTF-8 bytes.
    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let payload = item.as_bytes();
        if payload.len() > MAX_FRAME_PAYLOAD {
            return Err(FencelineError::FrameTooLarge(payload.len()));
        }
        dst.reserve(FRAME_HEADER_LEN + payload.len());
        dst.put_u16(payload.len() as u16);
        dst.extend_from_slice(payload);
        Ok(())
    }
}

impl Decoder for FrameCodec {
    type Item = String;
    type Error = FencelineError;

    /// Decodes one complete frame, or returns `Ok(None)` to signal that more
    /// bytes are needed. The buffer is only consumed once the whole frame
    /// (header plus payload) is present.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < FRAME_HEADER_LEN {
            return Ok(None);
        }

        let payload_len = u16::from_be_bytes([src[0], src[1]]) as usize;
        if src.len() < FRAME_HEADER_LEN + payload_len {
            src.reserve(FRAME_HEADER_LEN + payload_len - src.len());
            return Ok(None);
        }

        src.advance(FRAME_HEADER_LEN);
        let payload = src.split_to(payload_len);
        let text = std::str::from_utf8(&payload)
            .map_err(|_| FencelineError::InvalidFrameEncoding)?
            .to_string();
        Ok(Some(text))
    }

    /// Distinguishes a clean close (empty buffer at EOF) from a peer that
    /// vanished in the middle of a frame.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FencelineError::TruncatedFrame),
        }
    }
}
