//! Decoder for request bodies framed by a `Content-Length` header.
//!
//! See [RFC 9112 Section 6.2](https://www.rfc-editor.org/rfc/rfc9112.html#name-content-length).
//! The whole body is buffered before it is handed out; streaming bodies are not supported.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;

use crate::protocol::ParseError;

/// Waits until `length` bytes are buffered, then yields them as one `Bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    length: usize,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Result<Self, ParseError> {
        let length = usize::try_from(length).map_err(|_e| ParseError::too_large_body(length, usize::MAX as u64))?;
        Ok(Self { length })
    }
}

impl Decoder for LengthDecoder {
    type Item = Bytes;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < self.length {
            src.reserve(self.length - src.len());
            return Ok(None);
        }

        Ok(Some(src.split_to(self.length).freeze()))
    }
}
