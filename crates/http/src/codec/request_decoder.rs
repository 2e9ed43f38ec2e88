//! HTTP request decoder
//!
//! Decodes one complete request at a time: the head through [`HeaderDecoder`], then the
//! body through [`LengthDecoder`] when the head announced one.

use bytes::{Bytes, BytesMut};
use http::Request;
use tokio_util::codec::Decoder;

use crate::codec::header_decoder::{DEFAULT_MAX_BODY_BYTES, HeaderDecoder, PayloadSize};
use crate::codec::length_decoder::LengthDecoder;
use crate::protocol::{ParseError, RequestHeader};

/// A decoder yielding fully buffered `Request<Bytes>` values.
///
/// The decoder keeps the parsed head in `pending` while the body is still arriving:
/// - `None`: currently parsing a head
/// - `Some(_)`: head parsed, waiting for the rest of the body
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    pending: Option<(RequestHeader, LengthDecoder)>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder that rejects bodies larger than `max_body_bytes`.
    pub fn with_max_body(max_body_bytes: u64) -> Self {
        Self { header_decoder: HeaderDecoder::new(max_body_bytes), pending: None }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_max_body(DEFAULT_MAX_BODY_BYTES)
    }
}

impl Decoder for RequestDecoder {
    type Item = Request<Bytes>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.pending.is_none() {
            match self.header_decoder.decode(src)? {
                Some((header, PayloadSize::Empty)) => return Ok(Some(header.body(Bytes::new()))),
                Some((header, PayloadSize::Length(length))) => {
                    self.pending = Some((header, LengthDecoder::new(length)?));
                }
                None => return Ok(None),
            }
        }

        match self.pending.take() {
            Some((header, mut body_decoder)) => match body_decoder.decode(src)? {
                Some(body) => Ok(Some(header.body(body))),
                None => {
                    self.pending = Some((header, body_decoder));
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}
