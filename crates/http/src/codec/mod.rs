//! HTTP codec module for encoding and decoding HTTP messages
//!
//! The codecs plug into `tokio_util::codec::{FramedRead, FramedWrite}`:
//!
//! - [`RequestDecoder`]: decodes a request head with `httparse`, then waits until the
//!   whole `Content-Length` body is buffered and yields an `http::Request<Bytes>`
//! - [`ResponseEncoder`]: encodes an `http::Response<Bytes>` with a `Content-Length` header
//!
//! # Example
//!
//! ```no_run
//! use mini_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n"[..]);
//! let request = decoder.decode(&mut buffer);
//! ```

mod header_decoder;
mod length_decoder;
mod request_decoder;
mod response_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::PayloadSize;
pub use length_decoder::LengthDecoder;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
