//! A small buffered HTTP/1.1 transport built on tokio
//!
//! This crate is the raw transport underneath `mini-web`: it reads a request off a
//! connection, buffers its body, hands an `http::Request<Bytes>` to a handler and
//! writes the returned `http::Response<Bytes>` back with a `Content-Length`.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Request, Response};
//! use mini_http::connection::HttpConnection;
//! use mini_http::handler::make_handler;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             if let Err(e) = HttpConnection::new(reader, writer).process(handler).await {
//!                 error!(cause = %e, "connection shutdown with error");
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request<Bytes>) -> Result<Response<Bytes>, Infallible> {
//!     info!(path = request.uri().path(), body_size = request.body().len(), "receive request");
//!     Ok(Response::new(Bytes::from_static(b"Hello World!\r\n")))
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: the per-connection request/response loop
//! - [`protocol`]: request head, response sink and error types
//! - [`codec`]: `tokio-util` codecs for requests and responses
//! - [`handler`]: the async handler trait
//!
//! # Limitations
//!
//! - HTTP/1.x only, no TLS
//! - Request bodies must use `Content-Length`; `Transfer-Encoding` is rejected
//! - Maximum header size: 8KB, maximum number of headers: 64
//! - Bodies are buffered in memory (4MB by default)

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
