//! HTTP connection handling module
//!
//! [`HttpConnection`] drives one keep-alive connection: it decodes buffered requests,
//! hands each one to a [`Handler`](crate::handler::Handler), and encodes the response.

mod http_connection;

pub use http_connection::HttpConnection;
