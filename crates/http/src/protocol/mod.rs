//! Core HTTP protocol types shared by the codec and the connection layer.
//!
//! - [`RequestHeader`]: the head of a decoded request
//! - [`ResponseWriter`] / [`ResponseSlot`]: the write-once response sink
//! - [`HttpError`], [`ParseError`], [`SendError`]: transport errors
//!
//! Request bodies are read in full before a request is handed to a handler, so
//! a decoded request is simply an `http::Request<Bytes>`.

mod request;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHead;
pub use response::ResponseSlot;
pub use response::ResponseWriter;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
