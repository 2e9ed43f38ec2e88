//! HTTP response sink.
//!
//! A [`ResponseWriter`] is the write side of one exchange: the head (status and
//! headers) goes out exactly once, and the body may only follow it. [`ResponseSlot`]
//! is the in-memory writer the connection uses to collect a handler's output before
//! encoding it onto the wire.

use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};

use crate::protocol::SendError;

/// Type alias for HTTP response headers before a body is attached.
pub type ResponseHead = Response<()>;

/// The write side of a single HTTP exchange.
///
/// Callers must write the head before the body, and each at most once.
pub trait ResponseWriter {
    fn write_head(&mut self, status: StatusCode, headers: HeaderMap) -> Result<(), SendError>;

    fn write_body(&mut self, body: Bytes) -> Result<(), SendError>;
}

/// Collects one response in memory while enforcing the head-then-body order.
#[derive(Debug, Default)]
pub struct ResponseSlot {
    head: Option<ResponseHead>,
    body: Option<Bytes>,
}

impl ResponseSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the head has been written.
    pub fn is_committed(&self) -> bool {
        self.head.is_some()
    }

    /// Assembles the collected response, or `None` if no head was ever written.
    pub fn into_response(self) -> Option<Response<Bytes>> {
        let body = self.body.unwrap_or_default();
        self.head.map(|head| head.map(|()| body))
    }
}

impl ResponseWriter for ResponseSlot {
    fn write_head(&mut self, status: StatusCode, headers: HeaderMap) -> Result<(), SendError> {
        if self.head.is_some() {
            return Err(SendError::HeadAlreadyWritten);
        }

        let mut head = Response::new(());
        *head.status_mut() = status;
        *head.headers_mut() = headers;
        self.head = Some(head);
        Ok(())
    }

    fn write_body(&mut self, body: Bytes) -> Result<(), SendError> {
        if self.head.is_none() {
            return Err(SendError::BodyBeforeHead);
        }
        if self.body.is_some() {
            return Err(SendError::BodyAlreadyWritten);
        }

        self.body = Some(body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn head_then_body() {
        let mut slot = ResponseSlot::new();
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        slot.write_head(StatusCode::CREATED, headers).unwrap();
        slot.write_body(Bytes::from_static(b"created")).unwrap();
        assert!(slot.is_committed());

        let response = slot.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get(http::header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(response.body().as_ref(), b"created");
    }

    #[test]
    fn body_before_head_is_rejected() {
        let mut slot = ResponseSlot::new();
        let result = slot.write_body(Bytes::from_static(b"oops"));
        assert!(matches!(result, Err(SendError::BodyBeforeHead)));
        assert!(slot.into_response().is_none());
    }

    #[test]
    fn head_is_written_once() {
        let mut slot = ResponseSlot::new();
        slot.write_head(StatusCode::OK, HeaderMap::new()).unwrap();
        let result = slot.write_head(StatusCode::NOT_FOUND, HeaderMap::new());
        assert!(matches!(result, Err(SendError::HeadAlreadyWritten)));

        slot.write_body(Bytes::from_static(b"one")).unwrap();
        let result = slot.write_body(Bytes::from_static(b"two"));
        assert!(matches!(result, Err(SendError::BodyAlreadyWritten)));

        let response = slot.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_ref(), b"one");
    }

    #[test]
    fn head_without_body_is_empty() {
        let mut slot = ResponseSlot::new();
        slot.write_head(StatusCode::NO_CONTENT, HeaderMap::new()).unwrap();
        let response = slot.into_response().unwrap();
        assert!(response.body().is_empty());
    }
}
