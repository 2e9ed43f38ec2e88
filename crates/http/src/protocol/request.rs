//! HTTP request header handling.
//!
//! [`RequestHeader`] wraps an `http::Request<()>` so the decoder can hand out the
//! head of a request before its body has been read.

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

/// The head of an HTTP request: method, uri, version and headers.
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
}

impl AsRef<Request<()>> for RequestHeader {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl AsMut<Request<()>> for RequestHeader {
    fn as_mut(&mut self) -> &mut Request<()> {
        &mut self.inner
    }
}

impl RequestHeader {
    /// Consumes the header and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Attaches a body to this header, converting it into a full `Request<T>`.
    pub fn body<T>(self, body: T) -> Request<T> {
        self.inner.map(|()| body)
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }
}

impl From<Parts> for RequestHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_and_body() {
        let header: RequestHeader = Request::builder()
            .method(Method::POST)
            .uri("/user?name=ann")
            .header(http::header::HOST, "localhost")
            .body(())
            .unwrap()
            .into();

        assert_eq!(header.method(), Method::POST);
        assert_eq!(header.uri().path(), "/user");
        assert_eq!(header.uri().query(), Some("name=ann"));
        assert_eq!(header.version(), Version::HTTP_11);
        assert_eq!(header.headers().get(http::header::HOST).unwrap(), "localhost");

        let request = header.body("payload");
        assert_eq!(*request.body(), "payload");
    }
}
