use std::error::Error;
use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use http::header::CONNECTION;
use http::{HeaderValue, Request, Response, StatusCode, Version};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::HttpError;

/// An HTTP/1.1 connection serving requests one after another.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_decoder(reader, writer, RequestDecoder::new())
    }

    pub fn with_decoder(reader: R, writer: W, decoder: RequestDecoder) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(request)) => {
                    let keep_alive = is_keep_alive(&request);
                    self.do_process(request, handler.as_ref(), keep_alive).await?;
                    if !keep_alive {
                        debug!("connection close requested, break this connection down");
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!(cause = %e, "can't receive next request");
                    let error_response = build_error_response(StatusCode::BAD_REQUEST);
                    self.framed_write.send(error_response).await?;
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }

    async fn do_process<H>(&mut self, request: Request<Bytes>, handler: &H, keep_alive: bool) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let mut response = match handler.call(request).await {
            Ok(response) => response,
            Err(e) => {
                let e: Box<dyn Error + Send + Sync> = e.into();
                error!(cause = %e, "handle response error");
                build_error_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        if !keep_alive {
            response.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
        }

        self.framed_write.send(response).await?;
        Ok(())
    }
}

/// HTTP/1.1 keeps the connection unless told otherwise, HTTP/1.0 closes it unless told otherwise.
fn is_keep_alive<T>(request: &Request<T>) -> bool {
    let connection = request.headers().get(CONNECTION).map(HeaderValue::as_bytes);
    match request.version() {
        Version::HTTP_11 => !connection.is_some_and(|value| value.eq_ignore_ascii_case(b"close")),
        _ => connection.is_some_and(|value| value.eq_ignore_ascii_case(b"keep-alive")),
    }
}

fn build_error_response(status_code: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = status_code;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use std::convert::Infallible;
    use std::io;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn echo(request: Request<Bytes>) -> Result<Response<Bytes>, Infallible> {
        let body = format!("{} {} {}", request.method(), request.uri().path(), request.body().len());
        Ok(Response::new(Bytes::from(body)))
    }

    async fn failing(_request: Request<Bytes>) -> Result<Response<Bytes>, io::Error> {
        Err(io::Error::other("boom"))
    }

    async fn exchange<H>(handler: H, raw_request: &'static [u8]) -> (String, Result<(), HttpError>)
    where
        H: Handler + 'static,
    {
        let (mut client, server) = tokio::io::duplex(4096);
        let (reader, writer) = tokio::io::split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(Arc::new(handler)));

        client.write_all(raw_request).await.unwrap();
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();

        (String::from_utf8(response).unwrap(), task.await.unwrap())
    }

    #[tokio::test]
    async fn round_trip_with_connection_close() {
        let (response, result) = exchange(
            make_handler(echo),
            b"POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("connection: close\r\n"));
        assert!(response.contains("content-length: 12\r\n"));
        assert!(response.ends_with("\r\n\r\nPOST /echo 5"));
    }

    #[tokio::test]
    async fn http10_closes_by_default() {
        let (response, result) = exchange(make_handler(echo), b"GET / HTTP/1.0\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.ends_with("\r\n\r\nGET / 0"));
    }

    #[tokio::test]
    async fn bad_request_closes_connection() {
        let (response, result) = exchange(make_handler(echo), b"GARBAGE\r\n\r\n").await;

        assert!(matches!(result, Err(HttpError::RequestError { .. })));
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn handler_error_becomes_500() {
        let (response, result) =
            exchange(make_handler(failing), b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn keep_alive_rules() {
        let http11 = Request::builder().body(()).unwrap();
        assert!(is_keep_alive(&http11));

        let http11_close = Request::builder().header(CONNECTION, "Close").body(()).unwrap();
        assert!(!is_keep_alive(&http11_close));

        let http10 = Request::builder().version(Version::HTTP_10).body(()).unwrap();
        assert!(!is_keep_alive(&http10));

        let http10_keep = Request::builder().version(Version::HTTP_10).header(CONNECTION, "keep-alive").body(()).unwrap();
        assert!(is_keep_alive(&http10_keep));
    }
}
