//! The per-request context handed through the middleware chain.
//!
//! A [`RequestContext`] has two halves:
//!
//! - the request side: head, buffered body, and lazily parsed query and form values
//! - the response side: status, headers and body, buffered until the dispatcher
//!   flushes them after the whole chain has returned
//!
//! Handlers and middleware never write to the transport; they only mutate the
//! buffered response, so outer middleware can still inspect or rewrite it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use cookie::Cookie;
use http::header::{CONTENT_TYPE, HOST, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, Version};
use mime::Mime;
use mini_http::protocol::RequestHeader;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{BindError, ValueError};
use crate::query::{QueryParser, QueryValues, UrlEncodedQueryParser, append_pairs, parse_urlencoded};
use crate::value::StringValue;

/// One request's input accessors and buffered output.
pub struct RequestContext {
    request_header: RequestHeader,
    body: Option<Bytes>,
    path_params: HashMap<String, String>,
    matched_route: String,

    query_parser: Arc<dyn QueryParser>,
    query_cache: OnceCell<QueryValues>,
    form_cache: Option<Result<QueryValues, ValueError>>,

    resp_status_code: StatusCode,
    resp_headers: HeaderMap,
    resp_body: Bytes,
}

impl RequestContext {
    /// Creates a context that parses queries with [`UrlEncodedQueryParser`].
    pub fn new(request: Request<Bytes>) -> Self {
        Self::with_query_parser(request, Arc::new(UrlEncodedQueryParser))
    }

    pub fn with_query_parser(request: Request<Bytes>, query_parser: Arc<dyn QueryParser>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            request_header: RequestHeader::from(parts),
            body: Some(body),
            path_params: HashMap::new(),
            matched_route: String::new(),
            query_parser,
            query_cache: OnceCell::new(),
            form_cache: None,
            resp_status_code: StatusCode::OK,
            resp_headers: HeaderMap::new(),
            resp_body: Bytes::new(),
        }
    }

    pub fn request_header(&self) -> &RequestHeader {
        &self.request_header
    }

    pub fn method(&self) -> &Method {
        self.request_header.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request_header.uri()
    }

    pub fn path(&self) -> &str {
        self.uri().path()
    }

    pub fn version(&self) -> Version {
        self.request_header.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request_header.headers()
    }

    /// The requested host, from the `Host` header or else the uri authority.
    pub fn host(&self) -> Option<&str> {
        self.headers()
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| self.uri().authority().map(http::uri::Authority::as_str))
    }

    /// The pattern of the route that matched, empty until routing succeeds.
    pub fn matched_route(&self) -> &str {
        &self.matched_route
    }

    pub(crate) fn set_matched_route(&mut self, route: &str) {
        route.clone_into(&mut self.matched_route);
    }

    /// Decodes the JSON request body into `T`, consuming the body.
    pub fn bind_json<T: DeserializeOwned>(&mut self) -> Result<T, BindError> {
        let body = self.body.take().ok_or(BindError::Consumed)?;
        if body.is_empty() {
            return Err(BindError::EmptyBody);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Every query value, parsed on first use and cached for the rest of the request.
    pub fn query_values(&self) -> &QueryValues {
        self.query_cache.get_or_init(|| self.query_parser.parse(self.uri().query().unwrap_or_default()))
    }

    /// The first query value for `key`.
    pub fn query_param(&self, key: &str) -> StringValue {
        first_value(self.query_values(), key)
    }

    pub fn path_param(&self, key: &str) -> StringValue {
        match self.path_params.get(key) {
            Some(value) => StringValue::new(value.as_str()),
            None => StringValue::not_found(key),
        }
    }

    /// The first form value for `key`.
    ///
    /// The form is parsed once: for `POST`, `PUT` and `PATCH` requests with an
    /// `application/x-www-form-urlencoded` body, the body values come first, followed
    /// by the query values. Parsing consumes the body; a parse error is cached and
    /// returned on every later call.
    pub fn form_param(&mut self, key: &str) -> StringValue {
        let form = match self.form_cache.take() {
            Some(form) => form,
            None => self.parse_form(),
        };

        let value = match &form {
            Ok(values) => first_value(values, key),
            Err(e) => StringValue::error(e.clone()),
        };
        self.form_cache = Some(form);
        value
    }

    fn parse_form(&mut self) -> Result<QueryValues, ValueError> {
        let mut values = if self.has_form_body() {
            let body = self.body.take().unwrap_or_default();
            parse_urlencoded(&body).map_err(ValueError::invalid_form)?
        } else {
            QueryValues::new()
        };

        let query = self.query_values().iter().flat_map(|(k, vs)| vs.iter().map(move |v| (k.clone(), v.clone())));
        append_pairs(&mut values, query);
        Ok(values)
    }

    fn has_form_body(&self) -> bool {
        if !matches!(*self.method(), Method::POST | Method::PUT | Method::PATCH) {
            return false;
        }

        self.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Mime>().ok())
            .is_some_and(|mime| mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
    }

    /// Serializes `value` as the JSON response body with `status`.
    ///
    /// On a serialization error the buffered response is left as it was.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> Result<(), serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.resp_status_code = status;
        self.resp_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.resp_body = Bytes::from(body);
        Ok(())
    }

    /// Sets a plain text response body with `status`.
    pub fn write_text(&mut self, status: StatusCode, body: impl Into<Bytes>) {
        self.resp_status_code = status;
        self.resp_headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        self.resp_body = body.into();
    }

    /// Appends a `Set-Cookie` header to the buffered response.
    pub fn set_cookie(&mut self, cookie: &Cookie<'_>) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                self.resp_headers.append(SET_COOKIE, value);
            }
            Err(e) => warn!(cause = %e, cookie = cookie.name(), "can't encode cookie as header value"),
        }
    }

    pub fn resp_status_code(&self) -> StatusCode {
        self.resp_status_code
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.resp_status_code = status;
    }

    pub fn resp_body(&self) -> &Bytes {
        &self.resp_body
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.resp_body = body.into();
    }

    pub fn resp_headers(&self) -> &HeaderMap {
        &self.resp_headers
    }

    pub fn resp_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.resp_headers
    }

    pub(crate) fn into_response_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.resp_status_code, self.resp_headers, self.resp_body)
    }
}

fn first_value(values: &QueryValues, key: &str) -> StringValue {
    match values.get(key).and_then(|values| values.first()) {
        Some(value) => StringValue::new(value.as_str()),
        None => StringValue::not_found(key),
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_header", &self.request_header)
            .field("matched_route", &self.matched_route)
            .field("resp_status_code", &self.resp_status_code)
            .field("resp_headers", &self.resp_headers)
            .field("resp_body_len", &self.resp_body.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct User {
        name: String,
    }

    fn context(method: Method, uri: &str, body: &'static str) -> RequestContext {
        let request = Request::builder().method(method).uri(uri).body(Bytes::from_static(body.as_bytes())).unwrap();
        RequestContext::new(request)
    }

    fn form_context(method: Method, uri: &str, body: &'static str) -> RequestContext {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap();
        RequestContext::new(request)
    }

    #[test]
    fn bind_json_decodes_body_once() {
        let mut ctx = context(Method::POST, "/user", r#"{"name":"Ann"}"#);

        let user: User = ctx.bind_json().unwrap();
        assert_eq!(user.name, "Ann");

        let again = ctx.bind_json::<User>();
        assert!(matches!(again, Err(BindError::Consumed)));
    }

    #[test]
    fn bind_json_errors() {
        let mut empty = context(Method::POST, "/user", "");
        assert!(matches!(empty.bind_json::<User>(), Err(BindError::EmptyBody)));

        let mut broken = context(Method::POST, "/user", "{name:");
        assert!(matches!(broken.bind_json::<User>(), Err(BindError::Json { .. })));
    }

    #[test]
    fn query_param_first_value() {
        let ctx = context(Method::GET, "/search?q=rust&q=go&page=2", "");

        assert_eq!(ctx.query_param("q").as_str(), Ok("rust"));
        assert_eq!(ctx.query_param("page").to_i64(), Ok(2));
        assert_eq!(ctx.query_values().get("q").unwrap().len(), 2);
        assert!(ctx.query_param("missing").as_str().unwrap_err().is_not_found());
    }

    struct CountingParser {
        calls: AtomicUsize,
    }

    impl QueryParser for CountingParser {
        fn parse(&self, _raw: &str) -> QueryValues {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let mut values = QueryValues::new();
            values.insert("id".to_string(), vec![call.to_string()]);
            values
        }
    }

    #[test]
    fn query_is_parsed_once() {
        let parser = Arc::new(CountingParser { calls: AtomicUsize::new(0) });
        let request = Request::builder().uri("/?id=7").body(Bytes::new()).unwrap();
        let ctx = RequestContext::with_query_parser(request, parser.clone());

        let first = ctx.query_param("id");
        let second = ctx.query_param("id");
        assert_eq!(first, second);
        assert_eq!(first.as_str(), Ok("0"));
        assert_eq!(parser.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn path_param_is_not_found() {
        let ctx = context(Method::GET, "/user", "");
        assert_eq!(ctx.path_param("id").into_string(), Err(ValueError::not_found("id")));
    }

    #[test]
    fn form_param_body_before_query() {
        let mut ctx = form_context(Method::POST, "/login?name=query&from=home", "name=body&password=secret");

        assert_eq!(ctx.form_param("name").as_str(), Ok("body"));
        assert_eq!(ctx.form_param("password").as_str(), Ok("secret"));
        assert_eq!(ctx.form_param("from").as_str(), Ok("home"));
        assert!(ctx.form_param("missing").as_str().unwrap_err().is_not_found());
        assert!(matches!(ctx.bind_json::<User>(), Err(BindError::Consumed)));
    }

    #[test]
    fn form_param_ignores_body_of_get() {
        let mut ctx = form_context(Method::GET, "/login?name=query", "name=body");
        assert_eq!(ctx.form_param("name").as_str(), Ok("query"));
    }

    #[test]
    fn form_param_ignores_other_content_types() {
        let mut ctx = context(Method::POST, "/login?name=query", "name=body");
        assert_eq!(ctx.form_param("name").as_str(), Ok("query"));
    }

    #[test]
    fn write_json_sets_buffer() {
        let mut ctx = context(Method::GET, "/user", "");
        ctx.write_json(StatusCode::CREATED, &User { name: "Ann".to_string() }).unwrap();

        assert_eq!(ctx.resp_status_code(), StatusCode::CREATED);
        assert_eq!(ctx.resp_body().as_ref(), br#"{"name":"Ann"}"#);
        assert_eq!(ctx.resp_headers().get(CONTENT_TYPE).unwrap(), "application/json");
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not serializable"))
        }
    }

    #[test]
    fn write_json_failure_keeps_buffer() {
        let mut ctx = context(Method::GET, "/user", "");
        ctx.set_status(StatusCode::ACCEPTED);
        ctx.set_body("before");

        assert!(ctx.write_json(StatusCode::OK, &Unserializable).is_err());
        assert_eq!(ctx.resp_status_code(), StatusCode::ACCEPTED);
        assert_eq!(ctx.resp_body().as_ref(), b"before");
        assert!(ctx.resp_headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn set_cookie_appends_headers() {
        let mut ctx = context(Method::GET, "/", "");
        ctx.set_cookie(&Cookie::new("session", "abc"));
        ctx.set_cookie(&Cookie::build(("theme", "dark")).path("/").build());

        let cookies: Vec<_> = ctx.resp_headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "session=abc");
        assert_eq!(cookies[1], "theme=dark; Path=/");
    }

    #[test]
    fn request_accessors() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/user/home?x=1")
            .header(HOST, "example.com:8080")
            .body(Bytes::new())
            .unwrap();
        let ctx = RequestContext::new(request);

        assert_eq!(ctx.method(), Method::PUT);
        assert_eq!(ctx.path(), "/user/home");
        assert_eq!(ctx.host(), Some("example.com:8080"));
        assert_eq!(ctx.version(), Version::HTTP_11);
        assert_eq!(ctx.matched_route(), "");
        assert_eq!(ctx.resp_status_code(), StatusCode::OK);
        assert!(ctx.resp_body().is_empty());
    }
}
