use axmvc_core::http::{header, Body, Router};
use axmvc_core::{Container, MvcApp, Source};
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;

/// Dispatches requests through a built router with `oneshot`, no socket involved.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn from_app<S: Container>(app: MvcApp<S>) -> Self {
        Self::new(app.build())
    }

    pub fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest {
            router: &self.router,
            method,
            path: path.to_owned(),
            values: Vec::new(),
            body: None,
        }
    }

    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, path)
    }
}

/// A request described by the values it offers to each binding source.
///
/// Path values belong in the path passed to [`TestApp::request`]; every
/// other source is collected here and rendered when the request is sent.
pub struct TestRequest<'a> {
    router: &'a Router,
    method: Method,
    path: String,
    values: Vec<(Source, String, String)>,
    body: Option<(Option<HeaderValue>, Bytes)>,
}

impl TestRequest<'_> {
    /// Offer `value` under `key` to `source`. Repeating a key keeps every value in order.
    pub fn with(mut self, source: Source, key: impl Into<String>, value: impl Into<String>) -> Self {
        assert!(
            matches!(source, Source::Query | Source::Header | Source::Cookie),
            "{source} values cannot be attached to an HTTP request"
        );
        self.values.push((source, key.into(), value.into()));
        self
    }

    pub fn query(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(Source::Query, key, value)
    }

    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(Source::Header, name, value)
    }

    pub fn cookie(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(Source::Cookie, name, value)
    }

    pub fn json(mut self, body: &impl Serialize) -> Self {
        let bytes = serde_json::to_vec(body).expect("test body must serialize");
        self.body = Some((Some(HeaderValue::from_static("application/json")), bytes.into()));
        self
    }

    /// Raw body; the content type, if any, comes from an explicit header.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some((None, body.into()));
        self
    }

    fn values_of(&self, source: Source) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(move |(s, _, _)| *s == source)
            .map(|(_, k, v)| (k.as_str(), v.as_str()))
    }

    fn uri(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.extend_pairs(self.values_of(Source::Query));
        let query = query.finish();
        match (query.is_empty(), self.path.contains('?')) {
            (true, _) => self.path.clone(),
            (false, true) => format!("{}&{query}", self.path),
            (false, false) => format!("{}?{query}", self.path),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in self.values_of(Source::Header) {
            let name = HeaderName::from_bytes(name.as_bytes()).expect("invalid header name");
            headers.append(name, value.parse().expect("invalid header value"));
        }
        let cookies: Vec<String> = self
            .values_of(Source::Cookie)
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        if !cookies.is_empty() {
            let line = cookies.join("; ");
            headers.insert(header::COOKIE, line.parse().expect("invalid cookie"));
        }
        if let Some((Some(content_type), _)) = &self.body {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(header::CONTENT_TYPE, content_type.clone());
            }
        }
        headers
    }

    pub async fn send(self) -> TestResponse {
        let mut request = Request::builder()
            .method(self.method.clone())
            .uri(self.uri())
            .body(match &self.body {
                Some((_, bytes)) => Body::from(bytes.clone()),
                None => Body::empty(),
            })
            .expect("invalid test request");
        *request.headers_mut() = self.headers();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("response body must be readable")
            .to_bytes();
        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

/// Escapes one JSON pointer reference token.
fn pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Looks up `user.tags[1]` style paths; `len()` as the last segment yields
/// the size of the array, object or string it follows. Missing values are `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let (path, want_len) = match path.strip_suffix("len()") {
        Some(rest) => (rest.trim_end_matches('.'), true),
        None => (path, false),
    };
    let pointer: String = path
        .split(['.', '[', ']'])
        .filter(|token| !token.is_empty())
        .map(|token| format!("/{}", pointer_token(token)))
        .collect();
    let found = root.pointer(&pointer).cloned().unwrap_or(Value::Null);
    if !want_len {
        return found;
    }
    match &found {
        Value::Array(items) => items.len().into(),
        Value::Object(fields) => fields.len().into(),
        Value::String(text) => text.len().into(),
        other => panic!("`{path}` is {other}, which has no length"),
    }
}

/// Buffered response of a [`TestRequest`].
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(self.status, expected, "unexpected status; body: {}", self.text());
        self
    }

    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    pub fn assert_no_content(self) -> Self {
        self.assert_status(StatusCode::NO_CONTENT)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let expected = expected.into();
        let body: Value = self.json();
        assert_eq!(resolve_path(&body, path), expected, "at `{path}` in {body}");
        self
    }

    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let found = resolve_path(&self.json(), path);
        serde_json::from_value(found).unwrap_or_else(|e| panic!("`{path}` does not decode: {e}"))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not the expected JSON ({e}): {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
