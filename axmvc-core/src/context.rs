//! Per-invocation request/response context handed to generated dispatch
//! code, interceptors and action results.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::LengthLimitError;

use crate::container::Container;
use crate::error::HttpError;
use crate::http::{
    header, to_bytes, Body, FromRequestParts, HeaderMap, HeaderName, HeaderValue, IntoResponse,
    Method, Parts, RawPathParams, Request, Response, StatusCode, Uri,
};
use crate::json::{self, JsonCodec};

/// Buffered view of an incoming request.
///
/// Path parameters, query pairs and cookies are decoded once, in the order
/// they appear, so that repeated keys keep their positions.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    cookies: Vec<(String, String)>,
    body: Bytes,
}

impl HttpRequest {
    /// Decode request parts. Path parameters are only available when the
    /// parts went through an Axum route with captures.
    pub async fn from_parts(parts: &mut Parts, body: Bytes) -> Self {
        let path_params = match RawPathParams::from_request_parts(parts, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => Vec::new(),
        };
        let query = parts
            .uri
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        let cookies = parse_cookies(&parts.headers);

        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            path_params,
            query,
            cookies,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Value of a path capture.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a query key, in order.
    pub fn query_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        pairs_named(&self.query, name)
    }

    /// All values of a header, in order. Header names are case-insensitive.
    pub fn header_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let values = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => self.headers.get_all(name).iter().collect::<Vec<_>>(),
            Err(_) => Vec::new(),
        };
        values.into_iter().filter_map(|v| v.to_str().ok())
    }

    /// First value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// All values of a cookie, in order.
    pub fn cookie_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        pairs_named(&self.cookies, name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn pairs_named<'a>(
    pairs: &'a [(String, String)],
    name: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    pairs
        .iter()
        .filter(move |(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            let value = value.trim().trim_matches('"');
            Some((name.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Response under construction. Action results write into it; the
/// dispatch unit renders it once the invocation completed.
#[derive(Debug)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl HttpResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Replace the body and its content type.
    pub fn set_body(&mut self, content_type: HeaderValue, body: impl Into<Bytes>) {
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self.body = body.into();
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Request and response of one HTTP invocation.
pub struct HttpContext {
    request: HttpRequest,
    response: HttpResponse,
    codec: Arc<dyn JsonCodec>,
}

impl HttpContext {
    pub fn new(request: HttpRequest, codec: Arc<dyn JsonCodec>) -> Self {
        Self {
            request,
            response: HttpResponse::default(),
            codec,
        }
    }

    /// Buffer `request` and build the context, honoring the state's body
    /// limit and codec.
    pub async fn from_request<S: Container>(request: Request, state: &S) -> Result<Self, HttpError> {
        let limit = state.config().max_body_bytes;
        let (mut parts, body) = request.into_parts();
        let body = to_bytes(body, limit).await.map_err(|e| {
            if e.into_inner().is::<LengthLimitError>() {
                HttpError::PayloadTooLarge(format!("request body exceeds {limit} bytes"))
            } else {
                HttpError::BadRequest("failed to read request body".into())
            }
        })?;
        let request = HttpRequest::from_parts(&mut parts, body).await;
        Ok(Self::new(request, state.json_codec()))
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut HttpResponse {
        &mut self.response
    }

    pub fn codec(&self) -> &dyn JsonCodec {
        self.codec.as_ref()
    }

    /// Decode the request body as JSON.
    pub fn body_json<T: serde::de::DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(json::decode(self.codec(), self.request.body())?)
    }

    pub fn into_response(self) -> Response {
        self.response.into_response()
    }
}
