//! HTTP types re-exported from Axum so that generated code and user crates
//! only need a dependency on `axmvc`.

pub use axum::body::{to_bytes, Body};
pub use axum::extract::{FromRequestParts, RawPathParams, Request, State};
pub use axum::http::request::Parts;
pub use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
pub use axum::response::{IntoResponse, Response};
pub use axum::{serve, Json, Router};
pub use bytes::Bytes;

pub mod routing {
    pub use axum::routing::{any, get, on, MethodFilter, MethodRouter};
}
