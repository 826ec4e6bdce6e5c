//! Self-executing action results.
//!
//! An action returning one of these (or `impl ActionResult`) writes its own
//! response. Plain values are wrapped in [`JsonResult`] by the generated
//! dispatch code.

use serde::Serialize;

use crate::context::HttpContext;
use crate::error::HttpError;
use crate::http::{header, HeaderValue, StatusCode};
use crate::json;

pub trait ActionResult: Send {
    fn execute(self, ctx: &mut HttpContext) -> Result<(), HttpError>;
}

/// Serializes a value with the context's codec.
pub struct JsonResult<T> {
    value: T,
    status: StatusCode,
}

impl<T> JsonResult<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            status: StatusCode::OK,
        }
    }

    pub fn created(value: T) -> Self {
        Self::new(value).with_status(StatusCode::CREATED)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T: Serialize + Send> ActionResult for JsonResult<T> {
    fn execute(self, ctx: &mut HttpContext) -> Result<(), HttpError> {
        let bytes = json::encode(ctx.codec(), &self.value)?;
        let response = ctx.response_mut();
        response.set_status(self.status);
        response.set_body(HeaderValue::from_static("application/json"), bytes);
        Ok(())
    }
}

/// Raw content with an explicit content type.
pub struct ContentResult {
    content: String,
    content_type: String,
    status: StatusCode,
}

impl ContentResult {
    pub fn new(content: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
            status: StatusCode::OK,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, "text/plain; charset=utf-8")
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self::new(content, "text/html; charset=utf-8")
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl ActionResult for ContentResult {
    fn execute(self, ctx: &mut HttpContext) -> Result<(), HttpError> {
        let content_type = HeaderValue::from_str(&self.content_type).map_err(|_| {
            HttpError::Internal(format!("invalid content type '{}'", self.content_type))
        })?;
        let response = ctx.response_mut();
        response.set_status(self.status);
        response.set_body(content_type, self.content);
        Ok(())
    }
}

/// Status code with an empty body.
pub struct StatusCodeResult(pub StatusCode);

impl StatusCodeResult {
    pub fn no_content() -> Self {
        Self(StatusCode::NO_CONTENT)
    }

    pub fn accepted() -> Self {
        Self(StatusCode::ACCEPTED)
    }
}

impl ActionResult for StatusCodeResult {
    fn execute(self, ctx: &mut HttpContext) -> Result<(), HttpError> {
        ctx.response_mut().set_status(self.0);
        Ok(())
    }
}

/// Redirect to another location.
pub struct RedirectResult {
    location: String,
    status: StatusCode,
}

impl RedirectResult {
    /// 302 Found.
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: StatusCode::FOUND,
        }
    }

    /// 303 See Other.
    pub fn see_other(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: StatusCode::SEE_OTHER,
        }
    }

    /// 308 Permanent Redirect.
    pub fn permanent(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: StatusCode::PERMANENT_REDIRECT,
        }
    }
}

impl ActionResult for RedirectResult {
    fn execute(self, ctx: &mut HttpContext) -> Result<(), HttpError> {
        let location = HeaderValue::from_str(&self.location)
            .map_err(|_| HttpError::Internal(format!("invalid redirect location '{}'", self.location)))?;
        let response = ctx.response_mut();
        response.set_status(self.status);
        response.headers_mut().insert(header::LOCATION, location);
        Ok(())
    }
}
