//! Commonly used types for controller crates.

pub use crate::binding::FromParam;
pub use crate::container::Container;
pub use crate::context::{HttpContext, HttpRequest, HttpResponse};
pub use crate::controller::Controller;
pub use crate::error::HttpError;
pub use crate::http::{HeaderMap, Json, Router, StatusCode};
pub use crate::interceptors::{AfterAction, AfterContext, BeforeAction, BeforeContext};
pub use crate::json::{JsonCodec, SerdeJsonCodec};
pub use crate::results::{ActionResult, ContentResult, JsonResult, RedirectResult, StatusCodeResult};
pub use crate::ws::{
    WsActionResult, WsBinaryMessageContext, WsBinaryResult, WsConnectContext,
    WsDisconnectContext, WsErrorContext, WsJsonResult, WsMessageContext, WsSession, WsTextResult,
};
pub use crate::openapi::OpenApiConfig;
pub use crate::{map_error, MvcApp, MvcConfig};
