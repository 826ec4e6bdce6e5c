pub mod app;
pub mod binding;
pub mod config;
pub mod container;
pub mod context;
pub mod controller;
#[doc(hidden)]
pub mod dispatch;
pub mod error;
pub mod http;
pub mod interceptors;
pub mod json;
pub mod layers;
pub mod meta;
pub mod openapi;
pub mod prelude;
pub mod results;
pub mod ws;

pub use app::MvcApp;
pub use binding::{BindError, DefaultModelBinder, FromParam, ModelBinder, Source};
pub use config::{ConfigError, MvcConfig};
pub use container::Container;
pub use context::{HttpContext, HttpRequest, HttpResponse};
pub use controller::Controller;
pub use error::{error_response, HttpError};
pub use interceptors::{AfterAction, AfterContext, BeforeAction, BeforeContext};
pub use json::{CodecError, JsonCodec, SerdeJsonCodec};
pub use layers::{default_trace, init_tracing};
pub use meta::{EndpointInfo, ParamInfo, RouteInfo};
pub use openapi::OpenApiConfig;
pub use results::{ActionResult, ContentResult, JsonResult, RedirectResult, StatusCodeResult};
pub use ws::{
    WsActionResult, WsBinaryMessageContext, WsBinaryResult, WsConnectContext,
    WsDisconnectContext, WsEndpoint, WsError, WsErrorContext, WsJsonResult, WsMessageContext,
    WsSession, WsTextResult,
};

/// Re-exports used by generated code. Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use crate::dispatch;
    pub use tracing;
}
