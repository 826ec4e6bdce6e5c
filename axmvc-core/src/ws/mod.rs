//! WebSocket endpoints.
//!
//! A controller with a `ws` path gets one endpoint, dispatching the five
//! lifecycle events (connect, message, binary message, error, disconnect)
//! to the controller's annotated methods.

mod context;
mod endpoint;
mod results;
mod session;

pub use context::{
    WsBinaryMessageContext, WsConnectContext, WsDisconnectContext, WsErrorContext,
    WsMessageContext, NO_STATUS_RECEIVED,
};
pub use endpoint::WsEndpoint;
pub use results::{WsActionResult, WsBinaryResult, WsJsonResult, WsTextResult};
pub use session::{WsError, WsSession};
