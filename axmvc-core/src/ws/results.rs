use bytes::Bytes;
use serde::Serialize;

use super::WsSession;
use crate::error::HttpError;

/// Result of a WebSocket lifecycle handler that sends itself to the client.
pub trait WsActionResult: Send {
    fn execute(self, session: &WsSession) -> Result<(), HttpError>;
}

/// Sends a value as a JSON text message.
pub struct WsJsonResult<T>(pub T);

impl<T> WsJsonResult<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T: Serialize + Send> WsActionResult for WsJsonResult<T> {
    fn execute(self, session: &WsSession) -> Result<(), HttpError> {
        session.send_json(&self.0)
    }
}

pub struct WsTextResult(pub String);

impl WsTextResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl WsActionResult for WsTextResult {
    fn execute(self, session: &WsSession) -> Result<(), HttpError> {
        Ok(session.send_text(self.0)?)
    }
}

pub struct WsBinaryResult(pub Bytes);

impl WsBinaryResult {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }
}

impl WsActionResult for WsBinaryResult {
    fn execute(self, session: &WsSession) -> Result<(), HttpError> {
        Ok(session.send_binary(self.0)?)
    }
}
