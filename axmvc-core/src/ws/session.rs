use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::context::HttpRequest;
use crate::error::HttpError;
use crate::json::{self, JsonCodec};

/// Errors from WebSocket session operations.
#[derive(Debug)]
pub enum WsError {
    /// The connection's writer is gone.
    Closed,
}

impl std::fmt::Display for WsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WsError::Closed => write!(f, "ws closed"),
        }
    }
}

impl std::error::Error for WsError {}

impl From<WsError> for HttpError {
    fn from(err: WsError) -> Self {
        HttpError::Internal(err.to_string())
    }
}

/// Handle on one WebSocket connection.
///
/// Cheap to clone; all clones feed the same outbound queue, drained by the
/// connection's writer task in order.
#[derive(Clone)]
pub struct WsSession {
    id: Uuid,
    outbound: mpsc::UnboundedSender<Message>,
    request: Arc<HttpRequest>,
    codec: Arc<dyn JsonCodec>,
}

impl WsSession {
    pub(crate) fn new(
        outbound: mpsc::UnboundedSender<Message>,
        request: HttpRequest,
        codec: Arc<dyn JsonCodec>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            outbound,
            request: Arc::new(request),
            codec,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The upgrade request the connection was opened with.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn codec(&self) -> &dyn JsonCodec {
        self.codec.as_ref()
    }

    pub fn is_open(&self) -> bool {
        !self.outbound.is_closed()
    }

    pub fn send_text(&self, text: impl Into<String>) -> Result<(), WsError> {
        let text: String = text.into();
        self.send(Message::Text(text.into()))
    }

    pub fn send_binary(&self, data: impl Into<Bytes>) -> Result<(), WsError> {
        self.send(Message::Binary(data.into()))
    }

    /// Serialize `value` with the session's codec and send it as text.
    pub fn send_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), HttpError> {
        let bytes = json::encode(self.codec(), value)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| HttpError::Internal(format!("codec produced invalid UTF-8: {e}")))?;
        Ok(self.send_text(text)?)
    }

    /// Ask the client to close the connection.
    pub fn close(&self, code: u16, reason: impl Into<String>) -> Result<(), WsError> {
        let reason: String = reason.into();
        self.send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
    }

    fn send(&self, message: Message) -> Result<(), WsError> {
        self.outbound.send(message).map_err(|_| WsError::Closed)
    }
}

impl std::fmt::Debug for WsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSession")
            .field("id", &self.id)
            .field("uri", self.request.uri())
            .finish()
    }
}
