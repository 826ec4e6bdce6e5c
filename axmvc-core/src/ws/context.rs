//! Per-event contexts handed to WebSocket lifecycle handlers.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::WsSession;
use crate::error::HttpError;
use crate::json;

pub struct WsConnectContext {
    session: WsSession,
}

impl WsConnectContext {
    pub fn new(session: WsSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &WsSession {
        &self.session
    }
}

/// A text message received from the client.
pub struct WsMessageContext {
    session: WsSession,
    message: String,
}

impl WsMessageContext {
    pub fn new(session: WsSession, message: String) -> Self {
        Self { session, message }
    }

    pub fn session(&self) -> &WsSession {
        &self.session
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Decode the message as a JSON document.
    pub fn message_value(&self) -> Result<Value, HttpError> {
        Ok(self.session.codec().deserialize(self.message.as_bytes())?)
    }

    /// Decode the message into `T`.
    pub fn message_as<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        Ok(json::decode(self.session.codec(), self.message.as_bytes())?)
    }
}

/// A binary message received from the client.
pub struct WsBinaryMessageContext {
    session: WsSession,
    data: Bytes,
}

impl WsBinaryMessageContext {
    pub fn new(session: WsSession, data: Bytes) -> Self {
        Self { session, data }
    }

    pub fn session(&self) -> &WsSession {
        &self.session
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A failure on the connection: a transport error, or an error returned by
/// another lifecycle handler.
pub struct WsErrorContext {
    session: WsSession,
    error: HttpError,
}

impl WsErrorContext {
    pub fn new(session: WsSession, error: HttpError) -> Self {
        Self { session, error }
    }

    pub fn session(&self) -> &WsSession {
        &self.session
    }

    pub fn error(&self) -> &HttpError {
        &self.error
    }
}

/// Status code used when the client closed without a close frame.
pub const NO_STATUS_RECEIVED: u16 = 1005;

pub struct WsDisconnectContext {
    session: WsSession,
    status: u16,
    reason: String,
}

impl WsDisconnectContext {
    pub fn new(session: WsSession, status: u16, reason: String) -> Self {
        Self {
            session,
            status,
            reason,
        }
    }

    pub fn session(&self) -> &WsSession {
        &self.session
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
