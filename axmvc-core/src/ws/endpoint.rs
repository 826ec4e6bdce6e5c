use std::future::Future;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::context::{
    WsBinaryMessageContext, WsConnectContext, WsDisconnectContext, WsErrorContext,
    WsMessageContext, NO_STATUS_RECEIVED,
};
use super::WsSession;
use crate::container::Container;
use crate::context::HttpRequest;
use crate::error::HttpError;
use crate::http::{FromRequestParts, IntoResponse, Request, Response};

/// Status reported to the disconnect handler when the transport failed.
const ABNORMAL_CLOSURE: u16 = 1006;

type Handler<S, C> = Arc<dyn Fn(S, C) -> BoxFuture<'static, Result<(), HttpError>> + Send + Sync>;

fn boxed<S, C, F, Fut>(handler: F) -> Handler<S, C>
where
    F: Fn(S, C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HttpError>> + Send + 'static,
{
    Arc::new(move |state: S, ctx: C| -> BoxFuture<'static, Result<(), HttpError>> {
        Box::pin(handler(state, ctx))
    })
}

/// A WebSocket endpoint with up to one handler per lifecycle event.
///
/// The generated code builds one per controller and per upgrade request:
///
/// ```ignore
/// WsEndpoint::<State>::new()
///     .on_connect(connect_handler)
///     .on_message(message_handler)
///     .accept(state, request)
///     .await
/// ```
///
/// Once upgraded, a writer task owns the socket's sending half and drains
/// the [`WsSession`] queue. Incoming text frames go to the message handler
/// and binary frames to the binary handler. The disconnect handler runs
/// once, when the read loop ends. Errors returned by any handler are
/// routed to the error handler.
pub struct WsEndpoint<S> {
    connect: Option<Handler<S, WsConnectContext>>,
    message: Option<Handler<S, WsMessageContext>>,
    binary_message: Option<Handler<S, WsBinaryMessageContext>>,
    error: Option<Handler<S, WsErrorContext>>,
    disconnect: Option<Handler<S, WsDisconnectContext>>,
}

impl<S: Container> Default for WsEndpoint<S> {
    fn default() -> Self {
        Self {
            connect: None,
            message: None,
            binary_message: None,
            error: None,
            disconnect: None,
        }
    }
}

impl<S: Container> WsEndpoint<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connect<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(S, WsConnectContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HttpError>> + Send + 'static,
    {
        self.connect = Some(boxed(handler));
        self
    }

    pub fn on_message<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(S, WsMessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HttpError>> + Send + 'static,
    {
        self.message = Some(boxed(handler));
        self
    }

    pub fn on_binary_message<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(S, WsBinaryMessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HttpError>> + Send + 'static,
    {
        self.binary_message = Some(boxed(handler));
        self
    }

    pub fn on_error<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(S, WsErrorContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HttpError>> + Send + 'static,
    {
        self.error = Some(boxed(handler));
        self
    }

    pub fn on_disconnect<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(S, WsDisconnectContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HttpError>> + Send + 'static,
    {
        self.disconnect = Some(boxed(handler));
        self
    }

    /// Upgrade `request` and run the connection in the background.
    ///
    /// Requests that are not valid upgrades are answered with Axum's
    /// rejection response.
    pub async fn accept(self, state: S, request: Request) -> Response {
        let (mut parts, _body) = request.into_parts();
        let upgrade = match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
            Ok(upgrade) => upgrade,
            Err(rejection) => return rejection.into_response(),
        };
        let handshake = HttpRequest::from_parts(&mut parts, Bytes::new()).await;
        let max_message = state.config().ws_max_message_bytes;

        upgrade
            .max_message_size(max_message)
            .on_upgrade(move |socket| self.run(state, handshake, socket))
    }

    async fn run(self, state: S, handshake: HttpRequest, socket: WebSocket) {
        let (mut sink, mut stream) = socket.split();
        let (outbound, mut queue) = mpsc::unbounded_channel::<Message>();
        tokio::spawn(async move {
            while let Some(message) = queue.recv().await {
                let closing = matches!(message, Message::Close(_));
                if sink.send(message).await.is_err() || closing {
                    break;
                }
            }
        });

        let session = WsSession::new(outbound, handshake, state.json_codec());
        tracing::debug!(session = %session.id(), uri = %session.request().uri(), "websocket connected");

        if let Some(handler) = &self.connect {
            let result = handler(state.clone(), WsConnectContext::new(session.clone())).await;
            self.settle(&state, &session, result).await;
        }

        let mut status = NO_STATUS_RECEIVED;
        let mut reason = String::new();
        let mut closing = false;

        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if let Some(handler) = &self.message {
                        let ctx = WsMessageContext::new(session.clone(), text.as_str().to_owned());
                        let result = handler(state.clone(), ctx).await;
                        self.settle(&state, &session, result).await;
                    }
                }
                Ok(Message::Binary(data)) => {
                    if let Some(handler) = &self.binary_message {
                        let ctx = WsBinaryMessageContext::new(session.clone(), data);
                        let result = handler(state.clone(), ctx).await;
                        self.settle(&state, &session, result).await;
                    }
                }
                Ok(Message::Close(frame)) => {
                    if let Some(frame) = frame {
                        status = frame.code;
                        reason = frame.reason.as_str().to_owned();
                    }
                    // Keep reading so the close handshake gets flushed.
                    closing = true;
                }
                Ok(_) => {}
                Err(e) => {
                    if !closing {
                        status = ABNORMAL_CLOSURE;
                        let error = HttpError::Internal(format!("websocket transport error: {e}"));
                        self.fail(&state, &session, error).await;
                    }
                    break;
                }
            }
        }

        if let Some(handler) = &self.disconnect {
            let ctx = WsDisconnectContext::new(session.clone(), status, reason);
            let result = handler(state.clone(), ctx).await;
            self.settle(&state, &session, result).await;
        }
        tracing::debug!(session = %session.id(), status, "websocket disconnected");
    }

    async fn settle(&self, state: &S, session: &WsSession, result: Result<(), HttpError>) {
        if let Err(error) = result {
            self.fail(state, session, error).await;
        }
    }

    async fn fail(&self, state: &S, session: &WsSession, error: HttpError) {
        let Some(handler) = &self.error else {
            tracing::warn!(session = %session.id(), %error, "unhandled websocket error");
            return;
        };
        tracing::warn!(session = %session.id(), %error, "websocket handler failed");
        if let Err(e) = handler(state.clone(), WsErrorContext::new(session.clone(), error)).await {
            tracing::error!(session = %session.id(), error = %e, "websocket error handler failed");
        }
    }
}
