use std::net::SocketAddr;
use std::time::Duration;

use axmvc_core::http::{serve, Router};
use axmvc_core::{Container, MvcApp};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A router served on an ephemeral local port, for tests that need a real
/// socket (WebSocket upgrades).
///
/// The server task is aborted when the `TestServer` is dropped.
pub struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(router: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().expect("listener has no local address");
        let task = tokio::spawn(async move {
            serve(listener, router).await.ok();
        });
        Self { addr, task }
    }

    pub async fn from_app<S: Container>(app: MvcApp<S>) -> Self {
        Self::start(app.build()).await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://` URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// `ws://` URL for `path`.
    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{path}", self.addr)
    }

    /// Open a WebSocket connection to `path`.
    pub async fn ws_connect(&self, path: &str) -> WsTestClient {
        self.ws_connect_with_headers(path, &[]).await
    }

    /// Open a WebSocket connection to `path`, adding `headers` to the
    /// upgrade request.
    pub async fn ws_connect_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> WsTestClient {
        let mut request = self
            .ws_url(path)
            .into_client_request()
            .expect("invalid websocket url");
        for (name, value) in headers {
            let name: tokio_tungstenite::tungstenite::http::HeaderName =
                name.parse().expect("invalid header name");
            request
                .headers_mut()
                .append(name, HeaderValue::from_str(value).expect("invalid header value"));
        }
        let (stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .unwrap_or_else(|e| panic!("websocket handshake with {path} failed: {e}"));
        WsTestClient { stream }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Client side of a test WebSocket connection.
///
/// Receive helpers skip ping/pong frames and panic after five seconds
/// without a message.
pub struct WsTestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTestClient {
    pub async fn send_text(&mut self, text: impl Into<String>) {
        let text: String = text.into();
        self.stream
            .send(Message::text(text))
            .await
            .expect("failed to send text frame");
    }

    pub async fn send_binary(&mut self, data: impl Into<Vec<u8>>) {
        let data: Vec<u8> = data.into();
        self.stream
            .send(Message::binary(data))
            .await
            .expect("failed to send binary frame");
    }

    pub async fn send_json(&mut self, value: &impl Serialize) {
        let text = serde_json::to_string(value).expect("failed to serialize message");
        self.send_text(text).await;
    }

    /// Next data or close frame; `None` once the stream ended.
    pub async fn next_message(&mut self) -> Option<Message> {
        let next = async {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(message)) => return Some(message),
                    Some(Err(_)) | None => return None,
                }
            }
        };
        tokio::time::timeout(RECV_TIMEOUT, next)
            .await
            .expect("timed out waiting for a websocket message")
    }

    pub async fn recv_text(&mut self) -> String {
        match self.next_message().await {
            Some(Message::Text(text)) => text.as_str().to_owned(),
            other => panic!("expected a text message, got {other:?}"),
        }
    }

    pub async fn recv_json<T: DeserializeOwned>(&mut self) -> T {
        let text = self.recv_text().await;
        serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("failed to parse message as JSON: {e}\nMessage: {text}"))
    }

    pub async fn recv_binary(&mut self) -> Vec<u8> {
        match self.next_message().await {
            Some(Message::Binary(data)) => data.to_vec(),
            other => panic!("expected a binary message, got {other:?}"),
        }
    }

    /// Wait for the server's close frame and return its code and reason.
    pub async fn recv_close(&mut self) -> Option<(u16, String)> {
        match self.next_message().await {
            Some(Message::Close(frame)) => {
                frame.map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
            }
            other => panic!("expected a close frame, got {other:?}"),
        }
    }

    /// Send a close frame and wait for the server to finish the handshake.
    pub async fn close(mut self, code: u16, reason: &str) {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_owned().into(),
        };
        self.stream
            .send(Message::Close(Some(frame)))
            .await
            .expect("failed to send close frame");
        while let Ok(Some(Ok(_))) = tokio::time::timeout(RECV_TIMEOUT, self.stream.next()).await {}
    }

    /// Drop the connection without a close frame.
    pub fn abort(self) {
        drop(self.stream);
    }
}
