use std::time::Duration;

use axmvc::prelude::*;
use axmvc::{EndpointInfo, WsError};
use axmvc_test::{TestApp, TestServer};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;

#[derive(Clone)]
struct Hub {
    events: mpsc::UnboundedSender<String>,
}

impl Container for Hub {
    type Injector = Hub;

    fn injector(&self) -> Hub {
        self.clone()
    }
}

impl Hub {
    fn chat(&self) -> ChatController {
        ChatController {
            events: self.events.clone(),
        }
    }
}

#[derive(Deserialize)]
struct Command {
    op: String,
}

struct ChatController {
    events: mpsc::UnboundedSender<String>,
}

#[routes(state = Hub, path = "/rooms", ws = "/{room}/socket", inject = chat)]
impl ChatController {
    #[get("/{room}")]
    fn describe(&self, room: String) -> Value {
        json!({ "room": room })
    }

    #[ws_connect]
    fn joined(&self, room: String, #[from(query)] user: Option<String>, session: &WsSession) -> WsTextResult {
        let _ = self.events.send(format!("connected:{room}:{}", session.request().uri().path()));
        WsTextResult::new(format!(
            "welcome {} to {room}",
            user.unwrap_or_else(|| "guest".into())
        ))
    }

    #[ws_message]
    async fn said(
        &self,
        text: String,
        times: Option<usize>,
        tags: Vec<String>,
        #[from(path)] room: String,
    ) -> Value {
        json!({ "room": room, "echo": text.repeat(times.unwrap_or(1)), "tags": tags })
    }

    #[ws_binary_message]
    fn bytes(&self, ctx: &WsBinaryMessageContext) -> WsBinaryResult {
        let mut data = ctx.data().to_vec();
        data.reverse();
        WsBinaryResult::new(data)
    }

    #[ws_error]
    fn failed(&self, ctx: &WsErrorContext) -> Result<(), WsError> {
        let _ = self.events.send(format!("error:{}", ctx.error().status().as_u16()));
        ctx.session().send_text(format!("error {}", ctx.error().status().as_u16()))
    }

    #[ws_disconnect]
    fn left(&self, ctx: &WsDisconnectContext) {
        let _ = self
            .events
            .send(format!("closed:{}:{}", ctx.status_code(), ctx.reason()));
    }
}

/// Socket whose message handler decodes the whole frame.
#[derive(Default)]
struct CommandController;

#[routes(ws = "/commands")]
impl CommandController {
    #[ws_message]
    fn command(&self, #[from_json] command: Command, ctx: &WsMessageContext) -> Result<WsTextResult, HttpError> {
        match command.op.as_str() {
            "ping" => Ok(WsTextResult::new("pong")),
            "raw" => Ok(WsTextResult::new(ctx.message().to_owned())),
            other => Err(HttpError::BadRequest(format!("unknown op {other}"))),
        }
    }
}

/// Serializable reply that sends itself as upper-cased text.
#[derive(serde::Serialize)]
struct Shout {
    text: String,
}

impl WsActionResult for Shout {
    fn execute(self, session: &WsSession) -> Result<(), HttpError> {
        Ok(session.send_text(self.text.to_uppercase())?)
    }
}

#[derive(Default)]
struct EchoController;

#[routes(ws = "/echo")]
impl EchoController {
    #[ws_message]
    fn echo(&self, text: String) -> Shout {
        Shout { text }
    }
}

async fn start() -> (TestServer, mpsc::UnboundedReceiver<String>) {
    let (events, rx) = mpsc::unbounded_channel();
    let app = MvcApp::new(Hub { events }).register::<ChatController>();
    (TestServer::from_app(app).await, rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a handler")
        .expect("event channel closed")
}

#[tokio::test]
async fn test_connect_binds_from_upgrade_request() {
    let (server, mut rx) = start().await;
    let mut client = server.ws_connect("/rooms/lobby/socket?user=ann").await;
    assert_eq!(client.recv_text().await, "welcome ann to lobby");
    assert_eq!(next_event(&mut rx).await, "connected:lobby:/rooms/lobby/socket");
}

#[tokio::test]
async fn test_message_fields_bind_parameters() {
    let (server, _rx) = start().await;
    let mut client = server.ws_connect("/rooms/lobby/socket").await;
    client.recv_text().await;

    client
        .send_json(&json!({ "text": "ab", "times": 3, "tags": ["x", "y"] }))
        .await;
    let reply: Value = client.recv_json().await;
    assert_eq!(reply, json!({ "room": "lobby", "echo": "ababab", "tags": ["x", "y"] }));

    client.send_json(&json!({ "text": "solo" })).await;
    let reply: Value = client.recv_json().await;
    assert_eq!(reply, json!({ "room": "lobby", "echo": "solo", "tags": [] }));
}

#[tokio::test]
async fn test_binary_messages() {
    let (server, _rx) = start().await;
    let mut client = server.ws_connect("/rooms/lobby/socket").await;
    client.recv_text().await;
    client.send_binary(vec![1u8, 2, 3]).await;
    assert_eq!(client.recv_binary().await, vec![3, 2, 1]);
}

#[tokio::test]
async fn test_handler_errors_reach_the_error_handler() {
    let (server, mut rx) = start().await;
    let mut client = server.ws_connect("/rooms/lobby/socket").await;
    client.recv_text().await;
    next_event(&mut rx).await;

    client.send_text("not json").await;
    assert_eq!(client.recv_text().await, "error 400");
    assert_eq!(next_event(&mut rx).await, "error:400");

    // Missing required field.
    client.send_json(&json!({ "times": 2 })).await;
    assert_eq!(client.recv_text().await, "error 400");

    // The connection survives handler errors.
    client.send_json(&json!({ "text": "still here" })).await;
    let reply: Value = client.recv_json().await;
    assert_eq!(reply["echo"], "still here");
}

#[tokio::test]
async fn test_disconnect_reports_close_frame() {
    let (server, mut rx) = start().await;
    let mut client = server.ws_connect("/rooms/lobby/socket").await;
    client.recv_text().await;
    next_event(&mut rx).await;

    client.close(4000, "bye").await;
    assert_eq!(next_event(&mut rx).await, "closed:4000:bye");
}

#[tokio::test]
async fn test_dropped_connection_is_abnormal_closure() {
    let (server, mut rx) = start().await;
    let mut client = server.ws_connect("/rooms/lobby/socket").await;
    client.recv_text().await;
    next_event(&mut rx).await;

    client.abort();
    let mut events = vec![next_event(&mut rx).await];
    if events[0].starts_with("error") {
        events.push(next_event(&mut rx).await);
    }
    assert_eq!(events.last().map(String::as_str), Some("closed:1006:"));
}

#[tokio::test]
async fn test_http_routes_share_the_controller() {
    let (events, _rx) = mpsc::unbounded_channel();
    let app = TestApp::from_app(MvcApp::new(Hub { events }).register::<ChatController>());
    app.get("/rooms/lobby")
        .send()
        .await
        .assert_ok()
        .assert_json_path("room", "lobby");
}

#[tokio::test]
async fn test_upgrade_required_for_socket_path() {
    let (events, _rx) = mpsc::unbounded_channel();
    let app = TestApp::from_app(MvcApp::new(Hub { events }).register::<ChatController>());
    let resp = app.get("/rooms/lobby/socket").send().await;
    assert!(resp.status.is_client_error(), "got {}", resp.status);
}

#[tokio::test]
async fn test_json_message_parameter() {
    let server = TestServer::from_app(MvcApp::new(()).register::<CommandController>()).await;
    let mut client = server.ws_connect("/commands").await;

    client.send_json(&json!({ "op": "ping" })).await;
    assert_eq!(client.recv_text().await, "pong");

    client.send_text(r#"{"op":"raw","extra":1}"#).await;
    assert_eq!(client.recv_text().await, r#"{"op":"raw","extra":1}"#);

    // No error handler: the error is logged and the connection stays open.
    client.send_json(&json!({ "op": "dance" })).await;
    client.send_json(&json!({ "op": "ping" })).await;
    assert_eq!(client.recv_text().await, "pong");
}

#[tokio::test]
async fn test_unmarked_socket_action_executes_itself() {
    let server = TestServer::from_app(MvcApp::new(()).register::<EchoController>()).await;
    let mut client = server.ws_connect("/echo").await;
    client.send_json(&json!({ "text": "hi" })).await;
    assert_eq!(client.recv_text().await, "HI");
}

#[test]
fn test_endpoint_description() {
    let endpoint = <ChatController as Controller<Hub>>::endpoint().expect("chat has a socket");
    assert_eq!(endpoint.path, "/rooms/{room}/socket");
    assert_eq!(endpoint.controller, "ChatController");
    assert_eq!(
        endpoint.events,
        vec!["connect", "message", "binary_message", "error", "disconnect"]
    );

    let routes = <ChatController as Controller<Hub>>::route_table();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].path, "/rooms/{room}");

    assert_eq!(
        <CommandController as Controller<()>>::endpoint(),
        Some(EndpointInfo::new("/commands", "CommandController", vec!["message"]))
    );
}
