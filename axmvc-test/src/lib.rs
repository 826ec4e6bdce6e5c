mod app;
#[cfg(feature = "ws")]
mod server;

pub use app::{resolve_path, TestApp, TestRequest, TestResponse};
#[cfg(feature = "ws")]
pub use server::{TestServer, WsTestClient};
