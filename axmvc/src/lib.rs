//! axmvc: annotated controllers compiled into Axum dispatch code.
//!
//! This facade re-exports the runtime (`axmvc-core`) and the `#[routes]`
//! macro (`axmvc-macros`) through a single dependency:
//!
//! ```ignore
//! use axmvc::prelude::*;
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! #[routes(path = "/hello")]
//! impl Greeter {
//!     #[get("/{name}")]
//!     fn greet(&self, name: String, #[from(query)] shout: Option<bool>) -> String {
//!         let text = format!("hello {name}");
//!         if shout.unwrap_or(false) { text.to_uppercase() } else { text }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_tracing();
//!     MvcApp::new(()).register::<Greeter>().with_trace().serve("0.0.0.0:3000").await
//! }
//! ```

// The proc macros use `proc-macro-crate` to detect whether the user depends
// on `axmvc` or on `axmvc-core` directly, and generate the matching paths.
pub extern crate axmvc_core;
pub extern crate axmvc_macros;

pub use axmvc_core::*;
pub use axmvc_macros::routes;

/// Unified prelude: the core prelude plus the controller attributes.
pub mod prelude {
    pub use axmvc_core::prelude::*;
    pub use axmvc_core::{default_trace, init_tracing};
    pub use axmvc_macros::{
        action, after, before, connect, delete, get, head, options, patch, post, put, routes,
        trace, ws_binary_message, ws_connect, ws_disconnect, ws_error, ws_message,
    };
}
