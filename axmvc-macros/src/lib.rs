extern crate proc_macro;
use proc_macro::TokenStream;

pub(crate) mod codegen;
pub(crate) mod crate_path;
pub(crate) mod model;
pub(crate) mod return_shape;
pub(crate) mod routes_attr;
pub(crate) mod routes_parsing;
pub(crate) mod value_source;

/// Attribute macro on an `impl` block: compiles its annotated methods into
/// Axum dispatch code and implements `Controller<State>` for the type.
///
/// # Arguments
///
/// | Argument | Description |
/// |----------|-------------|
/// | `state = T`       | Router state type; must implement `Container`. Defaults to `()`. |
/// | `path = "/api"`   | Prefix joined to every route template and to the socket path. |
/// | `inject = name`   | Acquire the controller with `injector.name()` instead of `Default`. |
/// | `ws = "/chat"`    | Socket path of the controller's WebSocket endpoint. |
///
/// # Method attributes
///
/// - **HTTP actions**: [`get`], [`post`], [`put`], [`delete`], [`patch`],
///   [`head`], [`options`], [`trace`], [`connect`]. A method may carry
///   several; each becomes a route sharing the same dispatch function.
/// - **WebSocket lifecycle**: [`ws_connect`], [`ws_message`],
///   [`ws_binary_message`], [`ws_error`], [`ws_disconnect`]; at most one
///   method per event.
/// - **Interceptors**: [`before`], [`after`], on the block or on an action.
/// - **Results**: [`action`] asserts that a custom type is an `ActionResult`.
///
/// `#[routes]` must be the first attribute on the block so that the
/// block-level interceptors reach it.
///
/// # Parameters
///
/// Every parameter other than the receiver is bound from the request:
///
/// ```ignore
/// #[routes(state = Services, path = "/users", inject = users)]
/// #[before(RequireTenant)]
/// impl UserController {
///     #[get("/{id}")]
///     async fn show(&self, id: i64, #[from(header)] #[named("x-tenant")] tenant: String) -> User {
///         ...
///     }
///
///     #[get("/search")]
///     fn search(&self, tag: Vec<String>, page: Option<u32>, ctx: &HttpContext) -> Vec<User> {
///         ...
///     }
///
///     #[post]
///     async fn create(&self, #[from_json] body: NewUser) -> Result<JsonResult<User>, AppError> {
///         ...
///     }
/// }
/// ```
///
/// - `#[from(any|path|query|header|cookie|message)]` restricts the source;
///   `any` (the default) tries path, query, header then cookie.
/// - `#[named("key")]` or `#[from(query, name = "key")]` overrides the key.
/// - `#[from_json]` decodes the request body (or a WebSocket text message).
/// - `&HttpContext` / `&mut HttpContext` gives access to the request and
///   the response under construction.
///
/// # What is generated
///
/// - The original `impl` block, routing attributes removed.
/// - One Axum handler `__axmvc_<Name>_<method>` per action.
/// - For a socket path with lifecycle methods, one function per event and
///   the upgrade handler `__axmvc_ws_<Name>`.
/// - `impl Controller<State> for Name`.
#[proc_macro_attribute]
pub fn routes(args: TokenStream, input: TokenStream) -> TokenStream {
    routes_attr::expand(args, input)
}

// ---------------------------------------------------------------------------
// No-op attributes, consumed by #[routes] from the token stream.
// Declared here for IDE support and cargo doc.
// ---------------------------------------------------------------------------

/// Register a **GET** route handler.
///
/// ```ignore
/// #[get]                      // the controller path itself
/// #[get("/users/{id}")]       // path parameter
/// #[get("/files/{*rest}")]    // wildcard
/// ```
///
/// This attribute is consumed by [`routes`]; it is a no-op on its own.
#[proc_macro_attribute]
pub fn get(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **POST** route handler.
///
/// This attribute is consumed by [`routes`]; it is a no-op on its own.
#[proc_macro_attribute]
pub fn post(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **PUT** route handler.
///
/// This attribute is consumed by [`routes`]; it is a no-op on its own.
#[proc_macro_attribute]
pub fn put(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **DELETE** route handler.
///
/// This attribute is consumed by [`routes`]; it is a no-op on its own.
#[proc_macro_attribute]
pub fn delete(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **PATCH** route handler.
///
/// This attribute is consumed by [`routes`]; it is a no-op on its own.
#[proc_macro_attribute]
pub fn patch(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **HEAD** route handler.
///
/// Without one, Axum answers HEAD with the GET handler minus the body.
#[proc_macro_attribute]
pub fn head(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register an **OPTIONS** route handler.
#[proc_macro_attribute]
pub fn options(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **TRACE** route handler.
#[proc_macro_attribute]
pub fn trace(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **CONNECT** route handler.
#[proc_macro_attribute]
pub fn connect(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Handle a new WebSocket connection.
///
/// ```ignore
/// #[routes(ws = "/chat/{room}")]
/// impl ChatController {
///     #[ws_connect]
///     fn joined(&self, room: String, session: &WsSession) -> WsTextResult {
///         WsTextResult::new(format!("welcome to {room}"))
///     }
/// }
/// ```
///
/// Parameters bind from the upgrade request. The handler may also take
/// `&WsSession` or `&WsConnectContext`.
#[proc_macro_attribute]
pub fn ws_connect(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Handle a text message.
///
/// Bound parameters are fields of the message's JSON object, which must
/// then be valid JSON. `#[from_json]` decodes the whole message instead.
/// Returned values are sent back as JSON.
#[proc_macro_attribute]
pub fn ws_message(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Handle a binary message; takes `&WsBinaryMessageContext`.
#[proc_macro_attribute]
pub fn ws_binary_message(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Handle errors raised by the other lifecycle handlers or the transport;
/// takes `&WsErrorContext`.
#[proc_macro_attribute]
pub fn ws_error(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Runs once when the connection ends; `&WsDisconnectContext` carries the
/// close code and reason.
#[proc_macro_attribute]
pub fn ws_disconnect(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Run a `BeforeAction` ahead of binding and the action.
///
/// ```ignore
/// #[before(RequireTenant)]              // expression, built per request
/// #[before(inject = rate_limiter)]      // resolved from the injector
/// ```
///
/// Block-level interceptors run first, then method-level ones, each in
/// declaration order. An error stops the request.
#[proc_macro_attribute]
pub fn before(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Run an `AfterAction` once the action finished, successfully or not.
///
/// The interceptor sees the captured error and may clear it; an error left
/// after every after-interceptor ran is rendered.
#[proc_macro_attribute]
pub fn after(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Mark a method's result type as a self-executing `ActionResult` (or
/// `WsActionResult`).
///
/// Unmarked results that implement the action trait still execute
/// themselves; the marker turns a missing implementation into an error
/// about the trait instead of about `Serialize`.
#[proc_macro_attribute]
pub fn action(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}
