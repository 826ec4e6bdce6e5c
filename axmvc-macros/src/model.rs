//! Descriptors built from a `#[routes]` impl block.

use proc_macro2::Span;

use crate::return_shape::Classified;
use crate::value_source::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 9] = [
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Put,
        HttpVerb::Delete,
        HttpVerb::Patch,
        HttpVerb::Head,
        HttpVerb::Options,
        HttpVerb::Trace,
        HttpVerb::Connect,
    ];

    /// Name of the method attribute, e.g. `get` for `#[get("/")]`.
    pub fn attr_name(self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
            HttpVerb::Patch => "patch",
            HttpVerb::Head => "head",
            HttpVerb::Options => "options",
            HttpVerb::Trace => "trace",
            HttpVerb::Connect => "connect",
        }
    }

    /// Upper-case method name; also the `MethodFilter` constant name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Trace => "TRACE",
            HttpVerb::Connect => "CONNECT",
        }
    }

    pub fn from_attr(attr: &syn::Attribute) -> Option<Self> {
        HttpVerb::ALL
            .into_iter()
            .find(|verb| attr.path().is_ident(verb.attr_name()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WsEvent {
    Connect,
    Disconnect,
    Error,
    Message,
    BinaryMessage,
}

impl WsEvent {
    pub const ALL: [WsEvent; 5] = [
        WsEvent::Connect,
        WsEvent::Message,
        WsEvent::BinaryMessage,
        WsEvent::Error,
        WsEvent::Disconnect,
    ];

    pub fn attr_name(self) -> &'static str {
        match self {
            WsEvent::Connect => "ws_connect",
            WsEvent::Disconnect => "ws_disconnect",
            WsEvent::Error => "ws_error",
            WsEvent::Message => "ws_message",
            WsEvent::BinaryMessage => "ws_binary_message",
        }
    }

    /// Short name used in handler names and the endpoint description.
    pub fn label(self) -> &'static str {
        match self {
            WsEvent::Connect => "connect",
            WsEvent::Disconnect => "disconnect",
            WsEvent::Error => "error",
            WsEvent::Message => "message",
            WsEvent::BinaryMessage => "binary_message",
        }
    }

    /// Runtime context type handed to the event's handler.
    pub fn context_type(self) -> &'static str {
        match self {
            WsEvent::Connect => "WsConnectContext",
            WsEvent::Disconnect => "WsDisconnectContext",
            WsEvent::Error => "WsErrorContext",
            WsEvent::Message => "WsMessageContext",
            WsEvent::BinaryMessage => "WsBinaryMessageContext",
        }
    }

    /// `WsEndpoint` builder method registering the event's handler.
    pub fn builder_method(self) -> &'static str {
        match self {
            WsEvent::Connect => "on_connect",
            WsEvent::Disconnect => "on_disconnect",
            WsEvent::Error => "on_error",
            WsEvent::Message => "on_message",
            WsEvent::BinaryMessage => "on_binary_message",
        }
    }

    pub fn from_attr(attr: &syn::Attribute) -> Option<Self> {
        WsEvent::ALL
            .into_iter()
            .find(|event| attr.path().is_ident(event.attr_name()))
    }

    pub fn is_context_type(name: &str) -> bool {
        WsEvent::ALL.iter().any(|e| e.context_type() == name)
    }
}

/// Source constraint declared on a parameter with `#[from(...)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceConstraint {
    Any,
    Header,
    Cookie,
    Path,
    Query,
    Message,
}

/// How many values a bound parameter takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `T`
    Scalar,
    /// `Option<T>`
    Optional,
    /// `Vec<T>` or `Vec<Option<T>>` (any `FromIterator` collection).
    Collection { nullable: bool },
    /// `Option<Vec<T>>` or `Option<Vec<Option<T>>>`.
    OptionalCollection { nullable: bool },
}

/// Resolved binding of one parameter.
pub struct BindingPlan {
    pub sources: Vec<Source>,
    pub key: String,
    pub arity: Arity,
    /// Type converted with `FromParam`.
    pub element: syn::Type,
    /// Collection type collected into, for collection arities.
    pub collection: Option<syn::Type>,
}

pub enum ParamRole {
    Bound(BindingPlan),
    /// `&HttpContext` or `&mut HttpContext`.
    Context { mutable: bool },
    /// `#[from_json]`: the request body, or the text of a WebSocket message.
    JsonBody(syn::Type),
    /// `&WsSession`.
    Session,
    /// `&Ws*Context` of the handler's own event.
    EventContext,
}

pub struct ParamDef {
    pub role: ParamRole,
    pub span: Span,
}

#[derive(Clone)]
pub enum Interceptor {
    /// Expression constructing the interceptor.
    Expr(syn::Expr),
    /// `inject = accessor`: resolved from the per-invocation injector.
    Inject(syn::Ident),
}

impl Interceptor {
    pub fn needs_injector(&self) -> bool {
        matches!(self, Interceptor::Inject(_))
    }
}

pub struct RouteBinding {
    pub verb: HttpVerb,
    /// Controller prefix joined with the method's template.
    pub full_path: String,
    pub span: Span,
}

pub struct ActionDef {
    pub ident: syn::Ident,
    /// Lines of the method's doc comment.
    pub docs: Vec<String>,
    pub routes: Vec<RouteBinding>,
    pub params: Vec<ParamDef>,
    pub ret: Classified,
    pub before: Vec<Interceptor>,
    pub after: Vec<Interceptor>,
}

pub struct WsHandlerDef {
    pub event: WsEvent,
    pub ident: syn::Ident,
    pub params: Vec<ParamDef>,
    pub ret: Classified,
}

pub struct ControllerDef {
    pub name: syn::Ident,
    pub self_ty: syn::Type,
    pub state: syn::Type,
    pub inject: Option<syn::Ident>,
    /// Full WebSocket path, prefix included.
    pub ws_path: Option<String>,
    pub actions: Vec<ActionDef>,
    pub ws_handlers: Vec<WsHandlerDef>,
    /// The impl block with every routing attribute stripped.
    pub item: syn::ItemImpl,
}

impl ControllerDef {
    pub fn has_endpoint(&self) -> bool {
        self.ws_path.is_some() && !self.ws_handlers.is_empty()
    }
}

/// Join a controller prefix and a route template.
pub fn join_path(prefix: &str, template: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let template = template.trim_start_matches('/');
    match (prefix.is_empty(), template.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{template}"),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{template}"),
    }
}
