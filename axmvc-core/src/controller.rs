use crate::http::Router;
use crate::meta::{EndpointInfo, RouteInfo};

/// Implemented by `#[routes]` for every annotated controller.
pub trait Controller<S: Clone + Send + Sync + 'static> {
    /// Axum routes for every action and the WebSocket endpoint.
    fn routes() -> Router<S>;

    /// The `(verb, path)` pairs registered by [`routes`](Controller::routes).
    fn route_table() -> Vec<RouteInfo>;

    fn endpoint() -> Option<EndpointInfo> {
        None
    }
}
