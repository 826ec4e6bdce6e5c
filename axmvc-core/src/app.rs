use crate::container::Container;
use crate::controller::Controller;
use crate::http::routing::get;
use crate::http::{Json, Router};
use crate::layers::default_trace;
use crate::meta::{EndpointInfo, RouteInfo};
use crate::openapi::{self, OpenApiConfig};

/// Assembles controllers into an Axum router.
///
/// ```ignore
/// let app = MvcApp::new(services)
///     .register::<UserController>()
///     .register::<ChatController>()
///     .with_trace();
/// app.serve("0.0.0.0:3000").await?;
/// ```
pub struct MvcApp<S: Container> {
    state: S,
    router: Router<S>,
    routes: Vec<RouteInfo>,
    endpoints: Vec<EndpointInfo>,
    trace: bool,
    openapi: Option<(String, OpenApiConfig)>,
}

impl<S: Container> MvcApp<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            router: Router::new(),
            routes: Vec::new(),
            endpoints: Vec::new(),
            trace: false,
            openapi: None,
        }
    }

    /// Mount a controller's routes and WebSocket endpoint.
    pub fn register<C: Controller<S>>(mut self) -> Self {
        let table = C::route_table();
        let endpoint = C::endpoint();
        tracing::info!(
            controller = std::any::type_name::<C>(),
            routes = table.len(),
            websocket = endpoint.as_ref().map(|e| e.path).unwrap_or("-"),
            "registered controller"
        );
        self.router = self.router.merge(C::routes());
        self.routes.extend(table);
        self.endpoints.extend(endpoint);
        self
    }

    /// Wrap the router in [`default_trace`].
    pub fn with_trace(mut self) -> Self {
        self.trace = true;
        self
    }

    /// Serve an OpenAPI document of every registered route at `path`.
    pub fn with_openapi(mut self, path: impl Into<String>, config: OpenApiConfig) -> Self {
        self.openapi = Some((path.into(), config));
        self
    }

    /// Every route registered so far.
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    pub fn endpoints(&self) -> &[EndpointInfo] {
        &self.endpoints
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn build(self) -> Router {
        let mut router = self.router;
        if let Some((path, config)) = &self.openapi {
            let document = openapi::build_document(config, &self.routes);
            tracing::debug!(path = %path, "serving OpenAPI document");
            router = router.route(path, get(move || std::future::ready(Json(document.clone()))));
        }
        let router = router.with_state(self.state);
        if self.trace {
            router.layer(default_trace())
        } else {
            router
        }
    }

    /// Bind `addr` and serve until the process stops.
    pub async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, routes = self.routes.len(), "listening");
        axum::serve(listener, self.build()).await?;
        Ok(())
    }
}
