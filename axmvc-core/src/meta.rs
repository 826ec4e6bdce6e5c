use serde::Serialize;

use crate::binding::Source;

/// A bound parameter of a route, as the request offers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamInfo {
    pub name: &'static str,
    /// First source consulted for this route.
    pub source: Source,
    pub required: bool,
    /// Bound into a collection; the key may repeat.
    pub repeated: bool,
}

impl ParamInfo {
    pub const fn new(name: &'static str, source: Source, required: bool, repeated: bool) -> Self {
        Self {
            name,
            source,
            required,
            repeated,
        }
    }
}

/// One registered HTTP route, as reported by [`Controller::route_table`](crate::Controller::route_table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub controller: &'static str,
    pub action: &'static str,
    /// First line of the action's doc comment.
    pub summary: Option<&'static str>,
    /// Rest of the doc comment.
    pub description: Option<&'static str>,
    pub params: Vec<ParamInfo>,
    /// The action reads a JSON request body.
    pub json_body: bool,
}

impl RouteInfo {
    pub const fn new(
        method: &'static str,
        path: &'static str,
        controller: &'static str,
        action: &'static str,
    ) -> Self {
        Self {
            method,
            path,
            controller,
            action,
            summary: None,
            description: None,
            params: Vec::new(),
            json_body: false,
        }
    }

    pub fn with_docs(mut self, summary: Option<&'static str>, description: Option<&'static str>) -> Self {
        self.summary = summary;
        self.description = description;
        self
    }

    pub fn with_params(mut self, params: Vec<ParamInfo>) -> Self {
        self.params = params;
        self
    }

    pub fn with_json_body(mut self) -> Self {
        self.json_body = true;
        self
    }
}

/// A controller's WebSocket endpoint and the lifecycle events it handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointInfo {
    pub path: &'static str,
    pub controller: &'static str,
    pub events: Vec<&'static str>,
}

impl EndpointInfo {
    pub fn new(path: &'static str, controller: &'static str, events: Vec<&'static str>) -> Self {
        Self {
            path,
            controller,
            events,
        }
    }
}
