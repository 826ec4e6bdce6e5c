//! OpenAPI 3.1 document built from the registered route table.
//!
//! Operations carry the action's doc comment as summary and description,
//! and one parameter per bound value. Value types are not introspected, so
//! parameter and body schemas stay open.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::meta::RouteInfo;

pub struct OpenApiConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

impl OpenApiConfig {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// `{*rest}` wildcards become plain `{rest}` template expressions.
fn openapi_path(path: &str) -> String {
    path.replace("{*", "{")
}

fn operation(route: &RouteInfo, operation_id: String) -> Value {
    let mut op = Map::new();
    op.insert("operationId".into(), json!(operation_id));
    op.insert("tags".into(), json!([route.controller]));
    if let Some(summary) = route.summary {
        op.insert("summary".into(), json!(summary));
    }
    if let Some(description) = route.description {
        op.insert("description".into(), json!(description));
    }

    let params: Vec<Value> = route
        .params
        .iter()
        .map(|p| {
            let schema = if p.repeated {
                json!({ "type": "array", "items": {} })
            } else {
                json!({})
            };
            json!({
                "name": p.name,
                "in": p.source,
                "required": p.required,
                "schema": schema,
            })
        })
        .collect();
    if !params.is_empty() {
        op.insert("parameters".into(), Value::Array(params));
    }

    if route.json_body {
        op.insert(
            "requestBody".into(),
            json!({
                "required": true,
                "content": { "application/json": { "schema": {} } }
            }),
        );
    }
    op.insert(
        "responses".into(),
        json!({
            "200": { "description": "Successful response" },
            "400": { "description": "Parameter binding failed" }
        }),
    );
    Value::Object(op)
}

/// Build the document for `routes`. An action mounted on several routes
/// gets a numbered operation id for every route after the first.
pub fn build_document(config: &OpenApiConfig, routes: &[RouteInfo]) -> Value {
    let mut paths = Map::new();
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();

    for route in routes {
        let count = seen.entry((route.controller, route.action)).or_default();
        *count += 1;
        let operation_id = match *count {
            1 => format!("{}_{}", route.controller, route.action),
            n => format!("{}_{}_{n}", route.controller, route.action),
        };
        let entry = paths
            .entry(openapi_path(route.path))
            .or_insert_with(|| json!({}));
        if let Value::Object(methods) = entry {
            methods.insert(route.method.to_lowercase(), operation(route, operation_id));
        }
    }

    let mut info = Map::new();
    info.insert("title".into(), json!(config.title));
    info.insert("version".into(), json!(config.version));
    if let Some(description) = &config.description {
        info.insert("description".into(), json!(description));
    }

    json!({
        "openapi": "3.1.0",
        "info": info,
        "paths": paths,
    })
}
