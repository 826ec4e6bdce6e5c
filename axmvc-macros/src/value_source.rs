//! Compile-time resolution of where a bound parameter's value comes from.
//!
//! `Any` looks in the path (only when a template captures the key), then
//! the query string, then headers, then cookies. Inside a WebSocket
//! message handler, `Any` means the JSON message body and nothing else.

use proc_macro2::{Span, TokenStream};
use quote::quote;

use crate::model::{SourceConstraint, WsEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Path,
    Query,
    Header,
    Cookie,
    Message,
}

impl Source {
    pub fn tokens(self, krate: &TokenStream) -> TokenStream {
        let variant = match self {
            Source::Path => quote!(Path),
            Source::Query => quote!(Query),
            Source::Header => quote!(Header),
            Source::Cookie => quote!(Cookie),
            Source::Message => quote!(Message),
        };
        quote!(#krate::binding::Source::#variant)
    }
}

impl SourceConstraint {
    pub fn from_ident(ident: &syn::Ident) -> syn::Result<Self> {
        let constraint = match ident.to_string().as_str() {
            "any" => SourceConstraint::Any,
            "header" => SourceConstraint::Header,
            "cookie" => SourceConstraint::Cookie,
            "path" => SourceConstraint::Path,
            "query" => SourceConstraint::Query,
            "message" => SourceConstraint::Message,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "unknown value source; expected one of `any`, `path`, `query`, `header`, `cookie`, `message`",
                ))
            }
        };
        Ok(constraint)
    }
}

/// Where a parameter is bound.
pub enum BindingContext<'a> {
    /// An HTTP action with its full route paths.
    Http { paths: &'a [String] },
    /// A WebSocket lifecycle handler and the endpoint's full path.
    Ws { event: WsEvent, path: &'a str },
}

/// Names captured by `{name}` / `{*name}` segments of a route template.
pub fn template_params(template: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let name = rest[start + 1..start + len].trim_start_matches('*');
        if !name.is_empty() {
            params.push(name.to_string());
        }
        rest = &rest[start + len + 1..];
    }
    params
}

fn captures(path: &str, key: &str) -> bool {
    template_params(path).iter().any(|p| p == key)
}

const HTTP_ORDER: [Source; 4] = [Source::Path, Source::Query, Source::Header, Source::Cookie];

/// Resolve the ordered sources for `key` under `constraint`.
pub fn resolve(
    constraint: SourceConstraint,
    key: &str,
    context: &BindingContext<'_>,
    span: Span,
) -> syn::Result<Vec<Source>> {
    let paths: Vec<&str> = match context {
        BindingContext::Http { paths } => paths.iter().map(String::as_str).collect(),
        BindingContext::Ws { path, .. } => vec![*path],
    };
    let message_event = matches!(
        context,
        BindingContext::Ws {
            event: WsEvent::Message,
            ..
        }
    );

    match constraint {
        SourceConstraint::Any if message_event => Ok(vec![Source::Message]),
        SourceConstraint::Any => {
            let path_captures = paths.iter().any(|p| captures(p, key));
            Ok(HTTP_ORDER
                .into_iter()
                .filter(|s| *s != Source::Path || path_captures)
                .collect())
        }
        SourceConstraint::Path => {
            if let Some(missing) = paths.iter().find(|p| !captures(p, key)) {
                return Err(syn::Error::new(
                    span,
                    format!("`{key}` is bound from the path, but `{missing}` has no `{{{key}}}` segment"),
                ));
            }
            Ok(vec![Source::Path])
        }
        SourceConstraint::Query => Ok(vec![Source::Query]),
        SourceConstraint::Header => Ok(vec![Source::Header]),
        SourceConstraint::Cookie => Ok(vec![Source::Cookie]),
        SourceConstraint::Message if message_event => Ok(vec![Source::Message]),
        SourceConstraint::Message => Err(syn::Error::new(
            span,
            "`message` values are only available in #[ws_message] handlers",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(paths: &[&str], constraint: SourceConstraint, key: &str) -> syn::Result<Vec<Source>> {
        let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        resolve(constraint, key, &BindingContext::Http { paths: &paths }, Span::call_site())
    }

    #[test]
    fn template_params_handles_wildcards() {
        assert_eq!(template_params("/users/{id}/files/{*rest}"), vec!["id", "rest"]);
        assert!(template_params("/plain").is_empty());
    }

    #[test]
    fn any_includes_path_only_when_captured() {
        assert_eq!(
            http(&["/users/{id}"], SourceConstraint::Any, "id").unwrap(),
            vec![Source::Path, Source::Query, Source::Header, Source::Cookie]
        );
        assert_eq!(
            http(&["/users"], SourceConstraint::Any, "id").unwrap(),
            vec![Source::Query, Source::Header, Source::Cookie]
        );
    }

    #[test]
    fn any_includes_path_when_some_route_captures() {
        let sources = http(&["/items", "/items/{id}"], SourceConstraint::Any, "id").unwrap();
        assert_eq!(sources[0], Source::Path);
    }

    #[test]
    fn explicit_path_needs_every_route_to_capture() {
        assert_eq!(
            http(&["/users/{id}"], SourceConstraint::Path, "id").unwrap(),
            vec![Source::Path]
        );
        assert!(http(&["/items", "/items/{id}"], SourceConstraint::Path, "id").is_err());
    }

    #[test]
    fn message_is_exclusive_to_message_handlers() {
        let ctx = BindingContext::Ws { event: WsEvent::Message, path: "/chat/{room}" };
        assert_eq!(
            resolve(SourceConstraint::Any, "room", &ctx, Span::call_site()).unwrap(),
            vec![Source::Message]
        );
        assert!(http(&["/"], SourceConstraint::Message, "text").is_err());
        let connect = BindingContext::Ws { event: WsEvent::Connect, path: "/chat/{room}" };
        assert!(resolve(SourceConstraint::Message, "text", &connect, Span::call_site()).is_err());
    }

    #[test]
    fn other_ws_events_use_the_upgrade_request() {
        let ctx = BindingContext::Ws { event: WsEvent::Connect, path: "/chat/{room}" };
        assert_eq!(
            resolve(SourceConstraint::Any, "room", &ctx, Span::call_site()).unwrap(),
            vec![Source::Path, Source::Query, Source::Header, Source::Cookie]
        );
        assert_eq!(
            resolve(SourceConstraint::Header, "x-user", &ctx, Span::call_site()).unwrap(),
            vec![Source::Header]
        );
    }
}
