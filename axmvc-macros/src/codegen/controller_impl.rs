//! `Controller<State>` implementation: router registration and route table.

use std::collections::BTreeMap;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::http::handler_name;
use super::ws::endpoint_name;
use crate::model::{ActionDef, Arity, ControllerDef, ParamRole, RouteBinding};
use crate::value_source::{template_params, Source};

/// First non-empty doc line, then the rest as the description.
fn summary_and_description(docs: &[String]) -> (Option<String>, Option<String>) {
    let mut lines = docs.iter().map(String::as_str).skip_while(|l| l.is_empty());
    let summary = lines.next().map(str::to_owned);
    let rest: Vec<&str> = lines.collect();
    let description = rest.join("\n").trim().to_owned();
    (summary, Some(description).filter(|d| !d.is_empty()))
}

/// The source a bound parameter is documented under on `route`: the path
/// when the route captures it, otherwise the first other source it accepts.
fn documented_source(sources: &[Source], key: &str, route: &RouteBinding) -> Source {
    let captured = template_params(&route.full_path).iter().any(|p| p == key);
    if captured && sources.contains(&Source::Path) {
        return Source::Path;
    }
    sources
        .iter()
        .copied()
        .find(|s| *s != Source::Path)
        .unwrap_or(Source::Path)
}

fn route_info(
    krate: &TokenStream,
    controller: &str,
    action: &ActionDef,
    route: &RouteBinding,
) -> TokenStream {
    let verb = route.verb.as_str();
    let path = &route.full_path;
    let action_name = action.ident.to_string();
    let mut info = quote!(#krate::meta::RouteInfo::new(#verb, #path, #controller, #action_name));

    if let (Some(summary), description) = summary_and_description(&action.docs) {
        let description = match description {
            Some(d) => quote!(::core::option::Option::Some(#d)),
            None => quote!(::core::option::Option::None),
        };
        info.extend(quote!(.with_docs(::core::option::Option::Some(#summary), #description)));
    }

    let params: Vec<TokenStream> = action
        .params
        .iter()
        .filter_map(|p| match &p.role {
            ParamRole::Bound(plan) => Some(plan),
            _ => None,
        })
        .map(|plan| {
            let key = &plan.key;
            let source = documented_source(&plan.sources, key, route).tokens(krate);
            let required = matches!(plan.arity, Arity::Scalar);
            let repeated = matches!(
                plan.arity,
                Arity::Collection { .. } | Arity::OptionalCollection { .. }
            );
            quote!(#krate::meta::ParamInfo::new(#key, #source, #required, #repeated))
        })
        .collect();
    if !params.is_empty() {
        info.extend(quote!(.with_params(vec![#(#params),*])));
    }

    if action.params.iter().any(|p| matches!(p.role, ParamRole::JsonBody(_))) {
        info.extend(quote!(.with_json_body()));
    }
    info
}

pub fn generate_controller_impl(def: &ControllerDef, krate: &TokenStream) -> TokenStream {
    let state = &def.state;
    let self_ty = &def.self_ty;
    let controller = def.name.to_string();

    // Group by path so every verb on a path shares one `MethodRouter`.
    let mut by_path: BTreeMap<&str, Vec<TokenStream>> = BTreeMap::new();
    let mut table = Vec::new();
    for action in &def.actions {
        let handler = handler_name(def, action);
        for route in &action.routes {
            let filter = format_ident!("{}", route.verb.as_str());
            by_path
                .entry(route.full_path.as_str())
                .or_default()
                .push(quote!(#krate::http::routing::MethodFilter::#filter, #handler));
            table.push(route_info(krate, &controller, action, route));
        }
    }

    let registrations = by_path.iter().filter_map(|(path, handlers)| {
        let (first, rest) = handlers.split_first()?;
        Some(quote! {
            .route(#path, #krate::http::routing::on(#first) #(.on(#rest))*)
        })
    });

    let (ws_route, endpoint_info) = match (&def.ws_path, def.has_endpoint()) {
        (Some(path), true) => {
            let endpoint = endpoint_name(def);
            let events = def.ws_handlers.iter().map(|h| h.event.label());
            (
                quote!(.route(#path, #krate::http::routing::get(#endpoint))),
                quote! {
                    ::core::option::Option::Some(#krate::meta::EndpointInfo::new(
                        #path,
                        #controller,
                        vec![#(#events),*],
                    ))
                },
            )
        }
        _ => (TokenStream::new(), quote!(::core::option::Option::None)),
    };

    quote! {
        impl #krate::controller::Controller<#state> for #self_ty {
            fn routes() -> #krate::http::Router<#state> {
                #krate::http::Router::new()
                    #(#registrations)*
                    #ws_route
            }

            fn route_table() -> ::std::vec::Vec<#krate::meta::RouteInfo> {
                vec![#(#table),*]
            }

            fn endpoint() -> ::core::option::Option<#krate::meta::EndpointInfo> {
                #endpoint_info
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HttpVerb;
    use proc_macro2::Span;

    fn route(path: &str) -> RouteBinding {
        RouteBinding {
            verb: HttpVerb::Get,
            full_path: path.to_string(),
            span: Span::call_site(),
        }
    }

    #[test]
    fn doc_comment_splits_into_summary_and_description() {
        let docs: Vec<String> = ["", "Show one user.", "", "Looks the user up", "by id."]
            .iter()
            .map(|l| l.to_string())
            .collect();
        let (summary, description) = summary_and_description(&docs);
        assert_eq!(summary.as_deref(), Some("Show one user."));
        assert_eq!(description.as_deref(), Some("Looks the user up\nby id."));
        assert_eq!(summary_and_description(&docs[..2]).1, None);
        assert_eq!(summary_and_description(&[]), (None, None));
    }

    #[test]
    fn captured_keys_are_documented_as_path() {
        let any = [Source::Path, Source::Query, Source::Header, Source::Cookie];
        assert_eq!(documented_source(&any, "id", &route("/users/{id}")), Source::Path);
        assert_eq!(documented_source(&any, "id", &route("/users")), Source::Query);
        assert_eq!(documented_source(&[Source::Header], "token", &route("/")), Source::Header);
    }
}
