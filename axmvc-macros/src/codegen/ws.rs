//! WebSocket endpoint generation.
//!
//! Each lifecycle method becomes an `async fn(State, Ws*Context)` and the
//! endpoint handler wires them into a `WsEndpoint` per upgrade request.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::binding::{generate_arguments, Site};
use super::http::invoke;
use crate::model::{ControllerDef, WsHandlerDef};

pub fn endpoint_name(def: &ControllerDef) -> syn::Ident {
    format_ident!("__axmvc_ws_{}", def.name)
}

fn event_fn_name(def: &ControllerDef, handler: &WsHandlerDef) -> syn::Ident {
    format_ident!("__axmvc_ws_{}_{}", def.name, handler.event.label())
}

fn generate_event_fn(def: &ControllerDef, handler: &WsHandlerDef, krate: &TokenStream) -> TokenStream {
    let state = &def.state;
    let name = event_fn_name(def, handler);
    let method = &handler.ident;
    let context = format_ident!("{}", handler.event.context_type());
    let acquire = super::acquire_controller(def, krate, false);

    let args = generate_arguments(&handler.params, Site::Ws(handler.event), krate);
    let bind = &args.bind;
    let call_args = &args.call;
    let execute = invoke(
        quote!(__ctrl.#method(#(#call_args),*)),
        &handler.ret,
        quote!(__ctx.session()),
        quote!(#krate::ws::WsActionResult),
        quote!(#krate::__private::dispatch::{WsActionKind as _, WsValueKind as _}),
    );

    quote! {
        #[allow(non_snake_case)]
        async fn #name(
            __state: #state,
            __ctx: #krate::ws::#context,
        ) -> ::core::result::Result<(), #krate::error::HttpError> {
            #acquire
            #bind
            #execute
            Ok(())
        }
    }
}

/// Event functions and the upgrade handler; empty when the controller has
/// no socket path or no lifecycle methods.
pub fn generate_endpoint(def: &ControllerDef, krate: &TokenStream) -> TokenStream {
    if !def.has_endpoint() {
        return TokenStream::new();
    }
    let state = &def.state;
    let endpoint = endpoint_name(def);
    let event_fns = def.ws_handlers.iter().map(|h| generate_event_fn(def, h, krate));
    let registrations = def.ws_handlers.iter().map(|h| {
        let builder = format_ident!("{}", h.event.builder_method());
        let name = event_fn_name(def, h);
        quote!(.#builder(#name))
    });

    quote! {
        #(#event_fns)*

        #[allow(non_snake_case)]
        async fn #endpoint(
            #krate::http::State(__state): #krate::http::State<#state>,
            __request: #krate::http::Request,
        ) -> #krate::http::Response {
            #krate::ws::WsEndpoint::<#state>::new()
                #(#registrations)*
                .accept(__state, __request)
                .await
        }
    }
}
