//! Axum handler generation for HTTP actions.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::binding::{generate_arguments, Site};
use super::interceptors::generate_chain;
use crate::model::{ActionDef, ControllerDef};
use crate::return_shape::{Classified, ReturnShape};

pub fn handler_name(def: &ControllerDef, action: &ActionDef) -> syn::Ident {
    format_ident!("__axmvc_{}_{}", def.name, action.ident)
}

/// Invoke `call` and execute its result the way its shape requires.
///
/// Known actions are executed through `action_trait` against `execute_with`.
/// Other results go through the dispatch traits named in `kinds`, which
/// prefer the action trait over JSON serialization.
pub fn invoke(
    call: TokenStream,
    ret: &Classified,
    execute_with: TokenStream,
    action_trait: TokenStream,
    kinds: TokenStream,
) -> TokenStream {
    let awaited = ret.awaited.then(|| quote!(.await));
    let fallible = ret.fallible.then(|| quote!(?));
    match ret.shape {
        ReturnShape::Void => quote! {
            #call #awaited #fallible;
        },
        ReturnShape::SyncAction | ReturnShape::AsyncAction => quote! {
            let __result = #call #awaited #fallible;
            #action_trait::execute(__result, #execute_with)?;
        },
        ReturnShape::SyncValue | ReturnShape::AsyncValue => quote! {
            let __result = #call #awaited #fallible;
            {
                use #kinds;
                (&__result).__axmvc_kind().execute(__result, #execute_with)?;
            }
        },
    }
}

fn generate_handler(def: &ControllerDef, action: &ActionDef, krate: &TokenStream) -> TokenStream {
    let state = &def.state;
    let handler = handler_name(def, action);
    let method = &action.ident;
    let controller = def.name.to_string();
    let action_name = method.to_string();

    let needs_injector = action
        .before
        .iter()
        .chain(action.after.iter())
        .any(|i| i.needs_injector());
    let acquire = super::acquire_controller(def, krate, needs_injector);
    let chain = generate_chain(def, action, krate);
    let (instances, before, after) = (&chain.instances, &chain.before, &chain.after);

    let args = generate_arguments(&action.params, Site::Http, krate);
    let bind = &args.bind;
    let call_args = &args.call;
    let execute = invoke(
        quote!(__ctrl.#method(#(#call_args),*)),
        &action.ret,
        quote!(&mut __ctx),
        quote!(#krate::results::ActionResult),
        quote!(#krate::__private::dispatch::{ActionKind as _, ValueKind as _}),
    );

    quote! {
        #[allow(non_snake_case)]
        async fn #handler(
            #krate::http::State(__state): #krate::http::State<#state>,
            __request: #krate::http::Request,
        ) -> #krate::http::Response {
            #[allow(unused_mut)]
            let mut __ctx = match #krate::context::HttpContext::from_request(__request, &__state).await {
                Ok(__ctx) => __ctx,
                Err(__error) => return #krate::http::IntoResponse::into_response(__error),
            };
            #krate::__private::tracing::debug!(
                controller = #controller,
                action = #action_name,
                method = %__ctx.request().method(),
                uri = %__ctx.request().uri(),
                "dispatching"
            );
            #acquire
            #instances
            #before
            let __outcome = async {
                #bind
                #execute
                Ok::<(), #krate::error::HttpError>(())
            }
            .await;
            #after
            __ctx.into_response()
        }
    }
}

/// Generate one handler per action.
pub fn generate_handlers(def: &ControllerDef, krate: &TokenStream) -> TokenStream {
    let handlers = def.actions.iter().map(|a| generate_handler(def, a, krate));
    quote! { #(#handlers)* }
}
