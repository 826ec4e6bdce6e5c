//! Code generation for a parsed `#[routes]` impl block.

mod binding;
mod controller_impl;
mod http;
mod interceptors;
mod ws;

use proc_macro2::TokenStream;
use quote::quote;

use crate::crate_path::axmvc_core_path;
use crate::model::ControllerDef;

/// The impl block, its dispatch functions and the `Controller` impl.
pub fn generate(def: &ControllerDef) -> TokenStream {
    let krate = axmvc_core_path();
    let item = &def.item;
    let handlers = http::generate_handlers(def, &krate);
    let endpoint = ws::generate_endpoint(def, &krate);
    let controller = controller_impl::generate_controller_impl(def, &krate);

    quote! {
        #item
        #handlers
        #endpoint
        #controller
    }
}

/// Statements that obtain the injector (when `needs_injector`) and bind
/// `__ctrl` to a fresh controller instance.
fn acquire_controller(def: &ControllerDef, krate: &TokenStream, needs_injector: bool) -> TokenStream {
    let state = &def.state;
    let self_ty = &def.self_ty;
    let injector = if needs_injector || def.inject.is_some() {
        quote! {
            let __injector = <#state as #krate::container::Container>::injector(&__state);
        }
    } else {
        TokenStream::new()
    };
    let construct = match &def.inject {
        Some(accessor) => quote!(__injector.#accessor()),
        None => quote!(<#self_ty as ::core::default::Default>::default()),
    };
    quote! {
        #injector
        #[allow(unused_mut)]
        let mut __ctrl: #self_ty = #construct;
    }
}
