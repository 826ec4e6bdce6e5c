//! Before/after interceptor chains around an action.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::model::{ActionDef, ControllerDef, Interceptor};

pub struct Chain {
    /// `let __before_<n> = ..;` / `let __after_<n> = ..;`
    pub instances: TokenStream,
    /// Runs the before-interceptors; returns the rendered error on the first failure.
    pub before: TokenStream,
    /// Consumes `__outcome` and returns early if an error survives the after-interceptors.
    pub after: TokenStream,
}

fn instance(interceptor: &Interceptor) -> TokenStream {
    match interceptor {
        Interceptor::Expr(expr) => quote!(#expr),
        Interceptor::Inject(accessor) => quote!(__injector.#accessor()),
    }
}

pub fn generate_chain(def: &ControllerDef, action: &ActionDef, krate: &TokenStream) -> Chain {
    let state = &def.state;
    let controller = def.name.to_string();
    let action_name = action.ident.to_string();
    let tracing = quote!(#krate::__private::tracing);

    let before_names: Vec<_> = (0..action.before.len()).map(|i| format_ident!("__before_{}", i)).collect();
    let after_names: Vec<_> = (0..action.after.len()).map(|i| format_ident!("__after_{}", i)).collect();
    let before_values = action.before.iter().map(instance);
    let after_values = action.after.iter().map(instance);
    let instances = quote! {
        #(let #before_names = #before_values;)*
        #(let #after_names = #after_values;)*
    };

    let before = if before_names.is_empty() {
        TokenStream::new()
    } else {
        quote! {
            {
                let mut __bctx = #krate::interceptors::BeforeContext::new(
                    &mut __ctx,
                    &__state,
                    #controller,
                    #action_name,
                );
                #(
                    if let Err(__error) =
                        #krate::interceptors::BeforeAction::<#state>::before(&#before_names, &mut __bctx).await
                    {
                        #tracing::debug!(
                            controller = #controller,
                            action = #action_name,
                            error = %__error,
                            "before-interceptor halted dispatch"
                        );
                        return #krate::http::IntoResponse::into_response(__error);
                    }
                )*
            }
        }
    };

    let after = if after_names.is_empty() {
        quote! {
            if let Err(__error) = __outcome {
                #tracing::debug!(controller = #controller, action = #action_name, error = %__error, "action failed");
                return #krate::http::IntoResponse::into_response(__error);
            }
        }
    } else {
        quote! {
            let __remaining = {
                let mut __actx = #krate::interceptors::AfterContext::new(
                    &mut __ctx,
                    &__state,
                    #controller,
                    #action_name,
                    __outcome.err(),
                );
                #(
                    #krate::interceptors::AfterAction::<#state>::after(&#after_names, &mut __actx).await;
                )*
                __actx.into_error()
            };
            if let Some(__error) = __remaining {
                #tracing::warn!(controller = #controller, action = #action_name, error = %__error, "error left after interceptors");
                return #krate::http::IntoResponse::into_response(__error);
            }
        }
    };

    Chain {
        instances,
        before,
        after,
    }
}
