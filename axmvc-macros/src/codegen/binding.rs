//! Per-parameter binding expressions.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::model::{Arity, BindingPlan, ParamDef, ParamRole, WsEvent};
use crate::value_source::Source;

/// Where the generated code binds from.
#[derive(Clone, Copy)]
pub enum Site {
    /// `__ctx` is an `HttpContext`.
    Http,
    /// `__ctx` is the event's WebSocket context.
    Ws(WsEvent),
}

/// Binding statements plus the argument list of the controller call.
pub struct Arguments {
    /// Binds every value parameter to `__arg_<n>`. Evaluated inside a
    /// `Result<_, HttpError>` scope.
    pub bind: TokenStream,
    pub call: Vec<TokenStream>,
}

pub fn generate_arguments(params: &[ParamDef], site: Site, krate: &TokenStream) -> Arguments {
    let mut names = Vec::new();
    let mut values = Vec::new();
    let mut call = Vec::new();
    let mut uses_message = false;

    for (index, param) in params.iter().enumerate() {
        let name = format_ident!("__arg_{}", index, span = param.span);
        let value = match &param.role {
            ParamRole::Bound(plan) => {
                uses_message |= plan.sources.contains(&Source::Message);
                bind_expr(plan, krate)
            }
            ParamRole::JsonBody(ty) => match site {
                Site::Http => quote!(__ctx.body_json::<#ty>()?),
                Site::Ws(_) => quote!(__ctx.message_as::<#ty>()?),
            },
            ParamRole::Context { mutable: true } => {
                call.push(quote!(&mut __ctx));
                continue;
            }
            ParamRole::Context { mutable: false } | ParamRole::EventContext => {
                call.push(quote!(&__ctx));
                continue;
            }
            ParamRole::Session => {
                call.push(quote!(__ctx.session()));
                continue;
            }
        };
        call.push(quote!(#name));
        names.push(name);
        values.push(value);
    }

    if names.is_empty() {
        return Arguments {
            bind: TokenStream::new(),
            call,
        };
    }

    let needs_binder = params.iter().any(|p| matches!(p.role, ParamRole::Bound(_)));
    let request = match site {
        Site::Http => quote!(__ctx.request()),
        Site::Ws(_) => quote!(__ctx.session().request()),
    };
    let binder = match (needs_binder, uses_message) {
        (false, _) => TokenStream::new(),
        (true, false) => quote! {
            let __binder = #krate::binding::DefaultModelBinder::new(#request);
        },
        (true, true) => quote! {
            let __message = __ctx.message_value()?;
            let __binder = #krate::binding::DefaultModelBinder::new(#request).with_message(&__message);
        },
    };

    let bind = quote! {
        let (#(#names,)*) = {
            #binder
            (#(#values,)*)
        };
    };
    Arguments { bind, call }
}

/// Expression binding one parameter against `__binder`.
fn bind_expr(plan: &BindingPlan, krate: &TokenStream) -> TokenStream {
    let binder = quote!(#krate::binding::ModelBinder);
    let sources = plan.sources.iter().map(|s| s.tokens(krate));
    let sources = quote!(&[#(#sources),*]);
    let key = &plan.key;
    let element = &plan.element;
    let many = |nullable: bool| {
        if nullable {
            quote!(bind_nullable_many)
        } else {
            quote!(bind_many)
        }
    };
    let collection = &plan.collection;

    match plan.arity {
        Arity::Scalar => quote! {
            #binder::bind_required::<#element>(&__binder, #sources, #key)?
        },
        Arity::Optional => quote! {
            #binder::bind_optional::<#element>(&__binder, #sources, #key)?
        },
        Arity::Collection { nullable } => {
            let many = many(nullable);
            quote! {
                #binder::#many::<#element>(&__binder, #sources, #key)?
                    .unwrap_or_default()
                    .into_iter()
                    .collect::<#collection>()
            }
        }
        Arity::OptionalCollection { nullable } => {
            let many = many(nullable);
            quote! {
                #binder::#many::<#element>(&__binder, #sources, #key)?
                    .map(|__values| __values.into_iter().collect::<#collection>())
            }
        }
    }
}
