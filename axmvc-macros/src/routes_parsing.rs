use proc_macro2::{Span, TokenStream};
use quote::ToTokens;
use syn::ext::IdentExt;
use syn::spanned::Spanned;

use crate::model::*;
use crate::return_shape::{classify, ResultKind};
use crate::value_source::{resolve, BindingContext};

/// Arguments of `#[routes(state = S, path = "/api", inject = accessor, ws = "/chat")]`.
#[derive(Default)]
pub struct RoutesArgs {
    pub state: Option<syn::Type>,
    pub path: Option<syn::LitStr>,
    pub inject: Option<syn::Ident>,
    pub ws: Option<syn::LitStr>,
}

impl RoutesArgs {
    pub fn parse(tokens: TokenStream) -> syn::Result<Self> {
        let mut args = RoutesArgs::default();
        let parser = syn::meta::parser(|meta| {
            if meta.path.is_ident("state") {
                args.state = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("path") {
                args.path = Some(absolute_path(meta.value()?.parse()?, true)?);
            } else if meta.path.is_ident("inject") {
                args.inject = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("ws") {
                args.ws = Some(absolute_path(meta.value()?.parse()?, false)?);
            } else {
                return Err(meta.error(
                    "unknown `routes` argument; expected `state`, `path`, `inject` or `ws`",
                ));
            }
            Ok(())
        });
        syn::parse::Parser::parse2(parser, tokens)?;
        Ok(args)
    }
}

fn absolute_path(lit: syn::LitStr, allow_empty: bool) -> syn::Result<syn::LitStr> {
    let value = lit.value();
    if (allow_empty && value.is_empty()) || value.starts_with('/') {
        Ok(lit)
    } else {
        Err(syn::Error::new_spanned(lit, "paths must start with `/`"))
    }
}

/// Accumulates errors so one expansion reports every problem at once.
#[derive(Default)]
struct Errors(Option<syn::Error>);

impl Errors {
    fn push(&mut self, error: syn::Error) {
        match &mut self.0 {
            Some(existing) => existing.combine(error),
            None => self.0 = Some(error),
        }
    }

    fn check<T>(&mut self, result: syn::Result<T>) -> Option<T> {
        result.map_err(|e| self.push(e)).ok()
    }

    fn finish(self) -> syn::Result<()> {
        self.0.map_or(Ok(()), Err)
    }
}

fn is_interceptor_attr(attr: &syn::Attribute) -> bool {
    attr.path().is_ident("before") || attr.path().is_ident("after")
}

fn is_routing_attr(attr: &syn::Attribute) -> bool {
    HttpVerb::from_attr(attr).is_some()
        || WsEvent::from_attr(attr).is_some()
        || is_interceptor_attr(attr)
        || attr.path().is_ident("action")
}

/// Text of `///` comments, one entry per line.
fn doc_lines(attrs: &[syn::Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .filter_map(|a| match &a.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value:
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(text),
                        ..
                    }),
                ..
            }) => Some(text.value()),
            _ => None,
        })
        .flat_map(|text| text.lines().map(|l| l.trim().to_string()).collect::<Vec<_>>())
        .collect()
}

fn is_param_attr(attr: &syn::Attribute) -> bool {
    attr.path().is_ident("from") || attr.path().is_ident("named") || attr.path().is_ident("from_json")
}

/// `#[before(Expr)]` or `#[before(inject = accessor)]`, in declaration order.
fn extract_interceptors(attrs: &[syn::Attribute], name: &str) -> syn::Result<Vec<Interceptor>> {
    attrs
        .iter()
        .filter(|a| a.path().is_ident(name))
        .map(|a| {
            let expr: syn::Expr = a.parse_args()?;
            if let syn::Expr::Assign(assign) = &expr {
                if let syn::Expr::Path(left) = &*assign.left {
                    if left.path.is_ident("inject") {
                        return match &*assign.right {
                            syn::Expr::Path(right) if right.path.get_ident().is_some() => {
                                Ok(Interceptor::Inject(right.path.segments[0].ident.clone()))
                            }
                            other => Err(syn::Error::new_spanned(
                                other,
                                "`inject` expects the name of an injector accessor",
                            )),
                        };
                    }
                }
            }
            Ok(Interceptor::Expr(expr))
        })
        .collect()
}

/// `#[get]` → `/`, `#[get("/users/{id}")]` → `/users/{id}`.
fn route_template(attr: &syn::Attribute) -> syn::Result<String> {
    match &attr.meta {
        syn::Meta::Path(_) => Ok("/".to_string()),
        _ => {
            let lit: syn::LitStr = attr.parse_args()?;
            let value = lit.value();
            if value.is_empty() || value.starts_with('/') {
                Ok(value)
            } else {
                Err(syn::Error::new_spanned(lit, "route templates must start with `/`"))
            }
        }
    }
}

fn last_segment(ty: &syn::Type) -> Option<&syn::PathSegment> {
    match ty {
        syn::Type::Path(p) if p.qself.is_none() => p.path.segments.last(),
        syn::Type::Group(g) => last_segment(&g.elem),
        _ => None,
    }
}

fn type_name(ty: &syn::Type) -> Option<String> {
    last_segment(ty).map(|s| s.ident.to_string())
}

/// First generic type argument of `Name<T, ..>` when the last segment is one of `names`.
fn generic_arg<'a>(ty: &'a syn::Type, names: &[&str]) -> Option<&'a syn::Type> {
    let segment = last_segment(ty)?;
    if !names.iter().any(|n| segment.ident == n) {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            syn::GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    }
}

const COLLECTIONS: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet", "LinkedList", "BinaryHeap"];

fn unwrap_option(ty: &syn::Type) -> Option<&syn::Type> {
    generic_arg(ty, &["Option"])
}

/// `(element, nullable)` of a collection type.
fn collection_element(ty: &syn::Type) -> Option<(&syn::Type, bool)> {
    let item = generic_arg(ty, COLLECTIONS)?;
    Some(match unwrap_option(item) {
        Some(inner) => (inner, true),
        None => (item, false),
    })
}

/// Arity, element type and collection type of a bound parameter.
fn arity_of(ty: &syn::Type) -> (Arity, syn::Type, Option<syn::Type>) {
    if let Some(inner) = unwrap_option(ty) {
        return match collection_element(inner) {
            Some((element, nullable)) => (
                Arity::OptionalCollection { nullable },
                element.clone(),
                Some(inner.clone()),
            ),
            None => (Arity::Optional, inner.clone(), None),
        };
    }
    match collection_element(ty) {
        Some((element, nullable)) => (Arity::Collection { nullable }, element.clone(), Some(ty.clone())),
        None => (Arity::Scalar, ty.clone(), None),
    }
}

/// Parameter attributes, stripped from the signature once read.
#[derive(Default)]
struct ParamAttrs {
    constraint: Option<(SourceConstraint, Span)>,
    name: Option<String>,
    from_json: bool,
}

fn parse_param_attrs(attrs: &[syn::Attribute]) -> syn::Result<ParamAttrs> {
    let mut out = ParamAttrs::default();
    for attr in attrs {
        if attr.path().is_ident("from") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    out.name = Some(lit.value());
                    return Ok(());
                }
                let ident = meta
                    .path
                    .get_ident()
                    .ok_or_else(|| meta.error("expected a value source"))?;
                out.constraint = Some((SourceConstraint::from_ident(ident)?, ident.span()));
                Ok(())
            })?;
        } else if attr.path().is_ident("named") {
            let lit: syn::LitStr = attr.parse_args()?;
            out.name = Some(lit.value());
        } else if attr.path().is_ident("from_json") {
            out.from_json = true;
        }
    }
    Ok(out)
}

/// What a handler's parameters are bound against.
#[derive(Clone, Copy)]
enum HandlerKind<'a> {
    Http { paths: &'a [String] },
    Ws { event: WsEvent, path: &'a str },
}

fn parse_param(
    pat_type: &syn::PatType,
    kind: HandlerKind<'_>,
    context_seen: &mut bool,
) -> syn::Result<ParamDef> {
    let span = pat_type.span();
    let attrs = parse_param_attrs(&pat_type.attrs)?;
    let ty = &*pat_type.ty;

    let role = if let syn::Type::Reference(reference) = ty {
        let name = type_name(&reference.elem).unwrap_or_default();
        let mutable = reference.mutability.is_some();
        match (name.as_str(), kind) {
            ("HttpContext", HandlerKind::Http { .. }) => {
                if *context_seen {
                    return Err(syn::Error::new(span, "at most one `HttpContext` parameter is allowed"));
                }
                *context_seen = true;
                ParamRole::Context { mutable }
            }
            ("WsSession", HandlerKind::Ws { .. }) if !mutable => ParamRole::Session,
            (name, HandlerKind::Ws { event, .. }) if WsEvent::is_context_type(name) => {
                if name != event.context_type() || mutable {
                    return Err(syn::Error::new(
                        span,
                        format!("#[{}] handlers take `&{}`", event.attr_name(), event.context_type()),
                    ));
                }
                ParamRole::EventContext
            }
            _ => {
                return Err(syn::Error::new(
                    span,
                    "binder unavailable for this parameter type; borrowed parameters must be \
                     `&HttpContext`/`&mut HttpContext` in HTTP actions, or `&WsSession` and the \
                     event's context in WebSocket handlers",
                ))
            }
        }
    } else if let syn::Type::ImplTrait(_) = ty {
        return Err(syn::Error::new(span, "binder unavailable for `impl Trait` parameters"));
    } else if matches!(type_name(ty).as_deref(), Some("HttpContext" | "WsSession"))
        || type_name(ty).is_some_and(|n| WsEvent::is_context_type(&n))
    {
        return Err(syn::Error::new(span, "context parameters must be taken by reference"));
    } else if attrs.from_json {
        if let HandlerKind::Ws { event, .. } = kind {
            if event != WsEvent::Message {
                return Err(syn::Error::new(
                    span,
                    "#[from_json] is only available in HTTP actions and #[ws_message] handlers",
                ));
            }
        }
        ParamRole::JsonBody(ty.clone())
    } else {
        let key = match (&attrs.name, &*pat_type.pat) {
            (Some(name), _) => name.clone(),
            (None, syn::Pat::Ident(pat)) => pat.ident.unraw().to_string(),
            (None, _) => {
                return Err(syn::Error::new(
                    span,
                    "binder unavailable for pattern parameters; name the value with #[named(\"key\")]",
                ))
            }
        };
        let (constraint, constraint_span) = attrs.constraint.unwrap_or((SourceConstraint::Any, span));
        let context = match kind {
            HandlerKind::Http { paths } => BindingContext::Http { paths },
            HandlerKind::Ws { event, path } => BindingContext::Ws { event, path },
        };
        let sources = resolve(constraint, &key, &context, constraint_span)?;
        let (arity, element, collection) = arity_of(ty);
        ParamRole::Bound(BindingPlan {
            sources,
            key,
            arity,
            element,
            collection,
        })
    };

    if !matches!(role, ParamRole::Bound(_)) && (attrs.constraint.is_some() || attrs.name.is_some()) {
        return Err(syn::Error::new(span, "#[from] and #[named] only apply to bound parameters"));
    }
    Ok(ParamDef { role, span })
}

fn parse_params(
    method: &syn::ImplItemFn,
    kind: HandlerKind<'_>,
    errors: &mut Errors,
) -> Vec<ParamDef> {
    let mut params = Vec::new();
    let mut context_seen = false;
    for arg in method.sig.inputs.iter() {
        match arg {
            syn::FnArg::Receiver(receiver) => {
                if receiver.colon_token.is_some() {
                    errors.push(syn::Error::new_spanned(
                        receiver,
                        "handlers take `self`, `&self` or `&mut self`",
                    ));
                }
            }
            syn::FnArg::Typed(pat_type) => {
                if let Some(param) = errors.check(parse_param(pat_type, kind, &mut context_seen)) {
                    params.push(param);
                }
            }
        }
    }
    params
}

fn validate_signature(method: &syn::ImplItemFn, errors: &mut Errors) {
    if !method.sig.generics.params.is_empty() {
        errors.push(syn::Error::new_spanned(
            &method.sig.generics,
            "handlers cannot be generic",
        ));
    }
    if method.sig.receiver().is_none() {
        errors.push(syn::Error::new_spanned(
            &method.sig.ident,
            "handlers must take `self`, `&self` or `&mut self`",
        ));
    }
}

fn strip_param_attrs(method: &mut syn::ImplItemFn) {
    for arg in method.sig.inputs.iter_mut() {
        if let syn::FnArg::Typed(pat_type) = arg {
            pat_type.attrs.retain(|a| !is_param_attr(a));
        }
    }
}

fn controller_name(self_ty: &syn::Type) -> syn::Result<syn::Ident> {
    last_segment(self_ty)
        .map(|s| s.ident.clone())
        .ok_or_else(|| syn::Error::new_spanned(self_ty, "#[routes] expects an impl block for a named type"))
}

/// Parse a `#[routes]` impl block into a [`ControllerDef`], stripping the
/// routing attributes from the block it keeps.
pub fn parse(args: RoutesArgs, mut item: syn::ItemImpl) -> syn::Result<ControllerDef> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(path, "#[routes] goes on an inherent impl block"));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[routes] does not support generic controllers",
        ));
    }
    let name = controller_name(&item.self_ty)?;
    let prefix = args.path.as_ref().map(syn::LitStr::value).unwrap_or_default();
    let ws_path = args.ws.as_ref().map(|lit| join_path(&prefix, &lit.value()));

    let mut errors = Errors::default();
    let class_before = errors.check(extract_interceptors(&item.attrs, "before")).unwrap_or_default();
    let class_after = errors.check(extract_interceptors(&item.attrs, "after")).unwrap_or_default();
    item.attrs.retain(|a| !is_interceptor_attr(a));

    let mut actions = Vec::new();
    let mut ws_handlers: Vec<WsHandlerDef> = Vec::new();

    for impl_item in item.items.iter_mut() {
        let syn::ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let attrs = std::mem::take(&mut method.attrs);

        let mut routes = Vec::new();
        for attr in &attrs {
            if let Some(verb) = HttpVerb::from_attr(attr) {
                if let Some(template) = errors.check(route_template(attr)) {
                    routes.push(RouteBinding {
                        verb,
                        full_path: join_path(&prefix, &template),
                        span: attr.span(),
                    });
                }
            }
        }
        let events: Vec<(WsEvent, TokenStream)> = attrs
            .iter()
            .filter_map(|a| WsEvent::from_attr(a).map(|e| (e, a.to_token_stream())))
            .collect();
        let marked = attrs.iter().any(|a| a.path().is_ident("action"));
        let docs = doc_lines(&attrs);
        let before = errors.check(extract_interceptors(&attrs, "before")).unwrap_or_default();
        let after = errors.check(extract_interceptors(&attrs, "after")).unwrap_or_default();

        method.attrs = attrs.into_iter().filter(|a| !is_routing_attr(a)).collect();

        if routes.is_empty() && events.is_empty() {
            if marked || !before.is_empty() || !after.is_empty() {
                errors.push(syn::Error::new_spanned(
                    &method.sig.ident,
                    "#[action], #[before] and #[after] need a route or WebSocket attribute on the same method",
                ));
            }
            continue;
        }
        validate_signature(method, &mut errors);

        if !events.is_empty() {
            if !routes.is_empty() {
                errors.push(syn::Error::new_spanned(
                    &method.sig.ident,
                    "a method cannot be both an HTTP action and a WebSocket handler",
                ));
            }
            if let Some((_, extra)) = events.get(1) {
                errors.push(syn::Error::new_spanned(
                    extra,
                    "a method handles at most one WebSocket event",
                ));
            }
            if !before.is_empty() || !after.is_empty() {
                errors.push(syn::Error::new_spanned(
                    &method.sig.ident,
                    "interceptors are not supported on WebSocket handlers",
                ));
            }
            let (event, attr_tokens) = &events[0];
            let event = *event;
            let Some(path) = ws_path.as_deref() else {
                errors.push(syn::Error::new_spanned(
                    attr_tokens,
                    format!("#[{}] requires a socket path: #[routes(ws = \"/...\")]", event.attr_name()),
                ));
                continue;
            };
            if ws_handlers.iter().any(|h| h.event == event) {
                errors.push(syn::Error::new_spanned(
                    attr_tokens,
                    format!("duplicate #[{}] handler; at most one per controller", event.attr_name()),
                ));
                continue;
            }
            let params = parse_params(method, HandlerKind::Ws { event, path }, &mut errors);
            let ret = errors.check(classify(&method.sig, ResultKind::Ws, marked));
            strip_param_attrs(method);
            if let Some(ret) = ret {
                ws_handlers.push(WsHandlerDef {
                    event,
                    ident: method.sig.ident.clone(),
                    params,
                    ret,
                });
            }
            continue;
        }

        let paths: Vec<String> = routes.iter().map(|r| r.full_path.clone()).collect();
        let params = parse_params(method, HandlerKind::Http { paths: &paths }, &mut errors);
        let ret = errors.check(classify(&method.sig, ResultKind::Http, marked));
        strip_param_attrs(method);
        let Some(ret) = ret else { continue };

        let mut all_before: Vec<Interceptor> = class_before.iter().map(Interceptor::clone).collect();
        all_before.extend(before);
        let mut all_after: Vec<Interceptor> = class_after.iter().map(Interceptor::clone).collect();
        all_after.extend(after);

        actions.push(ActionDef {
            ident: method.sig.ident.clone(),
            docs,
            routes,
            params,
            ret,
            before: all_before,
            after: all_after,
        });
    }

    let mut seen: Vec<(HttpVerb, &str)> = Vec::new();
    for route in actions.iter().flat_map(|a| a.routes.iter()) {
        let key = (route.verb, route.full_path.as_str());
        if seen.contains(&key) {
            errors.push(syn::Error::new(
                route.span,
                format!("duplicate route: {} {}", route.verb.as_str(), route.full_path),
            ));
        } else {
            seen.push(key);
        }
    }

    if let (Some(path), Some(lit)) = (ws_path.as_deref(), &args.ws) {
        if !ws_handlers.is_empty() && seen.contains(&(HttpVerb::Get, path)) {
            errors.push(syn::Error::new_spanned(
                lit,
                format!("socket path {path} collides with a GET route"),
            ));
        }
    }

    errors.finish()?;

    let state = args.state.unwrap_or_else(|| syn::parse_quote!(()));
    Ok(ControllerDef {
        name,
        self_ty: (*item.self_ty).clone(),
        state,
        inject: args.inject,
        ws_path,
        actions,
        ws_handlers,
        item,
    })
}
