//! Structural classification of a handler's declared result.

use syn::{GenericArgument, PathArguments, ReturnType, Type, TypeParamBound};

/// How a handler's result is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    Void,
    SyncAction,
    SyncValue,
    AsyncAction,
    AsyncValue,
}

/// Which family of action results applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Http,
    Ws,
}

impl ResultKind {
    fn trait_name(self) -> &'static str {
        match self {
            ResultKind::Http => "ActionResult",
            ResultKind::Ws => "WsActionResult",
        }
    }

    fn builtin_results(self) -> &'static [&'static str] {
        match self {
            ResultKind::Http => &["JsonResult", "ContentResult", "StatusCodeResult", "RedirectResult"],
            ResultKind::Ws => &["WsJsonResult", "WsTextResult", "WsBinaryResult"],
        }
    }

    fn other(self) -> Self {
        match self {
            ResultKind::Http => ResultKind::Ws,
            ResultKind::Ws => ResultKind::Http,
        }
    }

    fn context(self) -> &'static str {
        match self {
            ResultKind::Http => "an HTTP action",
            ResultKind::Ws => "a WebSocket handler",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub shape: ReturnShape,
    /// The result is `Result<_, E>`; errors convert into `HttpError`.
    pub fallible: bool,
    /// The call must be awaited (`async fn` or `impl Future`).
    pub awaited: bool,
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(p) if p.qself.is_none() => p.path.segments.last(),
        Type::Group(g) => last_segment(&g.elem),
        _ => None,
    }
}

fn is_unit(ty: &Type) -> bool {
    match ty {
        Type::Tuple(t) => t.elems.is_empty(),
        Type::Paren(p) => is_unit(&p.elem),
        Type::Group(g) => is_unit(&g.elem),
        _ => false,
    }
}

/// `Result<T, ..>` → `T`.
fn unwrap_result(ty: &Type) -> Option<&Type> {
    let segment = last_segment(ty)?;
    if segment.ident != "Result" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn bound_name(bound: &TypeParamBound) -> Option<&syn::PathSegment> {
    match bound {
        TypeParamBound::Trait(t) => t.path.segments.last(),
        _ => None,
    }
}

/// `impl Future<Output = T>` → `T`.
fn future_output(ty: &Type) -> Option<&Type> {
    let Type::ImplTrait(impl_trait) = ty else {
        return None;
    };
    impl_trait.bounds.iter().find_map(|bound| {
        let segment = bound_name(bound)?;
        if segment.ident != "Future" {
            return None;
        }
        match &segment.arguments {
            PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
                GenericArgument::AssocType(assoc) if assoc.ident == "Output" => Some(&assoc.ty),
                _ => None,
            }),
            _ => None,
        }
    })
}

const TRAIT_OBJECT: &str =
    "trait objects cannot be returned from handlers; return a concrete type or `impl ActionResult`";

/// `dyn Trait`, `&dyn Trait` or a smart pointer around one.
fn is_trait_object(ty: &Type) -> bool {
    match ty {
        Type::TraitObject(_) => true,
        Type::Reference(r) => is_trait_object(&r.elem),
        Type::Paren(p) => is_trait_object(&p.elem),
        Type::Group(g) => is_trait_object(&g.elem),
        _ => last_segment(ty).is_some_and(|segment| {
            ["Box", "Arc", "Rc"].iter().any(|name| segment.ident == name)
                && match &segment.arguments {
                    PathArguments::AngleBracketed(args) => args.args.iter().any(|arg| {
                        matches!(arg, GenericArgument::Type(inner) if is_trait_object(inner))
                    }),
                    _ => false,
                }
        }),
    }
}

/// Whether `ty` executes itself; rejects types no shape can handle.
fn is_action(ty: &Type, kind: ResultKind, marked: bool) -> syn::Result<bool> {
    match ty {
        _ if is_trait_object(ty) => Err(syn::Error::new_spanned(ty, TRAIT_OBJECT)),
        Type::Never(_) => Err(syn::Error::new_spanned(ty, "handlers must return a value")),
        Type::ImplTrait(impl_trait) => {
            let names: Vec<String> = impl_trait
                .bounds
                .iter()
                .filter_map(bound_name)
                .map(|s| s.ident.to_string())
                .collect();
            if names.iter().any(|n| n == kind.trait_name()) {
                Ok(true)
            } else if names.iter().any(|n| n == kind.other().trait_name()) {
                Err(syn::Error::new_spanned(
                    ty,
                    format!("`{}` cannot be returned from {}", kind.other().trait_name(), kind.context()),
                ))
            } else if names.iter().any(|n| n == "Future") {
                Err(syn::Error::new_spanned(ty, "nested futures are not supported"))
            } else {
                Err(syn::Error::new_spanned(
                    ty,
                    format!(
                        "unsupported `impl Trait` result; expected `impl {}` or a concrete type",
                        kind.trait_name()
                    ),
                ))
            }
        }
        _ if marked => Ok(true),
        _ => {
            let Some(segment) = last_segment(ty) else {
                return Ok(false);
            };
            let name = segment.ident.to_string();
            if kind.builtin_results().contains(&name.as_str()) {
                Ok(true)
            } else if kind.other().builtin_results().contains(&name.as_str()) {
                Err(syn::Error::new_spanned(
                    ty,
                    format!("`{name}` cannot be returned from {}", kind.context()),
                ))
            } else {
                Ok(false)
            }
        }
    }
}

/// Classify `ty`, the value produced once any future is awaited.
fn classify_value(ty: &Type, kind: ResultKind, marked: bool, awaited: bool) -> syn::Result<Classified> {
    let (ty, fallible) = match unwrap_result(ty) {
        Some(inner) => (inner, true),
        None => (ty, false),
    };
    if future_output(ty).is_some() {
        let msg = if awaited {
            "nested futures are not supported"
        } else {
            "`Result<impl Future, _>` is not supported; return `impl Future<Output = Result<_, _>>` instead"
        };
        return Err(syn::Error::new_spanned(ty, msg));
    }
    let shape = if is_unit(ty) {
        ReturnShape::Void
    } else {
        match (is_action(ty, kind, marked)?, awaited) {
            (true, false) => ReturnShape::SyncAction,
            (true, true) => ReturnShape::AsyncAction,
            (false, false) => ReturnShape::SyncValue,
            (false, true) => ReturnShape::AsyncValue,
        }
    };
    Ok(Classified {
        shape,
        fallible,
        awaited,
    })
}

/// Classify a handler signature. `marked` is set by `#[action]` and forces
/// a concrete result type to be treated as self-executing.
pub fn classify(sig: &syn::Signature, kind: ResultKind, marked: bool) -> syn::Result<Classified> {
    let is_async = sig.asyncness.is_some();
    let ty = match &sig.output {
        ReturnType::Default => {
            return Ok(Classified {
                shape: ReturnShape::Void,
                fallible: false,
                awaited: is_async,
            })
        }
        ReturnType::Type(_, ty) => ty.as_ref(),
    };

    match future_output(ty) {
        Some(_) if is_async => Err(syn::Error::new_spanned(
            ty,
            "an `async fn` cannot return `impl Future`; nested futures are not supported",
        )),
        Some(output) => classify_value(output, kind, marked, true),
        None => classify_value(ty, kind, marked, is_async),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn http(sig: syn::Signature) -> syn::Result<Classified> {
        classify(&sig, ResultKind::Http, false)
    }

    fn shape(sig: syn::Signature) -> ReturnShape {
        http(sig).unwrap().shape
    }

    #[test]
    fn void_shapes() {
        assert_eq!(shape(parse_quote!(fn a(&self))), ReturnShape::Void);
        let c = http(parse_quote!(async fn a(&self) -> Result<(), AppError>)).unwrap();
        assert_eq!(c, Classified { shape: ReturnShape::Void, fallible: true, awaited: true });
    }

    #[test]
    fn sync_shapes() {
        assert_eq!(shape(parse_quote!(fn a(&self) -> Vec<User>)), ReturnShape::SyncValue);
        assert_eq!(shape(parse_quote!(fn a(&self) -> JsonResult<User>)), ReturnShape::SyncAction);
        assert_eq!(shape(parse_quote!(fn a(&self) -> impl ActionResult)), ReturnShape::SyncAction);
        assert_eq!(
            shape(parse_quote!(fn a(&self) -> axmvc::results::StatusCodeResult)),
            ReturnShape::SyncAction
        );
    }

    #[test]
    fn async_shapes() {
        assert_eq!(shape(parse_quote!(async fn a(&self) -> i64)), ReturnShape::AsyncValue);
        assert_eq!(shape(parse_quote!(async fn a(&self) -> ContentResult)), ReturnShape::AsyncAction);
        assert_eq!(
            shape(parse_quote!(fn a(&self) -> impl Future<Output = RedirectResult> + Send)),
            ReturnShape::AsyncAction
        );
        let c = http(parse_quote!(fn a(&self) -> impl Future<Output = Result<String, E>>)).unwrap();
        assert_eq!(c, Classified { shape: ReturnShape::AsyncValue, fallible: true, awaited: true });
    }

    #[test]
    fn marker_forces_action() {
        let sig: syn::Signature = parse_quote!(fn a(&self) -> Download);
        assert_eq!(classify(&sig, ResultKind::Http, true).unwrap().shape, ReturnShape::SyncAction);
        assert_eq!(classify(&sig, ResultKind::Http, false).unwrap().shape, ReturnShape::SyncValue);
    }

    #[test]
    fn boxed_trait_objects_name_the_problem() {
        let err = http(parse_quote!(fn a(&self) -> Box<dyn ActionResult>)).unwrap_err();
        assert!(err.to_string().starts_with("trait objects cannot be returned"));
    }

    #[test]
    fn result_kinds_do_not_mix() {
        assert!(http(parse_quote!(fn a(&self) -> WsTextResult)).is_err());
        assert!(http(parse_quote!(fn a(&self) -> impl WsActionResult)).is_err());
        let sig: syn::Signature = parse_quote!(fn a(&self) -> JsonResult<u8>);
        assert!(classify(&sig, ResultKind::Ws, false).is_err());
        let sig: syn::Signature = parse_quote!(fn a(&self) -> WsJsonResult<u8>);
        assert_eq!(classify(&sig, ResultKind::Ws, false).unwrap().shape, ReturnShape::SyncAction);
    }

    #[test]
    fn unsupported_results() {
        assert!(http(parse_quote!(fn a(&self) -> dyn ActionResult)).is_err());
        assert!(http(parse_quote!(fn a(&self) -> Box<dyn ActionResult>)).is_err());
        assert!(http(parse_quote!(fn a(&self) -> &'static dyn ActionResult)).is_err());
        assert!(http(parse_quote!(fn a(&self) -> Result<Arc<dyn Serialize>, E>)).is_err());
        assert!(http(parse_quote!(fn a(&self) -> Box<str>)).is_ok());
        assert!(http(parse_quote!(fn a(&self) -> !)).is_err());
        assert!(http(parse_quote!(fn a(&self) -> impl Iterator<Item = u8>)).is_err());
        assert!(http(parse_quote!(async fn a(&self) -> impl Future<Output = u8>)).is_err());
        assert!(http(parse_quote!(fn a(&self) -> Result<impl Future<Output = u8>, E>)).is_err());
        assert!(http(parse_quote!(fn a(&self) -> impl Future<Output = impl Future<Output = u8>>)).is_err());
    }
}
