use std::future::Future;

use crate::context::HttpContext;
use crate::error::HttpError;

/// Context passed to a before-interceptor.
///
/// The HTTP context is mutable: a before-interceptor may set response
/// headers or status that the action later builds upon.
pub struct BeforeContext<'a, S> {
    pub http: &'a mut HttpContext,
    pub state: &'a S,
    pub controller_name: &'static str,
    pub action_name: &'static str,
}

impl<'a, S> BeforeContext<'a, S> {
    pub fn new(
        http: &'a mut HttpContext,
        state: &'a S,
        controller_name: &'static str,
        action_name: &'static str,
    ) -> Self {
        Self {
            http,
            state,
            controller_name,
            action_name,
        }
    }
}

/// Context passed to an after-interceptor.
///
/// Carries the error captured while binding, invoking or executing the
/// action, if any. An after-interceptor that handled the error clears it;
/// whatever error remains once every after-interceptor ran is rendered.
pub struct AfterContext<'a, S> {
    pub http: &'a mut HttpContext,
    pub state: &'a S,
    pub controller_name: &'static str,
    pub action_name: &'static str,
    error: Option<HttpError>,
}

impl<'a, S> AfterContext<'a, S> {
    pub fn new(
        http: &'a mut HttpContext,
        state: &'a S,
        controller_name: &'static str,
        action_name: &'static str,
        error: Option<HttpError>,
    ) -> Self {
        Self {
            http,
            state,
            controller_name,
            action_name,
            error,
        }
    }

    pub fn error(&self) -> Option<&HttpError> {
        self.error.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Mark the captured error as handled and return it.
    pub fn clear_error(&mut self) -> Option<HttpError> {
        self.error.take()
    }

    /// Replace the captured error.
    pub fn set_error(&mut self, error: HttpError) {
        self.error = Some(error);
    }

    /// The error left once all after-interceptors ran.
    pub fn into_error(self) -> Option<HttpError> {
        self.error
    }
}

/// Hook that runs ahead of parameter binding and the action.
///
/// Returning an error stops the dispatch: the action does not run, neither
/// do the after-interceptors, and the error is rendered.
///
/// Interceptors that don't need the state use a generic `S: Send + Sync`:
///
/// ```ignore
/// impl<S: Send + Sync> BeforeAction<S> for RequireTenant {
///     async fn before(&self, ctx: &mut BeforeContext<'_, S>) -> Result<(), HttpError> {
///         match ctx.http.request().header("x-tenant") {
///             Some(_) => Ok(()),
///             None => Err(HttpError::BadRequest("missing tenant".into())),
///         }
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `BeforeAction<{S}>`",
    label = "this type cannot be used as a before-interceptor",
    note = "implement `BeforeAction<S>` for your type and apply it with `#[before(YourInterceptor)]`"
)]
pub trait BeforeAction<S> {
    fn before(
        &self,
        ctx: &mut BeforeContext<'_, S>,
    ) -> impl Future<Output = Result<(), HttpError>> + Send;
}

/// Hook that runs after the action, whether it succeeded or failed.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `AfterAction<{S}>`",
    label = "this type cannot be used as an after-interceptor",
    note = "implement `AfterAction<S>` for your type and apply it with `#[after(YourInterceptor)]`"
)]
pub trait AfterAction<S> {
    fn after(&self, ctx: &mut AfterContext<'_, S>) -> impl Future<Output = ()> + Send;
}
