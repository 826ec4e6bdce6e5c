//! Result dispatch for handlers whose declared type is not a known action.
//!
//! Generated code calls `(&value).__axmvc_kind().execute(value, ..)` with
//! one family's pair of traits in scope. Method resolution tries the by-value
//! receiver (`ActionKind`, implemented for `T`) before the autoref one
//! (`ValueKind`, implemented for `&T`), so a type implementing the action
//! trait executes itself and anything else is serialized as JSON.

use serde::Serialize;

use crate::context::HttpContext;
use crate::error::HttpError;
use crate::results::{ActionResult, JsonResult};
use crate::ws::{WsActionResult, WsJsonResult, WsSession};

pub struct ActionTag;
pub struct ValueTag;

pub trait ActionKind {
    #[inline]
    fn __axmvc_kind(&self) -> ActionTag {
        ActionTag
    }
}

impl<T: ActionResult> ActionKind for T {}

pub trait ValueKind {
    #[inline]
    fn __axmvc_kind(&self) -> ValueTag {
        ValueTag
    }
}

impl<T: ?Sized> ValueKind for &T {}

impl ActionTag {
    #[inline]
    pub fn execute<T: ActionResult>(self, result: T, ctx: &mut HttpContext) -> Result<(), HttpError> {
        result.execute(ctx)
    }
}

impl ValueTag {
    #[inline]
    pub fn execute<T: Serialize + Send>(self, value: T, ctx: &mut HttpContext) -> Result<(), HttpError> {
        JsonResult::new(value).execute(ctx)
    }
}

pub struct WsActionTag;
pub struct WsValueTag;

pub trait WsActionKind {
    #[inline]
    fn __axmvc_kind(&self) -> WsActionTag {
        WsActionTag
    }
}

impl<T: WsActionResult> WsActionKind for T {}

pub trait WsValueKind {
    #[inline]
    fn __axmvc_kind(&self) -> WsValueTag {
        WsValueTag
    }
}

impl<T: ?Sized> WsValueKind for &T {}

impl WsActionTag {
    #[inline]
    pub fn execute<T: WsActionResult>(self, result: T, session: &WsSession) -> Result<(), HttpError> {
        result.execute(session)
    }
}

impl WsValueTag {
    #[inline]
    pub fn execute<T: Serialize + Send>(self, value: T, session: &WsSession) -> Result<(), HttpError> {
        WsJsonResult::new(value).execute(session)
    }
}
