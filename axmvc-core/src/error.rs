use crate::http::{IntoResponse, Json, Response, StatusCode};

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// Error raised while dispatching an action: binding failures, interceptor
/// rejections, controller failures and result execution failures all end up
/// here before being rendered.
pub enum HttpError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(String),
    Custom {
        status: StatusCode,
        body: serde_json::Value,
    },
}

impl HttpError {
    /// Status code this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Custom { status, .. } => *status,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        }
        match self {
            HttpError::Custom { status, body } => (status, Json(body)).into_response(),
            HttpError::NotFound(msg)
            | HttpError::Unauthorized(msg)
            | HttpError::Forbidden(msg)
            | HttpError::BadRequest(msg)
            | HttpError::PayloadTooLarge(msg)
            | HttpError::Internal(msg) => error_response(status, msg),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            HttpError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            HttpError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            HttpError::PayloadTooLarge(msg) => write!(f, "Payload Too Large: {msg}"),
            HttpError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            HttpError::Custom { status, body } => write!(f, "Custom Error ({status}): {body}"),
        }
    }
}

impl std::fmt::Debug for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for HttpError {}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Internal(err.to_string())
    }
}

impl From<std::convert::Infallible> for HttpError {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

/// Generate `From<E> for HttpError` implementations that map error types to
/// a specific `HttpError` variant.
///
/// Controller methods returning `Result<T, E>` need such an impl for `E`.
///
/// # Example
///
/// ```ignore
/// axmvc_core::map_error! {
///     std::num::ParseIntError => BadRequest,
///     std::io::Error => Internal,
/// }
/// ```
#[macro_export]
macro_rules! map_error {
    ( $( $err_ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$err_ty> for $crate::HttpError {
                fn from(err: $err_ty) -> Self {
                    $crate::HttpError::$variant(err.to_string())
                }
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_renders_json_body() {
        let resp = HttpError::BadRequest("missing id".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "missing id");
    }

    #[tokio::test]
    async fn custom_keeps_status_and_body() {
        let resp = HttpError::Custom {
            status: StatusCode::CONFLICT,
            body: serde_json::json!({ "code": 7 }),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(resp).await["code"], 7);
    }

    #[test]
    fn display_prefixes_variant() {
        assert_eq!(
            HttpError::PayloadTooLarge("2 MiB".into()).to_string(),
            "Payload Too Large: 2 MiB"
        );
    }
}
