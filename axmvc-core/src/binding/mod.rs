//! Parameter binding.
//!
//! Generated dispatch code resolves, at compile time, the ordered list of
//! [`Source`]s a parameter may come from. At request time the binder takes
//! the values from the first source that carries the key and converts them
//! with [`FromParam`].
//!
//! Raw values are `Option<String>`: `None` is an explicit null (an empty
//! query value, or a JSON `null` in a message body).

mod convert;

pub use convert::FromParam;

use serde_json::Value;

use crate::context::HttpRequest;
use crate::error::HttpError;

/// Where a raw value is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Path,
    Query,
    Header,
    Cookie,
    /// Field of a JSON WebSocket message.
    Message,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Source::Path => "path",
            Source::Query => "query",
            Source::Header => "header",
            Source::Cookie => "cookie",
            Source::Message => "message",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No source carried the key, or it was null.
    Missing { key: String },
    /// A value was present but could not be converted.
    Conversion {
        key: String,
        source: Source,
        value: String,
        reason: String,
    },
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::Missing { key } => write!(f, "missing required parameter '{key}'"),
            BindError::Conversion {
                key,
                source,
                value,
                reason,
            } => write!(f, "invalid {source} parameter '{key}' = '{value}': {reason}"),
        }
    }
}

impl std::error::Error for BindError {}

impl From<BindError> for HttpError {
    fn from(err: BindError) -> Self {
        HttpError::BadRequest(err.to_string())
    }
}

/// Looks up raw values and converts them into parameter types.
///
/// Implementors only provide [`lookup`](ModelBinder::lookup); the binding
/// rules live in the provided methods.
pub trait ModelBinder {
    /// Every occurrence of `key` in `source`, in order, or `None` when the
    /// source does not carry the key at all.
    fn lookup(&self, source: Source, key: &str) -> Option<Vec<Option<String>>>;

    /// Raw values from the first source in `sources` that carries `key`.
    fn raw_values(&self, sources: &[Source], key: &str) -> Option<(Source, Vec<Option<String>>)> {
        sources
            .iter()
            .find_map(|&source| self.lookup(source, key).map(|values| (source, values)))
    }

    /// A required scalar. An empty value still goes through conversion, so
    /// it binds for `String` and fails for numbers.
    fn bind_required<T: FromParam>(&self, sources: &[Source], key: &str) -> Result<T, BindError> {
        let (source, values) = self.raw_values(sources, key).ok_or_else(|| missing(key))?;
        let raw = values.into_iter().next().flatten().ok_or_else(|| missing(key))?;
        convert(source, key, raw)
    }

    /// An optional scalar: absent, null and empty values bind to `None`.
    fn bind_optional<T: FromParam>(
        &self,
        sources: &[Source],
        key: &str,
    ) -> Result<Option<T>, BindError> {
        let Some((source, values)) = self.raw_values(sources, key) else {
            return Ok(None);
        };
        match values.into_iter().next().flatten() {
            Some(raw) if !raw.is_empty() => convert(source, key, raw).map(Some),
            _ => Ok(None),
        }
    }

    /// Every occurrence of `key`; `None` when the key is absent. A null or
    /// unconvertible occurrence fails the whole binding.
    fn bind_many<T: FromParam>(
        &self,
        sources: &[Source],
        key: &str,
    ) -> Result<Option<Vec<T>>, BindError> {
        let Some((source, values)) = self.raw_values(sources, key) else {
            return Ok(None);
        };
        values
            .into_iter()
            .map(|raw| match raw {
                Some(raw) => convert(source, key, raw),
                None => Err(BindError::Conversion {
                    key: key.to_string(),
                    source,
                    value: "null".into(),
                    reason: "null element".into(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Every occurrence of `key`, keeping a slot per occurrence. Null, empty
    /// and unconvertible occurrences become `None`.
    fn bind_nullable_many<T: FromParam>(
        &self,
        sources: &[Source],
        key: &str,
    ) -> Result<Option<Vec<Option<T>>>, BindError> {
        let Some((_, values)) = self.raw_values(sources, key) else {
            return Ok(None);
        };
        Ok(Some(
            values
                .into_iter()
                .map(|raw| match raw {
                    Some(raw) if !raw.is_empty() => T::from_param(&raw).ok(),
                    _ => None,
                })
                .collect(),
        ))
    }
}

fn missing(key: &str) -> BindError {
    BindError::Missing {
        key: key.to_string(),
    }
}

fn convert<T: FromParam>(source: Source, key: &str, raw: String) -> Result<T, BindError> {
    T::from_param(&raw).map_err(|reason| BindError::Conversion {
        key: key.to_string(),
        source,
        value: raw,
        reason,
    })
}

/// Binder over a buffered request, optionally with the JSON document of a
/// WebSocket message.
pub struct DefaultModelBinder<'a> {
    request: &'a HttpRequest,
    message: Option<&'a Value>,
}

impl<'a> DefaultModelBinder<'a> {
    pub fn new(request: &'a HttpRequest) -> Self {
        Self {
            request,
            message: None,
        }
    }

    pub fn with_message(mut self, message: &'a Value) -> Self {
        self.message = Some(message);
        self
    }
}

fn owned<'v>(values: impl Iterator<Item = &'v str>) -> Option<Vec<Option<String>>> {
    let values: Vec<Option<String>> = values.map(|v| Some(v.to_string())).collect();
    (!values.is_empty()).then_some(values)
}

fn message_field(message: &Value, key: &str) -> Option<Vec<Option<String>>> {
    let field = message.as_object()?.get(key)?;
    let values = match field {
        Value::Array(items) => items.iter().map(scalar_text).collect(),
        other => vec![scalar_text(other)],
    };
    Some(values)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl ModelBinder for DefaultModelBinder<'_> {
    fn lookup(&self, source: Source, key: &str) -> Option<Vec<Option<String>>> {
        match source {
            Source::Path => self
                .request
                .path_param(key)
                .map(|v| vec![Some(v.to_string())]),
            Source::Query => owned(self.request.query_values(key)),
            Source::Header => owned(self.request.header_values(key)),
            Source::Cookie => owned(self.request.cookie_values(key)),
            Source::Message => self.message.and_then(|m| message_field(m, key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory binder keyed by `(source, key)`.
    #[derive(Default)]
    struct MapBinder(HashMap<(&'static str, &'static str), Vec<Option<&'static str>>>);

    impl MapBinder {
        fn with(mut self, source: &'static str, key: &'static str, values: &[Option<&'static str>]) -> Self {
            self.0.insert((source, key), values.to_vec());
            self
        }
    }

    impl ModelBinder for MapBinder {
        fn lookup(&self, source: Source, key: &str) -> Option<Vec<Option<String>>> {
            let name = source.to_string();
            self.0
                .iter()
                .find(|((s, k), _)| *s == name && *k == key)
                .map(|(_, v)| v.iter().map(|o| o.map(str::to_string)).collect())
        }
    }

    const ANY: &[Source] = &[Source::Path, Source::Query, Source::Header, Source::Cookie];

    #[test]
    fn first_source_with_key_wins() {
        let binder = MapBinder::default()
            .with("path", "id", &[Some("7")])
            .with("query", "id", &[Some("9")]);
        assert_eq!(binder.bind_required::<i32>(ANY, "id"), Ok(7));
    }

    #[test]
    fn falls_back_to_later_sources() {
        let binder = MapBinder::default().with("cookie", "session", &[Some("abc")]);
        assert_eq!(binder.bind_required::<String>(ANY, "session").unwrap(), "abc");
    }

    #[test]
    fn required_missing_and_invalid() {
        let binder = MapBinder::default().with("query", "n", &[Some("x")]);
        assert!(matches!(
            binder.bind_required::<i32>(ANY, "other"),
            Err(BindError::Missing { .. })
        ));
        assert!(matches!(
            binder.bind_required::<i32>(ANY, "n"),
            Err(BindError::Conversion { source: Source::Query, .. })
        ));
    }

    #[test]
    fn optional_treats_empty_as_none_but_rejects_garbage() {
        let binder = MapBinder::default()
            .with("query", "a", &[Some("")])
            .with("query", "b", &[Some("nope")]);
        assert_eq!(binder.bind_optional::<i32>(ANY, "a"), Ok(None));
        assert_eq!(binder.bind_optional::<i32>(ANY, "missing"), Ok(None));
        assert!(binder.bind_optional::<i32>(ANY, "b").is_err());
    }

    #[test]
    fn nullable_many_keeps_slots() {
        let binder = MapBinder::default().with("query", "v", &[Some("1"), Some(""), None, Some("x"), Some("5")]);
        assert_eq!(
            binder.bind_nullable_many::<i32>(ANY, "v"),
            Ok(Some(vec![Some(1), None, None, None, Some(5)]))
        );
    }

    #[test]
    fn many_rejects_holes() {
        let binder = MapBinder::default()
            .with("query", "ok", &[Some("1"), Some("2")])
            .with("query", "hole", &[Some("1"), Some("")]);
        assert_eq!(binder.bind_many::<i32>(ANY, "ok"), Ok(Some(vec![1, 2])));
        assert_eq!(binder.bind_many::<i32>(ANY, "absent"), Ok(None));
        assert!(binder.bind_many::<i32>(ANY, "hole").is_err());
    }

    #[test]
    fn message_fields_expand_arrays() {
        let message = serde_json::json!({ "ids": [1, null, 3], "name": "ann", "flag": true });
        assert_eq!(
            message_field(&message, "ids"),
            Some(vec![Some("1".into()), None, Some("3".into())])
        );
        assert_eq!(message_field(&message, "name"), Some(vec![Some("ann".into())]));
        assert_eq!(message_field(&message, "flag"), Some(vec![Some("true".into())]));
        assert_eq!(message_field(&message, "absent"), None);
        assert_eq!(message_field(&serde_json::json!([1, 2]), "ids"), None);
    }

    #[test]
    fn bind_error_is_a_bad_request() {
        let err: HttpError = BindError::Missing { key: "id".into() }.into();
        assert_eq!(err.status(), crate::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Bad Request: missing required parameter 'id'");
    }
}
