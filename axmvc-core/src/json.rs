//! JSON codec contract used for request bodies, message payloads and value
//! results.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::MvcConfig;
use crate::error::HttpError;

/// Failure while encoding or decoding JSON.
#[derive(Debug)]
pub enum CodecError {
    Encode(String),
    Decode(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Encode(msg) => write!(f, "json encode: {msg}"),
            CodecError::Decode(msg) => write!(f, "json decode: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<CodecError> for HttpError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode(msg) => HttpError::BadRequest(format!("invalid JSON: {msg}")),
            CodecError::Encode(msg) => HttpError::Internal(format!("failed to encode JSON: {msg}")),
        }
    }
}

/// Serializes and deserializes JSON documents.
///
/// The codec works on [`serde_json::Value`] so it stays object safe; the
/// [`encode`] and [`decode`] helpers bridge to typed values.
pub trait JsonCodec: Send + Sync + 'static {
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, CodecError>;
}

/// Encode a typed value with `codec`.
pub fn encode<T: Serialize + ?Sized>(codec: &dyn JsonCodec, value: &T) -> Result<Vec<u8>, CodecError> {
    let value = serde_json::to_value(value).map_err(|e| CodecError::Encode(e.to_string()))?;
    codec.serialize(&value)
}

/// Decode a typed value with `codec`.
pub fn decode<T: DeserializeOwned>(codec: &dyn JsonCodec, bytes: &[u8]) -> Result<T, CodecError> {
    let value = codec.deserialize(bytes)?;
    serde_json::from_value(value).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Default codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec {
    pretty: bool,
}

impl SerdeJsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn from_config(config: &MvcConfig) -> Self {
        Self {
            pretty: config.pretty_json,
        }
    }
}

impl JsonCodec for SerdeJsonCodec {
    fn serialize(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let out = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        out.map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
