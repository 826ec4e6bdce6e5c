//! Runtime settings for the dispatch layer.
//!
//! Settings live under the `mvc` section of `application.yaml` (and the
//! active profile's `application-{profile}.yaml`). Environment variables
//! prefixed with `AXMVC_` override file values:
//!
//! | Key                     | Env var                       | Default  |
//! |-------------------------|-------------------------------|----------|
//! | `max_body_bytes`        | `AXMVC_MAX_BODY_BYTES`        | 2 MiB    |
//! | `pretty_json`           | `AXMVC_PRETTY_JSON`           | `false`  |
//! | `ws_max_message_bytes`  | `AXMVC_WS_MAX_MESSAGE_BYTES`  | 64 KiB   |

use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
    /// An environment override could not be parsed.
    InvalidOverride { key: String, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::InvalidOverride { key, value } => {
                write!(f, "Invalid value for {key}: '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MvcConfig {
    /// Largest request body buffered into an `HttpContext`.
    pub max_body_bytes: usize,
    /// Pretty-print JSON produced by the default codec.
    pub pretty_json: bool,
    /// Largest WebSocket message accepted from a client.
    pub ws_max_message_bytes: usize,
}

impl Default for MvcConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
            pretty_json: false,
            ws_max_message_bytes: 64 * 1024,
        }
    }
}

#[derive(Deserialize, Default)]
struct ConfigDocument {
    #[serde(default)]
    mvc: Option<serde_yaml::Value>,
}

impl MvcConfig {
    /// Shared default settings, used when the application state does not
    /// provide its own.
    pub fn defaults() -> &'static MvcConfig {
        static DEFAULTS: OnceLock<MvcConfig> = OnceLock::new();
        DEFAULTS.get_or_init(MvcConfig::default)
    }

    /// Parse the `mvc` section of a YAML document. Missing keys keep their
    /// defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = MvcConfig::default();
        config.merge_yaml(yaml)?;
        Ok(config)
    }

    /// Parse the `mvc` section of a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Load(e.to_string()))?;
        Self::from_yaml_str(&content)
    }

    /// Load settings for `profile` from the working directory.
    ///
    /// Reads `application.yaml`, then `application-{profile}.yaml`, then the
    /// `.env` file (which never overwrites variables already set), then
    /// applies `AXMVC_*` environment overrides. The `AXMVC_PROFILE`
    /// variable replaces `profile` when set.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let active_profile =
            std::env::var("AXMVC_PROFILE").unwrap_or_else(|_| profile.to_string());

        let mut config = MvcConfig::default();
        config.merge_file(Path::new("application.yaml"))?;
        config.merge_file(Path::new(&format!("application-{active_profile}.yaml")))?;

        let _ = dotenvy::dotenv();

        config.apply_overrides(std::env::vars())?;
        tracing::debug!(profile = %active_profile, ?config, "loaded mvc config");
        Ok(config)
    }

    /// Apply `AXMVC_*` overrides from an iterator of `(name, value)` pairs.
    /// Unrelated names are ignored.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "AXMVC_MAX_BODY_BYTES" => self.max_body_bytes = parse_override(key, value)?,
                "AXMVC_PRETTY_JSON" => self.pretty_json = parse_override(key, value)?,
                "AXMVC_WS_MAX_MESSAGE_BYTES" => {
                    self.ws_max_message_bytes = parse_override(key, value)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Ok(());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
        self.merge_yaml(&content)
    }

    fn merge_yaml(&mut self, yaml: &str) -> Result<(), ConfigError> {
        let doc: Option<ConfigDocument> =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Load(e.to_string()))?;
        let Some(serde_yaml::Value::Mapping(section)) = doc.and_then(|d| d.mvc) else {
            return Ok(());
        };

        // Overlay the file's keys on top of the current values.
        let mut merged = match serde_yaml::to_value(&*self) {
            Ok(serde_yaml::Value::Mapping(current)) => current,
            Ok(_) => serde_yaml::Mapping::new(),
            Err(e) => return Err(ConfigError::Load(e.to_string())),
        };
        for (k, v) in section {
            merged.insert(k, v);
        }
        *self = serde_yaml::from_value(serde_yaml::Value::Mapping(merged))
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}
