// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Configuration Module
//!
//! Configuration sources are applied in order, later sources overriding earlier ones:
//!
//! 1. **Defaults** - [`Config::default`]
//! 2. **YAML file** - `sumologic.yaml` in the configuration directory (if present)
//! 3. **Environment variables** - `SUMO_*` variables (highest priority)
//!
//! ## Edge Cases and Behaviors
//!
//! - Values of the wrong type (e.g. a map where a string is expected) are logged and ignored.
//! - A source that fails to parse entirely is logged and skipped.
//! - Unknown formats or encodings are fatal: the exporter must not start with them.
//! - `metadata_attributes` accepts a list or a comma separated string.
//! - `timeout` is expressed in seconds; zero falls back to the default.
//! - If `proxy_https` is unset, `HTTPS_PROXY` is used when present.

pub mod env;
pub mod log_level;
pub mod yaml;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, error};

use crate::compress::Compression;
use crate::config::{env::EnvConfigSource, log_level::LogLevel, yaml::YamlConfigSource};
use crate::format::{LogFormat, MetricFormat};

pub use crate::error::ConfigError;

pub const DEFAULT_CLIENT: &str = "otelcol";
pub const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 1_048_576;
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper macro to merge `Option<String>` fields into `String` fields.
#[macro_export]
macro_rules! merge_string {
    ($config:expr, $source:expr, $field:ident) => {
        if let Some(value) = &$source.$field {
            $config.$field.clone_from(value);
        }
    };
}

/// Helper macro to merge `Option<T>` fields into `T` fields when the option is `Some`.
#[macro_export]
macro_rules! merge_option_to_value {
    ($config:expr, $source:expr, $field:ident) => {
        if let Some(value) = &$source.$field {
            $config.$field = value.clone();
        }
    };
}

/// Helper macro to parse an `Option<String>` field into a typed field.
#[macro_export]
macro_rules! merge_parsed {
    ($config:expr, $source:expr, $field:ident) => {
        if let Some(value) = &$source.$field {
            $config.$field = value.parse()?;
        }
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Sumo Logic HTTP source endpoint.
    pub url: String,
    /// Sent as `X-Sumo-Client`.
    pub client: String,
    pub source_host: String,
    pub source_name: String,
    pub source_category: String,
    pub log_format: LogFormat,
    pub metric_format: MetricFormat,
    pub compress_encoding: Compression,
    /// Upper bound of an uncompressed payload, in bytes.
    pub max_request_body_size: usize,
    /// Records accumulated before a forced flush.
    pub max_buffer_size: usize,
    /// Patterns selecting the attribute keys that become metadata.
    pub metadata_attributes: Vec<String>,
    pub timeout: Duration,
    pub proxy_https: Option<String>,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: String::new(),
            client: DEFAULT_CLIENT.to_string(),
            source_host: String::new(),
            source_name: String::new(),
            source_category: String::new(),
            log_format: LogFormat::default(),
            metric_format: MetricFormat::default(),
            compress_encoding: Compression::default(),
            max_request_body_size: DEFAULT_MAX_REQUEST_BODY_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            metadata_attributes: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            proxy_https: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Rejects settings the exporter cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if self.max_request_body_size == 0 {
            return Err(ConfigError::ZeroLimit("max_request_body_size"));
        }
        if self.max_buffer_size == 0 {
            return Err(ConfigError::ZeroLimit("max_buffer_size"));
        }
        Ok(())
    }
}

/// Settings as read from one source. Every field is optional so sources can be layered.
#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PartialConfig {
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub client: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub source_host: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub source_name: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub source_category: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub log_format: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub metric_format: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub compress_encoding: Option<String>,
    #[serde(deserialize_with = "deserialize_option_lossless")]
    pub max_request_body_size: Option<usize>,
    #[serde(deserialize_with = "deserialize_option_lossless")]
    pub max_buffer_size: Option<usize>,
    #[serde(deserialize_with = "deserialize_string_or_array")]
    pub metadata_attributes: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_optional_duration_from_seconds")]
    pub timeout: Option<Duration>,
    #[serde(deserialize_with = "deserialize_optional_string")]
    pub proxy_https: Option<String>,
    pub log_level: Option<LogLevel>,
}

impl PartialConfig {
    /// Applies the fields present in this source on top of `config`.
    pub fn merge_into(&self, config: &mut Config) -> Result<(), ConfigError> {
        merge_string!(config, self, url);
        merge_string!(config, self, client);
        merge_string!(config, self, source_host);
        merge_string!(config, self, source_name);
        merge_string!(config, self, source_category);
        merge_parsed!(config, self, log_format);
        merge_parsed!(config, self, metric_format);
        merge_parsed!(config, self, compress_encoding);
        merge_option_to_value!(config, self, max_request_body_size);
        merge_option_to_value!(config, self, max_buffer_size);
        merge_option_to_value!(config, self, metadata_attributes);
        merge_option_to_value!(config, self, timeout);
        merge_option_to_value!(config, self, log_level);
        if self.proxy_https.is_some() {
            config.proxy_https.clone_from(&self.proxy_https);
        }
        Ok(())
    }
}

#[allow(clippy::module_name_repetitions)]
pub trait ConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError>;
}

#[derive(Default)]
#[allow(clippy::module_name_repetitions)]
pub struct ConfigBuilder {
    sources: Vec<Box<dyn ConfigSource>>,
    config: Config,
}

#[allow(clippy::module_name_repetitions)]
impl ConfigBuilder {
    #[must_use]
    pub fn add_source(mut self, source: Box<dyn ConfigSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn build(&mut self) -> Result<Config, ConfigError> {
        let mut failed_sources = 0;
        for source in &self.sources {
            match source.load(&mut self.config) {
                Ok(()) => (),
                Err(ConfigError::Parse(e)) => {
                    error!("Failed to load config: {}", e);
                    failed_sources += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if !self.sources.is_empty() && failed_sources == self.sources.len() {
            debug!("All sources failed to load config, using default config.");
        }

        if self.config.proxy_https.is_none() {
            if let Ok(https_proxy) = std::env::var("HTTPS_PROXY") {
                self.config.proxy_https = Some(https_proxy);
            }
        }

        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// Loads `sumologic.yaml` from `config_directory`, then the `SUMO_*` environment.
pub fn get_config(config_directory: &Path) -> Result<Config, ConfigError> {
    let path = config_directory.join("sumologic.yaml");
    ConfigBuilder::default()
        .add_source(Box::new(YamlConfigSource { path }))
        .add_source(Box::new(EnvConfigSource))
        .build()
}

pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        // numbers are accepted as strings, e.g. a numeric source name read from the environment
        Value::Number(n) => Ok(Some(n.to_string())),
        other => {
            error!(
                "Failed to parse value, expected a string, got: {}, ignoring",
                other
            );
            Ok(None)
        }
    }
}

pub fn deserialize_option_lossless<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => match n.as_u64().and_then(|v| usize::try_from(v).ok()) {
            Some(v) => Ok(Some(v)),
            None => {
                error!("Failed to parse value, expected a non-negative integer, got: {}, ignoring", n);
                Ok(None)
            }
        },
        Value::String(s) => match s.trim().parse::<usize>() {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                error!("Failed to parse value {:?}: {}, ignoring", s, e);
                Ok(None)
            }
        },
        other => {
            error!(
                "Failed to parse value, expected an integer, got: {}, ignoring",
                other
            );
            Ok(None)
        }
    }
}

pub fn deserialize_string_or_array<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrArrayVisitor;

    impl<'de> serde::de::Visitor<'de> for StringOrArrayVisitor {
        type Value = Option<Vec<String>>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a comma separated string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ))
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::SeqAccess<'de>,
        {
            let mut values = Vec::new();
            while let Some(value) = seq.next_element::<Value>()? {
                match value {
                    Value::String(s) => values.push(s),
                    other => error!("Ignoring non-string list entry: {}", other),
                }
            }
            Ok(Some(values))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrArrayVisitor)
}

pub fn deserialize_optional_duration_from_seconds<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Duration>, D::Error> {
    let seconds = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match seconds {
        Some(s) if s > 0.0 && s.is_finite() => Ok(Some(Duration::from_secs_f64(s))),
        Some(_) => {
            debug!("Timeout must be positive, using default");
            Ok(None)
        }
        None => {
            error!("Failed to parse timeout, expected seconds, ignoring");
            Ok(None)
        }
    }
}
