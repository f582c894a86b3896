// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! `SUMO_*` environment variable configuration source.
//!
//! | Variable | Field |
//! |---|---|
//! | `SUMO_URL` | `url` |
//! | `SUMO_CLIENT` | `client` |
//! | `SUMO_SOURCE_HOST` / `SUMO_SOURCE_NAME` / `SUMO_SOURCE_CATEGORY` | source overrides |
//! | `SUMO_LOG_FORMAT` | `text` or `json` |
//! | `SUMO_METRIC_FORMAT` | `carbon2`, `graphite` or `prometheus` |
//! | `SUMO_COMPRESS_ENCODING` | `gzip`, `deflate`, `zstd` or empty |
//! | `SUMO_MAX_REQUEST_BODY_SIZE` | bytes |
//! | `SUMO_MAX_BUFFER_SIZE` | records |
//! | `SUMO_METADATA_ATTRIBUTES` | comma separated patterns |
//! | `SUMO_TIMEOUT` | seconds |
//! | `SUMO_PROXY_HTTPS` | proxy URL |
//! | `SUMO_LOG_LEVEL` | `error` .. `trace` |

use figment::{providers::Env, Figment};

use crate::config::{Config, ConfigError, ConfigSource, PartialConfig};

pub const ENV_PREFIX: &str = "SUMO_";

#[derive(Debug, Clone, Copy, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError> {
        let figment = Figment::new().merge(Env::prefixed(ENV_PREFIX));

        match figment.extract::<PartialConfig>() {
            Ok(env_config) => env_config.merge_into(config),
            Err(e) => Err(ConfigError::Parse(format!(
                "Failed to parse config from environment variables: {e}, using default config."
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::compress::Compression;
    use crate::config::log_level::LogLevel;
    use crate::format::{LogFormat, MetricFormat};

    #[test]
    fn test_merge_config_overrides_with_environment_variables() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("SUMO_URL", "http://localhost:3000/receiver");
            jail.set_env("SUMO_SOURCE_CATEGORY", "staging/api");
            jail.set_env("SUMO_LOG_FORMAT", "text");
            jail.set_env("SUMO_METRIC_FORMAT", "graphite");
            jail.set_env("SUMO_COMPRESS_ENCODING", "deflate");
            jail.set_env("SUMO_MAX_REQUEST_BODY_SIZE", "4096");
            jail.set_env("SUMO_MAX_BUFFER_SIZE", "10");
            jail.set_env("SUMO_METADATA_ATTRIBUTES", "^host$,^k8s\\.pod");
            jail.set_env("SUMO_TIMEOUT", "30");
            jail.set_env("SUMO_LOG_LEVEL", "info");

            let mut config = Config::default();
            EnvConfigSource
                .load(&mut config)
                .expect("Failed to load config");

            assert_eq!(config.url, "http://localhost:3000/receiver");
            assert_eq!(config.source_category, "staging/api");
            assert_eq!(config.client, "otelcol");
            assert_eq!(config.log_format, LogFormat::Text);
            assert_eq!(config.metric_format, MetricFormat::Graphite);
            assert_eq!(config.compress_encoding, Compression::Deflate);
            assert_eq!(config.max_request_body_size, 4096);
            assert_eq!(config.max_buffer_size, 10);
            assert_eq!(
                config.metadata_attributes,
                vec!["^host$".to_string(), "^k8s\\.pod".to_string()]
            );
            assert_eq!(config.timeout, Duration::from_secs(30));
            assert_eq!(config.log_level, LogLevel::Info);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_numbers_are_ignored() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("SUMO_MAX_BUFFER_SIZE", "many");
            jail.set_env("SUMO_LOG_LEVEL", "chatty");

            let mut config = Config::default();
            EnvConfigSource
                .load(&mut config)
                .expect("Failed to load config");

            assert_eq!(config.max_buffer_size, 100);
            assert_eq!(config.log_level, LogLevel::Warn);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_yaml() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "sumologic.yaml",
                "url: \"http://from-yaml\"\nsource_name: \"yaml-name\"\n",
            )?;
            jail.set_env("SUMO_URL", "http://from-env");

            let config = crate::config::get_config(jail.directory())
                .expect("Failed to build config");

            assert_eq!(config.url, "http://from-env");
            assert_eq!(config.source_name, "yaml-name");
            Ok(())
        });
    }
}
