// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! `sumologic.yaml` configuration source.
//!
//! A missing file is not an error: the source simply contributes nothing.

use std::path::PathBuf;

use figment::{
    providers::{Format, Yaml},
    Figment,
};

use crate::config::{Config, ConfigError, ConfigSource, PartialConfig};

#[derive(Debug, PartialEq, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct YamlConfigSource {
    pub path: PathBuf,
}

impl ConfigSource for YamlConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError> {
        let figment = Figment::new().merge(Yaml::file(self.path.clone()));

        match figment.extract::<PartialConfig>() {
            Ok(yaml_config) => yaml_config.merge_into(config),
            Err(e) => Err(ConfigError::Parse(format!(
                "Failed to parse config from yaml file: {e}, using default config."
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::compress::Compression;
    use crate::config::log_level::LogLevel;
    use crate::format::LogFormat;

    #[test]
    fn test_merge_config_overrides_with_yaml_file() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "sumologic.yaml",
                r#"
url: "https://collectors.sumologic.com/receiver/v1/http/token"
client: "collector-1"
source_host: "web-01"
source_name: "nginx"
source_category: "prod/web"
log_format: "text"
compress_encoding: "zstd"
max_request_body_size: 20971520
max_buffer_size: 50
metadata_attributes:
  - "^k8s\\."
  - "^host$"
timeout: 10
proxy_https: "https://proxy.example.com"
log_level: "debug"
"#,
            )?;

            let mut config = Config::default();
            let source = YamlConfigSource {
                path: Path::new("sumologic.yaml").to_path_buf(),
            };
            source.load(&mut config).expect("Failed to load config");

            let expected = Config {
                url: "https://collectors.sumologic.com/receiver/v1/http/token".to_string(),
                client: "collector-1".to_string(),
                source_host: "web-01".to_string(),
                source_name: "nginx".to_string(),
                source_category: "prod/web".to_string(),
                log_format: LogFormat::Text,
                compress_encoding: Compression::Zstd,
                max_request_body_size: 20_971_520,
                max_buffer_size: 50,
                metadata_attributes: vec!["^k8s\\.".to_string(), "^host$".to_string()],
                timeout: Duration::from_secs(10),
                proxy_https: Some("https://proxy.example.com".to_string()),
                log_level: LogLevel::Debug,
                ..Config::default()
            };

            assert_eq!(config, expected);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();

            let mut config = Config::default();
            let source = YamlConfigSource {
                path: Path::new("sumologic.yaml").to_path_buf(),
            };
            source.load(&mut config).expect("Failed to load config");

            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("sumologic.yaml", "url: [unclosed")?;

            let mut config = Config::default();
            let source = YamlConfigSource {
                path: Path::new("sumologic.yaml").to_path_buf(),
            };

            assert!(matches!(
                source.load(&mut config),
                Err(ConfigError::Parse(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("sumologic.yaml", "compress_encoding: brotli\n")?;

            let mut config = Config::default();
            let source = YamlConfigSource {
                path: Path::new("sumologic.yaml").to_path_buf(),
            };

            assert!(matches!(
                source.load(&mut config),
                Err(ConfigError::UnknownCompression(_))
            ));
            Ok(())
        });
    }
}
