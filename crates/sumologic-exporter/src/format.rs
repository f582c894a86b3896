// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire formats of records and payloads.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, FormatError};
use crate::filter::MetadataFilter;
use crate::logs::LogRecord;

/// Key holding the record body inside a JSON line.
pub const LOG_KEY: &str = "log";

/// How a log record is rendered into its line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// The body, verbatim.
    Text,
    /// A JSON object of the payload attributes plus the body under [`LOG_KEY`].
    #[default]
    Json,
}

impl LogFormat {
    /// Renders one record. Only the JSON format can fail.
    pub fn format_line(
        self,
        record: &LogRecord,
        filter: &MetadataFilter,
    ) -> Result<String, FormatError> {
        match self {
            LogFormat::Text => Ok(record.body.clone()),
            LogFormat::Json => {
                let mut data = filter.filter_out(&record.attributes);
                data.insert(LOG_KEY.to_string(), record.body.clone());
                Ok(serde_json::to_string(&data)?)
            }
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::UnknownLogFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Metric payload flavours accepted by the HTTP source. Rendering metrics is
/// done upstream; the transport only needs the matching content type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MetricFormat {
    Carbon2,
    Graphite,
    #[default]
    Prometheus,
}

impl MetricFormat {
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            MetricFormat::Carbon2 => "application/vnd.sumologic.carbon2",
            MetricFormat::Graphite => "application/vnd.sumologic.graphite",
            MetricFormat::Prometheus => "application/vnd.sumologic.prometheus",
        }
    }
}

impl FromStr for MetricFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "carbon2" => Ok(MetricFormat::Carbon2),
            "graphite" => Ok(MetricFormat::Graphite),
            "prometheus" => Ok(MetricFormat::Prometheus),
            _ => Err(ConfigError::UnknownMetricFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_line_is_body_verbatim() {
        let filter = MetadataFilter::new([".*"]).unwrap();
        let record = LogRecord::new("Example \"log\"\twith tab").with_attribute("k", "v");

        let line = LogFormat::Text.format_line(&record, &filter).unwrap();
        assert_eq!(line, "Example \"log\"\twith tab");
    }

    #[test]
    fn test_json_line_contains_payload_attributes() {
        let filter = MetadataFilter::new(Vec::<String>::new()).unwrap();
        let record = LogRecord::new("Example log")
            .with_attribute("key2", "value2")
            .with_attribute("key1", "value1");

        let line = LogFormat::Json.format_line(&record, &filter).unwrap();
        assert_eq!(
            line,
            r#"{"key1":"value1","key2":"value2","log":"Example log"}"#
        );
    }

    #[test]
    fn test_json_line_strips_metadata() {
        let filter = MetadataFilter::new(["^host$"]).unwrap();
        let record = LogRecord::new("body")
            .with_attribute("host", "a")
            .with_attribute("k", "v");

        let line = LogFormat::Json.format_line(&record, &filter).unwrap();
        assert_eq!(line, r#"{"k":"v","log":"body"}"#);
    }

    #[test]
    fn test_json_body_wins_over_log_attribute() {
        let filter = MetadataFilter::new(Vec::<String>::new()).unwrap();
        let record = LogRecord::new("real body").with_attribute("log", "shadowed");

        let line = LogFormat::Json.format_line(&record, &filter).unwrap();
        assert_eq!(line, r#"{"log":"real body"}"#);
    }

    #[test]
    fn test_json_line_escapes_body() {
        let filter = MetadataFilter::new(Vec::<String>::new()).unwrap();
        let record = LogRecord::new("line\nwith \"quotes\"");

        let line = LogFormat::Json.format_line(&record, &filter).unwrap();
        assert_eq!(line, r#"{"log":"line\nwith \"quotes\""}"#);
    }

    #[test]
    fn test_json_line_leaves_html_characters_unescaped() {
        let filter = MetadataFilter::new(Vec::<String>::new()).unwrap();
        let record = LogRecord::new("<a href=\"x\">&</a>");

        let line = LogFormat::Json.format_line(&record, &filter).unwrap();
        assert_eq!(line, r#"{"log":"<a href=\"x\">&</a>"}"#);
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(LogFormat::from_str("text").unwrap(), LogFormat::Text);
        assert_eq!(LogFormat::from_str(" JSON ").unwrap(), LogFormat::Json);
        assert!(matches!(
            LogFormat::from_str("dummy"),
            Err(ConfigError::UnknownLogFormat(_))
        ));
    }

    #[test]
    fn test_metric_content_types() {
        assert_eq!(
            MetricFormat::from_str("carbon2").unwrap().content_type(),
            "application/vnd.sumologic.carbon2"
        );
        assert_eq!(
            MetricFormat::from_str("Graphite").unwrap().content_type(),
            "application/vnd.sumologic.graphite"
        );
        assert_eq!(
            MetricFormat::default().content_type(),
            "application/vnd.sumologic.prometheus"
        );
        assert!(MetricFormat::from_str("influx").is_err());
    }
}
