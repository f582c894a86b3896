// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;

/// Errors raised while building the exporter. Never raised during a push.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid metadata attribute pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unexpected log format: {0}")]
    UnknownLogFormat(String),

    #[error("Unexpected metric format: {0}")]
    UnknownMetricFormat(String),

    #[error("Unexpected compress encoding: {0}")]
    UnknownCompression(String),

    #[error("Endpoint URL is not set")]
    MissingUrl,

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// A single record could not be rendered into its wire line.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Failed to serialize log record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A payload could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Error during sending data: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Error during sending data: {0}")]
    Status(StatusCode),

    #[error("Failed to compress payload: {0}")]
    Compression(#[source] std::io::Error),

    #[error("Invalid value for header {name}: {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("Request cancelled")]
    Cancelled,
}

/// One accounting event inside a push.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Send(#[from] SendError),
}

/// Aggregate failure of a push: how many records were dropped and why.
#[derive(Debug, thiserror::Error)]
#[error("Dropped {dropped} log records: {}", join_errors(.errors))]
pub struct PushError {
    pub dropped: usize,
    pub errors: Vec<ExportError>,
}

fn join_errors(errors: &[ExportError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mentions_code() {
        let error = SendError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error.to_string(),
            "Error during sending data: 500 Internal Server Error"
        );
    }

    #[test]
    fn test_push_error_combines_messages() {
        let error = PushError {
            dropped: 3,
            errors: vec![
                ExportError::Send(SendError::Status(StatusCode::BAD_GATEWAY)),
                ExportError::Send(SendError::Cancelled),
            ],
        };

        assert_eq!(
            error.to_string(),
            "Dropped 3 log records: Error during sending data: 502 Bad Gateway; Request cancelled"
        );
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::ZeroLimit("max_buffer_size");
        assert_eq!(error.to_string(), "max_buffer_size must be greater than zero");

        let error = ConfigError::UnknownLogFormat("dummy".to_string());
        assert_eq!(error.to_string(), "Unexpected log format: dummy");
    }
}
