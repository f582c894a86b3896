// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP delivery of one payload to the Sumo Logic HTTP source.
//!
//! Every request carries `X-Sumo-Client` and `X-Sumo-Fields` (even when the fields
//! are empty). `X-Sumo-Host`, `X-Sumo-Name` and `X-Sumo-Category` are only set when
//! configured. Status codes in `[200, 400)` count as delivered.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::error::{ConfigError, SendError};
use crate::filter::Fields;
use crate::http::build_client;

pub const HEADER_CLIENT: &str = "X-Sumo-Client";
pub const HEADER_HOST: &str = "X-Sumo-Host";
pub const HEADER_NAME: &str = "X-Sumo-Name";
pub const HEADER_CATEGORY: &str = "X-Sumo-Category";
pub const HEADER_FIELDS: &str = "X-Sumo-Fields";

pub const CONTENT_TYPE_LOGS: &str = "application/x-www-form-urlencoded";

/// Kind of payload being delivered; selects the content type.
///
/// [`LogsExporter`](crate::exporter::LogsExporter) only delivers logs. Metric
/// payloads are rendered by the caller and sent with [`Transport::send`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pipeline {
    Logs,
    Metrics,
}

impl Pipeline {
    /// Component prefix of diagnostics about this pipeline.
    #[must_use]
    pub fn log_prefix(self) -> &'static str {
        match self {
            Pipeline::Logs => "LOGS",
            Pipeline::Metrics => "METRICS",
        }
    }
}

pub struct Transport {
    client: reqwest::Client,
    config: Arc<Config>,
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, SendError> {
    HeaderValue::from_str(value).map_err(|source| SendError::InvalidHeader { name, source })
}

impl Transport {
    pub fn new(config: Arc<Config>) -> Result<Self, ConfigError> {
        let client = build_client(config.proxy_https.as_deref(), config.timeout)
            .map_err(ConfigError::HttpClient)?;
        Ok(Transport { client, config })
    }

    pub fn headers(&self, pipeline: Pipeline, fields: &Fields) -> Result<HeaderMap, SendError> {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_CLIENT, header_value(HEADER_CLIENT, &self.config.client)?);

        for (name, value) in [
            (HEADER_HOST, &self.config.source_host),
            (HEADER_NAME, &self.config.source_name),
            (HEADER_CATEGORY, &self.config.source_category),
        ] {
            if !value.is_empty() {
                headers.insert(name, header_value(name, value)?);
            }
        }

        let content_type = match pipeline {
            Pipeline::Logs => CONTENT_TYPE_LOGS,
            Pipeline::Metrics => self.config.metric_format.content_type(),
        };
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));

        if let Some(encoding) = self.config.compress_encoding.content_encoding() {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
        }

        headers.insert(HEADER_FIELDS, header_value(HEADER_FIELDS, fields.as_str())?);
        Ok(headers)
    }

    /// Compresses and posts `body`. Aborts with [`SendError::Cancelled`] as soon as
    /// `cancel` fires, including before the request is issued.
    pub async fn send(
        &self,
        pipeline: Pipeline,
        body: &[u8],
        fields: &Fields,
        cancel: &CancellationToken,
    ) -> Result<(), SendError> {
        let headers = self.headers(pipeline, fields)?;
        let data = self
            .config
            .compress_encoding
            .compress(body)
            .map_err(SendError::Compression)?;

        let request = self
            .client
            .post(&self.config.url)
            .timeout(self.config.timeout)
            .headers(headers)
            .body(data);

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SendError::Cancelled),
            response = request.send() => response?,
        };

        let status = response.status();
        if (200..400).contains(&status.as_u16()) {
            debug!(
                "{} | Sent {} bytes ({} compressed), status {}",
                pipeline.log_prefix(),
                body.len(),
                self.config.compress_encoding,
                status
            );
            Ok(())
        } else {
            Err(SendError::Status(status))
        }
    }
}
