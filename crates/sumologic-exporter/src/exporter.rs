// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Push entry point.
//!
//! Records are walked once, resource by resource, scope by scope. Adjacent records
//! with the same [`Fields`] share payloads; a change of fields, a full buffer, or
//! the end of input flushes. Records with equal fields that are not adjacent are
//! never merged.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span, Instrument};

use crate::config::Config;
use crate::error::{ConfigError, PushError};
use crate::filter::{Fields, MetadataFilter};
use crate::logs::{record_count, ResourceLogs};
use crate::sender::BatchSender;
use crate::transport::Transport;

pub struct LogsExporter {
    config: Arc<Config>,
    filter: MetadataFilter,
    transport: Transport,
}

impl LogsExporter {
    /// Validates `config`, compiles the metadata patterns and builds the HTTP client.
    pub fn new(config: Arc<Config>) -> Result<Self, ConfigError> {
        config.validate()?;
        let filter = MetadataFilter::new(&config.metadata_attributes)?;
        let transport = Transport::new(Arc::clone(&config))?;

        Ok(LogsExporter {
            config,
            filter,
            transport,
        })
    }

    /// Sends every record in `logs`.
    ///
    /// Never stops early: the error, if any, reports how many records were dropped
    /// and every failure behind them.
    pub async fn push_logs(
        &self,
        cancel: &CancellationToken,
        logs: &[ResourceLogs],
    ) -> Result<(), PushError> {
        let records = record_count(logs);
        debug!("LOGS | Pushing {} records", records);

        self.drive(cancel, logs)
            .instrument(debug_span!("push", records))
            .await
    }

    async fn drive(
        &self,
        cancel: &CancellationToken,
        logs: &[ResourceLogs],
    ) -> Result<(), PushError> {
        let mut sender = BatchSender::new(&self.config, &self.transport, &self.filter, cancel);
        let mut previous: Option<Fields> = None;

        for record in logs.iter().flat_map(ResourceLogs::records) {
            let fields = self.filter.fields(&record.attributes);

            if previous.as_ref().is_some_and(|p| *p != fields) {
                sender.flush().await;
            }

            sender.append(record, &fields).await;
            previous = Some(fields);

            if sender.buffer_count() == self.config.max_buffer_size {
                sender.flush().await;
            }
        }

        sender.flush().await;
        sender.into_result()
    }
}
