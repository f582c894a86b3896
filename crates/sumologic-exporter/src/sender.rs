// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Accumulation of formatted lines into size-bounded payloads.
//!
//! A [`BatchSender`] lives for exactly one push. It owns the body being built for
//! the current group of records and the drop accounting of the whole push:
//!
//! - lines are joined with `\n`, never split, never truncated
//! - a line that would push a non-empty body past `max_request_body_size` first
//!   flushes the body, then starts a new one
//! - a line larger than the limit on its own is sent alone
//! - a failed payload counts every record it contained as dropped, once
//! - a record that cannot be formatted counts as one dropped record

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{ExportError, PushError};
use crate::filter::{Fields, MetadataFilter};
use crate::format::LogFormat;
use crate::logs::LogRecord;
use crate::transport::{Pipeline, Transport};

pub struct BatchSender<'a> {
    transport: &'a Transport,
    filter: &'a MetadataFilter,
    cancel: &'a CancellationToken,
    log_format: LogFormat,
    max_body_size: usize,

    body: Vec<u8>,
    body_records: usize,
    fields: Fields,

    sent: usize,
    dropped: usize,
    errors: Vec<ExportError>,
}

impl<'a> BatchSender<'a> {
    #[must_use]
    pub fn new(
        config: &Config,
        transport: &'a Transport,
        filter: &'a MetadataFilter,
        cancel: &'a CancellationToken,
    ) -> Self {
        BatchSender {
            transport,
            filter,
            cancel,
            log_format: config.log_format,
            max_body_size: config.max_request_body_size,
            body: Vec::new(),
            body_records: 0,
            fields: Fields::default(),
            sent: 0,
            dropped: 0,
            errors: Vec::new(),
        }
    }

    /// Records in the body awaiting the next flush.
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.body_records
    }

    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    #[must_use]
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Formats `record` and adds its line to the body sent with `fields`.
    ///
    /// Callers flush before switching to different `fields`.
    pub async fn append(&mut self, record: &LogRecord, fields: &Fields) {
        let line = match self.log_format.format_line(record, self.filter) {
            Ok(line) => line,
            Err(e) => {
                error!("LOGS | Dropping record: {}", e);
                self.dropped += 1;
                self.errors.push(e.into());
                return;
            }
        };

        // the separator counts towards the limit
        if !self.body.is_empty() && self.body.len() + 1 + line.len() > self.max_body_size {
            self.flush().await;
        }

        if self.body.is_empty() {
            self.fields.clone_from(fields);
        } else {
            self.body.push(b'\n');
        }
        self.body.extend_from_slice(line.as_bytes());
        self.body_records += 1;
    }

    /// Sends the current body, if any, and resets it whatever the outcome.
    pub async fn flush(&mut self) {
        if self.body.is_empty() {
            return;
        }

        match self
            .transport
            .send(Pipeline::Logs, &self.body, &self.fields, self.cancel)
            .await
        {
            Ok(()) => {
                debug!(
                    "LOGS | Flushed {} records ({} bytes) with fields [{}]",
                    self.body_records,
                    self.body.len(),
                    self.fields
                );
                self.sent += self.body_records;
            }
            Err(e) => {
                error!(
                    "LOGS | Failed to send {} records with fields [{}]: {}",
                    self.body_records, self.fields, e
                );
                self.dropped += self.body_records;
                self.errors.push(e.into());
            }
        }

        self.body.clear();
        self.body_records = 0;
    }

    /// Ends the push. Any pending body must already be flushed.
    pub fn into_result(self) -> Result<(), PushError> {
        debug!(
            "LOGS | Push finished: {} sent, {} dropped",
            self.sent, self.dropped
        );
        if self.dropped == 0 {
            Ok(())
        } else {
            Err(PushError {
                dropped: self.dropped,
                errors: self.errors,
            })
        }
    }
}
