// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Input data model: resource → scope → record nesting.

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeValue, Attributes};

/// A single log record. The exporter only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRecord {
    pub body: String,
    pub attributes: Attributes,
}

impl LogRecord {
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        LogRecord {
            body: body.into(),
            attributes: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Records emitted by one instrumentation scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeLogs {
    pub name: Option<String>,
    pub log_records: Vec<LogRecord>,
}

/// Records grouped under one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLogs {
    pub resource: Attributes,
    pub scope_logs: Vec<ScopeLogs>,
}

impl ResourceLogs {
    /// Convenience for a resource holding a single unnamed scope.
    #[must_use]
    pub fn from_records(log_records: Vec<LogRecord>) -> Self {
        ResourceLogs {
            resource: Attributes::new(),
            scope_logs: vec![ScopeLogs {
                name: None,
                log_records,
            }],
        }
    }

    /// Records in scope order, then record order.
    pub fn records(&self) -> impl Iterator<Item = &LogRecord> {
        self.scope_logs
            .iter()
            .flat_map(|scope| scope.log_records.iter())
    }
}

/// Total number of records across all resources.
#[must_use]
pub fn record_count(logs: &[ResourceLogs]) -> usize {
    logs.iter().map(|resource| resource.records().count()).sum()
}
