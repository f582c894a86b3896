// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Reads newline-delimited `ResourceLogs` JSON from a file (first argument) or
//! stdin and pushes it to the configured Sumo Logic HTTP source.
//!
//! Configuration comes from `sumologic.yaml` in `SUMO_CONFIG_DIR` (default: the
//! working directory) and `SUMO_*` environment variables. Logging starts at the
//! `SUMO_LOG_LEVEL` level and switches to the configured `log_level` once the
//! configuration is loaded. Exits with status 1 if any record was dropped.

use std::{env, path::PathBuf, process::ExitCode, str::FromStr, sync::Arc};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, EnvFilter, Registry};

use sumologic_exporter::{
    config::{self, log_level::LogLevel},
    exporter::LogsExporter,
    logger::{self, Formatter},
    logs::{record_count, ResourceLogs},
};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Installs the global subscriber with a filter that can be replaced later.
fn init_logging() -> Result<FilterHandle, String> {
    let log_level = env::var("SUMO_LOG_LEVEL")
        .ok()
        .and_then(|val| LogLevel::from_str(&val).ok())
        .unwrap_or_default();

    let filter = logger::env_filter(log_level).map_err(|e| e.to_string())?;
    let (filter, handle) = reload::Layer::new(filter);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().event_format(Formatter));

    tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())?;
    Ok(handle)
}

fn apply_log_level(handle: &FilterHandle, log_level: LogLevel) -> Result<(), String> {
    let filter = logger::env_filter(log_level).map_err(|e| e.to_string())?;
    handle.reload(filter).map_err(|e| e.to_string())
}

async fn read_resource_logs<R: AsyncBufRead + Unpin>(reader: R) -> std::io::Result<Vec<ResourceLogs>> {
    let mut lines = reader.lines();
    let mut logs = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ResourceLogs>(&line) {
            Ok(resource_logs) => logs.push(resource_logs),
            Err(e) => warn!("Skipping line {}: {}", line_number, e),
        }
    }

    Ok(logs)
}

#[tokio::main]
pub async fn main() -> ExitCode {
    let filter_handle = match init_logging() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!("Logging subsystem enabled");

    let config_directory = env::var("SUMO_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));

    let config = match config::get_config(&config_directory) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = apply_log_level(&filter_handle, config.log_level) {
        warn!("Unable to apply log level {}: {}", config.log_level, e);
    }
    debug!("Log level set to {}", config.log_level);

    let exporter = match LogsExporter::new(config) {
        Ok(exporter) => exporter,
        Err(e) => {
            error!("Unable to start exporter: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let input = match env::args().nth(1) {
        Some(path) => match tokio::fs::File::open(&path).await {
            Ok(file) => read_resource_logs(BufReader::new(file)).await,
            Err(e) => {
                error!("Unable to open {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => read_resource_logs(BufReader::new(tokio::io::stdin())).await,
    };

    let logs = match input {
        Ok(logs) => logs,
        Err(e) => {
            error!("Failed to read input: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight requests");
            ctrl_c_cancel.cancel();
        }
    });

    let total = record_count(&logs);
    match exporter.push_logs(&cancel, &logs).await {
        Ok(()) => {
            info!("Sent {} log records", total);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
