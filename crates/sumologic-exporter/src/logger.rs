// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Diagnostics output of the exporter.
//!
//! Events are written as the message and its fields, followed by the active
//! spans from the outermost one:
//!
//! ```text
//! SUMO_EXPORTER | WARN | LOGS | Failed to send 2 records (push records=2)
//! ```

use std::fmt::{self, Write};

use tracing_core::{Event, Subscriber};
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;

use crate::config::log_level::LogLevel;

pub const LOG_PREFIX: &str = "SUMO_EXPORTER";

/// Filter for `level`, with the HTTP stack silenced.
pub fn env_filter(level: LogLevel) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_new(format!("h2=off,hyper=off,rustls=off,{level}"))
}

#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{LOG_PREFIX} | {} | ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        let mut in_span = false;
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                writer.write_str(if in_span { " > " } else { " (" })?;
                in_span = true;
                writer.write_str(span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext
                    .get::<FormattedFields<N>>()
                    .filter(|fields| !fields.is_empty())
                {
                    write!(writer, " {fields}")?;
                }
            }
        }
        if in_span {
            writer.write_char(')')?;
        }

        writeln!(writer)
    }
}
