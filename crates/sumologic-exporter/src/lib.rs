// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Sumo Logic exporter
//!
//! Batches log records into size-bounded payloads and ships them to a Sumo Logic
//! HTTP source.
//!
//! ## Pipeline
//!
//! ```text
//!   ResourceLogs ─► exporter (group by fields) ─► sender (buffer, split)
//!                                                     │
//!                                                     v
//!                                 compress ─► transport (HTTP POST)
//! ```
//!
//! - [`filter`]: derives the metadata fingerprint ([`filter::Fields`]) of a record
//! - [`format`]: renders one record into its wire line
//! - [`sender`]: accumulates lines for one group and flushes them within the body limit
//! - [`exporter`]: walks the input once and drives the sender; the push entry point
//! - [`transport`]: header assembly and the HTTP request itself
//! - [`config`]: layered configuration (defaults, YAML, environment)

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod attribute;
pub mod compress;
pub mod config;
pub mod error;
pub mod exporter;
pub mod filter;
pub mod format;
pub mod http;
pub mod logger;
pub mod logs;
pub mod sender;
pub mod transport;
