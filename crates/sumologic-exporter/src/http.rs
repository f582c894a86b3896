// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client construction.

use std::time::Duration;

use tracing::debug;

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(270);
const TCP_KEEPALIVE: Duration = Duration::from_secs(120);

/// Builds a reqwest client with an optional HTTPS proxy and a per-request timeout.
///
/// An unparsable proxy URL is an error rather than a silent direct connection.
pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(POOL_IDLE_TIMEOUT))
        .tcp_keepalive(Some(TCP_KEEPALIVE));

    if let Some(proxy) = proxy_url {
        debug!("Using HTTPS proxy {}", proxy);
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_without_proxy() {
        assert!(build_client(None, Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_build_client_with_proxy() {
        assert!(build_client(Some("https://proxy.example.com:3128"), Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_build_client_rejects_invalid_proxy() {
        assert!(build_client(Some("not a url"), Duration::from_secs(5)).is_err());
    }
}
