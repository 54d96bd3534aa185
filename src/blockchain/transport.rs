// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP transport shared by every chain client.
//!
//! All network I/O goes through [`HttpTransport`], so chain clients can be
//! driven by a fake in tests and by [`ReqwestTransport`] in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::WalletError;

/// JSON over HTTP.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Value, WalletError>;

    async fn post(&self, url: &str, body: &Value) -> Result<Value, WalletError>;
}

/// Production transport built on `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, WalletError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WalletError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }

    async fn into_json(response: reqwest::Response) -> Result<Value, WalletError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(WalletError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| WalletError::InvalidResponse(format!("invalid JSON body: {e}")))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<Value, WalletError> {
        let response = self.http.get(url).send().await?;
        Self::into_json(response).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, WalletError> {
        let response = self.http.post(url).json(body).send().await?;
        Self::into_json(response).await
    }
}

/// Join a node base URL and an absolute path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Check that a configured node URL parses and uses HTTP(S).
pub fn validate_base_url(raw: &str) -> Result<(), WalletError> {
    let url: url::Url = raw
        .parse()
        .map_err(|e: url::ParseError| WalletError::Config(format!("invalid RPC URL {raw}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(WalletError::Config(format!(
            "unsupported RPC URL scheme {other} in {raw}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://rpc.tzbeta.net/", "/chains/main/blocks/head/header"),
            "https://rpc.tzbeta.net/chains/main/blocks/head/header"
        );
        assert_eq!(join_url("http://node", "injection/operation"), "http://node/injection/operation");
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://ethereum-rpc.publicnode.com").is_ok());
        assert!(validate_base_url("ws://localhost:8546").is_err());
        assert!(validate_base_url("not a url").is_err());
    }
}
