// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tezos node REST client.
//!
//! Account reads are retried. The send path (header, forge, preapply,
//! injection) runs each call exactly once.

use std::sync::Arc;

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::blockchain::retry::{execute_with_retry, RetryPolicy};
use crate::blockchain::transport::{join_url, HttpTransport};
use crate::blockchain::units::from_base_units;
use crate::error::WalletError;

const CONTRACTS_PATH: &str = "/chains/main/blocks/head/context/contracts";
const HEADER_PATH: &str = "/chains/main/blocks/head/header";
const FORGE_PATH: &str = "/chains/main/blocks/head/helpers/forge/operations";
const PREAPPLY_PATH: &str = "/chains/main/blocks/head/helpers/preapply/operations";
const INJECTION_PATH: &str = "/injection/operation";

/// Decimals of the tez (1 XTZ = 10^6 mutez).
pub const TEZOS_DECIMALS: u32 = 6;

/// One manager operation. Numeric fields are decimal strings on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TezosOperationContent {
    pub kind: String,
    pub source: String,
    pub fee: String,
    pub counter: String,
    pub gas_limit: String,
    pub storage_limit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

/// Head block fields needed to forge and preapply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TezosHeader {
    pub protocol: String,
    pub hash: String,
}

#[derive(Debug, Deserialize)]
struct TezosAccountResponse {
    balance: String,
    #[serde(default)]
    counter: Option<String>,
}

#[derive(Debug, Serialize)]
struct TezosForgeBody<'a> {
    branch: &'a str,
    contents: &'a [TezosOperationContent],
}

#[derive(Debug, Serialize)]
struct TezosPreapplyBody<'a> {
    protocol: &'a str,
    branch: &'a str,
    contents: &'a [TezosOperationContent],
    signature: &'a str,
}

/// Account state read in one `update()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TezosInfo {
    pub balance: Decimal,
    pub counter: i64,
}

#[derive(Clone)]
pub struct TezosNetworkService {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    retry: Arc<RetryPolicy>,
}

impl std::fmt::Debug for TezosNetworkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TezosNetworkService")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn parse_mutez(raw: &str) -> Result<Decimal, WalletError> {
    let mutez = U256::from_str_radix(raw.trim(), 10)
        .map_err(|e| WalletError::InvalidResponse(format!("invalid balance {raw}: {e}")))?;
    from_base_units(mutez, TEZOS_DECIMALS)
}

fn as_string(value: Value, what: &str) -> Result<String, WalletError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(WalletError::InvalidResponse(format!(
            "{what}: expected a string, got {other}"
        ))),
    }
}

impl TezosNetworkService {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        retry: Arc<RetryPolicy>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            retry,
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn read(&self, path: String) -> Result<Value, WalletError> {
        let url = self.url(&path);
        execute_with_retry(&self.retry, &path, || self.transport.get(&url)).await
    }

    /// Balance and counter of `address`.
    pub async fn get_info(&self, address: &str) -> Result<TezosInfo, WalletError> {
        let raw = self.read(format!("{CONTRACTS_PATH}/{address}")).await?;
        let account: TezosAccountResponse = serde_json::from_value(raw)
            .map_err(|e| WalletError::InvalidResponse(format!("contract {address}: {e}")))?;

        let counter_raw = account.counter.ok_or_else(|| {
            WalletError::InvalidResponse(format!("contract {address} has no counter"))
        })?;
        let counter = counter_raw
            .trim()
            .parse::<i64>()
            .map_err(|e| WalletError::InvalidResponse(format!("invalid counter {counter_raw}: {e}")))?;

        Ok(TezosInfo {
            balance: parse_mutez(&account.balance)?,
            counter,
        })
    }

    /// Balance of any address, in XTZ.
    pub async fn get_balance(&self, address: &str) -> Result<Decimal, WalletError> {
        let raw = self
            .read(format!("{CONTRACTS_PATH}/{address}/balance"))
            .await?;
        parse_mutez(&as_string(raw, "balance")?)
    }

    /// Whether the manager key of `address` is on chain. A `null` key means
    /// the key has not been revealed yet.
    pub async fn is_public_key_revealed(&self, address: &str) -> Result<bool, WalletError> {
        let raw = self
            .read(format!("{CONTRACTS_PATH}/{address}/manager_key"))
            .await?;
        Ok(!raw.is_null())
    }

    pub async fn get_header(&self) -> Result<TezosHeader, WalletError> {
        let raw = self.transport.get(&self.url(HEADER_PATH)).await?;
        serde_json::from_value(raw)
            .map_err(|e| WalletError::InvalidResponse(format!("header: {e}")))
    }

    /// Remote forge of `contents` against `branch`. Returns the forged hex.
    pub async fn forge_contents(
        &self,
        branch: &str,
        contents: &[TezosOperationContent],
    ) -> Result<String, WalletError> {
        let body = serde_json::to_value(TezosForgeBody { branch, contents })
            .map_err(|e| WalletError::InvalidResponse(e.to_string()))?;
        let raw = self.transport.post(&self.url(FORGE_PATH), &body).await?;
        let forged = as_string(raw, "forge")?;

        if alloy::hex::decode(&forged).is_err() {
            return Err(WalletError::InvalidResponse(format!(
                "forge returned non-hex data: {forged}"
            )));
        }
        Ok(forged)
    }

    /// Dry-run the signed operation. Every operation result must be
    /// `applied`.
    pub async fn check_transaction(
        &self,
        header: &TezosHeader,
        contents: &[TezosOperationContent],
        signature: &str,
    ) -> Result<(), WalletError> {
        let body = serde_json::to_value([TezosPreapplyBody {
            protocol: &header.protocol,
            branch: &header.hash,
            contents,
            signature,
        }])
        .map_err(|e| WalletError::InvalidResponse(e.to_string()))?;

        let raw = self.transport.post(&self.url(PREAPPLY_PATH), &body).await?;
        let statuses = operation_statuses(&raw);
        if statuses.is_empty() {
            return Err(WalletError::InvalidResponse(
                "preapply returned no operation results".into(),
            ));
        }

        if let Some((status, errors)) = statuses.iter().find(|(status, _)| status != "applied") {
            return Err(WalletError::Rejected(match errors {
                Some(errors) => format!("{status}: {errors}"),
                None => status.clone(),
            }));
        }

        debug!(operations = statuses.len(), "Preapply succeeded");
        Ok(())
    }

    /// Inject `forged || signature` (hex). Returns the operation hash.
    pub async fn send_transaction(&self, signed_hex: &str) -> Result<String, WalletError> {
        let body = Value::String(signed_hex.to_string());
        let raw = self.transport.post(&self.url(INJECTION_PATH), &body).await?;
        let operation_hash = as_string(raw, "injection")?;

        info!(operation_hash = %operation_hash, "Operation injected");
        Ok(operation_hash)
    }
}

/// `(status, errors)` of every `metadata.operation_result` in a preapply
/// response.
fn operation_statuses(response: &Value) -> Vec<(String, Option<String>)> {
    response
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|operation| operation.get("contents")?.as_array())
        .flatten()
        .filter_map(|content| content.get("metadata")?.get("operation_result"))
        .filter_map(|result| {
            let status = result.get("status")?.as_str()?.to_string();
            let errors = result.get("errors").map(Value::to_string);
            Some((status, errors))
        })
        .collect()
}
