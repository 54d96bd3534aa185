// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM JSON-RPC client.
//!
//! Every call shares the `{jsonrpc:"2.0", id:67, method, params}` envelope.
//! Reads go through the shared [`RetryPolicy`]; `eth_sendRawTransaction`
//! is issued exactly once.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, U256};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::erc20::balance_of_calldata;
use super::fee::{fee_tiers_display, fee_tiers_wei, FeeTiers};
use crate::blockchain::retry::{execute_with_retry, RetryPolicy};
use crate::blockchain::transport::HttpTransport;
use crate::blockchain::types::Token;
use crate::blockchain::units::{from_base_units, parse_hex_quantity};
use crate::error::WalletError;

const JSON_RPC_VERSION: &str = "2.0";
const JSON_RPC_ID: u64 = 67;

/// Block tag for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Pending,
}

impl BlockTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Pending => "pending",
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Account state read in one `update()`.
#[derive(Debug, Clone, PartialEq)]
pub struct EthereumInfo {
    pub balance: Decimal,
    /// Keyed by contract address as configured on the token.
    pub token_balances: HashMap<String, Decimal>,
    pub tx_count: u64,
    pub pending_tx_count: u64,
}

/// JSON-RPC client for one EVM node.
#[derive(Clone)]
pub struct EthereumNetworkService {
    transport: Arc<dyn HttpTransport>,
    rpc_url: String,
    retry: Arc<RetryPolicy>,
    decimals: u32,
}

impl std::fmt::Debug for EthereumNetworkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumNetworkService")
            .field("rpc_url", &self.rpc_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl EthereumNetworkService {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        rpc_url: impl Into<String>,
        retry: Arc<RetryPolicy>,
        decimals: u32,
    ) -> Self {
        Self {
            transport,
            rpc_url: rpc_url.into(),
            retry,
            decimals,
        }
    }

    /// One JSON-RPC round trip. A non-null `error` becomes [`WalletError::Rpc`].
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let body = serde_json::to_value(JsonRpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            id: JSON_RPC_ID,
            method,
            params,
        })
        .map_err(|e| WalletError::InvalidResponse(e.to_string()))?;

        let raw = self.transport.post(&self.rpc_url, &body).await?;
        let response: JsonRpcResponse = serde_json::from_value(raw)
            .map_err(|e| WalletError::InvalidResponse(format!("{method}: {e}")))?;

        if let Some(error) = response.error {
            return Err(WalletError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response
            .result
            .filter(|result| !result.is_null())
            .ok_or_else(|| WalletError::InvalidResponse(format!("{method}: missing result")))
    }

    async fn read(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        execute_with_retry(&self.retry, method, || self.request(method, params.clone())).await
    }

    async fn read_quantity(&self, method: &str, params: Value) -> Result<U256, WalletError> {
        let result = self.read(method, params).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| WalletError::InvalidResponse(format!("{method}: result is not a string")))?;
        parse_hex_quantity(hex)
    }

    /// `eth_getBalance` at the latest block, in wei.
    pub async fn get_balance(&self, address: &str) -> Result<U256, WalletError> {
        self.read_quantity("eth_getBalance", json!([address, BlockTag::Latest.as_str()]))
            .await
    }

    /// `eth_getTransactionCount` for the given block tag.
    pub async fn get_transaction_count(
        &self,
        address: &str,
        tag: BlockTag,
    ) -> Result<u64, WalletError> {
        let count = self
            .read_quantity("eth_getTransactionCount", json!([address, tag.as_str()]))
            .await?;
        u64::try_from(count)
            .map_err(|_| WalletError::InvalidResponse(format!("transaction count {count} overflows")))
    }

    /// ERC-20 `balanceOf` through `eth_call`, in token base units.
    pub async fn get_token_balance(
        &self,
        address: &str,
        contract_address: &str,
    ) -> Result<U256, WalletError> {
        let owner = Address::from_str(address)
            .map_err(|e| WalletError::InvalidAddress(format!("{address}: {e}")))?;
        let call = json!({
            "data": balance_of_calldata(owner),
            "to": contract_address,
        });
        self.read_quantity("eth_call", json!([call, BlockTag::Latest.as_str()]))
            .await
    }

    /// `eth_gasPrice`, in wei.
    pub async fn get_gas_price(&self) -> Result<U256, WalletError> {
        self.read_quantity("eth_gasPrice", json!([])).await
    }

    /// Broadcast a signed transaction. Never retried.
    pub async fn send_raw_transaction(&self, signed_hex: &str) -> Result<String, WalletError> {
        let result = self
            .request("eth_sendRawTransaction", json!([signed_hex]))
            .await?;
        let tx_hash = result.as_str().ok_or_else(|| {
            WalletError::InvalidResponse("eth_sendRawTransaction: result is not a string".into())
        })?;

        info!(tx_hash = %tx_hash, "Transaction broadcast");
        Ok(tx_hash.to_string())
    }

    /// Balance, nonces and token balances, fetched concurrently.
    ///
    /// All reads must succeed; a failing token read fails the whole call.
    pub async fn get_info(&self, address: &str, tokens: &[Token]) -> Result<EthereumInfo, WalletError> {
        let token_reads = tokens.iter().map(|token| async move {
            let raw = self.get_token_balance(address, &token.contract_address).await?;
            let value = from_base_units(raw, token.decimals)?;
            Ok::<_, WalletError>((token.contract_address.clone(), value))
        });

        let (balance, tx_count, pending_tx_count, token_balances) = tokio::try_join!(
            self.get_balance(address),
            self.get_transaction_count(address, BlockTag::Latest),
            self.get_transaction_count(address, BlockTag::Pending),
            try_join_all(token_reads),
        )?;

        debug!(
            address = %address,
            tx_count,
            pending_tx_count,
            tokens = token_balances.len(),
            "Fetched EVM account state"
        );

        Ok(EthereumInfo {
            balance: from_base_units(balance, self.decimals)?,
            token_balances: token_balances.into_iter().collect(),
            tx_count,
            pending_tx_count,
        })
    }

    /// Fee tiers for an operation consuming `gas_limit` gas, in the native
    /// display unit.
    pub async fn get_fee(&self, gas_limit: u64) -> Result<FeeTiers<Decimal>, WalletError> {
        let gas_price = self.get_gas_price().await?;
        let tiers = fee_tiers_wei(gas_price, gas_limit);

        debug!(
            gas_price = %gas_price,
            gas_limit,
            min_fee_wei = %tiers.minimum,
            "Computed EVM fee tiers"
        );

        fee_tiers_display(tiers, self.decimals)
    }
}
