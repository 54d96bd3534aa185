// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for the wallet manager integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relational_wallet_managers::blockchain::{HttpTransport, RetryPolicy, TransactionSigner};
use relational_wallet_managers::WalletError;
use serde_json::{json, Value};

/// Key of the web3 docs test account.
pub const EVM_KEY_HEX: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const EVM_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";
pub const EVM_DESTINATION: &str = "0x000000000000000000000000000000000000dEaD";
pub const USDC_CONTRACT: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

pub const EVM_RPC_URL: &str = "http://evm.test/rpc";
pub const TEZOS_RPC_URL: &str = "http://tezos.test";
pub const TEZOS_DESTINATION: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";

/// One request seen by [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct Call {
    pub key: String,
    pub body: Option<Value>,
}

/// Scripted transport.
///
/// Requests are keyed by JSON-RPC method (`eth_call:<contract>` for token
/// reads, `eth_getTransactionCount:<tag>` for nonces) or by URL path for
/// REST calls. Each key replays its queued replies in order and repeats the
/// last one once the queue is down to a single entry. Unscripted keys fail
/// with a non-retryable error.
#[derive(Default)]
pub struct FakeTransport {
    replies: Mutex<HashMap<String, VecDeque<Result<Value, WalletError>>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, key: &str, reply: Result<Value, WalletError>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Drop any queued replies for `key` and script `reply` instead.
    pub fn replace(&self, key: &str, reply: Result<Value, WalletError>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .insert(key.to_string(), VecDeque::from([reply]));
        self
    }

    /// Reply to a JSON-RPC method with `{"result": result}`.
    pub fn on_rpc(&self, method: &str, result: Value) -> &Self {
        self.on(method, Ok(json!({"jsonrpc": "2.0", "id": 67, "result": result})))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, key: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.key == key)
            .collect()
    }

    fn key_for(url: &str, body: Option<&Value>) -> String {
        if let Some(method) = body.and_then(|b| b.get("method")).and_then(Value::as_str) {
            let params = body.map(|b| &b["params"]);
            return match method {
                "eth_call" => {
                    let to = params
                        .and_then(|p| p[0]["to"].as_str())
                        .unwrap_or_default()
                        .to_ascii_lowercase();
                    format!("eth_call:{to}")
                }
                "eth_getTransactionCount" => {
                    let tag = params.and_then(|p| p[1].as_str()).unwrap_or_default();
                    format!("eth_getTransactionCount:{tag}")
                }
                _ => method.to_string(),
            };
        }

        url::Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string())
    }

    fn reply(&self, url: &str, body: Option<&Value>) -> Result<Value, WalletError> {
        let key = Self::key_for(url, body);
        self.calls.lock().unwrap().push(Call {
            key: key.clone(),
            body: body.cloned(),
        });

        let mut replies = self.replies.lock().unwrap();
        let Some(queue) = replies.get_mut(&key) else {
            return Err(WalletError::Http {
                status: 404,
                body: format!("no reply scripted for {key}"),
            });
        };

        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str) -> Result<Value, WalletError> {
        self.reply(url, None)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, WalletError> {
        self.reply(url, Some(body))
    }
}

/// Signer returning the same signature for every hash.
pub struct FixedSigner {
    pub key_id: String,
    pub signature: Vec<u8>,
    pub requests: Mutex<Vec<Vec<Vec<u8>>>>,
}

impl FixedSigner {
    pub fn new(key_id: &str, signature: Vec<u8>) -> Self {
        Self {
            key_id: key_id.to_string(),
            signature,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TransactionSigner for FixedSigner {
    async fn sign(&self, data: &[Vec<u8>], key_id: &str) -> Result<Vec<Vec<u8>>, WalletError> {
        if key_id != self.key_id {
            return Err(WalletError::Signer(format!("unknown key {key_id}")));
        }
        self.requests.lock().unwrap().push(data.to_vec());
        Ok(data.iter().map(|_| self.signature.clone()).collect())
    }
}

/// Retries without meaningful delays.
pub fn fast_retry(max_retries: u32) -> Arc<RetryPolicy> {
    Arc::new(RetryPolicy {
        max_retries,
        initial_delay_ms: 1,
        max_delay_ms: 2,
        backoff_multiplier: 1.0,
        jitter_factor: 0.0,
    })
}
