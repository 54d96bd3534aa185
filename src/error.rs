// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error type shared by every wallet manager.
//!
//! Failures carry the underlying cause as text rather than a closed code
//! taxonomy. JSON-RPC `error{code,message}` payloads keep their fields so a
//! caller can show the node's message verbatim.

use crate::blockchain::retry::Retryable;

/// Errors that can occur while talking to a blockchain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Account counter is unknown, update the wallet first")]
    CounterUnknown,

    #[error("Public key reveal status is unknown, request the fee first")]
    RevealStatusUnknown,

    #[error("Account nonce is unknown, update the wallet first")]
    NonceUnknown,

    #[error("Signing failed: {0}")]
    Signer(String),

    #[error("Operation rejected by node: {0}")]
    Rejected(String),

    #[error("Unsupported blockchain: {0}")]
    UnsupportedBlockchain(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Retryable for WalletError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
