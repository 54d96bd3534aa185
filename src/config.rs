// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the wallet managers and the refresh binary. Configuration is loaded
//! from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ETHEREUM_RPC_URL` | Ethereum mainnet JSON-RPC endpoint | `https://ethereum-rpc.publicnode.com` |
//! | `ETHEREUM_TESTNET_RPC_URL` | Sepolia JSON-RPC endpoint | `https://ethereum-sepolia-rpc.publicnode.com` |
//! | `TEZOS_RPC_URL` | Tezos node base URL | `https://rpc.tzbeta.net` |
//! | `RPC_TIMEOUT_SECS` | Per-request HTTP timeout | `15` |
//! | `RPC_MAX_RETRIES` | Retries after the first attempt for reads | `3` |
//! | `RPC_RETRY_INITIAL_DELAY_MS` | Delay before the first retry | `200` |
//! | `REFRESH_INTERVAL_SECS` | Refresh period of the binary, `0` runs once | `0` |
//! | `ETHEREUM_PUBLIC_KEY` | Hex secp256k1 public key to track | Optional |
//! | `ETHEREUM_SIGNER_KEY_FILE` | PEM private key (SEC1 or PKCS#8) whose account is tracked | Optional |
//! | `TEZOS_PUBLIC_KEY` | Hex Ed25519 public key to track | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::time::Duration;

use crate::blockchain::retry::RetryPolicy;
use crate::blockchain::signing::LocalSecp256k1Signer;
use crate::blockchain::transport::validate_base_url;
use crate::blockchain::types::Blockchain;
use crate::error::WalletError;
use crate::logging::LogFormat;

pub const ETHEREUM_RPC_URL_ENV: &str = "ETHEREUM_RPC_URL";
pub const ETHEREUM_TESTNET_RPC_URL_ENV: &str = "ETHEREUM_TESTNET_RPC_URL";
pub const TEZOS_RPC_URL_ENV: &str = "TEZOS_RPC_URL";
pub const RPC_TIMEOUT_SECS_ENV: &str = "RPC_TIMEOUT_SECS";
pub const RPC_MAX_RETRIES_ENV: &str = "RPC_MAX_RETRIES";
pub const RPC_RETRY_INITIAL_DELAY_MS_ENV: &str = "RPC_RETRY_INITIAL_DELAY_MS";
pub const REFRESH_INTERVAL_SECS_ENV: &str = "REFRESH_INTERVAL_SECS";
pub const ETHEREUM_PUBLIC_KEY_ENV: &str = "ETHEREUM_PUBLIC_KEY";
pub const ETHEREUM_SIGNER_KEY_FILE_ENV: &str = "ETHEREUM_SIGNER_KEY_FILE";
pub const TEZOS_PUBLIC_KEY_ENV: &str = "TEZOS_PUBLIC_KEY";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// HTTP timeout applied to every node request.
///
/// # Default
/// 15 seconds
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 15;

pub const DEFAULT_RPC_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RPC_RETRY_INITIAL_DELAY_MS: u64 = 200;

/// Settings for the wallet managers and the refresh binary.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletConfig {
    pub ethereum_rpc_url: String,
    pub ethereum_testnet_rpc_url: String,
    pub tezos_rpc_url: String,
    pub rpc_timeout: Duration,
    pub retry: RetryPolicy,
    /// `None` refreshes once and exits.
    pub refresh_interval: Option<Duration>,
    pub ethereum_public_key: Option<Vec<u8>>,
    pub ethereum_signer_key_file: Option<PathBuf>,
    pub tezos_public_key: Option<Vec<u8>>,
    pub log_format: LogFormat,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            ethereum_rpc_url: Blockchain::Ethereum.network().rpc_url.to_string(),
            ethereum_testnet_rpc_url: Blockchain::EthereumTestnet.network().rpc_url.to_string(),
            tezos_rpc_url: Blockchain::Tezos.network().rpc_url.to_string(),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            retry: RetryPolicy::new(DEFAULT_RPC_MAX_RETRIES, DEFAULT_RPC_RETRY_INITIAL_DELAY_MS),
            refresh_interval: None,
            ethereum_public_key: None,
            ethereum_signer_key_file: None,
            tezos_public_key: None,
            log_format: LogFormat::default(),
        }
    }
}

impl WalletConfig {
    pub fn from_env() -> Result<Self, WalletError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WalletError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let url = |name: &str, default: String| -> Result<String, WalletError> {
            let value = optional(name).unwrap_or(default);
            validate_base_url(&value)?;
            Ok(value)
        };

        let rpc_timeout_secs = parse_or(optional(RPC_TIMEOUT_SECS_ENV), RPC_TIMEOUT_SECS_ENV, DEFAULT_RPC_TIMEOUT_SECS)?;
        if rpc_timeout_secs == 0 {
            return Err(WalletError::Config(format!(
                "{RPC_TIMEOUT_SECS_ENV} must be positive"
            )));
        }

        let max_retries = parse_or(optional(RPC_MAX_RETRIES_ENV), RPC_MAX_RETRIES_ENV, DEFAULT_RPC_MAX_RETRIES)?;
        let initial_delay_ms = parse_or(
            optional(RPC_RETRY_INITIAL_DELAY_MS_ENV),
            RPC_RETRY_INITIAL_DELAY_MS_ENV,
            DEFAULT_RPC_RETRY_INITIAL_DELAY_MS,
        )?;
        let refresh_secs = parse_or(optional(REFRESH_INTERVAL_SECS_ENV), REFRESH_INTERVAL_SECS_ENV, 0u64)?;

        let log_format = match optional(LOG_FORMAT_ENV) {
            Some(raw) => raw
                .parse()
                .map_err(|e| WalletError::Config(format!("{LOG_FORMAT_ENV}: {e}")))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            ethereum_rpc_url: url(ETHEREUM_RPC_URL_ENV, defaults.ethereum_rpc_url)?,
            ethereum_testnet_rpc_url: url(
                ETHEREUM_TESTNET_RPC_URL_ENV,
                defaults.ethereum_testnet_rpc_url,
            )?,
            tezos_rpc_url: url(TEZOS_RPC_URL_ENV, defaults.tezos_rpc_url)?,
            rpc_timeout: Duration::from_secs(rpc_timeout_secs),
            retry: RetryPolicy::new(max_retries, initial_delay_ms),
            refresh_interval: (refresh_secs > 0).then(|| Duration::from_secs(refresh_secs)),
            ethereum_public_key: optional(ETHEREUM_PUBLIC_KEY_ENV)
                .map(|raw| parse_hex_key(ETHEREUM_PUBLIC_KEY_ENV, &raw))
                .transpose()?,
            ethereum_signer_key_file: optional(ETHEREUM_SIGNER_KEY_FILE_ENV).map(PathBuf::from),
            tezos_public_key: optional(TEZOS_PUBLIC_KEY_ENV)
                .map(|raw| parse_hex_key(TEZOS_PUBLIC_KEY_ENV, &raw))
                .transpose()?,
            log_format,
        })
    }

    /// Public key of the Ethereum account to track.
    ///
    /// `ETHEREUM_PUBLIC_KEY` is used as is; otherwise the key is derived from
    /// the PEM file in `ETHEREUM_SIGNER_KEY_FILE`. When both are set they
    /// must name the same key.
    pub fn ethereum_key(&self) -> Result<Option<Vec<u8>>, WalletError> {
        let Some(path) = &self.ethereum_signer_key_file else {
            return Ok(self.ethereum_public_key.clone());
        };

        let pem = std::fs::read(path).map_err(|e| {
            WalletError::Config(format!("{ETHEREUM_SIGNER_KEY_FILE_ENV}={}: {e}", path.display()))
        })?;
        let signer = LocalSecp256k1Signer::from_pem(Blockchain::Ethereum.id(), &pem)?;
        let derived = signer.public_key_uncompressed();

        match &self.ethereum_public_key {
            Some(configured) if *configured != derived => Err(WalletError::Config(format!(
                "{ETHEREUM_PUBLIC_KEY_ENV} does not match the key in {ETHEREUM_SIGNER_KEY_FILE_ENV}"
            ))),
            _ => Ok(Some(derived)),
        }
    }

    /// Node endpoint for `blockchain`.
    pub fn rpc_url(&self, blockchain: Blockchain) -> &str {
        match blockchain {
            Blockchain::Ethereum => &self.ethereum_rpc_url,
            Blockchain::EthereumTestnet => &self.ethereum_testnet_rpc_url,
            Blockchain::Tezos => &self.tezos_rpc_url,
        }
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T, WalletError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|e| WalletError::Config(format!("{name}={value}: {e}"))),
        None => Ok(default),
    }
}

fn parse_hex_key(name: &str, raw: &str) -> Result<Vec<u8>, WalletError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    alloy::hex::decode(digits).map_err(|e| WalletError::Config(format!("{name}: {e}")))
}
