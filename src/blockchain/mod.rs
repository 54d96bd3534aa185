// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-chain wallet managers.
//!
//! This module provides:
//! - Querying native and token balances
//! - Fee estimation
//! - Building, signing (through an external signer) and submitting transfers
//!
//! Shared pieces live at this level (transport, retry, units, signing); each
//! chain family has its own submodule.

pub mod address;
pub mod ethereum;
pub mod manager;
pub mod registry;
pub mod retry;
pub mod signing;
pub mod tezos;
pub mod transport;
pub mod types;
pub mod units;

pub use address::AddressService;
pub use manager::{update_all, FailedUpdate, UpdateReport, WalletManager};
pub use registry::{WalletManagerParams, WalletManagerRegistry};
pub use retry::RetryPolicy;
pub use signing::{LocalSecp256k1Signer, TransactionSigner};
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::*;
