// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Wallet Managers - Multi-chain wallet protocol layer
//!
//! Chain-specific clients that read account state, estimate fees, build
//! unsigned transactions, delegate signing to an external signer and submit
//! the result, all behind one [`WalletManager`](blockchain::WalletManager)
//! contract.
//!
//! ## Modules
//!
//! - `blockchain` - Wallet managers for EVM chains and Tezos
//! - `config` - Environment-driven configuration
//! - `error` - Shared error type
//! - `logging` - Tracing subscriber setup
//! - `poller` - Periodic balance refresh
//! - `store` - Wallet snapshot persistence boundary

pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod store;

pub use error::WalletError;
