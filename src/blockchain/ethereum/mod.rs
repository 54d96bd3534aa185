// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chains (Ethereum mainnet and Sepolia).
//!
//! - [`address`] - EIP-55 address derivation and validation
//! - [`rpc`] - JSON-RPC reads, fee tiers and broadcast
//! - [`transactions`] - legacy transaction building and signature assembly
//! - [`manager`] - the [`WalletManager`](crate::blockchain::manager::WalletManager) implementation

pub mod address;
pub mod erc20;
pub mod fee;
pub mod manager;
pub mod rpc;
pub mod transactions;

pub use address::EthereumAddressService;
pub use manager::EthereumWalletManager;
pub use rpc::{EthereumInfo, EthereumNetworkService};
pub use transactions::EthereumTransactionBuilder;
