// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tezos (`tz1` accounts, Ed25519 keys).

pub mod address;
pub mod manager;
pub mod rpc;
pub mod transactions;

pub use address::TezosAddressService;
pub use manager::TezosWalletManager;
pub use rpc::{TezosInfo, TezosNetworkService};
pub use transactions::TezosTransactionBuilder;
