// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address derivation and validation contract.

use crate::error::WalletError;

/// Per-chain address codec. Implementations are stateless.
pub trait AddressService: Send + Sync {
    /// Derive the account address for a public key.
    fn make_address(&self, public_key: &[u8]) -> Result<String, WalletError>;

    /// Whether `address` is well formed for the chain. Never panics.
    fn validate(&self, address: &str) -> bool;
}
