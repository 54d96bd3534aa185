// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet persistence boundary.
//!
//! Managers never persist anything themselves; callers hand a snapshot of
//! the [`Wallet`] to a [`WalletStore`] after a successful update.

use std::collections::HashMap;

use crate::blockchain::types::{Blockchain, Wallet};

pub trait WalletStore: Send + Sync {
    /// Insert or replace the snapshot for the wallet's chain and address.
    fn save(&mut self, wallet: &Wallet);

    fn get(&self, blockchain: Blockchain, address: &str) -> Option<Wallet>;

    fn list(&self) -> Vec<Wallet>;
}

/// Process-local store used by the refresh binary and tests.
#[derive(Debug, Default)]
pub struct InMemoryWalletStore {
    wallets: HashMap<(Blockchain, String), Wallet>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

impl WalletStore for InMemoryWalletStore {
    fn save(&mut self, wallet: &Wallet) {
        self.wallets
            .insert((wallet.blockchain, wallet.address.clone()), wallet.clone());
    }

    fn get(&self, blockchain: Blockchain, address: &str) -> Option<Wallet> {
        self.wallets.get(&(blockchain, address.to_string())).cloned()
    }

    fn list(&self) -> Vec<Wallet> {
        let mut wallets: Vec<Wallet> = self.wallets.values().cloned().collect();
        wallets.sort_by(|a, b| (a.blockchain, &a.address).cmp(&(b.blockchain, &b.address)));
        wallets
    }
}
