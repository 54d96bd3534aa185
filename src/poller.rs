// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Balance Poller
//!
//! Background loop that refreshes every wallet manager on a fixed interval
//! and stores the resulting snapshots.
//!
//! ## Strategy
//!
//! Every `poll_interval` the poller:
//! 1. Runs [`update_all`] over its managers.
//! 2. Saves each wallet that refreshed successfully.
//! 3. Logs the chains that failed; they are retried on the next sweep.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::blockchain::manager::{update_all, UpdateReport, WalletManager};
use crate::store::WalletStore;

pub struct BalancePoller<S> {
    managers: Vec<Box<dyn WalletManager>>,
    store: S,
    poll_interval: Duration,
}

impl<S: WalletStore> BalancePoller<S> {
    pub fn new(managers: Vec<Box<dyn WalletManager>>, store: S, poll_interval: Duration) -> Self {
        Self {
            managers,
            store,
            poll_interval,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute one sweep: refresh every wallet and store the successes.
    pub async fn poll_step(&mut self) -> UpdateReport {
        let report = update_all(&mut self.managers).await;

        for manager in &self.managers {
            let wallet = manager.wallet();
            let failed = report
                .failed
                .iter()
                .any(|f| f.blockchain == wallet.blockchain && f.address == wallet.address);
            if !failed {
                self.store.save(wallet);
            }
        }

        report
    }

    /// Run sweeps until the cancellation token is triggered, then hand the
    /// store back.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// let handle = tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(mut self, shutdown: CancellationToken) -> S {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            wallets = self.managers.len(),
            "Balance poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = self.poll_step() => {},
                _ = shutdown.cancelled() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => break,
            }
        }

        info!("Balance poller shutting down");
        self.store
    }
}
