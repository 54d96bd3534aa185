// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use relational_wallet_managers::blockchain::{
    Blockchain, ReqwestTransport, WalletManager, WalletManagerParams, WalletManagerRegistry,
};
use relational_wallet_managers::config::WalletConfig;
use relational_wallet_managers::logging;
use relational_wallet_managers::poller::BalancePoller;
use relational_wallet_managers::store::{InMemoryWalletStore, WalletStore};
use relational_wallet_managers::WalletError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match WalletConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init(Default::default());
            error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Wallet refresh failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: WalletConfig) -> Result<(), WalletError> {
    let transport = Arc::new(ReqwestTransport::new(config.rpc_timeout)?);
    let registry = WalletManagerRegistry::with_default_chains(&config, transport);

    let mut managers: Vec<Box<dyn WalletManager>> = Vec::new();
    if let Some(public_key) = config.ethereum_key()? {
        managers.push(registry.make_wallet_manager(
            Blockchain::Ethereum,
            WalletManagerParams::new(public_key, Blockchain::Ethereum.id()),
        )?);
    }
    if let Some(public_key) = &config.tezos_public_key {
        managers.push(registry.make_wallet_manager(
            Blockchain::Tezos,
            WalletManagerParams::new(public_key.clone(), Blockchain::Tezos.id()),
        )?);
    }

    if managers.is_empty() {
        warn!("No public keys configured, nothing to refresh");
        return Ok(());
    }

    let mut poller = BalancePoller::new(
        managers,
        InMemoryWalletStore::new(),
        config.refresh_interval.unwrap_or_default(),
    );

    let store = match config.refresh_interval {
        None => {
            let report = poller.poll_step().await;
            if !report.is_complete() {
                warn!(failed = report.failed.len(), "Some wallets could not be refreshed");
            }
            poller.store().list()
        }
        Some(_) => {
            let shutdown = CancellationToken::new();
            let handle = tokio::spawn(poller.run(shutdown.clone()));

            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            shutdown.cancel();

            handle
                .await
                .map_err(|e| WalletError::Config(format!("poller task failed: {e}")))?
                .list()
        }
    };

    for wallet in store {
        let balance = wallet
            .coin_amount()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string());
        info!(
            chain = %wallet.blockchain,
            address = %wallet.address,
            balance = %balance,
            explorer = %wallet.explorer_url(),
            "Wallet balance"
        );
    }

    Ok(())
}
