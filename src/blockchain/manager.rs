// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The chain-agnostic wallet manager contract.
//!
//! One manager owns one [`Wallet`] on one chain. Callers drive it as
//! `update()`, then `get_fee()`, then `send()`, and never name the concrete
//! chain type; managers are created through the registry and used as
//! `Box<dyn WalletManager>`.
//!
//! Sequencing state (EVM nonce, Tezos counter and reveal status) is written
//! only through `&mut self`, so a manager has a single writer. State is
//! committed only after every network read of an operation has succeeded;
//! a failed or cancelled call leaves the manager untouched.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use super::address::AddressService;
use super::signing::TransactionSigner;
use super::types::{
    Amount, Blockchain, Currency, Fee, SendResult, Token, TransactionIntent, Wallet,
};
use crate::error::WalletError;

#[async_trait]
pub trait WalletManager: std::fmt::Debug + Send + Sync {
    fn wallet(&self) -> &Wallet;

    fn blockchain(&self) -> Blockchain {
        self.wallet().blockchain
    }

    fn address_service(&self) -> &dyn AddressService;

    /// Refresh balances and sequencing state from the network.
    async fn update(&mut self) -> Result<(), WalletError>;

    /// Candidate fees for sending `amount` to `destination`, cheapest first.
    async fn get_fee(&mut self, amount: &Amount, destination: &str) -> Result<Vec<Fee>, WalletError>;

    /// Build, sign and submit `intent`.
    async fn send(
        &mut self,
        intent: &TransactionIntent,
        signer: &dyn TransactionSigner,
    ) -> Result<SendResult, WalletError>;

    /// Start tracking a token balance. Chains without tokens reject it.
    fn add_token(&mut self, token: Token) -> Result<(), WalletError> {
        Err(WalletError::UnsupportedBlockchain(format!(
            "{} does not support token {}",
            self.blockchain(),
            token.symbol
        )))
    }

    fn remove_token(&mut self, _contract_address: &str) -> Result<(), WalletError> {
        Err(WalletError::UnsupportedBlockchain(format!(
            "{} does not support tokens",
            self.blockchain()
        )))
    }
}

/// Check `intent` against the wallet as of its last update and return the
/// intent to build, with a fee-inclusive amount reduced by the fee.
///
/// Runs before any network call of `send`. `tokens` are the token contracts
/// the manager tracks; any other currency is rejected.
pub fn prepare_intent(
    wallet: &Wallet,
    tokens: &[Token],
    intent: &TransactionIntent,
) -> Result<TransactionIntent, WalletError> {
    let same_source = if wallet.blockchain.is_evm() {
        intent.source_address.eq_ignore_ascii_case(&wallet.address)
    } else {
        intent.source_address == wallet.address
    };
    if !same_source {
        return Err(WalletError::InvalidAddress(format!(
            "source {} is not the wallet address {}",
            intent.source_address, wallet.address
        )));
    }

    let native = Currency::Coin(wallet.blockchain);
    if intent.fee.amount.currency != native {
        return Err(WalletError::InvalidAmount(format!(
            "fee must be paid in {}, got {}",
            wallet.blockchain.currency_symbol(),
            intent.fee.amount.symbol()
        )));
    }
    let fee = intent.fee.amount.value;
    let value = intent.amount.value;
    if fee.is_sign_negative() || value.is_sign_negative() {
        return Err(WalletError::InvalidAmount(format!(
            "negative amount {} or fee {}",
            intent.amount, intent.fee.amount
        )));
    }

    let coin_balance = wallet
        .coin_amount()
        .map(|amount| amount.value)
        .unwrap_or_default();

    let mut prepared = intent.clone();
    match &intent.amount.currency {
        Currency::Coin(blockchain) if *blockchain == wallet.blockchain => {
            if intent.is_fee_included {
                if value < fee {
                    return Err(WalletError::InvalidAmount(format!(
                        "amount {} does not cover the included fee {}",
                        intent.amount, intent.fee.amount
                    )));
                }
                if value > coin_balance {
                    return Err(WalletError::InsufficientFunds(format!(
                        "sending {} with balance {coin_balance}",
                        intent.amount
                    )));
                }
                prepared.amount.value = value - fee;
                prepared.is_fee_included = false;
            } else if value + fee > coin_balance {
                return Err(WalletError::InsufficientFunds(format!(
                    "sending {} plus fee {} with balance {coin_balance}",
                    intent.amount, intent.fee.amount
                )));
            }
        }
        Currency::Token(token)
            if tokens
                .iter()
                .any(|t| t.contract_address.eq_ignore_ascii_case(&token.contract_address)) =>
        {
            if intent.is_fee_included {
                return Err(WalletError::InvalidAmount(format!(
                    "fee cannot be included in a {} transfer",
                    token.symbol
                )));
            }
            let token_balance = wallet
                .token_amount(&token.contract_address)
                .map(|amount| amount.value)
                .unwrap_or_default();
            if value > token_balance {
                return Err(WalletError::InsufficientFunds(format!(
                    "sending {} with balance {token_balance}",
                    intent.amount
                )));
            }
            if fee > coin_balance {
                return Err(WalletError::InsufficientFunds(format!(
                    "fee {} with balance {coin_balance}",
                    intent.fee.amount
                )));
            }
        }
        _ => {
            return Err(WalletError::InvalidAmount(format!(
                "{} cannot be sent from a {} wallet",
                intent.amount.symbol(),
                wallet.blockchain
            )))
        }
    }
    Ok(prepared)
}

/// A wallet whose refresh failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpdate {
    pub blockchain: Blockchain,
    pub address: String,
    pub error: WalletError,
}

/// Outcome of [`update_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Number of wallets refreshed successfully.
    pub updated: usize,
    pub failed: Vec<FailedUpdate>,
}

impl UpdateReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Refresh every manager concurrently.
///
/// A failing chain does not stop the others; its error is reported in the
/// returned [`UpdateReport`].
pub async fn update_all(managers: &mut [Box<dyn WalletManager>]) -> UpdateReport {
    let results = join_all(managers.iter_mut().map(|manager| async move {
        let result = manager.update().await;
        (manager.blockchain(), manager.wallet().address.clone(), result)
    }))
    .await;

    let mut report = UpdateReport::default();
    for (blockchain, address, result) in results {
        match result {
            Ok(()) => report.updated += 1,
            Err(error) => {
                warn!(
                    chain = %blockchain,
                    address = %address,
                    error = %error,
                    "Wallet refresh failed"
                );
                report.failed.push(FailedUpdate {
                    blockchain,
                    address,
                    error,
                });
            }
        }
    }

    info!(
        updated = report.updated,
        failed = report.failed.len(),
        "Wallet refresh finished"
    );
    report
}
