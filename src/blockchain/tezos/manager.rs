// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet manager for Tezos.
//!
//! Sending goes through a fixed pipeline, stopping at the first failure:
//!
//! 1. reveal status must be known (set by `get_fee`)
//! 2. check the intent against the last known balance and build operation
//!    contents from the account counter (set by `update`)
//! 3. fetch the head block header
//! 4. forge the contents on the node
//! 5. hash `0x03 || forged` and have it signed
//! 6. preapply the signed operation
//! 7. inject `forged || signature`
//!
//! None of these calls is retried.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::address::{encode_signature, TezosAddressService};
use super::rpc::TezosNetworkService;
use super::transactions::TezosTransactionBuilder;
use crate::blockchain::address::AddressService;
use crate::blockchain::manager::{prepare_intent, WalletManager};
use crate::blockchain::signing::TransactionSigner;
use crate::blockchain::types::{Amount, Blockchain, Fee, SendResult, TransactionIntent, Wallet};
use crate::error::WalletError;

/// Fee of a plain transaction, in XTZ.
pub const BASE_FEE: Decimal = Decimal::from_parts(135, 0, 0, false, 5);
/// Added when the operation must carry a reveal.
pub const REVEAL_SURCHARGE: Decimal = Decimal::from_parts(13, 0, 0, false, 4);
/// Added when the destination is empty and has to be allocated.
pub const ALLOCATION_SURCHARGE: Decimal = Decimal::from_parts(257, 0, 0, false, 3);

const SIGNATURE_LEN: usize = 64;

/// `BASE_FEE`, plus the reveal and allocation surcharges when they apply.
pub fn calculate_fee(public_key_revealed: bool, destination_balance: Decimal) -> Decimal {
    let mut fee = BASE_FEE;
    if !public_key_revealed {
        fee += REVEAL_SURCHARGE;
    }
    if destination_balance.is_zero() {
        fee += ALLOCATION_SURCHARGE;
    }
    fee
}

pub struct TezosWalletManager {
    wallet: Wallet,
    network_service: TezosNetworkService,
    builder: TezosTransactionBuilder,
    public_key_revealed: Option<bool>,
    key_id: String,
}

impl std::fmt::Debug for TezosWalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TezosWalletManager")
            .field("wallet", &self.wallet)
            .field("counter", &self.builder.counter())
            .field("public_key_revealed", &self.public_key_revealed)
            .finish_non_exhaustive()
    }
}

impl TezosWalletManager {
    pub fn new(
        public_key: Vec<u8>,
        key_id: impl Into<String>,
        network_service: TezosNetworkService,
    ) -> Self {
        let address = TezosAddressService::address_for(&public_key);
        Self {
            builder: TezosTransactionBuilder::new(address.clone(), public_key.clone()),
            wallet: Wallet::new(Blockchain::Tezos, address, public_key),
            network_service,
            public_key_revealed: None,
            key_id: key_id.into(),
        }
    }

    pub fn counter(&self) -> Option<i64> {
        self.builder.counter()
    }

    pub fn public_key_revealed(&self) -> Option<bool> {
        self.public_key_revealed
    }
}

#[async_trait]
impl WalletManager for TezosWalletManager {
    fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    fn address_service(&self) -> &dyn AddressService {
        &TezosAddressService
    }

    async fn update(&mut self) -> Result<(), WalletError> {
        let info = self.network_service.get_info(&self.wallet.address).await?;

        self.wallet.set_coin_value(info.balance);
        self.wallet.updated_at = Some(Utc::now());
        self.builder.set_counter(info.counter);

        info!(
            chain = %self.wallet.blockchain,
            address = %self.wallet.address,
            balance = %info.balance,
            counter = info.counter,
            "Wallet updated"
        );
        Ok(())
    }

    async fn get_fee(&mut self, _amount: &Amount, destination: &str) -> Result<Vec<Fee>, WalletError> {
        if !TezosAddressService.validate(destination) {
            return Err(WalletError::InvalidAddress(destination.to_string()));
        }

        let (revealed, destination_balance) = tokio::try_join!(
            self.network_service
                .is_public_key_revealed(&self.wallet.address),
            self.network_service.get_balance(destination),
        )?;
        self.public_key_revealed = Some(revealed);

        let fee = calculate_fee(revealed, destination_balance);
        debug!(
            address = %self.wallet.address,
            revealed,
            destination_balance = %destination_balance,
            fee = %fee,
            "Computed Tezos fee"
        );

        // Tezos fees are fixed: minimum, normal and priority are the same.
        let fee = Fee::new(Amount::coin(Blockchain::Tezos, fee));
        Ok(vec![fee.clone(), fee.clone(), fee])
    }

    async fn send(
        &mut self,
        intent: &TransactionIntent,
        signer: &dyn TransactionSigner,
    ) -> Result<SendResult, WalletError> {
        let revealed = self
            .public_key_revealed
            .ok_or(WalletError::RevealStatusUnknown)?;
        self.builder.counter().ok_or(WalletError::CounterUnknown)?;
        if intent.amount.value.is_zero() || intent.fee.amount.value.is_zero() {
            return Err(WalletError::InvalidAmount(format!(
                "amount {} and fee {} must both be non-zero",
                intent.amount, intent.fee.amount
            )));
        }
        let prepared = prepare_intent(&self.wallet, &[], intent)?;
        let contents = self.builder.build_contents(&prepared, revealed)?;

        let header = self.network_service.get_header().await?;
        let forged = self
            .network_service
            .forge_contents(&header.hash, &contents)
            .await?;
        let hash = TezosTransactionBuilder::build_to_sign(&forged)?;

        debug!(
            address = %self.wallet.address,
            branch = %header.hash,
            operations = contents.len(),
            "Requesting signature"
        );

        let signatures = signer.sign(&[hash], &self.key_id).await?;
        let signature = signatures
            .first()
            .ok_or_else(|| WalletError::Signer("signer returned no signature".into()))?;
        if signature.len() != SIGNATURE_LEN {
            return Err(WalletError::Signer(format!(
                "expected a {SIGNATURE_LEN}-byte signature, got {} bytes",
                signature.len()
            )));
        }

        self.network_service
            .check_transaction(&header, &contents, &encode_signature(signature))
            .await?;

        let payload = TezosTransactionBuilder::build_for_send(&forged, signature);
        let operation_hash = self.network_service.send_transaction(&payload).await?;

        // The injected operation consumed the counter; wait for the next update.
        self.builder.clear_counter();
        self.public_key_revealed = Some(true);

        info!(
            chain = %self.wallet.blockchain,
            from = %self.wallet.address,
            to = %intent.destination_address,
            amount = %prepared.amount,
            operation_hash = %operation_hash,
            "Operation sent"
        );

        Ok(SendResult {
            explorer_url: self.wallet.blockchain.explorer_tx_url(&operation_hash),
            tx_hash: operation_hash,
        })
    }
}
