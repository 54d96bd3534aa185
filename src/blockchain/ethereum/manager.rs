// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet manager for EVM chains.

use std::str::FromStr;

use alloy::primitives::Address;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use super::address::EthereumAddressService;
use super::fee::{DEFAULT_GAS_LIMIT, TOKEN_TRANSFER_GAS_LIMIT};
use super::rpc::EthereumNetworkService;
use super::transactions::EthereumTransactionBuilder;
use crate::blockchain::address::AddressService;
use crate::blockchain::manager::{prepare_intent, WalletManager};
use crate::blockchain::signing::TransactionSigner;
use crate::blockchain::types::{Amount, Blockchain, Fee, SendResult, Token, TransactionIntent, Wallet};
use crate::error::WalletError;

pub struct EthereumWalletManager {
    wallet: Wallet,
    tokens: Vec<Token>,
    network_service: EthereumNetworkService,
    builder: EthereumTransactionBuilder,
    key_id: String,
}

impl std::fmt::Debug for EthereumWalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumWalletManager")
            .field("wallet", &self.wallet)
            .field("tokens", &self.tokens)
            .field("nonce", &self.builder.nonce())
            .finish_non_exhaustive()
    }
}

impl EthereumWalletManager {
    /// Create a manager for the account owning `public_key`.
    pub fn new(
        blockchain: Blockchain,
        public_key: Vec<u8>,
        key_id: impl Into<String>,
        tokens: Vec<Token>,
        network_service: EthereumNetworkService,
    ) -> Result<Self, WalletError> {
        let chain_id = blockchain.network().evm_chain_id.ok_or_else(|| {
            WalletError::UnsupportedBlockchain(format!("{blockchain} is not an EVM chain"))
        })?;
        let address = EthereumAddressService.make_address(&public_key)?;

        Ok(Self {
            wallet: Wallet::new(blockchain, address, public_key),
            tokens,
            network_service,
            builder: EthereumTransactionBuilder::new(chain_id),
            key_id: key_id.into(),
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Locally tracked nonce, known after the first successful update.
    pub fn nonce(&self) -> Option<u64> {
        self.builder.nonce()
    }

    fn fee_amount(&self, value: rust_decimal::Decimal) -> Fee {
        Fee::new(Amount::coin(self.wallet.blockchain, value))
    }
}

#[async_trait]
impl WalletManager for EthereumWalletManager {
    fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    fn address_service(&self) -> &dyn AddressService {
        &EthereumAddressService
    }

    async fn update(&mut self) -> Result<(), WalletError> {
        let info = self
            .network_service
            .get_info(&self.wallet.address, &self.tokens)
            .await?;

        self.wallet.set_coin_value(info.balance);
        for token in &self.tokens {
            if let Some(value) = info.token_balances.get(&token.contract_address) {
                self.wallet.set_token_value(token, *value);
            }
        }
        self.wallet.has_pending_transactions = info.pending_tx_count > info.tx_count;
        self.wallet.updated_at = Some(Utc::now());
        self.builder.set_nonce(info.tx_count);

        info!(
            chain = %self.wallet.blockchain,
            address = %self.wallet.address,
            balance = %info.balance,
            nonce = info.tx_count,
            pending = self.wallet.has_pending_transactions,
            "Wallet updated"
        );
        Ok(())
    }

    async fn get_fee(&mut self, amount: &Amount, destination: &str) -> Result<Vec<Fee>, WalletError> {
        if !EthereumAddressService.validate(destination) {
            return Err(WalletError::InvalidAddress(destination.to_string()));
        }

        let gas_limit = if amount.is_token() {
            TOKEN_TRANSFER_GAS_LIMIT
        } else {
            DEFAULT_GAS_LIMIT
        };
        let tiers = self.network_service.get_fee(gas_limit).await?;

        Ok(tiers
            .into_vec()
            .into_iter()
            .map(|value| self.fee_amount(value))
            .collect())
    }

    async fn send(
        &mut self,
        intent: &TransactionIntent,
        signer: &dyn TransactionSigner,
    ) -> Result<SendResult, WalletError> {
        self.builder.nonce().ok_or(WalletError::NonceUnknown)?;
        let prepared = prepare_intent(&self.wallet, &self.tokens, intent)?;
        let unsigned = self.builder.build_to_sign(&prepared)?;
        let signer_address = Address::from_str(&self.wallet.address)
            .map_err(|e| WalletError::InvalidAddress(format!("{}: {e}", self.wallet.address)))?;

        debug!(
            chain = %self.wallet.blockchain,
            nonce = unsigned.tx.nonce,
            gas_limit = unsigned.tx.gas_limit,
            gas_price = unsigned.tx.gas_price,
            "Requesting signature"
        );

        let hash = unsigned.signature_hash.to_vec();
        let signatures = signer.sign(&[hash], &self.key_id).await?;
        let signature = signatures
            .first()
            .ok_or_else(|| WalletError::Signer("signer returned no signature".into()))?;

        let raw = self
            .builder
            .build_for_send(unsigned, signature, signer_address)?;
        let tx_hash = self.network_service.send_raw_transaction(&raw).await?;

        self.builder.increment_nonce();

        info!(
            chain = %self.wallet.blockchain,
            from = %self.wallet.address,
            to = %intent.destination_address,
            amount = %prepared.amount,
            tx_hash = %tx_hash,
            "Transaction sent"
        );

        Ok(SendResult {
            explorer_url: self.wallet.blockchain.explorer_tx_url(&tx_hash),
            tx_hash,
        })
    }

    fn add_token(&mut self, token: Token) -> Result<(), WalletError> {
        EthereumAddressService::parse(&token.contract_address)?;
        if self
            .tokens
            .iter()
            .any(|t| t.contract_address.eq_ignore_ascii_case(&token.contract_address))
        {
            return Ok(());
        }
        self.tokens.push(token);
        Ok(())
    }

    fn remove_token(&mut self, contract_address: &str) -> Result<(), WalletError> {
        self.tokens
            .retain(|t| !t.contract_address.eq_ignore_ascii_case(contract_address));
        self.wallet.remove_token(contract_address);
        Ok(())
    }
}
