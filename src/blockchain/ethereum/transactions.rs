// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Legacy (EIP-155) transaction building for EVM chains.
//!
//! The builder never talks to the network. It turns a [`TransactionIntent`]
//! and the locally tracked nonce into an unsigned transaction plus the hash
//! the signer has to sign, then assembles the raw signed envelope once the
//! 64-byte signature comes back.

use std::str::FromStr;

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, Signature, TxKind, B256, U256};

use super::address::EthereumAddressService;
use super::erc20::transfer_calldata;
use super::fee::{DEFAULT_GAS_LIMIT, TOKEN_TRANSFER_GAS_LIMIT};
use crate::blockchain::types::{Currency, TransactionExtras, TransactionIntent};
use crate::blockchain::units::to_base_units;
use crate::error::WalletError;

/// Decimals of the fee amount (wei per ETH).
const FEE_DECIMALS: u32 = 18;

/// Unsigned transaction together with the hash the signer must sign.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedTransaction {
    pub tx: TxLegacy,
    pub signature_hash: B256,
}

/// Default gas limit for the kind of transfer in `intent`, unless the
/// caller overrides it through [`TransactionExtras::Ethereum`].
pub fn gas_limit_for(intent: &TransactionIntent) -> u64 {
    match intent.extras {
        Some(TransactionExtras::Ethereum {
            gas_limit: Some(gas_limit),
        }) => gas_limit,
        _ if intent.amount.is_token() => TOKEN_TRANSFER_GAS_LIMIT,
        _ => DEFAULT_GAS_LIMIT,
    }
}

/// Builds and assembles transactions for one account on one EVM chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthereumTransactionBuilder {
    chain_id: u64,
    nonce: Option<u64>,
}

impl EthereumTransactionBuilder {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            nonce: None,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = Some(nonce);
    }

    /// Advance the local nonce after a successful broadcast.
    pub fn increment_nonce(&mut self) {
        self.nonce = self.nonce.map(|nonce| nonce.saturating_add(1));
    }

    /// Build the unsigned transaction for `intent`.
    ///
    /// Fails with [`WalletError::NonceUnknown`] before looking at anything
    /// else if the wallet was never updated.
    pub fn build_to_sign(&self, intent: &TransactionIntent) -> Result<UnsignedTransaction, WalletError> {
        let nonce = self.nonce.ok_or(WalletError::NonceUnknown)?;

        if !self.is_native(&intent.fee.amount.currency) {
            return Err(WalletError::InvalidAmount(format!(
                "fee {} is not in this chain's coin",
                intent.fee.amount
            )));
        }

        let gas_limit = gas_limit_for(intent);
        if gas_limit == 0 {
            return Err(WalletError::InvalidAmount("gas limit must be positive".into()));
        }

        let fee_wei = to_base_units(intent.fee.amount.value, FEE_DECIMALS)?;
        let gas_price = u128::try_from(fee_wei / U256::from(gas_limit))
            .map_err(|_| WalletError::InvalidAmount(format!("fee {} overflows", intent.fee.amount)))?;

        let destination = EthereumAddressService::parse(&intent.destination_address)?;
        let amount = to_base_units(intent.amount.value, intent.amount.decimals())?;

        let (to, value, input) = match &intent.amount.currency {
            Currency::Coin(_) if self.is_native(&intent.amount.currency) => {
                (TxKind::Call(destination), amount, Bytes::new())
            }
            Currency::Coin(_) => {
                return Err(WalletError::InvalidAmount(format!(
                    "{} is not this chain's coin",
                    intent.amount
                )))
            }
            Currency::Token(token) => {
                let contract = Address::from_str(&token.contract_address).map_err(|e| {
                    WalletError::InvalidAddress(format!("{}: {e}", token.contract_address))
                })?;
                (
                    TxKind::Call(contract),
                    U256::ZERO,
                    transfer_calldata(destination, amount),
                )
            }
        };

        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            input,
        };
        let signature_hash = tx.signature_hash();

        Ok(UnsignedTransaction { tx, signature_hash })
    }

    fn is_native(&self, currency: &Currency) -> bool {
        matches!(currency, Currency::Coin(blockchain) if blockchain.network().evm_chain_id == Some(self.chain_id))
    }

    /// Attach a raw `r || s` signature and encode the transaction for
    /// `eth_sendRawTransaction`.
    ///
    /// The signer does not report the recovery id, so it is found by
    /// recovering `signer_address` from the signature hash.
    pub fn build_for_send(
        &self,
        unsigned: UnsignedTransaction,
        signature: &[u8],
        signer_address: Address,
    ) -> Result<String, WalletError> {
        if signature.len() != 64 {
            return Err(WalletError::Signer(format!(
                "expected a 64-byte signature, got {} bytes",
                signature.len()
            )));
        }

        let r = U256::from_be_slice(&signature[..32]);
        let s = U256::from_be_slice(&signature[32..]);
        let candidate = Signature::new(r, s, false);
        let candidate = candidate.normalize_s().unwrap_or(candidate);

        let signature = [false, true]
            .into_iter()
            .map(|y_parity| candidate.with_parity(y_parity))
            .find(|sig| {
                sig.recover_address_from_prehash(&unsigned.signature_hash)
                    .is_ok_and(|recovered| recovered == signer_address)
            })
            .ok_or_else(|| {
                WalletError::Signer(format!("signature does not recover to {signer_address}"))
            })?;

        let envelope = TxEnvelope::Legacy(unsigned.tx.into_signed(signature));
        Ok(format!("0x{}", alloy::hex::encode(envelope.encoded_2718())))
    }
}
