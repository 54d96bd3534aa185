// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tezos operation building.
//!
//! A transfer is one `transaction` operation, preceded by a `reveal` when the
//! account's public key is not yet on chain. Each operation consumes the
//! next account counter.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use super::address::{encode_public_key, TezosAddressService};
use super::rpc::{TezosOperationContent, TEZOS_DECIMALS};
use crate::blockchain::address::AddressService;
use crate::blockchain::types::{Blockchain, Currency, TransactionIntent};
use crate::blockchain::units::to_base_units;
use crate::error::WalletError;

/// Generic-operation watermark prepended to forged bytes before hashing.
pub const GENERIC_OPERATION_WATERMARK: u8 = 0x03;

pub const REVEAL_FEE: u64 = 1_300;
pub const REVEAL_GAS_LIMIT: u64 = 10_000;
pub const REVEAL_STORAGE_LIMIT: u64 = 0;

pub const TRANSACTION_FEE: u64 = 1_350;
pub const TRANSACTION_GAS_LIMIT: u64 = 10_600;
pub const TRANSACTION_STORAGE_LIMIT: u64 = 277;

type Blake2b256 = Blake2b<U32>;

/// Sequencing state for one Tezos account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TezosTransactionBuilder {
    address: String,
    public_key: Vec<u8>,
    counter: Option<i64>,
}

impl TezosTransactionBuilder {
    pub fn new(address: impl Into<String>, public_key: Vec<u8>) -> Self {
        Self {
            address: address.into(),
            public_key,
            counter: None,
        }
    }

    /// Last counter reported by the node.
    pub fn counter(&self) -> Option<i64> {
        self.counter
    }

    pub fn set_counter(&mut self, counter: i64) {
        self.counter = Some(counter);
    }

    /// Forget the counter so the next send waits for a fresh update.
    pub fn clear_counter(&mut self) {
        self.counter = None;
    }

    /// Operation contents for `intent`.
    ///
    /// The stored counter is left unchanged; operations use `counter + 1`,
    /// `counter + 2` and so on.
    pub fn build_contents(
        &self,
        intent: &TransactionIntent,
        public_key_revealed: bool,
    ) -> Result<Vec<TezosOperationContent>, WalletError> {
        let mut counter = self.counter.ok_or(WalletError::CounterUnknown)?;

        let tez = Currency::Coin(Blockchain::Tezos);
        for amount in [&intent.amount, &intent.fee.amount] {
            if amount.currency != tez {
                return Err(WalletError::InvalidAmount(format!("{amount} is not a tez amount")));
            }
        }
        if !TezosAddressService.validate(&intent.destination_address) {
            return Err(WalletError::InvalidAddress(
                intent.destination_address.clone(),
            ));
        }
        let mutez = to_base_units(intent.amount.value, TEZOS_DECIMALS)?;

        let mut contents = Vec::with_capacity(2);

        if !public_key_revealed {
            counter += 1;
            contents.push(TezosOperationContent {
                kind: "reveal".into(),
                source: self.address.clone(),
                fee: REVEAL_FEE.to_string(),
                counter: counter.to_string(),
                gas_limit: REVEAL_GAS_LIMIT.to_string(),
                storage_limit: REVEAL_STORAGE_LIMIT.to_string(),
                public_key: Some(encode_public_key(&self.public_key)),
                destination: None,
                amount: None,
            });
        }

        counter += 1;
        contents.push(TezosOperationContent {
            kind: "transaction".into(),
            source: self.address.clone(),
            fee: TRANSACTION_FEE.to_string(),
            counter: counter.to_string(),
            gas_limit: TRANSACTION_GAS_LIMIT.to_string(),
            storage_limit: TRANSACTION_STORAGE_LIMIT.to_string(),
            public_key: None,
            destination: Some(intent.destination_address.clone()),
            amount: Some(mutez.to_string()),
        });

        Ok(contents)
    }

    /// `blake2b-256(0x03 || forged_bytes)`
    pub fn build_to_sign(forged_hex: &str) -> Result<Vec<u8>, WalletError> {
        let forged = alloy::hex::decode(forged_hex)
            .map_err(|e| WalletError::InvalidResponse(format!("forged bytes: {e}")))?;

        let mut hasher = Blake2b256::new();
        hasher.update([GENERIC_OPERATION_WATERMARK]);
        hasher.update(&forged);
        Ok(hasher.finalize().to_vec())
    }

    /// Hex payload for injection: forged bytes followed by the raw signature.
    pub fn build_for_send(forged_hex: &str, signature: &[u8]) -> String {
        format!("{forged_hex}{}", alloy::hex::encode(signature))
    }
}
