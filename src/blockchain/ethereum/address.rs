// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM addresses: `keccak256(x || y)[12..]`, EIP-55 checksummed.

use std::str::FromStr;

use alloy::primitives::{keccak256, Address};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;

use crate::blockchain::address::AddressService;
use crate::error::WalletError;

#[derive(Debug, Clone, Copy, Default)]
pub struct EthereumAddressService;

impl EthereumAddressService {
    /// Raw 64-byte `x || y` form of a secp256k1 public key.
    ///
    /// Accepts uncompressed (65 bytes), raw (64 bytes) and compressed
    /// (33 bytes) encodings.
    pub fn uncompressed_key(public_key: &[u8]) -> Result<[u8; 64], WalletError> {
        let mut raw = [0u8; 64];
        match public_key.len() {
            64 => raw.copy_from_slice(public_key),
            65 if public_key[0] == 0x04 => raw.copy_from_slice(&public_key[1..]),
            33 => {
                let key = PublicKey::from_sec1_bytes(public_key)
                    .map_err(|e| WalletError::InvalidPublicKey(e.to_string()))?;
                let point = key.to_encoded_point(false);
                raw.copy_from_slice(&point.as_bytes()[1..]);
            }
            len => {
                return Err(WalletError::InvalidPublicKey(format!(
                    "unexpected secp256k1 key length {len}"
                )))
            }
        }
        Ok(raw)
    }

    /// Parse an address the same way [`validate`](AddressService::validate) accepts it.
    pub fn parse(address: &str) -> Result<Address, WalletError> {
        if !Self.validate(address) {
            return Err(WalletError::InvalidAddress(address.to_string()));
        }
        Address::from_str(address).map_err(|e| WalletError::InvalidAddress(e.to_string()))
    }
}

impl AddressService for EthereumAddressService {
    fn make_address(&self, public_key: &[u8]) -> Result<String, WalletError> {
        let raw = Self::uncompressed_key(public_key)?;
        let hash = keccak256(raw);
        Ok(Address::from_slice(&hash[12..]).to_checksum(None))
    }

    fn validate(&self, address: &str) -> bool {
        let Some(hex) = address.strip_prefix("0x") else {
            return false;
        };
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return false;
        }

        let all_lower = !hex.chars().any(|c| c.is_ascii_uppercase());
        let all_upper = !hex.chars().any(|c| c.is_ascii_lowercase());
        if all_lower || all_upper {
            return true;
        }

        Address::parse_checksummed(address, None).is_ok()
    }
}
