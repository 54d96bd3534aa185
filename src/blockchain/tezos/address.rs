// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tezos base58check encodings.
//!
//! Every Tezos text form is `base58(prefix || payload || checksum)` where the
//! checksum is the first 4 bytes of `sha256(sha256(prefix || payload))`.
//!
//! | Kind      | Prefix           | Payload                     |
//! |-----------|------------------|-----------------------------|
//! | `tz1`     | `06 A1 9F`       | `blake2b-160(public_key)`   |
//! | `edpk`    | `0D 0F 25 D9`    | 32-byte Ed25519 public key  |
//! | `edsig`   | `09 F5 CD 86 12` | 64-byte Ed25519 signature   |

use blake2::digest::consts::U20;
use blake2::{Blake2b, Digest};
use sha2::Sha256;

use crate::blockchain::address::AddressService;
use crate::error::WalletError;

pub const TZ1_PREFIX: [u8; 3] = [0x06, 0xA1, 0x9F];
pub const EDPK_PREFIX: [u8; 4] = [0x0D, 0x0F, 0x25, 0xD9];
pub const EDSIG_PREFIX: [u8; 5] = [0x09, 0xF5, 0xCD, 0x86, 0x12];

const CHECKSUM_LEN: usize = 4;
const PUBLIC_KEY_HASH_LEN: usize = 20;

/// Decoded length of a `tz1` address.
pub const ADDRESS_LEN: usize = TZ1_PREFIX.len() + PUBLIC_KEY_HASH_LEN + CHECKSUM_LEN;

type Blake2b160 = Blake2b<U20>;

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = Sha256::digest(Sha256::digest(data));
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash[..CHECKSUM_LEN]);
    out
}

fn encode_with_prefix(prefix: &[u8], payload: &[u8]) -> String {
    let mut buffer = Vec::with_capacity(prefix.len() + payload.len() + CHECKSUM_LEN);
    buffer.extend_from_slice(prefix);
    buffer.extend_from_slice(payload);
    let check = checksum(&buffer);
    buffer.extend_from_slice(&check);
    bs58::encode(buffer).into_string()
}

/// `edpk` text form of a public key, as sent in reveal operations.
pub fn encode_public_key(public_key: &[u8]) -> String {
    encode_with_prefix(&EDPK_PREFIX, public_key)
}

/// `edsig` text form of a raw signature, as sent to preapply.
pub fn encode_signature(signature: &[u8]) -> String {
    encode_with_prefix(&EDSIG_PREFIX, signature)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TezosAddressService;

impl TezosAddressService {
    /// `tz1` address of a public key. Never fails.
    pub fn address_for(public_key: &[u8]) -> String {
        let hash = Blake2b160::digest(public_key);
        encode_with_prefix(&TZ1_PREFIX, &hash)
    }
}

impl AddressService for TezosAddressService {
    fn make_address(&self, public_key: &[u8]) -> Result<String, WalletError> {
        Ok(Self::address_for(public_key))
    }

    fn validate(&self, address: &str) -> bool {
        let Ok(decoded) = bs58::decode(address).into_vec() else {
            return false;
        };
        if decoded.len() != ADDRESS_LEN {
            return false;
        }

        let (payload, check) = decoded.split_at(ADDRESS_LEN - CHECKSUM_LEN);
        checksum(payload) == check
    }
}
