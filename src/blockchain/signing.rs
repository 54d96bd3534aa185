// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction signing boundary.
//!
//! Wallet managers never hold keys. They hand the hashes to sign to a
//! [`TransactionSigner`] (normally a hardware device round trip) together with
//! the identifier of the signing key, and get one raw 64-byte signature back
//! per hash.
//!
//! [`LocalSecp256k1Signer`] is a software signer for EVM keys given as hex or
//! PEM (SEC1 `EC PRIVATE KEY` or PKCS#8 `PRIVATE KEY`). The refresh binary
//! uses it to derive the tracked account from a key file; tests use it to
//! sign for real.

use async_trait::async_trait;
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use k256::pkcs8::DecodePrivateKey;
use k256::SecretKey;

use crate::error::WalletError;

/// External signer.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Sign every entry of `data` with the key identified by `key_id`.
    async fn sign(&self, data: &[Vec<u8>], key_id: &str) -> Result<Vec<Vec<u8>>, WalletError>;
}

fn secret_key_from_pem(pem_bytes: &[u8]) -> Result<SecretKey, WalletError> {
    let block = pem::parse(pem_bytes)
        .map_err(|e| WalletError::InvalidPrivateKey(format!("PEM: {e}")))?;

    match block.tag() {
        "EC PRIVATE KEY" => SecretKey::from_sec1_der(block.contents())
            .map_err(|e| WalletError::InvalidPrivateKey(format!("SEC1: {e}"))),
        "PRIVATE KEY" => SecretKey::from_pkcs8_der(block.contents())
            .map_err(|e| WalletError::InvalidPrivateKey(format!("PKCS#8: {e}"))),
        other => Err(WalletError::InvalidPrivateKey(format!(
            "unsupported PEM block {other}"
        ))),
    }
}

/// Software secp256k1 signer bound to one key identifier.
pub struct LocalSecp256k1Signer {
    key_id: String,
    key: SigningKey,
}

impl std::fmt::Debug for LocalSecp256k1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSecp256k1Signer")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl LocalSecp256k1Signer {
    /// Create a signer from a hex private key (with or without 0x prefix).
    pub fn from_hex(key_id: impl Into<String>, private_key_hex: &str) -> Result<Self, WalletError> {
        let key = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let key_bytes = alloy::hex::decode(key)
            .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))?;
        let key = SigningKey::from_slice(&key_bytes)
            .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self {
            key_id: key_id.into(),
            key,
        })
    }

    /// Create a signer from a PEM-encoded private key.
    pub fn from_pem(key_id: impl Into<String>, pem_bytes: &[u8]) -> Result<Self, WalletError> {
        let secret_key = secret_key_from_pem(pem_bytes)?;
        Ok(Self {
            key_id: key_id.into(),
            key: SigningKey::from(secret_key),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// SEC1 uncompressed public key (65 bytes, `0x04` prefix).
    pub fn public_key_uncompressed(&self) -> Vec<u8> {
        self.key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}

#[async_trait]
impl TransactionSigner for LocalSecp256k1Signer {
    async fn sign(&self, data: &[Vec<u8>], key_id: &str) -> Result<Vec<Vec<u8>>, WalletError> {
        if key_id != self.key_id {
            return Err(WalletError::Signer(format!("unknown signing key {key_id}")));
        }

        data.iter()
            .map(|hash| {
                let signature: Signature = self
                    .key
                    .sign_prehash(hash)
                    .map_err(|e| WalletError::Signer(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            })
            .collect()
    }
}
