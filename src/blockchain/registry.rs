// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain to wallet-manager factory map.
//!
//! This is the only place outside the chain modules that names concrete
//! manager types. Everything else works with `Box<dyn WalletManager>`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::ethereum::{EthereumNetworkService, EthereumWalletManager};
use super::manager::WalletManager;
use super::tezos::{TezosNetworkService, TezosWalletManager};
use super::transport::HttpTransport;
use super::types::{Blockchain, Token};
use crate::config::WalletConfig;
use crate::error::WalletError;

/// Inputs for creating one wallet manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletManagerParams {
    /// Raw public key bytes as reported by the signer.
    pub public_key: Vec<u8>,
    /// Identifier passed back to the signer.
    pub key_id: String,
    /// Tokens to track (EVM chains only).
    pub tokens: Vec<Token>,
}

impl WalletManagerParams {
    pub fn new(public_key: Vec<u8>, key_id: impl Into<String>) -> Self {
        Self {
            public_key,
            key_id: key_id.into(),
            tokens: Vec::new(),
        }
    }

    pub fn with_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.tokens = tokens;
        self
    }
}

pub type WalletManagerFactory = Arc<
    dyn Fn(WalletManagerParams) -> Result<Box<dyn WalletManager>, WalletError> + Send + Sync,
>;

#[derive(Clone, Default)]
pub struct WalletManagerRegistry {
    factories: BTreeMap<Blockchain, WalletManagerFactory>,
}

impl std::fmt::Debug for WalletManagerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManagerRegistry")
            .field("chains", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl WalletManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the factory for `blockchain`.
    pub fn register<F>(&mut self, blockchain: Blockchain, factory: F)
    where
        F: Fn(WalletManagerParams) -> Result<Box<dyn WalletManager>, WalletError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(blockchain, Arc::new(factory));
    }

    pub fn supports(&self, blockchain: Blockchain) -> bool {
        self.factories.contains_key(&blockchain)
    }

    pub fn supported_chains(&self) -> Vec<Blockchain> {
        self.factories.keys().copied().collect()
    }

    pub fn make_wallet_manager(
        &self,
        blockchain: Blockchain,
        params: WalletManagerParams,
    ) -> Result<Box<dyn WalletManager>, WalletError> {
        let factory = self
            .factories
            .get(&blockchain)
            .ok_or_else(|| WalletError::UnsupportedBlockchain(blockchain.to_string()))?;

        let manager = factory(params)?;
        debug!(
            chain = %blockchain,
            address = %manager.wallet().address,
            "Created wallet manager"
        );
        Ok(manager)
    }

    /// Registry with every built-in chain, sharing one transport and one
    /// retry policy.
    pub fn with_default_chains(config: &WalletConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let retry = Arc::new(config.retry.clone());
        let mut registry = Self::new();

        for blockchain in [Blockchain::Ethereum, Blockchain::EthereumTestnet] {
            let service = EthereumNetworkService::new(
                transport.clone(),
                config.rpc_url(blockchain),
                retry.clone(),
                blockchain.decimals(),
            );
            registry.register(blockchain, move |params: WalletManagerParams| {
                let manager = EthereumWalletManager::new(
                    blockchain,
                    params.public_key,
                    params.key_id,
                    params.tokens,
                    service.clone(),
                )?;
                Ok(Box::new(manager) as Box<dyn WalletManager>)
            });
        }

        let tezos = TezosNetworkService::new(
            transport,
            config.rpc_url(Blockchain::Tezos),
            retry,
        );
        registry.register(Blockchain::Tezos, move |params: WalletManagerParams| {
            if !params.tokens.is_empty() {
                return Err(WalletError::UnsupportedBlockchain(
                    "tezos does not support tokens".into(),
                ));
            }
            let manager = TezosWalletManager::new(params.public_key, params.key_id, tezos.clone());
            Ok(Box::new(manager) as Box<dyn WalletManager>)
        });

        registry
    }
}
