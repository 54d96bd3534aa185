// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Network configuration for one supported chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// EIP-155 chain ID (EVM chains only)
    pub evm_chain_id: Option<u64>,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Ethereum mainnet configuration.
pub const ETHEREUM_MAINNET: NetworkConfig = NetworkConfig {
    name: "Ethereum",
    evm_chain_id: Some(1),
    rpc_url: "https://ethereum-rpc.publicnode.com",
    explorer_url: "https://etherscan.io",
};

/// Ethereum Sepolia testnet configuration.
pub const ETHEREUM_SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Ethereum Sepolia Testnet",
    evm_chain_id: Some(11_155_111),
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
};

/// Tezos mainnet configuration.
pub const TEZOS_MAINNET: NetworkConfig = NetworkConfig {
    name: "Tezos",
    evm_chain_id: None,
    rpc_url: "https://rpc.tzbeta.net",
    explorer_url: "https://tzkt.io",
};

/// Supported chains. Used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Blockchain {
    Ethereum,
    EthereumTestnet,
    Tezos,
}

impl Blockchain {
    pub const ALL: [Blockchain; 3] = [Self::Ethereum, Self::EthereumTestnet, Self::Tezos];

    /// Stable identifier used in configuration.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::EthereumTestnet => "ethereum/test",
            Self::Tezos => "tezos",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|chain| chain.id().eq_ignore_ascii_case(id.trim()))
    }

    pub const fn currency_symbol(self) -> &'static str {
        match self {
            Self::Ethereum | Self::EthereumTestnet => "ETH",
            Self::Tezos => "XTZ",
        }
    }

    /// Number of decimals of the native coin (wei / mutez).
    pub const fn decimals(self) -> u32 {
        match self {
            Self::Ethereum | Self::EthereumTestnet => 18,
            Self::Tezos => 6,
        }
    }

    pub const fn network(self) -> NetworkConfig {
        match self {
            Self::Ethereum => ETHEREUM_MAINNET,
            Self::EthereumTestnet => ETHEREUM_SEPOLIA,
            Self::Tezos => TEZOS_MAINNET,
        }
    }

    pub const fn is_evm(self) -> bool {
        matches!(self, Self::Ethereum | Self::EthereumTestnet)
    }

    /// Explorer link for an account.
    pub fn explorer_address_url(self, address: &str) -> String {
        let base = self.network().explorer_url;
        match self {
            Self::Ethereum | Self::EthereumTestnet => format!("{base}/address/{address}"),
            Self::Tezos => format!("{base}/{address}"),
        }
    }

    /// Explorer link for a transaction or operation hash.
    pub fn explorer_tx_url(self, hash: &str) -> String {
        let base = self.network().explorer_url;
        match self {
            Self::Ethereum | Self::EthereumTestnet => format!("{base}/tx/{hash}"),
            Self::Tezos => format!("{base}/{hash}"),
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A fungible token tracked by an EVM wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Token symbol (e.g., "USDC")
    pub symbol: String,
    /// Contract address, `0x`-prefixed
    pub contract_address: String,
    /// Number of decimals
    pub decimals: u32,
}

impl Token {
    pub fn new(symbol: impl Into<String>, contract_address: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            contract_address: contract_address.into(),
            decimals,
        }
    }
}

/// What an [`Amount`] is denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Currency {
    Coin(Blockchain),
    Token(Token),
}

/// Key of [`Wallet::amounts`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AmountType {
    Coin,
    /// Keyed by lowercase contract address.
    Token(String),
}

impl AmountType {
    pub fn token(contract_address: &str) -> Self {
        Self::Token(contract_address.to_ascii_lowercase())
    }
}

/// A decimal value in the currency's display unit (ETH, XTZ, token units).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub value: Decimal,
    pub currency: Currency,
}

impl Amount {
    pub fn coin(blockchain: Blockchain, value: Decimal) -> Self {
        Self {
            value,
            currency: Currency::Coin(blockchain),
        }
    }

    pub fn token(token: Token, value: Decimal) -> Self {
        Self {
            value,
            currency: Currency::Token(token),
        }
    }

    pub fn decimals(&self) -> u32 {
        match &self.currency {
            Currency::Coin(blockchain) => blockchain.decimals(),
            Currency::Token(token) => token.decimals,
        }
    }

    pub fn symbol(&self) -> &str {
        match &self.currency {
            Currency::Coin(blockchain) => blockchain.currency_symbol(),
            Currency::Token(token) => &token.symbol,
        }
    }

    pub fn amount_type(&self) -> AmountType {
        match &self.currency {
            Currency::Coin(_) => AmountType::Coin,
            Currency::Token(token) => AmountType::token(&token.contract_address),
        }
    }

    pub fn is_token(&self) -> bool {
        matches!(self.currency, Currency::Token(_))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.symbol())
    }
}

/// One candidate fee tier, in the chain's native coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fee {
    pub amount: Amount,
}

impl Fee {
    pub fn new(amount: Amount) -> Self {
        Self { amount }
    }
}

/// Chain-specific transfer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionExtras {
    Ethereum {
        /// Overrides the default gas limit for the transfer kind.
        gas_limit: Option<u64>,
    },
}

/// A transfer requested by the caller. Immutable for the duration of a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionIntent {
    pub source_address: String,
    pub destination_address: String,
    pub amount: Amount,
    /// The fee tier the caller picked from `get_fee`.
    pub fee: Fee,
    /// The fee is paid out of `amount`; the destination receives
    /// `amount - fee`.
    pub is_fee_included: bool,
    pub extras: Option<TransactionExtras>,
}

/// Transaction send result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    /// Transaction or operation hash
    pub tx_hash: String,
    /// Explorer URL for the transaction
    pub explorer_url: String,
}

/// Balances and identity of one account on one chain.
///
/// Owned by a single wallet manager and only written by its `update()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    pub blockchain: Blockchain,
    pub address: String,
    pub public_key: Vec<u8>,
    pub amounts: HashMap<AmountType, Amount>,
    /// The node reports transactions that are not yet mined.
    pub has_pending_transactions: bool,
    /// Time of the last successful update.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Wallet {
    pub fn new(blockchain: Blockchain, address: String, public_key: Vec<u8>) -> Self {
        Self {
            blockchain,
            address,
            public_key,
            amounts: HashMap::new(),
            has_pending_transactions: false,
            updated_at: None,
        }
    }

    pub fn coin_amount(&self) -> Option<&Amount> {
        self.amounts.get(&AmountType::Coin)
    }

    pub fn token_amount(&self, contract_address: &str) -> Option<&Amount> {
        self.amounts.get(&AmountType::token(contract_address))
    }

    pub fn set_coin_value(&mut self, value: Decimal) {
        self.amounts
            .insert(AmountType::Coin, Amount::coin(self.blockchain, value));
    }

    pub fn set_token_value(&mut self, token: &Token, value: Decimal) {
        self.amounts.insert(
            AmountType::token(&token.contract_address),
            Amount::token(token.clone(), value),
        );
    }

    pub fn remove_token(&mut self, contract_address: &str) {
        self.amounts.remove(&AmountType::token(contract_address));
    }

    pub fn explorer_url(&self) -> String {
        self.blockchain.explorer_address_url(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blockchain_ids_round_trip() {
        for chain in Blockchain::ALL {
            assert_eq!(Blockchain::from_id(chain.id()), Some(chain));
        }
        assert_eq!(Blockchain::from_id(" Tezos "), Some(Blockchain::Tezos));
        assert_eq!(Blockchain::from_id("solana"), None);
    }

    #[test]
    fn amount_reports_currency_details() {
        let usdc = Token::new("USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 6);
        let amount = Amount::token(usdc, Decimal::new(15, 1));

        assert_eq!(amount.decimals(), 6);
        assert_eq!(amount.symbol(), "USDC");
        assert_eq!(
            amount.amount_type(),
            AmountType::Token("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".into())
        );
        assert_eq!(amount.to_string(), "1.5 USDC");
    }

    #[test]
    fn wallet_token_lookup_ignores_address_case() {
        let token = Token::new("DAI", "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18);
        let mut wallet = Wallet::new(Blockchain::Ethereum, "0xabc".into(), vec![]);
        wallet.set_token_value(&token, Decimal::ONE);

        assert!(wallet
            .token_amount("0x6b175474e89094c44da98b954eedeac495271d0f")
            .is_some());

        wallet.remove_token(&token.contract_address);
        assert!(wallet.token_amount(&token.contract_address).is_none());
    }

    #[test]
    fn explorer_urls_follow_chain_format() {
        assert_eq!(
            Blockchain::Ethereum.explorer_tx_url("0x01"),
            "https://etherscan.io/tx/0x01"
        );
        assert_eq!(
            Blockchain::Tezos.explorer_address_url("tz1abc"),
            "https://tzkt.io/tz1abc"
        );
    }
}
