// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gas-price based fee tiers.

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::blockchain::units::{from_base_units, truncate_display};
use crate::error::WalletError;

/// Gas limit of a plain coin transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// Gas limit used for ERC-20 `transfer` calls.
pub const TOKEN_TRANSFER_GAS_LIMIT: u64 = 60_000;

/// Fees are shown with at most this many fraction digits.
pub const FEE_DISPLAY_DECIMALS: u32 = 12;

/// Fee tiers in wei, ordered `minimum <= normal <= priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTiers<T> {
    pub minimum: T,
    pub normal: T,
    pub priority: T,
}

impl<T> FeeTiers<T> {
    pub fn into_vec(self) -> Vec<T> {
        vec![self.minimum, self.normal, self.priority]
    }
}

/// `minimum = gas_price * gas_limit`, `normal = minimum * 1.2` and
/// `priority = minimum * 1.5`, both rounded half up.
pub fn fee_tiers_wei(gas_price: U256, gas_limit: u64) -> FeeTiers<U256> {
    let minimum = gas_price.saturating_mul(U256::from(gas_limit));
    FeeTiers {
        minimum,
        normal: scale_half_up(minimum, 12),
        priority: scale_half_up(minimum, 15),
    }
}

/// `round_half_up(value * tenths / 10)`
fn scale_half_up(value: U256, tenths: u64) -> U256 {
    value
        .saturating_mul(U256::from(tenths))
        .saturating_add(U256::from(5u8))
        / U256::from(10u8)
}

/// Convert wei tiers to the display unit, truncating to
/// [`FEE_DISPLAY_DECIMALS`] fraction digits.
pub fn fee_tiers_display(
    tiers: FeeTiers<U256>,
    decimals: u32,
) -> Result<FeeTiers<Decimal>, WalletError> {
    let convert = |wei: U256| -> Result<Decimal, WalletError> {
        Ok(truncate_display(from_base_units(wei, decimals)?, FEE_DISPLAY_DECIMALS))
    };

    Ok(FeeTiers {
        minimum: convert(tiers.minimum)?,
        normal: convert(tiers.normal)?,
        priority: convert(tiers.priority)?,
    })
}
