// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversions between base units (wei, mutez, token units) and decimal
//! display amounts.

use alloy::primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::WalletError;

/// Parse a `0x`-prefixed hex quantity. An empty quantity (`"0x"`) is zero.
pub fn parse_hex_quantity(raw: &str) -> Result<U256, WalletError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| WalletError::InvalidResponse(format!("not a hex quantity: {raw}")))?;

    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 16)
        .map_err(|e| WalletError::InvalidResponse(format!("invalid hex quantity {raw}: {e}")))
}

/// Scale a base-unit integer down by `decimals`.
pub fn from_base_units(raw: U256, decimals: u32) -> Result<Decimal, WalletError> {
    let value = u128::try_from(raw)
        .ok()
        .and_then(|v| i128::try_from(v).ok())
        .ok_or_else(|| WalletError::InvalidAmount(format!("{raw} is out of range")))?;

    Decimal::try_from_i128_with_scale(value, decimals)
        .map(|d| d.normalize())
        .map_err(|e| WalletError::InvalidAmount(format!("{raw} with {decimals} decimals: {e}")))
}

/// Scale a display amount up to base units. Rejects negative values and
/// values with more fraction digits than `decimals`.
pub fn to_base_units(value: Decimal, decimals: u32) -> Result<U256, WalletError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(WalletError::InvalidAmount(format!("{value} is negative")));
    }

    let multiplier = 10u64
        .checked_pow(decimals)
        .map(Decimal::from)
        .ok_or_else(|| WalletError::InvalidAmount(format!("unsupported decimals {decimals}")))?;

    let scaled = value
        .checked_mul(multiplier)
        .ok_or_else(|| WalletError::InvalidAmount(format!("{value} overflows")))?;

    if !scaled.fract().is_zero() {
        return Err(WalletError::InvalidAmount(format!(
            "{value} has more than {decimals} decimal places"
        )));
    }

    scaled
        .trunc()
        .to_u128()
        .map(U256::from)
        .ok_or_else(|| WalletError::InvalidAmount(format!("{value} overflows")))
}

/// Truncate to `fraction_digits` and strip trailing zeros.
pub fn truncate_display(value: Decimal, fraction_digits: u32) -> Decimal {
    value
        .round_dp_with_strategy(fraction_digits, RoundingStrategy::ToZero)
        .normalize()
}
