// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 call encoding.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// `eth_call` data for `balanceOf(owner)`: selector `0x70a08231` followed by
/// the owner address left-padded to 32 bytes.
pub fn balance_of_calldata(owner: Address) -> String {
    let call = IERC20::balanceOfCall { account: owner };
    format!("0x{}", alloy::hex::encode(call.abi_encode()))
}

/// Input data for `transfer(to, amount)`.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    IERC20::transferCall { to, amount }.abi_encode().into()
}
