//! Framework constants and well-known addresses.
//!
//! Compile-time constants for the addresses and type tags the simulation
//! parsers recognise, so no call site has to spell out
//! `normalize_address("0x1").unwrap()`.
//!
//! # Example
//!
//! ```
//! use vault_sim_types::framework::{APTOS_FRAMEWORK, NATIVE_FUNGIBLE_ASSET};
//!
//! assert_eq!(APTOS_FRAMEWORK.to_short_string(), "0x1");
//! assert_eq!(NATIVE_FUNGIBLE_ASSET.to_short_string(), "0xa");
//! ```

use crate::address::Address;

// ============================================================================
// Framework Addresses
// ============================================================================

/// Framework package address (0x1)
pub const APTOS_FRAMEWORK: Address = {
    let mut bytes = [0u8; 32];
    bytes[31] = 1;
    Address::new(bytes)
};

/// Native fungible asset metadata object (0xa).
///
/// Also the creator of every other coin's paired metadata object.
pub const NATIVE_FUNGIBLE_ASSET: Address = {
    let mut bytes = [0u8; 32];
    bytes[31] = 0xa;
    Address::new(bytes)
};

/// Domain separator for object addresses derived from a seed.
pub const OBJECT_FROM_SEED_SCHEME: u8 = 0xFE;

// ============================================================================
// Type Tags
// ============================================================================

/// The network's native coin type, compared verbatim.
pub const NATIVE_COIN_TYPE: &str = "0x1::aptos_coin::AptosCoin";

/// (module, struct) pairs under [`APTOS_FRAMEWORK`].
pub mod structs {
    pub const COIN_STORE: (&str, &str) = ("coin", "CoinStore");
    pub const FUNGIBLE_STORE: (&str, &str) = ("fungible_asset", "FungibleStore");
    pub const OBJECT_CORE: (&str, &str) = ("object", "ObjectCore");

    /// Stream-based coin events, located through their event GUID.
    pub const COIN_DEPOSIT_EVENT: (&str, &str) = ("coin", "DepositEvent");
    pub const COIN_WITHDRAW_EVENT: (&str, &str) = ("coin", "WithdrawEvent");

    /// Module coin events that carry account and coin type in their payload.
    pub const COIN_DEPOSIT: (&str, &str) = ("coin", "CoinDeposit");
    pub const COIN_WITHDRAW: (&str, &str) = ("coin", "CoinWithdraw");

    pub const FA_DEPOSIT: (&str, &str) = ("fungible_asset", "Deposit");
    pub const FA_WITHDRAW: (&str, &str) = ("fungible_asset", "Withdraw");
}
