//! Address normalization and derivation.
//!
//! This module is the canonical source for address handling in the workspace.
//! Other crates should import from here rather than defining their own logic.
//!
//! Account and object addresses are 32-byte values, but simulation output
//! spells them inconsistently:
//! - Short form: "0x1"
//! - Full form: "0x0000000000000000000000000000000000000000000000000000000000000001"
//! - Without prefix, or with mixed case: "A1", "0XA1"
//!
//! [`Address`] only ever compares the decoded bytes, so every spelling of the
//! same address lands on the same map key.

use std::fmt;
use std::str::FromStr;

use move_core_types::account_address::AccountAddress;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};

use crate::framework::{NATIVE_COIN_TYPE, NATIVE_FUNGIBLE_ASSET, OBJECT_FROM_SEED_SCHEME};

/// Number of hex digits in the canonical long form.
const HEX_LEN: usize = AccountAddress::LENGTH * 2;

/// Error returned when an input cannot be decoded as an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAddress {
    /// The raw input that was rejected
    pub input: String,
    /// Why it was rejected
    pub reason: &'static str,
}

impl fmt::Display for InvalidAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidAddress: '{}' ({})", self.input, self.reason)
    }
}

impl std::error::Error for InvalidAddress {}

/// A normalized 32-byte account or object address.
///
/// `Display` and `Serialize` produce the canonical long form
/// (`0x` followed by 64 lowercase hex digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(AccountAddress);

impl Address {
    pub const ZERO: Address = Address(AccountAddress::ZERO);

    pub const fn new(bytes: [u8; AccountAddress::LENGTH]) -> Self {
        Self(AccountAddress::new(bytes))
    }

    pub const fn from_account_address(addr: AccountAddress) -> Self {
        Self(addr)
    }

    pub fn account_address(&self) -> AccountAddress {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Minimal hex form ("0x1", "0xa1"), for display only.
    ///
    /// ```
    /// use vault_sim_types::address::normalize_address;
    ///
    /// let addr = normalize_address("0x000a").unwrap();
    /// assert_eq!(addr.to_short_string(), "0xa");
    /// ```
    pub fn to_short_string(&self) -> String {
        let full = hex::encode(self.as_bytes());
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }
}

impl From<AccountAddress> for Address {
    fn from(addr: AccountAddress) -> Self {
        Self(addr)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.as_bytes()))
    }
}

impl FromStr for Address {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_address(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        normalize_address(&s).map_err(de::Error::custom)
    }
}

/// Parse any accepted address spelling into an [`Address`].
///
/// Accepts an optional `0x`/`0X` prefix, either hex case, surrounding
/// whitespace and 1 to 64 hex digits (left-padded with zeros).
///
/// # Examples
///
/// ```
/// use vault_sim_types::address::normalize_address;
///
/// assert_eq!(
///     normalize_address("0xA1").unwrap().to_string(),
///     "0x00000000000000000000000000000000000000000000000000000000000000a1"
/// );
/// assert!(normalize_address("not-hex").is_err());
/// ```
pub fn normalize_address(input: &str) -> Result<Address, InvalidAddress> {
    let invalid = |reason| InvalidAddress {
        input: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex.is_empty() {
        return Err(invalid("empty address"));
    }
    if hex.len() > HEX_LEN {
        return Err(invalid("more than 64 hex digits"));
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("non-hex character"));
    }

    let padded = format!("{:0>width$}", hex.to_ascii_lowercase(), width = HEX_LEN);
    AccountAddress::from_hex(padded)
        .map(Address)
        .map_err(|_| invalid("not a 32-byte hex value"))
}

/// Normalize straight to the canonical long-form string.
pub fn normalize_address_string(input: &str) -> Result<String, InvalidAddress> {
    normalize_address(input).map(|addr| addr.to_string())
}

/// Map key for an event stream: `"{canonical creator}_{creation_number}"`.
///
/// The creation number is a decimal numeral, so it never contains the `_`
/// separator and distinct pairs never collide.
pub fn serialize_event_guid(
    creator_address: &str,
    creation_number: &str,
) -> Result<String, InvalidAddress> {
    let creator = normalize_address(creator_address)?;
    Ok(format!("{}_{}", creator, creation_number.trim()))
}

/// Address of a named object: `sha3_256(source ++ seed ++ 0xFE)`.
///
/// The BCS encoding of an address is its 32 raw bytes, so the source is hashed
/// as-is.
pub fn create_object_address(source: &Address, seed: &[u8]) -> Address {
    let mut hasher = Sha3_256::new();
    hasher.update(source.as_bytes());
    hasher.update(seed);
    hasher.update([OBJECT_FROM_SEED_SCHEME]);
    let digest: [u8; AccountAddress::LENGTH] = hasher.finalize().into();
    Address::new(digest)
}

/// The fungible-asset metadata object paired with a coin type.
///
/// The native coin is pinned to `0xa`. Every other coin type's metadata is the
/// object named by the coin type string under `0xa`.
///
/// ```
/// use vault_sim_types::address::derive_paired_fungible_metadata;
///
/// let apt = derive_paired_fungible_metadata("0x1::aptos_coin::AptosCoin");
/// assert_eq!(apt.to_short_string(), "0xa");
/// ```
pub fn derive_paired_fungible_metadata(coin_type: &str) -> Address {
    if coin_type == NATIVE_COIN_TYPE {
        return NATIVE_FUNGIBLE_ASSET;
    }
    create_object_address(&NATIVE_FUNGIBLE_ASSET, coin_type.as_bytes())
}
