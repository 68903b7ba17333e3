//! The per-parse accumulator shared by every parser.
//!
//! A [`SimulationContext`] is created fresh for each simulated transaction.
//! Writeset parsers fill its lookup tables, event parsers read those tables and
//! add signed deltas to two ledgers: one keyed by coin type, one keyed by
//! fungible-asset metadata address. [`SimulationContext::balance_changes`]
//! folds both ledgers into a single per-account view.
//!
//! All tables are `BTreeMap`s, so every iteration (and therefore every merged
//! result and every serialized output) is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Serialize, Serializer};
use tracing::{trace, warn};
use vault_sim_types::{derive_paired_fungible_metadata, Address};

/// Coin type, by event GUID key (see [`vault_sim_types::serialize_event_guid`]).
pub type CoinEventStreams = BTreeMap<String, String>;
/// Signed delta per account, per coin type.
pub type CoinLedger = BTreeMap<Address, BTreeMap<String, BigInt>>;
/// Signed delta per owner, per fungible-asset metadata address.
pub type FungibleAssetLedger = BTreeMap<Address, BTreeMap<Address, BigInt>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationContext {
    coin_event_guid_to_coin_type: CoinEventStreams,
    coin_balance_changes: CoinLedger,
    fungible_asset_store_metadata: BTreeMap<Address, Address>,
    object_owners: BTreeMap<Address, Address>,
    fungible_asset_balance_changes: FungibleAssetLedger,
}

impl SimulationContext {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Lookup tables (filled by writeset parsers)
    // ------------------------------------------------------------------

    pub fn register_coin_event_stream(&mut self, guid_key: String, coin_type: &str) {
        let previous = self
            .coin_event_guid_to_coin_type
            .insert(guid_key.clone(), coin_type.to_string());
        match previous {
            None => trace!(guid = %guid_key, coin_type, "registered coin event stream"),
            Some(previous) if previous != coin_type => warn!(
                guid = %guid_key,
                %previous,
                coin_type,
                "event stream re-registered with a different coin type"
            ),
            Some(_) => {}
        }
    }

    pub fn set_store_metadata(&mut self, store: Address, metadata: Address) {
        trace!(%store, %metadata, "fungible store metadata");
        self.fungible_asset_store_metadata.insert(store, metadata);
    }

    pub fn set_object_owner(&mut self, object: Address, owner: Address) {
        trace!(%object, %owner, "object owner");
        self.object_owners.insert(object, owner);
    }

    pub fn coin_type_for_guid(&self, guid_key: &str) -> Option<&str> {
        self.coin_event_guid_to_coin_type
            .get(guid_key)
            .map(String::as_str)
    }

    pub fn store_metadata(&self, store: &Address) -> Option<&Address> {
        self.fungible_asset_store_metadata.get(store)
    }

    pub fn object_owner(&self, object: &Address) -> Option<&Address> {
        self.object_owners.get(object)
    }

    pub fn coin_event_streams(&self) -> &CoinEventStreams {
        &self.coin_event_guid_to_coin_type
    }

    pub fn fungible_store_metadata(&self) -> &BTreeMap<Address, Address> {
        &self.fungible_asset_store_metadata
    }

    pub fn object_owners(&self) -> &BTreeMap<Address, Address> {
        &self.object_owners
    }

    // ------------------------------------------------------------------
    // Ledgers (filled by event parsers)
    // ------------------------------------------------------------------

    pub fn add_coin_delta(&mut self, account: Address, coin_type: &str, delta: BigInt) {
        trace!(%account, coin_type, %delta, "coin delta");
        let entry = self
            .coin_balance_changes
            .entry(account)
            .or_default()
            .entry(coin_type.to_string())
            .or_insert_with(BigInt::zero);
        *entry += delta;
    }

    pub fn add_fungible_asset_delta(&mut self, owner: Address, metadata: Address, delta: BigInt) {
        trace!(%owner, %metadata, %delta, "fungible asset delta");
        let entry = self
            .fungible_asset_balance_changes
            .entry(owner)
            .or_default()
            .entry(metadata)
            .or_insert_with(BigInt::zero);
        *entry += delta;
    }

    pub fn coin_balance_changes(&self) -> &CoinLedger {
        &self.coin_balance_changes
    }

    pub fn fungible_asset_balance_changes(&self) -> &FungibleAssetLedger {
        &self.fungible_asset_balance_changes
    }

    // ------------------------------------------------------------------
    // Merge
    // ------------------------------------------------------------------

    /// Fold both ledgers into one view per account.
    ///
    /// Coin entries are keyed by coin type and carry their paired metadata
    /// address. A fungible-asset delta whose metadata matches an existing entry
    /// of the same account is added onto it; otherwise it gets its own entry
    /// keyed by the metadata address. A movement seen through both frameworks
    /// therefore shows up as one net entry.
    pub fn balance_changes(&self) -> BalanceChanges {
        let mut merged: BTreeMap<Address, BTreeMap<AssetKey, BalanceChange>> = BTreeMap::new();

        for (account, coins) in &self.coin_balance_changes {
            let entries = merged.entry(*account).or_default();
            for (coin_type, delta) in coins {
                entries.insert(
                    AssetKey::Coin(coin_type.clone()),
                    BalanceChange {
                        delta: delta.clone(),
                        coin_type: Some(coin_type.clone()),
                        fa_address: derive_paired_fungible_metadata(coin_type),
                    },
                );
            }
        }

        for (owner, assets) in &self.fungible_asset_balance_changes {
            let entries = merged.entry(*owner).or_default();
            for (fa_address, delta) in assets {
                match entries
                    .values_mut()
                    .find(|change| change.fa_address == *fa_address)
                {
                    Some(existing) => existing.delta += delta,
                    None => {
                        entries.insert(
                            AssetKey::FungibleAsset(*fa_address),
                            BalanceChange {
                                delta: delta.clone(),
                                coin_type: None,
                                fa_address: *fa_address,
                            },
                        );
                    }
                }
            }
        }

        BalanceChanges(merged)
    }
}

/// Key of a merged entry: the coin type when the movement was seen through
/// the coin framework, the metadata address otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKey {
    Coin(String),
    FungibleAsset(Address),
}

impl AssetKey {
    pub fn coin(coin_type: impl Into<String>) -> Self {
        AssetKey::Coin(coin_type.into())
    }

    pub fn is_coin(&self) -> bool {
        matches!(self, AssetKey::Coin(_))
    }
}

impl From<Address> for AssetKey {
    fn from(addr: Address) -> Self {
        AssetKey::FungibleAsset(addr)
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKey::Coin(coin_type) => f.write_str(coin_type),
            AssetKey::FungibleAsset(addr) => write!(f, "{}", addr),
        }
    }
}

impl Serialize for AssetKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Net movement of one asset for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChange {
    /// Signed net delta, serialized as a decimal string
    #[serde(serialize_with = "serialize_display")]
    pub delta: BigInt,
    /// Set when the entry came from the coin ledger
    pub coin_type: Option<String>,
    /// Fungible-asset metadata address (paired metadata for coin entries)
    pub fa_address: Address,
}

/// Merged balance changes: account -> asset -> change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BalanceChanges(BTreeMap<Address, BTreeMap<AssetKey, BalanceChange>>);

impl BalanceChanges {
    pub fn get(&self, account: &Address) -> Option<&BTreeMap<AssetKey, BalanceChange>> {
        self.0.get(account)
    }

    pub fn delta(&self, account: &Address, asset: &AssetKey) -> Option<&BigInt> {
        self.0
            .get(account)
            .and_then(|entries| entries.get(asset))
            .map(|change| &change.delta)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Address> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &BTreeMap<AssetKey, BalanceChange>)> {
        self.0.iter()
    }

    /// Number of accounts with at least one entry.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop entries whose net delta is zero, then accounts left without entries.
    pub fn without_zero_deltas(mut self) -> Self {
        for entries in self.0.values_mut() {
            entries.retain(|_, change| !change.delta.is_zero());
        }
        self.0.retain(|_, entries| !entries.is_empty());
        self
    }

    /// Keep only the given account.
    pub fn for_account(mut self, account: &Address) -> Self {
        self.0.retain(|addr, _| addr == account);
        self
    }

    /// One row per (account, asset), in map order.
    pub fn rows(&self) -> Vec<BalanceChangeRow> {
        self.0
            .iter()
            .flat_map(|(account, entries)| {
                entries.iter().map(move |(asset, change)| BalanceChangeRow {
                    account: *account,
                    asset: asset.to_string(),
                    coin_type: change.coin_type.clone(),
                    fa_address: change.fa_address,
                    delta: change.delta.to_string(),
                })
            })
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<Address, BTreeMap<AssetKey, BalanceChange>> {
        self.0
    }
}

/// Flattened balance change, for tabular output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceChangeRow {
    pub account: Address,
    pub asset: String,
    pub coin_type: Option<String>,
    pub fa_address: Address,
    pub delta: String,
}

fn serialize_display<T: fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
