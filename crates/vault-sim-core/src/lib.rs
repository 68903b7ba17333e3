//! # Simulation parser
//!
//! Reconstructs the net balance change per account, per asset, from a
//! simulated transaction's write-set changes and events.
//!
//! Two token frameworks report balance movements independently: the coin
//! framework (events resolved to a coin type through their event stream GUID)
//! and the fungible asset framework (events naming a store, resolved to its
//! owner and metadata). Every coin type is mirrored as a fungible asset, so
//! the same movement can appear in both; the merge reports it once.
//!
//! ## Pipeline
//!
//! 1. [`writeset`]: lookup tables from `CoinStore`, `FungibleStore` and
//!    `ObjectCore` resources
//! 2. [`events`]: signed deltas from deposit/withdraw events
//! 3. [`context`]: the shared accumulator and the merge
//! 4. [`orchestrator`]: runs the passes, one fresh context per transaction
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use vault_sim_core::{parse_transaction, AssetKey};
//! use vault_sim_types::{normalize_address, Event, SimulatedTransaction};
//!
//! let tx = SimulatedTransaction::new(
//!     vec![],
//!     vec![Event::new(
//!         "0x1::coin::CoinWithdraw",
//!         json!({ "account": "0xa1", "amount": "5", "coin_type": "0x1::aptos_coin::AptosCoin" }),
//!     )],
//! );
//!
//! let changes = parse_transaction(&tx).unwrap().balance_changes();
//! let delta = changes
//!     .delta(&normalize_address("0xa1").unwrap(), &AssetKey::coin("0x1::aptos_coin::AptosCoin"))
//!     .unwrap();
//! assert_eq!(delta.to_string(), "-5");
//! ```

pub mod context;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod output;
pub mod writeset;

pub use context::{AssetKey, BalanceChange, BalanceChangeRow, BalanceChanges, SimulationContext};
pub use error::SimulationError;
pub use events::{default_event_parsers, CoinEventParser, EventParser, FungibleAssetEventParser};
pub use orchestrator::{parse_transaction, parse_transactions, simulate_report, SimulationReport};
pub use output::{OutputFormat, OutputFormatter};
pub use writeset::{
    default_writeset_parsers, CoinStoreParser, FungibleStoreParser, ObjectOwnerParser,
    WritesetParser,
};
