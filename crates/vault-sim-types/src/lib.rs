//! Shared types for the vault-sim workspace.
//!
//! This crate holds the foundational pieces the simulation parser is built on:
//!
//! - [`address`]: canonical [`Address`] form, event GUID keys and the
//!   paired-metadata derivation for coin types
//! - [`framework`]: well-known addresses and the struct tags the parsers match
//! - [`type_parsing`]: Move type string parsing
//! - [`transaction`]: serde wire model of a simulated transaction

pub mod address;
pub mod framework;
pub mod transaction;
pub mod type_parsing;

// Re-export commonly used types at crate root
pub use address::{
    create_object_address, derive_paired_fungible_metadata, normalize_address,
    normalize_address_string, serialize_event_guid, Address, InvalidAddress,
};
pub use transaction::{
    Event, EventGuid, MoveResource, SimulatedTransaction, SimulationInput, WriteResource,
    WriteSetChange,
};
