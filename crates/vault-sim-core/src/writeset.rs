//! Writeset parsers.
//!
//! Each parser looks at one write-set change, and if it recognises the
//! resource type, records a lookup entry in the [`SimulationContext`]:
//!
//! | Parser                  | Resource                              | Table                         |
//! |-------------------------|---------------------------------------|-------------------------------|
//! | [`CoinStoreParser`]     | `0x1::coin::CoinStore<T>`             | event GUID -> coin type `T`   |
//! | [`FungibleStoreParser`] | `0x1::fungible_asset::FungibleStore`  | store -> metadata             |
//! | [`ObjectOwnerParser`]   | `0x1::object::ObjectCore`             | object -> owner               |
//!
//! Parsers only ever insert, and inserting the same key with the same value is
//! a no-op, so running them in any order or more than once is safe.

use serde_json::Value;
use tracing::debug;
use vault_sim_types::framework::{structs, APTOS_FRAMEWORK};
use vault_sim_types::transaction::value_as_numeric_string;
use vault_sim_types::type_parsing::{generic_type_args, is_struct, parse_struct_tag};
use vault_sim_types::{normalize_address, serialize_event_guid, Address, WriteResource, WriteSetChange};

use crate::context::SimulationContext;
use crate::error::{Result, SimulationError};

/// Inspects write-set changes and fills the context's lookup tables.
pub trait WritesetParser: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `Ok(true)` if the change was recognised and recorded.
    ///
    /// Unrecognised changes return `Ok(false)` and leave the context untouched.
    fn parse_change(&self, ctx: &mut SimulationContext, change: &WriteSetChange) -> Result<bool>;
}

/// The writeset parsers run by the orchestrator, in a fixed order.
pub fn default_writeset_parsers() -> [&'static dyn WritesetParser; 3] {
    [&CoinStoreParser, &FungibleStoreParser, &ObjectOwnerParser]
}

/// The resource, if `change` writes the framework struct `(module, name)`.
fn framework_resource<'a>(
    change: &'a WriteSetChange,
    module_and_name: (&str, &str),
) -> Option<&'a WriteResource> {
    let resource = change.as_write_resource()?;
    let tag = parse_struct_tag(&resource.data.resource_type)?;
    is_struct(&tag, &APTOS_FRAMEWORK, module_and_name).then_some(resource)
}

fn address_field(
    resource: &WriteResource,
    field: &str,
    raw: &str,
) -> Result<Address> {
    normalize_address(raw)
        .map_err(|e| SimulationError::from(e).at(format!("{}.{}", resource.data.resource_type, field)))
}

/// Records both event streams of a `CoinStore<T>` against `T`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoinStoreParser;

impl CoinStoreParser {
    /// `(creator, creation number)` of the event handle stored under `field`.
    fn handle_guid<'a>(data: &'a Value, field: &str) -> Option<(&'a str, String)> {
        let id = data.get(field)?.pointer("/guid/id")?;
        let creator = id.get("addr")?.as_str()?;
        let creation_number = value_as_numeric_string(id.get("creation_num")?)?;
        Some((creator, creation_number))
    }
}

impl WritesetParser for CoinStoreParser {
    fn name(&self) -> &'static str {
        "coin_store"
    }

    fn parse_change(&self, ctx: &mut SimulationContext, change: &WriteSetChange) -> Result<bool> {
        let Some(resource) = framework_resource(change, structs::COIN_STORE) else {
            return Ok(false);
        };
        let resource_type = &resource.data.resource_type;

        let Some(&[coin_type]) = generic_type_args(resource_type).as_deref() else {
            debug!(%resource_type, "CoinStore without exactly one type argument");
            return Ok(false);
        };

        let mut handled = false;
        for field in ["deposit_events", "withdraw_events"] {
            let Some((creator, creation_number)) = Self::handle_guid(&resource.data.data, field)
            else {
                debug!(%resource_type, address = %resource.address, field, "CoinStore missing event handle");
                continue;
            };
            let key = serialize_event_guid(creator, &creation_number)
                .map_err(|e| SimulationError::from(e).at(format!("{}.{}", resource_type, field)))?;
            ctx.register_coin_event_stream(key, coin_type);
            handled = true;
        }

        Ok(handled)
    }
}

/// Records which metadata object a `FungibleStore` holds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FungibleStoreParser;

impl WritesetParser for FungibleStoreParser {
    fn name(&self) -> &'static str {
        "fungible_store"
    }

    fn parse_change(&self, ctx: &mut SimulationContext, change: &WriteSetChange) -> Result<bool> {
        let Some(resource) = framework_resource(change, structs::FUNGIBLE_STORE) else {
            return Ok(false);
        };

        let Some(metadata) = resource
            .data
            .data
            .pointer("/metadata/inner")
            .and_then(Value::as_str)
        else {
            debug!(address = %resource.address, "FungibleStore without metadata.inner");
            return Ok(false);
        };

        let store = address_field(resource, "address", &resource.address)?;
        let metadata = address_field(resource, "metadata.inner", metadata)?;
        ctx.set_store_metadata(store, metadata);
        Ok(true)
    }
}

/// Records the owner of every object whose `ObjectCore` was written.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectOwnerParser;

impl WritesetParser for ObjectOwnerParser {
    fn name(&self) -> &'static str {
        "object_owner"
    }

    fn parse_change(&self, ctx: &mut SimulationContext, change: &WriteSetChange) -> Result<bool> {
        let Some(resource) = framework_resource(change, structs::OBJECT_CORE) else {
            return Ok(false);
        };

        let Some(owner) = resource.data.data.get("owner").and_then(Value::as_str) else {
            debug!(address = %resource.address, "ObjectCore without owner");
            return Ok(false);
        };

        let object = address_field(resource, "address", &resource.address)?;
        let owner = address_field(resource, "owner", owner)?;
        ctx.set_object_owner(object, owner);
        Ok(true)
    }
}
