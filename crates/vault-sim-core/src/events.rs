//! Event parsers.
//!
//! Event parsers turn deposit/withdraw events into signed deltas, using the
//! lookup tables the writeset parsers built. Two frameworks emit balance
//! events:
//!
//! - the coin framework, through handle-based `DepositEvent`/`WithdrawEvent`
//!   (resolved to a coin type through the event GUID) and module events
//!   `CoinDeposit`/`CoinWithdraw` (which name account and coin type inline);
//! - the fungible asset framework, through `Deposit`/`Withdraw` events that
//!   only name a store, resolved to owner and metadata through the context.
//!
//! An event that cannot be resolved (unknown GUID, untouched store) is dropped.
//! The store may simply predate this transaction, so this is not an error.

use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use serde_json::Value;
use tracing::debug;
use vault_sim_types::framework::{structs, APTOS_FRAMEWORK};
use vault_sim_types::transaction::value_as_numeric_string;
use vault_sim_types::type_parsing::{is_struct, parse_struct_tag};
use vault_sim_types::{normalize_address, serialize_event_guid, Address, Event};

use crate::context::SimulationContext;
use crate::error::{Result, SimulationError};

/// Inspects events and accumulates balance deltas into the context.
pub trait EventParser: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns `Ok(true)` if the event contributed a delta.
    fn parse_event(&self, ctx: &mut SimulationContext, event: &Event) -> Result<bool>;
}

/// The event parsers run by the orchestrator, in a fixed order.
pub fn default_event_parsers() -> [&'static dyn EventParser; 2] {
    [&CoinEventParser, &FungibleAssetEventParser]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Deposit,
    Withdraw,
}

impl Direction {
    fn signed(self, amount: BigUint) -> BigInt {
        let amount = BigInt::from(amount);
        match self {
            Direction::Deposit => amount,
            Direction::Withdraw => -amount,
        }
    }
}

/// `data.amount` as an unbounded non-negative integer.
fn parse_amount(data: &Value) -> Option<BigUint> {
    let raw = value_as_numeric_string(data.get("amount")?)?;
    BigUint::from_str(&raw).ok()
}

fn event_address(event: &Event, field: &str, raw: &str) -> Result<Address> {
    normalize_address(raw)
        .map_err(|e| SimulationError::from(e).at(format!("{}.{}", event.event_type, field)))
}

/// Handles the coin framework's deposit and withdraw events.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoinEventParser;

impl CoinEventParser {
    /// Account and coin type of a handle-based event, via its GUID.
    fn resolve_stream(ctx: &SimulationContext, event: &Event) -> Result<Option<(Address, String)>> {
        let Some(guid) = &event.guid else {
            debug!(event_type = %event.event_type, "coin event without guid");
            return Ok(None);
        };
        let key = serialize_event_guid(&guid.account_address, &guid.creation_number)
            .map_err(|e| SimulationError::from(e).at(format!("{}.guid", event.event_type)))?;
        let Some(coin_type) = ctx.coin_type_for_guid(&key) else {
            debug!(guid = %key, "coin event stream not in writeset, dropping");
            return Ok(None);
        };
        let account = event_address(event, "guid.account_address", &guid.account_address)?;
        Ok(Some((account, coin_type.to_string())))
    }

    /// Account and coin type carried in a module event's payload.
    fn resolve_inline(event: &Event) -> Result<Option<(Address, String)>> {
        let account = event.data.get("account").and_then(Value::as_str);
        let coin_type = event.data.get("coin_type").and_then(Value::as_str);
        let (Some(account), Some(coin_type)) = (account, coin_type) else {
            debug!(event_type = %event.event_type, "coin event without account or coin_type");
            return Ok(None);
        };
        let account = event_address(event, "account", account)?;
        Ok(Some((account, coin_type.to_string())))
    }
}

impl EventParser for CoinEventParser {
    fn name(&self) -> &'static str {
        "coin_events"
    }

    fn parse_event(&self, ctx: &mut SimulationContext, event: &Event) -> Result<bool> {
        let Some(tag) = parse_struct_tag(&event.event_type) else {
            return Ok(false);
        };
        let framework = &APTOS_FRAMEWORK;

        let (direction, inline) = if is_struct(&tag, framework, structs::COIN_DEPOSIT_EVENT) {
            (Direction::Deposit, false)
        } else if is_struct(&tag, framework, structs::COIN_WITHDRAW_EVENT) {
            (Direction::Withdraw, false)
        } else if is_struct(&tag, framework, structs::COIN_DEPOSIT) {
            (Direction::Deposit, true)
        } else if is_struct(&tag, framework, structs::COIN_WITHDRAW) {
            (Direction::Withdraw, true)
        } else {
            return Ok(false);
        };

        let resolved = if inline {
            Self::resolve_inline(event)?
        } else {
            Self::resolve_stream(ctx, event)?
        };
        let Some((account, coin_type)) = resolved else {
            return Ok(false);
        };

        let Some(amount) = parse_amount(&event.data) else {
            debug!(event_type = %event.event_type, "coin event without a valid amount");
            return Ok(false);
        };

        ctx.add_coin_delta(account, &coin_type, direction.signed(amount));
        Ok(true)
    }
}

/// Handles the fungible asset framework's `Deposit` and `Withdraw` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct FungibleAssetEventParser;

impl EventParser for FungibleAssetEventParser {
    fn name(&self) -> &'static str {
        "fungible_asset_events"
    }

    fn parse_event(&self, ctx: &mut SimulationContext, event: &Event) -> Result<bool> {
        let Some(tag) = parse_struct_tag(&event.event_type) else {
            return Ok(false);
        };
        let direction = if is_struct(&tag, &APTOS_FRAMEWORK, structs::FA_DEPOSIT) {
            Direction::Deposit
        } else if is_struct(&tag, &APTOS_FRAMEWORK, structs::FA_WITHDRAW) {
            Direction::Withdraw
        } else {
            return Ok(false);
        };

        let Some(store) = event.data.get("store").and_then(Value::as_str) else {
            debug!(event_type = %event.event_type, "fungible asset event without store");
            return Ok(false);
        };
        let store = event_address(event, "store", store)?;

        let owner = ctx.object_owner(&store).copied();
        let metadata = ctx.store_metadata(&store).copied();
        let (Some(owner), Some(metadata)) = (owner, metadata) else {
            debug!(%store, "fungible store not in writeset, dropping");
            return Ok(false);
        };

        let Some(amount) = parse_amount(&event.data) else {
            debug!(event_type = %event.event_type, "fungible asset event without a valid amount");
            return Ok(false);
        };

        ctx.add_fungible_asset_delta(owner, metadata, direction.signed(amount));
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vault_sim_types::framework::{NATIVE_COIN_TYPE, NATIVE_FUNGIBLE_ASSET};

    fn addr(s: &str) -> Address {
        normalize_address(s).unwrap()
    }

    fn coin_delta(ctx: &SimulationContext, account: &str, coin_type: &str) -> Option<BigInt> {
        ctx.coin_balance_changes()
            .get(&addr(account))
            .and_then(|coins| coins.get(coin_type))
            .cloned()
    }

    #[test]
    fn test_stream_events_resolve_through_guid() {
        let mut ctx = SimulationContext::new();
        ctx.register_coin_event_stream(serialize_event_guid("0xa1", "6").unwrap(), NATIVE_COIN_TYPE);
        ctx.register_coin_event_stream(serialize_event_guid("0xa1", "5").unwrap(), NATIVE_COIN_TYPE);

        let withdraw = Event::new("0x1::coin::WithdrawEvent", json!({ "amount": "100" }))
            .with_guid("0xA1", "6");
        let deposit = Event::new("0x1::coin::DepositEvent", json!({ "amount": "40" }))
            .with_guid("0x00a1", "5");

        assert!(CoinEventParser.parse_event(&mut ctx, &withdraw).unwrap());
        assert!(CoinEventParser.parse_event(&mut ctx, &deposit).unwrap());
        assert_eq!(coin_delta(&ctx, "0xa1", NATIVE_COIN_TYPE), Some(BigInt::from(-60)));
    }

    #[test]
    fn test_unmapped_guid_is_dropped() {
        let mut ctx = SimulationContext::new();
        let event = Event::new("0x1::coin::DepositEvent", json!({ "amount": "1" }))
            .with_guid("0xa1", "99");
        assert!(!CoinEventParser.parse_event(&mut ctx, &event).unwrap());
        assert!(ctx.coin_balance_changes().is_empty());
    }

    #[test]
    fn test_inline_coin_events() {
        let mut ctx = SimulationContext::new();
        let usdc = "0xf22b::asset::USDC";
        let deposit = Event::new(
            "0x1::coin::CoinDeposit",
            json!({ "account": "0xb2", "amount": "18446744073709551616", "coin_type": usdc }),
        )
        .with_guid("0x0", "0");
        let withdraw = Event::new(
            "0x1::coin::CoinWithdraw",
            json!({ "account": "0xb2", "amount": 16, "coin_type": usdc }),
        );

        assert!(CoinEventParser.parse_event(&mut ctx, &deposit).unwrap());
        assert!(CoinEventParser.parse_event(&mut ctx, &withdraw).unwrap());
        let expected: BigInt = "18446744073709551600".parse().unwrap();
        assert_eq!(coin_delta(&ctx, "0xb2", usdc), Some(expected));
    }

    #[test]
    fn test_bad_amount_is_dropped() {
        let mut ctx = SimulationContext::new();
        for amount in [json!("-5"), json!("abc"), json!(1.5), json!(null)] {
            let event = Event::new(
                "0x1::coin::CoinDeposit",
                json!({ "account": "0xb2", "amount": amount, "coin_type": NATIVE_COIN_TYPE }),
            );
            assert!(!CoinEventParser.parse_event(&mut ctx, &event).unwrap());
        }
        assert!(ctx.coin_balance_changes().is_empty());
    }

    #[test]
    fn test_fungible_asset_events_resolve_owner_and_metadata() {
        let mut ctx = SimulationContext::new();
        ctx.set_store_metadata(addr("0x51"), NATIVE_FUNGIBLE_ASSET);
        ctx.set_object_owner(addr("0x51"), addr("0xa1"));

        let withdraw = Event::new(
            "0x1::fungible_asset::Withdraw",
            json!({ "store": "0x51", "amount": "50" }),
        );
        assert!(FungibleAssetEventParser.parse_event(&mut ctx, &withdraw).unwrap());

        let ledger = ctx.fungible_asset_balance_changes();
        assert_eq!(
            ledger[&addr("0xa1")][&NATIVE_FUNGIBLE_ASSET],
            BigInt::from(-50)
        );
    }

    #[test]
    fn test_fungible_asset_event_needs_owner_and_metadata() {
        let mut ctx = SimulationContext::new();
        ctx.set_store_metadata(addr("0x51"), NATIVE_FUNGIBLE_ASSET);
        ctx.set_object_owner(addr("0x52"), addr("0xa1"));

        for store in ["0x51", "0x52", "0x53"] {
            let event = Event::new(
                "0x1::fungible_asset::Deposit",
                json!({ "store": store, "amount": "1" }),
            );
            assert!(!FungibleAssetEventParser.parse_event(&mut ctx, &event).unwrap());
        }
        assert!(ctx.fungible_asset_balance_changes().is_empty());
    }

    #[test]
    fn test_parsers_ignore_each_others_events() {
        let mut ctx = SimulationContext::new();
        let fa = Event::new("0x1::fungible_asset::Deposit", json!({ "store": "0x51", "amount": "1" }));
        let coin = Event::new(
            "0x1::coin::CoinDeposit",
            json!({ "account": "0xb2", "amount": "1", "coin_type": NATIVE_COIN_TYPE }),
        );
        let other = Event::new("0x1::transaction_fee::FeeStatement", json!({ "total_charge_gas_units": "7" }));

        assert!(!CoinEventParser.parse_event(&mut ctx, &fa).unwrap());
        assert!(!FungibleAssetEventParser.parse_event(&mut ctx, &coin).unwrap());
        for parser in default_event_parsers() {
            assert!(!parser.parse_event(&mut ctx, &other).unwrap(), "{}", parser.name());
        }
    }

    #[test]
    fn test_corrupt_store_address_is_an_error() {
        let mut ctx = SimulationContext::new();
        let event = Event::new(
            "0x1::fungible_asset::Deposit",
            json!({ "store": "0xnope", "amount": "1" }),
        );
        let err = FungibleAssetEventParser.parse_event(&mut ctx, &event).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidAddress { .. }));
    }
}
