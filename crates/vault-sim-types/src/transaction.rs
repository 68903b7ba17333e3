//! Wire types for simulated transactions.
//!
//! These mirror the JSON a fullnode returns from its simulate endpoint. Only
//! the envelope is typed: resource and event payloads stay as
//! [`serde_json::Value`] because their shape depends on the declared type, and
//! the parsers decide what they understand.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One simulated user transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatedTransaction {
    /// Transaction hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Sender address as reported by the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Whether execution succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    /// VM status string ("Executed successfully", "Move abort ...")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_status: Option<String>,

    /// Gas units consumed
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub gas_used: Option<String>,

    /// Write-set changes, in execution order
    #[serde(default)]
    pub changes: Vec<WriteSetChange>,

    /// Emitted events, in emission order
    #[serde(default)]
    pub events: Vec<Event>,
}

impl SimulatedTransaction {
    pub fn new(changes: Vec<WriteSetChange>, events: Vec<Event>) -> Self {
        Self {
            changes,
            events,
            ..Default::default()
        }
    }
}

/// A single write-set change.
///
/// Only `write_resource` carries data the parsers use; every other variant
/// (`delete_resource`, `write_table_item`, `write_module`, ...) collapses into
/// [`WriteSetChange::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WriteSetChange {
    WriteResource(WriteResource),
    #[serde(other)]
    Other,
}

impl WriteSetChange {
    pub fn write_resource(
        address: impl Into<String>,
        resource_type: impl Into<String>,
        data: Value,
    ) -> Self {
        WriteSetChange::WriteResource(WriteResource {
            address: address.into(),
            state_key_hash: None,
            data: MoveResource {
                resource_type: resource_type.into(),
                data,
            },
        })
    }

    /// The written resource, if this is a `write_resource` change.
    pub fn as_write_resource(&self) -> Option<&WriteResource> {
        match self {
            WriteSetChange::WriteResource(resource) => Some(resource),
            WriteSetChange::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResource {
    /// Account or object the resource lives under
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key_hash: Option<String>,
    pub data: MoveResource,
}

/// A Move resource: its fully-qualified type and its JSON-decoded fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub data: Value,
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,

    /// Present for handle-based events; module events carry a zero GUID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<EventGuid>,

    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub sequence_number: Option<String>,

    #[serde(default)]
    pub data: Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            guid: None,
            sequence_number: None,
            data,
        }
    }

    pub fn with_guid(
        mut self,
        account_address: impl Into<String>,
        creation_number: impl Into<String>,
    ) -> Self {
        self.guid = Some(EventGuid {
            account_address: account_address.into(),
            creation_number: creation_number.into(),
        });
        self
    }
}

/// Identifies one event stream: `(creator address, creation number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventGuid {
    pub account_address: String,
    #[serde(deserialize_with = "string_or_number")]
    pub creation_number: String,
}

/// Simulate endpoints answer with an array; saved fixtures are often a single
/// object. Accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimulationInput {
    Batch(Vec<SimulatedTransaction>),
    Single(Box<SimulatedTransaction>),
}

impl SimulationInput {
    pub fn into_transactions(self) -> Vec<SimulatedTransaction> {
        match self {
            SimulationInput::Batch(txs) => txs,
            SimulationInput::Single(tx) => vec![*tx],
        }
    }
}

/// Render a JSON string or non-negative integer as a string.
///
/// The REST API quotes u64 values, but hand-written fixtures often do not.
pub fn value_as_numeric_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) if n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_as_numeric_string(&value)
        .ok_or_else(|| serde::de::Error::custom("expected a string or unsigned integer"))
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => value_as_numeric_string(&v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a string or unsigned integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_node_shaped_transaction() {
        let raw = json!({
            "hash": "0xdead",
            "sender": "0xa1",
            "success": true,
            "vm_status": "Executed successfully",
            "gas_used": "12",
            "version": "99",
            "changes": [
                {
                    "type": "write_resource",
                    "address": "0xa1",
                    "state_key_hash": "0x01",
                    "data": {
                        "type": "0x1::object::ObjectCore",
                        "data": { "owner": "0xb2" }
                    }
                },
                { "type": "delete_resource", "address": "0xa1", "resource": "0x1::foo::Bar" },
                { "type": "write_table_item", "handle": "0x3", "key": "0x", "value": "0x" }
            ],
            "events": [
                {
                    "guid": { "creation_number": "6", "account_address": "0xa1" },
                    "sequence_number": "0",
                    "type": "0x1::coin::WithdrawEvent",
                    "data": { "amount": "100" }
                }
            ]
        });

        let tx: SimulatedTransaction = serde_json::from_value(raw).unwrap();
        assert_eq!(tx.gas_used.as_deref(), Some("12"));
        assert_eq!(tx.changes.len(), 3);
        assert!(tx.changes[0].as_write_resource().is_some());
        assert_eq!(tx.changes[1], WriteSetChange::Other);
        assert_eq!(tx.changes[2], WriteSetChange::Other);

        let guid = tx.events[0].guid.as_ref().unwrap();
        assert_eq!(guid.creation_number, "6");
        assert_eq!(tx.events[0].sequence_number.as_deref(), Some("0"));
    }

    #[test]
    fn test_numeric_fields_accept_numbers() {
        let event: Event = serde_json::from_value(json!({
            "type": "0x1::coin::DepositEvent",
            "guid": { "creation_number": 5, "account_address": "0xa1" },
            "sequence_number": 3,
            "data": { "amount": 7 }
        }))
        .unwrap();
        assert_eq!(event.guid.unwrap().creation_number, "5");
        assert_eq!(event.sequence_number.as_deref(), Some("3"));
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let tx: SimulatedTransaction = serde_json::from_value(json!({ "success": false })).unwrap();
        assert!(tx.changes.is_empty());
        assert!(tx.events.is_empty());
    }

    #[test]
    fn test_simulation_input_accepts_object_or_array() {
        let single: SimulationInput = serde_json::from_value(json!({ "changes": [] })).unwrap();
        assert_eq!(single.into_transactions().len(), 1);

        let batch: SimulationInput =
            serde_json::from_value(json!([{ "changes": [] }, { "events": [] }])).unwrap();
        assert_eq!(batch.into_transactions().len(), 2);
    }

    #[test]
    fn test_value_as_numeric_string() {
        assert_eq!(value_as_numeric_string(&json!("42")), Some("42".to_string()));
        assert_eq!(value_as_numeric_string(&json!(42)), Some("42".to_string()));
        assert_eq!(value_as_numeric_string(&json!(-1)), None);
        assert_eq!(value_as_numeric_string(&json!(1.5)), None);
        assert_eq!(value_as_numeric_string(&json!(null)), None);
    }
}
