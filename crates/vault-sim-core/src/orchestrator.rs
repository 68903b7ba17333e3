//! Runs every parser over a simulated transaction.
//!
//! The writeset pass always completes before the event pass starts, so every
//! lookup an event needs is already in place no matter where the change that
//! provides it sits in the writeset.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;
use vault_sim_types::SimulatedTransaction;

use crate::context::{BalanceChanges, SimulationContext};
use crate::error::Result;
use crate::events::default_event_parsers;
use crate::writeset::default_writeset_parsers;

/// Parse one simulated transaction into a fresh [`SimulationContext`].
///
/// Pure and deterministic: no I/O, and the result does not depend on the
/// order of `changes` or `events`.
///
/// # Example
///
/// ```
/// use vault_sim_core::parse_transaction;
/// use vault_sim_types::SimulatedTransaction;
///
/// let ctx = parse_transaction(&SimulatedTransaction::default()).unwrap();
/// assert!(ctx.balance_changes().is_empty());
/// ```
pub fn parse_transaction(transaction: &SimulatedTransaction) -> Result<SimulationContext> {
    let mut ctx = SimulationContext::new();

    let writeset_parsers = default_writeset_parsers();
    let mut recognised_changes = 0usize;
    for change in &transaction.changes {
        for parser in writeset_parsers {
            if parser.parse_change(&mut ctx, change)? {
                recognised_changes += 1;
            }
        }
    }

    let event_parsers = default_event_parsers();
    let mut recognised_events = 0usize;
    for event in &transaction.events {
        for parser in event_parsers {
            if parser.parse_event(&mut ctx, event)? {
                recognised_events += 1;
            }
        }
    }

    debug!(
        hash = transaction.hash.as_deref().unwrap_or("-"),
        changes = transaction.changes.len(),
        recognised_changes,
        events = transaction.events.len(),
        recognised_events,
        "parsed simulated transaction"
    );

    Ok(ctx)
}

/// Outcome of one simulation plus its merged balance changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<String>,
    pub balance_changes: BalanceChanges,
}

/// [`parse_transaction`] followed by the merge, with the transaction's status.
pub fn simulate_report(transaction: &SimulatedTransaction) -> Result<SimulationReport> {
    let ctx = parse_transaction(transaction)?;
    Ok(SimulationReport {
        hash: transaction.hash.clone(),
        sender: transaction.sender.clone(),
        success: transaction.success,
        vm_status: transaction.vm_status.clone(),
        gas_used: transaction.gas_used.clone(),
        balance_changes: ctx.balance_changes(),
    })
}

/// Parse many simulations in parallel, one context each.
///
/// Results come back in input order; one corrupt transaction does not affect
/// the others.
pub fn parse_transactions(transactions: &[SimulatedTransaction]) -> Vec<Result<SimulationReport>> {
    transactions.par_iter().map(simulate_report).collect()
}
