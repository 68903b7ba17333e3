//! Command implementations for the `vault-sim` binary.

use std::fs;
use std::io::{Read, Write};

use anyhow::{Context, Result};
use tracing::info;
use vault_sim_core::{parse_transactions, OutputFormatter, SimulationReport};
use vault_sim_types::{derive_paired_fungible_metadata, normalize_address, SimulatedTransaction, SimulationInput};

use crate::args::{Cli, Command, ParseConfig};

/// Run a parsed command line, writing results to `out`.
pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Command::Parse(args) => {
            let config = ParseConfig::resolve(&args)?;
            run_parse(&config, out)
        }
        Command::PairedMetadata { coin_type } => {
            let metadata = derive_paired_fungible_metadata(coin_type.trim());
            writeln!(out, "{}", metadata)?;
            Ok(())
        }
        Command::Normalize { address, short } => {
            let addr = normalize_address(&address)?;
            if short {
                writeln!(out, "{}", addr.to_short_string())?;
            } else {
                writeln!(out, "{}", addr)?;
            }
            Ok(())
        }
    }
}

fn run_parse<W: Write>(config: &ParseConfig, out: &mut W) -> Result<()> {
    let raw = read_input(config)?;
    let transactions = load_transactions(&raw)?;
    info!(count = transactions.len(), "parsing simulated transactions");

    let reports = build_reports(&transactions, config)?;
    OutputFormatter::new(config.format)
        .with_pretty(!config.compact)
        .with_long_addresses(config.long_addresses)
        .write_reports(&reports, out)
}

fn read_input(config: &ParseConfig) -> Result<String> {
    if config.reads_stdin() {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read simulation from stdin")?;
        Ok(raw)
    } else {
        fs::read_to_string(&config.input)
            .with_context(|| format!("failed to read {}", config.input.display()))
    }
}

/// Decode simulate output: one transaction object or an array of them.
pub fn load_transactions(raw: &str) -> Result<Vec<SimulatedTransaction>> {
    let input: SimulationInput =
        serde_json::from_str(raw).context("input is not a simulated transaction (or array of them)")?;
    Ok(input.into_transactions())
}

/// Parse every transaction and apply the account / zero-delta filters.
pub fn build_reports(
    transactions: &[SimulatedTransaction],
    config: &ParseConfig,
) -> Result<Vec<SimulationReport>> {
    parse_transactions(transactions)
        .into_iter()
        .zip(transactions)
        .enumerate()
        .map(|(i, (result, tx))| {
            let mut report = result.with_context(|| {
                format!(
                    "transaction #{} ({})",
                    i,
                    tx.hash.as_deref().unwrap_or("no hash")
                )
            })?;
            if let Some(account) = &config.account {
                report.balance_changes = report.balance_changes.for_account(account);
            }
            if config.skip_zero {
                report.balance_changes = report.balance_changes.without_zero_deltas();
            }
            Ok(report)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use vault_sim_core::OutputFormat;

    const SELF_TRANSFER: &str = r#"{
        "hash": "0x01",
        "events": [
            { "type": "0x1::coin::CoinWithdraw",
              "data": { "account": "0xa1", "amount": "5", "coin_type": "0x1::aptos_coin::AptosCoin" } },
            { "type": "0x1::coin::CoinDeposit",
              "data": { "account": "0xa1", "amount": "5", "coin_type": "0x1::aptos_coin::AptosCoin" } },
            { "type": "0x1::coin::CoinDeposit",
              "data": { "account": "0xb2", "amount": "1", "coin_type": "0x1::aptos_coin::AptosCoin" } }
        ]
    }"#;

    fn config() -> ParseConfig {
        ParseConfig {
            input: PathBuf::from("-"),
            format: OutputFormat::Json,
            account: None,
            skip_zero: false,
            compact: true,
            long_addresses: false,
        }
    }

    #[test]
    fn test_load_transactions_single_and_batch() {
        assert_eq!(load_transactions(SELF_TRANSFER).unwrap().len(), 1);
        let batch = format!("[{0}, {0}]", SELF_TRANSFER);
        assert_eq!(load_transactions(&batch).unwrap().len(), 2);
        assert!(load_transactions("not json").is_err());
    }

    #[test]
    fn test_filters() {
        let txs = load_transactions(SELF_TRANSFER).unwrap();

        let all = build_reports(&txs, &config()).unwrap();
        assert_eq!(all[0].balance_changes.len(), 2);

        let skip_zero = ParseConfig {
            skip_zero: true,
            ..config()
        };
        let reports = build_reports(&txs, &skip_zero).unwrap();
        let accounts: Vec<_> = reports[0].balance_changes.accounts().collect();
        assert_eq!(accounts, vec![&normalize_address("0xb2").unwrap()]);

        let only_a1 = ParseConfig {
            account: Some(normalize_address("0xa1").unwrap()),
            ..config()
        };
        let reports = build_reports(&txs, &only_a1).unwrap();
        assert_eq!(reports[0].balance_changes.len(), 1);
    }

    #[test]
    fn test_error_names_the_transaction() {
        let raw = r#"[{ "hash": "0xbad", "events": [
            { "type": "0x1::fungible_asset::Deposit", "data": { "store": "zz", "amount": "1" } }
        ] }]"#;
        let txs = load_transactions(raw).unwrap();
        let err = build_reports(&txs, &config()).unwrap_err();
        assert!(format!("{:#}", err).contains("transaction #0 (0xbad)"));
    }
}
