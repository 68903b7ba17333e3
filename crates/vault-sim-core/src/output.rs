//! # Output formatting for simulation reports
//!
//! Renders [`SimulationReport`]s as JSON, JSON Lines, CSV, or a human-readable
//! table. JSON output keeps the nested account -> asset -> change shape; CSV
//! and human output use the flattened [`BalanceChangeRow`]s.
//!
//! ## Usage
//!
//! ```
//! use vault_sim_core::output::{OutputFormat, OutputFormatter};
//! use vault_sim_core::simulate_report;
//! use vault_sim_types::SimulatedTransaction;
//!
//! let report = simulate_report(&SimulatedTransaction::default()).unwrap();
//! let formatter = OutputFormatter::new(OutputFormat::Csv);
//! let output = formatter.format_reports(&[report]).unwrap();
//! assert!(output.starts_with("hash,account,asset"));
//! ```

use std::fmt::Write as _;
use std::io::Write;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::context::BalanceChangeRow;
use crate::orchestrator::SimulationReport;

const CSV_HEADER: &str = "hash,account,asset,coin_type,fa_address,delta";

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// JSON Lines format (one report per line)
    JsonLines,
    /// Comma-separated values, one row per balance change
    Csv,
    /// Human-readable table
    Human,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    /// Parse format from string (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            "human" | "text" | "table" => Ok(Self::Human),
            other => Err(anyhow!(
                "unknown output format '{}' (expected json, jsonl, csv or human)",
                other
            )),
        }
    }
}

/// Formatter for simulation reports.
pub struct OutputFormatter {
    format: OutputFormat,
    /// Pretty-print JSON (default: true for Json)
    pretty: Option<bool>,
    /// Show full 64-digit addresses in human output
    long_addresses: bool,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Json)
    }
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: None,
            long_addresses: false,
        }
    }

    /// Set pretty-printing preference.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = Some(pretty);
        self
    }

    pub fn with_long_addresses(mut self, long: bool) -> Self {
        self.long_addresses = long;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a single serializable value as JSON.
    pub fn format_value<T: Serialize>(&self, value: &T) -> Result<String> {
        let pretty = match self.format {
            OutputFormat::Json => self.pretty.unwrap_or(true),
            _ => self.pretty.unwrap_or(false),
        };
        if pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }

    /// Format a batch of reports.
    ///
    /// A single report renders as one JSON object; several render as an array.
    pub fn format_reports(&self, reports: &[SimulationReport]) -> Result<String> {
        match self.format {
            OutputFormat::Json => match reports {
                [single] => self.format_value(single),
                many => self.format_value(&many),
            },
            OutputFormat::JsonLines => {
                let mut output = String::new();
                for report in reports {
                    output.push_str(&serde_json::to_string(report)?);
                    output.push('\n');
                }
                Ok(output)
            }
            OutputFormat::Csv => {
                let mut output = String::from(CSV_HEADER);
                output.push('\n');
                for report in reports {
                    let hash = report.hash.as_deref().unwrap_or_default();
                    for row in report.balance_changes.rows() {
                        output.push_str(&csv_line(hash, &row));
                        output.push('\n');
                    }
                }
                Ok(output)
            }
            OutputFormat::Human => {
                let mut output = String::new();
                for (i, report) in reports.iter().enumerate() {
                    if i > 0 {
                        output.push('\n');
                    }
                    self.write_human(&mut output, report)?;
                }
                Ok(output)
            }
        }
    }

    /// Write formatted reports to a writer.
    pub fn write_reports<W: Write>(&self, reports: &[SimulationReport], writer: &mut W) -> Result<()> {
        let output = self.format_reports(reports)?;
        writer.write_all(output.as_bytes())?;
        if !output.ends_with('\n') {
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn write_human(&self, out: &mut String, report: &SimulationReport) -> Result<()> {
        let status = match report.success {
            Some(true) => "success",
            Some(false) => "failed",
            None => "unknown",
        };
        writeln!(
            out,
            "transaction {} ({})",
            report.hash.as_deref().unwrap_or("<unsigned>"),
            status
        )?;
        if let Some(vm_status) = &report.vm_status {
            writeln!(out, "  vm status: {}", vm_status)?;
        }
        if let Some(gas_used) = &report.gas_used {
            writeln!(out, "  gas used: {}", gas_used)?;
        }

        let rows = report.balance_changes.rows();
        if rows.is_empty() {
            writeln!(out, "  no balance changes")?;
            return Ok(());
        }

        let accounts: Vec<String> = rows.iter().map(|row| self.address(&row.account)).collect();
        let width = accounts.iter().map(String::len).max().unwrap_or(0);
        for (row, account) in rows.iter().zip(&accounts) {
            let sign = if row.delta.starts_with('-') { "" } else { "+" };
            writeln!(out, "  {:<width$}  {}{}  {}", account, sign, row.delta, row.asset)?;
        }
        Ok(())
    }

    fn address(&self, addr: &vault_sim_types::Address) -> String {
        if self.long_addresses {
            addr.to_string()
        } else {
            addr.to_short_string()
        }
    }
}

fn csv_line(hash: &str, row: &BalanceChangeRow) -> String {
    [
        escape_csv_field(hash),
        row.account.to_string(),
        escape_csv_field(&row.asset),
        escape_csv_field(row.coin_type.as_deref().unwrap_or_default()),
        row.fa_address.to_string(),
        row.delta.clone(),
    ]
    .join(",")
}

/// Escape a CSV field (quote if necessary).
fn escape_csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
