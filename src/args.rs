use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use vault_sim_core::OutputFormat;
use vault_sim_types::{normalize_address, Address};

use crate::env_utils::{env_bool_or, env_var, FORMAT_VAR, SKIP_ZERO_VAR};

#[derive(Debug, Parser)]
#[command(
    name = "vault-sim",
    author,
    version,
    about = "Reconstruct per-account balance changes from simulated transactions",
    long_about = "Reconstruct per-account balance changes from simulated transactions.\n\n\
                  Reads the JSON a fullnode returns from its simulate endpoint and prints the \
                  net balance change per account and asset, merging coin and fungible asset \
                  events into one view."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v debug, -vv trace). Overrides VAULT_SIM_LOG.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse simulation output and print balance changes
    Parse(ParseArgs),

    /// Print the fungible asset metadata address paired with a coin type
    PairedMetadata {
        /// Fully-qualified coin type, e.g. 0x1::aptos_coin::AptosCoin
        coin_type: String,
    },

    /// Print the canonical form of an address
    Normalize {
        address: String,

        /// Print the minimal form (0x1) instead of the 64-digit form
        #[arg(long, default_value_t = false)]
        short: bool,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Jsonl,
    Csv,
    Human,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Jsonl => OutputFormat::JsonLines,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Human => OutputFormat::Human,
        }
    }
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Simulation JSON (one transaction or an array); '-' reads stdin
    #[arg(value_name = "PATH", default_value = "-")]
    pub input: PathBuf,

    /// Output format [env: VAULT_SIM_FORMAT] (default: json)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Only report this account
    #[arg(long, value_name = "ADDR")]
    pub account: Option<String>,

    /// Drop entries whose net delta is zero [env: VAULT_SIM_SKIP_ZERO]
    #[arg(long, default_value_t = false)]
    pub skip_zero: bool,

    /// Single-line JSON instead of pretty-printed
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Show 64-digit addresses in human output
    #[arg(long, default_value_t = false)]
    pub long_addresses: bool,
}

/// `parse` options after applying environment fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConfig {
    pub input: PathBuf,
    pub format: OutputFormat,
    pub account: Option<Address>,
    pub skip_zero: bool,
    pub compact: bool,
    pub long_addresses: bool,
}

impl ParseConfig {
    pub fn resolve(args: &ParseArgs) -> Result<Self> {
        let format = match args.format {
            Some(arg) => OutputFormat::from(arg),
            None => match env_var::<String>(FORMAT_VAR) {
                Some(raw) => raw
                    .parse::<OutputFormat>()
                    .with_context(|| format!("invalid {}", FORMAT_VAR))?,
                None => OutputFormat::default(),
            },
        };

        let account = args
            .account
            .as_deref()
            .map(normalize_address)
            .transpose()
            .context("invalid --account")?;

        Ok(Self {
            input: args.input.clone(),
            format,
            account,
            skip_zero: args.skip_zero || env_bool_or(SKIP_ZERO_VAR, false),
            compact: args.compact,
            long_addresses: args.long_addresses,
        })
    }

    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}
