//! vault-sim: balance changes from simulated transactions
//!
//! ## Example Usage
//!
//! ```bash
//! # Net balance changes of a saved simulation
//! vault-sim parse simulation.json
//!
//! # Straight from the simulate endpoint, as a table
//! curl -s ... | vault-sim parse - --format human
//!
//! # Paired fungible asset metadata of a coin type
//! vault-sim paired-metadata 0x1::aptos_coin::AptosCoin
//! ```

use anyhow::Result;
use clap::Parser;

use vault_sim::args::Cli;
use vault_sim::{logging, runner};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runner::run(cli, &mut out)
}
