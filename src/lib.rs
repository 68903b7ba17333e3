//! vault-sim
//!
//! Command-line front end for the simulation parser:
//!
//! - **parse**: reconstruct per-account balance changes from simulate output
//! - **paired-metadata**: fungible asset metadata address paired with a coin type
//! - **normalize**: canonical address form
//!
//! The parsing itself lives in [`vault_sim_core`]; the address and wire types
//! in [`vault_sim_types`].

pub mod args;
pub mod env_utils;
pub mod logging;
pub mod runner;
