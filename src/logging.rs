//! `tracing` subscriber setup for the CLI.
//!
//! Library crates only emit events; the binary decides where they go. Logs are
//! written to stderr so stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

use crate::env_utils::{env_first, LOG_VAR};

const DEFAULT_DIRECTIVE: &str = "warn";

/// Filter directive for the given `-v` count.
///
/// Any `-v` wins over the environment; otherwise `VAULT_SIM_LOG`, then
/// `RUST_LOG`, then `warn`.
pub fn filter_directive(verbose: u8) -> String {
    match verbose {
        0 => env_first(&[LOG_VAR, "RUST_LOG"]).unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string()),
        1 => "vault_sim=debug,vault_sim_core=debug,vault_sim_types=debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: u8) {
    let directive = filter_directive(verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_environment() {
        assert!(filter_directive(1).contains("vault_sim_core=debug"));
        assert_eq!(filter_directive(3), "trace");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(0);
        init(2);
    }
}
