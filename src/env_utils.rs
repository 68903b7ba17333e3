//! Environment variable parsing utilities.
//!
//! Every CLI flag that has an environment fallback reads it through here, so
//! the accepted spellings stay consistent:
//!
//! ```
//! use vault_sim::env_utils::{env_bool_or, env_var};
//!
//! let skip_zero = env_bool_or("VAULT_SIM_SKIP_ZERO", false);
//! let format: Option<String> = env_var("VAULT_SIM_FORMAT");
//! ```

use std::str::FromStr;

/// Output format used when `--format` is not given.
pub const FORMAT_VAR: &str = "VAULT_SIM_FORMAT";
/// Drop zero deltas when set to a truthy value.
pub const SKIP_ZERO_VAR: &str = "VAULT_SIM_SKIP_ZERO";
/// `tracing` filter directive for the CLI (falls back to `RUST_LOG`).
pub const LOG_VAR: &str = "VAULT_SIM_LOG";

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set, is blank, or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.trim().parse().ok())
}

/// Check if an environment variable is set to a truthy value, with a default.
///
/// "1", "true", "yes" and "on" (case-insensitive) are truthy; anything else
/// that is set is falsy.
pub fn env_bool_or(key: &str, default: bool) -> bool {
    match std::env::var(key).ok() {
        Some(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

/// First non-blank value among `keys`.
pub fn env_first(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|v| !v.trim().is_empty())
}
