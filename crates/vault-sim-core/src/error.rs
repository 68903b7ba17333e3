//! Error type for the simulation parser.
//!
//! Almost nothing in a simulation result is fatal: unknown resources, unknown
//! events and references to stores this transaction never touched are skipped.
//! The one hard failure is an address that cannot be decoded at all.

use vault_sim_types::InvalidAddress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// An address field in the simulation output is structurally corrupt.
    InvalidAddress {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: &'static str,
        /// Where it was found (e.g. "0x1::object::ObjectCore.owner")
        location: Option<String>,
    },
}

impl SimulationError {
    /// Attach the field the bad address was read from.
    pub fn at(self, location: impl Into<String>) -> Self {
        match self {
            SimulationError::InvalidAddress { input, reason, .. } => {
                SimulationError::InvalidAddress {
                    input,
                    reason,
                    location: Some(location.into()),
                }
            }
        }
    }
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidAddress {
                input,
                reason,
                location,
            } => {
                write!(f, "InvalidAddress: '{}' ({})", input, reason)?;
                if let Some(loc) = location {
                    write!(f, " in {}", loc)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<InvalidAddress> for SimulationError {
    fn from(err: InvalidAddress) -> Self {
        SimulationError::InvalidAddress {
            input: err.input,
            reason: err.reason,
            location: None,
        }
    }
}

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use vault_sim_types::normalize_address;

    #[test]
    fn test_display_includes_location() {
        let err: SimulationError = normalize_address("0xzz").unwrap_err().into();
        assert_eq!(err.to_string(), "InvalidAddress: '0xzz' (non-hex character)");

        let err = err.at("0x1::object::ObjectCore.owner");
        assert_eq!(
            err.to_string(),
            "InvalidAddress: '0xzz' (non-hex character) in 0x1::object::ObjectCore.owner"
        );
    }
}
