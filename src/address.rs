//! Validator operator address validation
//!
//! A request names its subject with a bech32 validator operator address
//! (e.g. `umeevaloper1...`). The address is validated before any node read:
//! malformed input fails the request fast, with no remote traffic.

use bech32::Hrp;
use thiserror::Error;

/// Address validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("not a valid bech32 string: {0}")]
    Malformed(String),

    #[error("wrong address prefix: expected '{expected}', got '{found}'")]
    WrongPrefix { expected: String, found: String },
}

/// A checksum-verified validator operator address
///
/// Construction is the only way to obtain one, so any `ValoperAddress`
/// reaching the chain reader has already passed bech32 and prefix checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValoperAddress(String);

impl ValoperAddress {
    /// Parse and validate a bech32 validator operator address
    ///
    /// Verifies the checksum and that the human-readable part matches the
    /// configured prefix (case-insensitively; bech32 forbids mixed case
    /// within an address anyway).
    pub fn parse(addr: &str, expected_prefix: &str) -> Result<Self, AddressError> {
        let (hrp, _data) =
            bech32::decode(addr).map_err(|e| AddressError::Malformed(e.to_string()))?;

        if !hrp_matches(&hrp, expected_prefix) {
            return Err(AddressError::WrongPrefix {
                expected: expected_prefix.to_string(),
                found: hrp.to_string(),
            });
        }

        Ok(Self(addr.to_string()))
    }

    /// Get the address as originally supplied
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ValoperAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hrp_matches(hrp: &Hrp, expected: &str) -> bool {
    hrp.to_string().eq_ignore_ascii_case(expected)
}
