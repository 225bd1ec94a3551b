//! Feature identifiers
//!
//! ID Format: `FR-{3-digit-sequence}` (e.g., `FR-001`, `FR-042`, `FR-999`)
//!
//! The width is fixed, so lexical and numeric ordering agree. Anything else
//! (`FR-1`, `FR-0001`, `fr-001`, `FR-ABC`) is rejected at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Constant marker every feature ID starts with
pub const FEATURE_ID_PREFIX: &str = "FR-";

/// Number of digits in the sequence portion
pub const FEATURE_ID_DIGITS: usize = 3;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid feature ID format: expected 'FR-{{3 digits}}', got '{0}'")]
    InvalidFeatureId(String),

    #[error("Invalid sequence number: {0} (expected 1-999)")]
    InvalidSequence(u32),
}

/// Feature ID in the format `FR-{3-digit-sequence}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureId {
    sequence: u16,
}

impl FeatureId {
    /// Creates a feature ID from its sequence number
    pub fn new(sequence: u32) -> Result<Self, IdError> {
        if sequence == 0 || sequence > 999 {
            return Err(IdError::InvalidSequence(sequence));
        }
        Ok(Self {
            sequence: sequence as u16,
        })
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", FEATURE_ID_PREFIX, self.sequence)
    }
}

impl FromStr for FeatureId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(FEATURE_ID_PREFIX)
            .ok_or_else(|| IdError::InvalidFeatureId(s.to_string()))?;

        if digits.len() != FEATURE_ID_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdError::InvalidFeatureId(s.to_string()));
        }

        let sequence: u16 = digits
            .parse()
            .map_err(|_| IdError::InvalidFeatureId(s.to_string()))?;

        // FR-000 is never issued
        if sequence == 0 {
            return Err(IdError::InvalidFeatureId(s.to_string()));
        }

        Ok(Self { sequence })
    }
}

impl TryFrom<String> for FeatureId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FeatureId> for String {
    fn from(id: FeatureId) -> Self {
        id.to_string()
    }
}
