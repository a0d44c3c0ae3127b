//! Validation options.

use serde::{Deserialize, Serialize};

use crate::error::CheckError;

/// Switches for the optional rule groups. Every group is on by default.
///
/// Deserializes from a JSON object in which any field may be omitted:
///
/// ```json
/// { "check_visibility": false }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckOptions {
    /// Inconsistent-visibility checks on `Requires<E>` exception types and on
    /// members referenced from preconditions.
    pub check_visibility: bool,
    /// Advisory `CustomWarning` rules (async and iterator preconditions,
    /// exception types without a message constructor).
    pub advisory_warnings: bool,
    /// Contract message validity.
    pub check_messages: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            check_visibility: true,
            advisory_warnings: true,
            check_messages: true,
        }
    }
}

impl CheckOptions {
    /// Parses options from a JSON object.
    pub fn from_json(text: &str) -> Result<Self, CheckError> {
        serde_json::from_str(text).map_err(|e| CheckError::InvalidOptions {
            reason: e.to_string(),
        })
    }
}
