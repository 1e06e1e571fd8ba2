//! Identifier types assigned by the remote system.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Integer identifier assigned by the remote system.
///
/// The remote API is inconsistent about identifier encoding, so
/// deserialization accepts both `42` and `"42"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NumberOrText", into = "i64")]
pub struct ExternalId(i64);

impl ExternalId {
    /// Wraps a raw remote identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for ExternalId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ExternalId> for i64 {
    fn from(value: ExternalId) -> Self {
        value.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a value cannot be read as a remote identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid remote identifier: {0}")]
pub struct ParseExternalIdError(pub String);

impl FromStr for ExternalId {
    type Err = ParseExternalIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        trimmed
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ParseExternalIdError(value.to_owned()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

impl TryFrom<NumberOrText> for ExternalId {
    type Error = ParseExternalIdError;

    fn try_from(value: NumberOrText) -> Result<Self, Self::Error> {
        match value {
            NumberOrText::Number(number) => Ok(Self(number)),
            NumberOrText::Text(text) => text.parse(),
        }
    }
}

/// Reads an integer from a JSON value holding a number or a numeric string.
#[must_use]
pub fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
