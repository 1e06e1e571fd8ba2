//! Intake sources that feed batches.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Intake source of a batch; each source has its own processing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    /// Subsidy requests answered through the Onesid portal.
    Onesid,
    /// Individual requests, each naming its own responsible user.
    Onerequest,
    /// Rows of an uploaded spreadsheet.
    Spreadsheet,
}

impl TaskSource {
    /// Returns the canonical source name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Onesid => "onesid",
            Self::Onerequest => "onerequest",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

impl fmt::Display for TaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a source name matches no known source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown task source: {0}")]
pub struct ParseTaskSourceError(pub String);

impl TryFrom<&str> for TaskSource {
    type Error = ParseTaskSourceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "onesid" => Ok(Self::Onesid),
            "onerequest" => Ok(Self::Onerequest),
            "spreadsheet" => Ok(Self::Spreadsheet),
            _ => Err(ParseTaskSourceError(value.to_owned())),
        }
    }
}
