use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Tag attached to every entry in a migration log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Validation,
    Create,
    Migration,
    Report,
}

impl Action {
    pub fn all() -> &'static [Action] {
        &[
            Action::Validation,
            Action::Create,
            Action::Migration,
            Action::Report,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Validation => "VALIDATION",
            Action::Create => "CREATE",
            Action::Migration => "MIGRATION",
            Action::Report => "REPORT",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = crate::error::PromoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VALIDATION" => Ok(Action::Validation),
            "CREATE" => Ok(Action::Create),
            "MIGRATION" => Ok(Action::Migration),
            "REPORT" => Ok(Action::Report),
            _ => Err(crate::error::PromoteError::InvalidAction(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
