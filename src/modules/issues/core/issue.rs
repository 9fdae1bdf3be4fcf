// The mirrored issue and its value types.
//
// Purpose
// - Represent one issue snapshot as received from the remote tracker.
//
// Boundaries
// - Identifiers are assigned remotely. Nothing in this crate generates them.
// - Issues are immutable snapshots. A sync replaces a stored row wholesale.

use crate::shared::core::errors::DataError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64")]
pub struct IssueId(i64);

impl IssueId {
    pub fn new(value: i64) -> Result<Self, DataError> {
        if value <= 0 {
            return Err(DataError::invalid_identifier(format!(
                "issue id must be positive, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl FromStr for IssueId {
    type Err = DataError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DataError::invalid_identifier(format!(
                "{raw:?} is not a decimal issue id"
            )));
        }
        let value = raw.parse::<i64>().map_err(|e| {
            DataError::invalid_identifier(format!("{raw:?} is out of range")).with_cause(e)
        })?;
        Self::new(value)
    }
}

impl TryFrom<i64> for IssueId {
    type Error = DataError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human readable key such as `CORE-42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct IssueKey(String);

impl IssueKey {
    pub fn parse(raw: &str) -> Result<Self, DataError> {
        let invalid = || DataError::invalid_identifier(format!("{raw:?} is not an issue key"));
        let (project, number) = raw.rsplit_once('-').ok_or_else(invalid)?;

        let mut project_chars = project.chars();
        let project_ok = project_chars.next().is_some_and(|c| c.is_ascii_uppercase())
            && project_chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        let number_ok = !number.starts_with('0')
            && !number.is_empty()
            && number.bytes().all(|b| b.is_ascii_digit());

        if !project_ok || !number_ok {
            return Err(invalid());
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn project_key(&self) -> &str {
        self.0.rsplit_once('-').map(|(p, _)| p).unwrap_or(&self.0)
    }
}

impl TryFrom<String> for IssueKey {
    type Error = DataError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueType {
    Bug,
    Story,
    Task,
    Epic,
    Subtask,
    Other(String),
}

impl IssueType {
    pub fn from_remote_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bug" => Self::Bug,
            "story" => Self::Story,
            "task" => Self::Task,
            "epic" => Self::Epic,
            "subtask" | "sub-task" => Self::Subtask,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bug => "Bug",
            Self::Story => "Story",
            Self::Task => "Task",
            Self::Epic => "Epic",
            Self::Subtask => "Subtask",
            Self::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssuePriority {
    Highest,
    High,
    Medium,
    Low,
    Lowest,
    Unset,
}

impl IssuePriority {
    pub fn from_remote_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "highest" => Self::Highest,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            "lowest" => Self::Lowest,
            _ => Self::Unset,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Highest => "Highest",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Lowest => "Lowest",
            Self::Unset => "Unset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub key: IssueKey,
    pub project_id: i64,
    pub summary: String,
    pub description: Option<String>,
    pub issue_type: IssueType,
    pub priority: IssuePriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
