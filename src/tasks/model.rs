// tasks/model.rs — Task entity and status enumeration.

use anyhow::{Context as _, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::storage::TaskRow;

// ─── TaskStatus ───────────────────────────────────────────────────────────────

/// Task lifecycle status.
///
/// Two representations exist and both mappings are explicit:
/// - the wire label (`"Not started"`, `"In Progress"`, `"Completed"`) used in
///   JSON bodies, handled by the serde renames below;
/// - the storage name (`NOT_STARTED`, `IN_PROGRESS`, `COMPLETED`) written to
///   the database, handled by [`TaskStatus::as_str`] / [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "Not started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::NotStarted,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Human-readable wire label.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Parse a wire label. Returns `None` for unrecognized input.
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == s)
    }

    /// Symbolic storage name, e.g. `NOT_STARTED`.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "NOT_STARTED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A status string that matches none of the defined storage names.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized task status: {0:?}")]
pub struct ParseStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

// ─── Task ─────────────────────────────────────────────────────────────────────

/// The persisted to-do item.
///
/// `id` is assigned by the store on insert and immutable thereafter;
/// `created_date` is set once at creation and never changed on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub due_date: NaiveDate,
    /// Serialized as an RFC 3339 timestamp.
    pub created_date: DateTime<Utc>,
}

impl Task {
    /// Decode a database row into the domain type.
    ///
    /// Fails when the stored status or dates do not parse; a row can only get
    /// into that state through out-of-band writes.
    pub fn from_row(row: TaskRow) -> Result<Self> {
        let status = row
            .status
            .parse::<TaskStatus>()
            .with_context(|| format!("task {}", row.id))?;
        let due_date = NaiveDate::parse_from_str(&row.due_date, "%Y-%m-%d")
            .with_context(|| format!("task {}: bad due_date {:?}", row.id, row.due_date))?;
        let created_date = DateTime::parse_from_rfc3339(&row.created_date)
            .with_context(|| format!("task {}: bad created_date {:?}", row.id, row.created_date))?
            .with_timezone(&Utc);
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status,
            due_date,
            created_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_label(status.label()), Some(status));
        }
        assert_eq!(TaskStatus::from_label("Not Started"), None);
        assert_eq!(TaskStatus::from_label(""), None);
    }

    #[test]
    fn status_storage_names_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&TaskStatus::NotStarted).unwrap();
        assert_eq!(json, "\"Not started\"");
        let back: TaskStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn task_serializes_with_camel_case_keys() {
        let task = Task {
            id: 1,
            title: "Test Task".into(),
            description: None,
            status: TaskStatus::Completed,
            due_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            created_date: "2024-01-15T09:30:00Z".parse().unwrap(),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["dueDate"], "2024-12-31");
        assert_eq!(value["createdDate"], "2024-01-15T09:30:00Z");
        assert_eq!(value["status"], "Completed");
    }

    #[test]
    fn from_row_rejects_unknown_status() {
        let row = TaskRow {
            id: 7,
            title: "t".into(),
            description: None,
            status: "ARCHIVED".into(),
            due_date: "2024-12-31".into(),
            created_date: "2024-01-15T09:30:00+00:00".into(),
        };
        assert!(Task::from_row(row).is_err());
    }
}
