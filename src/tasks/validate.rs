// tasks/validate.rs — Field-level validation for incoming task payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use super::model::TaskStatus;

pub const MAX_TITLE_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// One fixed message per violated field, keyed by the wire field name.
pub type FieldErrors = HashMap<&'static str, &'static str>;

/// Raw request body for add/update.
///
/// Every field is optional so that missing values surface as entries in the
/// field-error map instead of a deserialization failure. Unrecognized status
/// labels are treated the same way: `status` arrives as a plain string and is
/// checked against the label table during validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPayload {
    /// Ignored on add and update; the persisted id is authoritative.
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
    /// Honored on add when present, defaulted to now when absent.
    /// Ignored on update.
    pub created_date: Option<DateTime<Utc>>,
}

/// A payload that passed every field rule.
#[derive(Debug, Clone)]
pub struct ValidatedTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
}

impl TaskPayload {
    /// Check every field and collect one fixed message per violated rule.
    /// Multiple violations yield multiple entries; order is not guaranteed.
    pub fn validate(&self) -> Result<ValidatedTask, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => {
                if t.chars().count() > MAX_TITLE_LEN {
                    errors.insert("title", "Title must not exceed 255 characters");
                    None
                } else {
                    Some(t.to_string())
                }
            }
            _ => {
                errors.insert("title", "Title is required");
                None
            }
        };

        if let Some(d) = self.description.as_deref() {
            if d.chars().count() > MAX_DESCRIPTION_LEN {
                errors.insert("description", "Description must not exceed 1000 characters");
            }
        }

        let status = match self.status.as_deref() {
            None => {
                errors.insert("status", "Status is required");
                None
            }
            Some(s) => match TaskStatus::from_label(s) {
                Some(status) => Some(status),
                None => {
                    errors.insert(
                        "status",
                        "Status must be one of: Not started, In Progress, Completed",
                    );
                    None
                }
            },
        };

        let due_date = match self.due_date.as_deref() {
            None => {
                errors.insert("dueDate", "Due date is required");
                None
            }
            Some(d) => match NaiveDate::parse_from_str(d, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert("dueDate", "Due date must be a valid date (YYYY-MM-DD)");
                    None
                }
            },
        };

        match (title, status, due_date) {
            (Some(title), Some(status), Some(due_date)) if errors.is_empty() => Ok(ValidatedTask {
                title,
                description: self.description.clone(),
                status,
                due_date,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> TaskPayload {
        TaskPayload {
            title: Some("Test Task".into()),
            description: Some("Test Description".into()),
            status: Some("Not started".into()),
            due_date: Some("2024-12-31".into()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_payload_passes() {
        let v = valid_payload().validate().unwrap();
        assert_eq!(v.title, "Test Task");
        assert_eq!(v.status, TaskStatus::NotStarted);
        assert_eq!(v.due_date.to_string(), "2024-12-31");
    }

    #[test]
    fn missing_title_is_required() {
        let mut p = valid_payload();
        p.title = None;
        let errors = p.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some(&"Title is required"));
    }

    #[test]
    fn blank_title_is_required() {
        let mut p = valid_payload();
        p.title = Some("   ".into());
        let errors = p.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some(&"Title is required"));
    }

    #[test]
    fn overlong_title_rejected() {
        let mut p = valid_payload();
        p.title = Some("x".repeat(MAX_TITLE_LEN + 1));
        let errors = p.validate().unwrap_err();
        assert_eq!(
            errors.get("title"),
            Some(&"Title must not exceed 255 characters")
        );
    }

    #[test]
    fn overlong_description_rejected() {
        let mut p = valid_payload();
        p.description = Some("x".repeat(MAX_DESCRIPTION_LEN + 1));
        let errors = p.validate().unwrap_err();
        assert_eq!(
            errors.get("description"),
            Some(&"Description must not exceed 1000 characters")
        );
    }

    #[test]
    fn missing_description_is_fine() {
        let mut p = valid_payload();
        p.description = None;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn missing_and_unrecognized_status() {
        let mut p = valid_payload();
        p.status = None;
        let errors = p.validate().unwrap_err();
        assert_eq!(errors.get("status"), Some(&"Status is required"));

        p.status = Some("Done".into());
        let errors = p.validate().unwrap_err();
        assert_eq!(
            errors.get("status"),
            Some(&"Status must be one of: Not started, In Progress, Completed")
        );
    }

    #[test]
    fn missing_and_malformed_due_date() {
        let mut p = valid_payload();
        p.due_date = None;
        let errors = p.validate().unwrap_err();
        assert_eq!(errors.get("dueDate"), Some(&"Due date is required"));

        p.due_date = Some("31/12/2024".into());
        let errors = p.validate().unwrap_err();
        assert_eq!(
            errors.get("dueDate"),
            Some(&"Due date must be a valid date (YYYY-MM-DD)")
        );
    }

    #[test]
    fn multiple_violations_yield_multiple_entries() {
        let errors = TaskPayload::default().validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("status"));
        assert!(errors.contains_key("dueDate"));
        assert!(!errors.contains_key("description"));
    }
}
