//! The module contains `Project` and the form types used to create and edit it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, status};

/// Canonical text form of a deadline.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A project with a deadline.
///
/// The serialized form is the one stored in the per-user blob:
/// `{"id": 1, "name": "Launch", "deadline": "2099-01-01", "isImportant": false}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique within a collection, assigned by the store.
    pub id: i64,
    /// Never blank; stored trimmed.
    pub name: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub is_important: bool,
}

impl Project {
    /// Deadline in its `YYYY-MM-DD` form.
    pub fn deadline_text(&self) -> String {
        self.deadline.format(DATE_FORMAT).to_string()
    }
}

/// The buffer behind an add/edit form.
///
/// Fields hold raw user input and are only validated when the draft is
/// submitted to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub deadline: String,
    pub is_important: bool,
}

impl ProjectDraft {
    /// An empty form whose deadline is pre-filled with `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            deadline: today.format(DATE_FORMAT).to_string(),
            is_important: false,
        }
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            deadline: project.deadline_text(),
            is_important: project.is_important,
        }
    }

    pub(crate) fn validate(&self) -> ResultEngine<ValidFields> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation("name is required".to_string()));
        }

        Ok(ValidFields {
            name: name.to_string(),
            deadline: parse_deadline(&self.deadline)?,
            is_important: self.is_important,
        })
    }
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self::new(status::today())
    }
}

/// Partial replacement of a project's mutable fields.
///
/// Absent fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub deadline: Option<String>,
    pub is_important: Option<bool>,
}

impl ProjectUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn important(mut self, is_important: bool) -> Self {
        self.is_important = Some(is_important);
        self
    }

    /// Merge the update over `project`, producing the draft to validate.
    pub(crate) fn merge(self, project: &Project) -> ProjectDraft {
        let current = ProjectDraft::from_project(project);
        ProjectDraft {
            name: self.name.unwrap_or(current.name),
            deadline: self.deadline.unwrap_or(current.deadline),
            is_important: self.is_important.unwrap_or(current.is_important),
        }
    }
}

impl From<ProjectDraft> for ProjectUpdate {
    fn from(value: ProjectDraft) -> Self {
        Self {
            name: Some(value.name),
            deadline: Some(value.deadline),
            is_important: Some(value.is_important),
        }
    }
}

/// Fields that passed validation, ready to be written into a `Project`.
#[derive(Debug)]
pub(crate) struct ValidFields {
    pub name: String,
    pub deadline: NaiveDate,
    pub is_important: bool,
}

impl ValidFields {
    pub(crate) fn into_project(self, id: i64) -> Project {
        Project {
            id,
            name: self.name,
            deadline: self.deadline,
            is_important: self.is_important,
        }
    }
}

/// Parse a `YYYY-MM-DD` deadline.
pub fn parse_deadline(raw: &str) -> ResultEngine<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(EngineError::Validation("deadline is required".to_string()));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        EngineError::Validation(format!("invalid deadline '{raw}', expected YYYY-MM-DD"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project() -> Project {
        Project {
            id: 3,
            name: "Thesis".to_string(),
            deadline: date(2030, 6, 1),
            is_important: true,
        }
    }

    #[test]
    fn new_draft_defaults_deadline_to_today() {
        let draft = ProjectDraft::new(date(2025, 2, 9));
        assert_eq!(draft.name, "");
        assert_eq!(draft.deadline, "2025-02-09");
        assert!(!draft.is_important);
    }

    #[test]
    fn validate_trims_name() {
        let draft = ProjectDraft {
            name: "  Launch  ".to_string(),
            deadline: "2099-01-01".to_string(),
            is_important: false,
        };
        let fields = draft.validate().unwrap();
        assert_eq!(fields.name, "Launch");
        assert_eq!(fields.deadline, date(2099, 1, 1));
    }

    #[test]
    fn blank_name_is_rejected() {
        let draft = ProjectDraft {
            name: " \t ".to_string(),
            deadline: "2099-01-01".to_string(),
            is_important: false,
        };
        assert_eq!(
            draft.validate().unwrap_err(),
            EngineError::Validation("name is required".to_string())
        );
    }

    #[test]
    fn missing_or_bad_deadline_is_rejected() {
        assert!(matches!(
            parse_deadline(""),
            Err(EngineError::Validation(msg)) if msg == "deadline is required"
        ));
        assert!(matches!(
            parse_deadline("2099-13-01"),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            parse_deadline("01/01/2099"),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn update_keeps_absent_fields() {
        let draft = ProjectUpdate::default().name("Defense").merge(&project());
        assert_eq!(draft.name, "Defense");
        assert_eq!(draft.deadline, "2030-06-01");
        assert!(draft.is_important);
    }

    #[test]
    fn blob_shape_is_camel_case() {
        let json = serde_json::to_string(&project()).unwrap();
        assert_eq!(
            json,
            r#"{"id":3,"name":"Thesis","deadline":"2030-06-01","isImportant":true}"#
        );
    }
}
