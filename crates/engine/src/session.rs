//! The edit form state machine.
//!
//! ```text
//! Idle --start(index)--> Editing(index, buffer)
//! Editing --update_field--> Editing
//! Editing --commit / cancel--> Idle
//! ```
//!
//! The session only tracks the buffer. Committing goes through
//! [`ProjectStore::commit_edit`](crate::ProjectStore::commit_edit), which
//! validates the buffer and applies it.

use std::str::FromStr;

use crate::{EngineError, Project, ProjectDraft, ResultEngine};

/// A field of the edit buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftField {
    Name,
    Deadline,
    IsImportant,
}

impl FromStr for DraftField {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "deadline" => Ok(Self::Deadline),
            "isImportant" | "is_important" | "important" => Ok(Self::IsImportant),
            other => Err(EngineError::Validation(format!("unknown field '{other}'"))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing {
        index: usize,
        buffer: ProjectDraft,
    },
}

impl EditSession {
    /// Begin editing `project`, found at `index` in the store.
    ///
    /// Any edit already in progress is discarded.
    pub fn start(&mut self, index: usize, project: &Project) {
        *self = Self::Editing {
            index,
            buffer: ProjectDraft::from_project(project),
        };
    }

    /// Replace one buffer field. Values are checked only on commit, except
    /// `isImportant` which must be `true` or `false`.
    pub fn update_field(&mut self, field: &str, value: &str) -> ResultEngine<()> {
        let Self::Editing { buffer, .. } = self else {
            return Err(EngineError::NoActiveEdit);
        };

        match field.parse::<DraftField>()? {
            DraftField::Name => buffer.name = value.to_string(),
            DraftField::Deadline => buffer.deadline = value.to_string(),
            DraftField::IsImportant => {
                buffer.is_important = value.trim().parse().map_err(|_| {
                    EngineError::Validation(format!("isImportant must be true or false, got '{value}'"))
                })?;
            }
        }
        Ok(())
    }

    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    /// Store index of the project being edited.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Editing { index, .. } => Some(*index),
            Self::Idle => None,
        }
    }

    pub fn buffer(&self) -> Option<&ProjectDraft> {
        match self {
            Self::Editing { buffer, .. } => Some(buffer),
            Self::Idle => None,
        }
    }

    /// Keep the session pointed at the right project after `removed` left the
    /// collection: cancel when it was the one being edited, shift when it sat
    /// before it.
    pub(crate) fn on_removed(&mut self, removed: usize) {
        if let Self::Editing { index, .. } = self {
            if *index == removed {
                *self = Self::Idle;
            } else if *index > removed {
                *index -= 1;
            }
        }
    }
}
