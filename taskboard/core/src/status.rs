use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task.
///
/// The discriminants are the identifiers of the rows in the `task_status`
/// lookup table and the integer codes used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i32", into = "i32"))]
pub enum TaskStatus {
    #[default]
    ToDo = 1,
    OnHold = 2,
    Completed = 3,
}

/// A mutation a caller wants to apply to a task in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Change the title or description.
    Edit,
    /// Remove the task.
    Delete,
    /// Move the task to the given status.
    Transition(TaskStatus),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Unknown status id {0}")]
    UnknownStatus(i32),
    #[error("Unknown status name '{0}'")]
    UnknownStatusName(String),
}

impl TaskStatus {
    /// Every status, in code order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::OnHold, TaskStatus::Completed];

    /// Returns the integer code stored in `task.status_id`.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Returns the name stored in `task_status.status_name`.
    pub fn name(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to-do",
            TaskStatus::OnHold => "on-hold",
            TaskStatus::Completed => "completed",
        }
    }

    /// The single rule deciding which mutations a task in this status accepts.
    ///
    /// Completed tasks are frozen: they cannot be edited, deleted or moved
    /// back to an open status. Completing a completed task is accepted and
    /// changes nothing.
    pub fn permits(self, action: TaskAction) -> bool {
        match action {
            TaskAction::Edit | TaskAction::Delete => self.is_open(),
            TaskAction::Transition(TaskStatus::Completed) => true,
            TaskAction::Transition(TaskStatus::ToDo | TaskStatus::OnHold) => self.is_open(),
        }
    }

    /// Returns every status from which `action` is permitted.
    pub fn permitting(action: TaskAction) -> Vec<TaskStatus> {
        Self::ALL
            .into_iter()
            .filter(|status| status.permits(action))
            .collect()
    }

    fn is_open(self) -> bool {
        matches!(self, TaskStatus::ToDo | TaskStatus::OnHold)
    }
}

impl TryFrom<i32> for TaskStatus {
    type Error = StatusError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(StatusError::UnknownStatus(code))
    }
}

impl From<TaskStatus> for i32 {
    fn from(status: TaskStatus) -> Self {
        status.code()
    }
}

impl FromStr for TaskStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.name() == s)
            .ok_or_else(|| StatusError::UnknownStatusName(s.to_string()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
