//! JSON payloads exchanged between the Taskboard server and its clients.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::TaskStatus;

/// A task as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskJson {
    pub id: u32,
    pub title: String,
    pub description: Option<String>,
    pub status_id: TaskStatus,
    pub status_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the status lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusJson {
    pub id: i32,
    pub status_name: String,
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "validate", derive(validator::Validate))]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    #[cfg_attr(
        feature = "validate",
        validate(
            custom(function = "validation::not_blank"),
            length(max = 255, message = "Title must be at most 255 characters")
        )
    )]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(
        feature = "validate",
        validate(length(max = 2000, message = "Description must be at most 2000 characters"))
    )]
    pub description: Option<String>,
}

/// Body of `PUT /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "validate", derive(validator::Validate))]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[cfg_attr(
        feature = "validate",
        validate(
            custom(function = "validation::not_blank"),
            length(max = 255, message = "Title must be at most 255 characters")
        )
    )]
    pub title: String,
    #[serde(default)]
    #[cfg_attr(
        feature = "validate",
        validate(length(max = 2000, message = "Description must be at most 2000 characters"))
    )]
    pub description: Option<String>,
}

/// Body of `PATCH /tasks/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status_id: TaskStatus,
}

/// Success body for mutations that do not return a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(feature = "validate")]
mod validation {
    use validator::ValidationError;

    pub(super) fn not_blank(title: &str) -> Result<(), ValidationError> {
        if title.trim().is_empty() {
            let mut error = ValidationError::new("blank");
            error.message = Some("Title is required".into());
            return Err(error);
        }
        Ok(())
    }
}
