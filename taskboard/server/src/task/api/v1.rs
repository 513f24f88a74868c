use crate::task::{NewTask, Task, TaskChanges, TaskQuery, TaskService, TaskServiceError};
use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch},
};
use serde::Deserialize;
use std::sync::Arc;
use taskboard_core::TaskStatus;
use taskboard_core::api::{
    CreateTaskRequest, ErrorResponse, MessageResponse, StatusJson, TaskJson, UpdateStatusRequest,
    UpdateTaskRequest,
};
use validator::ValidationErrors;

/// Shared state for the task handlers: the connection pool opened at startup.
#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            status_id: task.status(),
            status_name: task.status_name().to_string(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

/// Query parameters accepted by `GET /tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    status_id: Option<TaskStatus>,
    #[serde(default)]
    limit: Option<u64>,
}

impl From<TaskListParams> for TaskQuery {
    fn from(params: TaskListParams) -> Self {
        Self {
            search: params.search,
            status: params.status_id,
            limit: params.limit,
        }
    }
}

/// Error type for the JSON task API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was rejected before reaching the store.
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Service(#[from] TaskServiceError),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));
        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {}", field),
                })
            })
            .collect();
        ApiError::Validation(messages.join("; "))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message),
            ApiError::Service(
                err @ (TaskServiceError::TaskNotFound(_)
                | TaskServiceError::NotFoundOrNotDeletable(_)),
            ) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
            ApiError::Service(err @ TaskServiceError::TransitionRefused { .. }) => {
                (StatusCode::CONFLICT, "CONFLICT", err.to_string())
            }
            ApiError::Service(err) => {
                tracing::error!("Task request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Server error".to_string(),
                )
            }
        };

        (
            status_code,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Handler for POST /tasks - creates a task in the `to-do` status.
#[tracing::instrument(skip(state))]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), ApiError> {
    let Json(request) = payload?;
    let new_task = NewTask::try_from(request)?;
    let task = TaskService::new(&state.db).create_task(new_task).await?;
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for GET /tasks - lists tasks matching the optional search term.
#[tracing::instrument(skip(state))]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
    params: Result<Query<TaskListParams>, QueryRejection>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let Query(params) = params?;
    let tasks = TaskService::new(&state.db)
        .list_tasks(&TaskQuery::from(params))
        .await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for GET /tasks/statuses - lists the status lookup table.
#[tracing::instrument(skip(state))]
pub async fn list_statuses_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Json<Vec<StatusJson>>, ApiError> {
    let statuses = TaskService::new(&state.db).list_statuses().await?;
    Ok(Json(
        statuses
            .into_iter()
            .map(|row| StatusJson {
                id: row.id,
                status_name: row.status_name,
            })
            .collect(),
    ))
}

/// Handler for GET /tasks/{id}.
#[tracing::instrument(skip(state))]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let Path(id) = path?;
    let task = TaskService::new(&state.db)
        .get_task_by_id(id)
        .await?
        .ok_or(TaskServiceError::TaskNotFound(id))?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PATCH /tasks/{id}/done.
///
/// Answers with success even when no task has the given ID.
#[tracing::instrument(skip(state))]
pub async fn mark_done_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = path?;
    let rows_affected = TaskService::new(&state.db).mark_done(id).await?;
    tracing::debug!("Marked task {} as done ({} row(s))", id, rows_affected);
    Ok(Json(MessageResponse::new("Task marked as done")))
}

/// Handler for PUT /tasks/{id}. Completed or missing tasks are left untouched.
#[tracing::instrument(skip(state))]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<u32>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let changes = TaskChanges::try_from(request)?;
    TaskService::new(&state.db).update_task(id, changes).await?;
    Ok(Json(MessageResponse::new("Task updated")))
}

/// Handler for DELETE /tasks/{id}.
#[tracing::instrument(skip(state))]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = path?;
    TaskService::new(&state.db).delete_task(id).await?;
    Ok(Json(MessageResponse::new("Task deleted")))
}

/// Handler for PATCH /tasks/{id}/status.
#[tracing::instrument(skip(state))]
pub async fn update_status_handler(
    State(state): State<Arc<TaskState>>,
    path: Result<Path<u32>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    TaskService::new(&state.db)
        .update_status(id, request.status_id)
        .await?;
    Ok(Json(MessageResponse::new("Task status updated successfully")))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route("/tasks/statuses", get(list_statuses_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/{id}/done", patch(mark_done_handler))
        .route("/tasks/{id}/status", patch(update_status_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    async fn error_body(error: ApiError) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_map_to_bad_request() {
        let request = CreateTaskRequest {
            title: "".to_string(),
            description: None,
        };
        let error = ApiError::from(request.validate().unwrap_err());

        let (status, body) = error_body(error).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "VALIDATION_ERROR");
        assert_eq!(body.message, "Title is required");
    }

    #[tokio::test]
    async fn not_deletable_maps_to_not_found() {
        let error = ApiError::from(TaskServiceError::NotFoundOrNotDeletable(3));

        let (status, body) = error_body(error).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Task with ID 3 not found or cannot be deleted");
    }

    #[tokio::test]
    async fn refused_transition_maps_to_conflict() {
        let error = ApiError::from(TaskServiceError::TransitionRefused {
            id: 5,
            from: TaskStatus::Completed,
            to: TaskStatus::ToDo,
        });

        let (status, body) = error_body(error).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.message, "Task with ID 5 cannot move from completed to to-do");
    }

    #[tokio::test]
    async fn database_errors_do_not_leak_details() {
        let error = ApiError::from(TaskServiceError::Database(sea_orm::DbErr::Custom(
            "password authentication failed for user postgres".to_string(),
        )));

        let (status, body) = error_body(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "INTERNAL_ERROR");
        assert_eq!(body.message, "Server error");
    }
}
