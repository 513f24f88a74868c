use crate::entities::*;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::*;
use taskboard_core::api::{CreateTaskRequest, UpdateTaskRequest};
use taskboard_core::{StatusError, TaskAction, TaskStatus};
use validator::{Validate, ValidationErrors};

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: u32,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    status_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the status name as stored in the lookup table.
    pub fn status_name(&self) -> &str {
        &self.status_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// A validated task ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: Option<String>,
}

impl NewTask {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl TryFrom<CreateTaskRequest> for NewTask {
    type Error = ValidationErrors;

    fn try_from(request: CreateTaskRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        Ok(Self {
            title: request.title,
            description: request.description,
        })
    }
}

/// Validated replacement title and description for an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    title: String,
    description: Option<String>,
}

impl TryFrom<UpdateTaskRequest> for TaskChanges {
    type Error = ValidationErrors;

    fn try_from(request: UpdateTaskRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        Ok(Self {
            title: request.title,
            description: request.description,
        })
    }
}

/// Filters applied when listing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Case-insensitive title substring. Empty matches everything.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub limit: Option<u64>,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// A stored row references a status outside the known set.
    #[error("Invalid stored status: {0}")]
    InvalidStatus(#[from] StatusError),
    #[error("Task with ID {0} not found")]
    TaskNotFound(u32),
    /// Delete matched no row: the task is missing or completed.
    #[error("Task with ID {0} not found or cannot be deleted")]
    NotFoundOrNotDeletable(u32),
    #[error("Task with ID {id} cannot move from {from} to {to}")]
    TransitionRefused {
        id: u32,
        from: TaskStatus,
        to: TaskStatus,
    },
}

impl TryFrom<(task::Model, Option<task_status::Model>)> for Task {
    type Error = StatusError;

    fn try_from(
        (model, status_row): (task::Model, Option<task_status::Model>),
    ) -> Result<Self, Self::Error> {
        let status = TaskStatus::try_from(model.status_id)?;
        let status_name = status_row
            .map(|row| row.status_name)
            .unwrap_or_else(|| status.name().to_string());
        Ok(Task {
            id: model.id as u32,
            title: model.title,
            description: model.description,
            status,
            status_name,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

/// Status codes from which `action` may be applied, for use in a `WHERE ... IN` guard.
fn guard_codes(action: TaskAction) -> Vec<i32> {
    TaskStatus::permitting(action)
        .into_iter()
        .map(TaskStatus::code)
        .collect()
}

/// Converts an API id to the column type. Ids beyond the column range match no row.
fn row_id(id: u32) -> Option<i32> {
    i32::try_from(id).ok()
}

/// Escapes LIKE metacharacters so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Creates a new task in the `to-do` status.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task`, including its generated ID.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, TaskServiceError> {
        let status = TaskStatus::default();
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(new_task.title),
            description: ActiveValue::Set(new_task.description),
            status_id: ActiveValue::Set(status.code()),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::info!("Created task {}", created_model.id);
        Ok(Task::try_from((created_model, None::<task_status::Model>))?)
    }

    /// Retrieves a task by its ID. A missing task is `Ok(None)`.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: u32) -> Result<Option<Task>, TaskServiceError> {
        let Some(db_id) = row_id(id) else {
            return Ok(None);
        };
        let row = task::Entity::find_by_id(db_id)
            .find_also_related(task_status::Entity)
            .one(self.db)
            .await?;
        Ok(row.map(Task::try_from).transpose()?)
    }

    /// Lists tasks joined with their status name, newest first.
    ///
    /// # Arguments
    ///
    /// * `query` - Optional title search, status filter and row limit.
    ///
    /// # Returns
    ///
    /// A `Result` containing the matching tasks ordered by creation time, descending.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, TaskServiceError> {
        let mut select = task::Entity::find().find_also_related(task_status::Entity);

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            select = select.filter(
                Expr::expr(Func::lower(Expr::col((task::Entity, task::Column::Title))))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        if let Some(status) = query.status {
            select = select.filter(task::Column::StatusId.eq(status.code()));
        }

        let rows = select
            .order_by_desc(task::Column::CreatedAt)
            .order_by_desc(task::Column::Id)
            .limit(query.limit)
            .all(self.db)
            .await?;

        let tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Marks a task as completed.
    ///
    /// Completing an already completed task is accepted. An unknown ID is not
    /// an error; the returned row count is zero.
    #[tracing::instrument(skip(self))]
    pub async fn mark_done(&self, id: u32) -> Result<u64, TaskServiceError> {
        self.set_status(id, TaskStatus::Completed).await
    }

    /// Replaces the title and description of an open task.
    ///
    /// # Returns
    ///
    /// The number of rows changed: zero when the task is missing or completed.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        id: u32,
        changes: TaskChanges,
    ) -> Result<u64, TaskServiceError> {
        let Some(db_id) = row_id(id) else {
            return Ok(0);
        };
        let result = task::Entity::update_many()
            .col_expr(task::Column::Title, Expr::value(changes.title))
            .col_expr(task::Column::Description, Expr::value(changes.description))
            .col_expr(task::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(task::Column::Id.eq(db_id))
            .filter(task::Column::StatusId.is_in(guard_codes(TaskAction::Edit)))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            tracing::info!("Task {} not updated: missing or not editable", id);
        }
        Ok(result.rows_affected)
    }

    /// Moves a task to `status`.
    ///
    /// # Returns
    ///
    /// `TaskNotFound` when no such task exists and `TransitionRefused` when the
    /// task's current status does not allow the move.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, id: u32, status: TaskStatus) -> Result<(), TaskServiceError> {
        if self.set_status(id, status).await? > 0 {
            return Ok(());
        }
        match self.get_task_by_id(id).await? {
            None => Err(TaskServiceError::TaskNotFound(id)),
            Some(task) => Err(TaskServiceError::TransitionRefused {
                id,
                from: task.status(),
                to: status,
            }),
        }
    }

    /// Deletes an open task.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: u32) -> Result<(), TaskServiceError> {
        let Some(db_id) = row_id(id) else {
            return Err(TaskServiceError::NotFoundOrNotDeletable(id));
        };
        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(db_id))
            .filter(task::Column::StatusId.is_in(guard_codes(TaskAction::Delete)))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TaskServiceError::NotFoundOrNotDeletable(id));
        }
        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    /// Retrieves the rows of the status lookup table ordered by ID.
    #[tracing::instrument(skip(self))]
    pub async fn list_statuses(&self) -> Result<Vec<task_status::Model>, TaskServiceError> {
        let statuses = task_status::Entity::find()
            .order_by_asc(task_status::Column::Id)
            .all(self.db)
            .await?;
        Ok(statuses)
    }

    async fn set_status(&self, id: u32, status: TaskStatus) -> Result<u64, TaskServiceError> {
        let Some(db_id) = row_id(id) else {
            return Ok(0);
        };
        let result = task::Entity::update_many()
            .col_expr(task::Column::StatusId, Expr::value(status.code()))
            .col_expr(task::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(task::Column::Id.eq(db_id))
            .filter(task::Column::StatusId.is_in(guard_codes(TaskAction::Transition(status))))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
