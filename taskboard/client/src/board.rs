use taskboard_core::TaskStatus;
use taskboard_core::api::{CreateTaskRequest, TaskJson, UpdateTaskRequest};

use crate::api::{ClientError, TaskApi};
use crate::cache::{CacheKey, TaskCache};

pub const NO_TASKS_MESSAGE: &str = "No tasks found";

/// What the task list should currently display.
#[derive(Debug, PartialEq)]
pub enum ListView<'a> {
    /// Nothing cached yet for the current search; show a placeholder.
    Loading,
    /// The search matched nothing.
    Empty(&'static str),
    Tasks(&'a [TaskJson]),
}

/// A destructive action waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    Edit { id: u32, request: UpdateTaskRequest },
    Delete { id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Client state for the task list screen.
///
/// Lists are served from a [`TaskCache`] keyed by search term. A successful
/// mutation invalidates every cached list and re-fetches the current one; a
/// failed request leaves the cache untouched and records an error notice.
pub struct TaskBoard<A: TaskApi> {
    api: A,
    search: String,
    cache: TaskCache,
    pending: Option<Confirmation>,
    notices: Vec<Notice>,
}

impl<A: TaskApi> TaskBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            search: String::new(),
            cache: TaskCache::new(),
            pending: None,
            notices: Vec::new(),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns the list state for the current search term.
    pub fn view(&self) -> ListView<'_> {
        match self.cache.get(&CacheKey::task_list(self.search.as_str())) {
            None => ListView::Loading,
            Some([]) => ListView::Empty(NO_TASKS_MESSAGE),
            Some(tasks) => ListView::Tasks(tasks),
        }
    }

    /// Fetches the current list unless it is already cached.
    #[tracing::instrument(skip(self), fields(search = %self.search))]
    pub async fn refresh(&mut self) {
        let key = CacheKey::task_list(self.search.as_str());
        if self.cache.get(&key).is_some() {
            return;
        }
        match self.api.list_tasks(&self.search).await {
            Ok(tasks) => self.cache.insert(key, tasks),
            Err(err) => self.report_failure("Failed to load tasks", err),
        }
    }

    /// Switches to a new (debounced) search term and loads its results.
    pub async fn apply_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.refresh().await;
    }

    pub async fn add_task(&mut self, title: impl Into<String>, description: Option<String>) {
        let request = CreateTaskRequest {
            title: title.into(),
            description,
        };
        let result = self
            .api
            .create_task(&request)
            .await
            .map(|task| format!("Task '{}' created", task.title));
        self.finish_mutation("Failed to create task", result).await;
    }

    pub async fn complete(&mut self, id: u32) {
        let result = self.api.mark_done(id).await.map(|body| body.message);
        self.finish_mutation("Failed to complete task", result).await;
    }

    pub async fn hold(&mut self, id: u32) {
        self.change_status(id, TaskStatus::OnHold).await;
    }

    pub async fn unhold(&mut self, id: u32) {
        self.change_status(id, TaskStatus::ToDo).await;
    }

    /// Asks for confirmation before saving new title and description.
    pub fn request_edit(&mut self, id: u32, title: impl Into<String>, description: Option<String>) {
        self.pending = Some(Confirmation::Edit {
            id,
            request: UpdateTaskRequest {
                title: title.into(),
                description,
            },
        });
    }

    /// Asks for confirmation before deleting.
    pub fn request_delete(&mut self, id: u32) {
        self.pending = Some(Confirmation::Delete { id });
    }

    pub fn pending_confirmation(&self) -> Option<&Confirmation> {
        self.pending.as_ref()
    }

    /// Runs the pending action. Does nothing when none is pending.
    pub async fn confirm(&mut self) {
        match self.pending.take() {
            Some(Confirmation::Edit { id, request }) => {
                let result = self
                    .api
                    .update_task(id, &request)
                    .await
                    .map(|body| body.message);
                self.finish_mutation("Failed to update task", result).await;
            }
            Some(Confirmation::Delete { id }) => {
                let result = self.api.delete_task(id).await.map(|body| body.message);
                self.finish_mutation("Failed to delete task", result).await;
            }
            None => {}
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Drains the notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    async fn change_status(&mut self, id: u32, status: TaskStatus) {
        let result = self
            .api
            .update_status(id, status)
            .await
            .map(|body| body.message);
        self.finish_mutation("Failed to change task status", result).await;
    }

    async fn finish_mutation(&mut self, context: &str, result: Result<String, ClientError>) {
        match result {
            Ok(message) => {
                self.cache.invalidate_mutation();
                self.notices.push(Notice::success(message));
                self.refresh().await;
            }
            Err(err) => self.report_failure(context, err),
        }
    }

    fn report_failure(&mut self, context: &str, err: ClientError) {
        tracing::warn!("{}: {}", context, err);
        self.notices.push(Notice::error(format!("{}: {}", context, err)));
    }
}
