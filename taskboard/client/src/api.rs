use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use taskboard_core::TaskStatus;
use taskboard_core::api::{
    CreateTaskRequest, ErrorResponse, MessageResponse, TaskJson, UpdateStatusRequest,
    UpdateTaskRequest,
};

use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response, or the body could not be decoded.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
}

/// One call per task API operation. Implementations do not retry or cache.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<TaskJson, ClientError>;

    /// Lists tasks whose title contains `search`; an empty term lists everything.
    async fn list_tasks(&self, search: &str) -> Result<Vec<TaskJson>, ClientError>;

    async fn get_task(&self, id: u32) -> Result<TaskJson, ClientError>;

    async fn mark_done(&self, id: u32) -> Result<MessageResponse, ClientError>;

    async fn update_task(
        &self,
        id: u32,
        request: &UpdateTaskRequest,
    ) -> Result<MessageResponse, ClientError>;

    async fn delete_task(&self, id: u32) -> Result<MessageResponse, ClientError>;

    async fn update_status(
        &self,
        id: u32,
        status: TaskStatus,
    ) -> Result<MessageResponse, ClientError>;
}

/// `TaskApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    /// Creates a client for the API mounted at `base_url`, e.g. `http://localhost:5000/tasks`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    fn task_url(&self, id: u32) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

/// Decodes a success body, or turns an error status into `ClientError::Api`.
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string(),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    #[tracing::instrument(skip(self))]
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<TaskJson, ClientError> {
        let response = self.client.post(&self.base_url).json(request).send().await?;
        parse_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_tasks(&self, search: &str) -> Result<Vec<TaskJson>, ClientError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("search", search)])
            .send()
            .await?;
        parse_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_task(&self, id: u32) -> Result<TaskJson, ClientError> {
        let response = self.client.get(self.task_url(id)).send().await?;
        parse_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn mark_done(&self, id: u32) -> Result<MessageResponse, ClientError> {
        let response = self
            .client
            .patch(format!("{}/done", self.task_url(id)))
            .send()
            .await?;
        parse_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_task(
        &self,
        id: u32,
        request: &UpdateTaskRequest,
    ) -> Result<MessageResponse, ClientError> {
        let response = self
            .client
            .put(self.task_url(id))
            .json(request)
            .send()
            .await?;
        parse_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_task(&self, id: u32) -> Result<MessageResponse, ClientError> {
        let response = self.client.delete(self.task_url(id)).send().await?;
        parse_response(response).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(
        &self,
        id: u32,
        status: TaskStatus,
    ) -> Result<MessageResponse, ClientError> {
        let response = self
            .client
            .patch(format!("{}/status", self.task_url(id)))
            .json(&UpdateStatusRequest { status_id: status })
            .send()
            .await?;
        parse_response(response).await
    }
}
