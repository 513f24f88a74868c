use axum::body::Body;
use axum::http::{Request, StatusCode};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use std::collections::BTreeMap;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};
use tower::ServiceExt;

pub async fn setup_container() -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>>
{
    let container = postgres::Postgres::default().start().await?;
    Ok(container)
}

pub async fn setup_db(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
) -> anyhow::Result<DatabaseConnection> {
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let db_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);
    let db = Database::connect(&db_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// HTTP response snapshot for testing JSON endpoints.
#[derive(Debug, Serialize)]
#[allow(dead_code)]
pub struct HttpResponseSnapshot {
    test_context: String,
    status: u16,
    headers: BTreeMap<String, String>,
    body: serde_json::Value,
}

#[allow(dead_code)]
impl HttpResponseSnapshot {
    pub fn new(
        body: serde_json::Value,
        status: StatusCode,
        headers: &axum::http::HeaderMap,
        test_context: &str,
    ) -> Self {
        Self {
            test_context: test_context.to_string(),
            status: status.as_u16(),
            headers: filter_variable_headers(headers),
            body,
        }
    }
}

/// Filter out variable headers from response headers for snapshot testing.
fn filter_variable_headers(headers: &axum::http::HeaderMap) -> BTreeMap<String, String> {
    let variable_headers = ["date", "content-length", "vary"];

    headers
        .iter()
        .filter_map(|(name, value)| {
            let name_str = name.as_str().to_lowercase();
            if variable_headers.contains(&name_str.as_str()) {
                None
            } else {
                value.to_str().ok().map(|v| (name_str, v.to_string()))
            }
        })
        .collect()
}

/// Sends a request through the router and returns the status, headers and JSON body.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, headers, json)
}
