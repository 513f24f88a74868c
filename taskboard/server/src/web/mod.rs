use axum::Router;
use axum::http::{Method, header};
use migration::MigratorTrait;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db;
use crate::task::api::v1::{TaskState, create_api_router};

/// Builds the application router around an already opened connection pool.
pub fn build_router(db: Arc<sea_orm::DatabaseConnection>) -> Router {
    let task_state = Arc::new(TaskState { db });

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .merge(create_api_router(task_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::PATCH,
                            Method::DELETE,
                        ])
                        .allow_headers([header::CONTENT_TYPE]),
                ),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let db = db::connect(&config).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let app = build_router(Arc::new(db));
    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
