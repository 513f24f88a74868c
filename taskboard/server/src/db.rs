use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

use crate::config::Config;

/// Opens the shared connection pool, retrying the initial handshake.
///
/// Makes at most `db_connect_attempts` attempts (at least one), sleeping
/// `db_connect_retry_delay_ms` between them. The last error is returned once
/// the attempts are exhausted.
#[tracing::instrument(skip(config))]
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.db_url());
    options
        .max_connections(config.db_max_connections)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let attempts = config.db_connect_attempts.max(1);
    let delay = config.db_connect_retry_delay();
    let mut attempt = 1;
    loop {
        match Database::connect(options.clone()).await {
            Ok(db) => {
                tracing::info!("Database connected after {} attempt(s)", attempt);
                return Ok(db);
            }
            Err(err) if attempt < attempts => {
                tracing::warn!(
                    "Database connection attempt {}/{} failed: {}",
                    attempt,
                    attempts,
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!("Giving up on database after {} attempt(s): {}", attempts, err);
                return Err(err);
            }
        }
    }
}
