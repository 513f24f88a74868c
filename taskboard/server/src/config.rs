use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Full connection URL. Takes precedence over the individual `db_*` parts.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_db_host")]
    pub db_host: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    #[serde(default = "default_db_user")]
    pub db_user: String,
    #[serde(default)]
    pub db_pass: String,
    #[serde(default = "default_db_name")]
    pub db_name: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_connect_attempts")]
    pub db_connect_attempts: u32,
    #[serde(default = "default_db_connect_retry_delay_ms")]
    pub db_connect_retry_delay_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Returns the URL used to open the connection pool.
    pub fn db_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.db_user, self.db_pass, self.db_host, self.db_port, self.db_name
            ),
        }
    }

    pub fn db_connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.db_connect_retry_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            db_host: default_db_host(),
            db_port: default_db_port(),
            db_user: default_db_user(),
            db_pass: String::new(),
            db_name: default_db_name(),
            port: default_port(),
            db_max_connections: default_db_max_connections(),
            db_connect_attempts: default_db_connect_attempts(),
            db_connect_retry_delay_ms: default_db_connect_retry_delay_ms(),
        }
    }
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "todo_db".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_connect_attempts() -> u32 {
    5
}

fn default_db_connect_retry_delay_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_build_db_url_from_parts() {
        let config = Config {
            db_user: "root".to_string(),
            db_pass: "secret".to_string(),
            db_host: "db".to_string(),
            ..Default::default()
        };
        assert_eq!(config.db_url(), "postgres://root:secret@db:5432/todo_db");
    }

    #[test]
    fn database_url_overrides_parts() {
        let config = Config {
            database_url: Some("postgres://u:p@elsewhere:6543/tasks".to_string()),
            db_host: "ignored".to_string(),
            ..Default::default()
        };
        assert_eq!(config.db_url(), "postgres://u:p@elsewhere:6543/tasks");
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.db_connect_attempts, 5);
        assert_eq!(config.db_connect_retry_delay(), Duration::from_secs(2));
    }
}
