use serde::Deserialize;
use std::time::Duration;

use crate::debounce::SearchDebouncer;

/// Client settings, read from `TASKBOARD_*` environment variables.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("TASKBOARD"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:5000/tasks".to_string()
}

fn default_search_debounce_ms() -> u64 {
    SearchDebouncer::DEFAULT_DELAY.as_millis() as u64
}
