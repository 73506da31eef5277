use std::env;

use tracing::warn;

use crate::services::distribution::PhoneSelectionStrategy;

/// Runtime configuration, loaded once at startup from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub phone_strategy: PhoneSelectionStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "leadflow.db".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            phone_strategy: PhoneSelectionStrategy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid PORT, falling back to {}", defaults.port);
                defaults.port
            }),
            Err(_) => defaults.port,
        };

        let phone_strategy = match env::var("LEADFLOW_PHONE_STRATEGY") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "unknown phone selection strategy, falling back to default");
                defaults.phone_strategy
            }),
            Err(_) => defaults.phone_strategy,
        };

        Self {
            database_path: env::var("LEADFLOW_DATABASE_PATH")
                .unwrap_or(defaults.database_path),
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            phone_strategy,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database_path, "leadflow.db");
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert_eq!(config.phone_strategy, PhoneSelectionStrategy::FirstActive);
    }
}
