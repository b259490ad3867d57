use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors. A missing credential is fatal at startup, never a
/// per-row error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Graph store connection settings, read once at startup.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Bolt endpoint, e.g. `neo4j+s://xxxx.databases.neo4j.io`
    #[validate(length(min = 1, message = "store URI cannot be empty"))]
    pub uri: String,

    #[validate(length(min = 1, message = "store user cannot be empty"))]
    pub user: String,

    #[validate(length(min = 1, message = "store password cannot be empty"))]
    pub password: String,

    /// Target database name
    #[validate(length(min = 1, message = "database name cannot be empty"))]
    pub database: String,
}

impl StoreConfig {
    /// Read the connection settings from the environment (a `.env` file is
    /// honored when the caller loads it first). URI, user, and password are
    /// required; the database defaults to `neo4j`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            uri: required_env_var("NEO4J_URI")?,
            user: required_env_var("NEO4J_USER")?,
            password: required_env_var("NEO4J_PASSWORD")?,
            database: env::var("NEO4J_DATABASE").unwrap_or_else(|_| "neo4j".to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

fn required_env_var(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key))
}
