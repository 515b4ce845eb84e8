use core_config::{
    ConfigError, Environment, FromEnv, database::DatabaseConfig, server::ServerConfig,
};

/// Application configuration, loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    /// Absent when no DATABASE_URL is set; the app then runs on the
    /// in-memory store.
    pub database: Option<DatabaseConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env_opt(),
        })
    }
}
