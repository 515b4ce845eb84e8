use crate::{env_required, ConfigError, FromEnv};

/// Database configuration
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

impl DatabaseConfig {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    /// Load the configuration only when DATABASE_URL is present.
    ///
    /// Deployments without a database run on the in-memory store, so an
    /// unset variable is a legitimate state rather than an error.
    pub fn from_env_opt() -> Option<Self> {
        std::env::var("DATABASE_URL").ok().map(Self::new)
    }
}

impl FromEnv for DatabaseConfig {
    /// Requires DATABASE_URL to be set (no default)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_required("DATABASE_URL")?,
        })
    }
}
