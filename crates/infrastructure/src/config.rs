//! Configuration loading.
//!
//! Settings are layered: built-in defaults, then an optional TOML/JSON/YAML
//! file, then environment variables such as `POPSPOT__BASE_URL` or
//! `POPSPOT__AUTH_FAILURE_STATUSES=401,419`.

use std::path::PathBuf;

use config::{Config, Environment, File};
use popspot_domain::{ClientConfig, DomainError};
use tracing::debug;

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "POPSPOT";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// The merged configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Builds a [`ClientConfig`] from a file and the environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }
}

impl ConfigLoader {
    /// Creates a loader reading only defaults and `POPSPOT__*` variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a configuration file. A missing file is skipped.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Overrides the environment variable prefix.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Loads, merges and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or the result fails validation.
    pub fn load(&self) -> Result<ClientConfig, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = &self.file {
            debug!(path = %path.display(), "reading configuration file");
            builder = builder.add_source(File::from(path.clone()).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("auth_failure_statuses")
                .try_parsing(true),
        );

        let config: ClientConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

/// Returns the platform default session file, e.g.
/// `~/.config/popspot/session.json` on Linux.
#[must_use]
pub fn default_session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("popspot").join("session.json"))
}
