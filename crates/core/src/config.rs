//! Client configuration
//!
//! Defaults, then an optional config file, then `SMARTBI_*` environment
//! variables, in increasing precedence.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash
    pub base_url: String,

    /// Transport timeout applied to every request, in milliseconds
    pub timeout_ms: u64,

    /// Key the session token is stored under
    pub token_key: String,

    /// Directory holding the persisted session
    pub state_dir: PathBuf,

    pub login_path: String,

    pub home_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_ms: 5_000,
            token_key: "token".to_string(),
            state_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("smartbi"),
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from an optional file plus environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("timeout_ms", defaults.timeout_ms)?
            .set_default("token_key", defaults.token_key)?
            .set_default("state_dir", defaults.state_dir.to_string_lossy().to_string())?
            .set_default("login_path", defaults.login_path)?
            .set_default("home_path", defaults.home_path)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("SMARTBI"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
