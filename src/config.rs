//! Environment-derived settings for the `gql` binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::logging::LogSettings;

pub const CONFIG_ENV: &str = "GQL_CONF";
pub const URL_ENV: &str = "GQL_URL";
pub const TIMEOUT_ENV: &str = "GQL_TIMEOUT";
pub const LOG_LEVEL_ENV: &str = "GQL_LOG_LVL";
pub const LOG_FORMAT_ENV: &str = "GQL_LOG_FMT";
pub const LOG_OUTPUT_ENV: &str = "GQL_LOG_OUT";

const DEFAULT_CONFIG: &str = ".gql";
const DEFAULT_URL: &str = "http://_gql._tcp.local/query";
const DEFAULT_COMMAND: &str = "gql";

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Settings {
    /// Operations document the CLI is generated from
    pub document_path: PathBuf,
    /// GraphQL endpoint every operation is sent to
    pub endpoint: String,
    /// Per-request timeout; unset means wait until cancelled
    pub timeout: Option<Duration>,
    pub log: LogSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let timeout = match lookup(TIMEOUT_ENV).filter(|v| !v.is_empty()) {
            Some(value) => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|source| ConfigError::InvalidTimeout { value, source })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            document_path: PathBuf::from(get(CONFIG_ENV, DEFAULT_CONFIG)),
            endpoint: get(URL_ENV, DEFAULT_URL),
            timeout,
            log: LogSettings::new(
                &get(LOG_LEVEL_ENV, "info"),
                &get(LOG_FORMAT_ENV, "txt"),
                &get(LOG_OUTPUT_ENV, "stderr"),
            )?,
        })
    }

    /// Root command name: the document's file name without `.gql`.
    pub fn command_name(&self) -> String {
        command_name(&self.document_path)
    }
}

fn command_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = file_name.strip_suffix(".gql").unwrap_or(&file_name);
    if name.is_empty() {
        DEFAULT_COMMAND.to_string()
    } else {
        name.to_string()
    }
}
