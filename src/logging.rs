//! Logger construction.
//!
//! Builds a `tracing::Dispatch` from settings. The caller decides how long it
//! stays installed; nothing here touches the process-wide default.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use tracing::Dispatch;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_level(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::UnknownLogLevel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnknownLogFormat(other.to_string())),
        }
    }
}

/// Where log lines go: `stdout`, `stderr`, or any other value as a file path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File(PathBuf),
}

impl From<&str> for LogOutput {
    fn from(s: &str) -> Self {
        match s {
            "stdout" => Self::Stdout,
            "stderr" | "" => Self::Stderr,
            path => Self::File(PathBuf::from(path)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Problems found while reading the settings, to be logged once the
    /// logger is up
    pub warnings: Vec<String>,
}

impl LogSettings {
    /// An unknown level falls back to `info` with a warning; an unknown format
    /// is an error.
    pub fn new(level: &str, format: &str, output: &str) -> Result<Self, ConfigError> {
        let mut warnings = Vec::new();
        let level = level.parse::<LogLevel>().unwrap_or_else(|err: ConfigError| {
            warnings.push(err.to_string());
            LogLevel::default()
        });
        Ok(Self {
            level,
            format: format.parse()?,
            output: LogOutput::from(output),
            warnings,
        })
    }

    /// Build the subscriber. File outputs are opened in append mode.
    pub fn dispatch(&self) -> Result<Dispatch, ConfigError> {
        let (writer, ansi) = match &self.output {
            LogOutput::Stdout => (
                BoxMakeWriter::new(std::io::stdout),
                std::io::stdout().is_terminal(),
            ),
            LogOutput::Stderr => (
                BoxMakeWriter::new(std::io::stderr),
                std::io::stderr().is_terminal(),
            ),
            LogOutput::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| ConfigError::LogOutput {
                        path: path.clone(),
                        source,
                    })?;
                (BoxMakeWriter::new(Mutex::new(file)), false)
            }
        };

        let builder = tracing_subscriber::fmt()
            .with_max_level(self.level.as_level())
            .with_writer(writer);

        Ok(match self.format {
            LogFormat::Text => Dispatch::new(builder.with_ansi(ansi).finish()),
            LogFormat::Json => Dispatch::new(builder.json().finish()),
        })
    }
}
