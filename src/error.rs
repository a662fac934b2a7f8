//! Error types for the graphql-clap crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or parsing the operations document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("failed to read document: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse document")]
    Parse(#[source] graphql_parser::query::ParseError),
}

/// Errors raised while turning operations into commands.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    #[error("variable ${variable} has unsupported type {type_name}")]
    UnsupportedType {
        variable: String,
        type_name: String,
    },

    #[error("variable ${variable} is declared more than once")]
    DuplicateVariable { variable: String },

    #[error("operation {name} is defined more than once")]
    DuplicateOperation { name: String },

    #[error("only one anonymous operation is allowed per document")]
    MultipleAnonymousOperations,

    #[error("{name} is reserved by the command line and cannot be used as a name")]
    ReservedName { name: String },
}

/// Errors that can occur while executing an operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    #[error("subscriptions not implemented")]
    SubscriptionUnsupported,

    #[error("request cancelled")]
    Cancelled,

    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("HTTP request failed")]
    RequestFailed(#[source] reqwest::Error),

    #[error("failed to read response body")]
    ResponseRead(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpError {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response is not a GraphQL JSON response")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("GraphQL errors: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },

    #[error("failed to write response")]
    Output(#[source] std::io::Error),
}

/// Errors in the environment-derived configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown log format: {0}")]
    UnknownLogFormat(String),

    #[error("unknown log level: {0}")]
    UnknownLogLevel(String),

    #[error("failed to open log output: {path}")]
    LogOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid timeout {value:?} (expected whole seconds)")]
    InvalidTimeout {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Anything that can end a `gql` invocation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}
