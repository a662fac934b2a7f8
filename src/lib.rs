//! Auto-generate clap CLI commands from a document of GraphQL operations.
//!
//! Parses an executable GraphQL document, turns every named operation into a
//! subcommand and every variable into a flag, and sends the unmodified
//! document to a GraphQL endpoint when a command runs.
//!
//! # Usage
//!
//! ```no_run
//! use graphql_clap::{interrupted, App, CliConfig, HttpTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = r#"
//! # Look up a user
//! query GetUser($id: Int!) { user(id: $id) { name } }
//! "#;
//!
//! let app = App::from_source(source, CliConfig::new("users", "Users CLI"))?;
//! let transport = HttpTransport::new("https://api.example.com/graphql", None)?;
//!
//! let mut stdout = std::io::stdout();
//! app.run(&transport, ["users", "GetUser", "--id", "1"], &mut stdout, interrupted())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod builder;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod flag;
pub mod logging;
pub mod transport;

pub use app::{interrupted, App};
pub use builder::{build_commands, find_operation, CliConfig, POSITIONAL_ARG};
pub use command::{synthesize, CommandSet, OperationCommand, RootCommand};
pub use config::Settings;
pub use dispatch::{collect_variables, dispatch, dispatch_until, Action, VariableValue, Variables};
pub use document::{
    comment_text, parse_document, CommentGroup, Document, OperationDefinition, OperationKind,
    ParameterDefinition,
};
pub use error::{AppError, BuildError, ConfigError, DispatchError, DocumentError};
pub use flag::{classify_parameter, is_positional, FlagDefault, FlagKind, FlagSpec};
pub use logging::{LogFormat, LogLevel, LogOutput, LogSettings};
pub use transport::{GraphQlRequest, HttpTransport, Transport};

// Re-export dependencies for downstream crates
pub use clap;
