//! Document → runnable CLI, end to end.

use std::ffi::OsString;
use std::future::Future;
use std::io::Write;
use std::path::Path;

use crate::builder::{build_commands, find_operation, CliConfig};
use crate::command::{synthesize, CommandSet};
use crate::dispatch::{dispatch_until, Action};
use crate::document::parse_document;
use crate::error::{AppError, DocumentError};
use crate::transport::Transport;

/// A compiled CLI: the command model plus the config it is rendered with.
#[derive(Debug, Clone)]
pub struct App {
    config: CliConfig,
    commands: CommandSet,
}

impl App {
    /// Read, parse and compile a document file.
    pub fn load(path: &Path, config: CliConfig) -> Result<Self, AppError> {
        tracing::debug!(config = %path.display(), "reading config");
        let source = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(source, config)
    }

    pub fn from_source(source: impl Into<String>, config: CliConfig) -> Result<Self, AppError> {
        let document = parse_document(source)?;
        tracing::debug!(operations = document.operations.len(), "building cli");
        let commands = synthesize(&document)?;
        Ok(Self { config, commands })
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn command(&self) -> clap::Command {
        build_commands(&self.config, &self.commands)
    }

    /// Parse `args` (program name first) and run the selected operation,
    /// writing its response to `out`. `cancel` aborts an in-flight request.
    pub async fn run<T, W, I, S, F>(
        &self,
        transport: &T,
        args: I,
        out: &mut W,
        cancel: F,
    ) -> Result<(), AppError>
    where
        T: Transport,
        W: Write,
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
        F: Future<Output = ()>,
    {
        let matches = self.command().try_get_matches_from(args)?;

        let (action, matches) = match matches.subcommand() {
            Some((name, sub)) => {
                let op = find_operation(&self.commands, name)
                    .ok_or_else(|| AppError::UnknownCommand(name.to_string()))?;
                (Action::for_command(op), sub)
            }
            None => {
                // the root only parses without a subcommand when it owns the
                // anonymous operation
                let action = Action::for_root(&self.commands.root)
                    .ok_or_else(|| AppError::UnknownCommand(self.config.name.clone()))?;
                (action, &matches)
            }
        };

        tracing::debug!(
            operation = action.operation_name.unwrap_or_default(),
            kind = %action.kind,
            "executing operation"
        );
        dispatch_until(
            transport,
            &self.commands.source,
            &action,
            matches,
            out,
            cancel,
        )
        .await?;
        Ok(())
    }
}

/// Completes on Ctrl+C. Never completes if the handler cannot be installed.
pub async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for interrupt");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BuildError, DispatchError};
    use crate::transport::HttpTransport;
    use serde_json::json;

    const DOCUMENT: &str = r#"# Users API

# Look up a user
query GetUser(
  # user id
  $id: Int!
  $verbose: Boolean = false
) { user(id: $id) { name } }

# Greet people
query Greet(
  # names to greet
  $_: [String!]
) { greet(names: $_) }

subscription Watch { events { id } }
"#;

    fn app() -> App {
        App::from_source(DOCUMENT, CliConfig::new("users", "Users CLI")).unwrap()
    }

    #[tokio::test]
    async fn run_executes_named_operation_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_body(mockito::Matcher::Json(json!({
                "query": DOCUMENT,
                "variables": {"id": 42, "verbose": false, "_": []},
                "operationName": "GetUser",
            })))
            .with_status(200)
            .with_body(r#"{"data":{"user":{"name":"alice"}}}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let mut out = Vec::new();
        app()
            .run(
                &transport,
                ["users", "GetUser", "--id", "42"],
                &mut out,
                std::future::pending(),
            )
            .await
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "{\"user\":{\"name\":\"alice\"}}\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn run_passes_positional_arguments() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_body(mockito::Matcher::PartialJson(json!({
                "variables": {"_": ["alice", "bob"], "_1": "alice", "_2": "bob"},
                "operationName": "Greet",
            })))
            .with_status(200)
            .with_body(r#"{"data":{"greet":"hi"}}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let mut out = Vec::new();
        app()
            .run(
                &transport,
                ["users", "Greet", "alice", "bob"],
                &mut out,
                std::future::pending(),
            )
            .await
            .unwrap();

        assert_eq!(out, b"{\"greet\":\"hi\"}\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn run_rejects_subscription_without_request() {
        let server = mockito::Server::new_async().await;
        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let mut out = Vec::new();

        let err = app()
            .run(&transport, ["users", "Watch"], &mut out, std::future::pending())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Dispatch(DispatchError::SubscriptionUnsupported)
        ));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn run_reports_missing_required_flag() {
        let transport = HttpTransport::new("http://127.0.0.1:9/query", None).unwrap();
        let mut out = Vec::new();

        let err = app()
            .run(&transport, ["users", "GetUser"], &mut out, std::future::pending())
            .await
            .unwrap_err();

        match err {
            AppError::Cli(err) => {
                assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn run_dispatches_anonymous_operation_from_root() {
        let source = "# Count items\nquery($limit: Int = 10) { items(limit: $limit) }\n";
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_body(mockito::Matcher::Json(json!({
                "query": source,
                "variables": {"limit": 3, "_": []},
            })))
            .with_status(200)
            .with_body(r#"{"data":{"items":3}}"#)
            .create_async()
            .await;

        let app = App::from_source(source, CliConfig::new("items", "Items")).unwrap();
        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let mut out = Vec::new();
        app.run(&transport, ["items", "--limit", "3"], &mut out, std::future::pending())
            .await
            .unwrap();

        assert_eq!(out, b"{\"items\":3}\n");
        mock.assert_async().await;
    }

    #[test]
    fn from_source_reports_build_errors() {
        let err = App::from_source("{ a }\n{ b }", CliConfig::new("x", "x")).unwrap_err();
        assert!(matches!(
            err,
            AppError::Build(BuildError::MultipleAnonymousOperations)
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = App::load(Path::new("/nonexistent/ops.gql"), CliConfig::new("x", "x")).unwrap_err();
        assert!(matches!(err, AppError::Document(DocumentError::Read { .. })));
    }

    #[test]
    fn command_lists_operations() {
        let cmd = app().command();
        let names: Vec<&str> = cmd.get_subcommands().map(|c| c.get_name()).collect();
        assert_eq!(names, ["GetUser", "Greet", "Watch"]);
    }
}
