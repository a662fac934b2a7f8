//! ArgMatches → GraphQL request dispatch
//!
//! Takes parsed clap matches and the matching command, assembles the variable
//! mapping, sends the raw document through a `Transport` and writes the
//! response.

use std::collections::BTreeMap;
use std::future::Future;
use std::io::Write;

use serde::Serialize;

use crate::builder::POSITIONAL_ARG;
use crate::command::{OperationCommand, RootCommand};
use crate::document::OperationKind;
use crate::error::DispatchError;
use crate::flag::{FlagKind, FlagSpec};
use crate::transport::{GraphQlRequest, Transport};

/// Variables sent with a request, keyed by variable name.
pub type Variables = BTreeMap<String, VariableValue>;

/// A single variable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariableValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

/// What a matched command runs.
#[derive(Debug, Clone, Copy)]
pub struct Action<'a> {
    /// `None` for the anonymous operation
    pub operation_name: Option<&'a str>,
    pub kind: OperationKind,
    pub flags: &'a [FlagSpec],
}

impl<'a> Action<'a> {
    pub fn for_command(cmd: &'a OperationCommand) -> Self {
        Self {
            operation_name: Some(cmd.name.as_str()),
            kind: cmd.kind,
            flags: &cmd.flags,
        }
    }

    /// `None` when the document has no anonymous operation.
    pub fn for_root(root: &'a RootCommand) -> Option<Self> {
        Some(Self {
            operation_name: None,
            kind: root.kind?,
            flags: &root.flags,
        })
    }
}

/// Assemble the variables for one invocation.
///
/// Every flag gets an entry (null when unset and without default). Positional
/// arguments are stored as a list under `_` and one by one under `_1`, `_2`, …
pub fn collect_variables(flags: &[FlagSpec], matches: &clap::ArgMatches) -> Variables {
    let mut vars = Variables::new();

    for flag in flags {
        let id = flag.name.as_str();
        let value = match flag.kind {
            FlagKind::Text => matches.get_one::<String>(id).cloned().map(VariableValue::Text),
            FlagKind::Int => matches.get_one::<i64>(id).copied().map(VariableValue::Int),
            FlagKind::Float => matches.get_one::<f64>(id).copied().map(VariableValue::Float),
            FlagKind::Bool => matches.get_one::<bool>(id).copied().map(VariableValue::Bool),
        };
        vars.insert(flag.name.clone(), value.unwrap_or(VariableValue::Null));
    }

    let args: Vec<String> = matches
        .try_get_many::<String>(POSITIONAL_ARG)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    for (n, arg) in args.iter().enumerate() {
        vars.insert(format!("_{}", n + 1), VariableValue::Text(arg.clone()));
    }
    vars.insert(POSITIONAL_ARG.to_string(), VariableValue::List(args));

    vars
}

/// Execute an action based on clap matches.
///
/// Queries and mutations make exactly one transport call and write the payload
/// plus a newline to `out`. Subscriptions fail without touching the transport.
pub async fn dispatch<T, W>(
    transport: &T,
    source: &str,
    action: &Action<'_>,
    matches: &clap::ArgMatches,
    out: &mut W,
) -> Result<(), DispatchError>
where
    T: Transport,
    W: Write,
{
    if action.kind == OperationKind::Subscription {
        return Err(DispatchError::SubscriptionUnsupported);
    }

    let variables = collect_variables(action.flags, matches);
    let request = GraphQlRequest {
        query: source,
        variables: &variables,
        operation_name: action.operation_name,
    };
    let payload = transport.execute(&request).await?;

    out.write_all(&payload).map_err(DispatchError::Output)?;
    out.write_all(b"\n").map_err(DispatchError::Output)?;
    out.flush().map_err(DispatchError::Output)?;
    Ok(())
}

/// Like `dispatch`, but gives up with `DispatchError::Cancelled` as soon as
/// `cancel` completes. The in-flight request is dropped.
pub async fn dispatch_until<T, W, F>(
    transport: &T,
    source: &str,
    action: &Action<'_>,
    matches: &clap::ArgMatches,
    out: &mut W,
    cancel: F,
) -> Result<(), DispatchError>
where
    T: Transport,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::select! {
        result = dispatch(transport, source, action, matches, out) => result,
        () = cancel => Err(DispatchError::Cancelled),
    }
}
