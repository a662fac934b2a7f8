//! IR → command model
//!
//! Synthesizes one `OperationCommand` per named operation. The anonymous
//! operation, if any, augments the root command instead.

use crate::document::{comment_text, Document, OperationKind};
use crate::error::BuildError;
use crate::flag::{classify_parameters, FlagSpec};

/// Names clap generates as subcommands.
const RESERVED_COMMANDS: &[&str] = &["help"];

/// Everything needed to render and run the CLI for one document.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct CommandSet {
    pub root: RootCommand,
    /// One per named operation, in document order
    pub commands: Vec<OperationCommand>,
    /// Raw document text sent with every request
    pub source: String,
}

/// The root command, as augmented by the anonymous operation.
#[derive(Debug, Clone, Default, PartialEq)]
#[non_exhaustive]
pub struct RootCommand {
    pub description: String,
    pub args_usage: String,
    pub flags: Vec<FlagSpec>,
    /// Kind of the anonymous operation; `None` when the document has none
    pub kind: Option<OperationKind>,
}

/// A subcommand synthesized from a named operation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct OperationCommand {
    pub name: String,
    /// Category the command is listed under
    pub kind: OperationKind,
    pub usage: String,
    /// Help text for the positional arguments
    pub args_usage: String,
    pub flags: Vec<FlagSpec>,
}

/// Build the command model for a document.
pub fn synthesize(document: &Document) -> Result<CommandSet, BuildError> {
    let mut root = RootCommand {
        description: comment_text(document.comment.as_ref()),
        ..RootCommand::default()
    };
    let mut commands: Vec<OperationCommand> = Vec::new();

    for op in &document.operations {
        tracing::debug!(operation = %op.name, kind = %op.kind, "synthesizing operation");

        if op.name.is_empty() {
            if root.kind.is_some() {
                return Err(BuildError::MultipleAnonymousOperations);
            }
            if op.comment.is_some() {
                root.description = comment_text(op.comment.as_ref());
            }
            root.flags = classify_parameters(&op.parameters, &mut root.args_usage)?;
            root.kind = Some(op.kind);
            continue;
        }

        if RESERVED_COMMANDS.contains(&op.name.as_str()) {
            return Err(BuildError::ReservedName {
                name: op.name.clone(),
            });
        }
        if commands.iter().any(|c| c.name == op.name) {
            return Err(BuildError::DuplicateOperation {
                name: op.name.clone(),
            });
        }

        let mut args_usage = String::new();
        let flags = classify_parameters(&op.parameters, &mut args_usage)?;
        commands.push(OperationCommand {
            name: op.name.clone(),
            kind: op.kind,
            usage: comment_text(op.comment.as_ref()),
            args_usage,
            flags,
        });
    }

    Ok(CommandSet {
        root,
        commands,
        source: document.source.clone(),
    })
}
