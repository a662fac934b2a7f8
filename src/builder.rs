//! Command model → clap Command tree builder
//!
//! Renders a `CommandSet` as `<name> [root flags] [ARGS]...` plus one
//! `<name> <operation> [--flags] [ARGS]...` subcommand per named operation.

use clap::{value_parser, Arg, ArgAction, Command};

use crate::command::{CommandSet, OperationCommand};
use crate::flag::{FlagKind, FlagSpec};

/// Argument id holding the positional arguments of every command.
pub const POSITIONAL_ARG: &str = "_";

/// Configuration for building the CLI.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CliConfig {
    /// Root command name (e.g. "github" for `github.gql`)
    pub name: String,
    /// Root command about text, used when the document has no description
    pub about: String,
}

impl CliConfig {
    pub fn new(name: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
        }
    }
}

/// Build a clap `Command` tree from a command set.
///
/// Subcommands appear in document order. When the document has an anonymous
/// operation the root command takes its flags and runs it when no subcommand
/// is given; otherwise a subcommand is required.
pub fn build_commands(config: &CliConfig, set: &CommandSet) -> Command {
    let about = if set.root.description.is_empty() {
        config.about.clone()
    } else {
        set.root.description.clone()
    };
    let mut root = Command::new(config.name.clone()).about(about);

    if set.root.kind.is_some() {
        root = root
            .args(set.root.flags.iter().map(build_flag))
            .arg(positional_arg(&set.root.args_usage))
            .args_conflicts_with_subcommands(true)
            .subcommand_negates_reqs(true);
    } else {
        root = root.subcommand_required(true).arg_required_else_help(true);
    }

    for op in &set.commands {
        root = root.subcommand(build_operation_command(op));
    }

    root
}

/// Find the `OperationCommand` behind a matched subcommand name.
pub fn find_operation<'a>(set: &'a CommandSet, name: &str) -> Option<&'a OperationCommand> {
    set.commands.iter().find(|c| c.name == name)
}

fn build_operation_command(op: &OperationCommand) -> Command {
    Command::new(op.name.clone())
        .about(op.usage.clone())
        .after_help(format!("Category: {}", op.kind))
        .args(op.flags.iter().map(build_flag))
        .arg(positional_arg(&op.args_usage))
}

fn build_flag(flag: &FlagSpec) -> Arg {
    let arg = Arg::new(flag.name.clone())
        .long(flag.name.clone())
        .help(flag.usage.clone())
        .required(flag.required);

    let arg = match flag.kind {
        FlagKind::Text => arg.action(ArgAction::Set),
        FlagKind::Int => arg.action(ArgAction::Set).value_parser(value_parser!(i64)),
        FlagKind::Float => arg.action(ArgAction::Set).value_parser(value_parser!(f64)),
        // bare `--flag` means true; a following token is the value and must be
        // `true` or `false`, so positional arguments go before it or after `--`
        FlagKind::Bool => arg
            .action(ArgAction::Set)
            .value_parser(value_parser!(bool))
            .num_args(0..=1)
            .default_missing_value("true"),
    };

    match &flag.default {
        Some(default) => arg.default_value(default.to_string()),
        None => arg,
    }
}

fn positional_arg(usage: &str) -> Arg {
    Arg::new(POSITIONAL_ARG)
        .value_name("ARGS")
        .help(usage.to_owned())
        .num_args(0..)
        .action(ArgAction::Append)
}
