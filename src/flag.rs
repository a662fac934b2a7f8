//! Variable definition → flag classification
//!
//! Decides, for every declared variable, whether it becomes a `--flag` (and of
//! which kind) or is bound to positional arguments.

use std::fmt;

use crate::document::{comment_text, ParameterDefinition};
use crate::error::BuildError;

/// Names clap generates on every command.
const RESERVED_FLAGS: &[&str] = &["help"];

/// Value type of a generated flag.
///
/// This is the closed set of GraphQL scalars the CLI knows how to parse;
/// anything else is rejected when commands are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Text,
    Int,
    Float,
    Bool,
}

impl FlagKind {
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        match type_name {
            "String" | "ID" => Some(Self::Text),
            "Int" | "Int64" => Some(Self::Int),
            "Float" => Some(Self::Float),
            "Boolean" => Some(Self::Bool),
            _ => None,
        }
    }
}

/// Default value of a flag, already parsed for its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagDefault {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FlagDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A `--name` option synthesized from one variable.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct FlagSpec {
    /// Same as the variable name
    pub name: String,
    pub kind: FlagKind,
    /// Help text, taken from the variable's comment
    pub usage: String,
    pub required: bool,
    pub default: Option<FlagDefault>,
}

/// Whether a variable name is bound to positional arguments: `_`, `_1`, `_2`, …
pub fn is_positional(name: &str) -> bool {
    name.strip_prefix('_')
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

/// Classify one variable.
///
/// Positional variables yield `None` and contribute their comment to
/// `args_usage`. A default literal always makes the flag optional.
pub fn classify_parameter(
    param: &ParameterDefinition,
    args_usage: &mut String,
) -> Result<Option<FlagSpec>, BuildError> {
    if is_positional(&param.name) {
        tracing::debug!(variable = %param.name, "skip positional variable");
        args_usage.push_str(&comment_text(param.comment.as_ref()));
        return Ok(None);
    }

    if RESERVED_FLAGS.contains(&param.name.as_str()) {
        return Err(BuildError::ReservedName {
            name: param.name.clone(),
        });
    }

    let kind =
        FlagKind::from_type_name(&param.type_name).ok_or_else(|| BuildError::UnsupportedType {
            variable: param.name.clone(),
            type_name: param.type_name.clone(),
        })?;

    let default = param
        .default
        .as_deref()
        .and_then(|raw| parse_default(&param.name, kind, raw));

    Ok(Some(FlagSpec {
        name: param.name.clone(),
        kind,
        usage: comment_text(param.comment.as_ref()),
        required: !param.nullable && param.default.is_none(),
        default,
    }))
}

/// Classify every variable of an operation, in declaration order.
pub fn classify_parameters(
    params: &[ParameterDefinition],
    args_usage: &mut String,
) -> Result<Vec<FlagSpec>, BuildError> {
    let mut flags: Vec<FlagSpec> = Vec::new();
    for param in params {
        if params.iter().filter(|p| p.name == param.name).count() > 1 {
            return Err(BuildError::DuplicateVariable {
                variable: param.name.clone(),
            });
        }
        if let Some(flag) = classify_parameter(param, args_usage)? {
            flags.push(flag);
        }
    }
    Ok(flags)
}

/// Unparseable numeric defaults fall back to zero, unparseable booleans to no
/// default; either way the build goes on.
fn parse_default(variable: &str, kind: FlagKind, raw: &str) -> Option<FlagDefault> {
    match kind {
        FlagKind::Text => Some(FlagDefault::Text(raw.to_string())),
        FlagKind::Int => {
            let value = raw.parse::<i64>().unwrap_or_else(|err| {
                warn_default(variable, raw, &err);
                0
            });
            Some(FlagDefault::Int(value))
        }
        FlagKind::Float => {
            let value = raw.parse::<f64>().unwrap_or_else(|err| {
                warn_default(variable, raw, &err);
                0.0
            });
            Some(FlagDefault::Float(value))
        }
        FlagKind::Bool => match raw.parse::<bool>() {
            Ok(value) => Some(FlagDefault::Bool(value)),
            Err(err) => {
                warn_default(variable, raw, &err);
                None
            }
        },
    }
}

fn warn_default(variable: &str, raw: &str, err: &dyn std::error::Error) {
    tracing::warn!(
        variable,
        value = raw,
        error = %err,
        "failed to parse default value"
    );
}
