//! GraphQL document → internal IR (intermediate representation)
//!
//! Parses an executable GraphQL document into a flat list of
//! `OperationDefinition`s, with `#` comment groups attached to the document,
//! each operation and each variable, so the command synthesizer never has to
//! look at syntax.

use std::fmt;

use graphql_parser::query::{self, Definition, Type, Value};
use graphql_parser::Pos;

use crate::error::DocumentError;

/// A parsed document of operations.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Document {
    /// Leading comment block of the file, detached from the first operation
    pub comment: Option<CommentGroup>,
    /// Operations in source order
    pub operations: Vec<OperationDefinition>,
    /// Unmodified source text, sent verbatim as the request query
    pub source: String,
}

/// One named or anonymous operation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct OperationDefinition {
    /// Operation name, empty for an anonymous operation
    pub name: String,
    pub kind: OperationKind,
    /// Variable definitions in declaration order
    pub parameters: Vec<ParameterDefinition>,
    pub comment: Option<CommentGroup>,
}

/// A single declared variable.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ParameterDefinition {
    /// Variable name without the `$`
    pub name: String,
    /// Named type (e.g. "Int"), or the rendered type for lists (e.g. "[Int!]")
    pub type_name: String,
    pub nullable: bool,
    /// Default literal as written, with string quotes removed
    pub default: Option<String>,
    pub comment: Option<CommentGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

/// Consecutive `#` comment lines, with the `#` removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup(pub Vec<String>);

/// Concatenate the lines of a comment group, in order and without separators.
pub fn comment_text(group: Option<&CommentGroup>) -> String {
    match group {
        Some(CommentGroup(lines)) => lines.concat(),
        None => String::new(),
    }
}

/// Parse an executable document.
///
/// Fragment definitions are accepted but do not produce operations; the
/// source still carries them to the server.
pub fn parse_document(source: impl Into<String>) -> Result<Document, DocumentError> {
    let source = source.into();
    let parsed = query::parse_query::<String>(&source).map_err(DocumentError::Parse)?;
    let comments = CommentIndex::new(&source);

    let mut operations = Vec::new();
    for definition in parsed.definitions {
        let Definition::Operation(operation) = definition else {
            continue;
        };
        operations.push(extract_operation(operation, &comments));
    }

    let comment = comments.leading();
    Ok(Document {
        comment,
        operations,
        source,
    })
}

fn extract_operation(
    operation: query::OperationDefinition<'_, String>,
    comments: &CommentIndex<'_>,
) -> OperationDefinition {
    let (position, name, kind, variables) = match operation {
        query::OperationDefinition::SelectionSet(set) => {
            (set.span.0, None, OperationKind::Query, Vec::new())
        }
        query::OperationDefinition::Query(q) => (
            q.position,
            q.name,
            OperationKind::Query,
            q.variable_definitions,
        ),
        query::OperationDefinition::Mutation(m) => (
            m.position,
            m.name,
            OperationKind::Mutation,
            m.variable_definitions,
        ),
        query::OperationDefinition::Subscription(s) => (
            s.position,
            s.name,
            OperationKind::Subscription,
            s.variable_definitions,
        ),
    };

    let parameters = variables
        .iter()
        .map(|v| ParameterDefinition {
            name: v.name.clone(),
            type_name: named_type(&v.var_type),
            nullable: !matches!(v.var_type, Type::NonNullType(_)),
            default: v.default_value.as_ref().map(raw_literal),
            comment: comments.attached(v.position),
        })
        .collect();

    OperationDefinition {
        name: name.unwrap_or_default(),
        kind,
        parameters,
        comment: comments.attached(position),
    }
}

/// The type name a variable is classified by, ignoring top-level non-null.
fn named_type(ty: &Type<'_, String>) -> String {
    match ty {
        Type::NamedType(name) => name.clone(),
        Type::NonNullType(inner) => named_type(inner),
        Type::ListType(_) => render_type(ty),
    }
}

fn render_type(ty: &Type<'_, String>) -> String {
    match ty {
        Type::NamedType(name) => name.clone(),
        Type::ListType(inner) => format!("[{}]", render_type(inner)),
        Type::NonNullType(inner) => format!("{}!", render_type(inner)),
    }
}

/// Default literal as the document author wrote it; strings lose their quotes.
fn raw_literal(value: &Value<'_, String>) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => render_value(other),
    }
}

fn render_value(value: &Value<'_, String>) -> String {
    match value {
        Value::Variable(name) => format!("${name}"),
        Value::Int(n) => n.as_i64().unwrap_or_default().to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => format!("{s:?}"),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Enum(e) => e.clone(),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{k}: {}", render_value(v)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
    }
}

/// Line-oriented view of the source used to find comments above a token.
struct CommentIndex<'a> {
    lines: Vec<&'a str>,
}

impl<'a> CommentIndex<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
        }
    }

    fn comment_line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index)?.trim_start().strip_prefix('#')
    }

    fn is_blank(&self, index: usize) -> bool {
        self.lines.get(index).map_or(true, |l| l.trim().is_empty())
    }

    /// Comment lines directly above the token at `pos`.
    ///
    /// Only the first token on a line (optionally after an opening paren)
    /// owns the comment block above it.
    fn attached(&self, pos: Pos) -> Option<CommentGroup> {
        let line_index = pos.line.checked_sub(1)?;
        let line = self.lines.get(line_index)?;
        let leads_line = line
            .chars()
            .take(pos.column.saturating_sub(1))
            .all(|c| c.is_whitespace() || c == '(');
        if !leads_line {
            return None;
        }

        let mut texts = Vec::new();
        let mut index = line_index;
        while index > 0 {
            index -= 1;
            match self.comment_line(index) {
                Some(text) => texts.push(text.to_string()),
                None => break,
            }
        }
        if texts.is_empty() {
            return None;
        }
        texts.reverse();
        Some(CommentGroup(texts))
    }

    /// Comment block opening the file, when a blank line separates it from
    /// the first definition. Blank lines before the block are skipped.
    fn leading(&self) -> Option<CommentGroup> {
        let start = (0..self.lines.len()).find(|&i| !self.is_blank(i))?;
        let texts: Vec<String> = (start..self.lines.len())
            .map_while(|i| self.comment_line(i))
            .map(str::to_string)
            .collect();
        if texts.is_empty() || !self.is_blank(start + texts.len()) {
            return None;
        }
        Some(CommentGroup(texts))
    }
}
