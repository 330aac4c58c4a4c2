//! Language-neutral syntax model consumed by the extraction engine.
//!
//! A [`ParsedFile`] is produced once by a [`SyntaxSource`](super::SyntaxSource)
//! and never mutated afterwards. Everything here is plain owned data so that it
//! can be cached to disk and shared between extraction passes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub declarations: Vec<Declaration>,
}

impl ParsedFile {
    pub fn new(path: impl Into<PathBuf>, declarations: Vec<Declaration>) -> Self {
        Self {
            path: path.into(),
            declarations,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    Class,
    Function,
    Variable,
    Interface,
    Other,
}

/// A top-level statement of a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Display name, present for named declarations only.
    pub name: Option<String>,
    pub kind: DeclarationKind,
    pub line: usize,
    /// Attached annotations in source order.
    pub annotations: Vec<Annotation>,
}

impl Declaration {
    pub fn new(name: Option<String>, kind: DeclarationKind, line: usize) -> Self {
        Self {
            name,
            kind,
            line,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn is_annotated(&self) -> bool {
        !self.annotations.is_empty()
    }
}

/// A decorator attached to a declaration.
///
/// `callee` is only resolved for simple named calls such as `@Component({..})`.
/// Bare references (`@Input`) and member callees (`@ng.Component(..)`) keep
/// `callee == None` and no arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub callee: Option<String>,
    pub arguments: Vec<Expr>,
    /// Source text of the decorator expression, for diagnostics.
    pub text: String,
    pub line: usize,
}

impl Annotation {
    pub fn call(callee: impl Into<String>, arguments: Vec<Expr>) -> Self {
        let callee = callee.into();
        let text = format!("{callee}(..)");
        Self {
            callee: Some(callee),
            arguments,
            text,
            line: 0,
        }
    }

    pub fn unresolved(text: impl Into<String>) -> Self {
        Self {
            callee: None,
            arguments: Vec::new(),
            text: text.into(),
            line: 0,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// The trailing call argument, by convention the configuration object.
    pub fn config_argument(&self) -> Option<&Expr> {
        self.arguments.last()
    }
}

/// Expression shapes that matter to the extractor; everything else is `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    StringLiteral(String),
    Identifier(String),
    /// Dotted reference such as `forms.FORM_DIRECTIVES`, kept as source text.
    Member(String),
    Array(Vec<Expr>),
    Object(Vec<Property>),
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Other {
        kind: String,
        text: String,
    },
}

impl Expr {
    pub fn string(value: impl Into<String>) -> Self {
        Expr::StringLiteral(value.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn call(callee: impl Into<String>, arguments: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(Expr::Identifier(callee.into())),
            arguments,
        }
    }

    pub fn object(properties: Vec<(&str, Expr)>) -> Self {
        Expr::Object(
            properties
                .into_iter()
                .map(|(name, value)| Property::named(name, value))
                .collect(),
        )
    }

    /// Literal text as the original tooling would read it: identifier names,
    /// string contents, and source text for anything else.
    pub fn literal_text(&self) -> String {
        match self {
            Expr::StringLiteral(text) | Expr::Identifier(text) | Expr::Member(text) => {
                text.clone()
            }
            Expr::Call { callee, .. } => callee.literal_text(),
            Expr::Other { text, .. } => text.clone(),
            Expr::Array(_) => "[..]".to_string(),
            Expr::Object(_) => "{..}".to_string(),
        }
    }

    /// Short shape description used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Expr::StringLiteral(_) => "string literal",
            Expr::Identifier(_) => "identifier",
            Expr::Member(_) => "member expression",
            Expr::Array(_) => "array literal",
            Expr::Object(_) => "object literal",
            Expr::Call { .. } => "call expression",
            Expr::Other { .. } => "unsupported expression",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// `None` for spread elements and computed keys.
    pub name: Option<String>,
    pub value: Expr,
}

impl Property {
    pub fn named(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}
