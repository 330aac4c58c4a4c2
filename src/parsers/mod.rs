pub mod cache;
pub mod common;
pub mod syntax;
pub mod typescript;

use anyhow::Result;
use std::path::Path;

pub use syntax::{Annotation, Declaration, DeclarationKind, Expr, ParsedFile, Property};

/// Producer of syntax trees, the boundary between raw source text and the
/// extraction engine.
pub trait SyntaxSource {
    fn parse_file(&self, file_path: &Path) -> Result<ParsedFile>;
    fn language_name(&self) -> &str;
}

pub struct ParserFactory;

impl ParserFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn get_parser(&self, language: &str) -> Result<Box<dyn SyntaxSource + Send + Sync>> {
        match language {
            "typescript" => Ok(Box::new(typescript::TypeScriptParser::new()?)),
            "tsx" => Ok(Box::new(typescript::TypeScriptParser::tsx()?)),
            _ => anyhow::bail!("Unsupported language: {}", language),
        }
    }
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}
