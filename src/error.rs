//! Error types for extraction, scanning, configuration and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning a parsed file into dependency records.
///
/// Each variant aborts extraction of the file it occurred in; other files are
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("{}: cannot resolve the callee of annotation `@{annotation}` on `{declaration}`", file.display())]
    UnresolvableAnnotation {
        file: PathBuf,
        declaration: String,
        annotation: String,
    },

    #[error("{}: `{property}` of `{declaration}` is a {found}, expected a string or an array", file.display())]
    MalformedConfig {
        file: PathBuf,
        declaration: String,
        property: String,
        found: String,
    },

    #[error("{}:{line}: matched annotation on a declaration without a name", file.display())]
    MissingDeclarationName { file: PathBuf, line: usize },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("input path does not exist: {}", .0.display())]
    MissingInput(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read options file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse options file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("option \"output\" has been provided but the \"{0}\" folder was not specified")]
    IncompleteOutput(&'static str),

    #[error("invalid annotation pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Dot,
    Image,
    Html,
}

impl std::fmt::Display for RenderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RenderStage::Dot => "DOT",
            RenderStage::Image => "SVG",
            RenderStage::Html => "HTML",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("the template \"{}\" is missing", .0.display())]
    MissingTemplate(PathBuf),

    #[error("generating {stage} failed: {source}")]
    Stage {
        stage: RenderStage,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub fn stage(&self) -> Option<RenderStage> {
        match self {
            RenderError::Stage { stage, .. } => Some(*stage),
            RenderError::MissingTemplate(_) => None,
        }
    }
}
