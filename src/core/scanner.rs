use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: String,
}

/// Expands the caller's input paths into an ordered list of source files.
pub struct FileScanner;

impl FileScanner {
    pub fn new() -> Self {
        Self
    }

    /// Files keep the order they were given in; directories contribute their
    /// files sorted by name. Type declaration files are skipped.
    pub fn resolve(&self, inputs: &[PathBuf]) -> Result<Vec<SourceFile>> {
        let mut files = Vec::new();
        for input in inputs {
            if input.is_dir() {
                files.extend(self.scan_directory(input)?);
            } else if input.is_file() {
                if let Some(file) = classify(input) {
                    files.push(file);
                } else if !is_type_declaration(input) {
                    warn!(path = %input.display(), "ignoring unsupported file");
                }
            } else {
                return Err(ScanError::MissingInput(input.clone()).into());
            }
        }
        Ok(files)
    }

    pub fn scan_directory(&self, root_path: &Path) -> Result<Vec<SourceFile>> {
        let entries: Vec<PathBuf> = WalkDir::new(root_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();

        // Indexed parallel iteration keeps the walk order on collect.
        let files: Vec<SourceFile> = entries.par_iter().filter_map(|path| classify(path)).collect();
        Ok(files)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(path: &Path) -> Option<SourceFile> {
    if is_type_declaration(path) {
        warn!(path = %path.display(), "ignoring type declaration file");
        return None;
    }

    let language = match path.extension()?.to_str()? {
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        _ => return None,
    };

    Some(SourceFile {
        path: path.to_path_buf(),
        language: language.to_string(),
    })
}

pub fn is_type_declaration(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts"))
        .unwrap_or(false)
}
