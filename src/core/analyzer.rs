use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::scanner::{FileScanner, SourceFile};
use crate::extract::{DependencyRecord, Extractor};
use crate::parsers::{cache::ParseCache, ParsedFile, ParserFactory};

/// A file that could not be parsed or extracted.
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub records: Vec<DependencyRecord>,
    pub errors: Vec<FileError>,
    pub files_analyzed: usize,
    pub cache_hits: usize,
}

impl AnalysisReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct DependencyAnalyzer {
    file_scanner: FileScanner,
    parser_factory: ParserFactory,
    extractor: Extractor,
    parse_cache: Option<ParseCache>,
    fail_fast: bool,
}

impl DependencyAnalyzer {
    /// Analyzer backed by the shared on-disk parse cache.
    pub fn new(extractor: Extractor) -> Self {
        let cache = ParseCache::new(None).unwrap_or_else(|err| {
            warn!(error = %err, "failed to initialize disk parse cache");
            ParseCache::in_memory_only()
        });
        Self::new_with_cache(extractor, Some(cache))
    }

    /// Analyzer using `cache`, or parsing every file when it is `None`.
    pub fn new_with_cache(extractor: Extractor, cache: Option<ParseCache>) -> Self {
        Self {
            file_scanner: FileScanner::new(),
            parser_factory: ParserFactory::new(),
            extractor,
            parse_cache: cache,
            fail_fast: false,
        }
    }

    /// Stop at the first file error instead of collecting it.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn analyze(&self, inputs: &[PathBuf]) -> Result<AnalysisReport> {
        let files = self.file_scanner.resolve(inputs)?;
        info!(files = files.len(), "resolved input files");

        let mut report = AnalysisReport::default();
        for file_info in &files {
            info!(path = %file_info.path.display(), "parsing");

            let outcome = self
                .load(file_info, &mut report.cache_hits)
                .and_then(|parsed| Ok(self.extractor.extract_file(&parsed)?));

            match outcome {
                Ok(records) => report.records.extend(records),
                Err(err) => {
                    if self.fail_fast {
                        return Err(err.context(format!(
                            "failed to extract {}",
                            file_info.path.display()
                        )));
                    }
                    error!(path = %file_info.path.display(), error = %err, "skipping file");
                    report.errors.push(FileError {
                        path: file_info.path.clone(),
                        error: err,
                    });
                }
            }
            report.files_analyzed += 1;
        }

        info!(
            records = report.records.len(),
            errors = report.errors.len(),
            cache_hits = report.cache_hits,
            "analysis finished"
        );
        Ok(report)
    }

    /// Extract records from already parsed files, in the given order.
    pub fn analyze_parsed(&self, files: &[ParsedFile]) -> Result<AnalysisReport> {
        let mut report = AnalysisReport::default();
        for parsed in files {
            match self.extractor.extract_file(parsed) {
                Ok(records) => report.records.extend(records),
                Err(err) if self.fail_fast => return Err(err.into()),
                Err(err) => report.errors.push(FileError {
                    path: parsed.path.clone(),
                    error: err.into(),
                }),
            }
            report.files_analyzed += 1;
        }
        Ok(report)
    }

    fn load(&self, file_info: &SourceFile, cache_hits: &mut usize) -> Result<ParsedFile> {
        if let Some(cache) = &self.parse_cache {
            match cache.needs_update(&file_info.path) {
                Ok(false) => {
                    if let Some(parsed) = cache.get(&file_info.path) {
                        *cache_hits += 1;
                        return Ok(parsed);
                    }
                }
                Ok(true) => {}
                Err(err) => warn!(
                    path = %file_info.path.display(),
                    error = %err,
                    "failed to validate cache entry"
                ),
            }
        }

        let parsed = self.parse(&file_info.path, &file_info.language)?;

        if let Some(cache) = &self.parse_cache {
            if let Err(err) = cache.store(&file_info.path, &parsed) {
                warn!(path = %file_info.path.display(), error = %err, "failed to cache parse");
            }
        }
        Ok(parsed)
    }

    fn parse(&self, path: &Path, language: &str) -> Result<ParsedFile> {
        let parser = self.parser_factory.get_parser(language)?;
        parser
            .parse_file(path)
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

impl Default for DependencyAnalyzer {
    fn default() -> Self {
        Self::new(Extractor::default())
    }
}
