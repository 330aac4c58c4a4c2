//! The extraction engine: annotated declarations in, dependency records out.
//!
//! Extraction only reads the [`ParsedFile`] it is given, so the same tree can
//! be extracted any number of times.

pub mod annotation;
pub mod config;
pub mod declaration;
pub mod record;

use tracing::debug;

pub use annotation::{AnnotationFilter, DEFAULT_PATTERN};
pub use config::{Category, CategoryLists, ConfigValue};
pub use record::DependencyRecord;

use crate::error::ExtractError;
use crate::parsers::ParsedFile;

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    filter: AnnotationFilter,
}

impl Extractor {
    pub fn new(filter: AnnotationFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &AnnotationFilter {
        &self.filter
    }

    /// Records of one file in declaration order, then annotation order.
    ///
    /// The first error aborts the file.
    pub fn extract_file(&self, file: &ParsedFile) -> Result<Vec<DependencyRecord>, ExtractError> {
        let mut records = Vec::new();

        for declaration in declaration::annotated_declarations(file) {
            let matched = self.filter.matching(file.path(), declaration)?;
            let site = config::Site {
                file: file.path(),
                declaration: annotation::display_name(declaration),
            };

            for annotation in matched {
                let lists = config::extract_categories(annotation, site)?;
                records.push(record::build_record(declaration, file.path(), lists)?);
            }
        }

        debug!(
            file = %file.path().display(),
            records = records.len(),
            "extracted dependency records"
        );
        Ok(records)
    }
}
